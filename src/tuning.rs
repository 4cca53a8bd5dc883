//! Data-driven game balance
//!
//! Every gameplay constant lives here so a run can be re-tuned from a JSON
//! file without touching simulation code. Missing fields fall back to the
//! defaults below.

use std::path::Path;

use serde::{Deserialize, Serialize};

/// Errors produced while loading or validating a [`Tuning`]
#[derive(Debug, thiserror::Error)]
pub enum TuningError {
    /// Tuning file could not be read
    #[error("failed to read tuning file: {0}")]
    Io(#[from] std::io::Error),

    /// Tuning JSON was malformed
    #[error("failed to parse tuning JSON: {0}")]
    Parse(#[from] serde_json::Error),

    /// A field held a value the simulation cannot run with
    #[error("invalid tuning value for `{field}`: {reason}")]
    Invalid {
        field: &'static str,
        reason: &'static str,
    },
}

/// Gameplay constants (speeds in tiles per second, durations in seconds)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    // === Player ===
    pub player_speed: f32,
    pub starting_lives: u8,

    // === Enemies ===
    pub pooka_tunnel_speed: f32,
    pub fygar_tunnel_speed: f32,
    /// Shared slow speed while ghosting through dirt
    pub dirt_speed: f32,
    /// Alive time after which an enemy gets its one-time speed boost
    pub aggression_time: f32,
    pub aggression_multiplier: f32,
    /// Seconds per inflation stage lost once the pump lets go
    pub deflate_interval: f32,

    // === Pathing ===
    /// Enter ghost mode only if dirt time <= threshold * tunnel time
    pub ghost_threshold: f32,
    /// Largest Manhattan ring searched around the player for a ghost target
    pub ghost_search_radius: i32,
    /// Tunnel BFS gives up beyond this many steps
    pub bfs_max_distance: u32,

    // === Fire breath ===
    pub fire_warning: f32,
    pub fire_grow: f32,
    pub fire_full: f32,
    pub fire_shrink: f32,
    pub fire_cooldown: f32,
    pub fire_probability: f64,
    /// Maximum horizontal distance to the player for a Fygar to fire
    pub fire_distance: i32,

    // === Rocks ===
    pub rock_wobble: f32,
    pub rock_fall_speed: f32,
    pub min_rocks: u32,
    pub max_rocks: u32,

    // === Pump ===
    /// Tiles scanned along the player's facing
    pub pump_range: i32,
    pub inflate_interval: f32,
    /// Inflation stage at which an enemy pops
    pub max_inflation: u8,
    pub pump_visual_time: f32,

    // === Scoring ===
    pub dig_points: u64,
    pub pump_points: u64,
    pub crush_points: u64,
    pub level_bonus: u64,

    // === Rounds & levels ===
    pub round_pause: f32,
    pub level_transition: f32,
    pub min_pooka: u32,
    pub max_pooka: u32,
    pub min_fygar: u32,
    pub max_fygar: u32,
    /// Speed multiplier gained per level after the first
    pub level_speed_step: f32,
    pub max_level_speed_multiplier: f32,
    /// Enemies spawn strictly farther than this (Manhattan) from the player
    pub spawn_min_player_distance: i32,
    pub spawn_attempts: u32,

    // === Effects ===
    pub enemy_crush_shake: f32,
    pub player_crush_shake: f32,
    pub life_loss_shake: f32,
    pub particle_burst: u32,
    pub particle_life: f32,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            // Player - slightly faster than a Pooka in a tunnel
            player_speed: 2.5,
            starting_lives: 3,

            // Enemies
            pooka_tunnel_speed: 2.0,
            fygar_tunnel_speed: 1.5,
            dirt_speed: 0.5,
            aggression_time: 30.0,
            aggression_multiplier: 1.2,
            deflate_interval: 1.0,

            // Pathing
            ghost_threshold: 0.6,
            ghost_search_radius: 5,
            bfs_max_distance: 20,

            // Fire breath
            fire_warning: 0.5,
            fire_grow: 0.4,
            fire_full: 0.3,
            fire_shrink: 0.3,
            fire_cooldown: 3.0,
            fire_probability: 0.3,
            fire_distance: 3,

            // Rocks
            rock_wobble: 1.0,
            rock_fall_speed: 6.0,
            min_rocks: 2,
            max_rocks: 4,

            // Pump
            pump_range: 2,
            inflate_interval: 0.4,
            max_inflation: 4,
            pump_visual_time: 0.3,

            // Scoring
            dig_points: 10,
            pump_points: 200,
            crush_points: 500,
            level_bonus: 1000,

            // Rounds & levels
            round_pause: 2.0,
            level_transition: 2.0,
            min_pooka: 2,
            max_pooka: 4,
            min_fygar: 1,
            max_fygar: 2,
            level_speed_step: 0.1,
            max_level_speed_multiplier: 1.5,
            spawn_min_player_distance: 3,
            spawn_attempts: 100,

            // Effects
            enemy_crush_shake: 0.5,
            player_crush_shake: 1.0,
            life_loss_shake: 0.6,
            particle_burst: 12,
            particle_life: 0.6,
        }
    }
}

impl Tuning {
    /// Parse and validate tuning from a JSON document
    pub fn from_json(json: &str) -> Result<Self, TuningError> {
        let tuning: Tuning = serde_json::from_str(json)?;
        tuning.validate()?;
        Ok(tuning)
    }

    /// Load tuning from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, TuningError> {
        let json = std::fs::read_to_string(path)?;
        let tuning = Self::from_json(&json)?;
        log::info!("Loaded tuning overrides");
        Ok(tuning)
    }

    /// Total lifetime of one fire breath (warning + grow + full + shrink)
    pub fn fire_duration(&self) -> f32 {
        self.fire_warning + self.fire_grow + self.fire_full + self.fire_shrink
    }

    /// Tunnel speed multiplier for a level (1-based), capped
    pub fn level_speed_multiplier(&self, level: u32) -> f32 {
        let steps = level.saturating_sub(1) as f32;
        (1.0 + steps * self.level_speed_step).min(self.max_level_speed_multiplier)
    }

    /// Number of Pookas spawned on a level
    pub fn pooka_count(&self, level: u32) -> u32 {
        (self.min_pooka + level / 2).min(self.max_pooka)
    }

    /// Number of Fygars spawned on a level
    pub fn fygar_count(&self, level: u32) -> u32 {
        (self.min_fygar + level / 3).min(self.max_fygar)
    }

    /// Reject values the simulation cannot run with
    pub fn validate(&self) -> Result<(), TuningError> {
        fn positive(field: &'static str, value: f32) -> Result<(), TuningError> {
            if value.is_finite() && value > 0.0 {
                Ok(())
            } else {
                Err(TuningError::Invalid {
                    field,
                    reason: "must be a positive number",
                })
            }
        }

        fn non_negative(field: &'static str, value: f32) -> Result<(), TuningError> {
            if value.is_finite() && value >= 0.0 {
                Ok(())
            } else {
                Err(TuningError::Invalid {
                    field,
                    reason: "must not be negative",
                })
            }
        }

        fn ordered(field: &'static str, min: u32, max: u32) -> Result<(), TuningError> {
            if min <= max {
                Ok(())
            } else {
                Err(TuningError::Invalid {
                    field,
                    reason: "minimum exceeds maximum",
                })
            }
        }

        positive("player_speed", self.player_speed)?;
        positive("pooka_tunnel_speed", self.pooka_tunnel_speed)?;
        positive("fygar_tunnel_speed", self.fygar_tunnel_speed)?;
        positive("dirt_speed", self.dirt_speed)?;
        positive("aggression_multiplier", self.aggression_multiplier)?;
        positive("deflate_interval", self.deflate_interval)?;
        positive("ghost_threshold", self.ghost_threshold)?;
        non_negative("aggression_time", self.aggression_time)?;
        non_negative("fire_warning", self.fire_warning)?;
        non_negative("fire_grow", self.fire_grow)?;
        non_negative("fire_full", self.fire_full)?;
        non_negative("fire_shrink", self.fire_shrink)?;
        non_negative("fire_cooldown", self.fire_cooldown)?;
        non_negative("rock_wobble", self.rock_wobble)?;
        positive("rock_fall_speed", self.rock_fall_speed)?;
        positive("inflate_interval", self.inflate_interval)?;
        non_negative("pump_visual_time", self.pump_visual_time)?;
        non_negative("round_pause", self.round_pause)?;
        non_negative("level_transition", self.level_transition)?;
        non_negative("level_speed_step", self.level_speed_step)?;
        positive("max_level_speed_multiplier", self.max_level_speed_multiplier)?;
        non_negative("particle_life", self.particle_life)?;
        positive("fire duration", self.fire_duration())?;

        if !(0.0..=1.0).contains(&self.fire_probability) {
            return Err(TuningError::Invalid {
                field: "fire_probability",
                reason: "must lie within [0, 1]",
            });
        }
        if self.max_inflation == 0 {
            return Err(TuningError::Invalid {
                field: "max_inflation",
                reason: "must be at least 1",
            });
        }
        if self.starting_lives == 0 {
            return Err(TuningError::Invalid {
                field: "starting_lives",
                reason: "must be at least 1",
            });
        }
        if self.pump_range < 1 || self.fire_distance < 0 || self.ghost_search_radius < 1 {
            return Err(TuningError::Invalid {
                field: "pump_range/fire_distance/ghost_search_radius",
                reason: "distances must be at least 1 (fire_distance at least 0)",
            });
        }

        ordered("min_rocks/max_rocks", self.min_rocks, self.max_rocks)?;
        ordered("min_pooka/max_pooka", self.min_pooka, self.max_pooka)?;
        ordered("min_fygar/max_fygar", self.min_fygar, self.max_fygar)?;

        Ok(())
    }
}
