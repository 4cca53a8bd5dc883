//! Read-only view of the simulation for renderers and tooling

use serde::Serialize;

use super::fire::{fire_range, fire_tiles};
use super::grid::{Cell, Grid};
use super::state::{Enemy, Fire, GameEvent, GamePhase, GameState, Particle, Player, Pump, Rock};

/// A fire together with its current reach
#[derive(Debug, Serialize)]
pub struct FireView<'a> {
    #[serde(flatten)]
    pub fire: &'a Fire,
    pub range: u8,
    /// In-bounds tiles currently covered by flames
    pub tiles: Vec<Cell>,
}

/// Everything needed to draw a frame, borrowed from the state
#[derive(Debug, Serialize)]
pub struct Snapshot<'a> {
    pub grid: &'a Grid,
    pub player: &'a Player,
    pub enemies: &'a [Enemy],
    pub fires: Vec<FireView<'a>>,
    pub rocks: &'a [Rock],
    pub particles: &'a [Particle],
    pub pump: Option<Pump>,
    /// Fraction of the way to the next inflation stage
    pub pump_progress: f32,
    pub phase: GamePhase,
    pub score: u64,
    pub lives: u8,
    pub level: u32,
    pub round_paused: bool,
    pub pause_timer: f32,
    pub transition_timer: f32,
    pub screen_shake: f32,
    pub events: &'a [GameEvent],
}

impl GameState {
    pub fn snapshot(&self) -> Snapshot<'_> {
        let now = self.clock;
        let fires = self
            .fires
            .iter()
            .map(|fire| FireView {
                fire,
                range: fire_range(fire.age(now), &self.tuning),
                tiles: fire_tiles(fire, now, &self.grid, &self.tuning),
            })
            .collect();

        Snapshot {
            grid: &self.grid,
            player: &self.player,
            enemies: &self.enemies,
            fires,
            rocks: &self.rocks,
            particles: &self.particles,
            pump: self.pump,
            pump_progress: self
                .pump
                .map_or(0.0, |pump| pump.inflation_progress(&self.tuning)),
            phase: self.phase,
            score: self.score,
            lives: self.lives,
            level: self.level,
            round_paused: self.round_paused,
            pause_timer: self.pause_timer,
            transition_timer: self.transition_timer,
            screen_shake: self.screen_shake,
            events: &self.events,
        }
    }
}
