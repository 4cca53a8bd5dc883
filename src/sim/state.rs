//! Game state and core simulation types
//!
//! `GameState` is the simulation context: it owns the grid, every entity
//! collection, the seeded RNG and the tuning, and is passed explicitly into
//! each update phase.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::grid::{Cell, Direction, Grid};
use crate::consts::{PLAYER_SPAWN_X, PLAYER_SPAWN_Y};
use crate::tuning::Tuning;

/// Player spawn tile
pub const PLAYER_SPAWN: Cell = Cell::new(PLAYER_SPAWN_X, PLAYER_SPAWN_Y);

/// Maximum number of live particles
pub const MAX_PARTICLES: usize = 256;

/// Current phase of the game
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Active gameplay (possibly inside the start-of-round pause)
    Playing,
    /// All enemies defeated, waiting out the transition timer
    LevelComplete,
    /// Out of lives; only a restart leaves this phase
    GameOver,
}

/// Something that happened during a tick, for audio/renderer hooks
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    Dug { cell: Cell },
    FireStarted { enemy: u32 },
    PumpAttached { enemy: u32 },
    FireInterrupted { enemy: u32 },
    EnemyPopped { enemy: u32 },
    EnemyCrushed { enemy: u32, rock: u32 },
    RockFalling { rock: u32 },
    LifeLost { lives_left: u8 },
    LevelComplete { level: u32 },
    LevelStarted { level: u32 },
    GameOver { score: u64 },
    Restarted,
}

/// The player character
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    /// Logical tile (jumps on arrival)
    pub cell: Cell,
    /// Smoothly interpolated position for rendering
    pub render_pos: Vec2,
    /// Tile being moved toward (equals `cell` when idle)
    pub target: Cell,
    pub facing: Direction,
    pub moving: bool,
    pub speed: f32,
}

impl Player {
    pub fn new(speed: f32) -> Self {
        Self {
            cell: PLAYER_SPAWN,
            render_pos: PLAYER_SPAWN.as_vec2(),
            target: PLAYER_SPAWN,
            facing: Direction::Down,
            moving: false,
            speed,
        }
    }

    /// Put the player back on the spawn tile, idle and facing down
    pub fn reset_to_spawn(&mut self) {
        *self = Self::new(self.speed);
    }
}

/// Enemy types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EnemyKind {
    Pooka,
    Fygar,
}

impl EnemyKind {
    /// Unscaled tunnel speed for this type
    pub fn tunnel_speed(self, tuning: &Tuning) -> f32 {
        match self {
            EnemyKind::Pooka => tuning.pooka_tunnel_speed,
            EnemyKind::Fygar => tuning.fygar_tunnel_speed,
        }
    }

    /// Particle palette index
    pub fn color(self) -> u32 {
        match self {
            EnemyKind::Pooka => 0,
            EnemyKind::Fygar => 1,
        }
    }
}

/// A roaming enemy
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Enemy {
    pub id: u32,
    pub kind: EnemyKind,
    pub cell: Cell,
    pub render_pos: Vec2,
    pub target: Cell,
    /// Where this enemy returns after the player loses a life
    pub spawn: Cell,
    pub facing: Direction,
    /// Level-scaled tunnel speed before any aggression boost
    pub base_speed: f32,
    /// Current tunnel speed
    pub speed: f32,
    /// Tunnel tile being burrowed toward while ghosting through dirt
    pub ghost_target: Option<Cell>,
    /// 0 = normal size; pops at the tuning's max inflation
    pub inflation: u8,
    pub deflate_timer: f32,
    pub alive_time: f32,
    pub boosted: bool,
    /// Simulation clock value of the last fire breath
    pub last_fire_time: f32,
    pub firing: bool,
    pub moving: bool,
    pub in_dirt: bool,
}

impl Enemy {
    pub fn new(id: u32, kind: EnemyKind, cell: Cell, speed: f32, now: f32) -> Self {
        Self {
            id,
            kind,
            cell,
            render_pos: cell.as_vec2(),
            target: cell,
            spawn: cell,
            facing: Direction::Down,
            base_speed: speed,
            speed,
            ghost_target: None,
            inflation: 0,
            deflate_timer: 0.0,
            alive_time: 0.0,
            boosted: false,
            last_fire_time: now,
            firing: false,
            moving: false,
            in_dirt: false,
        }
    }

    /// Return to the spawn tile with a fresh state (after a life is lost)
    pub fn reset_to_spawn(&mut self, now: f32) {
        let spawn = self.spawn;
        *self = Self::new(self.id, self.kind, spawn, self.base_speed, now);
    }
}

/// A Fygar's fire breath
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Fire {
    pub id: u32,
    /// Tile of the Fygar when it fired; flames start one tile beyond
    pub origin: Cell,
    pub direction: Direction,
    pub created_at: f32,
    pub duration: f32,
    pub owner: Option<u32>,
}

impl Fire {
    pub fn age(&self, now: f32) -> f32 {
        now - self.created_at
    }

    pub fn is_active(&self, now: f32) -> bool {
        self.age(now) < self.duration
    }
}

/// Rock lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum RockState {
    /// Resting on dirt or the bottom row
    Stable,
    /// Support is gone; shaking before the drop
    Wobbling { timer: f32 },
    /// Dropping at `speed` tiles per second
    Falling { speed: f32 },
    /// Hit bottom this tick; removed after the collision pass
    Landed,
}

/// A rock embedded in the dirt
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Rock {
    pub id: u32,
    pub x: i32,
    /// Continuous row (falls fractionally)
    pub y: f32,
    /// Row the rock occupied at the start of its latest update. A fall
    /// sweeps every row from here down to its current row.
    pub swept_from: i32,
    pub state: RockState,
}

impl Rock {
    pub fn new(id: u32, cell: Cell) -> Self {
        Self {
            id,
            x: cell.x,
            y: cell.y as f32,
            swept_from: cell.y,
            state: RockState::Stable,
        }
    }

    /// Tile the rock currently occupies
    pub fn cell(&self) -> Cell {
        Cell::new(self.x, self.y.floor() as i32)
    }

    /// Whether `cell` lies in the column span the rock covered this tick
    pub fn sweeps(&self, cell: Cell) -> bool {
        cell.x == self.x && (self.swept_from..=self.cell().y).contains(&cell.y)
    }

    /// Whether the rock can crush things this tick
    pub fn is_dangerous(&self) -> bool {
        matches!(self.state, RockState::Falling { .. } | RockState::Landed)
    }
}

/// The player's pump
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Pump {
    /// Hose attached to an enemy, inflating it while the key is held
    Attached {
        target: u32,
        /// Time accumulated toward the next inflation stage
        timer: f32,
        key_held: bool,
    },
    /// Missed shot, shown briefly
    Visual { timer: f32 },
}

impl Pump {
    pub fn target(&self) -> Option<u32> {
        match *self {
            Pump::Attached { target, .. } => Some(target),
            Pump::Visual { .. } => None,
        }
    }

    /// Fraction of the way to the next inflation stage (0..1)
    pub fn inflation_progress(&self, tuning: &Tuning) -> f32 {
        match *self {
            Pump::Attached { timer, .. } => (timer / tuning.inflate_interval).clamp(0.0, 1.0),
            Pump::Visual { .. } => 0.0,
        }
    }
}

/// A particle for visual effects
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Particle {
    pub pos: Vec2,
    pub vel: Vec2,
    pub color: u32,
    pub life: f32,
    pub max_life: f32,
}

/// Complete game state (deterministic, serializable)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameState {
    /// Run seed for reproducibility
    pub seed: u64,
    pub tuning: Tuning,
    pub rng: Pcg32,
    pub grid: Grid,
    pub player: Player,
    /// Sorted by id
    pub enemies: Vec<Enemy>,
    pub fires: Vec<Fire>,
    pub rocks: Vec<Rock>,
    /// Visual particles (not gameplay-affecting)
    #[serde(skip)]
    pub particles: Vec<Particle>,
    pub pump: Option<Pump>,
    pub phase: GamePhase,
    /// Start-of-round freeze
    pub round_paused: bool,
    pub pause_timer: f32,
    pub transition_timer: f32,
    /// 1-based
    pub level: u32,
    pub lives: u8,
    pub score: u64,
    /// Simulation clock; advances only while gameplay runs
    pub clock: f32,
    pub screen_shake: f32,
    /// Events raised during the most recent tick
    #[serde(skip)]
    pub events: Vec<GameEvent>,
    /// Next entity ID
    next_id: u32,
}

impl GameState {
    /// Create a new game at level 1 with default tuning
    pub fn new(seed: u64) -> Self {
        Self::with_tuning(seed, Tuning::default())
    }

    /// Create a new game at level 1
    pub fn with_tuning(seed: u64, tuning: Tuning) -> Self {
        let mut state = Self::empty(seed, tuning);
        super::level::start_level(&mut state);
        log::info!("Game initialized with seed: {}", seed);
        state
    }

    /// Level-1 state with no enemies or rocks and a full grid
    pub(crate) fn empty(seed: u64, tuning: Tuning) -> Self {
        Self {
            seed,
            rng: Pcg32::seed_from_u64(seed),
            grid: Grid::new(),
            player: Player::new(tuning.player_speed),
            enemies: Vec::new(),
            fires: Vec::new(),
            rocks: Vec::new(),
            particles: Vec::new(),
            pump: None,
            phase: GamePhase::Playing,
            round_paused: true,
            pause_timer: 0.0,
            transition_timer: 0.0,
            level: 1,
            lives: tuning.starting_lives,
            score: 0,
            clock: 0.0,
            screen_shake: 0.0,
            events: Vec::new(),
            next_id: 1,
            tuning,
        }
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    pub fn enemy(&self, id: u32) -> Option<&Enemy> {
        self.enemies.iter().find(|e| e.id == id)
    }

    pub fn enemy_mut(&mut self, id: u32) -> Option<&mut Enemy> {
        self.enemies.iter_mut().find(|e| e.id == id)
    }

    /// Remove an enemy, dropping any fire it owns and a pump attached to it
    pub fn remove_enemy(&mut self, id: u32) -> Option<Enemy> {
        let idx = self.enemies.iter().position(|e| e.id == id)?;
        self.fires.retain(|f| f.owner != Some(id));
        if self.pump.and_then(|p| p.target()) == Some(id) {
            self.pump = None;
        }
        Some(self.enemies.remove(idx))
    }

    /// Whether a pump is currently attached to this enemy
    pub fn is_pumped(&self, id: u32) -> bool {
        self.pump.and_then(|p| p.target()) == Some(id)
    }

    /// Add points (score only ever increases)
    pub fn award(&mut self, points: u64) {
        self.score = self.score.saturating_add(points);
    }

    pub fn add_screen_shake(&mut self, amount: f32) {
        self.screen_shake = (self.screen_shake + amount).min(1.0);
    }

    pub fn emit(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    /// Explode a ring of particles from a tile
    pub fn spawn_burst(&mut self, cell: Cell, color: u32) {
        let count = self.tuning.particle_burst;
        let life = self.tuning.particle_life;
        let center = cell.as_vec2() + Vec2::splat(0.5);
        for i in 0..count {
            if self.particles.len() >= MAX_PARTICLES {
                // Remove oldest particles to make room
                self.particles.remove(0);
            }
            let base_angle = std::f32::consts::TAU * (i as f32 / count.max(1) as f32);
            let jitter: f32 = self.rng.random_range(-0.3..0.3);
            let speed: f32 = self.rng.random_range(2.0..5.0);
            let angle = base_angle + jitter;
            self.particles.push(Particle {
                pos: center,
                vel: Vec2::new(angle.cos(), angle.sin()) * speed,
                color,
                life,
                max_life: life,
            });
        }
    }

    /// Ensure collections are sorted by ID for deterministic iteration
    pub fn normalize_order(&mut self) {
        self.enemies.sort_by_key(|e| e.id);
        self.fires.sort_by_key(|f| f.id);
        self.rocks.sort_by_key(|r| r.id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_game_defaults() {
        let state = GameState::new(7);
        assert_eq!(state.level, 1);
        assert_eq!(state.lives, 3);
        assert_eq!(state.score, 0);
        assert_eq!(state.phase, GamePhase::Playing);
        assert!(state.round_paused);
        assert_eq!(state.player.cell, PLAYER_SPAWN);
        assert!(!state.grid.has_dirt(PLAYER_SPAWN));
        assert!(!state.enemies.is_empty());
    }

    #[test]
    fn test_remove_enemy_drops_owned_fire_and_pump() {
        let mut state = GameState::empty(1, Tuning::default());
        let id = state.next_entity_id();
        state
            .enemies
            .push(Enemy::new(id, EnemyKind::Fygar, Cell::new(2, 2), 1.5, 0.0));
        let fire_id = state.next_entity_id();
        state.fires.push(Fire {
            id: fire_id,
            origin: Cell::new(2, 2),
            direction: Direction::Right,
            created_at: 0.0,
            duration: 1.5,
            owner: Some(id),
        });
        state.pump = Some(Pump::Attached {
            target: id,
            timer: 0.0,
            key_held: true,
        });

        assert!(state.remove_enemy(id).is_some());
        assert!(state.enemies.is_empty());
        assert!(state.fires.is_empty());
        assert!(state.pump.is_none());
        assert!(state.remove_enemy(id).is_none());
    }

    #[test]
    fn test_enemy_reset_keeps_identity() {
        let mut enemy = Enemy::new(4, EnemyKind::Pooka, Cell::new(5, 9), 2.2, 0.0);
        enemy.cell = Cell::new(6, 9);
        enemy.inflation = 2;
        enemy.boosted = true;
        enemy.speed = 9.0;
        enemy.ghost_target = Some(Cell::new(1, 1));
        enemy.reset_to_spawn(12.0);
        assert_eq!(enemy.id, 4);
        assert_eq!(enemy.cell, Cell::new(5, 9));
        assert_eq!(enemy.inflation, 0);
        assert!(!enemy.boosted);
        assert_eq!(enemy.speed, 2.2);
        assert_eq!(enemy.ghost_target, None);
        assert_eq!(enemy.last_fire_time, 12.0);
    }

    #[test]
    fn test_particle_pool_is_bounded() {
        let mut state = GameState::empty(3, Tuning::default());
        for _ in 0..100 {
            state.spawn_burst(Cell::new(3, 3), 0);
        }
        assert!(state.particles.len() <= MAX_PARTICLES);
    }

    #[test]
    fn test_score_saturates() {
        let mut state = GameState::empty(3, Tuning::default());
        state.score = u64::MAX - 1;
        state.award(10);
        assert_eq!(state.score, u64::MAX);
    }
}
