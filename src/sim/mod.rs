//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Stable iteration order (by entity ID)
//! - No rendering or platform dependencies

pub mod collision;
pub mod enemy;
pub mod fire;
pub mod grid;
pub mod level;
pub mod pathing;
pub mod player;
pub mod pump;
pub mod rock;
pub mod snapshot;
pub mod state;
pub mod tick;

pub use fire::fire_range;
pub use grid::{Cell, Direction, Grid};
pub use level::{advance_level, restart};
pub use snapshot::{FireView, Snapshot};
pub use state::{
    Enemy, EnemyKind, Fire, GameEvent, GamePhase, GameState, MAX_PARTICLES, PLAYER_SPAWN,
    Particle, Player, Pump, Rock, RockState,
};
pub use tick::{PIPELINE, Phase, TickInput, tick};
