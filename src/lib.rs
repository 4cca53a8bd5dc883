//! Dig Rush - a tile-based tunnel-digging arcade game
//!
//! Core modules:
//! - `sim`: Deterministic simulation (grid, enemies, hazards, combat, rounds)
//! - `tuning`: Data-driven game balance

pub mod sim;
pub mod tuning;

pub use tuning::{Tuning, TuningError};

/// Game configuration constants
pub mod consts {
    /// Grid width in tiles
    pub const GRID_WIDTH: i32 = 14;
    /// Grid height in tiles (dirt area only)
    pub const GRID_HEIGHT: i32 = 15;

    /// Player spawn tile
    pub const PLAYER_SPAWN_X: i32 = 7;
    pub const PLAYER_SPAWN_Y: i32 = 3;

    /// Fixed timestep used by the headless driver (60 Hz)
    pub const SIM_DT: f32 = 1.0 / 60.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;
}
