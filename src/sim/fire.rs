//! Fygar fire breath
//!
//! A breath runs through four back-to-back phases: a harmless warning, a
//! one-tile grow, a two-tile full blast and a one-tile shrink. It is removed
//! once its age passes the total duration.

use rand::Rng;

use super::grid::{Cell, Direction, Grid};
use super::state::{Enemy, EnemyKind, Fire, GameState};
use crate::tuning::Tuning;

/// Hazard reach (in tiles) of a fire of the given age
pub fn fire_range(age: f32, tuning: &Tuning) -> u8 {
    let grow_end = tuning.fire_warning + tuning.fire_grow;
    let full_end = grow_end + tuning.fire_full;
    let shrink_end = full_end + tuning.fire_shrink;

    if age < tuning.fire_warning {
        0
    } else if age < grow_end {
        1
    } else if age < full_end {
        2
    } else if age < shrink_end {
        1
    } else {
        0
    }
}

/// In-bounds tiles currently covered by flames
pub fn fire_tiles(fire: &Fire, now: f32, grid: &Grid, tuning: &Tuning) -> Vec<Cell> {
    let range = fire_range(fire.age(now), tuning) as i32;
    (1..=range)
        .map(|distance| fire.origin.step(fire.direction, distance))
        .filter(|&cell| grid.contains(cell))
        .collect()
}

/// Whether the flames reach `target` this instant
pub fn fire_hits(fire: &Fire, now: f32, target: Cell, tuning: &Tuning) -> bool {
    let range = fire_range(fire.age(now), tuning) as i32;
    (1..=range).any(|distance| fire.origin.step(fire.direction, distance) == target)
}

/// Deterministic part of the breath gate (everything except the dice roll)
pub fn can_breathe(
    enemy: &Enemy,
    grid: &Grid,
    player: Cell,
    pumped: bool,
    now: f32,
    tuning: &Tuning,
) -> bool {
    if enemy.kind != EnemyKind::Fygar || pumped || enemy.firing {
        return false;
    }
    if grid.has_dirt(enemy.cell) {
        return false;
    }
    if now - enemy.last_fire_time < tuning.fire_cooldown {
        return false;
    }
    if enemy.cell.y != player.y || (enemy.cell.x - player.x).abs() > tuning.fire_distance {
        return false;
    }
    match enemy.facing {
        Direction::Left => enemy.cell.x > player.x,
        Direction::Right => enemy.cell.x < player.x,
        Direction::Up | Direction::Down => false,
    }
}

/// Roll for a breath; on success stamp the enemy and return the origin and
/// direction of the new fire.
pub fn try_breathe<R: Rng>(
    enemy: &mut Enemy,
    grid: &Grid,
    player: Cell,
    pumped: bool,
    now: f32,
    rng: &mut R,
    tuning: &Tuning,
) -> Option<(Cell, Direction)> {
    if !can_breathe(enemy, grid, player, pumped, now, tuning) {
        return None;
    }
    if !rng.random_bool(tuning.fire_probability) {
        return None;
    }
    enemy.last_fire_time = now;
    enemy.firing = true;
    log::debug!(
        "Fygar {} breathing fire at {:?} facing {:?}",
        enemy.id,
        enemy.cell,
        enemy.facing
    );
    Some((enemy.cell, enemy.facing))
}

/// Drop fires that have outlived their duration
pub fn update_fires(state: &mut GameState) {
    let now = state.clock;
    state.fires.retain(|fire| fire.is_active(now));
}
