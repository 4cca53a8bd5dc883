//! Enemy route selection
//!
//! Enemies follow carved tunnels toward the player by default. When the
//! tunnel route is much slower than burrowing straight through the dirt (or
//! there is no tunnel route at all), they switch to "ghost mode" and head
//! diagonally through the dirt toward a tunnel tile near the player.

use std::collections::VecDeque;

use rand::Rng;

use super::grid::{Cell, Direction, Grid};
use super::state::Enemy;
use crate::consts::{GRID_HEIGHT, GRID_WIDTH};
use crate::tuning::Tuning;

/// One movement decision: the facing to adopt and the adjacent tile to enter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Step {
    pub facing: Direction,
    pub to: Cell,
}

/// Pick the next tile for an enemy that is standing still on `enemy.cell`.
///
/// May set or clear `enemy.ghost_target`. Returns `None` only when no legal
/// neighbour exists.
pub fn choose_direction<R: Rng>(
    enemy: &mut Enemy,
    grid: &Grid,
    player: Cell,
    rng: &mut R,
    tuning: &Tuning,
) -> Option<Step> {
    debug_assert!(grid.contains(enemy.cell));

    if grid.has_dirt(enemy.cell) || enemy.ghost_target.is_some() {
        if let Some(step) = ghost_step(enemy, grid, player, tuning) {
            return Some(step);
        }
    }

    tunnel_step(enemy, grid, player, rng, tuning)
}

/// Straight-line step through the dirt toward the ghost target.
///
/// Returns `None` (after clearing the target) when the enemy should fall back
/// to tunnel evaluation this same tick.
fn ghost_step(enemy: &mut Enemy, grid: &Grid, player: Cell, tuning: &Tuning) -> Option<Step> {
    let on_dirt = grid.has_dirt(enemy.cell);

    let target = match enemy.ghost_target {
        Some(target) if target == enemy.cell => {
            enemy.ghost_target = None;
            return None;
        }
        Some(_) if !on_dirt => {
            log::debug!("Enemy {} surfaced in a tunnel at {:?}", enemy.id, enemy.cell);
            enemy.ghost_target = None;
            return None;
        }
        Some(target) => target,
        None => {
            let target = find_ghost_target(grid, enemy.cell, player, tuning.ghost_search_radius);
            if target == enemy.cell {
                return None;
            }
            enemy.ghost_target = Some(target);
            target
        }
    };

    step_toward(enemy.cell, target)
}

/// Greedy step to the in-bounds neighbour nearest the player (random
/// tie-break), possibly switching into ghost mode instead.
fn tunnel_step<R: Rng>(
    enemy: &mut Enemy,
    grid: &Grid,
    player: Cell,
    rng: &mut R,
    tuning: &Tuning,
) -> Option<Step> {
    let neighbors: Vec<(Direction, Cell)> = grid.neighbors(enemy.cell).collect();
    let best_distance = neighbors
        .iter()
        .map(|&(_, cell)| cell.manhattan(player))
        .min()?;
    let best: Vec<(Direction, Cell)> = neighbors
        .iter()
        .copied()
        .filter(|&(_, cell)| cell.manhattan(player) == best_distance)
        .collect();
    let (facing, to) = best[rng.random_range(0..best.len())];

    if enemy.cell != player && should_ghost(enemy, grid, player, tuning) {
        if let Some(step) = enter_ghost_mode(enemy, grid, player, tuning) {
            return Some(step);
        }
    }

    Some(Step { facing, to })
}

/// Compare estimated travel time through tunnels against burrowing directly.
fn should_ghost(enemy: &Enemy, grid: &Grid, player: Cell, tuning: &Tuning) -> bool {
    let tunnel_time = match tunnel_distance(grid, enemy.cell, player, tuning.bfs_max_distance) {
        Some(distance) => distance as f32 / enemy.speed,
        None => f32::INFINITY,
    };
    let dirt_time = enemy.cell.chebyshev(player) as f32 / tuning.dirt_speed;
    dirt_time <= tuning.ghost_threshold * tunnel_time
}

/// Commit to ghost mode: step into the adjacent dirt tile nearest the player
/// and aim for a tunnel near them.
fn enter_ghost_mode(enemy: &mut Enemy, grid: &Grid, player: Cell, tuning: &Tuning) -> Option<Step> {
    let (facing, to) = grid
        .neighbors(enemy.cell)
        .filter(|&(_, cell)| grid.has_dirt(cell))
        .min_by_key(|&(_, cell)| cell.manhattan(player))?;

    let target = find_ghost_target(grid, enemy.cell, player, tuning.ghost_search_radius);
    log::debug!(
        "Enemy {} entering ghost mode at {:?} toward {:?}",
        enemy.id,
        enemy.cell,
        target
    );
    enemy.ghost_target = Some(target);
    Some(Step { facing, to })
}

/// Nearest (to `from`) tunnel tile on the smallest Manhattan ring around the
/// player that contains one, searching radius 1..=`max_radius`. Falls back to
/// the player's own tile.
pub fn find_ghost_target(grid: &Grid, from: Cell, player: Cell, max_radius: i32) -> Cell {
    for radius in 1..=max_radius {
        let nearest = ring(player, radius)
            .filter(|&cell| grid.contains(cell) && grid.is_tunnel(cell))
            .min_by_key(|&cell| (cell.manhattan(from), cell.y, cell.x));
        if let Some(cell) = nearest {
            return cell;
        }
    }
    player
}

/// Cells at exactly Manhattan distance `radius` from `center` (unfiltered)
fn ring(center: Cell, radius: i32) -> impl Iterator<Item = Cell> {
    (-radius..=radius).flat_map(move |dx| {
        let rest = radius - dx.abs();
        let dys = if rest == 0 { vec![0] } else { vec![-rest, rest] };
        dys.into_iter().map(move |dy| center.offset(dx, dy))
    })
}

/// Breadth-first search over tunnel tiles from `start` to `goal`.
///
/// Returns the step count, or `None` if the goal is unreachable within
/// `max_distance` steps. The goal itself need not be a tunnel tile.
pub fn tunnel_distance(grid: &Grid, start: Cell, goal: Cell, max_distance: u32) -> Option<u32> {
    if start == goal {
        return Some(0);
    }
    if !grid.contains(start) || !grid.contains(goal) {
        return None;
    }

    let index = |cell: Cell| (cell.y * GRID_WIDTH + cell.x) as usize;
    let mut visited = vec![false; (GRID_WIDTH * GRID_HEIGHT) as usize];
    let mut queue = VecDeque::new();
    visited[index(start)] = true;
    queue.push_back((start, 0u32));

    while let Some((cell, distance)) = queue.pop_front() {
        if distance >= max_distance {
            continue;
        }
        for (_, next) in grid.neighbors(cell) {
            if visited[index(next)] {
                continue;
            }
            if next == goal {
                return Some(distance + 1);
            }
            if grid.has_dirt(next) {
                continue;
            }
            visited[index(next)] = true;
            queue.push_back((next, distance + 1));
        }
    }

    None
}

/// 8-directional unit step from `from` toward `to`
pub fn step_toward(from: Cell, to: Cell) -> Option<Step> {
    let dx = (to.x - from.x).signum();
    let dy = (to.y - from.y).signum();
    let facing = match (dx, dy) {
        (0, 0) => return None,
        (1, _) => Direction::Right,
        (-1, _) => Direction::Left,
        (_, 1) => Direction::Down,
        _ => Direction::Up,
    };
    Some(Step {
        facing,
        to: from.offset(dx, dy),
    })
}
