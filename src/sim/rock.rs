//! Rock gravity
//!
//! `Stable -> Wobbling -> Falling -> Landed`, never backwards. Landed rocks
//! stay in the world until the collision pass has seen them, then
//! [`remove_landed`] drops them.

use super::grid::{Cell, Grid};
use super::state::{GameEvent, GameState, Rock, RockState};
use crate::consts::GRID_HEIGHT;
use crate::tuning::Tuning;

/// Whether a rock sitting on row `y` of column `x` is held up
pub fn is_supported(grid: &Grid, x: i32, y: i32) -> bool {
    if y >= GRID_HEIGHT - 1 {
        return true;
    }
    grid.has_dirt(Cell::new(x, y + 1))
}

/// Advance one rock. Returns true if it started falling this tick.
pub fn update_rock(rock: &mut Rock, grid: &Grid, tuning: &Tuning, dt: f32) -> bool {
    rock.swept_from = rock.cell().y;
    match rock.state {
        RockState::Stable => {
            if !is_supported(grid, rock.x, rock.y.floor() as i32) {
                rock.state = RockState::Wobbling { timer: 0.0 };
            }
            false
        }
        RockState::Wobbling { timer } => {
            let timer = timer + dt;
            if timer >= tuning.rock_wobble {
                rock.state = RockState::Falling {
                    speed: tuning.rock_fall_speed,
                };
                true
            } else {
                rock.state = RockState::Wobbling { timer };
                false
            }
        }
        RockState::Falling { speed } => {
            let next_y = rock.y + speed * dt;
            let end_row = next_y.floor() as i32;
            // Walk every row crossed so a long step cannot tunnel through dirt
            for row in rock.cell().y..=end_row {
                if row >= GRID_HEIGHT - 1 || grid.has_dirt(Cell::new(rock.x, row + 1)) {
                    rock.y = row.min(GRID_HEIGHT - 1) as f32;
                    rock.state = RockState::Landed;
                    return false;
                }
            }
            rock.y = next_y;
            false
        }
        RockState::Landed => false,
    }
}

/// Physics pass over every rock
pub fn update_rocks(state: &mut GameState, dt: f32) {
    let mut started = Vec::new();
    for rock in state.rocks.iter_mut() {
        if update_rock(rock, &state.grid, &state.tuning, dt) {
            started.push(rock.id);
        }
    }
    for rock in started {
        log::debug!("Rock {} is falling", rock);
        state.emit(GameEvent::RockFalling { rock });
    }
}

/// Drop rocks whose landing has been collision-checked
pub fn remove_landed(state: &mut GameState) {
    state.rocks.retain(|rock| rock.state != RockState::Landed);
}
