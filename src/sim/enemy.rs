//! Per-enemy state machine
//!
//! Each tick an enemy ages, re-samples whether it stands in dirt, deflates if
//! nobody is pumping it, (Fygar only) tracks or starts a fire breath, and
//! finally moves unless firing, pumped or inflated.

use super::fire::try_breathe;
use super::grid::{Cell, Direction};
use super::pathing::choose_direction;
use super::player::approach;
use super::state::{Enemy, EnemyKind, Fire, GameEvent, GameState};
use crate::tuning::Tuning;

/// Advance timers that run regardless of movement
pub fn update_timers(enemy: &mut Enemy, pumped: bool, tuning: &Tuning, dt: f32) {
    enemy.alive_time += dt;
    if !enemy.boosted && enemy.alive_time >= tuning.aggression_time {
        enemy.speed *= tuning.aggression_multiplier;
        enemy.boosted = true;
        log::debug!("Enemy {} turned aggressive (speed {:.2})", enemy.id, enemy.speed);
    }

    if pumped || enemy.inflation == 0 {
        enemy.deflate_timer = 0.0;
        return;
    }
    enemy.deflate_timer += dt;
    if enemy.deflate_timer >= tuning.deflate_interval {
        enemy.inflation -= 1;
        enemy.deflate_timer = 0.0;
    }
}

/// Whether the enemy is allowed to move this tick
pub fn can_move(enemy: &Enemy, pumped: bool) -> bool {
    !enemy.firing && !pumped && enemy.inflation == 0
}

/// Update every enemy in id order.
pub fn update_enemies(state: &mut GameState, dt: f32) {
    let now = state.clock;
    let pumped_id = state.pump.and_then(|p| p.target());
    let mut breaths: Vec<(u32, Cell, Direction)> = Vec::new();

    {
        let GameState {
            enemies,
            grid,
            player,
            fires,
            rng,
            tuning,
            ..
        } = state;
        let player_cell = player.cell;

        for enemy in enemies.iter_mut() {
            let pumped = pumped_id == Some(enemy.id);
            update_timers(enemy, pumped, tuning, dt);
            enemy.in_dirt = grid.has_dirt(enemy.cell);

            if enemy.kind == EnemyKind::Fygar {
                let id = enemy.id;
                enemy.firing = fires
                    .iter()
                    .any(|fire| fire.owner == Some(id) && fire.is_active(now));
                if !enemy.firing {
                    if let Some((origin, dir)) =
                        try_breathe(enemy, grid, player_cell, pumped, now, rng, tuning)
                    {
                        breaths.push((id, origin, dir));
                    }
                }
            }

            if !can_move(enemy, pumped) {
                continue;
            }

            if enemy.moving {
                let speed = if enemy.in_dirt {
                    tuning.dirt_speed
                } else {
                    enemy.speed
                };
                if approach(&mut enemy.render_pos, enemy.target, speed * dt) {
                    enemy.cell = enemy.target;
                    enemy.moving = false;
                }
            }

            if !enemy.moving {
                if let Some(step) = choose_direction(enemy, grid, player_cell, rng, tuning) {
                    enemy.facing = step.facing;
                    if grid.contains(step.to) {
                        enemy.target = step.to;
                        enemy.moving = true;
                    }
                }
            }
        }
    }

    let duration = state.tuning.fire_duration();
    for (owner, origin, direction) in breaths {
        let id = state.next_entity_id();
        state.fires.push(Fire {
            id,
            origin,
            direction,
            created_at: now,
            duration,
            owner: Some(owner),
        });
        state.emit(GameEvent::FireStarted { enemy: owner });
    }
}
