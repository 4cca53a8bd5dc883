//! Pump combat
//!
//! Firing the pump hooks the first reachable enemy in front of the player.
//! Holding the key inflates it one stage per interval until it pops; letting
//! go frees it to deflate on its own.

use super::state::{GameEvent, GameState, Pump};

/// Find the pump target: first enemy within range along the player's facing
/// that is standing in a tunnel. Enemies in dirt are skipped over.
pub fn find_target(state: &GameState) -> Option<u32> {
    let origin = state.player.cell;
    let facing = state.player.facing;
    for distance in 1..=state.tuning.pump_range {
        let cell = origin.step(facing, distance);
        if !state.grid.contains(cell) {
            break;
        }
        let hit = state
            .enemies
            .iter()
            .find(|e| e.cell == cell && !state.grid.has_dirt(e.cell));
        if let Some(enemy) = hit {
            return Some(enemy.id);
        }
    }
    None
}

/// Handle a fire-pump press
pub fn trigger_pump(state: &mut GameState) {
    if state.round_paused || state.pump.is_some() {
        return;
    }

    let Some(target) = find_target(state) else {
        state.pump = Some(Pump::Visual {
            timer: state.tuning.pump_visual_time,
        });
        return;
    };

    // Pumping a Fygar cuts its breath short
    let was_firing = state.enemy(target).is_some_and(|e| e.firing);
    if was_firing {
        state.fires.retain(|f| f.owner != Some(target));
        if let Some(enemy) = state.enemy_mut(target) {
            enemy.firing = false;
        }
        state.emit(GameEvent::FireInterrupted { enemy: target });
    }

    log::debug!("Pump attached to enemy {}", target);
    state.pump = Some(Pump::Attached {
        target,
        timer: 0.0,
        key_held: true,
    });
    state.emit(GameEvent::PumpAttached { enemy: target });
}

/// Advance the pump: count down a miss, or inflate the hooked enemy
pub fn update_pump(state: &mut GameState, held: bool, dt: f32) {
    let Some(pump) = state.pump else {
        return;
    };

    match pump {
        Pump::Visual { timer } => {
            let timer = timer - dt;
            state.pump = (timer > 0.0).then_some(Pump::Visual { timer });
        }
        Pump::Attached { target, timer, .. } => {
            if state.enemy(target).is_none() || !held {
                state.pump = None;
                return;
            }

            let interval = state.tuning.inflate_interval;
            let max = state.tuning.max_inflation;
            let mut timer = timer + dt;
            let mut popped = false;
            if let Some(enemy) = state.enemy_mut(target) {
                while timer >= interval {
                    timer -= interval;
                    enemy.inflation = (enemy.inflation + 1).min(max);
                    if enemy.inflation >= max {
                        popped = true;
                        break;
                    }
                }
            }

            if popped {
                pop_enemy(state, target);
            } else {
                state.pump = Some(Pump::Attached {
                    target,
                    timer,
                    key_held: held,
                });
            }
        }
    }
}

/// Fully inflated: burst, score, remove
fn pop_enemy(state: &mut GameState, id: u32) {
    let Some(enemy) = state.remove_enemy(id) else {
        return;
    };
    log::debug!("Enemy {} popped at {:?}", id, enemy.cell);
    state.spawn_burst(enemy.cell, enemy.kind.color());
    let points = state.tuning.pump_points;
    state.award(points);
    state.pump = None;
    state.emit(GameEvent::EnemyPopped { enemy: id });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::grid::{Cell, Direction};
    use crate::sim::state::{Enemy, EnemyKind, Fire};
    use crate::tuning::Tuning;

    /// Player at (3,5) facing right down a carved row
    fn arena() -> GameState {
        let mut state = GameState::empty(4, Tuning::default());
        for x in 0..14 {
            state.grid.clear(Cell::new(x, 5));
        }
        state.round_paused = false;
        state.player.cell = Cell::new(3, 5);
        state.player.target = Cell::new(3, 5);
        state.player.facing = Direction::Right;
        state
    }

    fn add_enemy(state: &mut GameState, kind: EnemyKind, cell: Cell) -> u32 {
        let id = state.next_entity_id();
        state.enemies.push(Enemy::new(id, kind, cell, 2.0, 0.0));
        id
    }

    #[test]
    fn test_miss_shows_briefly() {
        let mut state = arena();
        trigger_pump(&mut state);
        assert!(matches!(state.pump, Some(Pump::Visual { .. })));
        update_pump(&mut state, true, 0.1);
        assert!(state.pump.is_some());
        update_pump(&mut state, true, 0.5);
        assert!(state.pump.is_none());
    }

    #[test]
    fn test_ignored_while_paused_or_busy() {
        let mut state = arena();
        add_enemy(&mut state, EnemyKind::Pooka, Cell::new(4, 5));
        state.round_paused = true;
        trigger_pump(&mut state);
        assert!(state.pump.is_none());

        state.round_paused = false;
        state.pump = Some(Pump::Visual { timer: 0.2 });
        trigger_pump(&mut state);
        assert!(matches!(state.pump, Some(Pump::Visual { .. })));
    }

    #[test]
    fn test_targets_past_buried_enemy() {
        let mut state = arena();
        let buried = add_enemy(&mut state, EnemyKind::Pooka, Cell::new(4, 5));
        let open = add_enemy(&mut state, EnemyKind::Pooka, Cell::new(5, 5));
        // Refill the first tile so that enemy is in dirt
        state.grid = {
            let mut grid = state.grid.clone();
            grid.reset_full();
            for x in 5..14 {
                grid.clear(Cell::new(x, 5));
            }
            grid.clear(Cell::new(3, 5));
            grid
        };
        assert_eq!(find_target(&state), Some(open));
        assert_ne!(find_target(&state), Some(buried));
    }

    #[test]
    fn test_out_of_range() {
        let mut state = arena();
        add_enemy(&mut state, EnemyKind::Pooka, Cell::new(6, 5));
        assert_eq!(find_target(&state), None);
    }

    #[test]
    fn test_inflate_to_pop() {
        let mut state = arena();
        let id = add_enemy(&mut state, EnemyKind::Pooka, Cell::new(5, 5));
        trigger_pump(&mut state);
        assert_eq!(state.pump.and_then(|p| p.target()), Some(id));

        let mut last = 0;
        for _ in 0..15 {
            update_pump(&mut state, true, 0.1);
            if let Some(enemy) = state.enemy(id) {
                assert!(enemy.inflation >= last);
                last = enemy.inflation;
            }
        }
        assert!(state.enemy(id).is_none());
        assert!(state.pump.is_none());
        assert_eq!(state.score, state.tuning.pump_points);
        assert!(!state.particles.is_empty());
        assert!(state.events.contains(&GameEvent::EnemyPopped { enemy: id }));
    }

    #[test]
    fn test_release_frees_enemy() {
        let mut state = arena();
        let id = add_enemy(&mut state, EnemyKind::Pooka, Cell::new(4, 5));
        trigger_pump(&mut state);
        update_pump(&mut state, true, 0.5);
        assert_eq!(state.enemy(id).map(|e| e.inflation), Some(1));
        update_pump(&mut state, false, 0.1);
        assert!(state.pump.is_none());
        assert_eq!(state.enemy(id).map(|e| e.inflation), Some(1));
    }

    #[test]
    fn test_vanished_target_clears_pump() {
        let mut state = arena();
        state.pump = Some(Pump::Attached {
            target: 99,
            timer: 0.0,
            key_held: true,
        });
        update_pump(&mut state, true, 0.1);
        assert!(state.pump.is_none());
    }

    #[test]
    fn test_pump_interrupts_breath() {
        let mut state = arena();
        let id = add_enemy(&mut state, EnemyKind::Fygar, Cell::new(5, 5));
        state.enemy_mut(id).unwrap().firing = true;
        let fire_id = state.next_entity_id();
        state.fires.push(Fire {
            id: fire_id,
            origin: Cell::new(5, 5),
            direction: Direction::Left,
            created_at: 0.0,
            duration: 1.5,
            owner: Some(id),
        });
        trigger_pump(&mut state);
        assert!(state.fires.is_empty());
        assert!(!state.enemy(id).unwrap().firing);
        assert_eq!(state.pump.and_then(|p| p.target()), Some(id));
    }
}
