//! Collision resolution and life loss
//!
//! Every check is skipped while the round is in its start-of-round pause or
//! once the game is over, so a life lost by one check silences the rest of
//! the tick.

use super::fire::fire_hits;
use super::grid::Cell;
use super::level::reset_round;
use super::state::{GameEvent, GamePhase, GameState, Rock};

fn collisions_active(state: &GameState) -> bool {
    state.phase == GamePhase::Playing && !state.round_paused
}

/// Player sharing a tile with any enemy
pub fn check_enemy_collisions(state: &mut GameState) {
    if !collisions_active(state) {
        return;
    }
    let player = state.player.cell;
    if state.enemies.iter().any(|e| e.cell == player) {
        log::debug!("Player caught by an enemy at {:?}", player);
        let shake = state.tuning.life_loss_shake;
        lose_life(state, shake);
    }
}

/// Player standing in live flames
pub fn check_fire_collisions(state: &mut GameState) {
    if !collisions_active(state) {
        return;
    }
    let now = state.clock;
    let player = state.player.cell;
    if state
        .fires
        .iter()
        .any(|fire| fire_hits(fire, now, player, &state.tuning))
    {
        log::debug!("Player burned at {:?}", player);
        let shake = state.tuning.life_loss_shake;
        lose_life(state, shake);
    }
}

/// Falling or freshly landed rocks against enemies and the player.
///
/// Every row a rock swept this tick counts. Positions are compared by
/// floored render position, so an entity caught halfway between tiles is
/// judged by the tile it is visually in.
pub fn check_rock_collisions(state: &mut GameState) {
    if !collisions_active(state) {
        return;
    }

    let dangerous: Vec<Rock> = state
        .rocks
        .iter()
        .filter(|rock| rock.is_dangerous())
        .cloned()
        .collect();

    for rock in dangerous {
        let crushed: Vec<(u32, Cell)> = state
            .enemies
            .iter()
            .map(|e| (e.id, Cell::floor_of(e.render_pos)))
            .filter(|&(_, cell)| rock.sweeps(cell))
            .collect();

        if !crushed.is_empty() {
            let rock = rock.id;
            for &(id, cell) in &crushed {
                if let Some(enemy) = state.remove_enemy(id) {
                    state.spawn_burst(cell, enemy.kind.color());
                    state.emit(GameEvent::EnemyCrushed { enemy: id, rock });
                }
            }
            let points = state.tuning.crush_points * crushed.len() as u64;
            state.award(points);
            let shake = state.tuning.enemy_crush_shake;
            state.add_screen_shake(shake);
            log::debug!("Rock {} crushed {} enemies (+{})", rock, crushed.len(), points);
        }

        if rock.sweeps(Cell::floor_of(state.player.render_pos)) {
            log::debug!("Player crushed by rock {}", rock.id);
            let shake = state.tuning.player_crush_shake;
            lose_life(state, shake);
            return;
        }
    }
}

/// Take a life. Ends the game at zero, otherwise resets the round.
pub fn lose_life(state: &mut GameState, shake: f32) {
    state.lives = state.lives.saturating_sub(1);
    state.add_screen_shake(shake);

    if state.lives == 0 {
        state.phase = GamePhase::GameOver;
        state.pump = None;
        log::info!("Game over (score {}, level {})", state.score, state.level);
        state.emit(GameEvent::GameOver { score: state.score });
        return;
    }

    reset_round(state);
    log::info!("Life lost, {} remaining", state.lives);
    state.emit(GameEvent::LifeLost {
        lives_left: state.lives,
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::grid::Direction;
    use crate::sim::state::{Enemy, EnemyKind, Fire, PLAYER_SPAWN, RockState};
    use crate::tuning::Tuning;

    fn live_state() -> GameState {
        let mut state = GameState::empty(6, Tuning::default());
        state.grid.clear(PLAYER_SPAWN);
        state.round_paused = false;
        state
    }

    fn add_enemy(state: &mut GameState, cell: Cell) -> u32 {
        let id = state.next_entity_id();
        state
            .enemies
            .push(Enemy::new(id, EnemyKind::Pooka, cell, 2.0, 0.0));
        id
    }

    #[test]
    fn test_enemy_contact_costs_life() {
        let mut state = live_state();
        let spawn = Cell::new(10, 10);
        let id = add_enemy(&mut state, spawn);
        {
            let enemy = state.enemy_mut(id).unwrap();
            enemy.cell = PLAYER_SPAWN;
            enemy.render_pos = PLAYER_SPAWN.as_vec2();
        }
        check_enemy_collisions(&mut state);
        assert_eq!(state.lives, 2);
        assert!(state.round_paused);
        assert_eq!(state.enemy(id).unwrap().cell, spawn);
        assert!(state.events.contains(&GameEvent::LifeLost { lives_left: 2 }));
    }

    #[test]
    fn test_no_collisions_during_pause() {
        let mut state = live_state();
        add_enemy(&mut state, PLAYER_SPAWN);
        state.round_paused = true;
        check_enemy_collisions(&mut state);
        assert_eq!(state.lives, 3);
    }

    #[test]
    fn test_fire_reaches_player() {
        let mut state = live_state();
        state.fires.push(Fire {
            id: 50,
            origin: PLAYER_SPAWN.step(Direction::Right, 2),
            direction: Direction::Left,
            created_at: 0.0,
            duration: 1.5,
            owner: None,
        });
        // Grow phase only reaches one tile
        state.clock = 0.6;
        check_fire_collisions(&mut state);
        assert_eq!(state.lives, 3);
        // Full phase reaches two
        state.clock = 1.0;
        check_fire_collisions(&mut state);
        assert_eq!(state.lives, 2);
    }

    #[test]
    fn test_rock_crushes_stacked_enemies() {
        let mut state = live_state();
        let cell = Cell::new(2, 10);
        add_enemy(&mut state, cell);
        add_enemy(&mut state, cell);
        let mut rock = Rock::new(30, cell);
        rock.state = RockState::Landed;
        state.rocks.push(rock);

        check_rock_collisions(&mut state);
        assert!(state.enemies.is_empty());
        assert_eq!(state.score, state.tuning.crush_points * 2);
        assert!(state.screen_shake > 0.0);
        assert_eq!(state.lives, 3);
    }

    #[test]
    fn test_rock_crushes_rows_it_passed() {
        let mut state = live_state();
        let column = 2;
        for y in 3..=9 {
            state.grid.clear(Cell::new(column, y));
        }
        let passed = add_enemy(&mut state, Cell::new(column, 4));
        let below = add_enemy(&mut state, Cell::new(column, 8));
        let mut rock = Rock::new(30, Cell::new(column, 2));
        rock.state = RockState::Falling { speed: 6.0 };
        state.rocks.push(rock);

        // One long step carries the rock from row 2 to row 5
        crate::sim::rock::update_rocks(&mut state, 0.5);
        check_rock_collisions(&mut state);
        assert!(state.enemy(passed).is_none());
        assert!(state.enemy(below).is_some());
        assert_eq!(state.score, state.tuning.crush_points);
    }

    #[test]
    fn test_stable_rock_is_harmless() {
        let mut state = live_state();
        let cell = Cell::new(2, 10);
        add_enemy(&mut state, cell);
        state.rocks.push(Rock::new(30, cell));
        check_rock_collisions(&mut state);
        assert_eq!(state.enemies.len(), 1);
    }

    #[test]
    fn test_rock_on_player() {
        let mut state = live_state();
        let mut rock = Rock::new(30, PLAYER_SPAWN);
        rock.state = RockState::Falling { speed: 6.0 };
        state.rocks.push(rock);
        check_rock_collisions(&mut state);
        assert_eq!(state.lives, 2);
        assert!((state.screen_shake - state.tuning.player_crush_shake.min(1.0)).abs() < 1e-6);
    }

    #[test]
    fn test_last_life_ends_game() {
        let mut state = live_state();
        state.lives = 1;
        state.score = 1234;
        lose_life(&mut state, 0.5);
        assert_eq!(state.lives, 0);
        assert_eq!(state.phase, GamePhase::GameOver);
        assert_eq!(state.events, vec![GameEvent::GameOver { score: 1234 }]);
        // Further checks do nothing
        let player = state.player.cell;
        add_enemy(&mut state, player);
        check_enemy_collisions(&mut state);
        assert_eq!(state.lives, 0);
    }
}
