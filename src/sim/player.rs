//! Player movement and digging

use glam::Vec2;

use super::grid::{Cell, Direction};
use super::state::{GameEvent, GameState};

/// Move `render_pos` up to `distance` toward `target`, snapping when close.
///
/// Returns true once the render position sits on the target tile.
pub fn approach(render_pos: &mut Vec2, target: Cell, distance: f32) -> bool {
    let goal = target.as_vec2();
    let delta = goal - *render_pos;
    let remaining = delta.length();
    if remaining <= distance {
        *render_pos = goal;
        true
    } else {
        *render_pos += delta / remaining * distance;
        false
    }
}

/// Advance the player one tick: finish the current step, then start a new
/// one (digging the destination) if a move intent is held.
pub fn update_player(state: &mut GameState, intent: Option<Direction>, dt: f32) {
    let player = &mut state.player;

    if player.moving && approach(&mut player.render_pos, player.target, player.speed * dt) {
        player.cell = player.target;
        player.moving = false;
    }

    if player.moving {
        return;
    }
    let Some(dir) = intent else {
        return;
    };

    player.facing = dir;
    let next = player.cell.step(dir, 1);
    if !state.grid.contains(next) {
        return;
    }
    player.target = next;
    player.moving = true;

    if state.grid.clear(next) {
        let points = state.tuning.dig_points;
        state.award(points);
        state.emit(GameEvent::Dug { cell: next });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::state::PLAYER_SPAWN;
    use crate::tuning::Tuning;

    fn fresh() -> GameState {
        GameState::empty(5, Tuning::default())
    }

    #[test]
    fn test_approach_snaps_within_one_step() {
        let mut pos = Vec2::new(0.0, 0.0);
        assert!(!approach(&mut pos, Cell::new(1, 0), 0.4));
        assert!((pos.x - 0.4).abs() < 1e-6);
        assert!(approach(&mut pos, Cell::new(1, 0), 0.6));
        assert_eq!(pos, Vec2::new(1.0, 0.0));
    }

    #[test]
    fn test_dig_awards_points_once() {
        let mut state = fresh();
        let dig = Cell::new(8, 3);
        assert!(state.grid.has_dirt(dig));
        update_player(&mut state, Some(Direction::Right), 0.01);
        assert_eq!(state.score, state.tuning.dig_points);
        assert!(!state.grid.has_dirt(dig));
        assert_eq!(state.player.target, dig);
        // Logical cell only changes on arrival
        assert_eq!(state.player.cell, PLAYER_SPAWN);

        for _ in 0..100 {
            update_player(&mut state, None, 0.01);
        }
        assert_eq!(state.player.cell, dig);
        assert!(!state.player.moving);

        // Walking back over the carved tile awards nothing
        let before = state.score;
        update_player(&mut state, Some(Direction::Left), 0.01);
        assert_eq!(state.score, before);
    }

    #[test]
    fn test_edge_turns_without_moving() {
        let mut state = fresh();
        state.player.cell = Cell::new(0, 0);
        state.player.target = Cell::new(0, 0);
        state.player.render_pos = Vec2::ZERO;
        update_player(&mut state, Some(Direction::Left), 0.1);
        assert_eq!(state.player.facing, Direction::Left);
        assert!(!state.player.moving);
        assert_eq!(state.player.cell, Cell::new(0, 0));
    }
}
