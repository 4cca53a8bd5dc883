//! Round and level controller
//!
//! Builds a level (dirt, lairs, enemies, rocks), resets a round after a lost
//! life, advances to the next level and restarts a finished game.

use std::ops::RangeInclusive;

use rand::Rng;

use super::grid::{Cell, Grid};
use super::state::{Enemy, EnemyKind, GameEvent, GamePhase, GameState, PLAYER_SPAWN, Rock};
use crate::consts::{GRID_HEIGHT, GRID_WIDTH};

/// Horizontal tunnel carved around each Pooka spawn
const POOKA_LAIR: RangeInclusive<i32> = 5..=8;
/// Vertical tunnel carved around each Fygar spawn
const FYGAR_LAIR: RangeInclusive<i32> = 4..=7;
/// Rocks keep at least this Manhattan distance from the player spawn (exclusive)
const ROCK_MIN_PLAYER_DISTANCE: i32 = 2;

fn random_cell<R: Rng>(rng: &mut R) -> Cell {
    Cell::new(rng.random_range(0..GRID_WIDTH), rng.random_range(0..GRID_HEIGHT))
}

/// Pick a tile: random attempts against `strict`, then a row-major scan for
/// `loose`, then any random tile.
fn place(
    state: &mut GameState,
    what: &str,
    strict: impl Fn(&GameState, Cell) -> bool,
    loose: impl Fn(&GameState, Cell) -> bool,
) -> Cell {
    for _ in 0..state.tuning.spawn_attempts {
        let cell = random_cell(&mut state.rng);
        if strict(state, cell) {
            return cell;
        }
    }

    if let Some(cell) = Grid::cells().find(|&cell| loose(state, cell)) {
        log::warn!("No ideal {} spot found, using {:?}", what, cell);
        return cell;
    }

    let cell = random_cell(&mut state.rng);
    log::warn!("No free {} spot left, forcing {:?}", what, cell);
    cell
}

fn enemy_at(state: &GameState, cell: Cell) -> bool {
    state.enemies.iter().any(|e| e.cell == cell)
}

fn spawn_enemy(state: &mut GameState, kind: EnemyKind, speed_multiplier: f32) {
    let min_distance = state.tuning.spawn_min_player_distance;
    let cell = place(
        state,
        "enemy",
        |s, c| c.manhattan(s.player.cell) > min_distance && !enemy_at(s, c),
        |s, c| c != s.player.cell && !enemy_at(s, c),
    );

    let (lair, horizontal) = match kind {
        EnemyKind::Pooka => (POOKA_LAIR, true),
        EnemyKind::Fygar => (FYGAR_LAIR, false),
    };
    let length = state.rng.random_range(lair);
    if horizontal {
        state.grid.carve_horizontal(cell, length);
    } else {
        state.grid.carve_vertical(cell, length);
    }

    let id = state.next_entity_id();
    let speed = kind.tunnel_speed(&state.tuning) * speed_multiplier;
    state
        .enemies
        .push(Enemy::new(id, kind, cell, speed, state.clock));
}

fn rock_spot_free(state: &GameState, cell: Cell) -> bool {
    state.grid.has_dirt(cell)
        && !enemy_at(state, cell)
        && !state.rocks.iter().any(|r| r.cell() == cell)
}

fn spawn_rock(state: &mut GameState) {
    let cell = place(
        state,
        "rock",
        |s, c| {
            c.y >= 1
                && c.y <= GRID_HEIGHT - 2
                && c.manhattan(s.player.cell) > ROCK_MIN_PLAYER_DISTANCE
                && rock_spot_free(s, c)
                && s.grid.has_dirt(c.offset(0, 1))
        },
        |s, c| c != s.player.cell && rock_spot_free(s, c),
    );
    let id = state.next_entity_id();
    state.rocks.push(Rock::new(id, cell));
}

/// Build the current level from scratch and enter the start-of-round pause
pub(crate) fn start_level(state: &mut GameState) {
    state.grid.reset_full();
    state.player.reset_to_spawn();
    state.grid.clear(PLAYER_SPAWN);
    state.enemies.clear();
    state.fires.clear();
    state.rocks.clear();
    state.particles.clear();
    state.pump = None;

    let level = state.level;
    let multiplier = state.tuning.level_speed_multiplier(level);
    let pookas = state.tuning.pooka_count(level);
    let fygars = state.tuning.fygar_count(level);
    for _ in 0..pookas {
        spawn_enemy(state, EnemyKind::Pooka, multiplier);
    }
    for _ in 0..fygars {
        spawn_enemy(state, EnemyKind::Fygar, multiplier);
    }

    let rocks = state
        .rng
        .random_range(state.tuning.min_rocks..=state.tuning.max_rocks);
    for _ in 0..rocks {
        spawn_rock(state);
    }

    state.phase = GamePhase::Playing;
    state.round_paused = true;
    state.pause_timer = 0.0;
    state.transition_timer = 0.0;
    log::info!(
        "Level {} started: {} Pooka, {} Fygar, {} rocks, {} open tiles (speed x{:.2})",
        level,
        pookas,
        fygars,
        state.rocks.len(),
        state.grid.tunnel_count(),
        multiplier
    );
    state.emit(GameEvent::LevelStarted { level });
}

/// Put the player and every enemy back on their spawn tiles after a lost life.
/// Rocks and the dug grid persist.
pub(crate) fn reset_round(state: &mut GameState) {
    let now = state.clock;
    state.player.reset_to_spawn();
    state.grid.clear(PLAYER_SPAWN);
    for enemy in state.enemies.iter_mut() {
        enemy.reset_to_spawn(now);
    }
    state.fires.clear();
    state.pump = None;
    state.round_paused = true;
    state.pause_timer = 0.0;
}

/// Move on to the next level, awarding the completion bonus
pub fn advance_level(state: &mut GameState) {
    state.level += 1;
    let bonus = state.tuning.level_bonus;
    state.award(bonus);
    start_level(state);
}

/// Start over at level 1. Only honored once the game is over.
pub fn restart(state: &mut GameState) {
    if state.phase != GamePhase::GameOver {
        return;
    }
    let seed: u64 = state.rng.random();
    let tuning = state.tuning.clone();
    *state = GameState::with_tuning(seed, tuning);
    log::info!("Game restarted with seed: {}", seed);
    state.emit(GameEvent::Restarted);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tuning::Tuning;

    fn kind_count(state: &GameState, kind: EnemyKind) -> u32 {
        state.enemies.iter().filter(|e| e.kind == kind).count() as u32
    }

    #[test]
    fn test_level_one_population() {
        let state = GameState::new(21);
        assert_eq!(kind_count(&state, EnemyKind::Pooka), 2);
        assert_eq!(kind_count(&state, EnemyKind::Fygar), 1);
        assert!((2..=4).contains(&state.rocks.len()));
        assert!(state.events.contains(&GameEvent::LevelStarted { level: 1 }));
    }

    #[test]
    fn test_spawns_keep_their_distance() {
        for seed in 0..20 {
            let state = GameState::new(seed);
            for enemy in &state.enemies {
                assert!(enemy.cell.manhattan(PLAYER_SPAWN) > 3, "seed {seed}: {:?}", enemy.cell);
                // Every enemy starts inside its own lair
                assert!(!state.grid.has_dirt(enemy.cell));
            }
            for rock in &state.rocks {
                assert!(rock.cell().manhattan(PLAYER_SPAWN) > 2);
                assert!((1..GRID_HEIGHT - 1).contains(&rock.cell().y));
            }
        }
    }

    #[test]
    fn test_enemy_spawns_are_unique() {
        let mut state = GameState::new(4);
        state.level = 12;
        start_level(&mut state);
        let mut cells: Vec<Cell> = state.enemies.iter().map(|e| e.cell).collect();
        let total = cells.len();
        cells.sort_by_key(|c| (c.y, c.x));
        cells.dedup();
        assert_eq!(cells.len(), total);
        assert_eq!(total, 6);
    }

    #[test]
    fn test_speed_scales_with_level() {
        let mut state = GameState::new(8);
        state.level = 3;
        start_level(&mut state);
        let pooka = state
            .enemies
            .iter()
            .find(|e| e.kind == EnemyKind::Pooka)
            .unwrap();
        assert!((pooka.speed - 2.0 * 1.2).abs() < 1e-5);
    }

    #[test]
    fn test_advance_awards_bonus_and_rebuilds() {
        let mut state = GameState::new(9);
        state.grid.clear(Cell::new(0, 14));
        state.enemies.clear();
        state.score = 50;
        advance_level(&mut state);
        assert_eq!(state.level, 2);
        assert_eq!(state.score, 50 + state.tuning.level_bonus);
        assert!(!state.enemies.is_empty());
        assert!(state.round_paused);
        assert_eq!(state.player.cell, PLAYER_SPAWN);
    }

    #[test]
    fn test_round_reset_keeps_rocks_and_tunnels() {
        let mut state = GameState::new(10);
        let dug = Cell::new(0, 0);
        state.grid.clear(dug);
        let rocks = state.rocks.len();
        state.player.cell = Cell::new(1, 1);
        state.enemies[0].cell = Cell::new(0, 0);
        state.enemies[0].inflation = 2;
        reset_round(&mut state);
        assert_eq!(state.player.cell, PLAYER_SPAWN);
        assert_eq!(state.enemies[0].cell, state.enemies[0].spawn);
        assert_eq!(state.enemies[0].inflation, 0);
        assert_eq!(state.rocks.len(), rocks);
        assert!(!state.grid.has_dirt(dug));
    }

    #[test]
    fn test_restart_only_from_game_over() {
        let mut state = GameState::new(11);
        state.score = 900;
        restart(&mut state);
        assert_eq!(state.score, 900);

        state.phase = GamePhase::GameOver;
        state.tuning.dig_points = 25;
        restart(&mut state);
        assert_eq!(state.score, 0);
        assert_eq!(state.level, 1);
        assert_eq!(state.lives, 3);
        assert_eq!(state.phase, GamePhase::Playing);
        assert_eq!(state.tuning.dig_points, 25);
        assert_eq!(state.events.last(), Some(&GameEvent::Restarted));
    }

    #[test]
    fn test_placement_falls_back_when_crowded() {
        let tuning = Tuning {
            spawn_min_player_distance: 100,
            ..Tuning::default()
        };
        let state = GameState::with_tuning(3, tuning);
        // No tile is far enough away, so the scan fills the first free tiles
        assert_eq!(state.enemies[0].cell, Cell::new(0, 0));
        assert_eq!(state.enemies[1].cell, Cell::new(1, 0));
    }
}
