//! Fixed timestep simulation tick
//!
//! Core game loop that advances simulation deterministically. Gameplay runs
//! as a fixed, ordered list of phases ([`PIPELINE`]); later phases observe
//! everything earlier phases did in the same tick.

use super::collision::{check_enemy_collisions, check_fire_collisions, check_rock_collisions};
use super::enemy::update_enemies;
use super::fire::update_fires;
use super::grid::Direction;
use super::level::{advance_level, restart};
use super::player::update_player;
use super::pump::{trigger_pump, update_pump};
use super::rock::{remove_landed, update_rocks};
use super::state::{GameEvent, GamePhase, GameState};

/// Input commands for a single tick (deterministic)
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Direction the player wants to move this tick
    pub move_intent: Option<Direction>,
    /// Fire-pump key went down this tick (edge-triggered)
    pub fire_pump_pressed: bool,
    /// Fire-pump key is down (level-triggered)
    pub pump_held: bool,
    /// Start a new game (only honored after game over)
    pub restart: bool,
}

/// One step of the gameplay pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Finish or start a player step, digging the destination
    PlayerMovement,
    /// Fire the pump. Runs before enemies so a Fygar hooked mid-breath has
    /// its fire interrupted before the fire lifecycle sees it.
    PumpTrigger,
    /// Timers, fire breath and movement for every enemy
    Enemies,
    /// Expire old fires
    Fires,
    /// Inflate the hooked enemy or count down a missed shot
    Pump,
    /// Rock gravity
    Rocks,
    Particles,
    /// Player against enemies
    EnemyCollisions,
    /// Player against flames
    FireCollisions,
    /// Falling and landed rocks against everything
    RockCollisions,
    /// Landed rocks leave only after their collision check
    RemoveLandedRocks,
    /// No enemies left: start the level transition
    LevelCheck,
}

/// Gameplay phases in execution order
pub const PIPELINE: [Phase; 12] = [
    Phase::PlayerMovement,
    Phase::PumpTrigger,
    Phase::Enemies,
    Phase::Fires,
    Phase::Pump,
    Phase::Rocks,
    Phase::Particles,
    Phase::EnemyCollisions,
    Phase::FireCollisions,
    Phase::RockCollisions,
    Phase::RemoveLandedRocks,
    Phase::LevelCheck,
];

/// Advance the game state by one fixed timestep
pub fn tick(state: &mut GameState, input: &TickInput, dt: f32) {
    state.events.clear();

    // Decay screen shake
    state.screen_shake *= 0.9;
    if state.screen_shake < 0.01 {
        state.screen_shake = 0.0;
    }

    match state.phase {
        GamePhase::GameOver => {
            update_particles(state, dt);
            if input.restart {
                restart(state);
            }
            return;
        }
        GamePhase::LevelComplete => {
            update_particles(state, dt);
            state.transition_timer += dt;
            if state.transition_timer >= state.tuning.level_transition {
                advance_level(state);
            }
            return;
        }
        GamePhase::Playing => {}
    }

    if state.round_paused {
        update_particles(state, dt);
        state.pause_timer += dt;
        if state.pause_timer >= state.tuning.round_pause {
            state.round_paused = false;
            state.pause_timer = 0.0;
            log::debug!("Round {} underway", state.level);
        }
        return;
    }

    state.clock += dt;
    for phase in PIPELINE {
        if state.phase != GamePhase::Playing {
            break;
        }
        run_phase(state, phase, input, dt);
    }

    state.normalize_order();
}

fn run_phase(state: &mut GameState, phase: Phase, input: &TickInput, dt: f32) {
    match phase {
        Phase::PlayerMovement => update_player(state, input.move_intent, dt),
        Phase::PumpTrigger => {
            if input.fire_pump_pressed {
                trigger_pump(state);
            }
        }
        Phase::Enemies => update_enemies(state, dt),
        Phase::Fires => update_fires(state),
        Phase::Pump => update_pump(state, input.pump_held, dt),
        Phase::Rocks => update_rocks(state, dt),
        Phase::Particles => update_particles(state, dt),
        Phase::EnemyCollisions => check_enemy_collisions(state),
        Phase::FireCollisions => check_fire_collisions(state),
        Phase::RockCollisions => check_rock_collisions(state),
        Phase::RemoveLandedRocks => remove_landed(state),
        Phase::LevelCheck => check_level_complete(state),
    }
}

fn check_level_complete(state: &mut GameState) {
    if state.round_paused || !state.enemies.is_empty() {
        return;
    }
    state.phase = GamePhase::LevelComplete;
    state.transition_timer = 0.0;
    state.pump = None;
    log::info!("Level {} cleared (score {})", state.level, state.score);
    state.emit(GameEvent::LevelComplete { level: state.level });
}

/// Particles drift, slow down and fade
fn update_particles(state: &mut GameState, dt: f32) {
    for particle in state.particles.iter_mut() {
        particle.pos += particle.vel * dt;
        particle.vel *= 0.96;
        particle.life -= dt;
    }
    state.particles.retain(|p| p.life > 0.0);
}
