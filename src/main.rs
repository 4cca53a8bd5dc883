//! Dig Rush headless driver
//!
//! Runs an attract-mode session against the simulation at a fixed timestep
//! and reports how it went. Useful for balance passes with a tuning file.
//!
//! # Usage
//!
//! ```bash
//! dig-rush --seed 7 --seconds 300
//! dig-rush --tuning balance.json --json
//! ```

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use dig_rush::Tuning;
use dig_rush::consts::{MAX_SUBSTEPS, SIM_DT};
use dig_rush::sim::pump::find_target;
use dig_rush::sim::{Direction, GameEvent, GamePhase, GameState, TickInput, tick};

/// Wall-clock frame length the driver pretends to render at
const FRAME_DT: f32 = 1.0 / 30.0;

#[derive(Parser)]
#[command(name = "dig-rush")]
#[command(
    author,
    version,
    about = "Dig Rush - headless attract-mode run of the simulation"
)]
struct Args {
    /// Seed for the simulation RNG
    #[arg(long, short = 's', default_value = "24301")]
    seed: u64,

    /// Simulated wall-clock seconds to run
    #[arg(long, short = 't', default_value = "120")]
    seconds: f32,

    /// JSON file with tuning overrides
    #[arg(long)]
    tuning: Option<PathBuf>,

    /// Print the final snapshot as JSON instead of a summary line
    #[arg(long)]
    json: bool,
}

/// Simple autopilot: walk toward the nearest enemy, pump it when in front
struct Autopilot {
    pumping: bool,
}

impl Autopilot {
    fn input(&mut self, state: &GameState) -> TickInput {
        if state.phase == GamePhase::GameOver {
            return TickInput {
                restart: true,
                ..Default::default()
            };
        }

        let hooked = state.pump.and_then(|p| p.target()).is_some();
        if hooked {
            return TickInput {
                pump_held: true,
                ..Default::default()
            };
        }

        if find_target(state).is_some() {
            let pressed = !self.pumping;
            self.pumping = true;
            return TickInput {
                fire_pump_pressed: pressed,
                pump_held: true,
                ..Default::default()
            };
        }
        self.pumping = false;

        let player = state.player.cell;
        let nearest = state
            .enemies
            .iter()
            .min_by_key(|e| (e.cell.manhattan(player), e.id));
        let move_intent = nearest.and_then(|enemy| {
            let dx = enemy.cell.x - player.x;
            let dy = enemy.cell.y - player.y;
            if dx == 0 && dy == 0 {
                None
            } else if dx.abs() >= dy.abs() {
                Some(if dx > 0 { Direction::Right } else { Direction::Left })
            } else {
                Some(if dy > 0 { Direction::Down } else { Direction::Up })
            }
        });
        TickInput {
            move_intent,
            ..Default::default()
        }
    }
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let tuning = match &args.tuning {
        Some(path) => Tuning::load(path)
            .with_context(|| format!("failed to load tuning from {}", path.display()))?,
        None => Tuning::default(),
    };

    log::info!("Dig Rush (headless) starting with seed {}", args.seed);
    let mut state = GameState::with_tuning(args.seed, tuning);
    let mut pilot = Autopilot { pumping: false };
    let mut accumulator = 0.0_f32;
    let mut elapsed = 0.0_f32;
    let mut games = 1u32;
    let mut best_score = 0u64;

    while elapsed < args.seconds {
        elapsed += FRAME_DT;
        accumulator += FRAME_DT;

        let mut substeps = 0;
        while accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
            let input = pilot.input(&state);
            tick(&mut state, &input, SIM_DT);
            accumulator -= SIM_DT;
            substeps += 1;

            best_score = best_score.max(state.score);
            for event in &state.events {
                if *event == GameEvent::Restarted {
                    games += 1;
                }
            }
        }
    }

    log::info!(
        "Finished after {:.0}s: level {}, score {}, lives {}, best {} over {} game(s)",
        elapsed,
        state.level,
        state.score,
        state.lives,
        best_score,
        games
    );

    if args.json {
        let json = serde_json::to_string_pretty(&state.snapshot())
            .context("failed to serialize snapshot")?;
        println!("{json}");
    } else {
        println!(
            "level {} score {} lives {} best {}",
            state.level, state.score, state.lives, best_score
        );
    }
    Ok(())
}
