//! Truffle Pig entry point
//!
//! Runs a batch of arenas headless under a random policy and logs a summary.
//! Real training pairs the library's `Episode` interface with an external
//! trainer instead.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use truffle_pig::Settings;
use truffle_pig::sim::{Arena, EpisodeController, Policy, RandomPolicy, ResetParameters};

#[derive(Parser, Debug)]
#[command(name = "truffle-pig", about = "Headless truffle-hunting pig environment")]
struct Args {
    /// Number of independent arenas
    #[arg(long, default_value_t = 4)]
    arenas: u32,

    /// Base seed; arena i uses seed + i
    #[arg(long, default_value_t = 0)]
    seed: u64,

    /// Simulation ticks to run per arena
    #[arg(long, default_value_t = 5_000)]
    ticks: u64,

    /// JSON settings file
    #[arg(long)]
    settings: Option<PathBuf>,

    /// JSON reset parameters file ({"num_truffles": .., "num_stumps": .., "spawn_range": ..})
    #[arg(long)]
    params: Option<PathBuf>,
}

fn run(args: Args) -> Result<(), Box<dyn std::error::Error>> {
    let settings = match &args.settings {
        Some(path) => Settings::load(path)?,
        None => Settings::default(),
    };
    let parameters = match &args.params {
        Some(path) => ResetParameters::load(path)?,
        None => ResetParameters::default(),
    };

    let arenas = (0..args.arenas)
        .map(|i| Arena::new(i, args.seed.wrapping_add(u64::from(i)), settings.clone()))
        .collect::<Result<Vec<_>, _>>()?;

    let mut controller = EpisodeController::new(parameters, arenas);
    controller.apply_reset_parameters()?;

    let mut policies: Vec<RandomPolicy> = (0..args.arenas)
        .map(|i| RandomPolicy::new(args.seed.wrapping_add(1_000 + u64::from(i))))
        .collect();

    for _ in 0..args.ticks {
        let actions: Vec<_> = controller
            .arenas()
            .iter()
            .zip(policies.iter_mut())
            .map(|(arena, policy)| policy.act(&arena.observe()))
            .collect();
        controller.step_all(&actions);
    }

    for arena in controller.arenas() {
        let board = &arena.scoreboard;
        log::info!(
            "Arena {}: {} episodes, success rate {}, best reward {}, current score {}",
            arena.id,
            board.total_episodes,
            board
                .success_rate()
                .map_or_else(|| "n/a".to_string(), |r| format!("{:.1}%", r * 100.0)),
            board
                .best_reward()
                .map_or_else(|| "n/a".to_string(), |r| format!("{r:.3}")),
            board.display()
        );
    }
    Ok(())
}

fn main() -> ExitCode {
    env_logger::init();
    log::info!("Truffle Pig (headless) starting...");

    match run(Args::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            log::error!("{err}");
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}
