#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that plays one Trick or Treat run headlessly.

mod autopilot;
mod settings;
mod summary;

use std::{path::PathBuf, time::Duration};

use anyhow::{ensure, Context, Result};
use clap::Parser;
use log::{info, warn};
use trick_or_treat_core::Command;
use trick_or_treat_physics::SimplePhysics;
use trick_or_treat_presentation::{present, LoggingAudio, LoggingHud};
use trick_or_treat_world::{self as world, query, SessionConfig, World};

use autopilot::Autopilot;
use summary::{Summary, Tally};

/// Extra simulated seconds allowed past the configured run length.
const OVERRUN_SECONDS: f32 = 10.0;
/// Mixed into the session seed so the autopilot draws from its own stream.
const AUTOPILOT_SALT: u64 = 0x7472_6963_6b00;

#[derive(Debug, Parser)]
#[command(name = "trick-or-treat")]
#[command(about = "Plays one timed Trick or Treat run with an autopilot player")]
struct Args {
    /// Session configuration in TOML; the bundled street is used when absent.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Seed for every random draw in the session.
    #[arg(short, long, default_value_t = 31)]
    seed: u64,

    /// Fixed simulation rate in ticks per second.
    #[arg(long, default_value_t = 60)]
    tick_hz: u32,

    /// Probability that the autopilot types each arrow correctly.
    #[arg(long, default_value_t = 0.9)]
    accuracy: f64,

    /// Print the summary as JSON.
    #[arg(long)]
    json: bool,
}

/// Entry point for the Trick or Treat command-line interface.
fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    ensure!(args.tick_hz > 0, "--tick-hz must be positive");
    ensure!(
        (0.0..=1.0).contains(&args.accuracy),
        "--accuracy must lie in [0, 1] (received {})",
        args.accuracy
    );

    let config = settings::load(args.config.as_deref())?;
    let summary = play(config, &args);

    if args.json {
        let json =
            serde_json::to_string_pretty(&summary).context("failed to encode the run summary")?;
        println!("{json}");
    } else {
        print!("{summary}");
    }
    Ok(())
}

fn play(config: SessionConfig, args: &Args) -> Summary {
    let dt = Duration::from_secs_f64(1.0 / f64::from(args.tick_hz));
    let tick_budget =
        ((config.run.run_seconds + OVERRUN_SECONDS) * args.tick_hz as f32).ceil() as u64;

    let mut world = World::new(config, args.seed, Box::new(SimplePhysics::default()));
    let mut pilot = Autopilot::new(args.accuracy, args.seed ^ AUTOPILOT_SALT);
    let mut audio = LoggingAudio::default();
    let mut hud = LoggingHud::default();
    let mut tally = Tally::default();

    info!("{}", query::welcome_banner(&world));
    let mut events = Vec::new();
    world::announce(&mut world, &mut events);

    let mut ticks = 0_u64;
    loop {
        tally.observe(&events);
        present(&events, &mut audio, &mut hud);
        events.clear();

        if hud.results().is_some() {
            break;
        }
        if ticks >= tick_budget {
            warn!("run did not end within {ticks} ticks; stopping");
            break;
        }

        for command in pilot.decide(&world) {
            world::apply(&mut world, command, &mut events);
        }
        world::apply(&mut world, Command::Tick { dt }, &mut events);
        ticks += 1;
    }

    info!(
        "{} ticks simulated, {} sounds played",
        ticks,
        audio.played()
    );
    tally.finish(query::run_state(&world), args.seed)
}
