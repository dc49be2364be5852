//! skirmish - run a battle scenario from the command line

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use skirmish::{CombatConfig, RandRoller, Roller, Scenario};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Turn-based combat simulator
#[derive(Parser, Debug)]
#[command(name = "skirmish", version, about = "Simulate text-RPG battles")]
struct Args {
    /// Engine config file (TOML); SKIRMISH_* env vars override it
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run one battle from a scenario file
    Simulate {
        /// Scenario JSON file
        scenario: PathBuf,

        /// Seed for a reproducible battle
        #[arg(long)]
        seed: Option<u64>,

        /// Print the full result as JSON instead of the narration
        #[arg(long)]
        json: bool,
    },
}

fn init_tracing(json: bool) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "skirmish=info".into());
    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.log_json);

    let config = CombatConfig::load(args.config.as_deref()).context("failed to load config")?;

    match args.command {
        Command::Simulate {
            scenario,
            seed,
            json,
        } => {
            let scenario = Scenario::load(&scenario)?;
            let mut dice: Box<dyn Roller> = match seed {
                Some(seed) => Box::new(RandRoller::seeded(seed)),
                None => Box::new(RandRoller::thread()),
            };
            let result = scenario.run(&config, dice.as_mut())?;
            info!(outcome = ?result.outcome, rounds = result.rounds, "battle finished");

            if json {
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else {
                println!("{}", result.narrate());
            }
        }
    }

    Ok(())
}
