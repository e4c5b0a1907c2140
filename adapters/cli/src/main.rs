#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that boots a Geometropolis city and lets a bot play it.

mod autoplay;
mod settings;

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use geometropolis_core::ResourceKind;
use geometropolis_world::{query, World};
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::settings::Settings;

/// Headless Geometropolis runner.
#[derive(Parser, Debug)]
#[command(name = "geometropolis")]
#[command(about = "Play gathering and construction rounds against a seeded city")]
struct Args {
    /// TOML settings file; built-in defaults are used when omitted.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Seed overriding both the city and gathering seeds.
    #[arg(long)]
    seed: Option<u64>,

    /// Number of gather-and-build rounds to play.
    #[arg(long, default_value_t = 3)]
    rounds: u32,
}

/// Entry point for the Geometropolis command-line interface.
fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let mut settings = Settings::load(args.config.as_deref())?;
    if let Some(seed) = args.seed {
        settings.reseed(seed);
    }

    let mut world = World::with_config(&settings.world);
    println!("{}", query::welcome_banner(&world));
    info!(
        rows = query::grid(&world).rows(),
        columns = query::grid(&world).columns(),
        seed = settings.world.rng_seed,
        "city founded"
    );

    let summary = autoplay::run(&mut world, &settings, args.rounds);
    println!(
        "{} rounds, {} buildings, final score {:.1}",
        summary.rounds, summary.buildings, summary.score
    );
    for resource in ResourceKind::ALL {
        println!("{resource}: {}", query::quantity(&world, resource));
    }
    Ok(())
}
