#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that runs headless tile defence simulations.

mod config;
mod layout;
mod render;
mod simulation;

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use glam::Vec3;
use tile_defence_world::query;
use tracing::info;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::{
    config::SimulationConfig, layout::LayoutFile, render::render_board, simulation::Simulation,
};

const DEFAULT_LOG_FILTER: &str = "tile_defence=info,tile_defence_world=info";

/// Runs a seeded tile defence simulation and prints a summary.
#[derive(Debug, Parser)]
#[command(name = "tile-defence", version, about)]
struct Cli {
    /// TOML file with simulation parameters.
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
    /// Plain-text board layout replacing the default board.
    #[arg(long, value_name = "PATH")]
    layout: Option<PathBuf>,
    /// Number of ticks to simulate, overriding the configuration.
    #[arg(long)]
    ticks: Option<u64>,
    /// Random seed, overriding the configuration.
    #[arg(long)]
    seed: Option<u64>,
    /// Prints the flow field and enemy positions after the run.
    #[arg(long)]
    print_paths: bool,
}

/// Entry point for the tile defence command-line interface.
fn main() -> Result<()> {
    init_logging();
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => SimulationConfig::load(path)?,
        None => SimulationConfig::default(),
    };
    if let Some(seed) = cli.seed {
        config.seed = seed;
    }
    if let Some(ticks) = cli.ticks {
        config.ticks = ticks;
    }
    let layout = cli.layout.as_deref().map(LayoutFile::load).transpose()?;

    let ticks = config.ticks;
    info!(seed = config.seed, ticks, "starting simulation");
    let mut simulation = Simulation::new(config, layout)?;
    let summary = simulation.run(ticks).clone();
    println!("{summary}");

    if cli.print_paths {
        let world = simulation.world();
        let enemies: Vec<Vec3> = query::enemy_view(world)
            .iter()
            .map(|enemy| enemy.model_position)
            .collect();
        print!("\n{}", render_board(query::board(world), &enemies));
    }
    Ok(())
}

fn init_logging() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
        .init();
}
