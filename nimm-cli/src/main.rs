//! NIMM CLI - Command-line interface
//!
//! Commands:
//! - play: Run one match (humans, fixed AIs, learners)
//! - batch: Train many seeded copies of a match and summarize them
//! - presets: List the built-in match presets

mod batch_cmd;
mod human;
mod play_cmd;
mod render;
mod report;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "nimm")]
#[command(about = "NIMM subtraction game with learning players")]
struct Cli {
    /// Random seed for reproducibility
    #[arg(long, global = true)]
    seed: Option<u64>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Play a single match
    Play(play_cmd::PlayArgs),
    /// Run many matches of the same config
    Batch(batch_cmd::BatchArgs),
    /// List built-in presets
    Presets,
}

fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Play(args) => play_cmd::run(args, cli.seed),
        Commands::Batch(args) => batch_cmd::run(args, cli.seed),
        Commands::Presets => {
            for name in nimm_match::PRESETS {
                println!("{}", name);
            }
            Ok(())
        }
    }
}
