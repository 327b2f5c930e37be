//! Arbor - persistent MCTS learner and player
//!
//! Subcommands:
//! 1. `learn` - run the MCTS learning loop against a stored tree
//! 2. `play`  - play a game against the learned tree (exploit only)
//! 3. `dump`  - print the raw contents of the tree files

use anyhow::Result;
use clap::{Parser, Subcommand};

mod commands;
mod config;

use crate::config::{default_log_level, DumpArgs, LearnArgs, PlayArgs};

#[derive(Parser, Debug)]
#[command(name = "arbor")]
#[command(about = "Persistent Monte Carlo Tree Search over board games")]
#[command(
    long_about = "Learns two-player board games with Monte Carlo Tree Search,
persisting the whole search tree to disk so learning can be interrupted,
resumed, and replayed for exploit-only play.

Configuration is loaded from config.toml with ARBOR_* environment variable
overrides. CLI arguments take highest priority."
)]
struct Cli {
    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value_t = default_log_level())]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the learning loop
    Learn(LearnArgs),
    /// Play against the learned tree
    Play(PlayArgs),
    /// Dump the raw tree files
    Dump(DumpArgs),
}

/// Initialize tracing with an env-filter override.
fn init_tracing(level: &str) {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer())
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_tracing(&cli.log_level);
    engine_games::register_all_games();

    match cli.command {
        Command::Learn(args) => commands::learn::run(args).await,
        Command::Play(args) => commands::play::run(args),
        Command::Dump(args) => commands::dump::run(args),
    }
}
