// Allow unwrap in tests (test code is not production)
#![cfg_attr(test, allow(clippy::unwrap_used))]
//! Nuggets CLI - inspect maps and simulate games against the world model.

// Allow print in the CLI binary
#![allow(clippy::print_stdout, clippy::print_stderr)]

mod cli;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Nuggets - world model for a multiplayer gold-collecting game
#[derive(Parser, Debug)]
#[command(name = "nuggets")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Log at debug level (overridden by `RUST_LOG`)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
enum Commands {
    /// Show what an observer standing at (x, y) can see
    View {
        /// Map file
        #[arg(required = true)]
        map: PathBuf,

        /// Observer column
        x: usize,

        /// Observer row
        y: usize,

        /// Output format: text or json
        #[arg(short, long, default_value = "text")]
        format: cli::OutputFormat,
    },

    /// Compute how much of the map each room cell can see
    Survey {
        /// Map file
        #[arg(required = true)]
        map: PathBuf,

        /// Parallel threads (default: CPU count)
        #[arg(short = 'j', long)]
        threads: Option<usize>,

        /// Output format: text or json
        #[arg(short, long, default_value = "text")]
        format: cli::OutputFormat,
    },

    /// Play a game with random-walking players until the gold runs out
    Simulate {
        /// Map file
        #[arg(required = true)]
        map: PathBuf,

        /// Number of players (1-26)
        #[arg(short, long, default_value = "3")]
        players: usize,

        /// Random seed (overrides the config file)
        #[arg(short, long)]
        seed: Option<u64>,

        /// Maximum moves before the game is ended
        #[arg(short, long, default_value = "5000")]
        max_moves: u32,

        /// JSON setup config
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Output format: text or json
        #[arg(short, long, default_value = "text")]
        format: cli::OutputFormat,
    },
}

fn main() -> ExitCode {
    let args = Args::parse();

    let filter = if args.verbose { "debug" } else { "warn" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .without_time(),
        )
        .init();

    let result = match args.command {
        Commands::View { map, x, y, format } => cli::view::execute(&map, x, y, format),

        Commands::Survey {
            map,
            threads,
            format,
        } => cli::survey::execute(&map, threads, format),

        Commands::Simulate {
            map,
            players,
            seed,
            max_moves,
            config,
            format,
        } => cli::simulate::execute(&map, players, seed, max_moves, config.as_deref(), format),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}
