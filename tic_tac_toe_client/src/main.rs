use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use tic_tac_toe_client::local_game::LocalGame;
use tic_tac_toe_client::selector::Difficulty;
use tic_tac_toe_client::stats::{JsonFileStore, StatsTracker};
use tic_tac_toe_client::terminal::{run_local, run_online};

/// Tic-tac-toe against the computer or another player over the relay server.
#[derive(Parser)]
#[command(name = "tic_tac_toe")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Play against the computer.
    Local {
        /// Always play the strongest move.
        #[arg(long)]
        perfect: bool,

        /// Where win/draw counters are kept.
        #[arg(long, default_value = "tic_tac_toe_stats.json")]
        stats_file: PathBuf,
    },
    /// Open a room and wait for an opponent.
    Create {
        room: String,

        #[arg(long, default_value = "ws://localhost:3000")]
        server: String,
    },
    /// Take the free seat in an existing room.
    Join {
        room: String,

        #[arg(long, default_value = "ws://localhost:3000")]
        server: String,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Local { perfect, stats_file } => {
            let store = JsonFileStore::open(&stats_file)?;
            let difficulty = if perfect {
                Difficulty::Perfect
            } else {
                Difficulty::Softened
            };
            info!("Local game, stats in {}", stats_file.display());
            let mut game = LocalGame::new(StatsTracker::new(store), difficulty);
            run_local(&mut game)
        }
        Commands::Create { room, server } => online(&server, &room, true),
        Commands::Join { room, server } => online(&server, &room, false),
    }
}

fn online(server: &str, room: &str, create: bool) -> Result<()> {
    let runtime = tokio::runtime::Runtime::new().context("starting tokio runtime")?;
    runtime.block_on(run_online(server, room, create))
}
