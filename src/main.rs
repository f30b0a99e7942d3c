//! # Reel Rank CLI (`reel-rank`)
//!
//! ## Usage
//!
//! ```bash
//! reel-rank --config ./config/reel-rank.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `reel-rank init` | Create the SQLite database and schema |
//! | `reel-rank serve` | Start the web server |
//! | `reel-rank list` | Print the ranked collection |
//!
//! TMDB credentials are read from `TMDB_API_KEY` and `TMDB_API_TOKEN` (or
//! the `[tmdb]` table). Log verbosity follows `RUST_LOG` (default `info`).

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use reel_rank::{config, db, listing, server};

/// Reel Rank: a personal movie collection ranked by your own ratings.
#[derive(Parser)]
#[command(name = "reel-rank", version, about)]
struct Cli {
    /// Path to configuration file (TOML).
    #[arg(long, global = true, default_value = "./config/reel-rank.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize the database schema.
    ///
    /// Creates the SQLite file and the `movies` table. Safe to run twice.
    Init,

    /// Start the web server on `[server].bind`.
    Serve,

    /// Print the collection, best rank first.
    List,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let cfg = config::load_config(&cli.config)?;

    match cli.command {
        Commands::Init => {
            let pool = db::open(&cfg.db).await?;
            pool.close().await;
            println!("Database initialized successfully.");
        }
        Commands::Serve => {
            server::run_server(&cfg).await?;
        }
        Commands::List => {
            listing::run_list(&cfg).await?;
        }
    }

    Ok(())
}
