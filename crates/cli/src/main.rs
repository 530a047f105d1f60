mod commands;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::error;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "seedmatch", version)]
#[command(about = "Seed torrents from content you already have on disk", long_about = None)]
struct Cli {
    /// Configuration file
    #[arg(long, env = "SEEDMATCH_CONFIG", default_value = "config.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Rescan the source roots and persist the content index
    Rebuild,
    /// Match torrents against the index and hand them to the client
    Add {
        /// Only report how each torrent would match
        #[arg(long)]
        dry_run: bool,
        /// .torrent files to process, in order
        #[arg(required = true)]
        torrents: Vec<PathBuf>,
    },
    /// Print the effective configuration (secrets redacted)
    Config,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match run(Cli::parse()).await {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(e) => {
            error!("Fatal error: {:#}", e);
            std::process::exit(1);
        }
    }
}

/// Returns `false` when some torrent failed.
async fn run(cli: Cli) -> Result<bool> {
    let config = commands::load(&cli.config)?;

    match cli.command {
        Command::Rebuild => {
            commands::rebuild(&config)?;
            Ok(true)
        }
        Command::Add { dry_run, torrents } => {
            if dry_run {
                commands::inspect(&config, &torrents).await
            } else {
                commands::add(&config, &torrents).await
            }
        }
        Command::Config => {
            commands::print_config(&config)?;
            Ok(true)
        }
    }
}
