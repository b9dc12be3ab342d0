use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

#[derive(Parser)]
#[command(name = "scroll-animate")]
#[command(author, version, about = "Replay and lint scroll animation scenes")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Replay a scene and print element states after each step
    Simulate {
        /// Scene file (TOML)
        scene: PathBuf,
        /// Print the report as JSON
        #[arg(long)]
        json: bool,
        /// Only print the final frame
        #[arg(short, long)]
        last: bool,
    },
    /// Lint a scene's markup without running it
    Check {
        /// Scene file (TOML)
        scene: PathBuf,
    },
    /// Print the default animator configuration
    Config {
        /// Merge this TOML file over the defaults first
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    // Logs go to stderr so reports on stdout stay machine readable
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "warn".into()),
        ))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Simulate { scene, json, last } => commands::simulate::run(&scene, json, last),
        Commands::Check { scene } => commands::check::run(&scene),
        Commands::Config { file } => commands::config::run(file.as_deref()),
    }
}
