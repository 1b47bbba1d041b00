mod commands;
mod config;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::commands::{analyze, detect, dump, keys};
use crate::config::Config;

#[derive(Parser, Debug)]
#[command(name = "rfctl", version, about = "Capture, analyze and recognize LIRC IR/RF remote keys")]
struct Cli {
    /// Verbose logging (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// JSON configuration file
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Copy raw records from the receiver device
    Dump(dump::DumpArgs),
    /// Inspect a capture or extract a key from it
    Analyze(analyze::AnalyzeArgs),
    /// Print the names of recognized keys
    Detect(detect::DetectArgs),
    /// List the key library
    Keys(keys::KeysArgs),
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "info,rfctl=debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = Config::load(cli.config.as_deref())?;
    tracing::debug!(?config, "Configuration loaded");

    match cli.command {
        Command::Dump(args) => dump::run(args, &config),
        Command::Analyze(args) => analyze::run(args, &config),
        Command::Detect(args) => detect::run(args, &config),
        Command::Keys(args) => keys::run(args, &config),
    }
}
