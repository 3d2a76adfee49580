//! Command-line interface definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Lyrebird - multi-venue market data aggregation and decision-gated execution.
#[derive(Parser, Debug)]
#[command(name = "lyrebird")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the monitor loop (foreground)
    Run(ConfigPathArg),

    /// Validate the configuration file and exit
    Check(ConfigPathArg),

    /// Probe every configured venue once and report reachability
    Venues(ConfigPathArg),
}

/// Shared argument for commands that only need a config path.
#[derive(Parser, Debug)]
pub struct ConfigPathArg {
    /// Path to configuration file
    #[arg(short, long, default_value = "config.toml")]
    pub config: PathBuf,
}
