//! Command-line argument definitions.

use std::path::PathBuf;

use bt_core::CacheVisibility;
use clap::{Args, Parser, Subcommand};

/// Xcode build timeline viewer.
///
/// Reads an activity log (and optionally the target dependency graph) and
/// reports where the build spent its time.
#[derive(Debug, Parser)]
#[command(name = "bt", version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to config file.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Show build title, duration, peak concurrency and blockers.
    Summary {
        #[command(flatten)]
        log: LogArgs,
    },

    /// List events with their timing and dependencies.
    Events {
        #[command(flatten)]
        log: LogArgs,

        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },

    /// List concurrency periods.
    Periods {
        #[command(flatten)]
        log: LogArgs,

        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },

    /// List events whose completion let other work start.
    Blockers {
        #[command(flatten)]
        log: LogArgs,
    },

    /// Count build steps per type.
    Steps {
        #[command(flatten)]
        log: LogArgs,
    },
}

/// Input files and filter overrides shared by every subcommand.
#[derive(Debug, Clone, Args)]
pub struct LogArgs {
    /// Activity log (`.xcactivitylog`, gzip-compressed or plain).
    pub log: PathBuf,

    /// Target dependency graph (`*-targetGraph.txt`).
    #[arg(long, value_name = "FILE")]
    pub deps: Option<PathBuf>,

    /// Keep every step type instead of only compilation steps.
    #[arg(long)]
    pub all_types: bool,

    /// Which steps to show by cache state: all, cached or current-build.
    #[arg(long, value_name = "MODE")]
    pub cache: Option<CacheVisibility>,
}
