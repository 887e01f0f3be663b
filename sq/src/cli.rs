//! CLI command definitions and subcommands

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::strategy::Strategy;

/// SeriesQueue - priority-biased fetch ordering
#[derive(Parser, Debug)]
#[command(name = "sq")]
#[command(author, version, about = "Replay and inspect series fetch queues", long_about = None)]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Replay a YAML scenario file
    Run {
        /// Scenario file
        #[arg(required = true)]
        scenario: PathBuf,

        /// Override the strategy from config and scenario
        #[arg(short, long)]
        strategy: Option<Strategy>,

        /// Print outcomes as JSON lines
        #[arg(long)]
        json: bool,
    },

    /// Queue synthetic series and drain them slot by slot
    Demo {
        /// Ordering strategy (default: from config)
        #[arg(short, long)]
        strategy: Option<Strategy>,

        /// Number of series to add
        #[arg(long, default_value = "3")]
        series: usize,

        /// Items per series
        #[arg(long, default_value = "6")]
        items: usize,

        /// Entries per slot (default: from config)
        #[arg(long)]
        slot: Option<usize>,

        /// Key of the series to prioritize (keys are k1, k2, ...)
        #[arg(short, long)]
        active: Option<String>,

        /// 1-based item position to prioritize within the active series
        #[arg(short, long, requires = "active")]
        index: Option<usize>,
    },

    /// List available strategies
    Strategies,
}
