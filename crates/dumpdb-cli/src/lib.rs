//! dumpdb command-line library
//!
//! Argument types and command handlers behind the `dumpdb` binary.

pub mod commands;
pub mod output;

use clap::{Subcommand, ValueEnum};
use std::path::PathBuf;

/// Output format for command results
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable tables
    Text,
    /// JSON
    Json,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Summarise every store in a directory
    List {
        /// Directory to scan (defaults to the work directory)
        dir: Option<PathBuf>,

        /// Also report files that were skipped
        #[arg(long)]
        skipped: bool,
    },

    /// List the stored versions of a store
    Versions {
        /// Store name
        name: String,
    },

    /// Print the table held by a store
    Show {
        /// Store name
        name: String,

        /// Merge every version instead of showing the latest
        #[arg(short, long)]
        all: bool,

        /// Add a timestamp column with each row's version time
        #[arg(short, long)]
        timestamp: bool,

        /// Show exactly this version
        #[arg(long, conflicts_with = "all")]
        version: Option<String>,

        /// Print at most this many rows
        #[arg(short = 'n', long)]
        limit: Option<usize>,
    },
}

/// Settings shared by every command
#[derive(Clone, Debug)]
pub struct Context {
    /// Directory holding the stores
    pub work_dir: PathBuf,
    /// Store file extension
    pub extension: String,
    /// Output format
    pub format: OutputFormat,
}
