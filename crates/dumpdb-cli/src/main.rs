use clap::Parser;
use std::path::PathBuf;
use tracing::Level;

use dumpdb_cli::{Commands, Context, OutputFormat, commands};

#[derive(Parser)]
#[command(
    name = "dumpdb",
    about = "Inspect append-only, timestamp-versioned result stores",
    version,
    author,
    long_about = "A command-line tool for listing dumpdb stores, their stored versions, and the latest or merged table they hold."
)]
struct Cli {
    /// Set the logging level
    #[arg(short, long, value_enum, global = true, default_value = "warn")]
    log_level: LogLevel,

    /// Directory holding the stores
    #[arg(short, long, global = true, env = "DUMPDB_WORK_DIR", default_value = "work")]
    work_dir: PathBuf,

    /// Store file extension
    #[arg(short, long, global = true, default_value = "ddb")]
    extension: String,

    /// Output format
    #[arg(short = 'o', long, value_enum, global = true, default_value = "text")]
    format: OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl From<LogLevel> for Level {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Trace => Level::TRACE,
            LogLevel::Debug => Level::DEBUG,
            LogLevel::Info => Level::INFO,
            LogLevel::Warn => Level::WARN,
            LogLevel::Error => Level::ERROR,
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr so JSON output stays parseable
    tracing_subscriber::fmt()
        .with_max_level(Level::from(cli.log_level))
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let ctx = Context {
        work_dir: cli.work_dir,
        extension: cli.extension,
        format: cli.format,
    };

    commands::handle(cli.command, &ctx)
}
