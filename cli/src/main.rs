//! Subtoken CLI - Command-line interface for the subtoken tokenizer.
//!
//! This is the main entry point for the `subtoken` command-line tool.

mod commands;

use clap::{Parser, Subcommand};
use commands::{BenchmarkCommand, DecodeCommand, EncodeCommand, InfoCommand};
use tracing::Level;

#[derive(Parser)]
#[command(name = "subtoken")]
#[command(about = "Encode and decode text with a pre-trained BPE model", long_about = None)]
#[command(version)]
struct Cli {
    /// Log debug output to stderr
    #[arg(short, long, global = true, default_value_t = false)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Encode text to token IDs
    Encode(EncodeCommand),
    /// Decode token IDs back to text
    Decode(DecodeCommand),
    /// Show model details
    Info(InfoCommand),
    /// Benchmark encoding performance
    Benchmark(BenchmarkCommand),
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr so stdout stays machine-readable.
    let level = if cli.verbose { Level::DEBUG } else { Level::WARN };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Encode(cmd) => commands::encode::run(cmd)?,
        Commands::Decode(cmd) => commands::decode::run(cmd)?,
        Commands::Info(cmd) => commands::info::run(cmd)?,
        Commands::Benchmark(cmd) => commands::benchmark::run(cmd)?,
    }

    Ok(())
}
