//! Benchmark command implementation.

use clap::Parser;

/// Benchmark command arguments.
#[derive(Parser)]
pub struct BenchmarkCommand {
    /// Path to the model file
    #[arg(short, long)]
    pub tokenizer: String,

    /// Path to input text file for benchmarking
    #[arg(short, long)]
    pub input: String,

    /// Number of iterations to run
    #[arg(short = 'n', long, default_value_t = 100)]
    pub iterations: usize,
}

use super::load;
use anyhow::{Context, Result as AnyhowResult};
use std::fs;
use std::time::Instant;
use subtoken_tokenizer::{EncodeOptions, Encoding, Tokenizer};

pub fn run(cmd: BenchmarkCommand) -> AnyhowResult<()> {
    let tokenizer = load(Tokenizer::builder(), &cmd.tokenizer)?;

    let text = fs::read_to_string(&cmd.input)
        .with_context(|| format!("failed to read {}", cmd.input))?;
    let lines: Vec<&str> = text.lines().filter(|l| !l.trim().is_empty()).collect();
    let iterations = cmd.iterations.max(1);

    println!("Benchmarking encoding...");
    println!("  Text length: {} bytes", text.len());
    println!("  Lines: {}", lines.len());
    println!("  Iterations: {}", iterations);
    println!();

    let options = EncodeOptions::new(false);
    let mut buffer = Encoding::default();

    // Warmup
    for line in &lines {
        tokenizer.encode_into(line, &options, &mut buffer)?;
    }

    let start = Instant::now();
    let mut tokens = 0usize;
    for _ in 0..iterations {
        for line in &lines {
            tokenizer.encode_into(line, &options, &mut buffer)?;
            tokens += buffer.len();
        }
    }
    let elapsed = start.elapsed();

    let avg_time_ms = elapsed.as_secs_f64() * 1000.0 / iterations as f64;
    let throughput = tokens as f64 / elapsed.as_secs_f64().max(f64::EPSILON);

    println!("Results:");
    println!("  Total time: {:.2}s", elapsed.as_secs_f64());
    println!("  Average time per pass: {:.3}ms", avg_time_ms);
    println!("  Throughput: {:.0} tokens/s", throughput);

    Ok(())
}
