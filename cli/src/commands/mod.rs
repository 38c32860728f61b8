//! CLI commands for the subtoken tokenizer.

pub mod benchmark;
pub mod decode;
pub mod encode;
pub mod info;

pub use benchmark::BenchmarkCommand;
pub use decode::DecodeCommand;
pub use encode::EncodeCommand;
pub use info::InfoCommand;

use anyhow::{Context, Result};
use subtoken_tokenizer::{Tokenizer, TokenizerBuilder};

/// Load a model file with the given builder settings.
pub(crate) fn load(builder: TokenizerBuilder, path: &str) -> Result<Tokenizer> {
    builder
        .from_file(path)
        .with_context(|| format!("failed to load model {}", path))
}

/// Read `input`, or stdin when it is `-`.
pub(crate) fn read_input(input: String) -> Result<String> {
    if input == "-" {
        use std::io::Read;
        let mut buffer = String::new();
        std::io::stdin()
            .read_to_string(&mut buffer)
            .context("failed to read stdin")?;
        Ok(buffer)
    } else {
        Ok(input)
    }
}
