//! Decode command implementation.

use clap::Parser;

/// Decode command arguments.
#[derive(Parser)]
pub struct DecodeCommand {
    /// Path to the model file
    #[arg(short, long)]
    pub tokenizer: String,

    /// Token IDs to decode (space- or comma-separated)
    #[arg(required = true, num_args = 1.., value_delimiter = ',')]
    pub ids: Vec<u32>,

    /// Skip special tokens during decoding
    #[arg(short, long, default_value_t = false)]
    pub skip_special_tokens: bool,
}

use super::load;
use anyhow::Result as AnyhowResult;
use subtoken_tokenizer::Tokenizer;

pub fn run(cmd: DecodeCommand) -> AnyhowResult<()> {
    let tokenizer = load(Tokenizer::builder(), &cmd.tokenizer)?;

    let text = tokenizer.decode(&cmd.ids, cmd.skip_special_tokens)?;

    println!("{}", text);

    Ok(())
}
