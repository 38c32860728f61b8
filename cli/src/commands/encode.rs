//! Encode command implementation.

use clap::Parser;

/// Encode command arguments.
#[derive(Parser)]
pub struct EncodeCommand {
    /// Path to the model file
    #[arg(short, long)]
    pub tokenizer: String,

    /// Text to encode ("-" reads stdin)
    #[arg(short, long)]
    pub input: String,

    /// Add boundary tokens (start / end of sequence)
    #[arg(short, long, default_value_t = false)]
    pub special_tokens: bool,

    /// Truncate and pad to this many tokens
    #[arg(long)]
    pub max_length: Option<u32>,

    /// Which end truncation drops tokens from
    #[arg(long, default_value = "right")]
    pub direction: TruncationDirection,

    /// Pad with the model's own pad token instead of ID 0
    #[arg(long, default_value_t = false)]
    pub use_pad_token: bool,

    /// Treat special token text in the input as special tokens
    #[arg(long, default_value_t = false)]
    pub encode_special_tokens: bool,

    /// Print the full encoding as JSON
    #[arg(long, default_value_t = false)]
    pub json: bool,
}

use super::{load, read_input};
use anyhow::Result as AnyhowResult;
use subtoken_tokenizer::{EncodeOptions, Tokenizer, TruncationDirection};

pub fn run(cmd: EncodeCommand) -> AnyhowResult<()> {
    let mut builder = Tokenizer::builder().encode_special_tokens(cmd.encode_special_tokens);
    if let Some(max_length) = cmd.max_length {
        let max_length = max_length as usize;
        builder = builder.truncation(max_length, cmd.direction);
        builder = if cmd.use_pad_token {
            builder.padding_with_pad_token(max_length)
        } else {
            builder.padding(max_length)
        };
    }
    let tokenizer = load(builder, &cmd.tokenizer)?;

    let input_text = read_input(cmd.input)?;

    if cmd.json {
        let encoding = tokenizer
            .encode_with_options(&input_text, &EncodeOptions::all(cmd.special_tokens))?;
        println!("{}", serde_json::to_string(&encoding)?);
    } else {
        let encoding = tokenizer.encode(&input_text, cmd.special_tokens)?;
        let ids_str: Vec<String> = encoding.ids.iter().map(|id| id.to_string()).collect();
        println!("{}", ids_str.join(" "));
    }

    Ok(())
}
