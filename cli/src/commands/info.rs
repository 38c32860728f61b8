//! Info command implementation.

use clap::Parser;

/// Info command arguments.
#[derive(Parser)]
pub struct InfoCommand {
    /// Path to the model file
    #[arg(short, long)]
    pub tokenizer: String,
}

use super::load;
use anyhow::Result as AnyhowResult;
use subtoken_tokenizer::Tokenizer;

pub fn run(cmd: InfoCommand) -> AnyhowResult<()> {
    let tokenizer = load(Tokenizer::builder(), &cmd.tokenizer)?;
    let vocab = tokenizer.vocab();
    let processor = tokenizer.post_processor();

    println!("Model: {}", cmd.tokenizer);
    println!("  Vocabulary size: {}", tokenizer.vocab_size());
    println!("  Merge rules: {}", tokenizer.model().merges().len());
    println!("  Pre-tokenizer: {:?}", tokenizer.splitter().pattern());
    println!("  Normalizer: {:?}", tokenizer.normalizer().config());
    println!("  Decoder: {:?}", tokenizer.decoder());

    let handler = processor.handler();
    let boundary = |token: Option<(u32, &str)>| match token {
        Some((id, token)) => format!("{} ({})", token, id),
        None => "none".to_string(),
    };
    println!("  Start token: {}", boundary(handler.bos()));
    println!("  End token: {}", boundary(handler.eos()));

    println!("Special tokens:");
    for (id, token) in vocab.special_entries() {
        println!("  {:>6}  {}", id, token);
    }

    match processor.truncation() {
        Some(t) => println!("Truncation: {} ({:?})", t.max_length, t.direction),
        None => println!("Truncation: none"),
    }
    match processor.padding() {
        Some(p) => println!("Padding: {} with {} ({})", p.length, p.pad_token, p.pad_id),
        None => println!("Padding: none"),
    }

    Ok(())
}
