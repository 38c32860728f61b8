//! Main tokenizer implementation.
//!
//! This module provides the high-level `Tokenizer` struct that ties the
//! normalizer, pre-tokenizer, BPE model and post-processor into one
//! encode pipeline, plus decoding back to text.

mod encoding;

pub use encoding::{EncodeOptions, Encoding};

use crate::decoder::{DecodePiece, Decoder};
use crate::io::{ModelLoader, ModelParts};
use crate::post_processor::{
    PaddingParams, PostProcessor, SpecialTokenHandler, TextPiece, TruncationDirection,
    TruncationParams,
};
use crate::pre_tokenizer::{Normalizer, Splitter};
use crate::utils::truncate_string;
use std::path::Path;
use subtoken_core::{BpeModel, Result, TokenizerError, Vocabulary};
use tracing::{debug, info};

/// Safety ceiling on input length, in characters (20 x 512).
pub const MAX_INPUT_CHARS: usize = 20 * 512;

/// Construction-time options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenizerOptions {
    /// Recognize special token text inside the input
    pub encode_special_tokens: bool,
    /// Input is cut to this many characters before anything else
    pub max_input_chars: usize,
}

impl Default for TokenizerOptions {
    fn default() -> Self {
        Self {
            encode_special_tokens: false,
            max_input_chars: MAX_INPUT_CHARS,
        }
    }
}

/// Padding requested through the builder.
#[derive(Debug, Clone)]
enum PaddingRequest {
    /// ID 0 and `[PAD]`
    Fixed(usize),
    /// The vocabulary's pad token
    PadToken(usize),
    Params(PaddingParams),
}

/// Builder for creating a tokenizer.
///
/// Truncation and padding set here take precedence over the model data.
#[derive(Debug, Clone, Default)]
pub struct TokenizerBuilder {
    options: TokenizerOptions,
    truncation: Option<TruncationParams>,
    padding: Option<PaddingRequest>,
}

impl TokenizerBuilder {
    /// Create a new tokenizer builder with default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace all options.
    pub fn options(mut self, options: TokenizerOptions) -> Self {
        self.options = options;
        self
    }

    /// Recognize special token text inside the input.
    pub fn encode_special_tokens(mut self, enabled: bool) -> Self {
        self.options.encode_special_tokens = enabled;
        self
    }

    /// Set the input safety ceiling, in characters.
    pub fn max_input_chars(mut self, max_chars: usize) -> Self {
        self.options.max_input_chars = max_chars;
        self
    }

    /// Truncate every encoding to `max_length` tokens.
    pub fn truncation(mut self, max_length: usize, direction: TruncationDirection) -> Self {
        self.truncation = Some(TruncationParams::new(max_length, direction));
        self
    }

    /// Pad every encoding to `length` with ID 0 and `[PAD]`.
    pub fn padding(mut self, length: usize) -> Self {
        self.padding = Some(PaddingRequest::Fixed(length));
        self
    }

    /// Pad every encoding to `length` with the vocabulary's pad token.
    ///
    /// Falls back to ID 0 and `[PAD]` when the vocabulary names none.
    pub fn padding_with_pad_token(mut self, length: usize) -> Self {
        self.padding = Some(PaddingRequest::PadToken(length));
        self
    }

    /// Pad with explicit parameters.
    pub fn padding_params(mut self, params: PaddingParams) -> Self {
        self.padding = Some(PaddingRequest::Params(params));
        self
    }

    /// Build from model data held in memory.
    pub fn from_bytes(self, bytes: &[u8]) -> Result<Tokenizer> {
        let parts = ModelLoader::from_bytes(bytes)?;
        self.assemble(parts)
    }

    /// Build from a model file.
    pub fn from_file(self, path: impl AsRef<Path>) -> Result<Tokenizer> {
        let parts = ModelLoader::from_file(path)?;
        self.assemble(parts)
    }

    /// Build from already constructed components.
    ///
    /// The decoder is derived from the splitter.
    pub fn from_model(
        self,
        model: BpeModel,
        normalizer: Normalizer,
        splitter: Splitter,
    ) -> Result<Tokenizer> {
        let decoder = Decoder::for_splitter(splitter.pattern());
        self.assemble(ModelParts {
            model,
            normalizer,
            splitter,
            decoder,
            truncation: None,
            padding: None,
        })
    }

    fn assemble(self, parts: ModelParts) -> Result<Tokenizer> {
        let vocab = parts.model.vocab();

        let truncation = self.truncation.or(parts.truncation);
        let padding = match self.padding {
            Some(PaddingRequest::Fixed(length)) => Some(PaddingParams::new(length)),
            Some(PaddingRequest::PadToken(length)) => Some(PaddingParams::for_vocab(length, vocab)),
            Some(PaddingRequest::Params(params)) => Some(params),
            None => parts.padding,
        };
        if let Some(padding) = &padding {
            if padding.pad_id as usize >= vocab.len() {
                return Err(TokenizerError::InvalidConfig(format!(
                    "pad ID {} is outside the vocabulary ({} entries)",
                    padding.pad_id,
                    vocab.len()
                )));
            }
        }

        let handler = SpecialTokenHandler::new(vocab, self.options.encode_special_tokens)?;

        info!(
            vocab_size = vocab.len(),
            merges = parts.model.merges().len(),
            pre_tokenizer = ?parts.splitter.pattern(),
            truncation = ?truncation.map(|t| t.max_length),
            padding = ?padding.as_ref().map(|p| p.length),
            "loaded tokenizer model"
        );

        Ok(Tokenizer {
            model: parts.model,
            normalizer: parts.normalizer,
            splitter: parts.splitter,
            decoder: parts.decoder,
            post_processor: PostProcessor::new(handler, truncation, padding),
            options: self.options,
        })
    }
}

/// Main tokenizer struct.
///
/// Immutable once built: every method takes `&self`, so one instance can
/// be shared across threads (e.g. behind an `Arc`).
#[derive(Debug, Clone)]
pub struct Tokenizer {
    model: BpeModel,
    normalizer: Normalizer,
    splitter: Splitter,
    decoder: Decoder,
    post_processor: PostProcessor,
    options: TokenizerOptions,
}

impl Tokenizer {
    /// Create a tokenizer builder.
    pub fn builder() -> TokenizerBuilder {
        TokenizerBuilder::new()
    }

    /// Load a tokenizer from model data held in memory.
    pub fn from_bytes(bytes: &[u8], options: TokenizerOptions) -> Result<Self> {
        Self::builder().options(options).from_bytes(bytes)
    }

    /// Load a tokenizer from a model file.
    pub fn from_file(path: impl AsRef<Path>, options: TokenizerOptions) -> Result<Self> {
        Self::builder().options(options).from_file(path)
    }

    /// Load a tokenizer that truncates and pads every encoding to `max_len`.
    ///
    /// Padded positions get ID 0 and `[PAD]`.
    pub fn from_bytes_with_truncation(
        bytes: &[u8],
        max_len: u32,
        direction: TruncationDirection,
    ) -> Result<Self> {
        let max_len = max_len as usize;
        Self::builder()
            .truncation(max_len, direction)
            .padding(max_len)
            .from_bytes(bytes)
    }

    /// Encode text to token IDs and token strings.
    ///
    /// # Arguments
    /// * `text` - The text to encode
    /// * `add_special_tokens` - Whether to add boundary tokens (start / end)
    pub fn encode(&self, text: &str, add_special_tokens: bool) -> Result<Encoding> {
        self.encode_with_options(text, &EncodeOptions::new(add_special_tokens))
    }

    /// Encode text, keeping the sequences `options` asks for.
    pub fn encode_with_options(&self, text: &str, options: &EncodeOptions) -> Result<Encoding> {
        let content = self.encode_content(text)?;
        let mut encoding = self
            .post_processor
            .process(content, None, options.add_special_tokens);
        encoding.retain_requested(options);
        Ok(encoding)
    }

    /// Encode text into a reusable buffer.
    ///
    /// The buffer is reset first, so it never holds stale positions, even
    /// when encoding fails.
    pub fn encode_into(
        &self,
        text: &str,
        options: &EncodeOptions,
        buffer: &mut Encoding,
    ) -> Result<()> {
        buffer.reset();
        self.encode_with_options(text, options)?.move_into(buffer);
        Ok(())
    }

    /// Encode a pair of texts; the second gets type ID 1.
    pub fn encode_pair(
        &self,
        first: &str,
        second: &str,
        options: &EncodeOptions,
    ) -> Result<Encoding> {
        let first = self.encode_content(first)?;
        let second = self.encode_content(second)?;
        let mut encoding =
            self.post_processor
                .process(first, Some(second), options.add_special_tokens);
        encoding.retain_requested(options);
        Ok(encoding)
    }

    /// Run text through every step up to the subword model.
    fn encode_content(&self, text: &str) -> Result<Encoding> {
        let limited = truncate_string(text, self.options.max_input_chars);
        if limited.len() < text.len() {
            debug!(
                max_chars = self.options.max_input_chars,
                dropped_bytes = text.len() - limited.len(),
                "input exceeds safety ceiling, truncating"
            );
        }

        let mut content = Encoding::default();
        for piece in self.post_processor.handler().split_special(limited) {
            match piece {
                TextPiece::Special { id, content: token } => content.push(id, token, 0, true),
                TextPiece::Text(text) => self.encode_text(text, &mut content)?,
            }
        }

        Ok(content)
    }

    fn encode_text(&self, text: &str, out: &mut Encoding) -> Result<()> {
        let normalized = self.normalizer.normalize(text);
        for span in self.splitter.segment(&normalized) {
            for token in self.model.segment_to_subwords(&span.text)? {
                out.push(token.id, token.value, 0, false);
            }
        }
        Ok(())
    }

    /// Decode token IDs back to text.
    ///
    /// # Arguments
    /// * `ids` - The token IDs to decode
    /// * `skip_special_tokens` - Whether to leave special tokens out
    pub fn decode(&self, ids: &[u32], skip_special_tokens: bool) -> Result<String> {
        if ids.is_empty() {
            return Ok(String::new());
        }

        let vocab = self.model.vocab();
        let mut pieces = Vec::with_capacity(ids.len());
        for &id in ids {
            let token = vocab.reverse(id)?;
            let special = vocab.special.is_special(id);
            if special && skip_special_tokens {
                continue;
            }
            pieces.push(DecodePiece { token, special });
        }

        Ok(self.decoder.decode(&pieces, self.model.config()))
    }

    /// Get the vocabulary size, special tokens included.
    pub fn vocab_size(&self) -> usize {
        self.model.vocab().len()
    }

    /// Get a reference to the vocabulary.
    pub fn vocab(&self) -> &Vocabulary {
        self.model.vocab()
    }

    pub fn model(&self) -> &BpeModel {
        &self.model
    }

    pub fn normalizer(&self) -> &Normalizer {
        &self.normalizer
    }

    pub fn splitter(&self) -> &Splitter {
        &self.splitter
    }

    pub fn decoder(&self) -> &Decoder {
        &self.decoder
    }

    pub fn post_processor(&self) -> &PostProcessor {
        &self.post_processor
    }

    pub fn options(&self) -> &TokenizerOptions {
        &self.options
    }
}
