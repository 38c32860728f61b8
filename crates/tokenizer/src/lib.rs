//! Subtoken-tokenizer - High-level tokenizer API
//!
//! This crate turns a serialized BPE model into a ready-to-use tokenizer,
//! integrating all components (normalizer, pre-tokenizer, subword model,
//! special tokens, truncation and padding, decoder) into a single API.
//!
//! # Features
//!
//! - One JSON document per model (vocabulary, merges, pipeline settings)
//! - Unicode normalization, whitespace / BERT / regex / byte-level splitting
//! - Boundary tokens, truncation and fixed-length padding with aligned masks
//! - Immutable, `Send + Sync` tokenizer; reusable output buffers
//!
//! # Example
//!
//! ```rust
//! use subtoken_tokenizer::{Tokenizer, TokenizerOptions};
//!
//! let model = br#"{
//!     "model": {"vocab": {"[PAD]": 0, "[UNK]": 1, "[CLS]": 2, "[SEP]": 3, "hello": 4, "world": 5}},
//!     "special_tokens": {"pad": "[PAD]", "unk": "[UNK]", "cls": "[CLS]", "sep": "[SEP]"},
//!     "pre_tokenizer": {"type": "Whitespace"}
//! }"#;
//! let tokenizer = Tokenizer::from_bytes(model, TokenizerOptions::default())?;
//!
//! // Encode text
//! let encoding = tokenizer.encode("hello world", true)?;
//! assert_eq!(encoding.ids, vec![2, 4, 5, 3]);
//!
//! // Decode tokens
//! let text = tokenizer.decode(&encoding.ids, true)?;
//! assert_eq!(text, "hello world");
//! # Ok::<(), subtoken_tokenizer::TokenizerError>(())
//! ```

// Re-export core types
pub use subtoken_core::{
    BpeConfig, BpeModel, MergeRules, Result, SpecialTokensConfig, TokenizerError, UnknownPolicy,
    Vocabulary,
};

// Tokenizer API
pub mod tokenizer;
pub use tokenizer::{
    EncodeOptions, Encoding, Tokenizer, TokenizerBuilder, TokenizerOptions, MAX_INPUT_CHARS,
};

// Decoding
pub mod decoder;
pub use decoder::Decoder;

// IO/Serialization
pub mod io;
pub use io::{ModelLoader, ModelSaver, SerializedModel};

// Post-processing
pub mod post_processor;
pub use post_processor::{PaddingParams, PostProcessor, TruncationDirection, TruncationParams};

// Pre-tokenization
pub mod pre_tokenizer;
pub use pre_tokenizer::{NormalizationForm, Normalizer, NormalizerConfig, SplitPattern, Splitter};

// Utilities
pub mod utils;
pub use utils::truncate_string;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
