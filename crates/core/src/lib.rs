//! Subtoken-core - Core BPE data structures and subword model
//!
//! This crate provides the fundamental data structures and algorithms for
//! byte-pair encoding (BPE), independent of normalization, pre-tokenization
//! and post-processing.
//!
//! # Features
//!
//! - Dense vocabulary storage using `AHashMap` and compact strings
//! - Fast merge rule lookups and an 8-ary merge priority queue
//! - Special token registry (padding, unknown, boundary, mask, additional)
//! - Unknown handling: unknown token, byte fallback, or rejection
//!
//! # Example
//!
//! ```rust
//! use subtoken_core::{BpeConfig, BpeModel, MergeRules, Vocabulary};
//!
//! let vocab = Vocabulary::from_tokens(["h", "i", "hi"])?;
//! let merges = MergeRules::from_token_pairs(&vocab, [("h", "i")], None)?;
//! let model = BpeModel::new(vocab, merges, BpeConfig::default());
//!
//! let tokens = model.segment_to_subwords("hi")?;
//! assert_eq!(tokens[0].id, 2);
//! # Ok::<(), subtoken_core::TokenizerError>(())
//! ```

pub mod error;
pub use error::{Result, TokenizerError};

// Core BPE data structures
pub mod core;
pub use core::{
    MergeCandidate, MergeMap, MergeQueue, MergeRules, Pair, SpecialTokens, SpecialTokensConfig,
    Vocab, VocabR, Vocabulary,
};

// Subword model
pub mod encoding;
pub use encoding::{BpeConfig, BpeModel, ByteAlphabet, ByteFallback, Token, UnknownPolicy};
