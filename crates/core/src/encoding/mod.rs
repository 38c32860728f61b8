//! Subword encoding.
//!
//! This module provides the BPE subword model and the helpers it relies on:
//! - BPE: merge-rule segmentation of a single span
//! - Byte-level: GPT-2 style byte <-> unicode alphabet
//! - Byte fallback: `<0xXX>` spelling of unknown characters

pub mod bpe;
pub mod byte_fallback;
pub mod byte_level;

pub use bpe::{BpeConfig, BpeModel, Token, UnknownPolicy};
pub use byte_fallback::ByteFallback;
pub use byte_level::ByteAlphabet;
