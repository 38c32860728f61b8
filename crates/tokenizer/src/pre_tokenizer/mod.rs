//! Pre-tokenization pipeline.
//!
//! This module provides the steps applied before BPE encoding: text
//! normalization and splitting into spans.

pub mod normalize;
pub mod split;

pub use normalize::{NormalizationForm, Normalizer, NormalizerConfig};
pub use split::{Span, SplitPattern, Splitter};
