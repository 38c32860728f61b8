//! Core BPE data structures.
//!
//! This module contains the vocabulary store, the merge rules and the merge
//! priority queue, independent of any specific encoding mode.

pub mod merges;
pub mod priority;
pub mod vocab;

pub use merges::{MergeMap, MergeRules, Pair};
pub use priority::{MergeCandidate, MergeQueue};
pub use vocab::{SpecialTokens, SpecialTokensConfig, Vocab, VocabR, Vocabulary};
