//! Vocabulary storage and lookup.
//!
//! This module provides the bidirectional token <-> ID store. The forward map
//! uses AHashMap for fast lookups and CompactString for memory-efficient
//! string storage; because IDs are dense, the reverse map is a plain `Vec`.

use crate::error::{Result, TokenizerError};
use ahash::AHashMap;
use compact_str::CompactString;
use serde::{Deserialize, Serialize};

/// Forward mapping: token string -> ID
pub type Vocab = AHashMap<CompactString, u32>;

/// Reverse mapping: ID -> token string, indexed by ID
pub type VocabR = Vec<CompactString>;

/// Vocabulary with forward and reverse mappings.
///
/// IDs are always `0..len()`, each assigned to exactly one token.
#[derive(Debug, Clone)]
pub struct Vocabulary {
    /// Forward mapping: token string -> ID
    vocab: Vocab,
    /// Reverse mapping: ID -> token string
    vocab_r: VocabR,
    /// Special token IDs (cached for fast access)
    pub special: SpecialTokens,
}

impl Vocabulary {
    /// Create a new empty vocabulary.
    pub fn new() -> Self {
        Self {
            vocab: Vocab::new(),
            vocab_r: VocabR::new(),
            special: SpecialTokens::default(),
        }
    }

    /// Create a new vocabulary with capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            vocab: Vocab::with_capacity(capacity),
            vocab_r: VocabR::with_capacity(capacity),
            special: SpecialTokens::default(),
        }
    }

    /// Build a vocabulary from `(token, id)` entries.
    ///
    /// Fails if an ID appears twice or the IDs do not cover `0..n` exactly.
    pub fn from_map<I, S>(entries: I) -> Result<Self>
    where
        I: IntoIterator<Item = (S, u32)>,
        S: AsRef<str>,
    {
        let entries: Vec<(S, u32)> = entries.into_iter().collect();
        let len = entries.len();
        let mut slots: Vec<Option<CompactString>> = vec![None; len];
        let mut vocab = Vocab::with_capacity(len);

        for (token, id) in entries {
            let token = CompactString::new(token.as_ref());
            let slot = slots.get_mut(id as usize).ok_or_else(|| {
                TokenizerError::ModelLoad(format!(
                    "token {:?} has ID {} but the vocabulary only holds {} entries",
                    token, id, len
                ))
            })?;
            if let Some(existing) = slot {
                return Err(TokenizerError::ModelLoad(format!(
                    "ID {} is assigned to both {:?} and {:?}",
                    id, existing, token
                )));
            }
            if vocab.insert(token.clone(), id).is_some() {
                return Err(TokenizerError::ModelLoad(format!(
                    "token {:?} appears more than once",
                    token
                )));
            }
            *slot = Some(token);
        }

        // Every slot is filled: `len` distinct IDs, all below `len`.
        let vocab_r = slots.into_iter().flatten().collect();

        Ok(Self {
            vocab,
            vocab_r,
            special: SpecialTokens::default(),
        })
    }

    /// Build a vocabulary from tokens ordered by ID.
    pub fn from_tokens<I, S>(tokens: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut vocab = Self::new();
        for token in tokens {
            let expected = vocab.len() as u32;
            let id = vocab.add_token(token.as_ref());
            if id != expected {
                return Err(TokenizerError::ModelLoad(format!(
                    "token {:?} appears more than once",
                    token.as_ref()
                )));
            }
        }
        Ok(vocab)
    }

    /// Add a token to the vocabulary.
    ///
    /// Returns the ID assigned to the token, reusing the existing one if the
    /// token is already present.
    pub fn add_token(&mut self, token: &str) -> u32 {
        if let Some(&id) = self.vocab.get(token) {
            return id;
        }

        let token = CompactString::new(token);
        let id = self.vocab_r.len() as u32;
        self.vocab_r.push(token.clone());
        self.vocab.insert(token, id);

        id
    }

    /// Get the ID for a token string, without unknown fallback.
    #[inline]
    pub fn get_id(&self, token: &str) -> Option<u32> {
        self.vocab.get(token).copied()
    }

    /// Get the ID for a token string, falling back to the unknown ID.
    ///
    /// Returns `None` only when the token is absent and no unknown token is
    /// configured.
    #[inline]
    pub fn lookup(&self, token: &str) -> Option<u32> {
        self.get_id(token).or(self.special.unk)
    }

    /// Get the token string for an ID.
    #[inline]
    pub fn get_token(&self, id: u32) -> Option<&str> {
        self.vocab_r.get(id as usize).map(|s| s.as_str())
    }

    /// Get the token string for an ID, failing on IDs outside the vocabulary.
    #[inline]
    pub fn reverse(&self, id: u32) -> Result<&str> {
        self.get_token(id)
            .ok_or(TokenizerError::InvalidTokenId(id))
    }

    /// Check whether a token string is present.
    #[inline]
    pub fn contains(&self, token: &str) -> bool {
        self.vocab.contains_key(token)
    }

    /// Get the size of the vocabulary.
    #[inline]
    pub fn len(&self) -> usize {
        self.vocab_r.len()
    }

    /// Check if the vocabulary is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.vocab_r.is_empty()
    }

    /// Iterate over `(id, token)` in ID order.
    pub fn iter(&self) -> impl Iterator<Item = (u32, &str)> + '_ {
        self.vocab_r
            .iter()
            .enumerate()
            .map(|(id, token)| (id as u32, token.as_str()))
    }

    /// Register special tokens.
    ///
    /// Tokens already in the vocabulary keep their ID; missing ones are
    /// appended at the next free ID, so special IDs never collide with
    /// learned ones.
    pub fn add_special_tokens(&mut self, special: &SpecialTokensConfig) {
        if let Some(pad) = &special.pad {
            self.special.pad = Some(self.add_token(pad));
        }
        if let Some(unk) = &special.unk {
            self.special.unk = Some(self.add_token(unk));
        }
        if let Some(bos) = &special.bos {
            self.special.bos = Some(self.add_token(bos));
        }
        if let Some(eos) = &special.eos {
            self.special.eos = Some(self.add_token(eos));
        }
        if let Some(mask) = &special.mask {
            self.special.mask = Some(self.add_token(mask));
        }
        for token in &special.additional {
            let id = self.add_token(token);
            if !self.special.additional.contains(&id) {
                self.special.additional.push(id);
            }
        }
    }

    /// All special tokens as `(id, content)`, deduplicated, in ID order.
    pub fn special_entries(&self) -> Vec<(u32, &str)> {
        let mut ids: Vec<u32> = self.special.ids().collect();
        ids.sort_unstable();
        ids.dedup();
        ids.into_iter()
            .filter_map(|id| self.get_token(id).map(|token| (id, token)))
            .collect()
    }

    /// Rebuild the string form of the special token configuration.
    pub fn special_tokens_config(&self) -> SpecialTokensConfig {
        let name = |id: Option<u32>| id.and_then(|id| self.get_token(id)).map(str::to_string);
        SpecialTokensConfig {
            pad: name(self.special.pad),
            unk: name(self.special.unk),
            bos: name(self.special.bos),
            eos: name(self.special.eos),
            mask: name(self.special.mask),
            additional: self
                .special
                .additional
                .iter()
                .filter_map(|&id| self.get_token(id).map(str::to_string))
                .collect(),
        }
    }
}

impl Default for Vocabulary {
    fn default() -> Self {
        Self::new()
    }
}

/// Special token IDs cached for fast access.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SpecialTokens {
    /// Padding token ID
    pub pad: Option<u32>,
    /// Unknown token ID
    pub unk: Option<u32>,
    /// Start-of-sequence / classifier token ID
    pub bos: Option<u32>,
    /// End-of-sequence / separator token ID
    pub eos: Option<u32>,
    /// Mask token ID
    pub mask: Option<u32>,
    /// Any other reserved tokens
    pub additional: Vec<u32>,
}

impl SpecialTokens {
    /// Check if an ID is a special token.
    #[inline]
    pub fn is_special(&self, id: u32) -> bool {
        Some(id) == self.pad
            || Some(id) == self.unk
            || Some(id) == self.bos
            || Some(id) == self.eos
            || Some(id) == self.mask
            || self.additional.contains(&id)
    }

    /// Iterate over every configured special ID (may repeat).
    pub fn ids(&self) -> impl Iterator<Item = u32> + '_ {
        [self.pad, self.unk, self.bos, self.eos, self.mask]
            .into_iter()
            .flatten()
            .chain(self.additional.iter().copied())
    }
}

/// Configuration for special tokens, by content.
///
/// Used during tokenizer construction to specify which special tokens exist.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpecialTokensConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pad: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unk: Option<String>,
    #[serde(alias = "cls", skip_serializing_if = "Option::is_none")]
    pub bos: Option<String>,
    #[serde(alias = "sep", skip_serializing_if = "Option::is_none")]
    pub eos: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mask: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub additional: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_token() {
        let mut vocab = Vocabulary::new();
        let id1 = vocab.add_token("hello");
        let id2 = vocab.add_token("world");

        assert_eq!(id1, 0);
        assert_eq!(id2, 1);
        assert_eq!(vocab.get_id("hello"), Some(0));
        assert_eq!(vocab.get_id("world"), Some(1));
        assert_eq!(vocab.get_token(0), Some("hello"));
        assert_eq!(vocab.get_token(1), Some("world"));
    }

    #[test]
    fn test_add_duplicate_token() {
        let mut vocab = Vocabulary::new();
        let id1 = vocab.add_token("hello");
        let id2 = vocab.add_token("hello");

        assert_eq!(id1, id2);
        assert_eq!(vocab.len(), 1);
    }

    #[test]
    fn test_from_map_dense() {
        let vocab = Vocabulary::from_map([("b", 1), ("a", 0), ("c", 2)]).unwrap();
        assert_eq!(vocab.len(), 3);
        assert_eq!(vocab.get_token(0), Some("a"));
        assert_eq!(vocab.get_token(2), Some("c"));
        let ordered: Vec<_> = vocab.iter().map(|(_, t)| t).collect();
        assert_eq!(ordered, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_from_map_rejects_gap() {
        let err = Vocabulary::from_map([("a", 0), ("b", 2)]).unwrap_err();
        assert!(matches!(err, TokenizerError::ModelLoad(_)));
    }

    #[test]
    fn test_from_map_rejects_duplicate_id() {
        let err = Vocabulary::from_map([("a", 0), ("b", 0)]).unwrap_err();
        assert!(matches!(err, TokenizerError::ModelLoad(_)));
    }

    #[test]
    fn test_from_tokens_rejects_duplicate_token() {
        assert!(Vocabulary::from_tokens(["a", "b", "a"]).is_err());
    }

    #[test]
    fn test_lookup_falls_back_to_unk() {
        let mut vocab = Vocabulary::from_tokens(["hello"]).unwrap();
        assert_eq!(vocab.lookup("nope"), None);

        vocab.add_special_tokens(&SpecialTokensConfig {
            unk: Some("<unk>".to_string()),
            ..Default::default()
        });
        assert_eq!(vocab.lookup("nope"), Some(1));
        assert_eq!(vocab.lookup("hello"), Some(0));
    }

    #[test]
    fn test_reverse_invalid_id() {
        let vocab = Vocabulary::from_tokens(["a"]).unwrap();
        assert_eq!(vocab.reverse(0).unwrap(), "a");
        assert!(matches!(
            vocab.reverse(7),
            Err(TokenizerError::InvalidTokenId(7))
        ));
    }

    #[test]
    fn test_special_tokens() {
        let mut vocab = Vocabulary::from_tokens(["[PAD]", "hello"]).unwrap();
        vocab.add_special_tokens(&SpecialTokensConfig {
            pad: Some("[PAD]".to_string()),
            bos: Some("<bos>".to_string()),
            eos: Some("<eos>".to_string()),
            additional: vec!["<tool>".to_string()],
            ..Default::default()
        });

        // Existing token keeps its ID, new ones are appended densely.
        assert_eq!(vocab.special.pad, Some(0));
        assert_eq!(vocab.special.bos, Some(2));
        assert_eq!(vocab.special.eos, Some(3));
        assert_eq!(vocab.special.additional, vec![4]);
        assert!(vocab.special.is_special(0));
        assert!(vocab.special.is_special(4));
        assert!(!vocab.special.is_special(1));
        assert_eq!(vocab.special_entries().len(), 4);
        assert_eq!(
            vocab.special_tokens_config().bos.as_deref(),
            Some("<bos>")
        );
    }

    #[test]
    fn test_special_config_aliases() {
        let config: SpecialTokensConfig =
            serde_json::from_str(r#"{"cls": "[CLS]", "sep": "[SEP]"}"#).unwrap();
        assert_eq!(config.bos.as_deref(), Some("[CLS]"));
        assert_eq!(config.eos.as_deref(), Some("[SEP]"));
    }
}
