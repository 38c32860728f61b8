//! BPE subword model.
//!
//! Segments one pre-tokenized span into subword tokens: the span starts out
//! as one symbol per character, then adjacent pairs are merged in merge-rule
//! priority order until no rule applies.

use crate::core::{MergeCandidate, MergeQueue, MergeRules, Vocabulary};
use crate::encoding::ByteFallback;
use crate::error::{Result, TokenizerError};
use serde::{Deserialize, Serialize};

/// What to do with a character that has no vocabulary entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnknownPolicy {
    /// Emit the unknown token
    #[default]
    Emit,
    /// Fail the encode call
    Reject,
}

/// Behavioral knobs of the BPE model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BpeConfig {
    /// Prefix carried by every non-initial subword (e.g. `##`)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub continuing_subword_prefix: Option<String>,
    /// Suffix carried by the final subword of a word (e.g. `</w>`)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_of_word_suffix: Option<String>,
    /// Collapse runs of unknown characters into a single unknown token
    pub fuse_unk: bool,
    /// Spell unknown characters as `<0xXX>` byte tokens when possible
    pub byte_fallback: bool,
    /// Emit a span directly when it is itself a vocabulary entry
    pub ignore_merges: bool,
    /// Unknown character handling
    pub unknown_policy: UnknownPolicy,
}

impl Default for BpeConfig {
    fn default() -> Self {
        Self {
            continuing_subword_prefix: None,
            end_of_word_suffix: None,
            fuse_unk: true,
            byte_fallback: false,
            ignore_merges: true,
            unknown_policy: UnknownPolicy::Emit,
        }
    }
}

/// A resolved subword: vocabulary ID plus its vocabulary string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub id: u32,
    pub value: String,
}

impl Token {
    pub fn new(id: u32, value: impl Into<String>) -> Self {
        Self {
            id,
            value: value.into(),
        }
    }
}

/// A symbol in the doubly linked list being merged.
#[derive(Debug, Clone, Copy)]
struct Symbol {
    id: u32,
    prev: Option<usize>,
    next: Option<usize>,
    removed: bool,
}

/// BPE model: vocabulary, merge rules and unknown handling.
///
/// Immutable once built; `segment_to_subwords` takes `&self` and can be
/// called from many threads at once.
#[derive(Debug, Clone)]
pub struct BpeModel {
    vocab: Vocabulary,
    merges: MergeRules,
    config: BpeConfig,
    byte_fallback: ByteFallback,
}

impl BpeModel {
    /// Create a new model.
    pub fn new(vocab: Vocabulary, merges: MergeRules, config: BpeConfig) -> Self {
        let byte_fallback = ByteFallback::new(config.byte_fallback);
        Self {
            vocab,
            merges,
            config,
            byte_fallback,
        }
    }

    /// The vocabulary store.
    pub fn vocab(&self) -> &Vocabulary {
        &self.vocab
    }

    /// The merge rules.
    pub fn merges(&self) -> &MergeRules {
        &self.merges
    }

    /// The model configuration.
    pub fn config(&self) -> &BpeConfig {
        &self.config
    }

    /// Segment a span into subword tokens.
    ///
    /// Fails only when a character has no vocabulary entry and the model
    /// cannot map it to an unknown token.
    pub fn segment_to_subwords(&self, span: &str) -> Result<Vec<Token>> {
        if span.is_empty() {
            return Ok(Vec::new());
        }

        if self.config.ignore_merges {
            if let Some(id) = self.vocab.get_id(span) {
                return Ok(vec![Token::new(id, span)]);
            }
        }

        let mut symbols = self.initial_symbols(span)?;
        self.apply_merges(&mut symbols);
        self.collect_tokens(&symbols)
    }

    /// Split a span into its finest-grained symbols.
    fn initial_symbols(&self, span: &str) -> Result<Vec<Symbol>> {
        let prefix = self.config.continuing_subword_prefix.as_deref();
        let suffix = self.config.end_of_word_suffix.as_deref();
        let char_count = span.chars().count();

        let mut ids: Vec<u32> = Vec::with_capacity(char_count);
        let mut last_was_unk = false;
        let mut piece = String::new();

        for (i, ch) in span.chars().enumerate() {
            piece.clear();
            if i > 0 {
                if let Some(prefix) = prefix {
                    piece.push_str(prefix);
                }
            }
            piece.push(ch);
            if i + 1 == char_count {
                if let Some(suffix) = suffix {
                    piece.push_str(suffix);
                }
            }

            if let Some(id) = self.vocab.get_id(&piece) {
                ids.push(id);
                last_was_unk = false;
                continue;
            }

            let mut utf8 = [0u8; 4];
            if let Some(bytes) = self
                .byte_fallback
                .encode_unknown(ch.encode_utf8(&mut utf8), &self.vocab)
            {
                ids.extend(bytes);
                last_was_unk = false;
                continue;
            }

            let unk = self.resolve_unknown(&piece)?;
            if !(self.config.fuse_unk && last_was_unk) {
                ids.push(unk);
            }
            last_was_unk = true;
        }

        let len = ids.len();
        Ok(ids
            .into_iter()
            .enumerate()
            .map(|(i, id)| Symbol {
                id,
                prev: i.checked_sub(1),
                next: (i + 1 < len).then_some(i + 1),
                removed: false,
            })
            .collect())
    }

    fn resolve_unknown(&self, piece: &str) -> Result<u32> {
        match self.config.unknown_policy {
            UnknownPolicy::Reject => Err(TokenizerError::UnknownToken(piece.to_string())),
            UnknownPolicy::Emit => self
                .vocab
                .special
                .unk
                .ok_or_else(|| TokenizerError::UnknownToken(piece.to_string())),
        }
    }

    /// Merge adjacent symbols, lowest rank first, leftmost on ties.
    fn apply_merges(&self, symbols: &mut [Symbol]) {
        if symbols.len() < 2 || self.merges.is_empty() {
            return;
        }

        let mut queue = MergeQueue::with_capacity(symbols.len());
        for pos in 0..symbols.len() - 1 {
            if let Some((rank, new_id)) = self.merges.get((symbols[pos].id, symbols[pos + 1].id)) {
                queue.push(MergeCandidate::new(rank, pos, new_id));
            }
        }

        while let Some(top) = queue.pop() {
            let left = symbols[top.pos];
            if left.removed {
                continue;
            }
            let Some(right_pos) = left.next else {
                continue;
            };
            let right = symbols[right_pos];

            // Stale entry: one side merged with something else since.
            if self.merges.get((left.id, right.id)) != Some((top.rank, top.new_id)) {
                continue;
            }

            symbols[top.pos].id = top.new_id;
            symbols[top.pos].next = right.next;
            symbols[right_pos].removed = true;
            if let Some(next) = right.next {
                symbols[next].prev = Some(top.pos);
            }

            if let Some(prev) = left.prev {
                if let Some((rank, new_id)) = self.merges.get((symbols[prev].id, top.new_id)) {
                    queue.push(MergeCandidate::new(rank, prev, new_id));
                }
            }
            if let Some(next) = right.next {
                if let Some((rank, new_id)) = self.merges.get((top.new_id, symbols[next].id)) {
                    queue.push(MergeCandidate::new(rank, top.pos, new_id));
                }
            }
        }
    }

    fn collect_tokens(&self, symbols: &[Symbol]) -> Result<Vec<Token>> {
        let mut tokens = Vec::with_capacity(symbols.len());
        let mut cursor = (!symbols.is_empty()).then_some(0);

        while let Some(pos) = cursor {
            let symbol = symbols[pos];
            tokens.push(Token::new(symbol.id, self.vocab.reverse(symbol.id)?));
            cursor = symbol.next;
        }

        Ok(tokens)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::SpecialTokensConfig;

    fn model(tokens: &[&str], merges: &[(&str, &str)], config: BpeConfig) -> BpeModel {
        let mut vocab = Vocabulary::from_tokens(tokens.iter().copied()).unwrap();
        vocab.add_special_tokens(&SpecialTokensConfig {
            unk: Some("[UNK]".to_string()),
            ..Default::default()
        });
        let merges = MergeRules::from_token_pairs(
            &vocab,
            merges.iter().copied(),
            config.continuing_subword_prefix.as_deref(),
        )
        .unwrap();
        BpeModel::new(vocab, merges, config)
    }

    fn values(tokens: &[Token]) -> Vec<&str> {
        tokens.iter().map(|t| t.value.as_str()).collect()
    }

    #[test]
    fn test_merges_apply_in_rank_order() {
        let model = model(
            &["h", "e", "l", "o", "he", "ll", "llo", "hello"],
            &[("l", "l"), ("h", "e"), ("ll", "o"), ("he", "llo")],
            BpeConfig {
                ignore_merges: false,
                ..Default::default()
            },
        );

        let tokens = model.segment_to_subwords("hello").unwrap();
        assert_eq!(values(&tokens), vec!["hello"]);
        assert_eq!(tokens[0].id, 7);
    }

    #[test]
    fn test_partial_merge() {
        let model = model(
            &["h", "e", "l", "o", "he", "ll"],
            &[("h", "e"), ("l", "l")],
            BpeConfig::default(),
        );

        let tokens = model.segment_to_subwords("hello").unwrap();
        assert_eq!(values(&tokens), vec!["he", "ll", "o"]);
    }

    #[test]
    fn test_leftmost_wins_on_overlap() {
        // "aaa": both (a,a) pairs have rank 0; the leftmost merges first.
        let model = model(
            &["a", "aa"],
            &[("a", "a")],
            BpeConfig {
                ignore_merges: false,
                ..Default::default()
            },
        );

        let tokens = model.segment_to_subwords("aaa").unwrap();
        assert_eq!(values(&tokens), vec!["aa", "a"]);
    }

    #[test]
    fn test_lower_rank_beats_position() {
        // (b,c) outranks (a,b) even though it sits further right.
        let model = model(
            &["a", "b", "c", "ab", "bc"],
            &[("b", "c"), ("a", "b")],
            BpeConfig::default(),
        );

        let tokens = model.segment_to_subwords("abc").unwrap();
        assert_eq!(values(&tokens), vec!["a", "bc"]);
    }

    #[test]
    fn test_ignore_merges_direct_hit() {
        let model = model(&["hello"], &[], BpeConfig::default());
        let tokens = model.segment_to_subwords("hello").unwrap();
        assert_eq!(values(&tokens), vec!["hello"]);
    }

    #[test]
    fn test_unknown_chars_fused() {
        let model = model(&["a"], &[], BpeConfig::default());
        let unk = model.vocab().special.unk.unwrap();

        let tokens = model.segment_to_subwords("xyz").unwrap();
        assert_eq!(tokens, vec![Token::new(unk, "[UNK]")]);

        let tokens = model.segment_to_subwords("xay").unwrap();
        assert_eq!(values(&tokens), vec!["[UNK]", "a", "[UNK]"]);
    }

    #[test]
    fn test_unknown_chars_not_fused() {
        let model = model(
            &["a"],
            &[],
            BpeConfig {
                fuse_unk: false,
                ..Default::default()
            },
        );
        let tokens = model.segment_to_subwords("xyz").unwrap();
        assert_eq!(tokens.len(), 3);
    }

    #[test]
    fn test_reject_unknown() {
        let model = model(
            &["a"],
            &[],
            BpeConfig {
                unknown_policy: UnknownPolicy::Reject,
                ..Default::default()
            },
        );
        assert!(model.segment_to_subwords("a").is_ok());
        assert!(matches!(
            model.segment_to_subwords("ab"),
            Err(TokenizerError::UnknownToken(_))
        ));
    }

    #[test]
    fn test_missing_unk_token_fails() {
        let vocab = Vocabulary::from_tokens(["a"]).unwrap();
        let model = BpeModel::new(vocab, MergeRules::new(), BpeConfig::default());
        assert!(model.segment_to_subwords("b").is_err());
    }

    #[test]
    fn test_continuing_subword_prefix() {
        let model = model(
            &["u", "##n", "##a", "un", "##ff", "##f"],
            &[("u", "##n"), ("##f", "##f")],
            BpeConfig {
                continuing_subword_prefix: Some("##".to_string()),
                ..Default::default()
            },
        );

        let tokens = model.segment_to_subwords("unff").unwrap();
        assert_eq!(values(&tokens), vec!["un", "##ff"]);
    }

    #[test]
    fn test_end_of_word_suffix() {
        let model = model(
            &["l", "o", "w", "w</w>", "lo", "low</w>"],
            &[("l", "o"), ("lo", "w</w>")],
            BpeConfig {
                end_of_word_suffix: Some("</w>".to_string()),
                ..Default::default()
            },
        );

        let tokens = model.segment_to_subwords("low").unwrap();
        assert_eq!(values(&tokens), vec!["low</w>"]);
    }

    #[test]
    fn test_byte_fallback() {
        let model = model(
            &["a", "<0xC3>", "<0xA9>"],
            &[],
            BpeConfig {
                byte_fallback: true,
                ..Default::default()
            },
        );
        let tokens = model.segment_to_subwords("aé").unwrap();
        assert_eq!(values(&tokens), vec!["a", "<0xC3>", "<0xA9>"]);
    }

    #[test]
    fn test_empty_span() {
        let model = model(&["a"], &[], BpeConfig::default());
        assert!(model.segment_to_subwords("").unwrap().is_empty());
    }

    #[test]
    fn test_deterministic() {
        let model = model(
            &["a", "b", "ab", "ba", "aba"],
            &[("a", "b"), ("b", "a"), ("ab", "a")],
            BpeConfig::default(),
        );
        let first = model.segment_to_subwords("ababab").unwrap();
        let second = model.segment_to_subwords("ababab").unwrap();
        assert_eq!(first, second);
    }
}
