//! The encode output record and the options selecting its contents.

use crate::post_processor::TruncationDirection;
use serde::Serialize;

/// Options for a single encode call.
///
/// IDs are always produced; every other sequence is only kept when its
/// flag is set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EncodeOptions {
    /// Insert boundary tokens (start / end of sequence)
    pub add_special_tokens: bool,
    /// Keep `type_ids`
    pub return_type_ids: bool,
    /// Keep `tokens`
    pub return_tokens: bool,
    /// Keep `special_tokens_mask`
    pub return_special_tokens_mask: bool,
    /// Keep `attention_mask`
    pub return_attention_mask: bool,
}

impl EncodeOptions {
    /// IDs and tokens only.
    pub fn new(add_special_tokens: bool) -> Self {
        Self {
            add_special_tokens,
            return_tokens: true,
            ..Default::default()
        }
    }

    /// Every output sequence.
    pub fn all(add_special_tokens: bool) -> Self {
        Self {
            add_special_tokens,
            return_type_ids: true,
            return_tokens: true,
            return_special_tokens_mask: true,
            return_attention_mask: true,
        }
    }
}

/// Result of encoding text.
///
/// Parallel sequences: index `i` of every populated sequence describes the
/// same token position.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Encoding {
    /// Token IDs
    pub ids: Vec<u32>,
    /// Token strings as stored in the vocabulary
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tokens: Vec<String>,
    /// Segment index per position (0 for the first sequence, 1 for the second)
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub type_ids: Vec<u32>,
    /// 1 where the position holds a special token, else 0
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub special_tokens_mask: Vec<u32>,
    /// 1 for real content, 0 for padding
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub attention_mask: Vec<u32>,
}

impl Encoding {
    /// Create an empty encoding with room for `capacity` positions.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            ids: Vec::with_capacity(capacity),
            tokens: Vec::with_capacity(capacity),
            type_ids: Vec::with_capacity(capacity),
            special_tokens_mask: Vec::with_capacity(capacity),
            attention_mask: Vec::with_capacity(capacity),
        }
    }

    /// Append one fully described position of real content.
    pub(crate) fn push(&mut self, id: u32, token: impl Into<String>, type_id: u32, special: bool) {
        self.ids.push(id);
        self.tokens.push(token.into());
        self.type_ids.push(type_id);
        self.special_tokens_mask.push(special as u32);
        self.attention_mask.push(1);
    }

    /// Append every position of `other`.
    pub(crate) fn extend(&mut self, other: Encoding) {
        self.ids.extend(other.ids);
        self.tokens.extend(other.tokens);
        self.type_ids.extend(other.type_ids);
        self.special_tokens_mask.extend(other.special_tokens_mask);
        self.attention_mask.extend(other.attention_mask);
    }

    /// Set the type ID of every position.
    pub(crate) fn set_type_id(&mut self, type_id: u32) {
        self.type_ids.iter_mut().for_each(|t| *t = type_id);
    }

    /// Get the number of positions.
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Check if the encoding is empty.
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Clear every sequence, keeping the allocations for reuse.
    pub fn reset(&mut self) {
        self.ids.clear();
        self.tokens.clear();
        self.type_ids.clear();
        self.special_tokens_mask.clear();
        self.attention_mask.clear();
    }

    /// Shorten every sequence to at most `max_len` positions.
    ///
    /// `Right` keeps the head, `Left` keeps the tail.
    pub fn truncate(&mut self, max_len: usize, direction: TruncationDirection) {
        truncate_seq(&mut self.ids, max_len, direction);
        truncate_seq(&mut self.tokens, max_len, direction);
        truncate_seq(&mut self.type_ids, max_len, direction);
        truncate_seq(&mut self.special_tokens_mask, max_len, direction);
        truncate_seq(&mut self.attention_mask, max_len, direction);
    }

    /// Append padding positions until the encoding holds `target_len`.
    ///
    /// Padding positions are special, unattended and of type `pad_type_id`.
    pub fn pad(&mut self, target_len: usize, pad_id: u32, pad_type_id: u32, pad_token: &str) {
        let Some(missing) = target_len.checked_sub(self.len()) else {
            return;
        };
        if missing == 0 {
            return;
        }

        self.ids.extend(std::iter::repeat(pad_id).take(missing));
        self.tokens
            .extend(std::iter::repeat(pad_token.to_string()).take(missing));
        self.type_ids
            .extend(std::iter::repeat(pad_type_id).take(missing));
        self.special_tokens_mask
            .extend(std::iter::repeat(1).take(missing));
        self.attention_mask
            .extend(std::iter::repeat(0).take(missing));
    }

    /// Drop the sequences `options` did not ask for.
    pub(crate) fn retain_requested(&mut self, options: &EncodeOptions) {
        if !options.return_tokens {
            self.tokens = Vec::new();
        }
        if !options.return_type_ids {
            self.type_ids = Vec::new();
        }
        if !options.return_special_tokens_mask {
            self.special_tokens_mask = Vec::new();
        }
        if !options.return_attention_mask {
            self.attention_mask = Vec::new();
        }
    }

    /// Move the contents into `target`, reusing its allocations.
    pub(crate) fn move_into(self, target: &mut Encoding) {
        target.reset();
        target.extend(self);
    }
}

fn truncate_seq<T>(seq: &mut Vec<T>, max_len: usize, direction: TruncationDirection) {
    if seq.len() <= max_len {
        return;
    }
    match direction {
        TruncationDirection::Right => seq.truncate(max_len),
        TruncationDirection::Left => {
            seq.drain(..seq.len() - max_len);
        }
    }
}
