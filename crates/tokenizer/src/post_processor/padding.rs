//! Padding parameters.

use serde::{Deserialize, Serialize};
use subtoken_core::Vocabulary;

/// Token string used for padding when the vocabulary names none.
pub const DEFAULT_PAD_TOKEN: &str = "[PAD]";

/// Fixed-length padding settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaddingParams {
    /// Pad every encoding up to this many positions
    pub length: usize,
    #[serde(default)]
    pub pad_id: u32,
    #[serde(default)]
    pub pad_type_id: u32,
    #[serde(default = "default_pad_token")]
    pub pad_token: String,
}

fn default_pad_token() -> String {
    DEFAULT_PAD_TOKEN.to_string()
}

impl PaddingParams {
    /// Pad with ID 0 and `[PAD]`.
    pub fn new(length: usize) -> Self {
        Self {
            length,
            pad_id: 0,
            pad_type_id: 0,
            pad_token: default_pad_token(),
        }
    }

    /// Pad with the vocabulary's pad token, falling back to ID 0 and `[PAD]`.
    pub fn for_vocab(length: usize, vocab: &Vocabulary) -> Self {
        let mut params = Self::new(length);
        if let Some(id) = vocab.special.pad {
            params.pad_id = id;
            if let Some(token) = vocab.get_token(id) {
                params.pad_token = token.to_string();
            }
        }
        params
    }
}
