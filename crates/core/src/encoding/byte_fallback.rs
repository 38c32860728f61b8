//! Byte-level fallback for unknown characters.
//!
//! Models trained with byte fallback carry the 256 tokens `<0x00>` ..
//! `<0xFF>`; a character with no vocabulary entry is then spelled as its
//! UTF-8 bytes instead of collapsing to the unknown token.

use crate::core::vocab::Vocabulary;

/// Byte-level fallback encoder.
#[derive(Debug, Clone, Copy, Default)]
pub struct ByteFallback {
    /// Whether fallback is enabled
    enabled: bool,
}

impl ByteFallback {
    /// Create a new byte fallback handler.
    pub fn new(enabled: bool) -> Self {
        Self { enabled }
    }

    /// Encode an unknown piece of text as byte tokens.
    ///
    /// Returns `None` when fallback is disabled or any of the byte tokens is
    /// missing from the vocabulary; the caller then uses the unknown token.
    pub fn encode_unknown(&self, text: &str, vocab: &Vocabulary) -> Option<Vec<u32>> {
        if !self.enabled {
            return None;
        }

        text.bytes()
            .map(|b| vocab.get_id(&Self::byte_token(b)))
            .collect()
    }

    /// The vocabulary spelling of a single byte.
    pub fn byte_token(byte: u8) -> String {
        format!("<0x{:02X}>", byte)
    }

    /// Parse a `<0xXX>` token back into its byte.
    pub fn parse_byte_token(token: &str) -> Option<u8> {
        let hex = token.strip_prefix("<0x")?.strip_suffix('>')?;
        if hex.len() != 2 {
            return None;
        }
        u8::from_str_radix(hex, 16).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::vocab::SpecialTokensConfig;

    #[test]
    fn test_byte_fallback_disabled() {
        let mut vocab = Vocabulary::from_tokens(["hello", "<0x61>"]).unwrap();
        vocab.add_special_tokens(&SpecialTokensConfig {
            unk: Some("<unk>".to_string()),
            ..Default::default()
        });

        let fallback = ByteFallback::new(false);
        assert_eq!(fallback.encode_unknown("a", &vocab), None);
    }

    #[test]
    fn test_byte_fallback_enabled() {
        let vocab = Vocabulary::from_tokens(["<0xC3>", "<0xA9>"]).unwrap();

        let fallback = ByteFallback::new(true);
        // "é" is 0xC3 0xA9
        assert_eq!(fallback.encode_unknown("é", &vocab), Some(vec![0, 1]));
    }

    #[test]
    fn test_byte_fallback_missing_byte() {
        let vocab = Vocabulary::from_tokens(["<0xC3>"]).unwrap();
        assert_eq!(ByteFallback::new(true).encode_unknown("é", &vocab), None);
    }

    #[test]
    fn test_parse_byte_token() {
        assert_eq!(ByteFallback::parse_byte_token("<0x0A>"), Some(b'\n'));
        assert_eq!(ByteFallback::parse_byte_token(&ByteFallback::byte_token(255)), Some(255));
        assert_eq!(ByteFallback::parse_byte_token("<0x1>"), None);
        assert_eq!(ByteFallback::parse_byte_token("hello"), None);
    }
}
