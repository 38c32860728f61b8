//! Reassembling text from token strings.
//!
//! The joining convention mirrors the pre-tokenizer that produced the
//! tokens: word splitters join with spaces, byte-level splitting maps the
//! alphabet back to raw bytes, and no-split models concatenate.

use crate::pre_tokenizer::SplitPattern;
use serde::{Deserialize, Serialize};
use subtoken_core::{BpeConfig, ByteAlphabet, ByteFallback};

/// A token handed to the decoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodePiece<'a> {
    /// Vocabulary string
    pub token: &'a str,
    /// Emitted verbatim and never glued
    pub special: bool,
}

/// Text reassembly strategies, as stored in model data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Decoder {
    /// Words joined by single spaces
    Words {
        /// Remove the space before punctuation and English contractions
        #[serde(default = "default_cleanup")]
        cleanup: bool,
    },
    /// Tokens concatenated as-is
    Concat,
    /// Byte-level alphabet mapped back to UTF-8
    ByteLevel {
        #[serde(default)]
        add_prefix_space: bool,
    },
}

fn default_cleanup() -> bool {
    true
}

impl Decoder {
    /// The decoder matching a pre-tokenizer.
    pub fn for_splitter(pattern: &SplitPattern) -> Self {
        match pattern {
            SplitPattern::NoSplit => Decoder::Concat,
            SplitPattern::ByteLevel { add_prefix_space } => Decoder::ByteLevel {
                add_prefix_space: *add_prefix_space,
            },
            SplitPattern::Whitespace
            | SplitPattern::WhitespaceSplit
            | SplitPattern::Bert
            | SplitPattern::Split { .. } => Decoder::Words { cleanup: true },
        }
    }

    /// Join tokens into text.
    ///
    /// `model` supplies the subword prefix / suffix markers and whether
    /// `<0xXX>` tokens are byte fallback.
    pub fn decode(&self, pieces: &[DecodePiece<'_>], model: &BpeConfig) -> String {
        match self {
            Decoder::Words { cleanup } => {
                let text = decode_words(pieces, model);
                if *cleanup {
                    cleanup_spaces(&text)
                } else {
                    text
                }
            }
            Decoder::Concat => {
                let mut out = String::new();
                let mut bytes = Vec::new();
                for piece in pieces {
                    if let Some(byte) = byte_fallback(piece, model) {
                        bytes.push(byte);
                        continue;
                    }
                    flush_bytes(&mut bytes, &mut out);
                    out.push_str(piece.token);
                }
                flush_bytes(&mut bytes, &mut out);
                out
            }
            Decoder::ByteLevel { add_prefix_space } => {
                let alphabet = ByteAlphabet::get();
                let mut out = String::new();
                let mut bytes = Vec::new();
                for piece in pieces {
                    if piece.special {
                        flush_bytes(&mut bytes, &mut out);
                        out.push_str(piece.token);
                    } else {
                        alphabet.decode_into(piece.token, &mut bytes);
                    }
                }
                flush_bytes(&mut bytes, &mut out);

                // The splitter only adds a prefix in front of text that does
                // not already start with a space, so a run of spaces is input.
                if *add_prefix_space && pieces.first().is_some_and(|p| !p.special) {
                    let mut chars = out.chars();
                    if chars.next() == Some(' ')
                        && chars.next().is_some_and(|c| !c.is_whitespace())
                    {
                        out.remove(0);
                    }
                }
                out
            }
        }
    }
}

fn byte_fallback(piece: &DecodePiece<'_>, model: &BpeConfig) -> Option<u8> {
    if !model.byte_fallback || piece.special {
        return None;
    }
    ByteFallback::parse_byte_token(piece.token)
}

fn flush_bytes(bytes: &mut Vec<u8>, out: &mut String) {
    if !bytes.is_empty() {
        out.push_str(&String::from_utf8_lossy(bytes));
        bytes.clear();
    }
}

fn decode_words(pieces: &[DecodePiece<'_>], model: &BpeConfig) -> String {
    let prefix = model
        .continuing_subword_prefix
        .as_deref()
        .filter(|p| !p.is_empty());
    let suffix = model
        .end_of_word_suffix
        .as_deref()
        .filter(|s| !s.is_empty());

    let mut out = String::new();
    let mut bytes = Vec::new();
    // Whether the next word starts after a space.
    let mut word_break = false;

    for piece in pieces {
        // Byte fallback spells one character of the current word.
        if let Some(byte) = byte_fallback(piece, model) {
            bytes.push(byte);
            continue;
        }
        flush_bytes(&mut bytes, &mut out);

        if piece.special {
            if !out.is_empty() {
                out.push(' ');
            }
            out.push_str(piece.token);
            word_break = true;
            continue;
        }

        let mut text = piece.token;
        let mut glued = false;
        if let Some(rest) = prefix.and_then(|p| text.strip_prefix(p)) {
            text = rest;
            glued = true;
        }
        let mut ends_word = true;
        if let Some(suffix) = suffix {
            match text.strip_suffix(suffix) {
                Some(rest) => text = rest,
                None => ends_word = false,
            }
        }

        if word_break && !glued {
            out.push(' ');
        }
        out.push_str(text);
        word_break = ends_word;
    }
    flush_bytes(&mut bytes, &mut out);

    out
}

fn cleanup_spaces(text: &str) -> String {
    text.replace(" .", ".")
        .replace(" ?", "?")
        .replace(" !", "!")
        .replace(" ,", ",")
        .replace(" ' ", "'")
        .replace(" n't", "n't")
        .replace(" 'm", "'m")
        .replace(" 's", "'s")
        .replace(" 've", "'ve")
        .replace(" 're", "'re")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plain(tokens: &[&'static str]) -> Vec<DecodePiece<'static>> {
        tokens
            .iter()
            .map(|&token| DecodePiece {
                token,
                special: false,
            })
            .collect()
    }

    #[test]
    fn test_words() {
        let decoder = Decoder::Words { cleanup: true };
        let text = decoder.decode(&plain(&["hello", "world", "!"]), &BpeConfig::default());
        assert_eq!(text, "hello world!");
    }

    #[test]
    fn test_words_without_cleanup() {
        let decoder = Decoder::Words { cleanup: false };
        let text = decoder.decode(&plain(&["don", "'t", "."]), &BpeConfig::default());
        assert_eq!(text, "don 't .");
    }

    #[test]
    fn test_words_with_prefix() {
        let config = BpeConfig {
            continuing_subword_prefix: Some("##".to_string()),
            ..Default::default()
        };
        let decoder = Decoder::Words { cleanup: true };
        let text = decoder.decode(&plain(&["un", "##believ", "##able", "story"]), &config);
        assert_eq!(text, "unbelievable story");
    }

    #[test]
    fn test_words_with_suffix() {
        let config = BpeConfig {
            end_of_word_suffix: Some("</w>".to_string()),
            ..Default::default()
        };
        let decoder = Decoder::Words { cleanup: true };
        let text = decoder.decode(&plain(&["low", "er</w>", "new</w>"]), &config);
        assert_eq!(text, "lower new");
    }

    #[test]
    fn test_words_keep_specials() {
        let decoder = Decoder::Words { cleanup: true };
        let pieces = [
            DecodePiece {
                token: "[CLS]",
                special: true,
            },
            DecodePiece {
                token: "hi",
                special: false,
            },
            DecodePiece {
                token: "[SEP]",
                special: true,
            },
        ];
        assert_eq!(
            decoder.decode(&pieces, &BpeConfig::default()),
            "[CLS] hi [SEP]"
        );
    }

    #[test]
    fn test_byte_fallback_tokens() {
        let config = BpeConfig {
            byte_fallback: true,
            ..Default::default()
        };
        let text = Decoder::Concat.decode(&plain(&["caf", "<0xC3>", "<0xA9>"]), &config);
        assert_eq!(text, "café");

        let text = Decoder::Words { cleanup: true }
            .decode(&plain(&["caf", "<0xC3>", "<0xA9>", "au", "lait"]), &config);
        assert_eq!(text, "café au lait");
    }

    #[test]
    fn test_concat() {
        let text = Decoder::Concat.decode(&plain(&["hel", "lo", " wor", "ld"]), &BpeConfig::default());
        assert_eq!(text, "hello world");
    }

    #[test]
    fn test_byte_level() {
        let decoder = Decoder::ByteLevel {
            add_prefix_space: true,
        };
        let text = decoder.decode(&plain(&["ĠHello", "Ġw", "Ã©"]), &BpeConfig::default());
        assert_eq!(text, "Hello wé");
    }

    #[test]
    fn test_byte_level_keeps_leading_spaces() {
        let decoder = Decoder::ByteLevel {
            add_prefix_space: true,
        };
        // "  hi" splits into "Ġ" + "Ġhi" with no prefix added.
        let text = decoder.decode(&plain(&["Ġ", "Ġhi"]), &BpeConfig::default());
        assert_eq!(text, "  hi");

        let pieces = [
            DecodePiece {
                token: "<s>",
                special: true,
            },
            DecodePiece {
                token: "Ġhi",
                special: false,
            },
        ];
        assert_eq!(decoder.decode(&pieces, &BpeConfig::default()), "<s> hi");
    }

    #[test]
    fn test_for_splitter() {
        assert_eq!(
            Decoder::for_splitter(&SplitPattern::Whitespace),
            Decoder::Words { cleanup: true }
        );
        assert_eq!(Decoder::for_splitter(&SplitPattern::NoSplit), Decoder::Concat);
        assert_eq!(
            Decoder::for_splitter(&SplitPattern::ByteLevel {
                add_prefix_space: false
            }),
            Decoder::ByteLevel {
                add_prefix_space: false
            }
        );
    }

    #[test]
    fn test_from_json() {
        let decoder: Decoder = serde_json::from_str(r#"{"type": "Words"}"#).unwrap();
        assert_eq!(decoder, Decoder::Words { cleanup: true });
    }
}
