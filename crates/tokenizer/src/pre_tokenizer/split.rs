//! Text splitting for pre-tokenization.
//!
//! This module provides the segmentation strategies applied to normalized
//! text before BPE encoding: whitespace, punctuation, regex and byte-level
//! splitting. Every span carries its byte offsets into the normalized text.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;
use subtoken_core::{ByteAlphabet, Result, TokenizerError};
use tracing::warn;

/// GPT-2 split pattern: contractions, letter runs, digit runs, symbol runs,
/// and whitespace not followed by a word.
const BYTE_LEVEL_PATTERN: &str =
    r"'s|'t|'re|'ve|'m|'ll|'d| ?\p{L}+| ?\p{N}+| ?[^\s\p{L}\p{N}]+|\s+(?!\S)|\s+";

/// Word-or-symbol-run pattern used by [`SplitPattern::Whitespace`].
const WHITESPACE_PATTERN: &str = r"\w+|[^\w\s]+";

/// Splitting patterns, as stored in model data.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum SplitPattern {
    /// No splitting (keep text as-is)
    #[default]
    NoSplit,
    /// Word runs and symbol runs, whitespace dropped
    Whitespace,
    /// Split on whitespace only
    WhitespaceSplit,
    /// Split on whitespace and isolate every punctuation character
    Bert,
    /// Custom regex delimiter; spans are the text between matches
    Split { pattern: String },
    /// GPT-2 style splitting followed by byte-to-unicode mapping
    ByteLevel {
        #[serde(default)]
        add_prefix_space: bool,
    },
}

/// A segment of normalized text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Span {
    /// Text handed to the subword model
    pub text: String,
    /// Byte range in the normalized text
    pub offsets: (usize, usize),
}

impl Span {
    fn new(text: impl Into<String>, start: usize, end: usize) -> Self {
        Self {
            text: text.into(),
            offsets: (start, end),
        }
    }
}

/// Text splitter for pre-tokenization.
#[derive(Debug, Clone)]
pub struct Splitter {
    /// Pattern to split on
    pattern: SplitPattern,
    /// Compiled delimiter for `Split`
    delimiter: Option<Regex>,
}

impl Splitter {
    /// Create a new splitter.
    ///
    /// Fails if a `Split` pattern is not a valid regex.
    pub fn new(pattern: SplitPattern) -> Result<Self> {
        let delimiter = match &pattern {
            SplitPattern::Split { pattern } => Some(Regex::new(pattern).map_err(|e| {
                TokenizerError::ModelLoad(format!("invalid split pattern {:?}: {}", pattern, e))
            })?),
            _ => None,
        };

        Ok(Self { pattern, delimiter })
    }

    /// Create a whitespace splitter.
    pub fn whitespace() -> Self {
        Self {
            pattern: SplitPattern::Whitespace,
            delimiter: None,
        }
    }

    /// Create a byte-level splitter.
    pub fn byte_level(add_prefix_space: bool) -> Self {
        Self {
            pattern: SplitPattern::ByteLevel { add_prefix_space },
            delimiter: None,
        }
    }

    /// The configured pattern.
    pub fn pattern(&self) -> &SplitPattern {
        &self.pattern
    }

    /// Split text into spans.
    pub fn segment(&self, text: &str) -> Vec<Span> {
        match &self.pattern {
            SplitPattern::NoSplit => {
                if text.is_empty() {
                    Vec::new()
                } else {
                    vec![Span::new(text, 0, text.len())]
                }
            }
            SplitPattern::Whitespace => whitespace_regex()
                .find_iter(text)
                .map(|m| Span::new(m.as_str(), m.start(), m.end()))
                .collect(),
            SplitPattern::WhitespaceSplit => split_chars(text, |_| false),
            SplitPattern::Bert => split_chars(text, is_punctuation),
            SplitPattern::Split { .. } => match &self.delimiter {
                Some(delimiter) => split_gaps(delimiter, text),
                None => Vec::new(),
            },
            SplitPattern::ByteLevel { add_prefix_space } => {
                split_byte_level(text, *add_prefix_space)
            }
        }
    }
}

impl Default for Splitter {
    fn default() -> Self {
        Self {
            pattern: SplitPattern::NoSplit,
            delimiter: None,
        }
    }
}

fn whitespace_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(WHITESPACE_PATTERN).expect("static pattern is valid"))
}

fn byte_level_regex() -> &'static fancy_regex::Regex {
    static RE: OnceLock<fancy_regex::Regex> = OnceLock::new();
    RE.get_or_init(|| fancy_regex::Regex::new(BYTE_LEVEL_PATTERN).expect("static pattern is valid"))
}

/// Split on whitespace; characters matching `isolate` become their own span.
fn split_chars(text: &str, isolate: impl Fn(char) -> bool) -> Vec<Span> {
    let mut spans = Vec::new();
    let mut start: Option<usize> = None;

    for (idx, ch) in text.char_indices() {
        if ch.is_whitespace() || isolate(ch) {
            if let Some(s) = start.take() {
                spans.push(Span::new(&text[s..idx], s, idx));
            }
            if !ch.is_whitespace() {
                let end = idx + ch.len_utf8();
                spans.push(Span::new(&text[idx..end], idx, end));
            }
        } else if start.is_none() {
            start = Some(idx);
        }
    }

    if let Some(s) = start {
        spans.push(Span::new(&text[s..], s, text.len()));
    }

    spans
}

fn split_gaps(delimiter: &Regex, text: &str) -> Vec<Span> {
    let mut spans = Vec::new();
    let mut last = 0;

    for m in delimiter.find_iter(text) {
        if m.start() > last {
            spans.push(Span::new(&text[last..m.start()], last, m.start()));
        }
        last = m.end();
    }
    if last < text.len() {
        spans.push(Span::new(&text[last..], last, text.len()));
    }

    spans
}

fn split_byte_level(text: &str, add_prefix_space: bool) -> Vec<Span> {
    if text.is_empty() {
        return Vec::new();
    }

    let prefixed;
    let (source, shift) = if add_prefix_space && !text.starts_with(' ') {
        prefixed = format!(" {}", text);
        (prefixed.as_str(), 1)
    } else {
        (text, 0)
    };

    let alphabet = ByteAlphabet::get();
    let mut spans = Vec::new();
    let mut last = 0;

    for found in byte_level_regex().find_iter(source) {
        match found {
            Ok(m) => {
                spans.push(Span::new(
                    alphabet.encode_str(m.as_str()),
                    m.start().saturating_sub(shift),
                    m.end() - shift,
                ));
                last = m.end();
            }
            Err(e) => {
                // Backtracking limit: keep the remainder whole rather than fail.
                warn!(error = %e, "byte-level split failed, keeping remainder as one span");
                spans.push(Span::new(
                    alphabet.encode_str(&source[last..]),
                    last.saturating_sub(shift),
                    source.len() - shift,
                ));
                break;
            }
        }
    }

    spans
}

/// ASCII punctuation plus fixed ranges of Latin-1, General Punctuation,
/// CJK and fullwidth punctuation.
///
/// Spaces and format characters in the General Punctuation block
/// (U+2000..U+200F, U+2028..U+202F, U+205F..U+206F) are not punctuation.
fn is_punctuation(ch: char) -> bool {
    ch.is_ascii_punctuation()
        || matches!(ch,
            '\u{2010}'..='\u{2027}'
            | '\u{2030}'..='\u{205E}'
            | '\u{3001}'..='\u{3003}'
            | '\u{3008}'..='\u{3011}'
            | '\u{3014}'..='\u{301F}'
            | '\u{FF01}'..='\u{FF0F}'
            | '\u{FF1A}'..='\u{FF20}'
            | '\u{FF3B}'..='\u{FF40}'
            | '\u{FF5B}'..='\u{FF65}'
            | '¡' | '§' | '«' | '¶' | '·' | '»' | '¿')
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(spans: &[Span]) -> Vec<&str> {
        spans.iter().map(|s| s.text.as_str()).collect()
    }

    #[test]
    fn test_whitespace_split() {
        let splitter = Splitter::whitespace();
        let spans = splitter.segment("hello world,  test!");
        assert_eq!(texts(&spans), vec!["hello", "world", ",", "test", "!"]);
        assert_eq!(spans[1].offsets, (6, 11));
        assert_eq!(spans[2].offsets, (11, 12));
    }

    #[test]
    fn test_nosplit() {
        let splitter = Splitter::default();
        let spans = splitter.segment("hello world  test");
        assert_eq!(texts(&spans), vec!["hello world  test"]);
        assert_eq!(spans[0].offsets, (0, 17));
    }

    #[test]
    fn test_whitespace_only_split() {
        let splitter = Splitter::new(SplitPattern::WhitespaceSplit).unwrap();
        let spans = splitter.segment(" don't  stop ");
        assert_eq!(texts(&spans), vec!["don't", "stop"]);
        assert_eq!(spans[1].offsets, (8, 12));
    }

    #[test]
    fn test_bert_split() {
        let splitter = Splitter::new(SplitPattern::Bert).unwrap();
        let spans = splitter.segment("Hi, there! «ok»");
        assert_eq!(texts(&spans), vec!["Hi", ",", "there", "!", "«", "ok", "»"]);
        assert_eq!(spans[4].offsets, (11, 13));
    }

    #[test]
    fn test_bert_split_format_characters() {
        let splitter = Splitter::new(SplitPattern::Bert).unwrap();
        let spans = splitter.segment("a\u{200B}b\u{2060}c \u{201C}d\u{2026}\u{3002}");
        assert_eq!(
            texts(&spans),
            vec!["a\u{200B}b\u{2060}c", "\u{201C}", "d", "\u{2026}", "\u{3002}"]
        );
        assert!(!is_punctuation('\u{200B}'));
        assert!(!is_punctuation('\u{3005}'));
    }

    #[test]
    fn test_custom_split() {
        let splitter = Splitter::new(SplitPattern::Split {
            pattern: r"\s+".to_string(),
        })
        .unwrap();
        let spans = splitter.segment("hello  world");
        assert_eq!(texts(&spans), vec!["hello", "world"]);
        assert_eq!(spans[1].offsets, (7, 12));
    }

    #[test]
    fn test_invalid_custom_pattern() {
        let err = Splitter::new(SplitPattern::Split {
            pattern: "(".to_string(),
        })
        .unwrap_err();
        assert!(matches!(err, TokenizerError::ModelLoad(_)));
    }

    #[test]
    fn test_byte_level_split() {
        let splitter = Splitter::byte_level(false);
        let spans = splitter.segment("Hello world's");
        assert_eq!(texts(&spans), vec!["Hello", "Ġworld", "'s"]);
        assert_eq!(spans[1].offsets, (5, 11));
    }

    #[test]
    fn test_byte_level_prefix_space() {
        let splitter = Splitter::byte_level(true);
        let spans = splitter.segment("Hello");
        assert_eq!(texts(&spans), vec!["ĠHello"]);
        assert_eq!(spans[0].offsets, (0, 5));
    }

    #[test]
    fn test_byte_level_trailing_whitespace() {
        let splitter = Splitter::byte_level(false);
        let spans = splitter.segment("a  b");
        // The space right before a word stays attached to it.
        assert_eq!(texts(&spans), vec!["a", "Ġ", "Ġb"]);
    }

    #[test]
    fn test_offsets_cover_non_whitespace() {
        let text = "one, two  three";
        for pattern in [SplitPattern::Whitespace, SplitPattern::Bert] {
            let splitter = Splitter::new(pattern).unwrap();
            let rebuilt: String = splitter
                .segment(text)
                .iter()
                .map(|s| &text[s.offsets.0..s.offsets.1])
                .collect();
            assert_eq!(rebuilt, "one,twothree");
        }
    }

    #[test]
    fn test_empty_string() {
        for pattern in [
            SplitPattern::NoSplit,
            SplitPattern::Whitespace,
            SplitPattern::Bert,
            SplitPattern::ByteLevel {
                add_prefix_space: true,
            },
        ] {
            let splitter = Splitter::new(pattern).unwrap();
            assert!(splitter.segment("").is_empty());
        }
    }

    #[test]
    fn test_pattern_from_json() {
        let pattern: SplitPattern =
            serde_json::from_str(r#"{"type": "ByteLevel", "add_prefix_space": true}"#).unwrap();
        assert_eq!(
            pattern,
            SplitPattern::ByteLevel {
                add_prefix_space: true
            }
        );
        let pattern: SplitPattern = serde_json::from_str(r#"{"type": "Whitespace"}"#).unwrap();
        assert_eq!(pattern, SplitPattern::Whitespace);
    }
}
