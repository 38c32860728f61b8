//! Special token handling.
//!
//! Two jobs: inserting the boundary tokens (start / end of sequence) around
//! encoded content, and, when explicitly enabled, recognizing special token
//! text inside the input so it encodes to the special ID instead of being
//! segmented as ordinary text.

use crate::tokenizer::Encoding;
use aho_corasick::{AhoCorasick, MatchKind};
use subtoken_core::{Result, TokenizerError, Vocabulary};

/// A piece of input text after special-token splitting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextPiece<'t> {
    /// Ordinary text, to be normalized and segmented
    Text(&'t str),
    /// Literal occurrence of a special token
    Special { id: u32, content: &'t str },
}

/// Boundary insertion and in-text special token recognition.
#[derive(Debug, Clone)]
pub struct SpecialTokenHandler {
    /// Start-of-sequence token
    bos: Option<(u32, String)>,
    /// End-of-sequence token
    eos: Option<(u32, String)>,
    /// Leftmost-longest matcher over every special token string
    matcher: Option<AhoCorasick>,
    /// Pattern index -> special token ID
    pattern_ids: Vec<u32>,
}

impl SpecialTokenHandler {
    /// Build the handler from the vocabulary's special token set.
    ///
    /// The in-text matcher is only built when `recognize_in_text` is set.
    pub fn new(vocab: &Vocabulary, recognize_in_text: bool) -> Result<Self> {
        let resolve = |id: Option<u32>| -> Result<Option<(u32, String)>> {
            id.map(|id| vocab.reverse(id).map(|token| (id, token.to_string())))
                .transpose()
        };
        let bos = resolve(vocab.special.bos)?;
        let eos = resolve(vocab.special.eos)?;

        let (matcher, pattern_ids) = if recognize_in_text {
            let entries: Vec<(u32, &str)> = vocab
                .special_entries()
                .into_iter()
                .filter(|(_, content)| !content.is_empty())
                .collect();
            if entries.is_empty() {
                (None, Vec::new())
            } else {
                let matcher = AhoCorasick::builder()
                    .match_kind(MatchKind::LeftmostLongest)
                    .build(entries.iter().map(|(_, content)| content))
                    .map_err(|e| {
                        TokenizerError::ModelLoad(format!("special token matcher: {}", e))
                    })?;
                (Some(matcher), entries.iter().map(|(id, _)| *id).collect())
            }
        } else {
            (None, Vec::new())
        };

        Ok(Self {
            bos,
            eos,
            matcher,
            pattern_ids,
        })
    }

    /// The start-of-sequence token, if configured.
    pub fn bos(&self) -> Option<(u32, &str)> {
        self.bos.as_ref().map(|(id, token)| (*id, token.as_str()))
    }

    /// The end-of-sequence token, if configured.
    pub fn eos(&self) -> Option<(u32, &str)> {
        self.eos.as_ref().map(|(id, token)| (*id, token.as_str()))
    }

    /// Number of boundary tokens `inject` adds.
    pub fn added_tokens(&self, is_pair: bool) -> usize {
        let bos = self.bos.is_some() as usize;
        let eos = self.eos.is_some() as usize;
        if is_pair {
            bos + 2 * eos
        } else {
            bos + eos
        }
    }

    /// Split text around literal special tokens.
    ///
    /// Without in-text recognition the whole text is a single piece.
    pub fn split_special<'t>(&self, text: &'t str) -> Vec<TextPiece<'t>> {
        let Some(matcher) = &self.matcher else {
            return vec![TextPiece::Text(text)];
        };

        let mut pieces = Vec::new();
        let mut last = 0;
        for m in matcher.find_iter(text) {
            if m.start() > last {
                pieces.push(TextPiece::Text(&text[last..m.start()]));
            }
            pieces.push(TextPiece::Special {
                id: self.pattern_ids[m.pattern().as_usize()],
                content: &text[m.start()..m.end()],
            });
            last = m.end();
        }
        if last < text.len() {
            pieces.push(TextPiece::Text(&text[last..]));
        }

        pieces
    }

    /// Combine encoded content with boundary tokens.
    ///
    /// Single: `bos A eos`. Pair: `bos A eos B eos`, where `B` and its
    /// closing `eos` get type ID 1. Without `add_special_tokens` the
    /// content is only concatenated.
    pub fn inject(
        &self,
        first: Encoding,
        second: Option<Encoding>,
        add_special_tokens: bool,
    ) -> Encoding {
        let capacity = first.len()
            + second.as_ref().map_or(0, Encoding::len)
            + self.added_tokens(second.is_some());
        let mut out = Encoding::with_capacity(capacity);

        if add_special_tokens {
            if let Some((id, token)) = &self.bos {
                out.push(*id, token.as_str(), 0, true);
            }
        }
        out.extend(first);
        if add_special_tokens {
            if let Some((id, token)) = &self.eos {
                out.push(*id, token.as_str(), 0, true);
            }
        }

        if let Some(mut second) = second {
            second.set_type_id(1);
            out.extend(second);
            if add_special_tokens {
                if let Some((id, token)) = &self.eos {
                    out.push(*id, token.as_str(), 1, true);
                }
            }
        }

        out
    }
}
