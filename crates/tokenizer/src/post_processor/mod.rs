//! Post-processing: truncation, boundary tokens and padding.
//!
//! Content is truncated first so that the boundary tokens injected
//! afterwards always survive, then the result is padded.

pub mod padding;
pub mod special;
pub mod truncation;

pub use padding::{PaddingParams, DEFAULT_PAD_TOKEN};
pub use special::{SpecialTokenHandler, TextPiece};
pub use truncation::{TruncationDirection, TruncationParams};

use crate::tokenizer::Encoding;

/// Turns segmented content into the final encoding.
#[derive(Debug, Clone)]
pub struct PostProcessor {
    handler: SpecialTokenHandler,
    truncation: Option<TruncationParams>,
    padding: Option<PaddingParams>,
}

impl PostProcessor {
    pub fn new(
        handler: SpecialTokenHandler,
        truncation: Option<TruncationParams>,
        padding: Option<PaddingParams>,
    ) -> Self {
        Self {
            handler,
            truncation,
            padding,
        }
    }

    /// The special token handler.
    pub fn handler(&self) -> &SpecialTokenHandler {
        &self.handler
    }

    pub fn truncation(&self) -> Option<&TruncationParams> {
        self.truncation.as_ref()
    }

    pub fn padding(&self) -> Option<&PaddingParams> {
        self.padding.as_ref()
    }

    /// Truncate, inject boundary tokens, then pad.
    pub fn process(
        &self,
        mut first: Encoding,
        mut second: Option<Encoding>,
        add_special_tokens: bool,
    ) -> Encoding {
        let added = if add_special_tokens {
            self.handler.added_tokens(second.is_some())
        } else {
            0
        };

        let mut out = match &self.truncation {
            Some(params) => {
                let budget = params.max_length.saturating_sub(added);
                match second.as_mut() {
                    Some(second) => {
                        let (keep_first, keep_second) =
                            truncation::longest_first(first.len(), second.len(), budget);
                        first.truncate(keep_first, params.direction);
                        second.truncate(keep_second, params.direction);
                    }
                    None => first.truncate(budget, params.direction),
                }

                let mut out = self.handler.inject(first, second, add_special_tokens);
                // Fewer slots than boundary tokens: keep the leading ones.
                out.truncate(params.max_length, TruncationDirection::Right);
                out
            }
            None => self.handler.inject(first, second, add_special_tokens),
        };

        if let Some(params) = &self.padding {
            out.pad(
                params.length,
                params.pad_id,
                params.pad_type_id,
                &params.pad_token,
            );
        }

        out
    }
}
