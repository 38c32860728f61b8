//! Text normalization for pre-tokenization.
//!
//! This module provides the model-configured normalizer: control-character
//! cleanup, Unicode normalization (NFC, NFD, NFKC, NFKD), case folding and
//! accent stripping, applied before segmentation.

use serde::{Deserialize, Serialize};
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Normalization form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum NormalizationForm {
    /// Canonical composition
    NFC,
    /// Canonical decomposition
    NFD,
    /// Compatibility composition
    NFKC,
    /// Compatibility decomposition
    NFKD,
    /// No normalization
    #[default]
    None,
}

/// Normalizer rules as stored in model data.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NormalizerConfig {
    /// Drop control characters and map all whitespace to a plain space
    pub clean_text: bool,
    /// Unicode normalization form
    pub form: NormalizationForm,
    /// Lowercase the text
    pub lowercase: bool,
    /// Remove combining marks after canonical decomposition
    pub strip_accents: bool,
}

/// Unicode normalizer.
///
/// Steps run in a fixed order: clean, form, lowercase, strip accents, form.
/// The trailing form pass restores the configured form after case folding,
/// which keeps `normalize` idempotent.
#[derive(Debug, Clone, Default)]
pub struct Normalizer {
    config: NormalizerConfig,
}

impl Normalizer {
    /// Create a new normalizer.
    pub fn new(config: NormalizerConfig) -> Self {
        Self { config }
    }

    /// Create a normalizer applying only a Unicode form.
    pub fn with_form(form: NormalizationForm) -> Self {
        Self::new(NormalizerConfig {
            form,
            ..Default::default()
        })
    }

    /// Create an NFC normalizer.
    pub fn nfc() -> Self {
        Self::with_form(NormalizationForm::NFC)
    }

    /// The rules this normalizer applies.
    pub fn config(&self) -> &NormalizerConfig {
        &self.config
    }

    /// Normalize text.
    pub fn normalize(&self, text: &str) -> String {
        if !self.is_enabled() {
            return text.to_string();
        }

        let mut normalized = if self.config.clean_text {
            clean_text(text)
        } else {
            text.to_string()
        };

        normalized = self.apply_form(normalized);

        if self.config.lowercase {
            normalized = normalized.to_lowercase();
        }

        if self.config.strip_accents {
            normalized = normalized
                .nfd()
                .filter(|&c| !is_combining_mark(c))
                .collect();
        }

        if self.config.lowercase || self.config.strip_accents {
            normalized = self.apply_form(normalized);
        }

        normalized
    }

    fn apply_form(&self, text: String) -> String {
        match self.config.form {
            NormalizationForm::NFC => text.nfc().collect(),
            NormalizationForm::NFD => text.nfd().collect(),
            NormalizationForm::NFKC => text.nfkc().collect(),
            NormalizationForm::NFKD => text.nfkd().collect(),
            NormalizationForm::None => text,
        }
    }

    /// Check if normalization is enabled.
    pub fn is_enabled(&self) -> bool {
        self.config.clean_text
            || self.config.lowercase
            || self.config.strip_accents
            || self.config.form != NormalizationForm::None
    }
}

fn clean_text(text: &str) -> String {
    text.chars()
        .filter(|&c| c != '\0' && c != char::REPLACEMENT_CHARACTER)
        .filter_map(|c| {
            if c.is_whitespace() {
                Some(' ')
            } else if c.is_control() {
                None
            } else {
                Some(c)
            }
        })
        .collect()
}
