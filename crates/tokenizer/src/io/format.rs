//! Model data format.
//!
//! A single JSON document holding the vocabulary, merge rules, special
//! tokens and the pipeline settings. Only `model.vocab` is required.

use crate::decoder::Decoder;
use crate::post_processor::{PaddingParams, TruncationParams};
use crate::pre_tokenizer::{NormalizerConfig, SplitPattern};
use serde::{Deserialize, Serialize, Serializer};
use std::collections::HashMap;
use subtoken_core::{BpeConfig, Result, SpecialTokensConfig, TokenizerError};

/// Version written by the saver.
pub const FORMAT_VERSION: &str = "1.0";

fn default_version() -> String {
    FORMAT_VERSION.to_string()
}

/// Complete model data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SerializedModel {
    /// Format version
    #[serde(default = "default_version")]
    pub version: String,
    /// Vocabulary, merges and subword model settings
    pub model: ModelSection,
    #[serde(default)]
    pub special_tokens: SpecialTokensConfig,
    #[serde(default)]
    pub normalizer: Option<NormalizerConfig>,
    #[serde(default)]
    pub pre_tokenizer: Option<SplitPattern>,
    /// Derived from the pre-tokenizer when absent
    #[serde(default)]
    pub decoder: Option<Decoder>,
    #[serde(default)]
    pub truncation: Option<TruncationParams>,
    #[serde(default)]
    pub padding: Option<PaddingParams>,
}

/// The subword model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelSection {
    /// Token -> ID mapping, written in ID order
    #[serde(serialize_with = "serialize_by_id")]
    pub vocab: HashMap<String, u32>,
    /// Merge rules in priority order
    #[serde(default)]
    pub merges: Vec<MergeEntry>,
    #[serde(flatten)]
    pub config: BpeConfig,
}

fn serialize_by_id<S: Serializer>(
    vocab: &HashMap<String, u32>,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    let mut entries: Vec<(&String, &u32)> = vocab.iter().collect();
    entries.sort_by(|a, b| a.1.cmp(b.1).then_with(|| a.0.cmp(b.0)));
    serializer.collect_map(entries)
}

/// A merge rule: `"left right"` or `["left", "right"]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MergeEntry {
    Joined(String),
    Pair(String, String),
}

impl MergeEntry {
    /// Build an entry, using the joined form unless a side holds a space.
    pub fn new(left: &str, right: &str) -> Self {
        if left.contains(' ') || right.contains(' ') {
            MergeEntry::Pair(left.to_string(), right.to_string())
        } else {
            MergeEntry::Joined(format!("{} {}", left, right))
        }
    }

    /// The two sides of the merge.
    pub fn parts(&self) -> Result<(&str, &str)> {
        match self {
            MergeEntry::Joined(joined) => joined.split_once(' ').ok_or_else(|| {
                TokenizerError::ModelLoad(format!("invalid merge entry {:?}", joined))
            }),
            MergeEntry::Pair(left, right) => Ok((left.as_str(), right.as_str())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_document() {
        let data: SerializedModel =
            serde_json::from_str(r#"{"model": {"vocab": {"a": 0}}}"#).unwrap();
        assert_eq!(data.version, FORMAT_VERSION);
        assert_eq!(data.model.vocab["a"], 0);
        assert!(data.model.merges.is_empty());
        assert_eq!(data.model.config, BpeConfig::default());
        assert!(data.pre_tokenizer.is_none());
    }

    #[test]
    fn test_full_document() {
        let json = r###"{
            "version": "1.0",
            "model": {
                "vocab": {"h": 0, "e": 1, "he": 2},
                "merges": ["h e", ["he", "llo"]],
                "continuing_subword_prefix": "##",
                "byte_fallback": true,
                "unknown_policy": "reject"
            },
            "special_tokens": {"cls": "[CLS]", "sep": "[SEP]"},
            "normalizer": {"lowercase": true},
            "pre_tokenizer": {"type": "Bert"},
            "decoder": {"type": "Words", "cleanup": false},
            "truncation": {"max_length": 16, "direction": "left"},
            "padding": null
        }"###;
        let data: SerializedModel = serde_json::from_str(json).unwrap();

        assert_eq!(
            data.model.merges,
            vec![
                MergeEntry::Joined("h e".to_string()),
                MergeEntry::Pair("he".to_string(), "llo".to_string())
            ]
        );
        assert_eq!(data.model.config.continuing_subword_prefix.as_deref(), Some("##"));
        assert!(data.model.config.byte_fallback);
        assert!(data.model.config.fuse_unk);
        assert_eq!(data.special_tokens.bos.as_deref(), Some("[CLS]"));
        assert_eq!(data.special_tokens.eos.as_deref(), Some("[SEP]"));
        assert_eq!(data.pre_tokenizer, Some(SplitPattern::Bert));
        assert_eq!(data.decoder, Some(Decoder::Words { cleanup: false }));
        assert_eq!(data.truncation.map(|t| t.max_length), Some(16));
        assert!(data.padding.is_none());
    }

    #[test]
    fn test_merge_entry_parts() {
        assert_eq!(MergeEntry::new("a", "b").parts().unwrap(), ("a", "b"));
        assert_eq!(
            MergeEntry::new("a", " b"),
            MergeEntry::Pair("a".to_string(), " b".to_string())
        );
        assert!(MergeEntry::Joined("ab".to_string()).parts().is_err());
    }
}
