//! Loading model data.

use super::format::SerializedModel;
use crate::decoder::Decoder;
use crate::post_processor::{PaddingParams, TruncationParams};
use crate::pre_tokenizer::{Normalizer, Splitter};
use std::path::Path;
use subtoken_core::{BpeModel, MergeRules, Result, TokenizerError, Vocabulary};
use tracing::debug;

/// Components built from model data.
#[derive(Debug, Clone)]
pub struct ModelParts {
    pub model: BpeModel,
    pub normalizer: Normalizer,
    pub splitter: Splitter,
    pub decoder: Decoder,
    pub truncation: Option<TruncationParams>,
    pub padding: Option<PaddingParams>,
}

/// Model loader - builds tokenizer components from model data.
pub struct ModelLoader;

impl ModelLoader {
    /// Parse and build model data held in memory.
    pub fn from_bytes(bytes: &[u8]) -> Result<ModelParts> {
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Err(TokenizerError::ModelLoad("model data is empty".to_string()));
        }

        let data: SerializedModel = serde_json::from_slice(bytes)
            .map_err(|e| TokenizerError::ModelLoad(format!("malformed model data: {}", e)))?;

        Self::build(data)
    }

    /// Read, parse and build a model file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<ModelParts> {
        let path = path.as_ref();
        let bytes = std::fs::read(path).map_err(|err| TokenizerError::Io {
            path: path.to_path_buf(),
            err,
        })?;
        debug!(path = %path.display(), bytes = bytes.len(), "read model file");

        Self::from_bytes(&bytes)
    }

    /// Build components from deserialized model data.
    pub fn build(data: SerializedModel) -> Result<ModelParts> {
        let mut vocab = Vocabulary::from_map(data.model.vocab)?;
        vocab.add_special_tokens(&data.special_tokens);

        let config = data.model.config;
        let merges = {
            let pairs = data
                .model
                .merges
                .iter()
                .map(|entry| entry.parts())
                .collect::<Result<Vec<_>>>()?;
            MergeRules::from_token_pairs(
                &vocab,
                pairs,
                config.continuing_subword_prefix.as_deref(),
            )?
        };

        let splitter = Splitter::new(data.pre_tokenizer.unwrap_or_default())?;
        let decoder = data
            .decoder
            .unwrap_or_else(|| Decoder::for_splitter(splitter.pattern()));

        Ok(ModelParts {
            model: BpeModel::new(vocab, merges, config),
            normalizer: Normalizer::new(data.normalizer.unwrap_or_default()),
            splitter,
            decoder,
            truncation: data.truncation,
            padding: data.padding,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pre_tokenizer::SplitPattern;

    #[test]
    fn test_build_bert_style_model() {
        let json = br#"{
            "model": {"vocab": {"[PAD]": 0, "[UNK]": 1, "[CLS]": 2, "[SEP]": 3, "hello": 4, "world": 5}},
            "special_tokens": {"pad": "[PAD]", "unk": "[UNK]", "cls": "[CLS]", "sep": "[SEP]"},
            "pre_tokenizer": {"type": "Whitespace"}
        }"#;
        let parts = ModelLoader::from_bytes(json).unwrap();

        let vocab = parts.model.vocab();
        assert_eq!(vocab.len(), 6);
        assert_eq!(vocab.special.bos, Some(2));
        assert_eq!(vocab.special.eos, Some(3));
        assert_eq!(parts.splitter.pattern(), &SplitPattern::Whitespace);
        assert_eq!(parts.decoder, Decoder::Words { cleanup: true });
        assert!(parts.truncation.is_none());
    }

    #[test]
    fn test_missing_special_token_is_appended() {
        let json = br#"{"model": {"vocab": {"a": 0, "b": 1}}, "special_tokens": {"unk": "<unk>"}}"#;
        let parts = ModelLoader::from_bytes(json).unwrap();
        assert_eq!(parts.model.vocab().special.unk, Some(2));
        assert_eq!(parts.model.vocab().len(), 3);
    }

    #[test]
    fn test_merges_resolved() {
        let json = br#"{"model": {"vocab": {"h": 0, "i": 1, "hi": 2}, "merges": ["h i"]}}"#;
        let parts = ModelLoader::from_bytes(json).unwrap();
        assert_eq!(parts.model.merges().get((0, 1)), Some((0, 2)));
    }

    #[test]
    fn test_empty_data() {
        for bytes in [&b""[..], b"  \n"] {
            let err = ModelLoader::from_bytes(bytes).unwrap_err();
            assert!(matches!(err, TokenizerError::ModelLoad(_)));
        }
    }

    #[test]
    fn test_malformed_data() {
        for bytes in [
            &b"{not json"[..],
            br#"{"version": "1.0"}"#,
            br#"{"model": {"vocab": {"a": 0, "b": 2}}}"#,
            br#"{"model": {"vocab": {"a": 0}, "merges": ["a z"]}}"#,
            br#"{"model": {"vocab": {"a": 0}}, "pre_tokenizer": {"type": "Split", "pattern": "("}}"#,
        ] {
            let err = ModelLoader::from_bytes(bytes).unwrap_err();
            assert!(matches!(err, TokenizerError::ModelLoad(_)), "{:?}", err);
        }
    }

    #[test]
    fn test_missing_file() {
        let err = ModelLoader::from_file("/nonexistent/subtoken/model.json").unwrap_err();
        assert!(matches!(err, TokenizerError::Io { .. }));
    }
}
