//! Saving model data.

use super::format::{MergeEntry, ModelSection, SerializedModel, FORMAT_VERSION};
use crate::Tokenizer;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use subtoken_core::{Result, TokenizerError};

/// Model saver - writes a tokenizer back out as model data.
pub struct ModelSaver<'a> {
    tokenizer: &'a Tokenizer,
}

impl<'a> ModelSaver<'a> {
    /// Create a new model saver.
    pub fn new(tokenizer: &'a Tokenizer) -> Self {
        Self { tokenizer }
    }

    /// Serialize the tokenizer to pretty-printed JSON.
    pub fn to_vec(&self) -> Result<Vec<u8>> {
        serde_json::to_vec_pretty(&self.serialize())
            .map_err(|e| TokenizerError::Save(format!("failed to serialize model: {}", e)))
    }

    /// Save the tokenizer as a single JSON file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let io_err = |err| TokenizerError::Io {
            path: path.to_path_buf(),
            err,
        };

        let bytes = self.to_vec()?;
        let file = File::create(path).map_err(io_err)?;
        let mut writer = BufWriter::new(file);
        writer.write_all(&bytes).map_err(io_err)?;
        writer.flush().map_err(io_err)?;

        Ok(())
    }

    /// Build the serializable form.
    pub fn serialize(&self) -> SerializedModel {
        let tokenizer = self.tokenizer;
        let model = tokenizer.model();
        let vocab = model.vocab();

        let merges = model
            .merges()
            .ordered()
            .into_iter()
            .map(|((left, right), _)| {
                MergeEntry::new(
                    vocab.get_token(left).unwrap_or_default(),
                    vocab.get_token(right).unwrap_or_default(),
                )
            })
            .collect();

        let processor = tokenizer.post_processor();

        SerializedModel {
            version: FORMAT_VERSION.to_string(),
            model: ModelSection {
                vocab: vocab
                    .iter()
                    .map(|(id, token)| (token.to_string(), id))
                    .collect(),
                merges,
                config: model.config().clone(),
            },
            special_tokens: vocab.special_tokens_config(),
            normalizer: Some(tokenizer.normalizer().config().clone()),
            pre_tokenizer: Some(tokenizer.splitter().pattern().clone()),
            decoder: Some(*tokenizer.decoder()),
            truncation: processor.truncation().copied(),
            padding: processor.padding().cloned(),
        }
    }
}
