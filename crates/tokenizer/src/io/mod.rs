//! Model data (de)serialization.
//!
//! Tokenizers are loaded from, and saved to, a single JSON document.

pub mod format;
pub mod load;
pub mod save;

pub use format::{MergeEntry, ModelSection, SerializedModel, FORMAT_VERSION};
pub use load::{ModelLoader, ModelParts};
pub use save::ModelSaver;
