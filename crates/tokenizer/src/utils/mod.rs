//! Utility functions.

pub mod text;

pub use text::truncate_string;
