//! Result writers

use std::path::{Path, PathBuf};

pub mod json;

pub use json::JsonResultWriter;

/// Output writer errors
#[derive(Debug, thiserror::Error)]
pub enum OutputError {
    /// IO error
    #[error("IO error: {0}")]
    IoError(String),

    /// Serialization error
    #[error("serialization error: {0}")]
    SerializationError(String),
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;

/// Path of the export file for `resource` inside `dir`
///
/// The resource name is used as given: `orders` becomes `orders.json`.
pub fn output_path(dir: &Path, resource: &str) -> PathBuf {
    dir.join(format!("{resource}.json"))
}
