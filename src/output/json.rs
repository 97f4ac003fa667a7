//! JSON writer for exported batch results

use super::{OutputError, OutputResult};
use crate::BatchResult;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;
use tracing::info;

/// Writes the collected batch results as one JSON array
///
/// The file is created or truncated; an existing export of the same
/// resource is replaced.
#[derive(Debug, Clone)]
pub struct JsonResultWriter {
    path: PathBuf,
}

impl JsonResultWriter {
    /// Writer targeting `path`
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Serialize `results` as a JSON array into the target file
    ///
    /// # Returns
    /// Number of bytes written
    pub fn write(&self, results: &[BatchResult]) -> OutputResult<u64> {
        let file = File::create(&self.path).map_err(|e| {
            OutputError::IoError(format!("failed to create {}: {e}", self.path.display()))
        })?;
        let mut writer = BufWriter::new(file);

        serde_json::to_writer(&mut writer, results)
            .map_err(|e| OutputError::SerializationError(e.to_string()))?;
        writer.flush().map_err(|e| {
            OutputError::IoError(format!("failed to flush {}: {e}", self.path.display()))
        })?;

        let bytes = writer
            .get_ref()
            .metadata()
            .map(|m| m.len())
            .map_err(|e| OutputError::IoError(e.to_string()))?;
        info!(
            "Wrote {} batch results ({} bytes) to {}",
            results.len(),
            bytes,
            self.path.display()
        );
        Ok(bytes)
    }
}
