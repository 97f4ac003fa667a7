//! CLI command implementation

pub mod download;
pub mod error;

pub use download::{prompt_resource, Cli, PROMPT};
pub use error::CliError;
