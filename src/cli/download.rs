//! Export command implementation

use crate::config::{AuthMode, ConfigError, ExportConfig, ThrottleMode};
use crate::downloader::{ExportExecutor, ExportSummary};
use clap::Parser;
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::io::{BufRead, Write};
use std::path::PathBuf;
use tracing::info;

use super::CliError;

/// Prompt shown when no resource is given on the command line
pub const PROMPT: &str = "Enter an ecwid api method: ";

/// Ecwid Data Downloader CLI
///
/// Without `--resource` the API method is read interactively.
#[derive(Parser, Debug)]
#[command(name = "ecwid-data-downloader")]
#[command(about = "Export an Ecwid API resource to a JSON file via the batch API", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Store identifier
    #[arg(long, env = "ECWID_STORE_ID", hide_env_values = true)]
    pub store_id: Option<String>,

    /// Access token
    #[arg(long, env = "ECWID_ACCESS_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// API method to export (e.g. products, orders, customers)
    #[arg(long)]
    pub resource: Option<String>,

    /// API base URL
    #[arg(long, env = "ECWID_API_URL")]
    pub api_url: Option<String>,

    /// Token placement: query or header
    #[arg(long, default_value = "query")]
    pub auth: AuthMode,

    /// Throttle strategy: fixed or interval
    #[arg(long, default_value = "fixed")]
    pub throttle: ThrottleMode,

    /// Directory the result file is written to
    #[arg(long, default_value = ".")]
    pub output_dir: PathBuf,
}

impl Cli {
    /// Resolve the export configuration, prompting for the resource if needed
    pub fn resolve_config<R: BufRead, W: Write>(
        &self,
        input: &mut R,
        output: &mut W,
    ) -> Result<ExportConfig, CliError> {
        let store_id = self.store_id.clone().ok_or(ConfigError::MissingStoreId)?;
        let token = self.token.clone().ok_or(ConfigError::MissingAccessToken)?;
        let resource = match &self.resource {
            Some(resource) => resource.clone(),
            None => prompt_resource(input, output)?,
        };

        let mut config = ExportConfig::new(store_id, token, resource)?
            .with_auth(self.auth)
            .with_throttle(self.throttle)
            .with_output_dir(self.output_dir.clone());
        if let Some(api_url) = &self.api_url {
            config = config.with_api_url(api_url.clone())?;
        }
        Ok(config)
    }

    /// Run the export described by `config`
    pub async fn execute(&self, config: &ExportConfig) -> Result<ExportSummary, CliError> {
        info!(
            "Exporting '{}' from store {} ({:?} auth, {:?} throttle)",
            config.resource, config.store_id, config.auth, config.throttle
        );

        let executor = ExportExecutor::from_config(config)?;
        let progress = create_progress_bar(&config.resource);
        let result = executor.execute_with_progress(Some(progress.clone())).await;
        progress.finish_and_clear();

        Ok(result?)
    }
}

/// Print the prompt and read one line as the resource name
pub fn prompt_resource<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
) -> Result<String, ConfigError> {
    write!(output, "{PROMPT}").map_err(|e| ConfigError::Prompt(e.to_string()))?;
    output.flush().map_err(|e| ConfigError::Prompt(e.to_string()))?;

    let mut line = String::new();
    let read = input
        .read_line(&mut line)
        .map_err(|e| ConfigError::Prompt(e.to_string()))?;
    if read == 0 {
        return Err(ConfigError::EmptyResource);
    }
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

// ─── Progress bar ────────────────────────────────────────────────────────────

/// Block progress bar; length is set once the item total is known
fn create_progress_bar(resource: &str) -> ProgressBar {
    let pb = ProgressBar::with_draw_target(Some(0), ProgressDrawTarget::stderr());
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} batches {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("#>-"),
    );
    pb.set_message(format!("Downloading {resource}"));
    pb
}
