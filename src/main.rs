//! Main entry point for ecwid-data-downloader CLI

use clap::Parser;
use ecwid_data_downloader::cli::{Cli, CliError};
use tracing::error;
use tracing_subscriber::EnvFilter;

/// Initialize tracing subscriber with optional JSON formatting
fn init_tracing() {
    let json_format = std::env::var("LOG_FORMAT")
        .map(|v| v.to_lowercase() == "json")
        .unwrap_or(false);

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("ecwid_data_downloader=info"));

    if json_format {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let config = {
        let stdin = std::io::stdin();
        let mut input = stdin.lock();
        let mut output = std::io::stdout();
        cli.resolve_config(&mut input, &mut output)?
    };

    let summary = cli.execute(&config).await?;
    println!(
        "The {} saved to the '{}' file!",
        config.resource,
        summary.output_path.display()
    );
    Ok(())
}

#[tokio::main]
async fn main() {
    init_tracing();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await.map_err(|e| anyhow::anyhow!(e)) {
        error!("Command failed: {:#}", e);
        std::process::exit(1);
    }
}
