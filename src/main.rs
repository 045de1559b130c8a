//! Main entry point for the xmind2yaml CLI application.
//!
//! Extracts `content.xml` from the given XMind file and prints its outline to
//! standard output. Diagnostics go to standard error through `tracing`.

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use xmind2yaml::{Cli, convert};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();

    let lines = convert(&cli.file, &cli.extract_dir, std::io::stdout())
        .await
        .with_context(|| format!("failed to convert {}", cli.file.display()))?;

    info!(lines, "done");
    Ok(())
}
