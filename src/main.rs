//! tracelight binary entry point

use anyhow::Context as _;
use clap::Parser;
use std::sync::Arc;
use tracelight::cli::{Cli, Commands};
use tracelight::server::ErrorData;
use tracelight::{ContextualizeOptions, Contextualizer, InitOptions};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.quiet {
        "error"
    } else if cli.verbose {
        "debug"
    } else {
        "info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();

    match cli.command {
        Commands::Contextualize { report, output } => {
            let raw = tokio::fs::read_to_string(&report)
                .await
                .with_context(|| format!("failed to read report {}", report.display()))?;
            let data: ErrorData = serde_json::from_str(&raw)
                .with_context(|| format!("malformed error report {}", report.display()))?;

            let contextualizer = Contextualizer::initialize(InitOptions {
                enable_server: false,
                ..InitOptions::default()
            });

            // Use the forwarded trace when present; otherwise capture one
            // from the report's stack string.
            let caught = if data.augmented_trace.is_some() {
                data.into_caught()
            } else {
                contextualizer.capture(data.report)
            };

            let options = ContextualizeOptions { output_file: output };
            contextualizer
                .contextualize_error(&caught, &options)
                .await
                .context("contextualization failed")?;
        }
        Commands::Serve { port } => {
            let contextualizer = Arc::new(Contextualizer::initialize(InitOptions {
                enable_server: true,
                server_port: port,
            }));
            tracelight::server::serve(contextualizer, port)
                .await
                .context("companion endpoint failed")?;
        }
    }

    Ok(())
}
