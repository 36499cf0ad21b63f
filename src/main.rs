//! Batch runner binary.
//!
//! Reads a JSON batch payload from a file (or stdin), executes it against
//! the configured management API, and exits non-zero when any item fails.
//!
//! ```bash
//! connection-reconciler payload.json --api-url https://api.example.com/api --api-key $API_KEY
//! ```
//!
//! `--api-url` and `--api-key` fall back to the `API_URL` and `API_KEY`
//! environment variables.

use anyhow::{Context, Result};
use clap::Parser;
use connection_reconciler::model::BatchAction;
use connection_reconciler::reconciler::{handle_actions, ItemOutcome};
use connection_reconciler::{ApiConfig, RestManagementApi};
use serde::Deserialize;
use std::io::Read;
use std::path::PathBuf;
use tracing::{error, info};

/// Connection batch reconciler CLI.
#[derive(Debug, Parser)]
#[command(name = "connection-reconciler")]
#[command(about = "Reconcile a declarative connection batch against the management API")]
struct Cli {
    /// Path to the JSON batch payload, or "-" for stdin
    payload: PathBuf,

    /// Base URL of the management API
    #[arg(long, env = "API_URL")]
    api_url: String,

    /// API key sent on every request
    #[arg(long, env = "API_KEY", hide_env_values = true)]
    api_key: String,
}

/// The payload may arrive wrapped (`{"payload": [...]}`) or as a bare list.
#[derive(Debug, Deserialize)]
struct PayloadEnvelope {
    payload: Vec<BatchAction>,
}

fn parse_payload(raw: &str) -> Result<Vec<BatchAction>> {
    if let Ok(envelope) = serde_json::from_str::<PayloadEnvelope>(raw) {
        return Ok(envelope.payload);
    }
    serde_json::from_str::<Vec<BatchAction>>(raw).context("payload is not a valid batch")
}

#[tokio::main]
async fn main() -> Result<()> {
    // Configure rustls crypto provider FIRST, before any other operations
    // Required for rustls 0.23+ when no default provider is set via features
    rustls::crypto::ring::default_provider()
        .install_default()
        .expect("Failed to install rustls crypto provider");

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "connection_reconciler=info".into()),
        )
        .init();

    let cli = Cli::parse();

    let raw = if cli.payload.as_os_str() == "-" {
        let mut buffer = String::new();
        std::io::stdin()
            .read_to_string(&mut buffer)
            .context("failed to read payload from stdin")?;
        buffer
    } else {
        std::fs::read_to_string(&cli.payload)
            .with_context(|| format!("failed to read payload file {:?}", cli.payload))?
    };
    let batch = parse_payload(&raw)?;

    let api = RestManagementApi::new(ApiConfig::new(cli.api_url, cli.api_key))
        .context("failed to build the API client")?;

    let summary = handle_actions(&api, &batch).await;

    for outcome in &summary.outcomes {
        match outcome {
            ItemOutcome::Create { name, result } => match result {
                Ok(kind) => info!("connection {name:?}: {kind:?}"),
                Err(reconcile_error) => {
                    error!(stage = %reconcile_error.stage(), "connection {name:?}: {reconcile_error}");
                }
            },
            ItemOutcome::Delete { results } => {
                let failed = results.iter().filter(|(_, result)| result.is_err()).count();
                info!(
                    "deleted {} of {} connection(s)",
                    results.len() - failed,
                    results.len()
                );
            }
        }
    }

    let failures = summary.failures();
    if failures > 0 {
        anyhow::bail!("{failures} item(s) failed");
    }
    info!("actions handled successfully");
    Ok(())
}
