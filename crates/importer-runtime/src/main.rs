//! # Mirror Node Importer
//!
//! Downloads signed record and balance stream files from the consensus
//! nodes' bucket, verifies them against the address book and imports them
//! into the local store.
//!
//! ## Startup Sequence
//!
//! 1. Initialize telemetry (`MN_LOG_LEVEL`, `MN_JSON_LOGS`)
//! 2. Load configuration from the file named by `MN_CONFIG` or the first
//!    argument, then `MN_*` overrides
//! 3. Open the store and restore the address book history
//! 4. Start the schedulers and wait for Ctrl+C

use anyhow::{Context, Result};
use importer_runtime::{ImporterConfig, ImporterContainer, ImporterRuntime};
use mirror_telemetry::{init_telemetry, TelemetryConfig};
use std::path::PathBuf;
use tracing::info;

fn config_path() -> Option<PathBuf> {
    std::env::args()
        .nth(1)
        .or_else(|| std::env::var("MN_CONFIG").ok())
        .map(PathBuf::from)
}

#[tokio::main]
async fn main() -> Result<()> {
    init_telemetry(&TelemetryConfig::from_env()).context("Failed to initialize telemetry")?;

    let path = config_path();
    let config = ImporterConfig::load(path.as_deref()).context("Failed to load configuration")?;
    if let Some(path) = &path {
        info!(path = %path.display(), "Loaded configuration");
    }

    let container = ImporterContainer::open(config)?;
    let mut runtime = ImporterRuntime::new(container);
    runtime.start();

    info!("Importer is running. Press Ctrl+C to stop.");
    tokio::signal::ctrl_c().await?;

    runtime.shutdown().await;
    Ok(())
}
