//! # Mirror Telemetry
//!
//! Logging and metrics for the mirror node importer.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use mirror_telemetry::{init_telemetry, TelemetryConfig};
//!
//! fn main() {
//!     init_telemetry(&TelemetryConfig::from_env()).expect("telemetry");
//!     // Logs and metrics are now being collected
//! }
//! ```
//!
//! ## Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `MN_LOG_LEVEL` | `info` | Log filter, falls back to `RUST_LOG` |
//! | `MN_JSON_LOGS` | `false` | JSON log lines |
//! | `MN_SERVICE_NAME` | `mirror-importer` | Service name |

mod config;
mod logging;
pub mod metrics;

pub use config::TelemetryConfig;
pub use logging::init_logging;
pub use metrics::{gather_metrics, ParseTimer};

use thiserror::Error;

/// Telemetry initialization errors
#[derive(Error, Debug)]
pub enum TelemetryError {
    #[error("Failed to initialize logging: {0}")]
    LoggingInit(String),

    #[error("Failed to encode metrics: {0}")]
    MetricsInit(String),

    #[error("Invalid configuration: {0}")]
    Config(String),
}

/// Initialize logging. Metrics register lazily on first use.
pub fn init_telemetry(config: &TelemetryConfig) -> Result<(), TelemetryError> {
    init_logging(config)?;
    tracing::info!(service = %config.service_name, "Telemetry initialized");
    Ok(())
}
