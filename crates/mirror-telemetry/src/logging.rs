//! Structured logging.
//!
//! Logs carry consistent fields so that a log shipper can index them:
//! - `stream_type`: record or balance
//! - `filename`: stream file being processed
//! - `node_id`: consensus node that served a signature or body
//! - `consensus_timestamp`: record item being dispatched

use crate::{TelemetryConfig, TelemetryError};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Install the global `tracing` subscriber.
///
/// Fails if a subscriber is already installed or the filter is invalid.
pub fn init_logging(config: &TelemetryConfig) -> Result<(), TelemetryError> {
    let env_filter = EnvFilter::try_new(&config.log_level)
        .map_err(|e| TelemetryError::Config(format!("invalid log filter: {e}")))?;

    let result = if config.json_logs {
        let json_layer = tracing_subscriber::fmt::layer()
            .json()
            .with_target(true)
            .with_thread_ids(true)
            .with_current_span(true);
        tracing_subscriber::registry()
            .with(env_filter)
            .with(json_layer)
            .try_init()
    } else {
        let fmt_layer = tracing_subscriber::fmt::layer()
            .with_target(true)
            .with_ansi(config.ansi);
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt_layer)
            .try_init()
    };

    result.map_err(|e| TelemetryError::LoggingInit(e.to_string()))?;

    tracing::debug!(
        service = %config.service_name,
        json_logs = config.json_logs,
        "Logging initialized"
    );
    Ok(())
}

/// Log a stream-file event with the standard fields.
#[macro_export]
macro_rules! log_file_event {
    ($level:ident, $stream_type:expr, $filename:expr, $msg:expr $(, $($field:tt)*)?) => {
        tracing::$level!(
            stream_type = %$stream_type,
            filename = %$filename,
            $($($field)*,)?
            $msg
        )
    };
}

/// Log a per-node event with the standard fields.
#[macro_export]
macro_rules! log_node_event {
    ($level:ident, $stream_type:expr, $node_id:expr, $msg:expr $(, $($field:tt)*)?) => {
        tracing::$level!(
            stream_type = %$stream_type,
            node_id = $node_id,
            $($($field)*,)?
            $msg
        )
    };
}

#[cfg(test)]
mod tests {
    #[test]
    fn test_macros_expand() {
        log_file_event!(info, "record", "a.rcd", "parsed", count = 3);
        log_node_event!(debug, "record", 3u64, "fetched");
    }
}
