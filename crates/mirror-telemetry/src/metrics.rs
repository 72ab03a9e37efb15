//! Prometheus metrics for the importer.
//!
//! All metrics follow the naming convention: `mirror_<component>_<metric>_<unit>`
//!
//! Enabled by the default `metrics` feature. Without it every `record_*`
//! function compiles to a no-op and [`gather_metrics`] returns an empty
//! string.

#[cfg(feature = "metrics")]
use lazy_static::lazy_static;

#[cfg(feature = "metrics")]
use prometheus::{
    register_histogram_vec, register_int_counter, register_int_counter_vec,
    register_int_gauge_vec, Encoder, HistogramVec, IntCounter, IntCounterVec, IntGaugeVec,
    TextEncoder,
};

#[cfg(feature = "metrics")]
lazy_static! {
    // =========================================================================
    // DOWNLOADER
    // =========================================================================

    /// Download rounds by stream type and outcome
    pub static ref DOWNLOAD_ROUNDS: IntCounterVec = register_int_counter_vec!(
        "mirror_downloader_rounds_total",
        "Download rounds by outcome",
        &["stream_type", "outcome"]  // outcome: committed/quorum_failed/parse_failed/...
    )
    .expect("Failed to create DOWNLOAD_ROUNDS metric");

    /// Per-node fetches by outcome
    pub static ref NODE_FETCHES: IntCounterVec = register_int_counter_vec!(
        "mirror_downloader_node_fetches_total",
        "Signature and body fetches per node",
        &["stream_type", "outcome"]  // outcome: ok/missing/timeout/error
    )
    .expect("Failed to create NODE_FETCHES metric");

    /// Consensus end of the last committed file
    pub static ref LAST_COMMITTED_TIMESTAMP: IntGaugeVec = register_int_gauge_vec!(
        "mirror_downloader_last_committed_timestamp_nanos",
        "Consensus end of the last committed stream file",
        &["stream_type"]
    )
    .expect("Failed to create LAST_COMMITTED_TIMESTAMP metric");

    // =========================================================================
    // SIGNATURES
    // =========================================================================

    /// Node signature verifications
    pub static ref SIGNATURE_VERIFICATIONS: IntCounterVec = register_int_counter_vec!(
        "mirror_signature_verifications_total",
        "Node signature verifications",
        &["type", "result"]  // type: ed25519/ecdsa_secp256k1, result: verified/not_verified
    )
    .expect("Failed to create SIGNATURE_VERIFICATIONS metric");

    // =========================================================================
    // PARSER
    // =========================================================================

    /// Record items dispatched through the handler registry
    pub static ref RECORD_ITEMS_PARSED: IntCounterVec = register_int_counter_vec!(
        "mirror_parser_record_items_total",
        "Record items parsed",
        &["transaction_type"]
    )
    .expect("Failed to create RECORD_ITEMS_PARSED metric");

    /// Stream file parse and commit latency
    pub static ref PARSE_LATENCY: HistogramVec = register_histogram_vec!(
        "mirror_parser_file_duration_seconds",
        "Time to parse and persist one stream file",
        &["stream_type"],
        vec![0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0]
    )
    .expect("Failed to create PARSE_LATENCY metric");

    /// Recoverable inconsistencies hit while dispatching
    pub static ref RECOVERABLE_ERRORS: IntCounterVec = register_int_counter_vec!(
        "mirror_parser_recoverable_errors_total",
        "Recoverable errors by kind",
        &["kind"]
    )
    .expect("Failed to create RECOVERABLE_ERRORS metric");

    // =========================================================================
    // RETENTION
    // =========================================================================

    /// Rows removed by retention
    pub static ref RETENTION_ROWS_DELETED: IntCounter = register_int_counter!(
        "mirror_retention_rows_deleted_total",
        "Rows deleted by the retention job"
    )
    .expect("Failed to create RETENTION_ROWS_DELETED metric");
}

#[cfg(feature = "metrics")]
pub fn record_round(stream_type: &str, outcome: &str) {
    DOWNLOAD_ROUNDS.with_label_values(&[stream_type, outcome]).inc();
}

#[cfg(feature = "metrics")]
pub fn record_node_fetch(stream_type: &str, outcome: &str) {
    NODE_FETCHES.with_label_values(&[stream_type, outcome]).inc();
}

#[cfg(feature = "metrics")]
pub fn record_last_committed(stream_type: &str, consensus_end: i64) {
    LAST_COMMITTED_TIMESTAMP
        .with_label_values(&[stream_type])
        .set(consensus_end);
}

#[cfg(feature = "metrics")]
pub fn record_signature(signature_type: &str, verified: bool) {
    let result = if verified { "verified" } else { "not_verified" };
    SIGNATURE_VERIFICATIONS
        .with_label_values(&[signature_type, result])
        .inc();
}

#[cfg(feature = "metrics")]
pub fn record_item_parsed(transaction_type: &str) {
    RECORD_ITEMS_PARSED.with_label_values(&[transaction_type]).inc();
}

#[cfg(feature = "metrics")]
pub fn record_parse_latency(stream_type: &str, seconds: f64) {
    PARSE_LATENCY.with_label_values(&[stream_type]).observe(seconds);
}

#[cfg(feature = "metrics")]
pub fn record_recoverable_error(kind: &str) {
    RECOVERABLE_ERRORS.with_label_values(&[kind]).inc();
}

#[cfg(feature = "metrics")]
pub fn record_retention_deleted(rows: u64) {
    RETENTION_ROWS_DELETED.inc_by(rows);
}

/// Encode all registered metrics in the Prometheus text format.
#[cfg(feature = "metrics")]
pub fn gather_metrics() -> Result<String, crate::TelemetryError> {
    let encoder = TextEncoder::new();
    let mut buffer = Vec::new();
    encoder
        .encode(&prometheus::gather(), &mut buffer)
        .map_err(|e| crate::TelemetryError::MetricsInit(e.to_string()))?;
    String::from_utf8(buffer).map_err(|e| crate::TelemetryError::MetricsInit(e.to_string()))
}

// No-op implementations when metrics feature is disabled
#[cfg(not(feature = "metrics"))]
pub fn record_round(_stream_type: &str, _outcome: &str) {}

#[cfg(not(feature = "metrics"))]
pub fn record_node_fetch(_stream_type: &str, _outcome: &str) {}

#[cfg(not(feature = "metrics"))]
pub fn record_last_committed(_stream_type: &str, _consensus_end: i64) {}

#[cfg(not(feature = "metrics"))]
pub fn record_signature(_signature_type: &str, _verified: bool) {}

#[cfg(not(feature = "metrics"))]
pub fn record_item_parsed(_transaction_type: &str) {}

#[cfg(not(feature = "metrics"))]
pub fn record_parse_latency(_stream_type: &str, _seconds: f64) {}

#[cfg(not(feature = "metrics"))]
pub fn record_recoverable_error(_kind: &str) {}

#[cfg(not(feature = "metrics"))]
pub fn record_retention_deleted(_rows: u64) {}

#[cfg(not(feature = "metrics"))]
pub fn gather_metrics() -> Result<String, crate::TelemetryError> {
    Ok(String::new())
}

/// Timer guard that reports parse latency on drop.
pub struct ParseTimer {
    stream_type: &'static str,
    start: std::time::Instant,
}

impl ParseTimer {
    pub fn start(stream_type: &'static str) -> Self {
        Self {
            stream_type,
            start: std::time::Instant::now(),
        }
    }
}

impl Drop for ParseTimer {
    fn drop(&mut self) {
        record_parse_latency(self.stream_type, self.start.elapsed().as_secs_f64());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recorders_do_not_panic() {
        record_round("record", "committed");
        record_node_fetch("record", "ok");
        record_last_committed("record", 42);
        record_signature("ed25519", true);
        record_item_parsed("CRYPTOTRANSFER");
        record_recoverable_error("entity_not_found");
        record_retention_deleted(3);
        drop(ParseTimer::start("record"));
    }

    #[cfg(feature = "metrics")]
    #[test]
    fn test_gather_contains_counters() {
        record_round("balance", "quorum_failed");
        let text = gather_metrics().unwrap();
        assert!(text.contains("mirror_downloader_rounds_total"));
    }
}
