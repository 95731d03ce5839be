//! Prometheus metrics for the autopilot engine.
//!
//! Counts trade commands by outcome, guard blocks by reason, broker errors
//! by venue, and live snapshot updates.
//!
//! # Example
//!
//! ```ignore
//! use autopilot_engine::observability::{init_metrics, MetricsConfig};
//!
//! let config = MetricsConfig::default();
//! init_metrics(&config)?;
//!
//! record_trade_command("open", "auto", "sim", "executed");
//! ```

use metrics::{counter, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::{Ipv4Addr, SocketAddr};

/// Configuration for the metrics exporter.
#[derive(Debug, Clone)]
pub struct MetricsConfig {
    /// Address to bind the metrics HTTP listener.
    pub listen_addr: SocketAddr,
    /// Histogram buckets for broker latency (in seconds).
    pub latency_buckets: Vec<f64>,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            listen_addr: SocketAddr::from((Ipv4Addr::UNSPECIFIED, 9090)),
            // Latency buckets from 5ms to 10s
            latency_buckets: vec![0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0],
        }
    }
}

impl MetricsConfig {
    /// Create a new metrics configuration with custom address.
    #[must_use]
    pub fn with_addr(addr: SocketAddr) -> Self {
        Self {
            listen_addr: addr,
            ..Default::default()
        }
    }
}

/// Initialize the Prometheus metrics exporter.
///
/// This starts an HTTP server that exposes metrics at `/metrics`.
///
/// # Errors
///
/// Returns an error if the metrics exporter fails to start (e.g., port already in use).
pub fn init_metrics(config: &MetricsConfig) -> Result<(), MetricsError> {
    PrometheusBuilder::new()
        .with_http_listener(config.listen_addr)
        .set_buckets(&config.latency_buckets)
        .map_err(|e| MetricsError::Configuration(e.to_string()))?
        .install()
        .map_err(|e| MetricsError::Installation(e.to_string()))?;

    tracing::info!(
        addr = %config.listen_addr,
        "Prometheus metrics exporter started"
    );

    Ok(())
}

/// Error type for metrics operations.
#[derive(Debug, thiserror::Error)]
pub enum MetricsError {
    /// Failed to configure metrics exporter.
    #[error("metrics configuration error: {0}")]
    Configuration(String),
    /// Failed to install metrics exporter.
    #[error("metrics installation error: {0}")]
    Installation(String),
}

// ============================================================================
// Pipeline Metrics
// ============================================================================

/// Record one pass through the execution pipeline.
///
/// # Arguments
///
/// * `command_type` - `open`, `close`, `modify` or `invalid`
/// * `mode` - `confirm` or `auto`
/// * `environment` - `sim` or `live`
/// * `outcome` - `executed`, `hard_blocked`, `needs_confirmation`, `preview` or `failed`
pub fn record_trade_command(command_type: &str, mode: &str, environment: &str, outcome: &str) {
    counter!(
        "trade_commands_total",
        "type" => command_type.to_string(),
        "mode" => mode.to_string(),
        "environment" => environment.to_string(),
        "outcome" => outcome.to_string()
    )
    .increment(1);
}

/// Record a block reason. Detail after `:` is dropped to bound label cardinality.
pub fn record_guard_block(reason: &str) {
    let code = reason.split(':').next().unwrap_or(reason).trim();
    counter!("guard_blocks_total", "reason" => code.to_string()).increment(1);
}

// ============================================================================
// Broker Metrics
// ============================================================================

/// Record a failed broker call.
///
/// # Arguments
///
/// * `venue` - `sim` or `live`
pub fn record_broker_error(venue: &str) {
    counter!("broker_errors_total", "venue" => venue.to_string()).increment(1);
}

/// Record broker call latency.
pub fn record_broker_latency(venue: &str, latency_seconds: f64) {
    histogram!("broker_latency_seconds", "venue" => venue.to_string()).record(latency_seconds);
}

// ============================================================================
// Snapshot Metrics
// ============================================================================

/// Record a live snapshot replacement.
pub fn record_snapshot_update() {
    counter!("snapshot_updates_total").increment(1);
}
