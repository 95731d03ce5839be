//! Observability module for metrics and logging.
//!
//! Prometheus metrics export and the tracing subscriber setup used by the
//! binary.

mod logging;
mod metrics;

pub use logging::init_tracing;
pub use metrics::{
    MetricsConfig, MetricsError, init_metrics, record_broker_error, record_broker_latency,
    record_guard_block, record_snapshot_update, record_trade_command,
};
