//! Autopilot Engine Binary
//!
//! Starts the risk guard and execution routing engine.
//!
//! # Usage
//!
//! ```bash
//! cargo run --bin autopilot-engine
//! ```
//!
//! # Environment Variables
//!
//! ## Required
//! - `LIVE_BROKER_URL`: Live broker gateway base URL
//! - `LIVE_BROKER_TOKEN`: Live broker gateway bearer token
//!
//! ## Optional
//! - `AUTOPILOT_CONFIG`: YAML config path (default: config.yaml when present)
//! - `MAX_DAILY_DD_PERCENT`, `MAX_OPEN_POSITIONS`, `MAX_POSITIONS_PER_SYMBOL`,
//!   `MAX_SINGLE_TRADE_RISK_PERCENT`: Guard thresholds (default: 4 / 5 / 3 / 1)
//! - `AUTO_EXECUTE_LIVE`: Let auto mode place live orders (default: false)
//! - `ENFORCE_DESK_POLICY`: Cap trade risk by the desk policy (default: false)
//! - `TILT_OVERTRADING_LIMIT`: Trades per day before overtrading (default: 5)
//! - `HTTP_PORT`: HTTP server port (default: 8080)
//! - `METRICS_PORT`: Prometheus exporter port (default: 9090)
//! - `RUST_LOG`: Log filter (default: autopilot_engine=info)

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use autopilot_engine::application::services::BrokerStateStore;
use autopilot_engine::application::use_cases::{ExecutionEngine, RiskPolicyUseCase};
use autopilot_engine::config::{Config, load_config};
use autopilot_engine::domain::desk_policy::DeskPolicyEngine;
use autopilot_engine::domain::tilt::TiltService;
use autopilot_engine::infrastructure::InMemorySessionState;
use autopilot_engine::infrastructure::broker::{HttpLiveBroker, InMemorySimBroker};
use autopilot_engine::infrastructure::http::{AppState, create_router};
use autopilot_engine::infrastructure::persistence::InMemoryJournal;
use autopilot_engine::observability::{MetricsConfig, init_metrics, init_tracing};
use tokio::net::TcpListener;
use tokio::signal;

/// Concrete type alias for the execution engine.
type ConcreteExecutionEngine =
    ExecutionEngine<InMemorySessionState, HttpLiveBroker, InMemorySimBroker>;

/// Concrete type alias for the HTTP state.
type ConcreteAppState =
    AppState<InMemorySessionState, HttpLiveBroker, InMemorySimBroker, InMemoryJournal>;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    load_dotenv();

    let config = build_config()?;
    init_tracing(
        &config.observability.logging.level,
        config.observability.logging.is_json(),
    );

    tracing::info!("Starting Autopilot Engine");
    log_config(&config);

    let metrics_addr: SocketAddr =
        format!("{}:{}", config.server.bind_address, config.server.metrics_port)
            .parse()
            .context("invalid metrics address")?;
    init_metrics(&MetricsConfig::with_addr(metrics_addr))?;

    let state = create_state(&config)?;
    let app = create_router(state);

    let http_addr: SocketAddr =
        format!("{}:{}", config.server.bind_address, config.server.http_port)
            .parse()
            .context("invalid HTTP address")?;

    tracing::info!(%http_addr, "HTTP server starting");
    tracing::info!("Endpoints:");
    tracing::info!("  GET  /health");
    tracing::info!("  POST /api/v1/trade-commands/execute");
    tracing::info!("  POST /api/v1/trade-commands/evaluate");
    tracing::info!("  GET  /api/v1/broker/snapshot");
    tracing::info!("  PUT  /api/v1/broker/snapshot");
    tracing::info!("  GET  /api/v1/risk/policy");
    tracing::info!("  POST /api/v1/kill-switch");
    tracing::info!("  POST /api/v1/journal");

    let listener = TcpListener::bind(http_addr)
        .await
        .with_context(|| format!("failed to bind {http_addr}"))?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server error")?;

    tracing::info!("Autopilot engine stopped");
    Ok(())
}

/// Load the YAML config (if any), then apply environment overrides.
fn build_config() -> anyhow::Result<Config> {
    let path = std::env::var("AUTOPILOT_CONFIG").ok();
    let mut config = load_config(path.as_deref())?;
    config.apply_env_overrides(|name| std::env::var(name).ok())?;
    config.require_live_credentials()?;
    Ok(config)
}

/// Log the effective configuration.
fn log_config(config: &Config) {
    tracing::info!(
        http_port = config.server.http_port,
        metrics_port = config.server.metrics_port,
        max_daily_dd_percent = %config.guard.max_daily_drawdown_percent,
        max_open_positions = config.guard.max_open_positions,
        max_positions_per_symbol = config.guard.max_positions_per_symbol,
        max_single_trade_risk_percent = %config.guard.max_single_trade_risk_percent,
        auto_execute_live = config.execution.auto_execute_live,
        enforce_desk_policy = config.execution.enforce_desk_policy,
        session_environment = %config.execution.session_environment,
        live_broker_url = %config.broker.live.base_url,
        "Configuration loaded"
    );
}

/// Wire adapters, services and use cases.
fn create_state(config: &Config) -> anyhow::Result<ConcreteAppState> {
    let live_broker = Arc::new(
        HttpLiveBroker::new(&config.broker.live.to_adapter_config())
            .context("failed to create live broker client")?,
    );
    let sim_broker = Arc::new(InMemorySimBroker::new(config.execution.sim_starting_balance));
    let session = Arc::new(InMemorySessionState::new(config.execution.session_environment));
    let journal = Arc::new(InMemoryJournal::new());
    let store = Arc::new(BrokerStateStore::new());

    store.subscribe(|snapshot| {
        tracing::debug!(
            balance = ?snapshot.balance,
            equity = ?snapshot.equity,
            positions = snapshot.open_positions.len(),
            "Live snapshot received"
        );
    });

    let engine: Arc<ConcreteExecutionEngine> = Arc::new(ExecutionEngine::new(
        Arc::clone(&session),
        live_broker,
        sim_broker,
        Arc::clone(&store),
        config.guard.clone(),
        config.execution.settings(),
    ));

    let risk_policy = Arc::new(RiskPolicyUseCase::new(
        Arc::clone(&journal),
        Arc::clone(&store),
        TiltService::new(config.tilt.clone()),
        DeskPolicyEngine::new(config.desk_policy.clone()),
    ));

    Ok(AppState {
        engine,
        risk_policy,
        store,
        session,
        journal,
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Load .env file from current directory or any ancestor directory.
fn load_dotenv() {
    if dotenvy::dotenv().is_ok() {
        return;
    }

    if let Ok(cwd) = std::env::current_dir() {
        let mut dir = cwd.as_path();
        while let Some(parent) = dir.parent() {
            let env_path = parent.join(".env");
            if env_path.exists() {
                let _ = dotenvy::from_path(&env_path);
                return;
            }
            dir = parent;
        }
    }
}

/// Wait for shutdown signal (SIGTERM or SIGINT).
///
/// # Panics
///
/// Panics if signal handlers cannot be installed; the process could not
/// otherwise respond to termination.
#[allow(clippy::expect_used)]
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("signal handler installation is critical for graceful shutdown");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("SIGTERM handler installation is critical for graceful shutdown")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, initiating shutdown");
        }
    }
}
