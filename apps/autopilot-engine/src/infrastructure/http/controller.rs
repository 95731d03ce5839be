//! HTTP Controller (Driver Adapter)
//!
//! Axum-based REST API that delegates to application use cases.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use chrono::Utc;

use crate::application::dto::ExecuteTradeCommandRequest;
use crate::application::ports::{JournalPort, LiveBrokerPort, SessionStatePort, SimBrokerPort};
use crate::application::services::BrokerStateStore;
use crate::application::use_cases::{ExecutionEngine, RiskPolicyUseCase};
use crate::domain::journal::JournalEntry;
use crate::domain::trading::BrokerSnapshot;

use super::request::{EvaluateCommandRequest, KillSwitchRequest, PolicyQuery};
use super::response::{ApiError, HealthResponse, SnapshotUpdatedResponse};

/// Application state shared across handlers.
pub struct AppState<S, L, M, J>
where
    S: SessionStatePort,
    L: LiveBrokerPort,
    M: SimBrokerPort,
    J: JournalPort,
{
    /// Execution pipeline.
    pub engine: Arc<ExecutionEngine<S, L, M>>,
    /// Daily policy composition.
    pub risk_policy: Arc<RiskPolicyUseCase<J>>,
    /// Live snapshot cell.
    pub store: Arc<BrokerStateStore>,
    /// Kill switch.
    pub session: Arc<S>,
    /// Trade journal.
    pub journal: Arc<J>,
    /// Application version.
    pub version: String,
}

impl<S, L, M, J> Clone for AppState<S, L, M, J>
where
    S: SessionStatePort,
    L: LiveBrokerPort,
    M: SimBrokerPort,
    J: JournalPort,
{
    fn clone(&self) -> Self {
        Self {
            engine: Arc::clone(&self.engine),
            risk_policy: Arc::clone(&self.risk_policy),
            store: Arc::clone(&self.store),
            session: Arc::clone(&self.session),
            journal: Arc::clone(&self.journal),
            version: self.version.clone(),
        }
    }
}

/// Create the HTTP router with all endpoints.
pub fn create_router<S, L, M, J>(state: AppState<S, L, M, J>) -> Router
where
    S: SessionStatePort + 'static,
    L: LiveBrokerPort + 'static,
    M: SimBrokerPort + 'static,
    J: JournalPort + 'static,
{
    Router::new()
        .route("/health", get(health_check))
        .route("/api/v1/trade-commands/execute", post(execute_trade_command))
        .route("/api/v1/trade-commands/evaluate", post(evaluate_trade_command))
        .route(
            "/api/v1/broker/snapshot",
            get(get_snapshot).put(update_snapshot),
        )
        .route("/api/v1/risk/policy", get(get_risk_policy))
        .route("/api/v1/kill-switch", post(set_kill_switch))
        .route("/api/v1/journal", post(record_journal_entry))
        .with_state(state)
}

/// Health check endpoint.
async fn health_check<S, L, M, J>(State(state): State<AppState<S, L, M, J>>) -> impl IntoResponse
where
    S: SessionStatePort,
    L: LiveBrokerPort,
    M: SimBrokerPort,
    J: JournalPort,
{
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: state.version.clone(),
        snapshot_version: state.store.version(),
    })
}

/// Run a command through the full pipeline.
async fn execute_trade_command<S, L, M, J>(
    State(state): State<AppState<S, L, M, J>>,
    Json(request): Json<ExecuteTradeCommandRequest>,
) -> impl IntoResponse
where
    S: SessionStatePort,
    L: LiveBrokerPort,
    M: SimBrokerPort,
    J: JournalPort,
{
    Json(state.engine.execute(request).await)
}

/// Guard-only preview.
async fn evaluate_trade_command<S, L, M, J>(
    State(state): State<AppState<S, L, M, J>>,
    Json(request): Json<EvaluateCommandRequest>,
) -> impl IntoResponse
where
    S: SessionStatePort,
    L: LiveBrokerPort,
    M: SimBrokerPort,
    J: JournalPort,
{
    let live = state.store.current();
    let snapshot = request.snapshot.as_ref().or(live.as_deref());
    Json(
        state
            .engine
            .evaluate_trade_command(snapshot, &request.command),
    )
}

/// Current live snapshot.
async fn get_snapshot<S, L, M, J>(
    State(state): State<AppState<S, L, M, J>>,
) -> Result<Json<BrokerSnapshot>, ApiError>
where
    S: SessionStatePort,
    L: LiveBrokerPort,
    M: SimBrokerPort,
    J: JournalPort,
{
    state
        .store
        .current()
        .map(|snapshot| Json((*snapshot).clone()))
        .ok_or_else(|| ApiError::not_found("no broker snapshot received yet"))
}

/// Replace the live snapshot (pushed by the broker bridge).
async fn update_snapshot<S, L, M, J>(
    State(state): State<AppState<S, L, M, J>>,
    Json(mut snapshot): Json<BrokerSnapshot>,
) -> impl IntoResponse
where
    S: SessionStatePort,
    L: LiveBrokerPort,
    M: SimBrokerPort,
    J: JournalPort,
{
    if snapshot.captured_at.is_none() {
        snapshot.captured_at = Some(Utc::now());
    }
    let version = state.store.update_snapshot(snapshot);
    Json(SnapshotUpdatedResponse { version })
}

/// Effective policy for the day. Also refreshes the engine's policy overlay.
async fn get_risk_policy<S, L, M, J>(
    State(state): State<AppState<S, L, M, J>>,
    Query(query): Query<PolicyQuery>,
) -> Result<impl IntoResponse, ApiError>
where
    S: SessionStatePort,
    L: LiveBrokerPort,
    M: SimBrokerPort,
    J: JournalPort,
{
    let date = query.date.unwrap_or_else(|| Utc::now().date_naive());
    let policy = state.risk_policy.execute(date, query.refresh).await?;
    state
        .engine
        .set_policy_overlay(Some(policy.effective_policy.clone()));
    Ok(Json(policy))
}

/// Set or clear the global kill switch.
async fn set_kill_switch<S, L, M, J>(
    State(state): State<AppState<S, L, M, J>>,
    Json(request): Json<KillSwitchRequest>,
) -> Result<impl IntoResponse, ApiError>
where
    S: SessionStatePort,
    L: LiveBrokerPort,
    M: SimBrokerPort,
    J: JournalPort,
{
    let session = state
        .session
        .set_trading_halted(request.halted, request.reason)
        .await?;
    Ok(Json(session))
}

/// Record a closed trade.
async fn record_journal_entry<S, L, M, J>(
    State(state): State<AppState<S, L, M, J>>,
    Json(entry): Json<JournalEntry>,
) -> Result<impl IntoResponse, ApiError>
where
    S: SessionStatePort,
    L: LiveBrokerPort,
    M: SimBrokerPort,
    J: JournalPort,
{
    let entry = state.journal.record(entry).await?;
    Ok((StatusCode::CREATED, Json(entry)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::dto::ExecutionResult;
    use crate::application::ports::SessionState;
    use crate::application::use_cases::ExecutionSettings;
    use crate::domain::desk_policy::DeskPolicyEngine;
    use crate::domain::risk_management::{GuardLimits, GuardVerdict};
    use crate::domain::tilt::TiltService;
    use crate::domain::trading::TradingEnvironment;
    use crate::infrastructure::broker::{
        HttpLiveBroker, InMemorySimBroker, LiveBrokerConfig, RetryConfig,
    };
    use crate::infrastructure::persistence::InMemoryJournal;
    use crate::infrastructure::session::InMemorySessionState;
    use axum::body::Body;
    use axum::http::Request;
    use http_body_util::BodyExt;
    use rust_decimal_macros::dec;
    use serde_json::{Value, json};
    use tower::ServiceExt;

    type TestState =
        AppState<InMemorySessionState, HttpLiveBroker, InMemorySimBroker, InMemoryJournal>;

    fn create_test_state() -> TestState {
        let session = Arc::new(InMemorySessionState::new(TradingEnvironment::Sim));
        // Never reached: the session routes to sim.
        let live = Arc::new(
            HttpLiveBroker::new(
                &LiveBrokerConfig::new("http://127.0.0.1:9", "test-token")
                    .with_retry(RetryConfig::none()),
            )
            .unwrap(),
        );
        let sim = Arc::new(InMemorySimBroker::default());
        let store = Arc::new(BrokerStateStore::new());
        let journal = Arc::new(InMemoryJournal::new());

        let engine = Arc::new(ExecutionEngine::new(
            Arc::clone(&session),
            live,
            sim,
            Arc::clone(&store),
            GuardLimits::default(),
            ExecutionSettings::default(),
        ));
        let risk_policy = Arc::new(RiskPolicyUseCase::new(
            Arc::clone(&journal),
            Arc::clone(&store),
            TiltService::default(),
            DeskPolicyEngine::default(),
        ));

        AppState {
            engine,
            risk_policy,
            store,
            session,
            journal,
            version: "1.0.0-test".to_string(),
        }
    }

    async fn send(
        app: Router,
        method: &str,
        uri: &str,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let builder = Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json");
        let request = match body {
            Some(body) => builder.body(Body::from(serde_json::to_vec(&body).unwrap())),
            None => builder.body(Body::empty()),
        }
        .unwrap();

        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    #[tokio::test]
    async fn health_check_returns_ok() {
        let app = create_router(create_test_state());
        let (status, body) = send(app, "GET", "/health", None).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["snapshotVersion"], 0);
    }

    #[tokio::test]
    async fn execute_auto_sim_opens_position() {
        let app = create_router(create_test_state());
        let request = json!({
            "mode": "auto",
            "source": "agent",
            "environment": "sim",
            "command": {
                "type": "open",
                "symbol": "eurusd",
                "side": "buy",
                "qty": 10,
                "price": 100,
                "slPrice": 99
            }
        });
        let (status, body) =
            send(app, "POST", "/api/v1/trade-commands/execute", Some(request)).await;

        assert_eq!(status, StatusCode::OK);
        let result: ExecutionResult = serde_json::from_value(body).unwrap();
        assert!(result.executed, "reasons: {:?}", result.reasons);
        assert_eq!(result.environment, TradingEnvironment::Sim);
    }

    #[tokio::test]
    async fn kill_switch_blocks_execution() {
        let state = create_test_state();
        let (status, body) = send(
            create_router(state.clone()),
            "POST",
            "/api/v1/kill-switch",
            Some(json!({"halted": true, "reason": "manual"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let session: SessionState = serde_json::from_value(body).unwrap();
        assert!(session.trading_halted);

        let request = json!({"mode": "auto", "command": {"type": "close", "positionId": "sim-1"}});
        let (_, body) = send(
            create_router(state),
            "POST",
            "/api/v1/trade-commands/execute",
            Some(request),
        )
        .await;
        assert_eq!(body["hardBlocked"], true);
        assert_eq!(body["reasons"][0], "GLOBAL_KILL_SWITCH_ACTIVE");
    }

    #[tokio::test]
    async fn snapshot_put_then_get() {
        let state = create_test_state();
        let (status, _) = send(
            create_router(state.clone()),
            "GET",
            "/api/v1/broker/snapshot",
            None,
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, body) = send(
            create_router(state.clone()),
            "PUT",
            "/api/v1/broker/snapshot",
            Some(json!({"equity": "10000", "balance": 10000, "openPositions": []})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["version"], 1);

        let (status, body) =
            send(create_router(state), "GET", "/api/v1/broker/snapshot", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["equity"], "10000");
    }

    #[tokio::test]
    async fn evaluate_uses_live_snapshot_when_omitted() {
        let state = create_test_state();
        let command = json!({
            "type": "open",
            "symbol": "EURUSD",
            "side": "BUY",
            "qty": 20,
            "price": 100,
            "slPrice": 90
        });

        let (_, body) = send(
            create_router(state.clone()),
            "POST",
            "/api/v1/trade-commands/evaluate",
            Some(json!({"command": command})),
        )
        .await;
        let verdict: GuardVerdict = serde_json::from_value(body).unwrap();
        assert!(verdict.hard_blocked);
        assert_eq!(verdict.reasons, vec!["NoBrokerSnapshot"]);

        state
            .store
            .update_snapshot(BrokerSnapshot::new(dec!(10000), dec!(10000)));
        let (_, body) = send(
            create_router(state),
            "POST",
            "/api/v1/trade-commands/evaluate",
            Some(json!({"command": command})),
        )
        .await;
        let verdict: GuardVerdict = serde_json::from_value(body).unwrap();
        assert!(!verdict.allowed);
        assert!(!verdict.hard_blocked);
        assert_eq!(verdict.reasons, vec!["SingleTradeRiskTooHigh"]);
    }

    #[tokio::test]
    async fn journal_and_policy_round_trip() {
        let state = create_test_state();
        let entry = json!({"createdAt": Utc::now(), "resultR": -1.0});
        for _ in 0..2 {
            let (status, _) = send(
                create_router(state.clone()),
                "POST",
                "/api/v1/journal",
                Some(entry.clone()),
            )
            .await;
            assert_eq!(status, StatusCode::CREATED);
        }

        let (status, body) = send(
            create_router(state),
            "GET",
            "/api/v1/risk/policy?refresh=true",
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["tilt"]["lossStreak"], 2);
        assert_eq!(body["tilt"]["defenseMode"], "caution");
        assert!(body["promptText"].as_str().unwrap().contains("Desk policy"));
    }

    #[tokio::test]
    async fn invalid_journal_entry_is_unprocessable() {
        let app = create_router(create_test_state());
        let (status, body) = send(
            app,
            "POST",
            "/api/v1/journal",
            Some(json!({"createdAt": Utc::now()})),
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["code"], "INVALID_JOURNAL_ENTRY");
    }
}
