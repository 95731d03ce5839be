//! Autopilot Pipeline Integration Tests
//!
//! End-to-end checks of the guard, the execution engine and the HTTP API
//! using JSON fixtures for broker snapshots and trade commands:
//! - Guard boundaries (drawdown, single-trade risk, dual-sided risk,
//!   stop widening, per-symbol cap)
//! - Verdict purity and hard-block consistency
//! - Kill switch and confirm-mode gating through the engine
//! - Live dual-sided routing against a mocked gateway
//! - Tilt escalation
//! - The REST surface over the in-memory adapters

#![allow(clippy::expect_used, clippy::unwrap_used, clippy::unreadable_literal)]

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use autopilot_engine::application::dto::{BrokerResult, ExecuteTradeCommandRequest};
use autopilot_engine::application::services::BrokerStateStore;
use autopilot_engine::application::use_cases::{
    ExecutionEngine, ExecutionSettings, RiskPolicyUseCase,
};
use autopilot_engine::domain::desk_policy::DeskPolicyEngine;
use autopilot_engine::domain::journal::JournalEntry;
use autopilot_engine::domain::risk_management::{ExecutionGuard, GuardLimits, ReasonCode};
use autopilot_engine::domain::tilt::{DefenseMode, RiskState, TiltService};
use autopilot_engine::domain::trading::{
    BrokerSnapshot, ExecutionMode, OpenCommand, OrderSide, TradeCommand, TradingEnvironment,
};
use autopilot_engine::infrastructure::InMemorySessionState;
use autopilot_engine::infrastructure::broker::{
    HttpLiveBroker, InMemorySimBroker, LiveBrokerConfig, RetryConfig,
};
use autopilot_engine::infrastructure::http::{AppState, create_router};
use autopilot_engine::infrastructure::persistence::InMemoryJournal;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use chrono::{TimeZone, Utc};
use http_body_util::BodyExt;
use proptest::prelude::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde_json::{Value, json};
use tokio_test::assert_ok;
use tower::ServiceExt;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

type TestEngine = ExecutionEngine<InMemorySessionState, HttpLiveBroker, InMemorySimBroker>;

/// Load a JSON fixture from the fixtures directory.
fn load_fixture(name: &str) -> Value {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests/fixtures");
    path.push(name);

    let content = std::fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("Failed to read fixture {}: {e}", path.display()));

    serde_json::from_str(&content)
        .unwrap_or_else(|e| panic!("Failed to parse fixture {}: {e}", path.display()))
}

fn load_snapshot(name: &str) -> BrokerSnapshot {
    serde_json::from_value(load_fixture(name)).expect("fixture is a broker snapshot")
}

fn guard() -> ExecutionGuard {
    ExecutionGuard::new(GuardLimits::default())
}

fn open_buy(symbol: &str, qty: Decimal, price: Decimal, sl: Decimal) -> TradeCommand {
    TradeCommand::Open(OpenCommand::new(symbol, OrderSide::Buy, qty, price, sl))
}

fn live_broker(base_url: &str) -> Arc<HttpLiveBroker> {
    let config = LiveBrokerConfig::new(base_url, "integration-token").with_retry(RetryConfig {
        max_attempts: 2,
        initial_backoff: Duration::from_millis(5),
        max_backoff: Duration::from_millis(10),
        multiplier: 2.0,
        jitter: false,
    });
    Arc::new(HttpLiveBroker::new(&config).unwrap())
}

fn engine(
    session_environment: TradingEnvironment,
    live_url: &str,
    settings: ExecutionSettings,
) -> (Arc<TestEngine>, Arc<InMemorySessionState>, Arc<BrokerStateStore>) {
    let session = Arc::new(InMemorySessionState::new(session_environment));
    let store = Arc::new(BrokerStateStore::new());
    let engine = Arc::new(ExecutionEngine::new(
        Arc::clone(&session),
        live_broker(live_url),
        Arc::new(InMemorySimBroker::default()),
        Arc::clone(&store),
        GuardLimits::default(),
        settings,
    ));
    (engine, session, store)
}

// ============================================
// Guard Boundaries
// ============================================

#[test]
fn test_drawdown_boundary_blocks_at_four_percent() {
    let command = open_buy("XAUUSD", dec!(1), dec!(100), dec!(99));

    let at_limit = BrokerSnapshot::new(dec!(10000), dec!(10000)).with_daily_pnl(dec!(-400));
    let verdict = guard().evaluate(Some(&at_limit), &command);
    assert_eq!(verdict.metrics.daily_drawdown_percent, Some(dec!(-4.0)));
    assert!(!verdict.allowed);
    assert!(
        verdict
            .reasons
            .contains(&ReasonCode::DailyDrawdownLimitExceeded.to_string())
    );

    let inside = BrokerSnapshot::new(dec!(10000), dec!(10000)).with_daily_pnl(dec!(-399.99));
    let verdict = guard().evaluate(Some(&inside), &command);
    assert!(
        !verdict
            .reasons
            .contains(&ReasonCode::DailyDrawdownLimitExceeded.to_string())
    );
    assert!(verdict.allowed);
}

#[test]
fn test_small_risk_is_allowed_without_warning() {
    let snapshot = load_snapshot("snapshot_flat_account.json");
    let verdict = guard().evaluate_raw(
        Some(&snapshot),
        &load_fixture("command_open_buy_small_risk.json"),
    );

    assert!(verdict.allowed);
    assert_eq!(verdict.metrics.risk_value, Some(dec!(10)));
    assert_eq!(verdict.metrics.risk_percent, Some(dec!(0.1)));
    assert!(verdict.warnings.is_empty());
}

#[test]
fn test_large_risk_is_blocked() {
    let snapshot = load_snapshot("snapshot_flat_account.json");
    let verdict = guard().evaluate(
        Some(&snapshot),
        &open_buy("XAUUSD", dec!(20), dec!(100), dec!(90)),
    );

    assert!(!verdict.allowed);
    assert!(!verdict.hard_blocked);
    assert_eq!(verdict.metrics.risk_value, Some(dec!(200)));
    assert_eq!(verdict.metrics.risk_percent, Some(dec!(2)));
    assert_eq!(
        verdict.reasons,
        vec![ReasonCode::SingleTradeRiskTooHigh.to_string()]
    );
}

#[test]
fn test_both_sides_counts_only_protective_leg() {
    let snapshot = load_snapshot("snapshot_flat_account.json");
    let verdict = guard().evaluate_raw(Some(&snapshot), &load_fixture("command_open_both.json"));

    assert!(verdict.allowed);
    assert_eq!(verdict.metrics.new_positions, Some(2));
    assert_eq!(verdict.metrics.risk_value, Some(dec!(50)));
    assert_eq!(verdict.metrics.risk_percent, Some(dec!(0.5)));
}

#[test]
fn test_long_stop_cannot_be_widened() {
    let snapshot = load_snapshot("snapshot_long_with_stop.json");

    let widen = json!({"type": "modify", "positionId": "pos-long", "slPrice": 90});
    let verdict = guard().evaluate_raw(Some(&snapshot), &widen);
    assert!(!verdict.allowed);
    assert_eq!(
        verdict.reasons,
        vec![ReasonCode::CannotWidenStopLossForLong.to_string()]
    );
    assert_eq!(verdict.metrics.current_stop_loss, Some(dec!(95)));

    let tighten = json!({"type": "modify", "positionId": "pos-long", "slPrice": "97"});
    let verdict = guard().evaluate_raw(Some(&snapshot), &tighten);
    assert!(verdict.allowed);
}

#[test]
fn test_per_symbol_cap_counts_normalized_symbols() {
    let snapshot = load_snapshot("snapshot_three_eurusd.json");
    let command = json!({
        "type": "open",
        "symbol": "eurusd",
        "side": "buy",
        "qty": 1,
        "price": 1.1,
        "slPrice": 1.099
    });

    let verdict = guard().evaluate_raw(Some(&snapshot), &command);
    assert_eq!(verdict.metrics.symbol_positions, Some(3));
    assert!(!verdict.allowed);
    assert!(
        verdict
            .reasons
            .contains(&ReasonCode::MaxPositionsPerSymbolExceeded.to_string())
    );

    let other_symbol = json!({
        "type": "open",
        "symbol": "GBPUSD",
        "side": "SELL",
        "qty": 1,
        "price": 1.25,
        "slPrice": 1.251
    });
    assert!(guard().evaluate_raw(Some(&snapshot), &other_symbol).allowed);
}

#[test]
fn test_malformed_commands_are_hard_blocked() {
    let snapshot = load_snapshot("snapshot_flat_account.json");

    let cases = [
        (json!({"symbol": "EURUSD"}), ReasonCode::MissingCommandType),
        (json!({"type": "hedge"}), ReasonCode::UnknownCommandType),
        (json!({"type": "close"}), ReasonCode::InvalidCommandPayload),
    ];
    for (command, reason) in cases {
        let verdict = guard().evaluate_raw(Some(&snapshot), &command);
        assert!(verdict.hard_blocked, "{command}");
        assert!(!verdict.allowed);
        assert_eq!(verdict.reasons, vec![reason.to_string()]);
    }

    let verdict = guard().evaluate_raw(None, &load_fixture("command_open_both.json"));
    assert_eq!(
        verdict.reasons,
        vec![ReasonCode::NoBrokerSnapshot.to_string()]
    );
}

// ============================================
// Verdict Properties
// ============================================

fn command_strategy() -> impl Strategy<Value = Value> {
    (
        prop_oneof![
            Just(Some("open")),
            Just(Some("close")),
            Just(Some("modify")),
            Just(Some("OPEN")),
            Just(Some("noop")),
            Just(None),
        ],
        prop_oneof![Just("BUY"), Just("SELL"), Just("BOTH")],
        1u32..500,
        1u32..20_000,
        1u32..20_000,
    )
        .prop_map(|(kind, side, qty, price, sl)| {
            let mut command = json!({
                "symbol": "XAUUSD",
                "side": side,
                "qty": qty,
                "price": Decimal::new(i64::from(price), 2),
                "slPrice": Decimal::new(i64::from(sl), 2),
                "positionId": "pos-long"
            });
            if let Some(kind) = kind {
                command["type"] = json!(kind);
            }
            command
        })
}

fn snapshot_strategy() -> impl Strategy<Value = Option<BrokerSnapshot>> {
    prop_oneof![
        Just(None),
        Just(Some(load_snapshot("snapshot_flat_account.json"))),
        Just(Some(load_snapshot("snapshot_long_with_stop.json"))),
        Just(Some(load_snapshot("snapshot_three_eurusd.json"))),
        (-800i64..800).prop_map(|pnl| Some(
            BrokerSnapshot::new(dec!(10000), dec!(10000)).with_daily_pnl(Decimal::from(pnl))
        )),
    ]
}

proptest! {
    #[test]
    fn prop_evaluation_is_pure(snapshot in snapshot_strategy(), command in command_strategy()) {
        let guard = guard();
        let first = guard.evaluate_raw(snapshot.as_ref(), &command);
        let second = guard.evaluate_raw(snapshot.as_ref(), &command);
        prop_assert_eq!(first, second);
    }

    #[test]
    fn prop_hard_block_implies_not_allowed(
        snapshot in snapshot_strategy(),
        command in command_strategy(),
    ) {
        let verdict = guard().evaluate_raw(snapshot.as_ref(), &command);
        prop_assert!(!verdict.hard_blocked || !verdict.allowed);
        prop_assert!(verdict.allowed || !verdict.reasons.is_empty());
    }
}

// ============================================
// Engine Gating
// ============================================

#[tokio::test]
async fn test_kill_switch_dominates_every_command_and_mode() {
    let (engine, session, store) = engine(
        TradingEnvironment::Live,
        "http://127.0.0.1:9",
        ExecutionSettings {
            auto_execute_live: true,
            enforce_desk_policy: false,
        },
    );
    store.update_snapshot(load_snapshot("snapshot_flat_account.json"));
    session.halt("desk closed");

    let commands = [
        load_fixture("command_open_buy_small_risk.json"),
        load_fixture("command_open_both.json"),
        json!({"type": "close", "positionId": "p-1"}),
        json!({"type": "unknown"}),
    ];
    for command in commands {
        for mode in [ExecutionMode::Confirm, ExecutionMode::Auto] {
            for environment in [TradingEnvironment::Sim, TradingEnvironment::Live] {
                let request =
                    ExecuteTradeCommandRequest::new(mode, &command, "agent", environment);
                let result = engine.execute(request).await;
                assert!(!result.executed);
                assert!(result.hard_blocked);
                assert_eq!(
                    result.reasons,
                    vec![ReasonCode::GlobalKillSwitchActive.to_string()]
                );
            }
        }
    }
}

#[tokio::test]
async fn test_confirm_mode_never_executes() {
    let (engine, _session, store) = engine(
        TradingEnvironment::Sim,
        "http://127.0.0.1:9",
        ExecutionSettings::default(),
    );
    store.update_snapshot(load_snapshot("snapshot_flat_account.json"));

    let commands = [
        load_fixture("command_open_buy_small_risk.json"),
        load_fixture("command_open_both.json"),
        json!({"type": "open", "symbol": "XAUUSD", "side": "BUY", "qty": 20, "price": 100, "slPrice": 90}),
        json!({"type": "close", "positionId": "sim-1"}),
        json!({"type": "modify"}),
    ];
    for command in commands {
        for environment in [TradingEnvironment::Sim, TradingEnvironment::Live] {
            let request =
                ExecuteTradeCommandRequest::new(ExecutionMode::Confirm, &command, "ui", environment);
            let result = engine.execute(request).await;
            assert!(!result.executed, "{command}");
            assert!(result.broker_result.is_none());
        }
    }
}

#[tokio::test]
async fn test_live_both_sides_places_two_legs() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/orders"))
        .and(body_partial_json(json!({"side": "LONG", "clientOrderId": "pair-7-buy"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "orderId": "o-buy",
            "clientOrderId": "pair-7-buy",
            "positionId": "pos-buy",
            "status": "filled"
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/orders"))
        .and(body_partial_json(json!({"side": "SHORT", "clientOrderId": "pair-7-sell"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "orderId": "o-sell",
            "clientOrderId": "pair-7-sell",
            "positionId": "pos-sell",
            "status": "filled"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let (engine, _session, store) = engine(
        TradingEnvironment::Live,
        &server.uri(),
        ExecutionSettings {
            auto_execute_live: true,
            enforce_desk_policy: false,
        },
    );
    store.update_snapshot(load_snapshot("snapshot_flat_account.json"));

    let mut command = load_fixture("command_open_both.json");
    command["clientOrderId"] = json!("pair-7");
    let request = ExecuteTradeCommandRequest::new(
        ExecutionMode::Auto,
        &command,
        "agent",
        TradingEnvironment::Live,
    );
    let result = engine.execute(request).await;

    assert!(result.executed, "{:?}", result.reasons);
    assert!(result.allowed_by_guard);
    let Some(BrokerResult::LiveOrderPair { buy, sell }) = result.broker_result else {
        panic!("expected a live order pair, got {:?}", result.broker_result);
    };
    assert_eq!(buy.order_id, "o-buy");
    assert_eq!(sell.order_id, "o-sell");
}

#[tokio::test]
async fn test_live_auto_without_flag_needs_confirmation() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/orders"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let (engine, _session, store) = engine(
        TradingEnvironment::Live,
        &server.uri(),
        ExecutionSettings::default(),
    );
    store.update_snapshot(load_snapshot("snapshot_flat_account.json"));

    let request = ExecuteTradeCommandRequest::new(
        ExecutionMode::Auto,
        load_fixture("command_open_buy_small_risk.json"),
        "agent",
        TradingEnvironment::Live,
    );
    let result = engine.execute(request).await;

    assert!(!result.executed);
    assert!(result.requires_confirmation);
    assert!(
        result
            .reasons
            .contains(&ReasonCode::AutoExecuteDisabledEnvVar.to_string())
    );
}

#[tokio::test]
async fn test_concurrent_evaluations_see_whole_snapshots() {
    let (engine, _session, store) = engine(
        TradingEnvironment::Live,
        "http://127.0.0.1:9",
        ExecutionSettings::default(),
    );
    let flat = load_snapshot("snapshot_flat_account.json");
    let crowded = load_snapshot("snapshot_three_eurusd.json");
    store.update_snapshot(flat.clone());

    let command = load_fixture("command_open_buy_small_risk.json");
    let tasks = (0..32).map(|i| {
        let engine = Arc::clone(&engine);
        let store = Arc::clone(&store);
        let command = command.clone();
        let next = if i % 2 == 0 { crowded.clone() } else { flat.clone() };
        tokio::spawn(async move {
            store.update_snapshot(next);
            let current = store.current();
            engine.evaluate_trade_command(current.as_deref(), &command)
        })
    });

    for verdict in futures::future::join_all(tasks).await {
        let verdict = assert_ok!(verdict);
        let open = verdict.metrics.open_positions.unwrap();
        assert!(open == 0 || open == 3, "torn snapshot: {open} positions");
    }
    assert_eq!(store.version(), 33);
}

// ============================================
// Tilt Escalation
// ============================================

#[test]
fn test_tilt_escalates_monotonically_with_loss_streak() {
    let service = TiltService::default();
    let expected = [
        (0, RiskState::Normal),
        (1, RiskState::Warming),
        (2, RiskState::Hot),
        (4, RiskState::TiltRisk),
        (5, RiskState::Lockdown),
    ];

    let mut previous = DefenseMode::Normal;
    for (streak, state) in expected {
        let entries: Vec<JournalEntry> = (0..streak)
            .map(|i| {
                let at = Utc.with_ymd_and_hms(2026, 3, 2, 9, i, 0).unwrap();
                JournalEntry::with_result(at, dec!(-0.5))
            })
            .collect();
        let tilt = service.evaluate(&entries, None);

        assert_eq!(tilt.loss_streak, streak, "streak {streak}");
        assert_eq!(tilt.risk_state, state, "streak {streak}");
        assert!(tilt.defense_mode >= previous, "streak {streak}");
        previous = tilt.defense_mode;
    }
    assert_eq!(previous, DefenseMode::Lockdown);
}

// ============================================
// HTTP API
// ============================================

fn create_app() -> axum::Router {
    let session = Arc::new(InMemorySessionState::new(TradingEnvironment::Sim));
    let store = Arc::new(BrokerStateStore::new());
    let journal = Arc::new(InMemoryJournal::new());
    let engine = Arc::new(ExecutionEngine::new(
        Arc::clone(&session),
        live_broker("http://127.0.0.1:9"),
        Arc::new(InMemorySimBroker::default()),
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

    create_router(AppState {
        engine,
        risk_policy,
        store,
        session,
        journal,
        version: "integration".to_string(),
    })
}

async fn send(app: &axum::Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json");
    let request = match body {
        Some(body) => builder.body(Body::from(serde_json::to_vec(&body).unwrap())),
        None => builder.body(Body::empty()),
    }
    .unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
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
async fn test_http_evaluate_then_kill_switch() {
    let app = create_app();

    let (status, _) = send(
        &app,
        "PUT",
        "/api/v1/broker/snapshot",
        Some(load_fixture("snapshot_flat_account.json")),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, verdict) = send(
        &app,
        "POST",
        "/api/v1/trade-commands/evaluate",
        Some(json!({"command": load_fixture("command_open_buy_small_risk.json")})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(verdict["allowed"], json!(true));
    let risk_value: Decimal = verdict["metrics"]["riskValue"]
        .as_str()
        .unwrap()
        .parse()
        .unwrap();
    assert_eq!(risk_value, dec!(10));

    let (status, _) = send(
        &app,
        "POST",
        "/api/v1/kill-switch",
        Some(json!({"halted": true, "reason": "news event"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, result) = send(
        &app,
        "POST",
        "/api/v1/trade-commands/execute",
        Some(json!({
            "mode": "auto",
            "environment": "sim",
            "command": load_fixture("command_open_buy_small_risk.json")
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(result["executed"], json!(false));
    assert_eq!(result["hardBlocked"], json!(true));
    assert_eq!(result["reasons"], json!(["GLOBAL_KILL_SWITCH_ACTIVE"]));
}

#[tokio::test]
async fn test_http_losing_day_locks_policy_down() {
    let app = create_app();
    let today = Utc::now().date_naive();

    for minute in 0..5 {
        let created_at = today.and_hms_opt(0, minute, 0).unwrap().and_utc();
        let (status, _) = send(
            &app,
            "POST",
            "/api/v1/journal",
            Some(json!({"createdAt": created_at, "resultR": "-1", "playbook": "breakout"})),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (status, policy) = send(
        &app,
        "GET",
        &format!("/api/v1/risk/policy?date={today}&refresh=true"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(policy["tilt"]["riskState"], json!("lockdown"));
    assert_eq!(policy["tilt"]["defenseMode"], json!("lockdown"));
    assert_eq!(policy["effectivePolicy"]["maxRiskPerTrade"], json!("0"));
}
