//! Execution DTOs

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::application::ports::{OrderAck, PositionAck, SimCloseResult};
use crate::domain::risk_management::{GuardMetrics, GuardVerdict};
use crate::domain::trading::{BrokerSnapshot, ExecutionMode, Position, TradingEnvironment};

fn default_source() -> String {
    "unknown".to_string()
}

/// Request to run a trade command through the pipeline.
///
/// `command` stays raw JSON so that a missing or unknown `type` becomes a
/// hard-block verdict instead of a request decoding failure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecuteTradeCommandRequest {
    /// Confirm or auto.
    #[serde(default)]
    pub mode: ExecutionMode,
    /// The proposed command.
    pub command: Value,
    /// Who proposed it (agent name, `ui`, ...).
    #[serde(default = "default_source")]
    pub source: String,
    /// Requested venue.
    #[serde(default)]
    pub environment: TradingEnvironment,
}

impl ExecuteTradeCommandRequest {
    /// Build a request.
    #[must_use]
    pub fn new(
        mode: ExecutionMode,
        command: impl Serialize,
        source: impl Into<String>,
        environment: TradingEnvironment,
    ) -> Self {
        Self {
            mode,
            command: serde_json::to_value(command).unwrap_or(Value::Null),
            source: source.into(),
            environment,
        }
    }
}

/// What the broker returned for a dispatched command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum BrokerResult {
    /// Live single-leg order.
    LiveOrder {
        /// Broker acknowledgment.
        order: OrderAck,
    },
    /// Live dual-sided order.
    LiveOrderPair {
        /// Buy leg.
        buy: OrderAck,
        /// Sell leg.
        sell: OrderAck,
    },
    /// Live close or modify.
    LivePosition {
        /// Broker acknowledgment.
        ack: PositionAck,
    },
    /// Simulated open (two positions for a dual-sided order).
    SimOpened {
        /// Opened positions.
        positions: Vec<Position>,
    },
    /// Simulated close.
    SimClosed {
        /// Close result.
        close: SimCloseResult,
    },
    /// Simulated modify.
    SimModified {
        /// Updated position.
        position: Position,
    },
}

/// Terminal outcome of one pipeline call. Built fresh per call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionResult {
    /// Requested mode.
    pub mode: ExecutionMode,
    /// Who proposed the command.
    pub source: String,
    /// Venue the command was evaluated against.
    pub environment: TradingEnvironment,
    /// Whether a broker call succeeded.
    pub executed: bool,
    /// Whether a human must confirm.
    pub requires_confirmation: bool,
    /// Guard's allow flag.
    pub allowed_by_guard: bool,
    /// Whether the command was hard-blocked.
    pub hard_blocked: bool,
    /// Block reasons.
    pub reasons: Vec<String>,
    /// Warnings.
    pub warnings: Vec<String>,
    /// Guard metrics.
    pub guard_metrics: GuardMetrics,
    /// Snapshot the guard evaluated.
    pub broker_snapshot: Option<BrokerSnapshot>,
    /// Broker response.
    pub broker_result: Option<BrokerResult>,
}

impl ExecutionResult {
    /// Result carrying the guard's verdict, not executed.
    #[must_use]
    pub fn from_verdict(
        request: &ExecuteTradeCommandRequest,
        environment: TradingEnvironment,
        verdict: GuardVerdict,
        snapshot: Option<BrokerSnapshot>,
    ) -> Self {
        Self {
            mode: request.mode,
            source: request.source.clone(),
            environment,
            executed: false,
            requires_confirmation: !verdict.allowed && !verdict.hard_blocked,
            allowed_by_guard: verdict.allowed,
            hard_blocked: verdict.hard_blocked,
            reasons: verdict.reasons,
            warnings: verdict.warnings,
            guard_metrics: verdict.metrics,
            broker_snapshot: snapshot,
            broker_result: None,
        }
    }

    /// Hard-blocked before any evaluation (kill switch, session failure).
    #[must_use]
    pub fn blocked(request: &ExecuteTradeCommandRequest, reason: impl Into<String>) -> Self {
        Self::from_verdict(
            request,
            request.environment,
            GuardVerdict::hard_block(reason),
            None,
        )
    }
}
