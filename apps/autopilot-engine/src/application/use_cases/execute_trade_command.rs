//! Execute Trade Command Use Case
//!
//! Runs a proposed command through kill switch, guard and mode gating, then
//! routes it to the simulated or live broker.

use std::sync::Arc;
use std::time::Instant;

use parking_lot::RwLock;
use serde_json::Value;

use crate::application::dto::{BrokerResult, ExecuteTradeCommandRequest, ExecutionResult};
use crate::application::ports::{
    BrokerError, LiveBrokerPort, ModifyPositionRequest, OpenSimPositionRequest, OrderAck,
    PlaceOrderRequest, SessionStatePort, SimBrokerPort,
};
use crate::application::services::BrokerStateStore;
use crate::domain::desk_policy::DeskPolicy;
use crate::domain::risk_management::{ExecutionGuard, GuardLimits, GuardVerdict, ReasonCode};
use crate::domain::shared::ClientOrderId;
use crate::domain::trading::{
    BrokerSnapshot, ExecutionMode, OpenCommand, OrderSide, Position, PositionSide, TradeCommand,
    TradingEnvironment,
};
use crate::observability::{
    record_broker_error, record_broker_latency, record_guard_block, record_trade_command,
};

/// Switches that change how far the engine may go on its own.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExecutionSettings {
    /// Allow `auto` mode to reach the live broker.
    pub auto_execute_live: bool,
    /// Cap single-trade risk by the desk policy overlay.
    pub enforce_desk_policy: bool,
}

/// Failure while dispatching to a broker.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ExecutionError {
    /// A single broker call failed.
    #[error(transparent)]
    Broker(#[from] BrokerError),

    /// The command lacks a field the broker needs.
    #[error("{message}")]
    InvalidCommand {
        /// Error details.
        message: String,
    },

    /// One leg of a dual-sided order failed after the other was placed.
    #[error("leg {failed_side} failed: {message}; compensation: {compensation}")]
    PartialFill {
        /// The leg that failed.
        failed_side: OrderSide,
        /// Why it failed.
        message: String,
        /// What happened to the surviving leg.
        compensation: String,
    },

    /// Both legs of a dual-sided order failed.
    #[error("both legs failed: BUY: {buy}; SELL: {sell}")]
    BothLegsFailed {
        /// Buy leg error.
        buy: String,
        /// Sell leg error.
        sell: String,
    },
}

/// Use case for executing trade commands.
pub struct ExecutionEngine<S, L, M>
where
    S: SessionStatePort,
    L: LiveBrokerPort,
    M: SimBrokerPort,
{
    session: Arc<S>,
    live_broker: Arc<L>,
    sim_broker: Arc<M>,
    store: Arc<BrokerStateStore>,
    limits: GuardLimits,
    settings: ExecutionSettings,
    policy_overlay: RwLock<Option<DeskPolicy>>,
}

impl<S, L, M> ExecutionEngine<S, L, M>
where
    S: SessionStatePort,
    L: LiveBrokerPort,
    M: SimBrokerPort,
{
    /// Create a new `ExecutionEngine`.
    pub fn new(
        session: Arc<S>,
        live_broker: Arc<L>,
        sim_broker: Arc<M>,
        store: Arc<BrokerStateStore>,
        limits: GuardLimits,
        settings: ExecutionSettings,
    ) -> Self {
        Self {
            session,
            live_broker,
            sim_broker,
            store,
            limits,
            settings,
            policy_overlay: RwLock::new(None),
        }
    }

    /// Engine switches.
    #[must_use]
    pub const fn settings(&self) -> ExecutionSettings {
        self.settings
    }

    /// Replace the desk policy used when enforcement is on.
    pub fn set_policy_overlay(&self, policy: Option<DeskPolicy>) {
        *self.policy_overlay.write() = policy;
    }

    /// The guard the next call will use.
    #[must_use]
    pub fn guard(&self) -> ExecutionGuard {
        if !self.settings.enforce_desk_policy {
            return ExecutionGuard::new(self.limits.clone());
        }
        match self.policy_overlay.read().as_ref() {
            Some(policy) => ExecutionGuard::new(self.limits.tightened_by(policy)),
            None => ExecutionGuard::new(self.limits.clone()),
        }
    }

    /// Evaluate a raw command without touching any broker.
    #[must_use]
    pub fn evaluate_trade_command(
        &self,
        snapshot: Option<&BrokerSnapshot>,
        command: &Value,
    ) -> GuardVerdict {
        self.guard().evaluate_raw(snapshot, command)
    }

    /// Execute the use case. Never fails: every expected failure is encoded
    /// in the result.
    pub async fn execute(&self, request: ExecuteTradeCommandRequest) -> ExecutionResult {
        let command_type = command_type_label(&request.command);

        // 1. Kill switch, read fresh every call
        let session = match self.session.get_session_state().await {
            Ok(session) => session,
            Err(e) => {
                tracing::error!(error = %e, source = %request.source, "Session state unavailable");
                let reason = ReasonCode::SessionStateUnavailable.with_detail(&e);
                return finish(&command_type, ExecutionResult::blocked(&request, reason));
            }
        };
        if session.trading_halted {
            tracing::warn!(
                source = %request.source,
                halt_reason = session.halt_reason.as_deref().unwrap_or(""),
                "Kill switch active, command refused"
            );
            let result = ExecutionResult::blocked(&request, ReasonCode::GlobalKillSwitchActive);
            return finish(&command_type, result);
        }

        // 2. Environment and snapshot
        let environment = if request.environment.is_sim() || session.execution_mode.is_sim() {
            TradingEnvironment::Sim
        } else {
            TradingEnvironment::Live
        };
        let (snapshot, snapshot_warning) = self.load_snapshot(environment).await;

        // 3. Guard
        let parsed = TradeCommand::parse(request.command.clone());
        let mut verdict = self
            .guard()
            .evaluate_parsed(snapshot.as_ref(), parsed.as_ref());
        if let Some(warning) = snapshot_warning {
            verdict.warn(warning);
        }

        let mut result = ExecutionResult::from_verdict(&request, environment, verdict, snapshot);

        // 4. Hard block short-circuit
        if result.hard_blocked {
            return finish(&command_type, result);
        }

        // 5. Mode gating
        match request.mode {
            ExecutionMode::Confirm => return finish(&command_type, result),
            ExecutionMode::Auto => {
                if environment == TradingEnvironment::Live && !self.settings.auto_execute_live {
                    result
                        .reasons
                        .push(ReasonCode::AutoExecuteDisabledEnvVar.to_string());
                    result.requires_confirmation = true;
                    return finish(&command_type, result);
                }
                if !result.allowed_by_guard {
                    result.requires_confirmation = true;
                    return finish(&command_type, result);
                }
            }
        }

        // Guard allowed, so the command parsed.
        let Ok(command) = parsed else {
            return finish(&command_type, result);
        };

        // 6. Dispatch
        let venue = environment.as_str();
        let started = Instant::now();
        let dispatched = match environment {
            TradingEnvironment::Sim => self.dispatch_sim(&command).await,
            TradingEnvironment::Live => self.dispatch_live(&command).await,
        };
        record_broker_latency(venue, started.elapsed().as_secs_f64());

        match dispatched {
            Ok(broker_result) => {
                tracing::info!(
                    command_type = %command_type,
                    environment = venue,
                    source = %result.source,
                    "Trade command executed"
                );
                result.executed = true;
                result.requires_confirmation = false;
                result.broker_result = Some(broker_result);
            }
            Err(e) => {
                tracing::error!(
                    command_type = %command_type,
                    environment = venue,
                    error = %e,
                    "Trade command dispatch failed"
                );
                record_broker_error(venue);
                result.reasons.push(ReasonCode::ExecutionError.with_detail(&e));
            }
        }

        finish(&command_type, result)
    }

    async fn load_snapshot(
        &self,
        environment: TradingEnvironment,
    ) -> (Option<BrokerSnapshot>, Option<String>) {
        match environment {
            TradingEnvironment::Live => (self.store.current().map(|s| (*s).clone()), None),
            TradingEnvironment::Sim => {
                let fetched = tokio::try_join!(
                    self.sim_broker.get_sim_account(),
                    self.sim_broker.get_sim_positions()
                );
                match fetched {
                    Ok((account, positions)) => (Some(account.into_snapshot(positions)), None),
                    Err(e) => {
                        tracing::warn!(error = %e, "Sim snapshot unavailable");
                        record_broker_error("sim");
                        (None, Some(ReasonCode::SimSnapshotUnavailable.with_detail(&e)))
                    }
                }
            }
        }
    }

    async fn dispatch_sim(&self, command: &TradeCommand) -> Result<BrokerResult, ExecutionError> {
        match command {
            TradeCommand::Open(open) => {
                let size = open.qty.ok_or_else(|| ExecutionError::InvalidCommand {
                    message: "open command has no qty".to_string(),
                })?;
                let entry_price = open.price.ok_or_else(|| ExecutionError::InvalidCommand {
                    message: "sim open requires a price".to_string(),
                })?;

                let mut positions: Vec<Position> = Vec::with_capacity(open.new_positions());
                for side in leg_sides(open.side) {
                    let opened = self
                        .sim_broker
                        .open_sim_position(OpenSimPositionRequest {
                            symbol: open.symbol.clone(),
                            side,
                            size,
                            entry_price,
                            stop_loss: open.sl_price,
                            take_profit: open.tp_price,
                        })
                        .await;
                    match opened {
                        Ok(position) => positions.push(position),
                        Err(e) => {
                            let Some(survivor) = positions.first() else {
                                return Err(e.into());
                            };
                            return Err(ExecutionError::PartialFill {
                                failed_side: side.order_side(),
                                message: e.to_string(),
                                compensation: self.unwind_sim(survivor).await,
                            });
                        }
                    }
                }
                Ok(BrokerResult::SimOpened { positions })
            }
            TradeCommand::Close(close) => {
                let close = self
                    .sim_broker
                    .close_sim_position(&close.position_id, None)
                    .await?;
                Ok(BrokerResult::SimClosed { close })
            }
            TradeCommand::Modify(modify) => {
                let position = self
                    .sim_broker
                    .modify_sim_position(&modify.position_id, modify.sl_price, modify.tp_price)
                    .await?;
                Ok(BrokerResult::SimModified { position })
            }
        }
    }

    async fn dispatch_live(&self, command: &TradeCommand) -> Result<BrokerResult, ExecutionError> {
        match command {
            TradeCommand::Open(open) => {
                let base_id = open
                    .client_order_id
                    .clone()
                    .unwrap_or_else(ClientOrderId::generate);
                match open.side.position_side() {
                    Some(side) => {
                        let request = PlaceOrderRequest::leg(open, side, base_id);
                        let order = self.live_broker.place_order(request).await?;
                        Ok(BrokerResult::LiveOrder { order })
                    }
                    None => self.place_both_legs(open, &base_id).await,
                }
            }
            TradeCommand::Close(close) => {
                let ack = self
                    .live_broker
                    .close_position(&close.position_id, close.qty)
                    .await?;
                Ok(BrokerResult::LivePosition { ack })
            }
            TradeCommand::Modify(modify) => {
                let ack = self
                    .live_broker
                    .modify_position(&modify.position_id, ModifyPositionRequest::from(modify))
                    .await?;
                Ok(BrokerResult::LivePosition { ack })
            }
        }
    }

    /// Place BUY and SELL concurrently and wait for both. A lone survivor is
    /// closed again so the account never holds half a pair.
    async fn place_both_legs(
        &self,
        open: &OpenCommand,
        base_id: &ClientOrderId,
    ) -> Result<BrokerResult, ExecutionError> {
        let buy = PlaceOrderRequest::leg(open, PositionSide::Long, base_id.leg("buy"));
        let sell = PlaceOrderRequest::leg(open, PositionSide::Short, base_id.leg("sell"));

        let (buy, sell) = tokio::join!(
            self.live_broker.place_order(buy),
            self.live_broker.place_order(sell)
        );

        match (buy, sell) {
            (Ok(buy), Ok(sell)) => Ok(BrokerResult::LiveOrderPair { buy, sell }),
            (Ok(buy), Err(e)) => Err(ExecutionError::PartialFill {
                failed_side: OrderSide::Sell,
                message: e.to_string(),
                compensation: self.unwind(&buy).await,
            }),
            (Err(e), Ok(sell)) => Err(ExecutionError::PartialFill {
                failed_side: OrderSide::Buy,
                message: e.to_string(),
                compensation: self.unwind(&sell).await,
            }),
            (Err(buy), Err(sell)) => Err(ExecutionError::BothLegsFailed {
                buy: buy.to_string(),
                sell: sell.to_string(),
            }),
        }
    }

    async fn unwind_sim(&self, survivor: &Position) -> String {
        match self.sim_broker.close_sim_position(&survivor.id, None).await {
            Ok(_) => {
                tracing::warn!(position_id = %survivor.id, "Closed surviving sim leg of failed pair");
                format!("closed {}", survivor.id)
            }
            Err(e) => {
                tracing::error!(
                    position_id = %survivor.id,
                    error = %e,
                    "Could not close surviving sim leg"
                );
                record_broker_error("sim");
                format!("failed to close {}: {e}", survivor.id)
            }
        }
    }

    async fn unwind(&self, survivor: &OrderAck) -> String {
        let target = survivor.unwind_target();
        match self.live_broker.close_position(&target, None).await {
            Ok(_) => {
                tracing::warn!(position_id = %target, "Closed surviving leg of failed pair");
                format!("closed {target}")
            }
            Err(e) => {
                tracing::error!(
                    position_id = %target,
                    error = %e,
                    "Could not close surviving leg; manual intervention required"
                );
                record_broker_error("live");
                format!("failed to close {target}: {e}")
            }
        }
    }
}

fn leg_sides(side: OrderSide) -> Vec<PositionSide> {
    match side.position_side() {
        Some(side) => vec![side],
        None => vec![PositionSide::Long, PositionSide::Short],
    }
}

fn command_type_label(command: &Value) -> String {
    command
        .get("type")
        .and_then(Value::as_str)
        .map(str::to_ascii_lowercase)
        .filter(|t| matches!(t.as_str(), "open" | "close" | "modify"))
        .unwrap_or_else(|| "invalid".to_string())
}

fn outcome_label(result: &ExecutionResult) -> &'static str {
    if result.executed {
        "executed"
    } else if result.hard_blocked {
        "hard_blocked"
    } else if result.broker_result.is_none()
        && result
            .reasons
            .iter()
            .any(|r| r.starts_with(ReasonCode::ExecutionError.as_str()))
    {
        "failed"
    } else if result.requires_confirmation {
        "needs_confirmation"
    } else {
        "preview"
    }
}

fn finish(command_type: &str, result: ExecutionResult) -> ExecutionResult {
    let outcome = outcome_label(&result);
    record_trade_command(
        command_type,
        result.mode.as_str(),
        result.environment.as_str(),
        outcome,
    );
    for reason in &result.reasons {
        record_guard_block(reason);
    }
    tracing::debug!(
        command_type,
        mode = %result.mode,
        environment = %result.environment,
        outcome,
        reasons = ?result.reasons,
        "Trade command evaluated"
    );
    result
}
