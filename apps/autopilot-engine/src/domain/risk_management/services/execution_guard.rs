//! Execution Guard
//!
//! Pure rule evaluator: `(snapshot, command) -> verdict`. No I/O and no
//! hidden state, so repeated and concurrent evaluation is safe and returns
//! identical verdicts.
//!
//! Checks by command type:
//!
//! - **open**: equity (hard), daily drawdown, total positions, positions per
//!   symbol, single-trade risk. Soft checks all run and accumulate reasons.
//! - **close**: always allowed; warns when the position is unknown.
//! - **modify**: blocks a stop-loss that moves away from the protective side.

use rust_decimal::Decimal;
use serde_json::Value;

use crate::domain::risk_management::value_objects::{
    GuardLimits, GuardMetrics, GuardVerdict, ReasonCode, RiskEstimateError,
};
use crate::domain::trading::{
    BrokerSnapshot, CloseCommand, CommandParseError, ModifyCommand, OpenCommand, PositionSide,
    TradeCommand,
};

const HUNDRED: Decimal = Decimal::ONE_HUNDRED;

/// Estimated loss if the stop is hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RiskEstimate {
    /// Loss in account currency, summed over protective legs.
    pub risk_value: Decimal,
    /// `risk_value` as a percent of equity.
    pub risk_percent: Decimal,
}

/// Execution Guard - evaluates trade commands against account risk rules.
#[derive(Debug, Clone, Default)]
pub struct ExecutionGuard {
    limits: GuardLimits,
}

impl ExecutionGuard {
    /// Create a guard with the given limits.
    #[must_use]
    pub const fn new(limits: GuardLimits) -> Self {
        Self { limits }
    }

    /// The limits this guard enforces.
    #[must_use]
    pub const fn limits(&self) -> &GuardLimits {
        &self.limits
    }

    /// Evaluate a raw JSON command.
    ///
    /// A missing snapshot, missing or unknown command type, or malformed
    /// payload is a hard block.
    #[must_use]
    pub fn evaluate_raw(&self, snapshot: Option<&BrokerSnapshot>, command: &Value) -> GuardVerdict {
        if snapshot.is_none() {
            return GuardVerdict::hard_block(ReasonCode::NoBrokerSnapshot);
        }
        self.evaluate_parsed(snapshot, TradeCommand::parse(command.clone()).as_ref())
    }

    /// Evaluate the outcome of [`TradeCommand::parse`].
    #[must_use]
    pub fn evaluate_parsed(
        &self,
        snapshot: Option<&BrokerSnapshot>,
        command: Result<&TradeCommand, &CommandParseError>,
    ) -> GuardVerdict {
        match (snapshot, command) {
            (None, _) => GuardVerdict::hard_block(ReasonCode::NoBrokerSnapshot),
            (Some(_), Err(err)) => GuardVerdict::hard_block(parse_error_reason(err)),
            (Some(_), Ok(command)) => self.evaluate(snapshot, command),
        }
    }

    /// Evaluate a typed command.
    #[must_use]
    pub fn evaluate(
        &self,
        snapshot: Option<&BrokerSnapshot>,
        command: &TradeCommand,
    ) -> GuardVerdict {
        let Some(snapshot) = snapshot else {
            return GuardVerdict::hard_block(ReasonCode::NoBrokerSnapshot);
        };

        match command {
            TradeCommand::Open(open) => self.evaluate_open(snapshot, open),
            TradeCommand::Close(close) => Self::evaluate_close(snapshot, close),
            TradeCommand::Modify(modify) => Self::evaluate_modify(snapshot, modify),
        }
    }

    fn evaluate_open(&self, snapshot: &BrokerSnapshot, command: &OpenCommand) -> GuardVerdict {
        let equity = match snapshot.equity {
            Some(equity) if equity > Decimal::ZERO => equity,
            _ => return GuardVerdict::hard_block(ReasonCode::InvalidEquity),
        };

        let mut verdict = GuardVerdict::allow();
        let mut metrics = GuardMetrics::default();

        // Daily drawdown
        let balance = snapshot.balance.filter(|b| !b.is_zero());
        let drawdown = snapshot
            .daily_pnl
            .zip(balance)
            .and_then(|(pnl, balance)| pnl.checked_div(balance)?.checked_mul(HUNDRED));
        // Unrepresentable ratios skip the rule, same as a missing balance.
        if let Some(drawdown_percent) = drawdown {
            metrics.daily_drawdown_percent = Some(drawdown_percent);
            if drawdown_percent <= -self.limits.max_daily_drawdown_percent {
                verdict.block(ReasonCode::DailyDrawdownLimitExceeded);
            }
        }

        // Position counts
        let open_positions = snapshot.open_positions.len();
        let new_positions = command.new_positions();
        metrics.open_positions = Some(open_positions);
        metrics.new_positions = Some(new_positions);
        if open_positions + new_positions > self.limits.max_open_positions {
            verdict.block(ReasonCode::MaxOpenPositionsExceeded);
        }

        let symbol_positions = snapshot.positions_for(&command.symbol);
        metrics.symbol_positions = Some(symbol_positions);
        if symbol_positions + new_positions > self.limits.max_positions_per_symbol {
            verdict.block(ReasonCode::MaxPositionsPerSymbolExceeded);
        }

        // Single-trade risk
        let cap = self.limits.max_single_trade_risk_percent;
        metrics.risk_cap_percent = Some(cap);
        match Self::estimate_risk(Some(equity), command) {
            Ok(estimate) => {
                metrics.risk_value = Some(estimate.risk_value);
                metrics.risk_percent = Some(estimate.risk_percent);
                if estimate.risk_percent > cap {
                    verdict.block(ReasonCode::SingleTradeRiskTooHigh);
                } else if estimate.risk_percent > self.limits.risk_warning_threshold() {
                    verdict.warn(ReasonCode::SingleTradeRiskNearLimit);
                }
            }
            Err(reason) => verdict.warn(reason.as_warning()),
        }

        verdict.with_metrics(metrics)
    }

    fn evaluate_close(snapshot: &BrokerSnapshot, command: &CloseCommand) -> GuardVerdict {
        let found = snapshot.find_position(&command.position_id).is_some();
        let mut verdict = GuardVerdict::allow();
        if !found {
            verdict.warn(ReasonCode::PositionNotFoundInSnapshot);
        }
        verdict.with_metrics(GuardMetrics {
            position_found: Some(found),
            ..GuardMetrics::default()
        })
    }

    fn evaluate_modify(snapshot: &BrokerSnapshot, command: &ModifyCommand) -> GuardVerdict {
        let mut verdict = GuardVerdict::allow();
        let mut metrics = GuardMetrics {
            requested_stop_loss: command.sl_price,
            ..GuardMetrics::default()
        };

        let Some(position) = snapshot.find_position(&command.position_id) else {
            metrics.position_found = Some(false);
            verdict.warn(ReasonCode::PositionNotFoundInSnapshot);
            return verdict.with_metrics(metrics);
        };
        metrics.position_found = Some(true);
        metrics.current_stop_loss = position.stop_loss;

        if let (Some(requested), Some(current)) = (command.sl_price, position.stop_loss) {
            match position.side {
                PositionSide::Long if requested < current => {
                    verdict.block(ReasonCode::CannotWidenStopLossForLong);
                }
                PositionSide::Short if requested > current => {
                    verdict.block(ReasonCode::CannotWidenStopLossForShort);
                }
                _ => {}
            }
        }

        verdict.with_metrics(metrics)
    }

    /// Estimate the loss at the stop for an open command.
    ///
    /// For `BOTH`, each leg counts only when its stop is protective (long:
    /// stop below entry, short: stop above entry) and the legs are summed.
    ///
    /// # Errors
    ///
    /// Returns the [`RiskEstimateError`] naming the missing or inconsistent input.
    pub fn estimate_risk(
        equity: Option<Decimal>,
        command: &OpenCommand,
    ) -> Result<RiskEstimate, RiskEstimateError> {
        let equity = equity
            .filter(|e| *e > Decimal::ZERO)
            .ok_or(RiskEstimateError::MissingOrInvalidEquity)?;
        let qty = command
            .qty
            .filter(|q| *q > Decimal::ZERO)
            .ok_or(RiskEstimateError::MissingOrInvalidSize)?;
        let (Some(price), Some(stop)) = (
            command.price.filter(|p| *p > Decimal::ZERO),
            command.sl_price.filter(|s| *s > Decimal::ZERO),
        ) else {
            return Err(RiskEstimateError::MissingEntryOrStopLoss);
        };

        // Per-unit loss over the protective legs.
        let distance = match command.side.position_side() {
            Some(side) => {
                stop_distance(side, price, stop).ok_or(RiskEstimateError::StopLossNotProtective)?
            }
            None => {
                let long = stop_distance(PositionSide::Long, price, stop);
                let short = stop_distance(PositionSide::Short, price, stop);
                if long.is_none() && short.is_none() {
                    return Err(RiskEstimateError::StopLossNotProtectiveForEitherLeg);
                }
                long.unwrap_or_default() + short.unwrap_or_default()
            }
        };
        let risk_value = distance
            .checked_mul(qty)
            .ok_or(RiskEstimateError::RiskOutOfRange)?;

        let risk_percent = risk_value
            .checked_div(equity)
            .and_then(|ratio| ratio.checked_mul(HUNDRED))
            .ok_or(RiskEstimateError::RiskOutOfRange)?;

        Ok(RiskEstimate {
            risk_value,
            risk_percent,
        })
    }
}

fn stop_distance(side: PositionSide, price: Decimal, stop: Decimal) -> Option<Decimal> {
    match side {
        PositionSide::Long if stop < price => Some(price - stop),
        PositionSide::Short if stop > price => Some(stop - price),
        _ => None,
    }
}

const fn parse_error_reason(err: &CommandParseError) -> ReasonCode {
    match err {
        CommandParseError::MissingCommandType => ReasonCode::MissingCommandType,
        CommandParseError::UnknownCommandType(_) => ReasonCode::UnknownCommandType,
        CommandParseError::InvalidPayload(_) => ReasonCode::InvalidCommandPayload,
    }
}
