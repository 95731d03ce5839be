//! Execution routing configuration.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::application::use_cases::ExecutionSettings;
use crate::domain::trading::TradingEnvironment;

/// Execution routing configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionConfig {
    /// Let `auto` mode place live orders (`AUTO_EXECUTE_LIVE`).
    #[serde(default)]
    pub auto_execute_live: bool,
    /// Cap single-trade risk by the desk policy (`ENFORCE_DESK_POLICY`).
    #[serde(default)]
    pub enforce_desk_policy: bool,
    /// Venue the session routes to at startup.
    #[serde(default)]
    pub session_environment: TradingEnvironment,
    /// Starting balance of the simulated account.
    #[serde(default = "default_sim_balance")]
    pub sim_starting_balance: Decimal,
}

impl ExecutionConfig {
    /// Engine settings derived from this section.
    #[must_use]
    pub const fn settings(&self) -> ExecutionSettings {
        ExecutionSettings {
            auto_execute_live: self.auto_execute_live,
            enforce_desk_policy: self.enforce_desk_policy,
        }
    }
}

impl Default for ExecutionConfig {
    fn default() -> Self {
        Self {
            auto_execute_live: false,
            enforce_desk_policy: false,
            session_environment: TradingEnvironment::default(),
            sim_starting_balance: default_sim_balance(),
        }
    }
}

fn default_sim_balance() -> Decimal {
    dec!(10000)
}
