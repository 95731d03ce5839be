//! HTTP request DTOs.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::trading::BrokerSnapshot;

/// Request to preview a command against the guard.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluateCommandRequest {
    /// Raw trade command.
    pub command: Value,
    /// Snapshot to evaluate against; the live snapshot when absent.
    #[serde(default)]
    pub snapshot: Option<BrokerSnapshot>,
}

/// Request to set or clear the kill switch.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KillSwitchRequest {
    /// Halt (`true`) or resume (`false`).
    pub halted: bool,
    /// Why.
    #[serde(default)]
    pub reason: Option<String>,
}

/// Query parameters for the risk policy endpoint.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PolicyQuery {
    /// Trading day, today (UTC) when absent.
    #[serde(default)]
    pub date: Option<NaiveDate>,
    /// Regenerate the cached desk policy.
    #[serde(default)]
    pub refresh: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn evaluate_request_snapshot_is_optional() {
        let request: EvaluateCommandRequest =
            serde_json::from_value(json!({"command": {"type": "close", "positionId": "p"}}))
                .unwrap();
        assert!(request.snapshot.is_none());
    }

    #[test]
    fn kill_switch_reason_is_optional() {
        let request: KillSwitchRequest = serde_json::from_value(json!({"halted": true})).unwrap();
        assert!(request.halted);
        assert!(request.reason.is_none());
    }
}
