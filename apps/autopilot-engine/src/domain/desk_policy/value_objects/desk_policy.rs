//! The daily desk policy.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// How restrictive a policy is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PolicyMode {
    /// Normal risk.
    Standard,
    /// Reduced risk after a losing streak.
    Reduced,
    /// Trading stop recommended.
    Stopped,
    /// Risk forced to zero by the defense mode.
    Enforced,
}

impl fmt::Display for PolicyMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Standard => write!(f, "standard"),
            Self::Reduced => write!(f, "reduced"),
            Self::Stopped => write!(f, "stopped"),
            Self::Enforced => write!(f, "enforced"),
        }
    }
}

/// Playbooks the desk may trade. Serialized as a list, `["*"]` for any.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub enum AllowedPlaybooks {
    /// No playbook qualified; nothing is singled out.
    Any,
    /// Only these playbooks.
    Only(Vec<String>),
}

impl AllowedPlaybooks {
    const WILDCARD: &'static str = "*";

    /// Whether `playbook` may be traded.
    #[must_use]
    pub fn permits(&self, playbook: &str) -> bool {
        match self {
            Self::Any => true,
            Self::Only(list) => list.iter().any(|p| p == playbook),
        }
    }
}

impl From<Vec<String>> for AllowedPlaybooks {
    fn from(list: Vec<String>) -> Self {
        if list.is_empty() || list.iter().any(|p| p == Self::WILDCARD) {
            Self::Any
        } else {
            Self::Only(list)
        }
    }
}

impl From<AllowedPlaybooks> for Vec<String> {
    fn from(allowed: AllowedPlaybooks) -> Self {
        match allowed {
            AllowedPlaybooks::Any => vec![AllowedPlaybooks::WILDCARD.to_string()],
            AllowedPlaybooks::Only(list) => list,
        }
    }
}

impl fmt::Display for AllowedPlaybooks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Any => f.write_str(Self::WILDCARD),
            Self::Only(list) => f.write_str(&list.join(", ")),
        }
    }
}

/// Adaptive risk policy for one trading day.
///
/// Adjustments produce new copies; a policy is never edited in place once
/// handed out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeskPolicy {
    /// Day the policy was generated for.
    pub date: NaiveDate,
    /// Restrictiveness.
    pub mode: PolicyMode,
    /// Risk per trade, percent of equity.
    pub max_risk_per_trade: Decimal,
    /// Daily loss limit in R.
    pub max_daily_loss_r: Decimal,
    /// Trade count limit for the day.
    pub max_trades_per_day: u32,
    /// Playbooks allowed today.
    pub allowed_playbooks: AllowedPlaybooks,
    /// Human-readable explanation of the adjustments.
    pub notes: Vec<String>,
}

impl DeskPolicy {
    /// Render the policy as the text block fed to the coordinator.
    #[must_use]
    pub fn prompt_text(&self) -> String {
        let mut text = format!(
            "Desk policy for {} ({} mode)\n\
             - Max risk per trade: {}%\n\
             - Max daily loss: {}R\n\
             - Max trades per day: {}\n\
             - Allowed playbooks: {}",
            self.date,
            self.mode,
            self.max_risk_per_trade.normalize(),
            self.max_daily_loss_r.normalize(),
            self.max_trades_per_day,
            self.allowed_playbooks,
        );
        for note in &self.notes {
            text.push_str("\n- Note: ");
            text.push_str(note);
        }
        text
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn allowed_playbooks_wildcard_round_trip() {
        let json = serde_json::to_string(&AllowedPlaybooks::Any).unwrap();
        assert_eq!(json, r#"["*"]"#);
        let parsed: AllowedPlaybooks = serde_json::from_str(r#"["*"]"#).unwrap();
        assert_eq!(parsed, AllowedPlaybooks::Any);
    }

    #[test]
    fn allowed_playbooks_list() {
        let parsed: AllowedPlaybooks = serde_json::from_str(r#"["breakout","pullback"]"#).unwrap();
        assert!(parsed.permits("breakout"));
        assert!(!parsed.permits("fade"));
        assert!(AllowedPlaybooks::Any.permits("fade"));
    }

    #[test]
    fn prompt_text_lists_limits_and_notes() {
        let policy = DeskPolicy {
            date: NaiveDate::from_ymd_opt(2026, 3, 2).unwrap(),
            mode: PolicyMode::Reduced,
            max_risk_per_trade: dec!(0.25),
            max_daily_loss_r: dec!(3),
            max_trades_per_day: 5,
            allowed_playbooks: AllowedPlaybooks::Only(vec!["breakout".to_string()]),
            notes: vec!["Loss streak 2".to_string()],
        };
        let text = policy.prompt_text();
        assert!(text.contains("2026-03-02"));
        assert!(text.contains("reduced mode"));
        assert!(text.contains("0.25%"));
        assert!(text.contains("breakout"));
        assert!(text.contains("Note: Loss streak 2"));
    }
}
