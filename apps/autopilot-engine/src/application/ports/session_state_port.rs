//! Session State Port (Driven Port)
//!
//! Interface for the global kill switch and the session's execution venue.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::trading::TradingEnvironment;

/// Global trading session state.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionState {
    /// Kill switch: no command reaches a broker while set.
    pub trading_halted: bool,
    /// Venue the session routes to.
    pub execution_mode: TradingEnvironment,
    /// Why trading was halted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub halt_reason: Option<String>,
    /// When the state last changed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Session state port error.
#[derive(Debug, Clone, thiserror::Error)]
pub enum SessionError {
    /// The state could not be read or written.
    #[error("session state unavailable: {message}")]
    Unavailable {
        /// Error details.
        message: String,
    },
}

/// Port for session state.
#[async_trait]
pub trait SessionStatePort: Send + Sync {
    /// Current state. Read fresh on every call.
    async fn get_session_state(&self) -> Result<SessionState, SessionError>;

    /// Set or clear the kill switch.
    async fn set_trading_halted(
        &self,
        halted: bool,
        reason: Option<String>,
    ) -> Result<SessionState, SessionError>;
}
