//! In-memory session state (kill switch and execution venue).

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::RwLock;

use crate::application::ports::{SessionError, SessionState, SessionStatePort};
use crate::domain::trading::TradingEnvironment;

/// Process-local implementation of `SessionStatePort`.
#[derive(Debug, Default)]
pub struct InMemorySessionState {
    state: RwLock<SessionState>,
}

impl InMemorySessionState {
    /// Create an un-halted session routing to `execution_mode`.
    #[must_use]
    pub fn new(execution_mode: TradingEnvironment) -> Self {
        Self {
            state: RwLock::new(SessionState {
                execution_mode,
                updated_at: Some(Utc::now()),
                ..SessionState::default()
            }),
        }
    }

    /// Engage the kill switch.
    pub fn halt(&self, reason: impl Into<String>) {
        let mut state = self.state.write();
        state.trading_halted = true;
        state.halt_reason = Some(reason.into());
        state.updated_at = Some(Utc::now());
    }

    /// Release the kill switch.
    pub fn resume(&self) {
        let mut state = self.state.write();
        state.trading_halted = false;
        state.halt_reason = None;
        state.updated_at = Some(Utc::now());
    }

    /// Route the session to another venue.
    pub fn set_execution_mode(&self, execution_mode: TradingEnvironment) {
        let mut state = self.state.write();
        state.execution_mode = execution_mode;
        state.updated_at = Some(Utc::now());
    }

    /// Current state without going through the port.
    #[must_use]
    pub fn snapshot(&self) -> SessionState {
        self.state.read().clone()
    }
}

#[async_trait]
impl SessionStatePort for InMemorySessionState {
    async fn get_session_state(&self) -> Result<SessionState, SessionError> {
        Ok(self.snapshot())
    }

    async fn set_trading_halted(
        &self,
        halted: bool,
        reason: Option<String>,
    ) -> Result<SessionState, SessionError> {
        if halted {
            self.halt(reason.unwrap_or_else(|| "manual halt".to_string()));
            tracing::warn!(reason = ?self.state.read().halt_reason, "Kill switch engaged");
        } else {
            self.resume();
            tracing::info!("Kill switch released");
        }
        Ok(self.snapshot())
    }
}
