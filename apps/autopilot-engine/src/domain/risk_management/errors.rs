//! Risk management errors.

use std::fmt;

/// Errors that can occur while configuring the execution guard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RiskError {
    /// Invalid risk configuration.
    InvalidConfiguration {
        /// Configuration field.
        field: String,
        /// Error message.
        message: String,
    },
}

impl RiskError {
    pub(crate) fn invalid(field: &str, message: impl Into<String>) -> Self {
        Self::InvalidConfiguration {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

impl fmt::Display for RiskError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidConfiguration { field, message } => {
                write!(f, "Invalid risk configuration [{field}]: {message}")
            }
        }
    }
}

impl std::error::Error for RiskError {}
