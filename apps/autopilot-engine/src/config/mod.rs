//! Configuration module for the autopilot engine.
//!
//! Loads YAML with `${VAR}` / `${VAR:-default}` interpolation, applies the
//! process environment overrides, and validates the result.
//!
//! # Usage
//!
//! ```rust,ignore
//! use autopilot_engine::config::{Config, load_config};
//!
//! // Load from default path (config.yaml), falling back to defaults
//! let mut config = load_config(None)?;
//!
//! // Environment variables win over the file
//! config.apply_env_overrides(|name| std::env::var(name).ok())?;
//!
//! println!("HTTP port: {}", config.server.http_port);
//! ```

mod broker;
mod execution;
mod observability;
mod server;

use std::path::Path;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::desk_policy::DeskPolicyConfig;
use crate::domain::risk_management::GuardLimits;
use crate::domain::tilt::TiltConfig;

pub use broker::{BrokerConfig, LiveGatewayConfig};
pub use execution::ExecutionConfig;
pub use observability::{LoggingConfig, ObservabilityConfig};
pub use server::ServerConfig;

/// Default config file looked up when no path is given.
pub const DEFAULT_CONFIG_PATH: &str = "config.yaml";

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read configuration file.
    #[error("Failed to read config file '{path}': {source}")]
    ReadError {
        /// Path to the config file.
        path: String,
        /// The underlying IO error.
        source: std::io::Error,
    },

    /// Failed to parse YAML configuration.
    #[error("Failed to parse config YAML: {0}")]
    ParseError(#[from] serde_yaml_bw::Error),

    /// Configuration validation failed.
    #[error("Config validation failed: {0}")]
    ValidationError(String),

    /// An environment override could not be parsed.
    #[error("Invalid value for {name}: '{value}'")]
    InvalidEnvVar {
        /// Variable name.
        name: String,
        /// Raw value.
        value: String,
    },

    /// Missing required environment variable.
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),
}

/// Root configuration structure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Config {
    /// Server configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// Execution guard thresholds.
    #[serde(default)]
    pub guard: GuardLimits,
    /// Execution routing switches.
    #[serde(default)]
    pub execution: ExecutionConfig,
    /// Tilt detection thresholds.
    #[serde(default)]
    pub tilt: TiltConfig,
    /// Desk policy generation parameters.
    #[serde(default)]
    pub desk_policy: DeskPolicyConfig,
    /// Broker configuration.
    #[serde(default)]
    pub broker: BrokerConfig,
    /// Observability configuration.
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

// ============================================
// Configuration Loading
// ============================================

/// Load configuration from a YAML file with environment variable interpolation.
///
/// With no explicit path, a missing `config.yaml` yields the defaults.
/// Environment overrides are not applied here; see
/// [`Config::apply_env_overrides`].
///
/// # Errors
///
/// Returns a `ConfigError` if the file cannot be read, parsed, or validated.
pub fn load_config(path: Option<&str>) -> Result<Config, ConfigError> {
    let resolved = path.unwrap_or(DEFAULT_CONFIG_PATH);
    if path.is_none() && !Path::new(resolved).exists() {
        tracing::debug!(path = resolved, "No config file found, using defaults");
        return Ok(Config::default());
    }

    let contents = std::fs::read_to_string(resolved).map_err(|e| ConfigError::ReadError {
        path: resolved.to_string(),
        source: e,
    })?;

    load_config_from_string(&contents)
}

/// Load configuration from a YAML string (useful for testing).
///
/// # Errors
///
/// Returns a `ConfigError` if the YAML cannot be parsed or validated.
pub fn load_config_from_string(yaml: &str) -> Result<Config, ConfigError> {
    let interpolated = interpolate_env_vars(yaml);
    let config: Config = serde_yaml_bw::from_str(&interpolated)?;
    config.validate()?;
    Ok(config)
}

/// Interpolate environment variables in a string.
///
/// Supports both `${VAR}` and `${VAR:-default}` syntax.
#[allow(clippy::expect_used)] // Regex is compile-time constant
fn interpolate_env_vars(input: &str) -> String {
    use std::sync::OnceLock;

    static ENV_VAR_REGEX: OnceLock<regex::Regex> = OnceLock::new();

    let re = ENV_VAR_REGEX.get_or_init(|| {
        regex::Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)(?::-([^}]*))?\}")
            .expect("env var regex is valid")
    });

    re.replace_all(input, |cap: &regex::Captures<'_>| {
        let default_value = cap.get(2).map_or("", |m| m.as_str());
        match std::env::var(&cap[1]) {
            Ok(v) if !v.is_empty() => v,
            _ => default_value.to_string(),
        }
    })
    .into_owned()
}

// ============================================
// Environment Overrides
// ============================================

impl Config {
    /// Apply the process-level overrides.
    ///
    /// `lookup` returns the raw value of a variable; empty values are ignored.
    /// The result is re-validated.
    ///
    /// # Errors
    ///
    /// Returns `InvalidEnvVar` for unparseable values and `ValidationError`
    /// when an override produces an invalid configuration.
    pub fn apply_env_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        if let Some(v) = var("MAX_DAILY_DD_PERCENT") {
            self.guard.max_daily_drawdown_percent = parse_env("MAX_DAILY_DD_PERCENT", &v)?;
        }
        if let Some(v) = var("MAX_OPEN_POSITIONS") {
            self.guard.max_open_positions = parse_env("MAX_OPEN_POSITIONS", &v)?;
        }
        if let Some(v) = var("MAX_POSITIONS_PER_SYMBOL") {
            self.guard.max_positions_per_symbol = parse_env("MAX_POSITIONS_PER_SYMBOL", &v)?;
        }
        if let Some(v) = var("MAX_SINGLE_TRADE_RISK_PERCENT") {
            self.guard.max_single_trade_risk_percent =
                parse_env::<Decimal>("MAX_SINGLE_TRADE_RISK_PERCENT", &v)?;
        }
        if let Some(v) = var("AUTO_EXECUTE_LIVE") {
            self.execution.auto_execute_live = parse_flag("AUTO_EXECUTE_LIVE", &v)?;
        }
        if let Some(v) = var("ENFORCE_DESK_POLICY") {
            self.execution.enforce_desk_policy = parse_flag("ENFORCE_DESK_POLICY", &v)?;
        }
        if let Some(v) = var("TILT_OVERTRADING_LIMIT") {
            self.tilt.overtrading_limit = parse_env("TILT_OVERTRADING_LIMIT", &v)?;
        }
        if let Some(v) = var("HTTP_PORT") {
            self.server.http_port = parse_env("HTTP_PORT", &v)?;
        }
        if let Some(v) = var("METRICS_PORT") {
            self.server.metrics_port = parse_env("METRICS_PORT", &v)?;
        }
        if let Some(v) = var("LIVE_BROKER_URL") {
            self.broker.live.base_url = v.trim().to_string();
        }
        if let Some(v) = var("LIVE_BROKER_TOKEN") {
            self.broker.live.api_token = v.trim().to_string();
        }

        self.validate()
    }

    /// Validate configuration values.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` describing the first invalid value.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.http_port == self.server.metrics_port {
            return Err(ConfigError::ValidationError(
                "http_port and metrics_port must be different".to_string(),
            ));
        }

        self.guard
            .validate()
            .map_err(|e| ConfigError::ValidationError(format!("guard: {e}")))?;

        if self.tilt.overtrading_limit == 0 {
            return Err(ConfigError::ValidationError(
                "tilt.overtrading_limit must be positive".to_string(),
            ));
        }
        if self.tilt.session_drawdown_r >= Decimal::ZERO {
            return Err(ConfigError::ValidationError(
                "tilt.session_drawdown_r must be negative".to_string(),
            ));
        }

        if self.desk_policy.lookback_days == 0 {
            return Err(ConfigError::ValidationError(
                "desk_policy.lookback_days must be positive".to_string(),
            ));
        }
        if self.desk_policy.base_risk_per_trade <= Decimal::ZERO
            || self.desk_policy.reduced_risk_per_trade <= Decimal::ZERO
        {
            return Err(ConfigError::ValidationError(
                "desk_policy risk per trade must be positive".to_string(),
            ));
        }

        if self.execution.sim_starting_balance <= Decimal::ZERO {
            return Err(ConfigError::ValidationError(
                "execution.sim_starting_balance must be positive".to_string(),
            ));
        }

        if self.broker.live.max_attempts == 0 {
            return Err(ConfigError::ValidationError(
                "broker.live.max_attempts must be at least 1".to_string(),
            ));
        }

        let valid_formats = ["json", "pretty"];
        let format = self.observability.logging.format.to_ascii_lowercase();
        if !valid_formats.contains(&format.as_str()) {
            return Err(ConfigError::ValidationError(format!(
                "observability.logging.format must be one of: {valid_formats:?}"
            )));
        }

        Ok(())
    }

    /// Require the live gateway URL and token.
    ///
    /// # Errors
    ///
    /// Returns `MissingEnvVar` naming the first missing variable.
    pub fn require_live_credentials(&self) -> Result<(), ConfigError> {
        if self.broker.live.base_url.trim().is_empty() {
            return Err(ConfigError::MissingEnvVar("LIVE_BROKER_URL".to_string()));
        }
        if self.broker.live.api_token.trim().is_empty() {
            return Err(ConfigError::MissingEnvVar("LIVE_BROKER_TOKEN".to_string()));
        }
        Ok(())
    }
}

fn parse_env<T: std::str::FromStr>(name: &str, value: &str) -> Result<T, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::InvalidEnvVar {
            name: name.to_string(),
            value: value.to_string(),
        })
}

fn parse_flag(name: &str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidEnvVar {
            name: name.to_string(),
            value: value.to_string(),
        }),
    }
}
