// Allow unwrap/expect in tests - tests should panic on unexpected errors
// Allow test-specific patterns and pedantic lints in test code
#![cfg_attr(
    test,
    allow(
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::float_cmp,
        clippy::significant_drop_tightening,
        clippy::too_many_lines,
        clippy::match_same_arms,
        clippy::needless_pass_by_value,
        clippy::needless_collect,
        clippy::option_if_let_else,
        clippy::default_trait_access,
        clippy::items_after_statements,
        clippy::or_fun_call
    )
)]

//! Autopilot Engine - Rust Core Library
//!
//! Risk guard and execution routing engine for the trading autopilot.
//!
//! # Architecture (Clean Architecture + DDD + Hexagonal)
//!
//! ## Layers (inside → outside)
//!
//! - **Domain**: Pure rules, no I/O
//!   - `trading`: Trade commands, broker snapshots, sides and venues
//!   - `risk_management`: Execution guard, limits, verdicts
//!   - `journal`: Closed trades
//!   - `tilt`: Behavioral risk state and defense modes
//!   - `desk_policy`: Adaptive daily risk policy
//!
//! - **Application**: Use cases and orchestration
//!   - `ports`: Interfaces for external systems (`LiveBrokerPort`, `SimBrokerPort`,
//!     `SessionStatePort`, `JournalPort`)
//!   - `use_cases`: `ExecutionEngine`, `RiskPolicyUseCase`
//!   - `services`: `BrokerStateStore` (live snapshot cell)
//!   - `dto`: Data transfer objects for API boundaries
//!
//! - **Infrastructure**: Adapters (implementations)
//!   - `broker`: HTTP live broker gateway and in-memory simulated broker
//!   - `session`: Kill switch and routing state
//!   - `persistence`: Trade journal
//!   - `http`: REST API
//!
//! Cross-cutting: `config` (YAML + environment) and `observability`
//! (tracing subscriber, Prometheus metrics).

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::pedantic)]

// =============================================================================
// Clean Architecture Layers
// =============================================================================

/// Domain layer - Core business logic with no external dependencies.
pub mod domain;

/// Application layer - Use cases and port definitions.
pub mod application;

/// Infrastructure layer - Adapters and external integrations.
pub mod infrastructure;

/// Configuration loading and validation.
pub mod config;

/// Logging and metrics.
pub mod observability;

// =============================================================================
// Re-exports from Clean Architecture
// =============================================================================

// Domain re-exports
pub use domain::desk_policy::{DeskPolicy, DeskPolicyConfig, DeskPolicyEngine, PolicyMode};
pub use domain::journal::JournalEntry;
pub use domain::risk_management::{ExecutionGuard, GuardLimits, GuardVerdict, ReasonCode};
pub use domain::shared::{ClientOrderId, PositionId, Symbol};
pub use domain::tilt::{DefenseMode, RiskState, TiltConfig, TiltService, TiltState};
pub use domain::trading::{BrokerSnapshot, ExecutionMode, TradeCommand, TradingEnvironment};

// Application re-exports
pub use application::dto::{EffectivePolicy, ExecuteTradeCommandRequest, ExecutionResult};
pub use application::ports::{
    BrokerError, JournalPort, LiveBrokerPort, SessionStatePort, SimBrokerPort,
};
pub use application::services::BrokerStateStore;
pub use application::use_cases::{
    ExecutionEngine, ExecutionError, ExecutionSettings, RiskPolicyUseCase,
};

// Infrastructure re-exports
pub use infrastructure::InMemorySessionState;
pub use infrastructure::broker::{HttpLiveBroker, InMemorySimBroker, LiveBrokerConfig};
pub use infrastructure::http::{AppState, create_router};
pub use infrastructure::persistence::InMemoryJournal;
