//! Data Transfer Objects (DTOs)
//!
//! DTOs are used for API boundaries and use case inputs/outputs.

mod execution_dto;
mod policy_dto;

pub use execution_dto::{BrokerResult, ExecuteTradeCommandRequest, ExecutionResult};
pub use policy_dto::EffectivePolicy;
