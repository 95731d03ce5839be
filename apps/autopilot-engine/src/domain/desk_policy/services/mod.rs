//! Desk Policy Domain Services

mod desk_policy_engine;

pub use desk_policy_engine::DeskPolicyEngine;
