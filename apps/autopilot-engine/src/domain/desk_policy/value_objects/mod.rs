//! Desk Policy Value Objects

mod desk_policy;
mod desk_policy_config;
mod playbook_stats;

pub use desk_policy::{AllowedPlaybooks, DeskPolicy, PolicyMode};
pub use desk_policy_config::DeskPolicyConfig;
pub use playbook_stats::PlaybookStats;
