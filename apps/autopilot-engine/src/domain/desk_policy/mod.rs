//! Desk Policy Bounded Context
//!
//! Turns playbook performance and the current losing streak into the day's
//! adaptive risk policy.
//!
//! # Key Concepts
//!
//! - **Playbook Stats**: win rate and average R per playbook over a lookback window
//! - **Green Playbooks**: enough samples, win rate and average R to be allow-listed
//! - **Policy Mode**: standard, reduced, stopped, enforced

pub mod services;
pub mod value_objects;

pub use services::DeskPolicyEngine;
pub use value_objects::{AllowedPlaybooks, DeskPolicy, DeskPolicyConfig, PlaybookStats, PolicyMode};
