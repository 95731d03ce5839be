//! Risk policy DTOs

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::desk_policy::DeskPolicy;
use crate::domain::tilt::TiltState;

/// The day's policy after behavioral adjustment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EffectivePolicy {
    /// Trading day.
    pub date: NaiveDate,
    /// Current behavioral state.
    pub tilt: TiltState,
    /// Policy generated from playbook performance.
    pub base_policy: DeskPolicy,
    /// `base_policy` adjusted for the tilt defense mode.
    pub effective_policy: DeskPolicy,
    /// Text block for the coordinator prompt.
    pub prompt_text: String,
}
