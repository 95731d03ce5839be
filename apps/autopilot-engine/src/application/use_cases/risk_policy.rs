//! Risk Policy Use Case
//!
//! Composes the day's desk policy with the current tilt state.

use std::sync::Arc;

use chrono::{NaiveDate, NaiveTime};
use parking_lot::Mutex;

use crate::application::dto::EffectivePolicy;
use crate::application::ports::{JournalError, JournalPort};
use crate::application::services::BrokerStateStore;
use crate::domain::desk_policy::{DeskPolicy, DeskPolicyEngine};
use crate::domain::tilt::TiltService;

/// Use case producing the effective risk policy for a trading day.
///
/// The base desk policy is generated once per date and cached; tilt is
/// re-evaluated on every call because it moves with each closed trade.
pub struct RiskPolicyUseCase<J>
where
    J: JournalPort,
{
    journal: Arc<J>,
    store: Arc<BrokerStateStore>,
    tilt: TiltService,
    desk: DeskPolicyEngine,
    cached: Mutex<Option<DeskPolicy>>,
}

impl<J> RiskPolicyUseCase<J>
where
    J: JournalPort,
{
    /// Create a new `RiskPolicyUseCase`.
    pub fn new(
        journal: Arc<J>,
        store: Arc<BrokerStateStore>,
        tilt: TiltService,
        desk: DeskPolicyEngine,
    ) -> Self {
        Self {
            journal,
            store,
            tilt,
            desk,
            cached: Mutex::new(None),
        }
    }

    /// Effective policy for `date`. `refresh` regenerates the cached base policy.
    ///
    /// # Errors
    ///
    /// Returns [`JournalError`] if the journal cannot be read.
    pub async fn execute(
        &self,
        date: NaiveDate,
        refresh: bool,
    ) -> Result<EffectivePolicy, JournalError> {
        let today = self.journal.entries_for_day(date).await?;
        let snapshot = self.store.current();
        let tilt = self.tilt.evaluate(&today, snapshot.as_deref());

        let base_policy = match self.cached_for(date).filter(|_| !refresh) {
            Some(policy) => policy,
            None => {
                let since = self
                    .desk
                    .lookback_start(date)
                    .and_time(NaiveTime::MIN)
                    .and_utc();
                let history = self.journal.entries_since(since).await?;
                let policy = self.desk.generate(date, &history, tilt.loss_streak);
                tracing::info!(
                    %date,
                    mode = %policy.mode,
                    max_risk_per_trade = %policy.max_risk_per_trade,
                    history = history.len(),
                    "Desk policy generated"
                );
                *self.cached.lock() = Some(policy.clone());
                policy
            }
        };

        let effective_policy = self.tilt.apply_defense_mode(&base_policy, tilt.defense_mode);
        let prompt_text = format!(
            "{}\nBehavioral state: {} (defense mode {}, loss streak {}, daily R {})",
            effective_policy.prompt_text(),
            tilt.risk_state,
            tilt.defense_mode,
            tilt.loss_streak,
            tilt.daily_r.normalize(),
        );

        Ok(EffectivePolicy {
            date,
            tilt,
            base_policy,
            effective_policy,
            prompt_text,
        })
    }

    fn cached_for(&self, date: NaiveDate) -> Option<DeskPolicy> {
        self.cached
            .lock()
            .as_ref()
            .filter(|policy| policy.date == date)
            .cloned()
    }
}
