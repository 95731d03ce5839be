//! Broker State Store
//!
//! Holds the latest live broker snapshot and fans out updates.
//!
//! The store owns exactly one current snapshot. `update_snapshot` swaps the
//! `Arc` wholesale under a short write lock, then notifies:
//!
//! 1. Callback subscribers, synchronously and in registration order. Each
//!    call is isolated with `catch_unwind`; a panicking subscriber is logged
//!    and the rest are still notified.
//! 2. A broadcast channel for async consumers. Lagging receivers miss
//!    intermediate snapshots; only the latest matters.

use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Utc};
use parking_lot::{Mutex, RwLock};
use tokio::sync::broadcast;

use crate::domain::trading::BrokerSnapshot;
use crate::observability::record_snapshot_update;

/// Broadcast channel capacity.
const CHANNEL_CAPACITY: usize = 16;

/// Callback invoked with each new snapshot.
pub type SnapshotSubscriber = Arc<dyn Fn(&BrokerSnapshot) + Send + Sync>;

/// Handle returned by [`BrokerStateStore::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

#[derive(Debug, Default)]
struct Current {
    snapshot: Option<Arc<BrokerSnapshot>>,
    version: u64,
    updated_at: Option<DateTime<Utc>>,
}

/// Single-writer, many-reader cell for the live broker snapshot.
pub struct BrokerStateStore {
    current: RwLock<Current>,
    subscribers: Mutex<Vec<(SubscriptionId, SnapshotSubscriber)>>,
    next_id: AtomicU64,
    updates_tx: broadcast::Sender<Arc<BrokerSnapshot>>,
}

impl std::fmt::Debug for BrokerStateStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BrokerStateStore")
            .field("version", &self.version())
            .field("subscribers", &self.subscribers.lock().len())
            .finish_non_exhaustive()
    }
}

impl Default for BrokerStateStore {
    fn default() -> Self {
        Self::new()
    }
}

impl BrokerStateStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        let (updates_tx, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self {
            current: RwLock::new(Current::default()),
            subscribers: Mutex::new(Vec::new()),
            next_id: AtomicU64::new(1),
            updates_tx,
        }
    }

    /// Latest snapshot, if any has been received.
    #[must_use]
    pub fn current(&self) -> Option<Arc<BrokerSnapshot>> {
        self.current.read().snapshot.clone()
    }

    /// Number of updates applied so far.
    #[must_use]
    pub fn version(&self) -> u64 {
        self.current.read().version
    }

    /// When the snapshot was last replaced.
    #[must_use]
    pub fn last_updated(&self) -> Option<DateTime<Utc>> {
        self.current.read().updated_at
    }

    /// Replace the snapshot, then notify subscribers. Returns the new version.
    pub fn update_snapshot(&self, snapshot: BrokerSnapshot) -> u64 {
        let snapshot = Arc::new(snapshot);
        let version = {
            let mut current = self.current.write();
            current.snapshot = Some(Arc::clone(&snapshot));
            current.version += 1;
            current.updated_at = Some(Utc::now());
            current.version
        };
        record_snapshot_update();
        tracing::debug!(
            version,
            positions = snapshot.open_positions.len(),
            "Broker snapshot updated"
        );

        self.notify(&snapshot, version);
        version
    }

    fn notify(&self, snapshot: &Arc<BrokerSnapshot>, version: u64) {
        // Clone the list so subscribers may (un)subscribe from inside a callback.
        let subscribers: Vec<(SubscriptionId, SnapshotSubscriber)> =
            self.subscribers.lock().clone();

        for (id, subscriber) in subscribers {
            let outcome = catch_unwind(AssertUnwindSafe(|| subscriber(snapshot)));
            if outcome.is_err() {
                tracing::warn!(
                    subscription = id.0,
                    version,
                    "Snapshot subscriber panicked; continuing with remaining subscribers"
                );
            }
        }

        // No receivers is fine.
        let _ = self.updates_tx.send(Arc::clone(snapshot));
    }

    /// Register a callback for every future update.
    pub fn subscribe<F>(&self, subscriber: F) -> SubscriptionId
    where
        F: Fn(&BrokerSnapshot) + Send + Sync + 'static,
    {
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.subscribers.lock().push((id, Arc::new(subscriber)));
        id
    }

    /// Remove a callback. Returns whether it was registered.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut subscribers = self.subscribers.lock();
        let before = subscribers.len();
        subscribers.retain(|(sid, _)| *sid != id);
        subscribers.len() != before
    }

    /// Receiver for async consumers.
    #[must_use]
    pub fn updates(&self) -> broadcast::Receiver<Arc<BrokerSnapshot>> {
        self.updates_tx.subscribe()
    }
}
