use std::sync::atomic::{AtomicBool, Ordering};

use dashmap::DashSet;
use tokio::sync::{watch, Notify};

use holosync_core::ParticipantId;

/// Readiness flags shared by the dispatcher, broadcasters and the wait loop.
///
/// Set once per session; only `reset` (session teardown) clears them.
pub struct Readiness {
    participants_ready: AtomicBool,
    ready_tx: watch::Sender<bool>,
    located: DashSet<ParticipantId>,
    changed: Notify,
}

impl Default for Readiness {
    fn default() -> Self {
        Self::new()
    }
}

impl Readiness {
    pub fn new() -> Self {
        let (ready_tx, _) = watch::channel(false);
        Self {
            participants_ready: AtomicBool::new(false),
            ready_tx,
            located: DashSet::new(),
            changed: Notify::new(),
        }
    }

    pub fn is_ready(&self) -> bool {
        self.participants_ready.load(Ordering::Acquire)
    }

    /// Returns `true` only for the call that flipped the flag.
    pub fn mark_ready(&self) -> bool {
        let first = !self.participants_ready.swap(true, Ordering::AcqRel);
        if first {
            self.ready_tx.send_replace(true);
            self.changed.notify_one();
        }
        first
    }

    /// Resolves once the ready flag is set.
    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.ready_tx.subscribe()
    }

    /// Returns `true` when `id` was not yet recorded.
    pub fn record_located(&self, id: ParticipantId) -> bool {
        let new = self.located.insert(id);
        if new {
            self.changed.notify_one();
        }
        new
    }

    pub fn is_located(&self, id: ParticipantId) -> bool {
        self.located.contains(&id)
    }

    pub fn located_count(&self) -> usize {
        self.located.len()
    }

    /// Woken when a flag changes (one stored permit).
    pub async fn changed(&self) {
        self.changed.notified().await;
    }

    pub fn reset(&self) {
        self.participants_ready.store(false, Ordering::Release);
        self.ready_tx.send_replace(false);
        self.located.clear();
    }
}
