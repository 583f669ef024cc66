//! In-process sharing substrate.
//!
//! - `participant_id -> peer` with a bounded inbound queue per peer
//! - per-peer listener set (`register_listener`), frames for other tags are not delivered
//! - membership published through a `watch` channel in join order
//! - reliable fan-out awaits every queue (with optional timeout); unreliable uses `try_send`

use std::sync::atomic::{AtomicI64, AtomicU64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use dashmap::{DashMap, DashSet};
use futures_util::stream::FuturesUnordered;
use futures_util::StreamExt;
use tokio::sync::{mpsc, watch};
use tokio::time::{timeout, Duration};

use holosync_core::error::{Result, SyncError};
use holosync_core::ParticipantId;

use super::{Delivery, Reliability, Transport};

#[derive(Debug, Clone, Copy)]
pub struct HubOptions {
    /// Inbound queue depth per participant.
    pub queue_capacity: usize,
    /// Per-peer timeout for reliable sends; 0 waits indefinitely.
    pub reliable_timeout_ms: u64,
    /// Deliver broadcasts back to their sender too.
    pub loopback: bool,
}

impl Default for HubOptions {
    fn default() -> Self {
        Self {
            queue_capacity: 1024,
            reliable_timeout_ms: 1500,
            loopback: false,
        }
    }
}

#[derive(Clone)]
struct Peer {
    tx: mpsc::Sender<Bytes>,
    listeners: Arc<DashSet<u8>>,
    joined_seq: u64,
}

struct HubInner {
    opts: HubOptions,
    peers: DashMap<ParticipantId, Peer>,
    next_id: AtomicI64,
    seq: AtomicU64,
    membership: watch::Sender<Vec<ParticipantId>>,
}

impl HubInner {
    fn snapshot(&self) -> Vec<ParticipantId> {
        let mut peers: Vec<(u64, ParticipantId)> = self
            .peers
            .iter()
            .map(|e| (e.value().joined_seq, *e.key()))
            .collect();
        peers.sort_unstable();
        peers.into_iter().map(|(_, id)| id).collect()
    }

    fn publish_membership(&self) {
        self.membership.send_replace(self.snapshot());
    }

    fn leave(&self, id: ParticipantId) {
        if self.peers.remove(&id).is_some() {
            tracing::info!(participant = %id, "participant left");
            self.publish_membership();
        }
    }
}

/// Shared in-memory session.
#[derive(Clone)]
pub struct LocalHub {
    inner: Arc<HubInner>,
}

impl Default for LocalHub {
    fn default() -> Self {
        Self::new(HubOptions::default())
    }
}

impl LocalHub {
    pub fn new(opts: HubOptions) -> Self {
        let (membership, _) = watch::channel(Vec::new());
        Self {
            inner: Arc::new(HubInner {
                opts,
                peers: DashMap::new(),
                next_id: AtomicI64::new(1),
                seq: AtomicU64::new(1),
                membership,
            }),
        }
    }

    /// Connect a new participant. Returns its endpoint and inbound frame queue.
    pub fn join(&self) -> (HubEndpoint, mpsc::Receiver<Bytes>) {
        let id = ParticipantId(self.inner.next_id.fetch_add(1, Ordering::Relaxed));
        let (tx, rx) = mpsc::channel(self.inner.opts.queue_capacity.max(1));
        let listeners = Arc::new(DashSet::new());

        let joined_seq = self.inner.seq.fetch_add(1, Ordering::Relaxed);
        self.inner.peers.insert(
            id,
            Peer {
                tx,
                listeners: Arc::clone(&listeners),
                joined_seq,
            },
        );
        tracing::info!(participant = %id, "participant joined");
        self.inner.publish_membership();

        let endpoint = HubEndpoint {
            hub: Arc::clone(&self.inner),
            id,
            listeners,
        };
        (endpoint, rx)
    }

    pub fn participants(&self) -> Vec<ParticipantId> {
        self.inner.snapshot()
    }

    /// Forcibly disconnect a participant.
    pub fn kick(&self, id: ParticipantId) {
        self.inner.leave(id);
    }
}

/// One participant's connection. Dropping it disconnects the participant.
pub struct HubEndpoint {
    hub: Arc<HubInner>,
    id: ParticipantId,
    listeners: Arc<DashSet<u8>>,
}

impl HubEndpoint {
    pub fn leave(self) {
        drop(self);
    }
}

impl Drop for HubEndpoint {
    fn drop(&mut self) {
        self.hub.leave(self.id);
    }
}

#[async_trait]
impl Transport for HubEndpoint {
    fn local_participant(&self) -> ParticipantId {
        self.id
    }

    fn participants(&self) -> Vec<ParticipantId> {
        self.hub.snapshot()
    }

    fn register_listener(&self, tag: u8) {
        self.listeners.insert(tag);
    }

    fn membership(&self) -> watch::Receiver<Vec<ParticipantId>> {
        self.hub.membership.subscribe()
    }

    async fn broadcast(&self, frame: Bytes, delivery: Delivery) -> Result<()> {
        if !self.hub.peers.contains_key(&self.id) {
            return Err(SyncError::Transport(format!(
                "participant {} is not connected",
                self.id
            )));
        }

        let Some(&tag) = frame.first() else {
            return Err(SyncError::Transport("empty frame".into()));
        };

        let targets: Vec<(ParticipantId, mpsc::Sender<Bytes>)> = self
            .hub
            .peers
            .iter()
            .filter(|e| self.hub.opts.loopback || *e.key() != self.id)
            .filter(|e| e.value().listeners.contains(&tag))
            .map(|e| (*e.key(), e.value().tx.clone()))
            .collect();

        tracing::trace!(
            from = %self.id,
            tag,
            priority = ?delivery.priority,
            targets = targets.len(),
            "broadcast"
        );

        match delivery.reliability {
            Reliability::Unreliable => {
                for (peer, tx) in targets {
                    if tx.try_send(frame.clone()).is_err() {
                        tracing::debug!(%peer, tag, "unreliable frame dropped");
                    }
                }
            }
            Reliability::Reliable => {
                let timeout_ms = self.hub.opts.reliable_timeout_ms;
                let mut futs = FuturesUnordered::new();
                for (peer, tx) in targets {
                    let frame = frame.clone();
                    futs.push(async move {
                        let delivered = if timeout_ms > 0 {
                            matches!(
                                timeout(Duration::from_millis(timeout_ms), tx.send(frame)).await,
                                Ok(Ok(()))
                            )
                        } else {
                            tx.send(frame).await.is_ok()
                        };
                        if !delivered {
                            tracing::warn!(%peer, tag, "reliable frame not delivered");
                        }
                    });
                }
                while futs.next().await.is_some() {}
            }
        }
        Ok(())
    }
}
