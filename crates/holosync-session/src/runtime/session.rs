use bytes::Bytes;
use tokio::sync::{mpsc, watch};

use holosync_core::ParticipantId;

use super::signalled;
use crate::context::SyncContext;
use crate::dispatch::{Dispatched, Dispatcher};
use crate::scene::SceneHost;

/// Owns the local scene for the lifetime of a sharing session.
pub struct SyncSession<H> {
    ctx: SyncContext,
    dispatcher: Dispatcher,
    host: H,
}

impl<H: SceneHost> SyncSession<H> {
    pub fn new(ctx: SyncContext, host: H) -> Self {
        let dispatcher = ctx.dispatcher();
        Self {
            ctx,
            dispatcher,
            host,
        }
    }

    /// Dispatch one frame. Malformed frames are logged and dropped.
    fn handle_frame(&mut self, frame: Bytes) -> Option<Dispatched> {
        match self.dispatcher.dispatch(frame, &mut self.host) {
            Ok(outcome) => Some(outcome),
            Err(e) => {
                tracing::warn!(code = e.kind().as_str(), error = %e, "dropping malformed frame");
                None
            }
        }
    }

    /// Drain `inbound` until it closes or `shutdown` reads `true`, then hand
    /// the scene back. Queued frames are applied before shutdown is honored.
    pub async fn run(
        mut self,
        mut inbound: mpsc::Receiver<Bytes>,
        mut shutdown: watch::Receiver<bool>,
    ) -> H {
        let mut membership = self.ctx.transport().membership();
        let mut known = membership.borrow_and_update().clone();
        let mut membership_open = true;
        self.record_participants(known.len());

        loop {
            tokio::select! {
                biased;
                changed = membership.changed(), if membership_open => {
                    if changed.is_err() {
                        membership_open = false;
                        continue;
                    }
                    let now = membership.borrow_and_update().clone();
                    self.on_membership(&known, &now);
                    known = now;
                }
                frame = inbound.recv() => match frame {
                    Some(frame) => {
                        self.handle_frame(frame);
                    }
                    None => {
                        tracing::info!("inbound queue closed");
                        break;
                    }
                },
                _ = signalled(&mut shutdown) => {
                    tracing::info!("session shutdown requested");
                    break;
                }
            }
        }

        self.host
    }

    fn on_membership(&self, before: &[ParticipantId], now: &[ParticipantId]) {
        for id in before.iter().filter(|id| !now.contains(id)) {
            tracing::info!(participant = %id, "participant departed");
            self.ctx.roles().on_participant_left(*id);
        }
        self.record_participants(now.len());
    }

    fn record_participants(&self, n: usize) {
        let n = i64::try_from(n).unwrap_or(i64::MAX);
        self.ctx.metrics().participants.set(&[], n);
    }
}
