use std::future::pending;

use tokio::sync::watch;
use tokio::time::{interval, sleep_until, Duration, Instant, MissedTickBehavior};

use holosync_core::error::{Result, SyncError};

use crate::context::SyncContext;
use crate::runtime::signalled;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadinessState {
    WaitingForQuorum,
    WaitingForAnchors,
    Ready,
}

impl ReadinessState {
    pub fn as_str(self) -> &'static str {
        match self {
            ReadinessState::WaitingForQuorum => "waiting_for_quorum",
            ReadinessState::WaitingForAnchors => "waiting_for_anchors",
            ReadinessState::Ready => "ready",
        }
    }
}

/// Snapshot of what the tracker conditions on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ReadinessView {
    pub participants: usize,
    pub peer_operator_known: bool,
    pub located: usize,
}

impl ReadinessView {
    pub fn observe(ctx: &SyncContext) -> Self {
        Self {
            participants: ctx.transport().participants().len(),
            peer_operator_known: ctx.roles().peer_operator().is_some(),
            located: ctx.readiness().located_count(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Waiting(ReadinessState),
    Advanced(ReadinessState),
}

/// `WaitingForQuorum -> [WaitingForAnchors ->] Ready`.
#[derive(Debug, Clone)]
pub struct ReadinessTracker {
    state: ReadinessState,
    quorum: usize,
    located_quorum: usize,
    require_anchors: bool,
}

impl ReadinessTracker {
    pub fn new(quorum: usize, located_quorum: usize, require_anchors: bool) -> Self {
        Self {
            state: ReadinessState::WaitingForQuorum,
            quorum,
            located_quorum,
            require_anchors,
        }
    }

    pub fn state(&self) -> ReadinessState {
        self.state
    }

    /// Advance as far as `view` allows in one call.
    pub fn poll(&mut self, view: &ReadinessView) -> Step {
        let before = self.state;
        loop {
            let next = match self.state {
                ReadinessState::WaitingForQuorum
                    if view.participants >= self.quorum && view.peer_operator_known =>
                {
                    if self.require_anchors {
                        ReadinessState::WaitingForAnchors
                    } else {
                        ReadinessState::Ready
                    }
                }
                ReadinessState::WaitingForAnchors if view.located >= self.located_quorum => {
                    ReadinessState::Ready
                }
                _ => break,
            };
            self.state = next;
        }

        if self.state == before {
            Step::Waiting(self.state)
        } else {
            Step::Advanced(self.state)
        }
    }
}

/// Block until spectator participants are ready.
///
/// The camera rig drives the tracker: it re-polls on every membership or
/// anchor change and at least every `poll_interval_ms`, and broadcasts
/// `PlayersReady` exactly once on reaching `Ready`. Every other role waits for
/// that message. Honors `wait_timeout_ms` and the `cancel` signal.
pub async fn wait_for_participants(
    ctx: &SyncContext,
    mut cancel: watch::Receiver<bool>,
) -> Result<ReadinessState> {
    let readiness = ctx.readiness();
    if readiness.is_ready() {
        return Ok(ReadinessState::Ready);
    }

    let session = &ctx.cfg().session;
    let deadline = (session.wait_timeout_ms > 0)
        .then(|| Instant::now() + Duration::from_millis(session.wait_timeout_ms));

    if !ctx.roles().is_camera_rig() {
        let mut ready = readiness.subscribe();
        loop {
            if *ready.borrow_and_update() {
                return Ok(ReadinessState::Ready);
            }
            tokio::select! {
                changed = ready.changed() => {
                    if changed.is_err() {
                        return Err(SyncError::Internal("readiness channel closed".into()));
                    }
                }
                _ = signalled(&mut cancel) => return Err(SyncError::Cancelled),
                _ = sleep_until_opt(deadline) => return Err(SyncError::Timeout("players ready")),
            }
        }
    }

    let mut tracker = ReadinessTracker::new(
        session.quorum,
        session.located_quorum,
        session.require_anchors,
    );
    let mut membership = ctx.transport().membership();
    let mut membership_open = true;
    let mut tick = interval(Duration::from_millis(session.poll_interval_ms));
    tick.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        let view = ReadinessView::observe(ctx);
        match tracker.poll(&view) {
            Step::Advanced(ReadinessState::Ready) => {
                tracing::info!(
                    participants = view.participants,
                    located = view.located,
                    "spectator participants ready"
                );
                ctx.broadcaster().send_players_ready().await?;
                return Ok(ReadinessState::Ready);
            }
            Step::Advanced(state) => {
                tracing::info!(state = state.as_str(), "readiness advanced");
            }
            Step::Waiting(state) => {
                tracing::debug!(
                    state = state.as_str(),
                    participants = view.participants,
                    peer_operator_known = view.peer_operator_known,
                    located = view.located,
                    "waiting for spectator participants"
                );
            }
        }

        tokio::select! {
            _ = tick.tick() => {}
            changed = membership.changed(), if membership_open => {
                if changed.is_err() {
                    membership_open = false;
                }
            }
            _ = readiness.changed() => {}
            _ = signalled(&mut cancel) => return Err(SyncError::Cancelled),
            _ = sleep_until_opt(deadline) => {
                return Err(SyncError::Timeout("spectator participants"));
            }
        }
    }
}

async fn sleep_until_opt(deadline: Option<Instant>) {
    match deadline {
        Some(d) => sleep_until(d).await,
        None => pending::<()>().await,
    }
}
