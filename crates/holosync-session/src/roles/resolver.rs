use std::sync::{Arc, Mutex, PoisonError};

use holosync_core::ParticipantId;

use super::{HostKind, RigIdentity};
use crate::transport::Transport;

/// Local role of this process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    /// Desktop editor (spectator composite).
    Editor,
    /// Device mounted on the spectator camera.
    CameraRig,
    /// Head-mounted user; the single source of truth for synchronized events.
    HoloLens,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Editor => "editor",
            Role::CameraRig => "camera_rig",
            Role::HoloLens => "hololens",
        }
    }
}

/// Find the authoritative participant by elimination.
///
/// `peer_operator` is the other fixed role as seen from here: the rig's
/// participant when running as the editor, the editor's participant when
/// running as the rig. Returns `None` while the answer is not yet knowable.
pub fn resolve_authority(
    host: HostKind,
    is_camera_rig: bool,
    local: ParticipantId,
    peer_operator: Option<ParticipantId>,
    participants: &[ParticipantId],
    quorum: usize,
) -> Option<ParticipantId> {
    if participants.len() < quorum {
        return None;
    }

    // A device that is not the rig can only be the head-mounted user.
    if host == HostKind::Device && !is_camera_rig {
        return Some(local);
    }

    let peer = peer_operator?;
    participants
        .iter()
        .copied()
        .find(|id| *id != local && *id != peer)
}

/// Session-scoped role resolver.
pub struct RoleResolver {
    host: HostKind,
    rig: RigIdentity,
    quorum: usize,
    transport: Arc<dyn Transport>,
    peer_operator: Mutex<Option<ParticipantId>>,
    authority: Mutex<Option<ParticipantId>>,
}

impl RoleResolver {
    pub fn new(
        host: HostKind,
        rig: RigIdentity,
        quorum: usize,
        transport: Arc<dyn Transport>,
    ) -> Self {
        Self {
            host,
            rig,
            quorum,
            transport,
            peer_operator: Mutex::new(None),
            authority: Mutex::new(None),
        }
    }

    pub fn host(&self) -> HostKind {
        self.host
    }

    pub fn local(&self) -> ParticipantId {
        self.transport.local_participant()
    }

    pub fn is_camera_rig(&self) -> bool {
        self.rig.is_camera_rig()
    }

    pub fn local_role(&self) -> Role {
        if self.is_camera_rig() {
            Role::CameraRig
        } else if self.host == HostKind::Editor {
            Role::Editor
        } else {
            Role::HoloLens
        }
    }

    /// Record (or clear) the other fixed role. Invalidates the cached authority.
    pub fn set_peer_operator(&self, peer: Option<ParticipantId>) {
        let mut slot = self.peer_operator.lock().unwrap_or_else(PoisonError::into_inner);
        if *slot != peer {
            tracing::info!(peer = ?peer.map(|p| p.get()), "peer operator updated");
            *slot = peer;
            drop(slot);
            self.invalidate();
        }
    }

    pub fn peer_operator(&self) -> Option<ParticipantId> {
        *self.peer_operator.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Authoritative participant, resolved once and cached until invalidated.
    pub fn authority(&self) -> Option<ParticipantId> {
        let mut cached = self.authority.lock().unwrap_or_else(PoisonError::into_inner);
        if cached.is_none() {
            *cached = resolve_authority(
                self.host,
                self.is_camera_rig(),
                self.local(),
                self.peer_operator(),
                &self.transport.participants(),
                self.quorum,
            );
            if let Some(id) = *cached {
                tracing::info!(
                    authority = %id,
                    local = %self.local(),
                    "authoritative participant resolved"
                );
            }
        }
        *cached
    }

    /// Authoritative participant when it is someone else.
    pub fn resolve_remote_authoritative(&self) -> Option<ParticipantId> {
        self.authority().filter(|id| *id != self.local())
    }

    pub fn is_authoritative_user(&self) -> bool {
        self.authority() == Some(self.local())
    }

    pub fn invalidate(&self) {
        let prev = self
            .authority
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(prev) = prev {
            tracing::info!(previous = %prev, "authoritative participant invalidated");
        }
    }

    /// Disconnect hook: drop cached state that names the departed participant.
    pub fn on_participant_left(&self, id: ParticipantId) {
        if self.peer_operator() == Some(id) {
            self.set_peer_operator(None);
            return;
        }
        let cached = *self.authority.lock().unwrap_or_else(PoisonError::into_inner);
        if cached == Some(id) {
            self.invalidate();
        }
    }
}
