use glam::{Quat, Vec3};

use holosync_core::error::Result;
use holosync_core::protocol::{
    MessageId, SyncMessage, ToolType, TransformFlags, TransformTarget, TransformUpdate,
};

use crate::context::SyncContext;
use crate::scene::{fields_from_pose, ReferenceFrame, SceneHost};
use crate::transport::{Delivery, Priority};

/// Why a send was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Only the authoritative participant sends state changes.
    NotAuthoritative,
    /// Only the camera rig announces readiness.
    NotCameraRig,
    /// Readiness was already announced by this process.
    AlreadyReady,
}

impl SkipReason {
    pub fn as_str(self) -> &'static str {
        match self {
            SkipReason::NotAuthoritative => "not_authoritative",
            SkipReason::NotCameraRig => "not_camera_rig",
            SkipReason::AlreadyReady => "already_ready",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendOutcome {
    Sent { tag: u8, len: usize },
    Skipped(SkipReason),
}

impl SendOutcome {
    pub fn is_sent(&self) -> bool {
        matches!(self, SendOutcome::Sent { .. })
    }
}

#[derive(Debug, Clone, Copy)]
enum Gate {
    Authority,
    CameraRig,
    Open,
}

/// Substrate priority per message kind. Everything is reliable.
pub fn delivery_for(id: MessageId) -> Delivery {
    let priority = match id {
        MessageId::PointOfInterestAnimateDescription
        | MessageId::UpdateCursorTransform
        | MessageId::UpdateTransform
        | MessageId::SelectToolbarButton
        | MessageId::UpdateCurrentContentLocalScale
        | MessageId::UpdateCurrentContentRotation => Priority::Medium,
        MessageId::SpectatorViewPlayersReady
        | MessageId::AnchorLocated
        | MessageId::AdvanceIntroduction
        | MessageId::IntroductionEarthPlaced
        | MessageId::SceneTransitionForward
        | MessageId::SceneTransitionBackward
        | MessageId::ToggleSolarSystemOrbitScale
        | MessageId::PointOfInterestGazeSelect
        | MessageId::PointOfInterestCardTapped
        | MessageId::HideAllCards
        | MessageId::MoveCube
        | MessageId::ContentPlaced
        | MessageId::ToggleTools
        | MessageId::ResetView => Priority::High,
    };
    Delivery::reliable(priority)
}

/// Role-gated sender for every synchronized event.
#[derive(Clone)]
pub struct Broadcaster {
    ctx: SyncContext,
}

impl Broadcaster {
    pub fn new(ctx: SyncContext) -> Self {
        Self { ctx }
    }

    /// Camera rig only. Claims the local ready flag, then sends; only the
    /// call that flips the flag puts a frame on the wire.
    pub async fn send_players_ready(&self) -> Result<SendOutcome> {
        let id = MessageId::SpectatorViewPlayersReady;
        if let Some(reason) = self.refusal(Gate::CameraRig) {
            return Ok(self.skipped(id, reason));
        }
        if !self.ctx.readiness().mark_ready() {
            return Ok(self.skipped(id, SkipReason::AlreadyReady));
        }
        self.send(SyncMessage::PlayersReady, Gate::CameraRig).await
    }

    /// Record the local anchor as located and tell everyone. Not role gated.
    pub async fn announce_anchor_located(&self) -> Result<SendOutcome> {
        if self.ctx.readiness().record_located(self.ctx.local()) {
            tracing::info!(local = %self.ctx.local(), "local anchor located");
        }
        self.send(SyncMessage::AnchorLocated, Gate::Open).await
    }

    pub async fn send_advance_introduction(&self) -> Result<SendOutcome> {
        self.send(SyncMessage::AdvanceIntroduction, Gate::Authority).await
    }

    pub async fn send_earth_placed(&self) -> Result<SendOutcome> {
        self.send(SyncMessage::EarthPlaced, Gate::Authority).await
    }

    /// `source` is the point of interest the transition starts from.
    pub async fn send_scene_transition_forward(
        &self,
        scene: &str,
        source: Option<&str>,
    ) -> Result<SendOutcome> {
        let msg = SyncMessage::SceneTransitionForward {
            scene: scene.to_string(),
            source: source.unwrap_or_default().to_string(),
        };
        self.send(msg, Gate::Authority).await
    }

    pub async fn send_scene_transition_backward(&self) -> Result<SendOutcome> {
        self.send(SyncMessage::SceneTransitionBackward, Gate::Authority)
            .await
    }

    pub async fn send_toggle_orbit_scale(&self) -> Result<SendOutcome> {
        self.send(SyncMessage::ToggleOrbitScale, Gate::Authority).await
    }

    pub async fn send_poi_gaze_select(&self, name: &str, select: bool) -> Result<SendOutcome> {
        let msg = SyncMessage::PoiGazeSelect {
            name: name.to_string(),
            select,
        };
        self.send(msg, Gate::Authority).await
    }

    pub async fn send_poi_animate_description(
        &self,
        name: &str,
        property: &str,
        value: bool,
    ) -> Result<SendOutcome> {
        let msg = SyncMessage::PoiAnimateDescription {
            name: name.to_string(),
            property: property.to_string(),
            value,
        };
        self.send(msg, Gate::Authority).await
    }

    pub async fn send_poi_card_tapped(&self, name: &str) -> Result<SendOutcome> {
        let msg = SyncMessage::PoiCardTapped {
            name: name.to_string(),
        };
        self.send(msg, Gate::Authority).await
    }

    pub async fn send_hide_all_cards(&self) -> Result<SendOutcome> {
        self.send(SyncMessage::HideAllCards, Gate::Authority).await
    }

    pub async fn send_move_cube(&self) -> Result<SendOutcome> {
        self.send(SyncMessage::MoveCube, Gate::Authority).await
    }

    /// Sends the volume's final position and rotation, then `ContentPlaced`.
    pub async fn send_content_placed(&self, host: &dyn SceneHost) -> Result<SendOutcome> {
        if let Some(reason) = self.refusal(Gate::Authority) {
            return Ok(self.skipped(MessageId::ContentPlaced, reason));
        }
        let update = capture_update(
            host,
            TransformTarget::Volume,
            TransformFlags::POSITION | TransformFlags::ROTATION,
        );
        self.send(SyncMessage::UpdateTransform(update), Gate::Authority)
            .await?;
        self.send(SyncMessage::ContentPlaced, Gate::Authority).await
    }

    /// Capture `flags` of `target`'s current pose, relative to its reference
    /// frame, and send it.
    pub async fn send_update_transform(
        &self,
        target: TransformTarget,
        flags: TransformFlags,
        host: &dyn SceneHost,
    ) -> Result<SendOutcome> {
        let update = capture_update(host, target, flags);
        self.send_transform(update).await
    }

    /// Send an already frame-relative update as is.
    pub async fn send_transform(&self, update: TransformUpdate) -> Result<SendOutcome> {
        self.send(SyncMessage::UpdateTransform(update), Gate::Authority)
            .await
    }

    pub async fn send_select_toolbar_button(&self, tool: ToolType) -> Result<SendOutcome> {
        self.send(SyncMessage::SelectToolbarButton(tool), Gate::Authority)
            .await
    }

    pub async fn send_content_local_scale(&self, scale: Vec3) -> Result<SendOutcome> {
        self.send(SyncMessage::ContentLocalScale(scale), Gate::Authority)
            .await
    }

    pub async fn send_content_rotation(&self, rotation: Quat) -> Result<SendOutcome> {
        self.send(SyncMessage::ContentRotation(rotation), Gate::Authority)
            .await
    }

    pub async fn send_toggle_tools(&self) -> Result<SendOutcome> {
        self.send(SyncMessage::ToggleTools, Gate::Authority).await
    }

    pub async fn send_reset_view(&self) -> Result<SendOutcome> {
        self.send(SyncMessage::ResetView, Gate::Authority).await
    }

    fn refusal(&self, gate: Gate) -> Option<SkipReason> {
        match gate {
            Gate::Open => None,
            Gate::CameraRig => (!self.ctx.is_camera_rig()).then_some(SkipReason::NotCameraRig),
            Gate::Authority => {
                (!self.ctx.is_authoritative_user()).then_some(SkipReason::NotAuthoritative)
            }
        }
    }

    fn skipped(&self, id: MessageId, reason: SkipReason) -> SendOutcome {
        self.ctx
            .metrics()
            .sends_skipped
            .inc(&[("msg", id.name()), ("reason", reason.as_str())]);
        tracing::debug!(msg = id.name(), reason = reason.as_str(), "send skipped");
        SendOutcome::Skipped(reason)
    }

    async fn send(&self, msg: SyncMessage, gate: Gate) -> Result<SendOutcome> {
        msg.check_lengths()?;
        let id = msg.id();
        if let Some(reason) = self.refusal(gate) {
            return Ok(self.skipped(id, reason));
        }

        let tag = self.ctx.ids().tag(id);
        let frame = msg.encode(self.ctx.ids(), self.ctx.local());
        let len = frame.len();
        let delivery = delivery_for(id);

        self.ctx.transport().broadcast(frame, delivery).await?;

        self.ctx.metrics().frames_sent.inc(&[("msg", id.name())]);
        tracing::debug!(
            msg = id.name(),
            tag,
            len,
            priority = ?delivery.priority,
            "sent"
        );
        Ok(SendOutcome::Sent { tag, len })
    }
}

fn capture_update(
    host: &dyn SceneHost,
    target: TransformTarget,
    flags: TransformFlags,
) -> TransformUpdate {
    let pose = host.pose(target);
    let frame = host.reference_frame(ReferenceFrame::for_target(target));
    TransformUpdate {
        target,
        fields: fields_from_pose(&pose, &frame, flags),
    }
}
