use std::time::Instant;

use bytes::Bytes;

use holosync_core::error::Result;
use holosync_core::protocol::{MessageId, MessageReader, SyncMessage};
use holosync_core::ParticipantId;

use crate::context::SyncContext;
use crate::scene::{PosePatch, ReferenceFrame, SceneHost};

/// What happened to one inbound frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatched {
    Applied(MessageId),
    /// Our own frame came back; dropped before any handler ran.
    SelfEcho(MessageId),
    /// Tag outside the catalog.
    Ignored(u8),
    /// Listened-on tag without a handler.
    Reserved(MessageId),
    /// Named target is not in the local scene; nothing was applied.
    TargetMissing(MessageId),
}

impl Dispatched {
    fn drop_reason(&self) -> Option<&'static str> {
        match self {
            Dispatched::Applied(_) => None,
            Dispatched::SelfEcho(_) => Some("self_echo"),
            Dispatched::Ignored(_) => Some("unknown_tag"),
            Dispatched::Reserved(_) => Some("reserved"),
            Dispatched::TargetMissing(_) => Some("target_missing"),
        }
    }
}

/// Decodes inbound frames and applies them to the local scene.
#[derive(Clone)]
pub struct Dispatcher {
    ctx: SyncContext,
}

impl Dispatcher {
    pub fn new(ctx: SyncContext) -> Self {
        Self { ctx }
    }

    pub fn dispatch(&self, frame: Bytes, host: &mut dyn SceneHost) -> Result<Dispatched> {
        let started = Instant::now();
        let result = self.dispatch_frame(frame, host);
        let metrics = self.ctx.metrics();

        match &result {
            Ok(Dispatched::Applied(id)) => {
                metrics.frames_applied.inc(&[("msg", id.name())]);
                metrics
                    .dispatch_duration
                    .observe(&[("msg", id.name())], started.elapsed());
            }
            Ok(other) => {
                if let Some(reason) = other.drop_reason() {
                    metrics.frames_dropped.inc(&[("reason", reason)]);
                }
            }
            Err(e) => {
                metrics.decode_errors.inc(&[("code", e.kind().as_str())]);
            }
        }
        result
    }

    fn dispatch_frame(&self, frame: Bytes, host: &mut dyn SceneHost) -> Result<Dispatched> {
        let mut r = MessageReader::new(frame)?;
        let tag = r.tag();
        let Some(id) = self.ctx.ids().id(tag) else {
            tracing::trace!(tag, "frame outside the catalog ignored");
            return Ok(Dispatched::Ignored(tag));
        };

        let sender = r.sender();
        if sender == self.ctx.local() {
            return Ok(Dispatched::SelfEcho(id));
        }

        let Some(msg) = SyncMessage::decode(id, &mut r)? else {
            return Ok(Dispatched::Reserved(id));
        };
        if r.remaining() > 0 {
            tracing::debug!(msg = id.name(), trailing = r.remaining(), "trailing bytes after body");
        }

        self.apply(sender, msg, host)
    }

    fn apply(
        &self,
        sender: ParticipantId,
        msg: SyncMessage,
        host: &mut dyn SceneHost,
    ) -> Result<Dispatched> {
        let id = msg.id();
        tracing::debug!(msg = id.name(), %sender, "applying");

        match msg {
            SyncMessage::PlayersReady => {
                if self.ctx.readiness().mark_ready() {
                    tracing::info!(%sender, "spectator participants ready");
                }
            }
            SyncMessage::AnchorLocated => {
                if self.ctx.readiness().record_located(sender) {
                    tracing::info!(%sender, "remote anchor located");
                }
            }
            SyncMessage::AdvanceIntroduction => host.advance_introduction(),
            SyncMessage::EarthPlaced => host.earth_placed(),
            SyncMessage::SceneTransitionForward { scene, source } => {
                let Some(poi) = host.find_point_of_interest(&source) else {
                    tracing::info!(%scene, %source, "transition source not found");
                    return Ok(Dispatched::TargetMissing(id));
                };
                host.load_next_scene(&scene, &poi);
            }
            SyncMessage::SceneTransitionBackward => host.go_back(),
            SyncMessage::ToggleOrbitScale => host.toggle_orbit_scale(),
            SyncMessage::PoiGazeSelect { name, select } => {
                let Some(poi) = host.find_point_of_interest(&name) else {
                    tracing::info!(%name, select, "gaze target not found");
                    return Ok(Dispatched::TargetMissing(id));
                };
                host.gaze_select(&poi, select);
            }
            SyncMessage::PoiAnimateDescription {
                name,
                property,
                value,
            } => {
                let Some(description) = host.find_description(&name) else {
                    tracing::warn!(%name, %property, "description not found");
                    return Ok(Dispatched::TargetMissing(id));
                };
                host.animate_description(&description, &property, value);
            }
            SyncMessage::PoiCardTapped { name } => {
                let Some(card) = host.find_card(&name) else {
                    tracing::warn!(poi = %name, "card not found");
                    return Ok(Dispatched::TargetMissing(id));
                };
                host.tap_card(&card);
            }
            SyncMessage::HideAllCards => host.hide_all_cards(),
            SyncMessage::MoveCube => host.move_cube(),
            SyncMessage::ContentPlaced => host.content_placed(),
            SyncMessage::UpdateTransform(update) => {
                let frame = host.reference_frame(ReferenceFrame::for_target(update.target));
                let patch = PosePatch::from_wire(&update.fields, &frame);
                host.apply_pose(update.target, &patch);
            }
            SyncMessage::SelectToolbarButton(tool) => host.select_tool(tool),
            SyncMessage::ContentLocalScale(scale) => host.set_content_local_scale(scale),
            SyncMessage::ContentRotation(rotation) => host.set_content_rotation(rotation),
            SyncMessage::ToggleTools => host.toggle_tools(),
            SyncMessage::ResetView => host.reset_view(),
        }

        Ok(Dispatched::Applied(id))
    }
}
