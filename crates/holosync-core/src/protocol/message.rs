//! Typed message catalog.
//!
//! One variant per synchronized event. The receiver knows each schema from
//! the tag alone; nothing in the body describes its own layout.

use bytes::Bytes;
use glam::{Quat, Vec3};

use crate::error::{Result, SyncError};
use crate::protocol::codec::{MessageReader, MessageWriter, MAX_STRING_LEN};
use crate::protocol::ids::{MessageId, MessageIds};
use crate::protocol::transform::TransformUpdate;
use crate::protocol::ParticipantId;

/// Toolbar button identifier. Opaque to the protocol; the application owns
/// the meaning of each value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ToolType(pub u8);

#[derive(Debug, Clone, PartialEq)]
pub enum SyncMessage {
    PlayersReady,
    AnchorLocated,
    AdvanceIntroduction,
    EarthPlaced,
    SceneTransitionForward {
        scene: String,
        /// Name of the object the transition starts from; empty when none.
        source: String,
    },
    SceneTransitionBackward,
    ToggleOrbitScale,
    PoiGazeSelect {
        name: String,
        select: bool,
    },
    PoiAnimateDescription {
        name: String,
        property: String,
        value: bool,
    },
    PoiCardTapped {
        name: String,
    },
    HideAllCards,
    MoveCube,
    ContentPlaced,
    UpdateTransform(TransformUpdate),
    SelectToolbarButton(ToolType),
    ContentLocalScale(Vec3),
    ContentRotation(Quat),
    ToggleTools,
    ResetView,
}

impl SyncMessage {
    pub fn id(&self) -> MessageId {
        match self {
            SyncMessage::PlayersReady => MessageId::SpectatorViewPlayersReady,
            SyncMessage::AnchorLocated => MessageId::AnchorLocated,
            SyncMessage::AdvanceIntroduction => MessageId::AdvanceIntroduction,
            SyncMessage::EarthPlaced => MessageId::IntroductionEarthPlaced,
            SyncMessage::SceneTransitionForward { .. } => MessageId::SceneTransitionForward,
            SyncMessage::SceneTransitionBackward => MessageId::SceneTransitionBackward,
            SyncMessage::ToggleOrbitScale => MessageId::ToggleSolarSystemOrbitScale,
            SyncMessage::PoiGazeSelect { .. } => MessageId::PointOfInterestGazeSelect,
            SyncMessage::PoiAnimateDescription { .. } => {
                MessageId::PointOfInterestAnimateDescription
            }
            SyncMessage::PoiCardTapped { .. } => MessageId::PointOfInterestCardTapped,
            SyncMessage::HideAllCards => MessageId::HideAllCards,
            SyncMessage::MoveCube => MessageId::MoveCube,
            SyncMessage::ContentPlaced => MessageId::ContentPlaced,
            SyncMessage::UpdateTransform(_) => MessageId::UpdateTransform,
            SyncMessage::SelectToolbarButton(_) => MessageId::SelectToolbarButton,
            SyncMessage::ContentLocalScale(_) => MessageId::UpdateCurrentContentLocalScale,
            SyncMessage::ContentRotation(_) => MessageId::UpdateCurrentContentRotation,
            SyncMessage::ToggleTools => MessageId::ToggleTools,
            SyncMessage::ResetView => MessageId::ResetView,
        }
    }

    /// Reject string fields longer than the receiver accepts.
    pub fn check_lengths(&self) -> Result<()> {
        let strings: Vec<(&'static str, &str)> = match self {
            SyncMessage::SceneTransitionForward { scene, source } => {
                vec![("scene", scene.as_str()), ("source", source.as_str())]
            }
            SyncMessage::PoiGazeSelect { name, .. } | SyncMessage::PoiCardTapped { name } => {
                vec![("name", name.as_str())]
            }
            SyncMessage::PoiAnimateDescription { name, property, .. } => {
                vec![("name", name.as_str()), ("property", property.as_str())]
            }
            _ => Vec::new(),
        };
        match strings.into_iter().find(|(_, s)| s.len() > MAX_STRING_LEN) {
            Some((field, s)) => Err(SyncError::InvalidPayload(format!(
                "{} field `{field}` is {} bytes, limit {MAX_STRING_LEN}",
                self.id().name(),
                s.len()
            ))),
            None => Ok(()),
        }
    }

    /// Encode header + body.
    pub fn encode(&self, ids: &MessageIds, sender: ParticipantId) -> Bytes {
        let mut w = MessageWriter::new(ids.tag(self.id()), sender);
        match self {
            SyncMessage::SceneTransitionForward { scene, source } => {
                w.put_str(scene).put_str(source);
            }
            // select flag precedes the name on the wire
            SyncMessage::PoiGazeSelect { name, select } => {
                w.put_bool(*select).put_str(name);
            }
            SyncMessage::PoiAnimateDescription {
                name,
                property,
                value,
            } => {
                w.put_str(name).put_str(property).put_bool(*value);
            }
            SyncMessage::PoiCardTapped { name } => {
                w.put_str(name);
            }
            SyncMessage::UpdateTransform(update) => update.encode(&mut w),
            SyncMessage::SelectToolbarButton(tool) => {
                w.put_u8(tool.0);
            }
            SyncMessage::ContentLocalScale(v) => {
                w.put_vec3(*v);
            }
            SyncMessage::ContentRotation(q) => {
                w.put_quat(*q);
            }
            SyncMessage::PlayersReady
            | SyncMessage::AnchorLocated
            | SyncMessage::AdvanceIntroduction
            | SyncMessage::EarthPlaced
            | SyncMessage::SceneTransitionBackward
            | SyncMessage::ToggleOrbitScale
            | SyncMessage::HideAllCards
            | SyncMessage::MoveCube
            | SyncMessage::ContentPlaced
            | SyncMessage::ToggleTools
            | SyncMessage::ResetView => {}
        }
        w.finish()
    }

    /// Decode the body for `id`. The reader must be positioned just past the
    /// header. Returns `None` for reserved kinds, which carry no handler.
    pub fn decode(id: MessageId, r: &mut MessageReader) -> Result<Option<Self>> {
        let msg = match id {
            MessageId::SpectatorViewPlayersReady => SyncMessage::PlayersReady,
            MessageId::AnchorLocated => SyncMessage::AnchorLocated,
            MessageId::AdvanceIntroduction => SyncMessage::AdvanceIntroduction,
            MessageId::IntroductionEarthPlaced => SyncMessage::EarthPlaced,
            MessageId::SceneTransitionForward => {
                let scene = r.get_string()?;
                let source = r.get_string()?;
                SyncMessage::SceneTransitionForward { scene, source }
            }
            MessageId::SceneTransitionBackward => SyncMessage::SceneTransitionBackward,
            MessageId::ToggleSolarSystemOrbitScale => SyncMessage::ToggleOrbitScale,
            MessageId::PointOfInterestGazeSelect => {
                let select = r.get_bool()?;
                let name = r.get_string()?;
                SyncMessage::PoiGazeSelect { name, select }
            }
            MessageId::PointOfInterestAnimateDescription => {
                let name = r.get_string()?;
                let property = r.get_string()?;
                let value = r.get_bool()?;
                SyncMessage::PoiAnimateDescription {
                    name,
                    property,
                    value,
                }
            }
            MessageId::PointOfInterestCardTapped => SyncMessage::PoiCardTapped {
                name: r.get_string()?,
            },
            MessageId::HideAllCards => SyncMessage::HideAllCards,
            MessageId::UpdateCursorTransform => return Ok(None),
            MessageId::MoveCube => SyncMessage::MoveCube,
            MessageId::ContentPlaced => SyncMessage::ContentPlaced,
            MessageId::UpdateTransform => {
                SyncMessage::UpdateTransform(TransformUpdate::decode(r)?)
            }
            MessageId::SelectToolbarButton => {
                SyncMessage::SelectToolbarButton(ToolType(r.get_u8()?))
            }
            MessageId::UpdateCurrentContentLocalScale => {
                SyncMessage::ContentLocalScale(r.get_vec3()?)
            }
            MessageId::UpdateCurrentContentRotation => SyncMessage::ContentRotation(r.get_quat()?),
            MessageId::ToggleTools => SyncMessage::ToggleTools,
            MessageId::ResetView => SyncMessage::ResetView,
        };
        Ok(Some(msg))
    }
}
