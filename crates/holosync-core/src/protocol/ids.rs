//! Message tag space.
//!
//! Tags are contiguous from a substrate-assigned base: the substrate reserves
//! every value below it for its own traffic. Offsets never move between
//! revisions; retired or unused kinds keep their slot.

use crate::error::{Result, SyncError};

/// First tag available to applications on the sharing substrate.
pub const DEFAULT_MESSAGE_BASE: u8 = 134;

/// Message kinds, by offset from the base.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum MessageId {
    SpectatorViewPlayersReady = 0,
    AnchorLocated,
    AdvanceIntroduction,
    IntroductionEarthPlaced,
    SceneTransitionForward,
    SceneTransitionBackward,
    ToggleSolarSystemOrbitScale,
    PointOfInterestGazeSelect,
    PointOfInterestAnimateDescription,
    PointOfInterestCardTapped,
    HideAllCards,
    /// Reserved: cursor pose travels as `UpdateTransform` with the cursor target.
    UpdateCursorTransform,
    MoveCube,
    ContentPlaced,
    UpdateTransform,
    SelectToolbarButton,
    UpdateCurrentContentLocalScale,
    UpdateCurrentContentRotation,
    ToggleTools,
    ResetView,
}

impl MessageId {
    /// Number of kinds (`Max` in the tag enumeration).
    pub const COUNT: u8 = 20;

    pub const ALL: [MessageId; MessageId::COUNT as usize] = [
        MessageId::SpectatorViewPlayersReady,
        MessageId::AnchorLocated,
        MessageId::AdvanceIntroduction,
        MessageId::IntroductionEarthPlaced,
        MessageId::SceneTransitionForward,
        MessageId::SceneTransitionBackward,
        MessageId::ToggleSolarSystemOrbitScale,
        MessageId::PointOfInterestGazeSelect,
        MessageId::PointOfInterestAnimateDescription,
        MessageId::PointOfInterestCardTapped,
        MessageId::HideAllCards,
        MessageId::UpdateCursorTransform,
        MessageId::MoveCube,
        MessageId::ContentPlaced,
        MessageId::UpdateTransform,
        MessageId::SelectToolbarButton,
        MessageId::UpdateCurrentContentLocalScale,
        MessageId::UpdateCurrentContentRotation,
        MessageId::ToggleTools,
        MessageId::ResetView,
    ];

    pub fn offset(self) -> u8 {
        self as u8
    }

    pub fn from_offset(offset: u8) -> Option<Self> {
        Self::ALL.get(usize::from(offset)).copied()
    }

    /// Reserved kinds have a listener but no handler.
    pub fn is_reserved(self) -> bool {
        matches!(self, MessageId::UpdateCursorTransform)
    }

    /// Stable name for logs and metric labels.
    pub fn name(self) -> &'static str {
        match self {
            MessageId::SpectatorViewPlayersReady => "players_ready",
            MessageId::AnchorLocated => "anchor_located",
            MessageId::AdvanceIntroduction => "advance_introduction",
            MessageId::IntroductionEarthPlaced => "earth_placed",
            MessageId::SceneTransitionForward => "scene_forward",
            MessageId::SceneTransitionBackward => "scene_backward",
            MessageId::ToggleSolarSystemOrbitScale => "toggle_orbit_scale",
            MessageId::PointOfInterestGazeSelect => "poi_gaze_select",
            MessageId::PointOfInterestAnimateDescription => "poi_animate_description",
            MessageId::PointOfInterestCardTapped => "poi_card_tapped",
            MessageId::HideAllCards => "hide_all_cards",
            MessageId::UpdateCursorTransform => "cursor_transform",
            MessageId::MoveCube => "move_cube",
            MessageId::ContentPlaced => "content_placed",
            MessageId::UpdateTransform => "update_transform",
            MessageId::SelectToolbarButton => "select_toolbar_button",
            MessageId::UpdateCurrentContentLocalScale => "content_local_scale",
            MessageId::UpdateCurrentContentRotation => "content_rotation",
            MessageId::ToggleTools => "toggle_tools",
            MessageId::ResetView => "reset_view",
        }
    }
}

/// Tag mapping for one session (`[base, base + COUNT)`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MessageIds {
    base: u8,
}

impl Default for MessageIds {
    fn default() -> Self {
        Self {
            base: DEFAULT_MESSAGE_BASE,
        }
    }
}

impl MessageIds {
    pub fn new(base: u8) -> Result<Self> {
        if base.checked_add(MessageId::COUNT - 1).is_none() {
            return Err(SyncError::Config(format!(
                "message base {base} leaves no room for {} tags",
                MessageId::COUNT
            )));
        }
        Ok(Self { base })
    }

    pub fn base(&self) -> u8 {
        self.base
    }

    pub fn tag(&self, id: MessageId) -> u8 {
        self.base + id.offset()
    }

    /// Resolve a wire tag; `None` when outside this session's range.
    pub fn id(&self, tag: u8) -> Option<MessageId> {
        tag.checked_sub(self.base).and_then(MessageId::from_offset)
    }

    /// Every tag a participant must listen on, reserved ones included.
    pub fn tags(&self) -> impl Iterator<Item = u8> + '_ {
        MessageId::ALL.iter().map(move |id| self.tag(*id))
    }
}
