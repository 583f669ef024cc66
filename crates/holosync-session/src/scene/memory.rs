//! In-memory scene that records every applied effect.
//!
//! Backs the demo binary and integration tests; a real application
//! implements `SceneHost` over its own scene graph.

use std::collections::HashMap;

use glam::{Quat, Vec3};

use holosync_core::protocol::{ToolType, TransformTarget};

use super::{Frame, Pose, PosePatch, ReferenceFrame, SceneHost, SceneObject};

/// One applied effect, in application order.
#[derive(Debug, Clone, PartialEq)]
pub enum SceneEvent {
    AdvanceIntroduction,
    EarthPlaced,
    LoadNextScene { scene: String, source: String },
    GoBack,
    ToggleOrbitScale,
    GazeSelect { poi: String, select: bool },
    AnimateDescription {
        description: String,
        property: String,
        value: bool,
    },
    TapCard { card: String },
    HideAllCards,
    MoveCube,
    ContentPlaced,
    SelectTool(ToolType),
    ContentLocalScale(Vec3),
    ContentRotation(Quat),
    ToggleTools,
    ResetView,
    Pose(TransformTarget),
}

#[derive(Debug, Default)]
pub struct MemoryScene {
    next_id: u64,
    points_of_interest: HashMap<String, SceneObject>,
    cards: HashMap<String, SceneObject>,
    descriptions: HashMap<String, SceneObject>,
    poses: HashMap<TransformTarget, Pose>,
    frames: HashMap<ReferenceFrame, Frame>,
    content_local_scale: Option<Vec3>,
    content_rotation: Option<Quat>,
    events: Vec<SceneEvent>,
}

impl MemoryScene {
    pub fn new() -> Self {
        Self::default()
    }

    fn object(&mut self, name: String) -> SceneObject {
        self.next_id += 1;
        SceneObject::new(self.next_id, name)
    }

    /// Adds a point of interest together with its card (`<name>Card`).
    pub fn with_point_of_interest(mut self, name: &str) -> Self {
        let poi = self.object(name.to_string());
        let card = self.object(format!("{name}Card"));
        self.points_of_interest.insert(name.to_string(), poi);
        self.cards.insert(name.to_string(), card);
        self
    }

    pub fn with_description(mut self, name: &str) -> Self {
        let description = self.object(name.to_string());
        self.descriptions.insert(name.to_string(), description);
        self
    }

    pub fn with_pose(mut self, target: TransformTarget, pose: Pose) -> Self {
        self.poses.insert(target, pose);
        self
    }

    pub fn with_frame(mut self, kind: ReferenceFrame, frame: Frame) -> Self {
        self.frames.insert(kind, frame);
        self
    }

    pub fn set_pose(&mut self, target: TransformTarget, pose: Pose) {
        self.poses.insert(target, pose);
    }

    pub fn content_local_scale(&self) -> Option<Vec3> {
        self.content_local_scale
    }

    pub fn content_rotation(&self) -> Option<Quat> {
        self.content_rotation
    }

    pub fn events(&self) -> &[SceneEvent] {
        &self.events
    }
}

impl SceneHost for MemoryScene {
    fn find_point_of_interest(&self, name: &str) -> Option<SceneObject> {
        self.points_of_interest.get(name).cloned()
    }

    fn find_card(&self, poi_name: &str) -> Option<SceneObject> {
        self.cards.get(poi_name).cloned()
    }

    fn find_description(&self, name: &str) -> Option<SceneObject> {
        self.descriptions.get(name).cloned()
    }

    fn advance_introduction(&mut self) {
        self.events.push(SceneEvent::AdvanceIntroduction);
    }

    fn earth_placed(&mut self) {
        self.events.push(SceneEvent::EarthPlaced);
    }

    fn load_next_scene(&mut self, scene: &str, source: &SceneObject) {
        self.events.push(SceneEvent::LoadNextScene {
            scene: scene.to_string(),
            source: source.name.clone(),
        });
    }

    fn go_back(&mut self) {
        self.events.push(SceneEvent::GoBack);
    }

    fn toggle_orbit_scale(&mut self) {
        self.events.push(SceneEvent::ToggleOrbitScale);
    }

    fn gaze_select(&mut self, poi: &SceneObject, select: bool) {
        self.events.push(SceneEvent::GazeSelect {
            poi: poi.name.clone(),
            select,
        });
    }

    fn animate_description(&mut self, description: &SceneObject, property: &str, value: bool) {
        self.events.push(SceneEvent::AnimateDescription {
            description: description.name.clone(),
            property: property.to_string(),
            value,
        });
    }

    fn tap_card(&mut self, card: &SceneObject) {
        self.events.push(SceneEvent::TapCard {
            card: card.name.clone(),
        });
    }

    fn hide_all_cards(&mut self) {
        self.events.push(SceneEvent::HideAllCards);
    }

    fn move_cube(&mut self) {
        self.events.push(SceneEvent::MoveCube);
    }

    fn content_placed(&mut self) {
        self.events.push(SceneEvent::ContentPlaced);
    }

    fn select_tool(&mut self, tool: ToolType) {
        self.events.push(SceneEvent::SelectTool(tool));
    }

    fn set_content_local_scale(&mut self, scale: Vec3) {
        self.content_local_scale = Some(scale);
        self.events.push(SceneEvent::ContentLocalScale(scale));
    }

    fn set_content_rotation(&mut self, rotation: Quat) {
        self.content_rotation = Some(rotation);
        self.events.push(SceneEvent::ContentRotation(rotation));
    }

    fn toggle_tools(&mut self) {
        self.events.push(SceneEvent::ToggleTools);
    }

    fn reset_view(&mut self) {
        self.events.push(SceneEvent::ResetView);
    }

    fn pose(&self, target: TransformTarget) -> Pose {
        self.poses.get(&target).copied().unwrap_or_default()
    }

    fn reference_frame(&self, frame: ReferenceFrame) -> Frame {
        self.frames.get(&frame).copied().unwrap_or_default()
    }

    fn apply_pose(&mut self, target: TransformTarget, patch: &PosePatch) {
        self.poses.entry(target).or_default().apply(patch);
        self.events.push(SceneEvent::Pose(target));
    }
}
