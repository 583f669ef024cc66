//! Application seam: the local scene the protocol reads poses from and
//! applies replicated actions to.
//!
//! Scene graph traversal, rendering and UI live behind `SceneHost`. The
//! dispatcher looks named targets up through it and reports a miss instead
//! of guessing.

pub mod frames;
pub mod memory;

use glam::{Quat, Vec3};

use holosync_core::protocol::{ToolType, TransformTarget};

pub use frames::{fields_from_pose, gaze_ray, Frame, GazeRay, Pose, PosePatch, ReferenceFrame};
pub use memory::{MemoryScene, SceneEvent};

/// Handle to a named object in the host's scene.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SceneObject {
    pub id: u64,
    pub name: String,
}

impl SceneObject {
    pub fn new(id: u64, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }
}

/// Local side effects for replicated events. Implementations must not
/// broadcast from inside these calls.
pub trait SceneHost: Send + Sync {
    /// Point of interest by name (the name the sender saw for the same object).
    fn find_point_of_interest(&self, name: &str) -> Option<SceneObject>;
    /// Card belonging to the named point of interest.
    fn find_card(&self, poi_name: &str) -> Option<SceneObject>;
    /// Animated description panel by name.
    fn find_description(&self, name: &str) -> Option<SceneObject>;

    fn advance_introduction(&mut self);
    /// Unlock tools and clear cursor tool state.
    fn earth_placed(&mut self);
    fn load_next_scene(&mut self, scene: &str, source: &SceneObject);
    fn go_back(&mut self);
    fn toggle_orbit_scale(&mut self);
    fn gaze_select(&mut self, poi: &SceneObject, select: bool);
    fn animate_description(&mut self, description: &SceneObject, property: &str, value: bool);
    fn tap_card(&mut self, card: &SceneObject);
    fn hide_all_cards(&mut self);
    /// Lock tools and pick the content volume up for placement.
    fn move_cube(&mut self);
    fn content_placed(&mut self);
    fn select_tool(&mut self, tool: ToolType);
    fn set_content_local_scale(&mut self, scale: Vec3);
    fn set_content_rotation(&mut self, rotation: Quat);
    fn toggle_tools(&mut self);
    fn reset_view(&mut self);

    /// Current pose of a synchronized object.
    fn pose(&self, target: TransformTarget) -> Pose;
    /// World transform of a locally anchored reference object.
    fn reference_frame(&self, frame: ReferenceFrame) -> Frame;
    fn apply_pose(&mut self, target: TransformTarget, patch: &PosePatch);
}
