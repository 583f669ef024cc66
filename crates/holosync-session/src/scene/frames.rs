//! Reference frames for networked poses.
//!
//! World space differs between devices until anchors converge, so poses
//! travel relative to a shared reference: the spatial anchor for the volume
//! and tools, the content volume for the cursor.

use glam::{Affine3A, Quat, Vec3};

use holosync_core::protocol::{TransformFields, TransformFlags, TransformTarget};

/// Which local object a target's pose is expressed against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReferenceFrame {
    /// Shared spatial anchor.
    Anchor,
    /// Content volume.
    Volume,
}

impl ReferenceFrame {
    pub fn for_target(target: TransformTarget) -> Self {
        match target {
            TransformTarget::Volume | TransformTarget::Tools => ReferenceFrame::Anchor,
            TransformTarget::Cursor => ReferenceFrame::Volume,
        }
    }
}

/// World transform of a reference object.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Frame {
    rotation: Quat,
    to_world: Affine3A,
    to_local: Affine3A,
}

impl Default for Frame {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Frame {
    pub const IDENTITY: Frame = Frame {
        rotation: Quat::IDENTITY,
        to_world: Affine3A::IDENTITY,
        to_local: Affine3A::IDENTITY,
    };

    pub fn new(translation: Vec3, rotation: Quat, scale: Vec3) -> Self {
        let to_world = Affine3A::from_scale_rotation_translation(scale, rotation, translation);
        Self {
            rotation,
            to_world,
            to_local: to_world.inverse(),
        }
    }

    /// Reference objects sit at the scene root, so local scale is world scale.
    pub fn from_pose(pose: &Pose) -> Self {
        Self::new(pose.position, pose.rotation, pose.local_scale)
    }

    /// World point -> frame-local point (scale included).
    pub fn to_local_point(&self, world: Vec3) -> Vec3 {
        self.to_local.transform_point3(world)
    }

    pub fn to_world_point(&self, local: Vec3) -> Vec3 {
        self.to_world.transform_point3(local)
    }

    pub fn to_local_rotation(&self, world: Quat) -> Quat {
        (self.rotation.inverse() * world).normalize()
    }

    pub fn to_world_rotation(&self, local: Quat) -> Quat {
        (self.rotation * local).normalize()
    }
}

/// Pose of a synchronized object as the host sees it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pose {
    /// World position.
    pub position: Vec3,
    /// World rotation.
    pub rotation: Quat,
    pub local_position: Vec3,
    pub local_rotation: Quat,
    pub local_scale: Vec3,
}

impl Default for Pose {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            local_position: Vec3::ZERO,
            local_rotation: Quat::IDENTITY,
            local_scale: Vec3::ONE,
        }
    }
}

impl Pose {
    /// Forward axis (+Z).
    pub fn forward(&self) -> Vec3 {
        self.rotation * Vec3::Z
    }

    /// Merge a patch; unset fields keep their current value.
    pub fn apply(&mut self, patch: &PosePatch) {
        if let Some(v) = patch.position {
            self.position = v;
        }
        if let Some(q) = patch.rotation {
            self.rotation = q;
        }
        if let Some(v) = patch.local_position {
            self.local_position = v;
        }
        if let Some(q) = patch.local_rotation {
            self.local_rotation = q;
        }
        if let Some(v) = patch.local_scale {
            self.local_scale = v;
        }
    }
}

/// Receiver-side update with world-space fields already resolved.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PosePatch {
    pub position: Option<Vec3>,
    pub rotation: Option<Quat>,
    pub local_position: Option<Vec3>,
    pub local_rotation: Option<Quat>,
    pub local_scale: Option<Vec3>,
}

impl PosePatch {
    /// Wire fields -> world patch against the receiver's own reference frame.
    pub fn from_wire(fields: &TransformFields, frame: &Frame) -> Self {
        Self {
            position: fields.position.map(|p| frame.to_world_point(p)),
            rotation: fields.rotation.map(|q| frame.to_world_rotation(q)),
            local_position: fields.local_position,
            local_rotation: fields.local_rotation,
            local_scale: fields.local_scale,
        }
    }
}

/// Select `flags`-worth of fields from a world pose, frame-relative.
pub fn fields_from_pose(
    pose: &Pose,
    frame: &Frame,
    flags: TransformFlags,
) -> TransformFields {
    TransformFields {
        position: flags
            .contains(TransformFlags::POSITION)
            .then(|| frame.to_local_point(pose.position)),
        rotation: flags
            .contains(TransformFlags::ROTATION)
            .then(|| frame.to_local_rotation(pose.rotation)),
        local_position: flags
            .contains(TransformFlags::LOCAL_POSITION)
            .then_some(pose.local_position),
        local_rotation: flags
            .contains(TransformFlags::LOCAL_ROTATION)
            .then_some(pose.local_rotation),
        local_scale: flags
            .contains(TransformFlags::LOCAL_SCALE)
            .then_some(pose.local_scale),
    }
}

/// Gaze ray of a head pose.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GazeRay {
    pub origin: Vec3,
    pub direction: Vec3,
}

pub fn gaze_ray(head: &Pose) -> GazeRay {
    GazeRay {
        origin: head.position,
        direction: head.forward(),
    }
}
