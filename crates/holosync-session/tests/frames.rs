#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use std::f32::consts::FRAC_PI_2;

use glam::{Quat, Vec3};

use holosync_core::protocol::{TransformFlags, TransformTarget};
use holosync_session::scene::{
    fields_from_pose, gaze_ray, Frame, Pose, PosePatch, ReferenceFrame,
};

#[test]
fn targets_map_to_their_reference_frames() {
    assert_eq!(ReferenceFrame::for_target(TransformTarget::Volume), ReferenceFrame::Anchor);
    assert_eq!(ReferenceFrame::for_target(TransformTarget::Tools), ReferenceFrame::Anchor);
    assert_eq!(ReferenceFrame::for_target(TransformTarget::Cursor), ReferenceFrame::Volume);
}

#[test]
fn points_and_rotations_convert_both_ways() {
    let frame = Frame::new(
        Vec3::new(2.0, 0.0, -1.0),
        Quat::from_rotation_y(FRAC_PI_2),
        Vec3::splat(2.0),
    );
    let world = Vec3::new(3.0, 4.0, 5.0);
    let back = frame.to_world_point(frame.to_local_point(world));
    assert!(back.abs_diff_eq(world, 1e-4), "{back:?}");

    let q = Quat::from_rotation_x(0.4);
    let back = frame.to_world_rotation(frame.to_local_rotation(q));
    assert!(back.abs_diff_eq(q, 1e-5));
}

#[test]
fn scaled_volume_frame_shrinks_cursor_offsets() {
    let volume = Pose {
        position: Vec3::new(0.0, 0.0, 2.0),
        local_scale: Vec3::splat(0.5),
        ..Pose::default()
    };
    let frame = Frame::from_pose(&volume);
    let local = frame.to_local_point(Vec3::new(0.5, 0.0, 2.0));
    assert!(local.abs_diff_eq(Vec3::new(1.0, 0.0, 0.0), 1e-5));
}

#[test]
fn only_flagged_fields_are_captured() {
    let pose = Pose {
        position: Vec3::ONE,
        rotation: Quat::from_rotation_z(0.3),
        local_position: Vec3::X,
        local_rotation: Quat::from_rotation_y(0.1),
        local_scale: Vec3::splat(4.0),
    };
    let fields = fields_from_pose(
        &pose,
        &Frame::IDENTITY,
        TransformFlags::POSITION | TransformFlags::LOCAL_SCALE,
    );
    assert_eq!(fields.position, Some(Vec3::ONE));
    assert_eq!(fields.local_scale, Some(Vec3::splat(4.0)));
    assert_eq!(fields.rotation, None);
    assert_eq!(fields.local_position, None);
    assert_eq!(fields.local_rotation, None);
    assert_eq!(
        fields.flags(),
        TransformFlags::POSITION | TransformFlags::LOCAL_SCALE
    );

    let patch = PosePatch::from_wire(&fields, &Frame::IDENTITY);
    let mut target = Pose::default();
    target.apply(&patch);
    assert_eq!(target.position, Vec3::ONE);
    assert_eq!(target.rotation, Quat::IDENTITY);
    assert_eq!(target.local_scale, Vec3::splat(4.0));
}

#[test]
fn gaze_ray_follows_the_head() {
    let head = Pose {
        position: Vec3::new(0.0, 1.6, 0.0),
        rotation: Quat::from_rotation_y(FRAC_PI_2),
        ..Pose::default()
    };
    let ray = gaze_ray(&head);
    assert_eq!(ray.origin, head.position);
    assert!(ray.direction.abs_diff_eq(Vec3::X, 1e-5), "{:?}", ray.direction);
}
