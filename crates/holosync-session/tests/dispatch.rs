#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

mod common;

use glam::{Quat, Vec3};

use holosync_core::protocol::{
    MessageId, MessageWriter, ParticipantId, ToolType, TransformFields, TransformFlags,
    TransformTarget, TransformUpdate, HEADER_LEN,
};
use holosync_session::broadcast::{SendOutcome, SkipReason};
use holosync_session::dispatch::Dispatched;
use holosync_session::scene::{Frame, MemoryScene, Pose, ReferenceFrame, SceneEvent, SceneHost};

fn approx_vec(a: Vec3, b: Vec3) -> bool {
    a.abs_diff_eq(b, 1e-5)
}

fn approx_quat(a: Quat, b: Quat) -> bool {
    a.abs_diff_eq(b, 1e-5) || a.abs_diff_eq(-b, 1e-5)
}

fn spectator_scene() -> MemoryScene {
    MemoryScene::new()
        .with_point_of_interest("Earth")
        .with_point_of_interest("Mars")
        .with_description("MarsDescription")
}

#[tokio::test]
async fn self_echo_is_dropped_before_any_handler() {
    let hub = common::loopback_hub();
    let (_editor, _rig, mut head) = common::trio(&hub);

    let sent = head.ctx.broadcaster().send_reset_view().await.unwrap();
    assert!(sent.is_sent());

    let mut scene = spectator_scene();
    let outcomes = head.drain(&mut scene);
    assert_eq!(outcomes, vec![Dispatched::SelfEcho(MessageId::ResetView)]);
    assert!(scene.events().is_empty());
    assert_eq!(
        head.ctx.metrics().frames_dropped.get(&[("reason", "self_echo")]),
        1
    );
}

#[tokio::test]
async fn own_players_ready_does_not_flip_readiness() {
    let hub = common::hub();
    let (editor, _rig, _head) = common::trio(&hub);
    let ids = *editor.ctx.ids();
    let dispatcher = editor.ctx.dispatcher();

    let tag = ids.tag(MessageId::SpectatorViewPlayersReady);
    let frame = MessageWriter::new(tag, editor.ctx.local()).finish();
    let mut scene = spectator_scene();
    assert_eq!(
        dispatcher.dispatch(frame, &mut scene).unwrap(),
        Dispatched::SelfEcho(MessageId::SpectatorViewPlayersReady)
    );
    assert!(!editor.ctx.readiness().is_ready());
}

#[tokio::test]
async fn non_authoritative_sends_put_nothing_on_the_wire() {
    let hub = common::hub();
    let (editor, mut rig, mut head) = common::trio(&hub);
    let out = editor.ctx.broadcaster();
    let scene = spectator_scene();

    let outcomes = [
        out.send_reset_view().await.unwrap(),
        out.send_scene_transition_forward("GalaxyView", Some("Earth"))
            .await
            .unwrap(),
        out.send_content_rotation(Quat::IDENTITY).await.unwrap(),
        out.send_update_transform(TransformTarget::Tools, TransformFlags::POSITION, &scene)
            .await
            .unwrap(),
        out.send_content_placed(&scene).await.unwrap(),
    ];
    for outcome in outcomes {
        assert_eq!(outcome, SendOutcome::Skipped(SkipReason::NotAuthoritative));
    }
    assert!(rig.pending().is_empty());
    assert!(head.pending().is_empty());
    assert_eq!(editor.ctx.metrics().frames_sent.total(), 0);
    assert_eq!(editor.ctx.metrics().sends_skipped.total(), 5);
}

#[tokio::test]
async fn only_the_rig_announces_readiness() {
    let hub = common::hub();
    let (mut editor, _rig, head) = common::trio(&hub);

    let outcome = head.ctx.broadcaster().send_players_ready().await.unwrap();
    assert_eq!(outcome, SendOutcome::Skipped(SkipReason::NotCameraRig));
    assert!(!head.ctx.readiness().is_ready());
    assert!(editor.pending().is_empty());
}

#[tokio::test]
async fn concurrent_ready_announcements_send_one_frame() {
    let hub = common::hub();
    let (mut editor, rig, mut head) = common::trio(&hub);
    let out = rig.ctx.broadcaster();

    let (a, b) = tokio::join!(out.send_players_ready(), out.send_players_ready());
    let mut outcomes = [a.unwrap(), b.unwrap()];
    outcomes.sort_by_key(|o| !o.is_sent());
    assert!(outcomes[0].is_sent(), "{outcomes:?}");
    assert_eq!(outcomes[1], SendOutcome::Skipped(SkipReason::AlreadyReady));
    assert!(rig.ctx.readiness().is_ready());

    let again = out.send_players_ready().await.unwrap();
    assert_eq!(again, SendOutcome::Skipped(SkipReason::AlreadyReady));

    assert_eq!(editor.pending().len(), 1);
    assert_eq!(head.pending().len(), 1);
    let sent = rig
        .ctx
        .metrics()
        .frames_sent
        .get(&[("msg", MessageId::SpectatorViewPlayersReady.name())]);
    assert_eq!(sent, 1);
}

#[tokio::test]
async fn oversized_names_are_refused_whole() {
    use holosync_core::protocol::codec::MAX_STRING_LEN;

    let hub = common::hub();
    let (mut editor, mut rig, head) = common::trio(&hub);
    let out = head.ctx.broadcaster();
    let long = "x".repeat(MAX_STRING_LEN + 1);

    let err = out.send_poi_card_tapped(&long).await.expect_err("name too long");
    assert_eq!(err.kind().as_str(), "INVALID_PAYLOAD");
    let err = out
        .send_scene_transition_forward("GalaxyView", Some(&long))
        .await
        .expect_err("source too long");
    assert_eq!(err.kind().as_str(), "INVALID_PAYLOAD");
    assert!(editor.pending().is_empty());
    assert!(rig.pending().is_empty());
    assert_eq!(head.ctx.metrics().frames_sent.total(), 0);

    let fits = "x".repeat(MAX_STRING_LEN);
    assert!(out.send_poi_card_tapped(&fits).await.unwrap().is_sent());
    let mut scene = spectator_scene();
    let received = editor.drain(&mut scene);
    assert_eq!(received.len(), 1);
}

#[tokio::test]
async fn nothing_is_sent_below_quorum() {
    let hub = common::hub();
    let head = common::join(&hub, common::hololens());
    let mut editor = common::join(&hub, common::editor());

    let outcome = head.ctx.broadcaster().send_toggle_tools().await.unwrap();
    assert_eq!(outcome, SendOutcome::Skipped(SkipReason::NotAuthoritative));
    assert!(editor.pending().is_empty());
}

#[tokio::test]
async fn anchor_located_is_not_role_gated() {
    let hub = common::hub();
    let (mut editor, _rig, _head) = common::trio(&hub);
    let late = common::join(&hub, common::editor());

    let outcome = late.ctx.broadcaster().announce_anchor_located().await.unwrap();
    assert!(outcome.is_sent());
    assert!(late.ctx.readiness().is_located(late.ctx.local()));

    let mut scene = spectator_scene();
    let outcomes = editor.drain(&mut scene);
    assert_eq!(outcomes, vec![Dispatched::Applied(MessageId::AnchorLocated)]);
    assert!(editor.ctx.readiness().is_located(late.ctx.local()));
}

#[tokio::test]
async fn scene_transition_needs_the_named_source() {
    let hub = common::hub();
    let (mut editor, _rig, head) = common::trio(&hub);
    let out = head.ctx.broadcaster();

    out.send_scene_transition_forward("SolarSystemView", Some("Earth"))
        .await
        .unwrap();
    let mut with_earth = spectator_scene();
    assert_eq!(
        editor.drain(&mut with_earth),
        vec![Dispatched::Applied(MessageId::SceneTransitionForward)]
    );
    assert_eq!(
        with_earth.events(),
        &[SceneEvent::LoadNextScene {
            scene: "SolarSystemView".into(),
            source: "Earth".into(),
        }]
    );

    out.send_scene_transition_forward("SolarSystemView", Some("Earth"))
        .await
        .unwrap();
    let mut without_earth = MemoryScene::new().with_point_of_interest("Mars");
    assert_eq!(
        editor.drain(&mut without_earth),
        vec![Dispatched::TargetMissing(MessageId::SceneTransitionForward)]
    );
    assert!(without_earth.events().is_empty());

    // no source at all is a missing target too
    out.send_scene_transition_forward("GalaxyView", None)
        .await
        .unwrap();
    assert_eq!(
        editor.drain(&mut with_earth),
        vec![Dispatched::TargetMissing(MessageId::SceneTransitionForward)]
    );
}

#[tokio::test]
async fn point_of_interest_events_resolve_by_name() {
    let hub = common::hub();
    let (_editor, mut rig, head) = common::trio(&hub);
    let out = head.ctx.broadcaster();

    out.send_poi_gaze_select("Mars", true).await.unwrap();
    out.send_poi_card_tapped("Mars").await.unwrap();
    out.send_poi_animate_description("MarsDescription", "Visible", false)
        .await
        .unwrap();
    out.send_poi_gaze_select("Pluto", true).await.unwrap();
    out.send_hide_all_cards().await.unwrap();

    let mut scene = spectator_scene();
    let outcomes = rig.drain(&mut scene);
    assert_eq!(
        outcomes,
        vec![
            Dispatched::Applied(MessageId::PointOfInterestGazeSelect),
            Dispatched::Applied(MessageId::PointOfInterestCardTapped),
            Dispatched::Applied(MessageId::PointOfInterestAnimateDescription),
            Dispatched::TargetMissing(MessageId::PointOfInterestGazeSelect),
            Dispatched::Applied(MessageId::HideAllCards),
        ]
    );
    assert_eq!(
        scene.events(),
        &[
            SceneEvent::GazeSelect {
                poi: "Mars".into(),
                select: true,
            },
            SceneEvent::TapCard {
                card: "MarsCard".into(),
            },
            SceneEvent::AnimateDescription {
                description: "MarsDescription".into(),
                property: "Visible".into(),
                value: false,
            },
            SceneEvent::HideAllCards,
        ]
    );
}

#[tokio::test]
async fn basic_state_changes_replay_in_order() {
    let hub = common::hub();
    let (mut editor, _rig, head) = common::trio(&hub);
    let out = head.ctx.broadcaster();

    out.send_advance_introduction().await.unwrap();
    out.send_earth_placed().await.unwrap();
    out.send_toggle_orbit_scale().await.unwrap();
    out.send_select_toolbar_button(ToolType(4)).await.unwrap();
    out.send_content_local_scale(Vec3::splat(0.5)).await.unwrap();
    out.send_move_cube().await.unwrap();
    out.send_toggle_tools().await.unwrap();
    out.send_scene_transition_backward().await.unwrap();
    out.send_reset_view().await.unwrap();

    let mut scene = spectator_scene();
    editor.drain(&mut scene);
    assert_eq!(
        scene.events(),
        &[
            SceneEvent::AdvanceIntroduction,
            SceneEvent::EarthPlaced,
            SceneEvent::ToggleOrbitScale,
            SceneEvent::SelectTool(ToolType(4)),
            SceneEvent::ContentLocalScale(Vec3::splat(0.5)),
            SceneEvent::MoveCube,
            SceneEvent::ToggleTools,
            SceneEvent::GoBack,
            SceneEvent::ResetView,
        ]
    );
    assert_eq!(scene.content_local_scale(), Some(Vec3::splat(0.5)));
}

#[tokio::test]
async fn single_field_transform_leaves_the_rest_alone() {
    let hub = common::hub();
    let (mut editor, _rig, head) = common::trio(&hub);

    let before = Pose {
        position: Vec3::new(1.0, 2.0, 3.0),
        rotation: Quat::from_rotation_x(0.3),
        local_position: Vec3::new(-1.0, 0.0, 0.5),
        local_rotation: Quat::from_rotation_z(0.2),
        local_scale: Vec3::splat(1.5),
    };
    let update = TransformUpdate {
        target: TransformTarget::Tools,
        fields: TransformFields {
            local_scale: Some(Vec3::splat(3.0)),
            ..Default::default()
        },
    };
    head.ctx.broadcaster().send_transform(update).await.unwrap();

    let mut scene = spectator_scene().with_pose(TransformTarget::Tools, before);
    assert_eq!(
        editor.drain(&mut scene),
        vec![Dispatched::Applied(MessageId::UpdateTransform)]
    );
    let after = scene.pose(TransformTarget::Tools);
    assert_eq!(
        after,
        Pose {
            local_scale: Vec3::splat(3.0),
            ..before
        }
    );
}

#[tokio::test]
async fn local_rotation_is_applied() {
    let hub = common::hub();
    let (mut editor, _rig, head) = common::trio(&hub);
    let q = Quat::from_rotation_y(0.75);
    let update = TransformUpdate {
        target: TransformTarget::Cursor,
        fields: TransformFields {
            local_rotation: Some(q),
            ..Default::default()
        },
    };
    head.ctx.broadcaster().send_transform(update).await.unwrap();

    let mut scene = spectator_scene();
    editor.drain(&mut scene);
    assert_eq!(scene.pose(TransformTarget::Cursor).local_rotation, q);
}

#[tokio::test]
async fn rotation_only_volume_transform() {
    let hub = common::hub();
    let (mut editor, _rig, head) = common::trio(&hub);

    let turned = Quat::from_rotation_y(1.2);
    let head_scene = MemoryScene::new().with_pose(
        TransformTarget::Volume,
        Pose {
            position: Vec3::new(9.0, 9.0, 9.0),
            rotation: turned,
            ..Pose::default()
        },
    );
    let outcome = head
        .ctx
        .broadcaster()
        .send_update_transform(TransformTarget::Volume, TransformFlags::ROTATION, &head_scene)
        .await
        .unwrap();
    assert_eq!(
        outcome,
        SendOutcome::Sent {
            tag: head.ctx.ids().tag(MessageId::UpdateTransform),
            len: HEADER_LEN + 2 + 16,
        }
    );

    let before = Pose {
        position: Vec3::new(0.0, 1.0, 2.0),
        ..Pose::default()
    };
    let mut scene = spectator_scene().with_pose(TransformTarget::Volume, before);
    editor.drain(&mut scene);

    let after = scene.pose(TransformTarget::Volume);
    assert!(approx_quat(after.rotation, turned));
    assert_eq!(after.position, before.position);
    assert_eq!(after.local_position, before.local_position);
    assert_eq!(after.local_rotation, before.local_rotation);
    assert_eq!(after.local_scale, before.local_scale);
}

#[tokio::test]
async fn poses_travel_relative_to_the_anchor() {
    let hub = common::hub();
    let (mut editor, _rig, head) = common::trio(&hub);

    // Same physical placement, but each device's world origin differs.
    let head_anchor = Frame::new(Vec3::new(1.0, 0.0, 0.0), Quat::IDENTITY, Vec3::ONE);
    let editor_anchor = Frame::new(
        Vec3::new(5.0, 0.0, 0.0),
        Quat::from_rotation_y(std::f32::consts::FRAC_PI_2),
        Vec3::ONE,
    );

    let head_scene = MemoryScene::new()
        .with_frame(ReferenceFrame::Anchor, head_anchor)
        .with_pose(
            TransformTarget::Volume,
            Pose {
                position: Vec3::new(1.0, 0.0, 2.0),
                ..Pose::default()
            },
        );
    head.ctx
        .broadcaster()
        .send_update_transform(
            TransformTarget::Volume,
            TransformFlags::POSITION | TransformFlags::ROTATION,
            &head_scene,
        )
        .await
        .unwrap();

    let mut scene = spectator_scene().with_frame(ReferenceFrame::Anchor, editor_anchor);
    editor.drain(&mut scene);

    let pose = scene.pose(TransformTarget::Volume);
    // anchor-relative (0, 0, 2) rotated a quarter turn about +Y is (2, 0, 0)
    assert!(approx_vec(pose.position, Vec3::new(7.0, 0.0, 0.0)), "{pose:?}");
    assert!(approx_quat(
        pose.rotation,
        Quat::from_rotation_y(std::f32::consts::FRAC_PI_2)
    ));
}

#[tokio::test]
async fn content_placed_carries_the_final_volume_pose() {
    let hub = common::hub();
    let (mut editor, _rig, head) = common::trio(&hub);

    let head_scene = MemoryScene::new().with_pose(
        TransformTarget::Volume,
        Pose {
            position: Vec3::new(0.0, -0.5, 1.5),
            rotation: Quat::from_rotation_y(0.4),
            ..Pose::default()
        },
    );
    let outcome = head
        .ctx
        .broadcaster()
        .send_content_placed(&head_scene)
        .await
        .unwrap();
    assert!(outcome.is_sent());

    let mut scene = spectator_scene();
    assert_eq!(
        editor.drain(&mut scene),
        vec![
            Dispatched::Applied(MessageId::UpdateTransform),
            Dispatched::Applied(MessageId::ContentPlaced),
        ]
    );
    assert_eq!(
        scene.events(),
        &[
            SceneEvent::Pose(TransformTarget::Volume),
            SceneEvent::ContentPlaced
        ]
    );
    assert!(approx_vec(
        scene.pose(TransformTarget::Volume).position,
        Vec3::new(0.0, -0.5, 1.5)
    ));
}

#[tokio::test]
async fn unknown_reserved_and_malformed_frames() {
    let hub = common::hub();
    let (editor, _rig, _head) = common::trio(&hub);
    let ids = *editor.ctx.ids();
    let dispatcher = editor.ctx.dispatcher();
    let remote = ParticipantId(9_999);
    let mut scene = spectator_scene();

    let outside = MessageWriter::new(ids.base() - 1, remote).finish();
    assert_eq!(
        dispatcher.dispatch(outside, &mut scene).unwrap(),
        Dispatched::Ignored(ids.base() - 1)
    );

    let cursor_tag = ids.tag(MessageId::UpdateCursorTransform);
    let cursor = MessageWriter::new(cursor_tag, remote).finish();
    assert_eq!(
        dispatcher.dispatch(cursor, &mut scene).unwrap(),
        Dispatched::Reserved(MessageId::UpdateCursorTransform)
    );

    // card tapped with no name at all
    let tapped = ids.tag(MessageId::PointOfInterestCardTapped);
    let truncated = MessageWriter::new(tapped, remote).finish();
    let err = dispatcher.dispatch(truncated, &mut scene).expect_err("no body");
    assert_eq!(err.kind().as_str(), "TRUNCATED");

    let mut bad_flags = MessageWriter::new(ids.tag(MessageId::UpdateTransform), remote);
    bad_flags.put_u8(0).put_u8(0x20);
    let err = dispatcher
        .dispatch(bad_flags.finish(), &mut scene)
        .expect_err("unknown flag");
    assert_eq!(err.kind().as_str(), "INVALID_PAYLOAD");

    assert!(scene.events().is_empty());
    let metrics = editor.ctx.metrics();
    assert_eq!(metrics.decode_errors.get(&[("code", "TRUNCATED")]), 1);
    assert_eq!(metrics.decode_errors.get(&[("code", "INVALID_PAYLOAD")]), 1);
    assert_eq!(metrics.frames_dropped.get(&[("reason", "unknown_tag")]), 1);
    assert_eq!(metrics.frames_dropped.get(&[("reason", "reserved")]), 1);
}

#[tokio::test]
async fn players_ready_from_the_rig_sets_the_flag() {
    let hub = common::hub();
    let (mut editor, rig, _head) = common::trio(&hub);

    let outcome = rig.ctx.broadcaster().send_players_ready().await.unwrap();
    assert!(outcome.is_sent());
    assert!(rig.ctx.readiness().is_ready());

    let mut scene = spectator_scene();
    assert!(!editor.ctx.readiness().is_ready());
    editor.drain(&mut scene);
    assert!(editor.ctx.readiness().is_ready());
}
