//! HoloSync demo session.
//!
//! Runs one in-process sharing session with all three roles:
//! - editor, camera rig and HoloLens join a `LocalHub`
//! - the rig waits for readiness and announces it
//! - the HoloLens (the authority) replays a short scripted session
//! - each spectator logs what it applied; metrics are printed at the end

use std::sync::Arc;

use glam::{Quat, Vec3};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing_subscriber::{fmt, EnvFilter};

use holosync_core::error::{Result, SyncError};
use holosync_core::protocol::{ToolType, TransformFlags, TransformTarget};
use holosync_session::config::{self, HostKind, SyncConfig};
use holosync_session::readiness::wait_for_participants;
use holosync_session::runtime::SyncSession;
use holosync_session::scene::{MemoryScene, Pose};
use holosync_session::transport::{HubOptions, LocalHub};
use holosync_session::SyncContext;

#[tokio::main]
async fn main() {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();

    let path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "holosync.yaml".to_string());

    if let Err(e) = run(&path).await {
        tracing::error!(code = e.kind().as_str(), error = %e, "demo session failed");
        std::process::exit(1);
    }
}

struct Participant {
    name: &'static str,
    ctx: SyncContext,
    session: JoinHandle<MemoryScene>,
}

fn as_role(base: &SyncConfig, host: HostKind, camera_rig: bool) -> SyncConfig {
    let mut cfg = base.clone();
    cfg.host = host;
    cfg.rig.local_addrs = if camera_rig {
        vec![cfg.rig.camera_addr.clone()]
    } else {
        Vec::new()
    };
    cfg
}

fn spectator_scene() -> MemoryScene {
    MemoryScene::new()
        .with_point_of_interest("Earth")
        .with_point_of_interest("Mars")
        .with_description("MarsDescription")
}

fn join(
    hub: &LocalHub,
    name: &'static str,
    cfg: SyncConfig,
    shutdown: &watch::Receiver<bool>,
) -> Result<Participant> {
    let (endpoint, inbound) = hub.join();
    let ctx = SyncContext::new(cfg, Arc::new(endpoint))?;
    let session = SyncSession::new(ctx.clone(), spectator_scene());
    let session = tokio::spawn(session.run(inbound, shutdown.clone()));
    Ok(Participant { name, ctx, session })
}

async fn run(path: &str) -> Result<()> {
    let base = config::load_from_file(path)?;
    if base.rig.camera_ip()?.is_none() {
        return Err(SyncError::Config(
            "the demo needs rig.camera_addr to place the camera rig".into(),
        ));
    }

    let hub = LocalHub::new(HubOptions {
        queue_capacity: base.transport.inbound_queue,
        reliable_timeout_ms: base.transport.reliable_timeout_ms,
        loopback: false,
    });
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let (_cancel_tx, cancel_rx) = watch::channel(false);

    let editor = join(&hub, "editor", as_role(&base, HostKind::Editor, false), &shutdown_rx)?;
    let rig = join(&hub, "camera_rig", as_role(&base, HostKind::Device, true), &shutdown_rx)?;
    let head = join(&hub, "hololens", as_role(&base, HostKind::Device, false), &shutdown_rx)?;

    // The two fixed roles learn about each other out of band.
    editor.ctx.roles().set_peer_operator(Some(rig.ctx.local()));
    rig.ctx.roles().set_peer_operator(Some(editor.ctx.local()));

    let waits = [&editor, &rig, &head].map(|p| {
        let ctx = p.ctx.clone();
        let cancel = cancel_rx.clone();
        tokio::spawn(async move { wait_for_participants(&ctx, cancel).await })
    });

    rig.ctx.broadcaster().announce_anchor_located().await?;
    head.ctx.broadcaster().announce_anchor_located().await?;

    for (p, wait) in [&editor, &rig, &head].into_iter().zip(waits) {
        let state = wait
            .await
            .map_err(|e| SyncError::Internal(format!("readiness task failed: {e}")))??;
        tracing::info!(
            participant = p.name,
            role = p.ctx.roles().local_role().as_str(),
            state = state.as_str(),
            authority = ?p.ctx.roles().authority().map(|id| id.get()),
            "readiness settled"
        );
    }

    let head_scene = MemoryScene::new().with_pose(
        TransformTarget::Volume,
        Pose {
            position: Vec3::new(0.0, 0.0, 2.0),
            rotation: Quat::from_rotation_y(0.5),
            ..Pose::default()
        },
    );

    let out = head.ctx.broadcaster();
    out.send_advance_introduction().await?;
    out.send_earth_placed().await?;
    out.send_poi_gaze_select("Mars", true).await?;
    out.send_poi_card_tapped("Mars").await?;
    out.send_poi_animate_description("MarsDescription", "Visible", true)
        .await?;
    out.send_scene_transition_forward("SolarSystemView", Some("Earth"))
        .await?;
    out.send_select_toolbar_button(ToolType(1)).await?;
    out.send_content_local_scale(Vec3::splat(0.5)).await?;
    out.send_content_rotation(Quat::from_rotation_y(1.0)).await?;
    out.send_update_transform(TransformTarget::Volume, TransformFlags::ROTATION, &head_scene)
        .await?;
    out.send_move_cube().await?;
    out.send_content_placed(&head_scene).await?;
    out.send_scene_transition_backward().await?;
    out.send_reset_view().await?;

    // Spectators never send; the gate refuses without touching the transport.
    let refused = editor.ctx.broadcaster().send_reset_view().await?;
    tracing::info!(outcome = ?refused, "editor send attempt");

    shutdown_tx.send_replace(true);

    for p in [editor, rig, head] {
        let scene = p
            .session
            .await
            .map_err(|e| SyncError::Internal(format!("session task failed: {e}")))?;
        for event in scene.events() {
            tracing::info!(participant = p.name, ?event, "applied");
        }
        println!("# participant {}", p.name);
        print!("{}", p.ctx.metrics().render());
    }

    tracing::info!(participants = hub.participants().len(), "demo session finished");
    Ok(())
}
