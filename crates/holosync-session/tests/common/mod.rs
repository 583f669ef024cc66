//! Shared fixtures: configs per role and participants on a `LocalHub`.

#![allow(dead_code)]

use std::sync::Arc;

use bytes::Bytes;
use tokio::sync::mpsc;

use holosync_session::config::{HostKind, SyncConfig};
use holosync_session::dispatch::Dispatched;
use holosync_session::scene::MemoryScene;
use holosync_session::transport::{HubOptions, LocalHub};
use holosync_session::SyncContext;

pub const CAMERA_ADDR: &str = "10.0.0.40";

pub fn config(host: HostKind, camera_rig: bool) -> SyncConfig {
    let mut cfg = SyncConfig::minimal();
    cfg.host = host;
    cfg.rig.camera_addr = CAMERA_ADDR.to_string();
    if camera_rig {
        cfg.rig.local_addrs = vec![CAMERA_ADDR.to_string()];
    }
    cfg.session.poll_interval_ms = 10;
    cfg
}

pub fn editor() -> SyncConfig {
    config(HostKind::Editor, false)
}

pub fn rig() -> SyncConfig {
    config(HostKind::Device, true)
}

pub fn hololens() -> SyncConfig {
    config(HostKind::Device, false)
}

pub fn hub() -> LocalHub {
    LocalHub::new(HubOptions::default())
}

pub fn loopback_hub() -> LocalHub {
    LocalHub::new(HubOptions {
        loopback: true,
        ..HubOptions::default()
    })
}

pub struct Node {
    pub ctx: SyncContext,
    pub inbound: mpsc::Receiver<Bytes>,
}

impl Node {
    /// Frames queued for this participant right now.
    pub fn pending(&mut self) -> Vec<Bytes> {
        let mut out = Vec::new();
        while let Ok(frame) = self.inbound.try_recv() {
            out.push(frame);
        }
        out
    }

    /// Dispatch every queued frame into `scene`.
    pub fn drain(&mut self, scene: &mut MemoryScene) -> Vec<Dispatched> {
        let dispatcher = self.ctx.dispatcher();
        self.pending()
            .into_iter()
            .map(|frame| dispatcher.dispatch(frame, scene).unwrap())
            .collect()
    }
}

pub fn join(hub: &LocalHub, cfg: SyncConfig) -> Node {
    let (endpoint, inbound) = hub.join();
    let ctx = SyncContext::new(cfg, Arc::new(endpoint)).unwrap();
    Node { ctx, inbound }
}

/// Editor, camera rig and HoloLens, joined in that order, with the fixed
/// roles introduced to each other.
pub fn trio(hub: &LocalHub) -> (Node, Node, Node) {
    let editor = join(hub, editor());
    let rig = join(hub, rig());
    let head = join(hub, hololens());
    editor.ctx.roles().set_peer_operator(Some(rig.ctx.local()));
    rig.ctx.roles().set_peer_operator(Some(editor.ctx.local()));
    (editor, rig, head)
}
