//! Shared session context.
//!
//! Built once per sharing session and handed to the dispatcher, the
//! broadcasters and the readiness wait. Cloning is cheap.

use std::sync::Arc;

use holosync_core::error::Result;
use holosync_core::protocol::MessageIds;
use holosync_core::ParticipantId;

use crate::broadcast::Broadcaster;
use crate::config::SyncConfig;
use crate::dispatch::Dispatcher;
use crate::obs::SyncMetrics;
use crate::readiness::Readiness;
use crate::roles::{RigIdentity, RoleResolver};
use crate::transport::Transport;

#[derive(Clone)]
pub struct SyncContext {
    inner: Arc<SyncContextInner>,
}

struct SyncContextInner {
    cfg: SyncConfig,
    ids: MessageIds,
    transport: Arc<dyn Transport>,
    roles: RoleResolver,
    readiness: Readiness,
    metrics: SyncMetrics,
}

impl SyncContext {
    /// Build the context and register a listener for every tag in the
    /// catalog, reserved ones included.
    pub fn new(cfg: SyncConfig, transport: Arc<dyn Transport>) -> Result<Self> {
        cfg.validate()?;
        let ids = cfg.session.message_ids()?;
        let rig = RigIdentity::from_config(&cfg.rig)?;
        let roles = RoleResolver::new(cfg.host, rig, cfg.session.quorum, Arc::clone(&transport));

        for tag in ids.tags() {
            transport.register_listener(tag);
        }

        tracing::info!(
            local = %transport.local_participant(),
            role = roles.local_role().as_str(),
            base = ids.base(),
            "sync context ready"
        );

        Ok(Self {
            inner: Arc::new(SyncContextInner {
                cfg,
                ids,
                transport,
                roles,
                readiness: Readiness::new(),
                metrics: SyncMetrics::default(),
            }),
        })
    }

    pub fn cfg(&self) -> &SyncConfig {
        &self.inner.cfg
    }

    pub fn ids(&self) -> &MessageIds {
        &self.inner.ids
    }

    pub fn transport(&self) -> &Arc<dyn Transport> {
        &self.inner.transport
    }

    pub fn local(&self) -> ParticipantId {
        self.inner.transport.local_participant()
    }

    pub fn roles(&self) -> &RoleResolver {
        &self.inner.roles
    }

    pub fn readiness(&self) -> &Readiness {
        &self.inner.readiness
    }

    pub fn metrics(&self) -> &SyncMetrics {
        &self.inner.metrics
    }

    pub fn broadcaster(&self) -> Broadcaster {
        Broadcaster::new(self.clone())
    }

    pub fn dispatcher(&self) -> Dispatcher {
        Dispatcher::new(self.clone())
    }

    pub fn is_authoritative_user(&self) -> bool {
        self.inner.roles.is_authoritative_user()
    }

    pub fn is_camera_rig(&self) -> bool {
        self.inner.roles.is_camera_rig()
    }
}
