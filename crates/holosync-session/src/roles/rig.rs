use std::net::IpAddr;

use holosync_core::error::Result;

use crate::config::RigSection;

/// "Am I the machine wired to the spectator camera?"
#[derive(Debug, Clone, Default)]
pub struct RigIdentity {
    camera_addr: Option<IpAddr>,
    local_addrs: Vec<IpAddr>,
}

impl RigIdentity {
    pub fn new(camera_addr: Option<IpAddr>, local_addrs: Vec<IpAddr>) -> Self {
        Self {
            camera_addr,
            local_addrs,
        }
    }

    pub fn from_config(rig: &RigSection) -> Result<Self> {
        let camera_addr = rig.camera_ip()?;
        if camera_addr.is_none() {
            tracing::warn!(
                "rig.camera_addr is empty; this process will never act as the camera rig"
            );
        }
        Ok(Self::new(camera_addr, rig.local_ips()?))
    }

    pub fn camera_addr(&self) -> Option<IpAddr> {
        self.camera_addr
    }

    pub fn is_camera_rig(&self) -> bool {
        self.camera_addr
            .is_some_and(|cam| self.local_addrs.contains(&cam))
    }
}
