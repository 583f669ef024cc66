use std::net::IpAddr;

use serde::Deserialize;

use holosync_core::error::{Result, SyncError};
use holosync_core::protocol::{MessageIds, DEFAULT_MESSAGE_BASE};

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SyncConfig {
    pub version: u32,

    #[serde(default)]
    pub host: HostKind,

    #[serde(default)]
    pub session: SessionSection,

    #[serde(default)]
    pub rig: RigSection,

    #[serde(default)]
    pub transport: TransportSection,
}

impl SyncConfig {
    pub fn validate(&self) -> Result<()> {
        if self.version != 1 {
            return Err(SyncError::UnsupportedVersion);
        }
        self.session.validate()?;
        self.rig.validate()?;
        self.transport.validate()?;
        Ok(())
    }

    /// Defaults for everything, as if `version: 1` were the whole file.
    pub fn minimal() -> Self {
        Self {
            version: 1,
            host: HostKind::default(),
            session: SessionSection::default(),
            rig: RigSection::default(),
            transport: TransportSection::default(),
        }
    }
}

/// Which build of the application this process is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HostKind {
    /// Desktop editor driving the spectator camera composite.
    Editor,
    /// Head-mounted device (the authoritative user or the rig's device).
    #[default]
    Device,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SessionSection {
    /// Participants required before roles are resolved.
    #[serde(default = "default_quorum")]
    pub quorum: usize,

    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    /// 0 waits forever.
    #[serde(default)]
    pub wait_timeout_ms: u64,

    #[serde(default = "default_require_anchors")]
    pub require_anchors: bool,

    /// "anchor located" reports required (rig + remote head).
    #[serde(default = "default_located_quorum")]
    pub located_quorum: usize,

    #[serde(default = "default_message_base")]
    pub message_base: u8,
}

impl Default for SessionSection {
    fn default() -> Self {
        Self {
            quorum: default_quorum(),
            poll_interval_ms: default_poll_interval_ms(),
            wait_timeout_ms: 0,
            require_anchors: default_require_anchors(),
            located_quorum: default_located_quorum(),
            message_base: default_message_base(),
        }
    }
}

impl SessionSection {
    pub fn validate(&self) -> Result<()> {
        if !(3..=64).contains(&self.quorum) {
            return Err(SyncError::Config(
                "session.quorum must be between 3 and 64".into(),
            ));
        }
        if !(10..=60000).contains(&self.poll_interval_ms) {
            return Err(SyncError::Config(
                "session.poll_interval_ms must be between 10 and 60000".into(),
            ));
        }
        if self.wait_timeout_ms != 0 && self.wait_timeout_ms < self.poll_interval_ms {
            return Err(SyncError::Config(
                "session.wait_timeout_ms must be 0 or at least poll_interval_ms".into(),
            ));
        }
        if self.located_quorum == 0 || self.located_quorum > self.quorum {
            return Err(SyncError::Config(
                "session.located_quorum must be between 1 and quorum".into(),
            ));
        }
        MessageIds::new(self.message_base)?;
        Ok(())
    }

    pub fn message_ids(&self) -> Result<MessageIds> {
        MessageIds::new(self.message_base)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RigSection {
    /// Address of the device mounted on the spectator camera. Empty: no rig here.
    #[serde(default)]
    pub camera_addr: String,

    /// This machine's own addresses.
    #[serde(default)]
    pub local_addrs: Vec<String>,
}

impl RigSection {
    pub fn validate(&self) -> Result<()> {
        self.camera_ip()?;
        self.local_ips()?;
        Ok(())
    }

    pub fn camera_ip(&self) -> Result<Option<IpAddr>> {
        let s = self.camera_addr.trim();
        if s.is_empty() {
            return Ok(None);
        }
        s.parse()
            .map(Some)
            .map_err(|_| SyncError::Config(format!("rig.camera_addr is not an ip address: {s}")))
    }

    pub fn local_ips(&self) -> Result<Vec<IpAddr>> {
        self.local_addrs
            .iter()
            .map(|s| {
                s.trim().parse().map_err(|_| {
                    SyncError::Config(format!("rig.local_addrs entry is not an ip address: {s}"))
                })
            })
            .collect()
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TransportSection {
    #[serde(default = "default_inbound_queue")]
    pub inbound_queue: usize,

    #[serde(default = "default_reliable_timeout_ms")]
    pub reliable_timeout_ms: u64,
}

impl Default for TransportSection {
    fn default() -> Self {
        Self {
            inbound_queue: default_inbound_queue(),
            reliable_timeout_ms: default_reliable_timeout_ms(),
        }
    }
}

impl TransportSection {
    pub fn validate(&self) -> Result<()> {
        if !(16..=65536).contains(&self.inbound_queue) {
            return Err(SyncError::Config(
                "transport.inbound_queue must be between 16 and 65536".into(),
            ));
        }
        if self.reliable_timeout_ms > 60000 {
            return Err(SyncError::Config(
                "transport.reliable_timeout_ms must be at most 60000".into(),
            ));
        }
        Ok(())
    }
}

fn default_quorum() -> usize {
    3
}
fn default_poll_interval_ms() -> u64 {
    1000
}
fn default_require_anchors() -> bool {
    true
}
fn default_located_quorum() -> usize {
    2
}
fn default_message_base() -> u8 {
    DEFAULT_MESSAGE_BASE
}
fn default_inbound_queue() -> usize {
    1024
}
fn default_reliable_timeout_ms() -> u64 {
    1500
}
