//! Session config loader (strict parsing).

pub mod schema;

use std::fs;

use holosync_core::error::{Result, SyncError};

pub use schema::{HostKind, RigSection, SessionSection, SyncConfig, TransportSection};

pub fn load_from_file(path: &str) -> Result<SyncConfig> {
    let s = fs::read_to_string(path)
        .map_err(|e| SyncError::Config(format!("read config failed ({path}): {e}")))?;
    load_from_str(&s)
}

pub fn load_from_str(s: &str) -> Result<SyncConfig> {
    let cfg: SyncConfig =
        serde_yaml::from_str(s).map_err(|e| SyncError::Config(format!("invalid yaml: {e}")))?;
    cfg.validate()?;
    Ok(cfg)
}
