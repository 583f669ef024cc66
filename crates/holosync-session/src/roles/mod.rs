//! Role resolution: camera rig, editor, and the authoritative HoloLens user.
//!
//! The rig role is static (address membership). The authoritative user is
//! found by elimination once quorum is reached and memoized per session.

mod resolver;
mod rig;

pub use crate::config::schema::HostKind;
pub use resolver::{resolve_authority, Role, RoleResolver};
pub use rig::RigIdentity;
