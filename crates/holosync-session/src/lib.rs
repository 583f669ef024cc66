//! HoloSync session library.
//!
//! Wires the transport seam, role resolution, readiness, the inbound
//! dispatcher and the outbound broadcasters into one sharing session. It is
//! consumed by the demo binary (`main.rs`) and by integration tests.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

pub mod broadcast;
pub mod config;
pub mod context;
pub mod dispatch;
pub mod obs;
pub mod readiness;
pub mod roles;
pub mod runtime;
pub mod scene;
pub mod transport;

pub use context::SyncContext;
