//! HoloSync core: wire-level contracts for spectator state synchronization.
//!
//! This crate defines the message catalog, byte codec, transform payloads and
//! the error surface shared by the session runtime and tooling. It carries no
//! transport or runtime dependencies so it can be reused by any substrate.
//!
//! # Panic policy
//! Panics, `unwrap`, and `expect` are compile-denied here
//! (`#![deny(clippy::panic, clippy::unwrap_used, clippy::expect_used)]`).
//! A frame that does not match its schema surfaces as `SyncError` instead of
//! crashing the participant that received it.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

pub mod error;
pub mod protocol;

/// Shared result type.
pub use error::{ErrorKind, Result, SyncError};
pub use protocol::ParticipantId;
