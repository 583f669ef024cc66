//! Outbound state changes.
//!
//! One `send_*` per synchronized event. Every send passes a role gate first;
//! a refused send returns `SendOutcome::Skipped` without touching the
//! transport.

pub mod broadcaster;

pub use broadcaster::{delivery_for, Broadcaster, SendOutcome, SkipReason};
