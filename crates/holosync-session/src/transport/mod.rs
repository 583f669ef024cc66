//! Transport substrate seam.
//!
//! The sharing substrate (discovery, connection, reliability tiers) is an
//! external collaborator. This module fixes the surface the protocol consumes
//! and ships `LocalHub`, an in-process substrate used by tests and the demo.

pub mod hub;

use async_trait::async_trait;
use bytes::Bytes;
use tokio::sync::watch;

use holosync_core::error::Result;
use holosync_core::ParticipantId;

pub use hub::{HubEndpoint, HubOptions, LocalHub};

/// Substrate send priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Priority {
    High,
    Medium,
    Low,
}

/// Substrate delivery guarantee.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reliability {
    /// Await delivery to every listener (ordered per connection).
    Reliable,
    /// Drop for any listener whose queue is full.
    Unreliable,
}

/// Delivery strategy attached to one broadcast.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Delivery {
    pub priority: Priority,
    pub reliability: Reliability,
}

impl Delivery {
    pub const fn reliable(priority: Priority) -> Self {
        Self {
            priority,
            reliability: Reliability::Reliable,
        }
    }
}

/// What the protocol needs from the sharing substrate.
#[async_trait]
pub trait Transport: Send + Sync {
    /// This connection's participant id.
    fn local_participant(&self) -> ParticipantId;

    /// Connected participants, in join order.
    fn participants(&self) -> Vec<ParticipantId>;

    /// Ask the substrate to deliver frames carrying `tag` to this connection.
    fn register_listener(&self, tag: u8);

    /// Membership snapshots; changes whenever someone joins or leaves.
    fn membership(&self) -> watch::Receiver<Vec<ParticipantId>>;

    /// Send one frame to every other listening participant.
    async fn broadcast(&self, frame: Bytes, delivery: Delivery) -> Result<()>;
}
