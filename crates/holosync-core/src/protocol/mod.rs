//! Protocol modules.
//!
//! - `codec`: header + scalar/vector/string field encoding.
//! - `ids`: the contiguous message tag space.
//! - `message`: typed message catalog (one variant per synchronized event).
//! - `transform`: bitmask-gated transform payloads.
//!
//! All readers are panic-free: a short or malformed frame is reported as
//! `SyncError` instead of indexing raw buffers.

pub mod codec;
pub mod ids;
pub mod message;
pub mod transform;

use std::fmt;

pub use codec::{FrameHeader, MessageReader, MessageWriter, HEADER_LEN};
pub use ids::{MessageId, MessageIds, DEFAULT_MESSAGE_BASE};
pub use message::{SyncMessage, ToolType};
pub use transform::{TransformFields, TransformFlags, TransformTarget, TransformUpdate};

/// Session participant id assigned by the substrate (stable per connection).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ParticipantId(pub i64);

impl ParticipantId {
    pub fn get(self) -> i64 {
        self.0
    }
}

impl fmt::Display for ParticipantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for ParticipantId {
    fn from(v: i64) -> Self {
        ParticipantId(v)
    }
}
