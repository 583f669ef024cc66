//! Top-level facade crate for HoloSync.
//!
//! Re-exports the wire contracts and the session runtime so users can depend on a single crate.

pub mod core {
    pub use holosync_core::*;
}

pub mod session {
    pub use holosync_session::*;
}
