//! Session readiness: quorum (and optionally anchor localization) before
//! synchronization starts.

mod state;
mod tracker;

pub use state::Readiness;
pub use tracker::{wait_for_participants, ReadinessState, ReadinessTracker, ReadinessView, Step};
