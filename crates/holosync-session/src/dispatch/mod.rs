//! Inbound dispatch.
//!
//! Tag -> typed message -> local side effect. Handlers never re-broadcast.

pub mod dispatcher;

pub use dispatcher::{Dispatched, Dispatcher};
