//! Lightweight in-process metrics (dependency-free).
//!
//! Counters, gauges and histograms are stored as atomics keyed by sorted
//! label sets and rendered in Prometheus text format on demand.

pub mod metrics;

pub use metrics::SyncMetrics;
