//! Agent Mail watcher client.
//!
//! A sidecar process that watches for new-message signals for one
//! `(project, agent)` pair and reacts with visible alerts, automatic inbox
//! fetches, hook commands, and agent-readable buffer/sentinel files.
//!
//! Two transports feed one pipeline: a long-lived SSE connection with
//! reconnect/backoff, or polling of the local `.signal` file. Exactly one is
//! active per run; downstream of the transport everything is identical.

pub mod dedup;
pub mod sinks;
pub mod transport;
pub mod watcher;

pub use dedup::DedupGuard;
pub use sinks::{SinkConfig, SinkDispatcher};
pub use watcher::{Pipeline, WatchMethod, WatcherConfig};
