//! Notification transports.
//!
//! Two interchangeable producers of [`NotificationEvent`]s into the watcher
//! pipeline: a long-lived SSE reader with reconnect/backoff, and a signal
//! file mtime poller. Both feed the same `mpsc` channel; everything
//! downstream is transport-agnostic.
//!
//! [`NotificationEvent`]: am_core::NotificationEvent

pub mod backoff;
pub mod poll;
pub mod sse;

pub use backoff::Backoff;
pub use poll::PollTransport;
pub use sse::SseTransport;
