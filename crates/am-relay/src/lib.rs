//! Server-side notification broadcaster.
//!
//! Fans "you have mail" envelopes out to every live subscriber of a
//! `(project, agent)` routing key. Each subscriber owns a bounded queue with
//! drop-oldest overflow, so one slow consumer can never stall the publisher
//! or its siblings. The broadcaster holds no durable log: an envelope
//! published while an agent has no watcher attached is simply dropped.

mod broadcaster;
mod registry;
pub mod sse;

pub use broadcaster::{publish_notification, Broadcaster, Subscription};
pub use registry::QUEUE_CAPACITY;
