//! Core types for the agent-mail notification relay.
//!
//! Shared between the server-side broadcaster (`am-relay`) and the watcher
//! client (`am-watch`): the notification envelope, the `(project, agent)`
//! routing key, and the signal-file path contract used by the file-polling
//! fallback.

pub mod error;
pub mod signal;
pub mod types;

pub use error::{Error, Result};
pub use types::{Importance, MessageMeta, NotificationEvent, RouteKey};
