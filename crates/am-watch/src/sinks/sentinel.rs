//! Sentinel-file sink: single-slot "you have mail" flag.
//!
//! Overwrites one JSON file with the most recent event's essential fields.
//! An external reader (e.g. a pre-tool-use hook) consumes and deletes it;
//! this sink only ever writes.

use std::path::Path;

use am_core::{Importance, NotificationEvent};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize)]
pub struct SentinelRecord {
    pub id: u64,
    pub from: String,
    pub subject: String,
    pub importance: Importance,
    pub timestamp: String,
}

impl SentinelRecord {
    pub fn from_event(event: &NotificationEvent) -> Self {
        let msg = event.message.clone().unwrap_or_default();
        Self {
            id: msg.id,
            from: msg.from,
            subject: msg.subject,
            importance: msg.importance,
            timestamp: event.timestamp.clone(),
        }
    }
}

pub fn write(path: &Path, event: &NotificationEvent) -> Result<()> {
    let record = SentinelRecord::from_event(event);
    let json = serde_json::to_string(&record).context("failed to serialize sentinel")?;
    std::fs::write(path, json).context("failed to write sentinel file")?;
    Ok(())
}
