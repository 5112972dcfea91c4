//! Buffer-file sink: a markdown table of pending notifications.
//!
//! Agents that cannot receive pushes check this file at the start of a turn.
//! The update is a non-atomic read-modify-write; under concurrent writers to
//! the same path it is best-effort only (rows may race), which is an
//! accepted limitation of the format.

use std::path::Path;

use am_core::NotificationEvent;
use anyhow::{Context, Result};

const HEADER_TITLE: &str = "# 🔔 Pending Agent Mail";

fn header() -> String {
    format!(
        "{HEADER_TITLE}\n\n\
         *This file is automatically maintained by the am-watch sidecar. \
         Agents should check this file at the start of every session.*\n\n\
         | Agent | Project | From | Subject | Importance | Received | ID |\n\
         | :--- | :--- | :--- | :--- | :--- | :--- | :--- |\n"
    )
}

/// Render one table row for an event.
pub fn render_row(event: &NotificationEvent) -> String {
    let msg = event.message.clone().unwrap_or_default();
    let sender = if msg.from.is_empty() {
        "unknown"
    } else {
        &msg.from
    };
    let subject = if msg.subject.is_empty() {
        "(no subject)"
    } else {
        &msg.subject
    };
    let id = if msg.id == 0 {
        "?".to_string()
    } else {
        msg.id.to_string()
    };
    let ts = if event.timestamp.is_empty() {
        "unknown"
    } else {
        &event.timestamp
    };
    format!(
        "| {} | {} | {sender} | {subject} | {} | {ts} | {id} |",
        event.agent, event.project, msg.importance
    )
}

/// Create or extend the buffer file with this event's row.
///
/// A missing file, or one whose first line is not our header, is rewritten
/// from scratch. Otherwise the row is appended unless an identical row is
/// already present (suppresses duplicate rows from repeated ticks of the
/// same event).
pub fn update(path: &Path, event: &NotificationEvent) -> Result<()> {
    let row = render_row(event);

    if !path.exists() {
        std::fs::write(path, format!("{}{row}\n", header()))
            .context("failed to create buffer file")?;
        return Ok(());
    }

    let text = std::fs::read_to_string(path).context("failed to read buffer file")?;
    let lines: Vec<&str> = text.lines().collect();

    let has_header = lines
        .first()
        .is_some_and(|first| first.contains(HEADER_TITLE));
    if !has_header {
        std::fs::write(path, format!("{}{row}\n", header()))
            .context("failed to rewrite buffer file")?;
        return Ok(());
    }

    if !lines.contains(&row.as_str()) {
        std::fs::write(path, format!("{}\n{row}\n", lines.join("\n")))
            .context("failed to append to buffer file")?;
    }
    Ok(())
}
