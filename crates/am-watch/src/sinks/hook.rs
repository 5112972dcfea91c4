//! Hook sink: fire-and-forget shell command per notification.
//!
//! The command runs under `sh -c` with the event's fields exported as
//! `AM_*` environment variables. The watcher never waits for the child or
//! inspects its exit status.

use am_core::NotificationEvent;
use anyhow::{Context, Result};
use tokio::process::Command;

/// Environment contract: exact names, string-valued, empty when the field
/// is absent.
pub fn env_vars(event: &NotificationEvent) -> [(&'static str, String); 6] {
    let msg = event.message.clone().unwrap_or_default();
    let id = if msg.id == 0 {
        String::new()
    } else {
        msg.id.to_string()
    };
    let importance = if event.message.is_some() {
        msg.importance.to_string()
    } else {
        String::new()
    };
    [
        ("AM_PROJECT", event.project.clone()),
        ("AM_AGENT", event.agent.clone()),
        ("AM_MESSAGE_ID", id),
        ("AM_FROM", msg.from),
        ("AM_SUBJECT", msg.subject),
        ("AM_IMPORTANCE", importance),
    ]
}

pub fn spawn(command: &str, event: &NotificationEvent) -> Result<()> {
    let mut cmd = Command::new("sh");
    cmd.arg("-c").arg(command);
    for (name, value) in env_vars(event) {
        cmd.env(name, value);
    }
    // The child is dropped immediately; the runtime reaps it in the
    // background.
    cmd.spawn().context("failed to spawn hook command")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use am_core::{Importance, MessageMeta};

    #[test]
    fn env_contract_with_full_metadata() {
        let event = NotificationEvent::new(
            "proj",
            "agent",
            "t",
            Some(MessageMeta {
                id: 7,
                from: "Alice".into(),
                subject: "hi".into(),
                importance: Importance::Urgent,
                body: None,
            }),
        );
        let vars = env_vars(&event);
        assert_eq!(
            vars,
            [
                ("AM_PROJECT", "proj".to_string()),
                ("AM_AGENT", "agent".to_string()),
                ("AM_MESSAGE_ID", "7".to_string()),
                ("AM_FROM", "Alice".to_string()),
                ("AM_SUBJECT", "hi".to_string()),
                ("AM_IMPORTANCE", "urgent".to_string()),
            ]
        );
    }

    #[test]
    fn absent_fields_are_empty_strings() {
        let event = NotificationEvent::new("proj", "agent", "t", None);
        let vars = env_vars(&event);
        assert_eq!(vars[2], ("AM_MESSAGE_ID", String::new()));
        assert_eq!(vars[3], ("AM_FROM", String::new()));
        assert_eq!(vars[4], ("AM_SUBJECT", String::new()));
        assert_eq!(vars[5], ("AM_IMPORTANCE", String::new()));
    }
}
