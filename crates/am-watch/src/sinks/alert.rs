//! Alert sink: one attention-grabbing line per new message.

use std::io::Write;

use am_core::NotificationEvent;
use colored::Colorize;

/// Render the alert line. Elevated importance (high/urgent) gets the red
/// marker in front of the message summary.
pub fn render_line(event: &NotificationEvent) -> String {
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
    let prefix = if msg.importance.is_elevated() {
        "🔴 "
    } else {
        ""
    };

    format!(
        "🔔 {prefix}New mail for {} in {}: {sender} — {subject} (id={id})",
        event.agent, event.project
    )
}

/// Print the alert line and ring the terminal bell.
pub fn emit(event: &NotificationEvent) {
    println!("{}", render_line(event).bold().yellow());
    let mut stdout = std::io::stdout();
    let _ = stdout.write_all(b"\x07");
    let _ = stdout.flush();
}

#[cfg(test)]
mod tests {
    use super::*;
    use am_core::{Importance, MessageMeta};

    fn event(importance: Importance) -> NotificationEvent {
        NotificationEvent::new(
            "p",
            "a",
            "2025-01-01T00:00:00Z",
            Some(MessageMeta {
                id: 42,
                from: "Alice".into(),
                subject: "Re: deploy plan".into(),
                importance,
                body: None,
            }),
        )
    }

    #[test]
    fn line_names_sender_subject_and_id() {
        let line = render_line(&event(Importance::High));
        assert!(line.contains("Alice"));
        assert!(line.contains("Re: deploy plan"));
        assert!(line.contains("42"));
        assert!(line.contains("🔴"));
    }

    #[test]
    fn normal_importance_has_no_marker() {
        let line = render_line(&event(Importance::Normal));
        assert!(!line.contains("🔴"));
    }

    #[test]
    fn missing_metadata_uses_placeholders() {
        let line = render_line(&NotificationEvent::new("p", "a", "t", None));
        assert!(line.contains("unknown"));
        assert!(line.contains("(no subject)"));
        assert!(line.contains("id=?"));
    }
}
