//! SSE wire framing for the streaming endpoint.
//!
//! The HTTP layer that owns the connection is an external collaborator; it
//! drains a [`Subscription`](crate::Subscription) and writes these frames.

use am_core::{NotificationEvent, Result};

/// Encode one envelope as an SSE data line.
pub fn data_frame(event: &NotificationEvent) -> Result<String> {
    Ok(format!("data: {}\n\n", serde_json::to_string(event)?))
}

/// Comment frame sent periodically so idle connections are not reaped by
/// intermediaries. Clients ignore it.
pub fn keep_alive_frame() -> &'static str {
    ": keep-alive\n\n"
}

#[cfg(test)]
mod tests {
    use super::*;
    use am_core::{Importance, MessageMeta};

    #[test]
    fn data_frame_is_one_sse_event() {
        let event = NotificationEvent::new(
            "p",
            "a",
            "2025-01-01T00:00:00Z",
            Some(MessageMeta {
                id: 3,
                from: "Bob".into(),
                subject: "hi".into(),
                importance: Importance::Normal,
                body: None,
            }),
        );
        let frame = data_frame(&event).unwrap();
        assert!(frame.starts_with("data: {"));
        assert!(frame.ends_with("\n\n"));

        // The payload after the prefix must parse back to the same envelope.
        let payload = frame.trim_start_matches("data: ").trim_end();
        let parsed: NotificationEvent = serde_json::from_str(payload).unwrap();
        assert_eq!(parsed, event);
    }

    #[test]
    fn keep_alive_is_a_comment() {
        assert!(keep_alive_frame().starts_with(':'));
    }
}
