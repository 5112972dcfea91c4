use std::sync::Arc;

use am_core::{MessageMeta, NotificationEvent, RouteKey};

use crate::registry::Registry;

// ── Broadcaster ──

/// Fan-out façade over the channel registry.
///
/// Construct one per process and pass clones (cheap, shared) to every
/// publish and subscribe call site; there is deliberately no process-global
/// instance.
#[derive(Clone)]
pub struct Broadcaster {
    registry: Arc<Registry>,
}

impl Broadcaster {
    pub fn new() -> Self {
        Self {
            registry: Arc::new(Registry::new()),
        }
    }

    /// Subscribe to notifications for one `(project, agent)` pair.
    ///
    /// The returned [`Subscription`] sees every envelope published for the
    /// key while it is alive, up to its queue capacity (drop-oldest on
    /// overflow). Dropping it — on any exit path of the consuming task —
    /// unregisters the queue, and the key itself once no queues remain.
    pub fn subscribe(&self, project: &str, agent: &str) -> Subscription {
        let key = RouteKey::new(project, agent);
        let (id, slot) = self.registry.add(&key);
        tracing::info!(
            key = %key,
            subscribers = self.registry.subscriber_count(&key),
            "notification subscribe"
        );
        Subscription {
            key,
            id,
            slot,
            registry: Arc::clone(&self.registry),
        }
    }

    /// Deliver an envelope to every live subscriber of its routing key.
    ///
    /// Never blocks: a queue at capacity sheds its oldest pending envelope.
    /// With no subscribers this is a no-op (no buffering for absent
    /// watchers).
    pub fn publish(&self, event: &NotificationEvent) {
        let key = event.route_key();
        let slots = self.registry.fanout(&key);
        if slots.is_empty() {
            tracing::trace!(key = %key, "no subscribers, envelope dropped");
            return;
        }

        tracing::debug!(key = %key, subscribers = slots.len(), "broadcasting envelope");
        for slot in slots {
            if slot.push(event.clone()) {
                tracing::warn!(key = %key, "subscriber queue full, dropped oldest envelope");
            }
        }
    }

    /// Number of routing keys with live subscribers.
    pub fn channel_count(&self) -> usize {
        self.registry.channel_count()
    }

    /// Number of live subscribers for a key.
    pub fn subscriber_count(&self, project: &str, agent: &str) -> usize {
        self.registry.subscriber_count(&RouteKey::new(project, agent))
    }
}

impl Default for Broadcaster {
    fn default() -> Self {
        Self::new()
    }
}

// ── Subscription ──

/// One subscriber's handle: a lazy sequence of envelopes for a routing key.
///
/// `recv()` suspends until the next envelope; the sequence is restartable
/// only by subscribing again. Teardown happens in `Drop`.
pub struct Subscription {
    key: RouteKey,
    id: u64,
    slot: Arc<crate::registry::Slot>,
    registry: Arc<Registry>,
}

impl Subscription {
    /// Wait for the next envelope.
    pub async fn recv(&mut self) -> NotificationEvent {
        loop {
            if let Some(event) = self.slot.pop() {
                return event;
            }
            self.slot.wait().await;
        }
    }

    /// Take the next pending envelope without waiting.
    pub fn try_recv(&mut self) -> Option<NotificationEvent> {
        self.slot.pop()
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.registry.remove(&self.key, self.id);
        tracing::info!(key = %self.key, "notification unsubscribe");
    }
}

// ── Publish entry point ──

/// Entry point for the message store: build an envelope and broadcast it.
/// Fire-and-forget from the caller's perspective.
pub fn publish_notification(
    broadcaster: &Broadcaster,
    project_slug: &str,
    agent_name: &str,
    timestamp: &str,
    message: Option<MessageMeta>,
) {
    let event = NotificationEvent::new(project_slug, agent_name, timestamp, message);
    broadcaster.publish(&event);
}
