//! Channel registry: `RouteKey → live subscriber queues`.
//!
//! The map itself is guarded by one mutex so subscribe, unsubscribe, and the
//! fan-out lookup during publish observe a consistent snapshot. Each queue
//! has its own short-lived lock, so holding the registry lock never waits on
//! a subscriber's consumption rate.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use am_core::{NotificationEvent, RouteKey};
use tokio::sync::Notify;

/// Per-subscriber queue capacity. When full, the oldest pending envelope is
/// discarded to admit the new one (freshness over completeness).
pub const QUEUE_CAPACITY: usize = 50;

/// Lock a mutex, recovering the data if a previous holder panicked. Queue
/// and map contents stay structurally valid across any panic point.
fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}

// ── Slot ──

/// One subscriber's bounded queue plus its wakeup handle.
pub(crate) struct Slot {
    queue: Mutex<VecDeque<NotificationEvent>>,
    notify: Notify,
}

impl Slot {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            queue: Mutex::new(VecDeque::with_capacity(QUEUE_CAPACITY)),
            notify: Notify::new(),
        })
    }

    /// Enqueue without ever blocking. Returns true if an older envelope was
    /// dropped to make room.
    pub(crate) fn push(&self, event: NotificationEvent) -> bool {
        let dropped = {
            let mut queue = lock(&self.queue);
            let dropped = if queue.len() >= QUEUE_CAPACITY {
                queue.pop_front();
                true
            } else {
                false
            };
            queue.push_back(event);
            dropped
        };
        // notify_one stores a permit when no consumer is parked, so a push
        // racing a consumer's empty-check is never lost.
        self.notify.notify_one();
        dropped
    }

    pub(crate) fn pop(&self) -> Option<NotificationEvent> {
        lock(&self.queue).pop_front()
    }

    pub(crate) async fn wait(&self) {
        self.notify.notified().await;
    }
}

// ── Registry ──

pub(crate) struct Registry {
    channels: Mutex<HashMap<RouteKey, Vec<(u64, Arc<Slot>)>>>,
    next_id: AtomicU64,
}

impl Registry {
    pub(crate) fn new() -> Self {
        Self {
            channels: Mutex::new(HashMap::new()),
            next_id: AtomicU64::new(1),
        }
    }

    /// Register a fresh queue under the key. Returns the queue and the id
    /// needed to remove it again.
    pub(crate) fn add(&self, key: &RouteKey) -> (u64, Arc<Slot>) {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let slot = Slot::new();
        lock(&self.channels)
            .entry(key.clone())
            .or_default()
            .push((id, Arc::clone(&slot)));
        (id, slot)
    }

    /// Remove one queue; drops the key entirely once its last queue is gone
    /// so one-shot watchers cannot grow the map without bound.
    pub(crate) fn remove(&self, key: &RouteKey, id: u64) {
        let mut channels = lock(&self.channels);
        if let Some(slots) = channels.get_mut(key) {
            slots.retain(|(slot_id, _)| *slot_id != id);
            if slots.is_empty() {
                channels.remove(key);
            }
        }
    }

    /// Snapshot of the live queues for a key, taken under the registry lock.
    /// Pushes happen after the lock is released.
    pub(crate) fn fanout(&self, key: &RouteKey) -> Vec<Arc<Slot>> {
        lock(&self.channels)
            .get(key)
            .map(|slots| slots.iter().map(|(_, s)| Arc::clone(s)).collect())
            .unwrap_or_default()
    }

    /// Number of routing keys with at least one live subscriber.
    pub(crate) fn channel_count(&self) -> usize {
        lock(&self.channels).len()
    }

    /// Number of live subscribers for a key (0 if the key is absent).
    pub(crate) fn subscriber_count(&self, key: &RouteKey) -> usize {
        lock(&self.channels).get(key).map(Vec::len).unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(n: u64) -> NotificationEvent {
        NotificationEvent::new("p", "a", format!("t{n}"), None)
    }

    #[test]
    fn push_drops_oldest_at_capacity() {
        let slot = Slot::new();
        for n in 0..QUEUE_CAPACITY as u64 {
            assert!(!slot.push(event(n)));
        }
        assert!(slot.push(event(999)));

        // Oldest (t0) was discarded; t1 is now at the front.
        assert_eq!(slot.pop().unwrap().timestamp, "t1");
    }

    #[test]
    fn remove_drops_empty_key() {
        let registry = Registry::new();
        let key = RouteKey::new("p", "a");

        let (id1, _s1) = registry.add(&key);
        let (id2, _s2) = registry.add(&key);
        assert_eq!(registry.subscriber_count(&key), 2);
        assert_eq!(registry.channel_count(), 1);

        registry.remove(&key, id1);
        assert_eq!(registry.subscriber_count(&key), 1);
        assert_eq!(registry.channel_count(), 1);

        registry.remove(&key, id2);
        assert_eq!(registry.subscriber_count(&key), 0);
        assert_eq!(registry.channel_count(), 0);
    }

    #[test]
    fn fanout_unknown_key_is_empty() {
        let registry = Registry::new();
        assert!(registry.fanout(&RouteKey::new("nobody", "home")).is_empty());
    }
}
