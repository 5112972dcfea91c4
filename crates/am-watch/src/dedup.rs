//! Duplicate-event guard.
//!
//! Both transports can replay an event the watcher already handled: SSE
//! reconnection re-delivers the last envelope, and a poll tick can re-read
//! a signal file whose content did not change. The guard assumes
//! monotonically non-decreasing message ids from the source and filters
//! those replays within one watcher run; state resets only on restart.

/// Process-local high-water marks for the current run.
#[derive(Debug, Default)]
pub struct DedupGuard {
    last_seen_id: u64,
    last_seen_timestamp: String,
}

impl DedupGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if this event was already processed.
    ///
    /// An event is a duplicate when its id is non-zero and at or below the
    /// high-water mark, or when both its timestamp and id equal the last
    /// seen pair. Events without a usable id (0) are judged only by the
    /// timestamp rule. Novel events advance the marks: the id only ever
    /// moves forward, the timestamp is simply replaced.
    pub fn is_duplicate(&mut self, message_id: u64, timestamp: &str) -> bool {
        if message_id != 0 && message_id <= self.last_seen_id {
            return true;
        }
        if !timestamp.is_empty()
            && timestamp == self.last_seen_timestamp
            && message_id == self.last_seen_id
        {
            return true;
        }
        if message_id != 0 {
            self.last_seen_id = message_id;
        }
        if !timestamp.is_empty() {
            self.last_seen_timestamp = timestamp.to_string();
        }
        false
    }

    /// Highest message id seen so far (0 before the first id).
    pub fn high_water(&self) -> u64 {
        self.last_seen_id
    }
}
