//! Polling transport: signal-file mtime watcher.
//!
//! The relay host overwrites `<signals-root>/projects/<p>/agents/<a>.signal`
//! with one JSON envelope per notification. This transport checks the file's
//! modification time on a fixed interval and parses the full content when it
//! advances. A missing file or an unchanged mtime is a no-op tick.

use std::path::PathBuf;
use std::time::{Duration, SystemTime};

use am_core::NotificationEvent;
use anyhow::Result;
use tokio::sync::mpsc;

pub struct PollTransport {
    path: PathBuf,
    interval: Duration,
    last_mtime: Option<SystemTime>,
}

impl PollTransport {
    /// A signal file that already exists at startup sets the mtime baseline,
    /// so the previous run's last notification is not replayed.
    pub fn new(path: PathBuf, interval: Duration) -> Self {
        let last_mtime = std::fs::metadata(&path).and_then(|m| m.modified()).ok();
        Self {
            path,
            interval,
            last_mtime,
        }
    }

    pub fn path(&self) -> &std::path::Path {
        &self.path
    }

    /// Run the poll loop forever, feeding envelopes into `tx`.
    ///
    /// Returns only when the receiving side of the pipeline is dropped.
    pub async fn run(mut self, tx: mpsc::Sender<NotificationEvent>) -> Result<()> {
        tracing::info!(path = %self.path.display(), interval = ?self.interval, "polling signal file");
        loop {
            if let Some(event) = self.poll_once() {
                if tx.send(event).await.is_err() {
                    return Ok(());
                }
            }
            tokio::time::sleep(self.interval).await;
        }
    }

    /// One tick: read and parse the signal file if its mtime advanced.
    ///
    /// Read and parse failures are logged and skipped; the mtime mark still
    /// advances so a persistently bad file is not re-reported every tick.
    pub fn poll_once(&mut self) -> Option<NotificationEvent> {
        let mtime = std::fs::metadata(&self.path)
            .and_then(|m| m.modified())
            .ok()?;
        if let Some(last) = self.last_mtime {
            if mtime <= last {
                return None;
            }
        }
        self.last_mtime = Some(mtime);

        let content = match std::fs::read_to_string(&self.path) {
            Ok(c) => c,
            Err(e) => {
                tracing::warn!(error = %e, path = %self.path.display(), "failed to read signal file");
                return None;
            }
        };
        match serde_json::from_str(&content) {
            Ok(event) => Some(event),
            Err(e) => {
                tracing::warn!(error = %e, path = %self.path.display(), "invalid JSON in signal file");
                None
            }
        }
    }
}
