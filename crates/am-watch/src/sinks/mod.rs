//! Notification sinks.
//!
//! Each sink is one independently configured reaction to a novel event. The
//! dispatcher runs every enabled sink per event; a failure in one sink is
//! reported and never prevents the others from running. With no sink
//! configured the raw envelope is printed, so a bare watcher still shows
//! traffic.

pub mod alert;
pub mod buffer;
pub mod fetch;
pub mod hook;
pub mod sentinel;

use std::path::PathBuf;

use am_core::NotificationEvent;
use anyhow::Result;
use colored::Colorize;

use fetch::InboxFetcher;

// ── Configuration ──

/// The set of enabled sinks, fixed for the lifetime of one watcher run.
#[derive(Debug, Clone, Default)]
pub struct SinkConfig {
    /// Print a human-visible alert line with terminal bell.
    pub alert: bool,
    /// Fetch and print the latest inbox message after each notification.
    pub auto_fetch: bool,
    /// Include the message body in auto-fetch output.
    pub show_body: bool,
    /// Shell command executed fire-and-forget per notification.
    pub on_notify: Option<String>,
    /// Markdown table file summarizing pending notifications.
    pub buffer_file: Option<PathBuf>,
    /// Single-slot JSON file consumed by an external hook.
    pub sentinel_file: Option<PathBuf>,
}

impl SinkConfig {
    pub fn any_enabled(&self) -> bool {
        self.alert
            || self.auto_fetch
            || self.on_notify.is_some()
            || self.buffer_file.is_some()
            || self.sentinel_file.is_some()
    }
}

// ── Dispatcher ──

pub struct SinkDispatcher {
    config: SinkConfig,
    fetcher: InboxFetcher,
}

impl SinkDispatcher {
    pub fn new(config: SinkConfig, url: &str, token: Option<String>) -> Result<Self> {
        Ok(Self {
            config,
            fetcher: InboxFetcher::new(url, token)?,
        })
    }

    /// Run every configured sink for one (already deduplicated) event.
    pub async fn dispatch(&self, event: &NotificationEvent) {
        if !self.config.any_enabled() {
            match serde_json::to_string(event) {
                Ok(json) => println!("{} {json}", "New signal:".bold().green()),
                Err(e) => tracing::error!(error = %e, "failed to render signal"),
            }
            return;
        }

        if self.config.alert {
            alert::emit(event);
        }

        if self.config.auto_fetch {
            self.fetcher
                .report_latest(&event.project, &event.agent, self.config.show_body)
                .await;
        }

        if let Some(command) = &self.config.on_notify {
            if let Err(e) = hook::spawn(command, event) {
                tracing::error!(error = %e, "on-notify hook failed to start");
            }
        }

        if let Some(path) = &self.config.buffer_file {
            if let Err(e) = buffer::update(path, event) {
                tracing::error!(error = %e, path = %path.display(), "buffer file update failed");
            }
        }

        if let Some(path) = &self.config.sentinel_file {
            if let Err(e) = sentinel::write(path, event) {
                tracing::error!(error = %e, path = %path.display(), "sentinel file write failed");
            }
        }
    }
}
