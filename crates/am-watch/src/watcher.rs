//! Watcher run loop: one transport feeding the dedup + sink pipeline.

use std::str::FromStr;
use std::time::Duration;

use am_core::{signal, NotificationEvent};
use anyhow::{Context, Result};
use tokio::sync::mpsc;

use crate::dedup::DedupGuard;
use crate::sinks::{SinkConfig, SinkDispatcher};
use crate::transport::{PollTransport, SseTransport};

/// Depth of the transport → pipeline channel.
const PIPELINE_DEPTH: usize = 100;

// ── Method selection ──

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatchMethod {
    /// Poll the local signal file's mtime.
    File,
    /// Stream from the relay's SSE endpoint.
    Sse,
}

impl FromStr for WatchMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "file" => Ok(Self::File),
            "sse" => Ok(Self::Sse),
            other => Err(format!("unknown watch method: {other} (expected file or sse)")),
        }
    }
}

// ── Configuration ──

/// Everything a watcher run needs, fixed at startup.
#[derive(Debug, Clone)]
pub struct WatcherConfig {
    pub project: String,
    pub agent: String,
    pub method: WatchMethod,
    pub url: String,
    pub token: Option<String>,
    pub interval: Duration,
    pub sinks: SinkConfig,
}

// ── Pipeline ──

/// Dedup guard plus sink dispatcher: the transport-agnostic half of the
/// watcher.
pub struct Pipeline {
    dedup: DedupGuard,
    dispatcher: SinkDispatcher,
}

impl Pipeline {
    pub fn new(dispatcher: SinkDispatcher) -> Self {
        Self {
            dedup: DedupGuard::new(),
            dispatcher,
        }
    }

    /// Handle one envelope; returns false if it was a duplicate and no sink
    /// ran.
    pub async fn handle(&mut self, event: &NotificationEvent) -> bool {
        if self
            .dedup
            .is_duplicate(event.message_id(), &event.timestamp)
        {
            tracing::debug!(
                id = event.message_id(),
                timestamp = %event.timestamp,
                "duplicate event skipped"
            );
            return false;
        }
        self.dispatcher.dispatch(event).await;
        true
    }
}

// ── Run loop ──

/// Run the watcher until the process is terminated.
///
/// Spawns the selected transport and consumes its events through the
/// pipeline. Transport and sink errors are handled locally; nothing inside
/// the steady-state loop terminates the process.
pub async fn run(config: WatcherConfig) -> Result<()> {
    let dispatcher = SinkDispatcher::new(config.sinks, &config.url, config.token.clone())
        .context("failed to initialize sinks")?;
    let mut pipeline = Pipeline::new(dispatcher);

    let (tx, mut rx) = mpsc::channel(PIPELINE_DEPTH);
    match config.method {
        WatchMethod::File => {
            let path = signal::signal_path(&config.project, &config.agent)
                .context("failed to resolve signal file path")?;
            let transport = PollTransport::new(path, config.interval);
            tokio::spawn(async move {
                if let Err(e) = transport.run(tx).await {
                    tracing::error!(error = %e, "polling transport stopped");
                }
            });
        }
        WatchMethod::Sse => {
            let transport = SseTransport {
                url: config.url.clone(),
                project: config.project.clone(),
                agent: config.agent.clone(),
                token: config.token.clone(),
            };
            tokio::spawn(async move {
                if let Err(e) = transport.run(tx).await {
                    tracing::error!(error = %e, "SSE transport stopped");
                }
            });
        }
    }

    while let Some(event) = rx.recv().await {
        pipeline.handle(&event).await;
    }

    // The transports loop forever; the channel only closes if one of them
    // failed before entering its loop.
    anyhow::bail!("event transport ended unexpectedly")
}
