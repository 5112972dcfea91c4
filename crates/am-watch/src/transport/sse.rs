//! Streaming transport: long-lived SSE connection to the relay.
//!
//! Connects to `{url}/sse/events` for one routing key and forwards every
//! `data:` payload as one envelope. Connection failures of any kind are
//! recovered locally with exponential backoff; the loop only ends when the
//! pipeline receiver goes away.

use std::time::Duration;

use am_core::NotificationEvent;
use anyhow::{Context, Result};
use futures_util::StreamExt;
use tokio::sync::mpsc;

use super::backoff::Backoff;

/// Connect timeout; reads have no timeout (the stream idles between events).
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

pub struct SseTransport {
    pub url: String,
    pub project: String,
    pub agent: String,
    pub token: Option<String>,
}

impl SseTransport {
    /// Run the reconnect loop forever, feeding envelopes into `tx`.
    ///
    /// Returns only when the receiving side of the pipeline is dropped.
    pub async fn run(self, tx: mpsc::Sender<NotificationEvent>) -> Result<()> {
        let client = reqwest::Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .build()
            .context("failed to build HTTP client")?;
        let endpoint = format!("{}/sse/events", self.url.trim_end_matches('/'));

        let mut backoff = Backoff::new();
        loop {
            match self.connect(&client, &endpoint).await {
                Ok(resp) => {
                    tracing::info!(endpoint = %endpoint, "connected to SSE stream");
                    backoff.reset();
                    if !self.read_stream(resp, &tx).await {
                        return Ok(());
                    }
                    tracing::warn!("SSE stream ended, reconnecting");
                }
                Err(e) => {
                    tracing::warn!(error = %e, "SSE connection failed");
                }
            }

            if tx.is_closed() {
                return Ok(());
            }
            tokio::time::sleep(backoff.next()).await;
        }
    }

    async fn connect(&self, client: &reqwest::Client, endpoint: &str) -> Result<reqwest::Response> {
        let mut req = client.get(endpoint).query(&[
            ("project_slug", self.project.as_str()),
            ("agent_name", self.agent.as_str()),
        ]);
        if let Some(token) = &self.token {
            req = req.bearer_auth(token);
        }
        Ok(req.send().await?.error_for_status()?)
    }

    /// Drain one connection. Returns false when the pipeline receiver is
    /// gone (time to stop), true when the connection should be retried.
    async fn read_stream(
        &self,
        resp: reqwest::Response,
        tx: &mpsc::Sender<NotificationEvent>,
    ) -> bool {
        let mut stream = resp.bytes_stream();
        let mut buf: Vec<u8> = Vec::new();

        while let Some(chunk) = stream.next().await {
            let chunk = match chunk {
                Ok(c) => c,
                Err(e) => {
                    tracing::warn!(error = %e, "SSE read error");
                    return true;
                }
            };
            buf.extend_from_slice(&chunk);

            while let Some(pos) = buf.iter().position(|&b| b == b'\n') {
                let raw: Vec<u8> = buf.drain(..=pos).collect();
                let line = String::from_utf8_lossy(&raw[..raw.len() - 1]);
                let Some(payload) = data_payload(&line) else {
                    continue;
                };
                match serde_json::from_str::<NotificationEvent>(payload) {
                    Ok(event) => {
                        if tx.send(event).await.is_err() {
                            return false;
                        }
                    }
                    Err(e) => {
                        tracing::warn!(error = %e, payload, "invalid JSON in SSE data line");
                    }
                }
            }
        }
        true
    }
}

/// Extract the payload of an SSE `data:` line.
///
/// Comment lines, `event:` framing, and blank separators yield `None`.
fn data_payload(line: &str) -> Option<&str> {
    let line = line.strip_suffix('\r').unwrap_or(line);
    let rest = line.strip_prefix("data:")?;
    Some(rest.strip_prefix(' ').unwrap_or(rest))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn data_lines_yield_their_payload() {
        assert_eq!(data_payload("data: {\"a\":1}"), Some("{\"a\":1}"));
        assert_eq!(data_payload("data:{\"a\":1}"), Some("{\"a\":1}"));
        assert_eq!(data_payload("data: x\r"), Some("x"));
    }

    #[test]
    fn framing_lines_are_ignored() {
        assert_eq!(data_payload(""), None);
        assert_eq!(data_payload("event: notification"), None);
        assert_eq!(data_payload(": keep-alive"), None);
        assert_eq!(data_payload("id: 7"), None);
    }
}
