//! Auto-fetch sink: pull the latest inbox message after each notification.
//!
//! Issues one JSON-RPC `tools/call` of `fetch_inbox` against the relay host
//! and prints a short summary. Any failure (network, malformed response,
//! empty inbox) degrades to a labeled line; it never aborts the watcher.

use std::time::Duration;

use anyhow::{Context, Result};
use colored::Colorize;
use serde::Deserialize;
use serde_json::{json, Value};

/// Outbound request timeout; bounds how long the event loop can stall on
/// one fetch.
const FETCH_TIMEOUT: Duration = Duration::from_secs(10);

/// Body preview length for `--show-body`, in characters.
const BODY_PREVIEW_CHARS: usize = 300;

/// One inbox entry as returned by `fetch_inbox` (newest first).
#[derive(Debug, Default, Deserialize)]
pub struct InboxMessage {
    #[serde(default)]
    pub subject: String,
    #[serde(default)]
    pub from: String,
    #[serde(default)]
    pub importance: String,
    #[serde(default)]
    pub body_md: Option<String>,
}

pub struct InboxFetcher {
    client: reqwest::Client,
    endpoint: String,
    token: Option<String>,
}

impl InboxFetcher {
    pub fn new(url: &str, token: Option<String>) -> Result<Self> {
        Ok(Self {
            client: reqwest::Client::builder()
                .timeout(FETCH_TIMEOUT)
                .build()
                .context("failed to build HTTP client")?,
            endpoint: format!("{}/mcp/", url.trim_end_matches('/')),
            token,
        })
    }

    /// Fetch the newest inbox entry and print a summary line; degrade on
    /// any failure.
    pub async fn report_latest(&self, project: &str, agent: &str, show_body: bool) {
        match self.fetch_latest(project, agent, show_body).await {
            Ok(Some(m)) => {
                let importance = if m.importance.is_empty() {
                    "normal"
                } else {
                    &m.importance
                };
                println!(
                    "  {} {} from {} [{importance}]",
                    "Latest:".cyan(),
                    m.subject.bold(),
                    m.from
                );
                if show_body {
                    if let Some(body) = &m.body_md {
                        let preview: String = body.chars().take(BODY_PREVIEW_CHARS).collect();
                        println!("  {}", preview.dimmed());
                    }
                }
            }
            Ok(None) => println!("  {}", "(inbox empty)".dimmed()),
            Err(e) => println!("  {} {e:#}", "Auto-fetch error:".red()),
        }
    }

    /// One `fetch_inbox(limit=1)` call; `Ok(None)` means the inbox is empty.
    pub async fn fetch_latest(
        &self,
        project: &str,
        agent: &str,
        include_bodies: bool,
    ) -> Result<Option<InboxMessage>> {
        let payload = json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": "tools/call",
            "params": {
                "name": "fetch_inbox",
                "arguments": {
                    "project_key": project,
                    "agent_name": agent,
                    "limit": 1,
                    "include_bodies": include_bodies,
                },
            },
        });

        let mut req = self.client.post(&self.endpoint).json(&payload);
        if let Some(token) = &self.token {
            req = req.bearer_auth(token);
        }
        let response: Value = req
            .send()
            .await
            .context("inbox fetch request failed")?
            .error_for_status()
            .context("inbox fetch rejected")?
            .json()
            .await
            .context("inbox fetch returned invalid JSON")?;

        let messages =
            extract_messages(&response).context("could not parse inbox response")?;
        match messages.into_iter().next() {
            Some(v) => Ok(Some(
                serde_json::from_value(v).context("malformed inbox message")?,
            )),
            None => Ok(None),
        }
    }
}

/// Navigate the JSON-RPC response to the message list.
///
/// Prefers `result.structuredContent.result` (parsed objects); falls back
/// to the first `result.content[]` text block, whose text is either a list
/// directly or wrapped in `{"result": [...]}`.
fn extract_messages(response: &Value) -> Option<Vec<Value>> {
    let rpc_result = response.get("result")?;

    if let Some(sc) = rpc_result.get("structuredContent") {
        if let Some(list) = sc.get("result").and_then(Value::as_array) {
            return Some(list.clone());
        }
    }

    for block in rpc_result.get("content")?.as_array()? {
        if block.get("type").and_then(Value::as_str) != Some("text") {
            continue;
        }
        let text = block.get("text").and_then(Value::as_str)?;
        let inner: Value = serde_json::from_str(text).ok()?;
        return match inner {
            Value::Array(list) => Some(list),
            Value::Object(map) => match map.get("result") {
                Some(Value::Array(list)) => Some(list.clone()),
                _ => Some(Vec::new()),
            },
            _ => None,
        };
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn structured_content_is_preferred() {
        let response = json!({
            "result": {
                "structuredContent": {
                    "result": [{"subject": "s1", "from": "Bob", "importance": "normal"}]
                },
                "content": [{"type": "text", "text": "[]"}]
            }
        });
        let messages = extract_messages(&response).unwrap();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0]["from"], "Bob");
    }

    #[test]
    fn text_block_with_bare_list() {
        let response = json!({
            "result": {
                "content": [
                    {"type": "image", "data": "..."},
                    {"type": "text", "text": "[{\"subject\": \"s2\"}]"}
                ]
            }
        });
        let messages = extract_messages(&response).unwrap();
        assert_eq!(messages[0]["subject"], "s2");
    }

    #[test]
    fn text_block_with_wrapped_list() {
        let response = json!({
            "result": {
                "content": [{"type": "text", "text": "{\"result\": [{\"subject\": \"s3\"}]}"}]
            }
        });
        let messages = extract_messages(&response).unwrap();
        assert_eq!(messages[0]["subject"], "s3");
    }

    #[test]
    fn empty_inbox_is_an_empty_list() {
        let response = json!({
            "result": {
                "content": [{"type": "text", "text": "{\"result\": []}"}]
            }
        });
        assert!(extract_messages(&response).unwrap().is_empty());
    }

    #[test]
    fn unrecognized_shapes_yield_none() {
        assert!(extract_messages(&json!({})).is_none());
        assert!(extract_messages(&json!({"result": {}})).is_none());
        assert!(extract_messages(&json!({
            "result": {"content": [{"type": "text", "text": "not json"}]}
        }))
        .is_none());
    }
}
