use serde::{Deserialize, Serialize};
use std::str::FromStr;

// ── Routing key ──

/// The `(project, agent)` pair identifying who should receive an envelope.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RouteKey {
    pub project: String,
    pub agent: String,
}

impl RouteKey {
    pub fn new(project: impl Into<String>, agent: impl Into<String>) -> Self {
        Self {
            project: project.into(),
            agent: agent.into(),
        }
    }
}

impl std::fmt::Display for RouteKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.project, self.agent)
    }
}

// ── Importance ──

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Importance {
    #[default]
    Normal,
    High,
    Urgent,
}

impl Importance {
    /// High and urgent messages get the elevated-urgency marker in alerts.
    pub fn is_elevated(self) -> bool {
        matches!(self, Self::High | Self::Urgent)
    }
}

impl std::fmt::Display for Importance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Normal => "normal",
            Self::High => "high",
            Self::Urgent => "urgent",
        };
        write!(f, "{s}")
    }
}

impl FromStr for Importance {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "normal" => Ok(Self::Normal),
            "high" => Ok(Self::High),
            "urgent" => Ok(Self::Urgent),
            other => Err(format!("unknown Importance: {other}")),
        }
    }
}

// ── Message metadata ──

/// Metadata about the message that triggered a notification.
///
/// `id` is 0 when the source did not attach a message id; the dedup guard
/// treats 0 as "absent" and falls back to timestamp comparison.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MessageMeta {
    #[serde(default)]
    pub id: u64,
    #[serde(default)]
    pub from: String,
    #[serde(default)]
    pub subject: String,
    #[serde(default)]
    pub importance: Importance,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
}

// ── Notification envelope ──

/// One notification event, immutable once constructed.
///
/// `message` is `None` for non-mail signals; `timestamp` is an opaque string
/// compared only for equality (dedup) and display.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NotificationEvent {
    #[serde(default)]
    pub timestamp: String,
    #[serde(default)]
    pub project: String,
    #[serde(default)]
    pub agent: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<MessageMeta>,
}

impl NotificationEvent {
    pub fn new(
        project: impl Into<String>,
        agent: impl Into<String>,
        timestamp: impl Into<String>,
        message: Option<MessageMeta>,
    ) -> Self {
        Self {
            timestamp: timestamp.into(),
            project: project.into(),
            agent: agent.into(),
            message,
        }
    }

    /// Construct an envelope stamped with the current UTC time.
    pub fn now(
        project: impl Into<String>,
        agent: impl Into<String>,
        message: Option<MessageMeta>,
    ) -> Self {
        Self::new(project, agent, chrono::Utc::now().to_rfc3339(), message)
    }

    pub fn route_key(&self) -> RouteKey {
        RouteKey::new(self.project.clone(), self.agent.clone())
    }

    /// Message id for dedup purposes; 0 when no message metadata is attached.
    pub fn message_id(&self) -> u64 {
        self.message.as_ref().map(|m| m.id).unwrap_or(0)
    }
}
