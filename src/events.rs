use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::sessions::SessionSummary;

/// Server-owned session lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    Created,
    Running,
    Stopped,
    Deleted,
}

impl SessionStatus {
    pub fn parse(value: &str) -> Option<Self> {
        Some(match value {
            "created" => Self::Created,
            "running" => Self::Running,
            "stopped" => Self::Stopped,
            "deleted" => Self::Deleted,
            _ => return None,
        })
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Running => "running",
            Self::Stopped => "stopped",
            Self::Deleted => "deleted",
        }
    }
}

/// Stream event emitted by the SSE decoder after normalization.
///
/// The payload shape is operation-specific: chat turns emit deltas and
/// agent activity, shell/file views emit chunks, and the session listing
/// emits whole snapshots. Delivery order within one stream is always the
/// server's emission order.
#[derive(Debug, Clone, PartialEq)]
pub enum AgentEvent {
    /// Incremental assistant text for a chat turn.
    MessageDelta { content: String },
    /// Agent tool activity surfaced during a chat turn.
    ToolActivity {
        name: String,
        status: Option<String>,
    },
    /// Server-assigned session title change.
    TitleUpdated { title: String },
    /// Plan step progress during a chat turn.
    StepUpdated {
        id: Option<String>,
        status: Option<String>,
        description: Option<String>,
    },
    /// One chunk of shell session output.
    ShellOutput { content: String },
    /// One chunk of viewed file content.
    FileContent { content: String },
    /// Full session-list snapshot from the listing stream.
    SessionsSnapshot { sessions: Vec<SessionSummary> },
    /// Terminal marker: the operation finished and the stream will close.
    Done,
    /// Terminal failure reported inside the stream body.
    Error {
        code: Option<String>,
        message: Option<String>,
    },
    /// Unknown event type retained for passthrough rather than dropped.
    Unknown { event_type: String, payload: Value },
}

impl AgentEvent {
    /// Returns true when this event terminates its stream.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done | Self::Error { .. })
    }
}

/// Map a decoded SSE frame into a typed event.
///
/// `event_type` is the frame's `event:` field; frames without one fall back
/// to a `type` discriminator inside the payload.
pub fn map_event(event_type: Option<&str>, payload: Value) -> Option<AgentEvent> {
    let name = match event_type {
        Some(name) if !name.trim().is_empty() => name.trim().to_string(),
        _ => payload.get("type")?.as_str()?.to_string(),
    };

    Some(match name.as_str() {
        "message" | "delta" => AgentEvent::MessageDelta {
            content: str_field(&payload, "content").unwrap_or_default(),
        },
        "tool" => AgentEvent::ToolActivity {
            name: str_field(&payload, "name").unwrap_or_default(),
            status: str_field(&payload, "status"),
        },
        "title" => AgentEvent::TitleUpdated {
            title: str_field(&payload, "title").unwrap_or_default(),
        },
        "step" => AgentEvent::StepUpdated {
            id: str_field(&payload, "id"),
            status: str_field(&payload, "status"),
            description: str_field(&payload, "description"),
        },
        "shell" => AgentEvent::ShellOutput {
            content: str_field(&payload, "content").unwrap_or_default(),
        },
        "file" => AgentEvent::FileContent {
            content: str_field(&payload, "content").unwrap_or_default(),
        },
        "sessions" => {
            let sessions = payload
                .get("sessions")
                .cloned()
                .map(serde_json::from_value::<Vec<SessionSummary>>)
                .and_then(Result::ok)
                .unwrap_or_default();
            AgentEvent::SessionsSnapshot { sessions }
        }
        "done" => AgentEvent::Done,
        "error" => AgentEvent::Error {
            code: str_field(&payload, "code"),
            message: str_field(&payload, "message"),
        },
        _ => AgentEvent::Unknown {
            event_type: name,
            payload,
        },
    })
}

fn str_field(payload: &Value, field: &str) -> Option<String> {
    payload
        .get(field)
        .and_then(Value::as_str)
        .map(ToString::to_string)
}
