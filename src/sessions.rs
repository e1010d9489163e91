use reqwest::Method;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::client::{ApiClient, Auth};
use crate::error::ClientError;
use crate::events::{AgentEvent, SessionStatus};
use crate::stream::{StreamHandle, StreamKind, StreamOutcome};

/// Snapshot of one session as reported by the backend.
///
/// The backend owns the lifecycle; this client never caches or fabricates
/// session state. Fields the backend omits stay `None`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub session_id: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub status: Option<SessionStatus>,
    /// Present while the session is shared.
    #[serde(default)]
    pub share_id: Option<String>,
}

/// One row of the session listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSummary {
    pub session_id: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub status: Option<SessionStatus>,
    #[serde(default)]
    pub latest_message: Option<String>,
    /// Unix seconds of the latest message, when any.
    #[serde(default)]
    pub latest_message_at: Option<i64>,
    #[serde(default)]
    pub unread_message_count: u32,
}

/// Credentials minted by `share`; both halves are required for the
/// anonymous shared lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShareGrant {
    pub share_id: String,
    pub share_token: String,
}

/// Read-only session view returned by the anonymous shared lookup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SharedSession {
    pub session_id: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub status: Option<SessionStatus>,
}

/// Metadata for one file produced inside a session's sandbox.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileInfo {
    pub file_id: String,
    pub filename: String,
    #[serde(default)]
    pub content_type: Option<String>,
    #[serde(default)]
    pub size: Option<u64>,
    #[serde(default)]
    pub upload_date: Option<String>,
}

/// Reference to a previously uploaded file, attached to a chat turn by id
/// rather than re-uploaded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttachmentRef {
    pub file_id: String,
    pub filename: String,
}

impl AttachmentRef {
    pub fn new(file_id: impl Into<String>, filename: impl Into<String>) -> Self {
        Self {
            file_id: file_id.into(),
            filename: filename.into(),
        }
    }
}

/// One submitted chat turn.
///
/// The contract accepts an ordered sequence of attachment references; any
/// one-attachment-at-a-time restriction is UI policy, not enforced here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatTurn {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Unix seconds at submission.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<i64>,
    /// Continuation token to resume an interrupted turn.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event_id: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attachments: Vec<AttachmentRef>,
}

impl ChatTurn {
    #[must_use]
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            message: Some(message.into()),
            timestamp: None,
            event_id: None,
            attachments: Vec::new(),
        }
    }

    /// Builds a continuation turn that resumes from a prior event id.
    #[must_use]
    pub fn resume(event_id: impl Into<String>) -> Self {
        Self {
            message: None,
            timestamp: None,
            event_id: Some(event_id.into()),
            attachments: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_timestamp(mut self, unix_seconds: i64) -> Self {
        self.timestamp = Some(unix_seconds);
        self
    }

    #[must_use]
    pub fn with_event_id(mut self, event_id: impl Into<String>) -> Self {
        self.event_id = Some(event_id.into());
        self
    }

    /// Appends one attachment reference; order is preserved on the wire.
    #[must_use]
    pub fn with_attachment(mut self, attachment: AttachmentRef) -> Self {
        self.attachments.push(attachment);
        self
    }

    fn validate(&self) -> Result<(), ClientError> {
        if self.message.is_none() && self.event_id.is_none() {
            return Err(ClientError::Validation(
                "chat turn needs a message or an event_id continuation".to_string(),
            ));
        }
        if let Some(attachment) = self
            .attachments
            .iter()
            .find(|attachment| attachment.file_id.trim().is_empty())
        {
            return Err(ClientError::Validation(format!(
                "attachment '{}' has no file id",
                attachment.filename
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Serialize)]
struct ShellViewRequest<'a> {
    session_id: &'a str,
}

#[derive(Debug, Serialize)]
struct FileViewRequest<'a> {
    file: &'a str,
}

#[derive(Debug, Deserialize)]
struct ListSessionsData {
    #[serde(default)]
    sessions: Vec<SessionSummary>,
}

/// Session lifecycle operations.
///
/// All mutating calls are issued at most once per caller intent: outcomes
/// surface verbatim and retrying is the caller's decision, made only after
/// confirming what the prior attempt did.
impl ApiClient {
    /// Creates a new session; the server allocates the id and initial status.
    pub async fn create_session(&self) -> Result<Session, ClientError> {
        self.request_required(Method::PUT, "sessions", None::<&Value>, Auth::Bearer, &[])
            .await
    }

    /// Fetches one owned session, NotFound when unknown or unowned.
    pub async fn get_session(&self, session_id: &str) -> Result<Session, ClientError> {
        self.request_required(
            Method::GET,
            &format!("sessions/{session_id}"),
            None::<&Value>,
            Auth::Bearer,
            &[],
        )
        .await
    }

    /// Lists the caller's sessions in backend order.
    pub async fn list_sessions(&self) -> Result<Vec<SessionSummary>, ClientError> {
        let data: ListSessionsData = self
            .request_required(Method::GET, "sessions", None::<&Value>, Auth::Bearer, &[])
            .await?;
        Ok(data.sessions)
    }

    /// Requests a stop; Conflict from an unstoppable state surfaces as the
    /// backend reports it.
    pub async fn stop_session(&self, session_id: &str) -> Result<(), ClientError> {
        self.request_empty(
            Method::POST,
            &format!("sessions/{session_id}/stop"),
            None::<&Value>,
        )
        .await
    }

    /// Deletes the session; later `get`/stream calls yield NotFound.
    pub async fn delete_session(&self, session_id: &str) -> Result<(), ClientError> {
        self.request_empty(
            Method::DELETE,
            &format!("sessions/{session_id}"),
            None::<&Value>,
        )
        .await
    }

    /// Shares the session, producing the (share_id, share_token) pair that
    /// keys the anonymous read path.
    pub async fn share_session(&self, session_id: &str) -> Result<ShareGrant, ClientError> {
        self.request_required(
            Method::POST,
            &format!("sessions/{session_id}/share"),
            None::<&Value>,
            Auth::Bearer,
            &[],
        )
        .await
    }

    /// Revokes sharing; the shared lookup stops resolving afterwards.
    pub async fn unshare_session(&self, session_id: &str) -> Result<(), ClientError> {
        self.request_empty(
            Method::DELETE,
            &format!("sessions/{session_id}/share"),
            None::<&Value>,
        )
        .await
    }

    /// Anonymous shared-session lookup.
    ///
    /// This is the one path that intentionally bypasses the bearer
    /// credential: authorization is the `X-Share-Token` header alone.
    pub async fn get_shared_session(
        &self,
        share_id: &str,
        share_token: &str,
    ) -> Result<SharedSession, ClientError> {
        self.request_required(
            Method::GET,
            &format!("sessions/shared/{share_id}"),
            None::<&Value>,
            Auth::None,
            &[("x-share-token", share_token)],
        )
        .await
    }

    /// Lists files produced in the session's sandbox.
    pub async fn list_session_files(
        &self,
        session_id: &str,
    ) -> Result<Vec<FileInfo>, ClientError> {
        self.request_required(
            Method::GET,
            &format!("sessions/{session_id}/files"),
            None::<&Value>,
            Auth::Bearer,
            &[],
        )
        .await
    }
}

/// Streamed operations. All four share the cancellation and ordering
/// contract of [`ApiClient::open_stream`]; only payload and event schema
/// differ.
impl ApiClient {
    /// Streams one chat turn's agent events.
    pub async fn stream_chat<F>(
        &self,
        session_id: &str,
        turn: &ChatTurn,
        handle: &StreamHandle,
        on_event: F,
    ) -> Result<StreamOutcome, ClientError>
    where
        F: FnMut(AgentEvent),
    {
        check_kind(handle, StreamKind::Chat)?;
        turn.validate()?;
        self.open_stream(&format!("sessions/{session_id}/chat"), turn, handle, on_event)
            .await
    }

    /// Streams output chunks of one sandbox shell session.
    pub async fn stream_shell_view<F>(
        &self,
        session_id: &str,
        shell_session_id: &str,
        handle: &StreamHandle,
        on_event: F,
    ) -> Result<StreamOutcome, ClientError>
    where
        F: FnMut(AgentEvent),
    {
        check_kind(handle, StreamKind::ShellView)?;
        self.open_stream(
            &format!("sessions/{session_id}/shell"),
            &ShellViewRequest {
                session_id: shell_session_id,
            },
            handle,
            on_event,
        )
        .await
    }

    /// Streams content chunks of one sandbox file.
    pub async fn stream_file_view<F>(
        &self,
        session_id: &str,
        file: &str,
        handle: &StreamHandle,
        on_event: F,
    ) -> Result<StreamOutcome, ClientError>
    where
        F: FnMut(AgentEvent),
    {
        check_kind(handle, StreamKind::FileView)?;
        if file.trim().is_empty() {
            return Err(ClientError::Validation(
                "file view needs a non-empty path".to_string(),
            ));
        }
        self.open_stream(
            &format!("sessions/{session_id}/file"),
            &FileViewRequest { file },
            handle,
            on_event,
        )
        .await
    }

    /// Long-lived session-list stream emitting snapshots on change.
    pub async fn stream_session_list<F>(
        &self,
        handle: &StreamHandle,
        on_event: F,
    ) -> Result<StreamOutcome, ClientError>
    where
        F: FnMut(AgentEvent),
    {
        check_kind(handle, StreamKind::SessionList)?;
        self.open_stream("sessions", &Value::Null, handle, on_event)
            .await
    }
}

fn check_kind(handle: &StreamHandle, expected: StreamKind) -> Result<(), ClientError> {
    if handle.kind() == expected {
        Ok(())
    } else {
        Err(ClientError::Validation(format!(
            "stream handle kind '{}' cannot open a '{}' stream",
            handle.kind().as_str(),
            expected.as_str()
        )))
    }
}
