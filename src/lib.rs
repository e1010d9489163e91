//! Transport-only Manus API client primitives.
//!
//! This crate owns request/response building, envelope unwrapping, and SSE
//! stream decoding for the Manus agent backend. It intentionally contains no
//! login/registration code and no UI coupling: presentation of errors and
//! retry/backoff policy belong to the caller.
//!
//! Streaming follows a strict cancellation contract: every open stream is
//! represented by a [`StreamHandle`] whose latch is checked before each
//! event dispatch, so no event is delivered after `cancel()` returns even
//! when the transport has already buffered frames.

pub mod client;
pub mod config;
pub mod envelope;
pub mod error;
pub mod events;
pub mod permissions;
pub mod sessions;
pub mod sse;
pub mod stream;
pub mod tokens;
pub mod url;

pub use client::ApiClient;
pub use config::ClientConfig;
pub use error::{ClientError, ErrorKind};
pub use events::{AgentEvent, SessionStatus};
pub use permissions::{
    can_delete_user, can_edit_user, can_manage_users, can_view_user, has_permission, Permission,
    Role, User,
};
pub use sessions::{
    AttachmentRef, ChatTurn, FileInfo, Session, SessionSummary, ShareGrant, SharedSession,
};
pub use sse::{SseFrame, SseStreamParser};
pub use stream::{StreamHandle, StreamKind, StreamOutcome};
pub use tokens::{AccessToken, TokenScope};
pub use url::normalize_base_url;
