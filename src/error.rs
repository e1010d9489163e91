use reqwest::StatusCode;
use thiserror::Error;

/// Taxonomy kind attached to every failure.
///
/// Callers render messages from the kind alone; raw transport detail stays
/// inside the error value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Missing, invalid, or expired credential or token.
    Unauthorized,
    /// Valid identity, insufficient role or ownership.
    Forbidden,
    /// Session or resource id unknown or not owned by the caller.
    NotFound,
    /// Invalid state transition reported by the backend.
    Conflict,
    /// Malformed client-supplied input, resolved before any network call.
    Validation,
    /// Network or protocol failure on a request or stream.
    Transport,
    /// Response body did not match the envelope or event schema.
    Decode,
    /// The caller cancelled the operation through its stream handle.
    Cancelled,
}

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("access token is required")]
    MissingAccessToken,

    #[error("invalid base URL: {0}")]
    InvalidBaseUrl(String),

    #[error("invalid header '{0}'")]
    InvalidHeader(String),

    #[error("unauthorized: {0}")]
    Unauthorized(String),

    #[error("forbidden: {0}")]
    Forbidden(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("validation failed: {0}")]
    Validation(String),

    #[error("HTTP {status} {message}")]
    Status { status: StatusCode, message: String },

    #[error("request error: {0}")]
    Request(#[from] reqwest::Error),

    #[error("failed to decode response: {0}")]
    Decode(String),

    #[error("stream failed: {message}")]
    StreamFailed {
        code: Option<String>,
        message: String,
    },

    #[error("stream was cancelled")]
    Cancelled,
}

impl ClientError {
    /// Maps an error response to its taxonomy kind.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Unauthorized(_) | Self::MissingAccessToken => ErrorKind::Unauthorized,
            Self::Forbidden(_) => ErrorKind::Forbidden,
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::Conflict(_) => ErrorKind::Conflict,
            Self::Validation(_) | Self::InvalidBaseUrl(_) | Self::InvalidHeader(_) => {
                ErrorKind::Validation
            }
            Self::Status { status, .. } => kind_for_status(*status),
            Self::Request(_) | Self::StreamFailed { .. } => ErrorKind::Transport,
            Self::Decode(_) => ErrorKind::Decode,
            Self::Cancelled => ErrorKind::Cancelled,
        }
    }

    /// Builds the taxonomy error for a non-2xx response.
    ///
    /// Statuses without a dedicated kind stay as [`ClientError::Status`] and
    /// classify as transport failures.
    #[must_use]
    pub fn from_status(status: StatusCode, message: impl Into<String>) -> Self {
        let message = message.into();
        match status {
            StatusCode::UNAUTHORIZED => Self::Unauthorized(message),
            StatusCode::FORBIDDEN => Self::Forbidden(message),
            StatusCode::NOT_FOUND => Self::NotFound(message),
            StatusCode::CONFLICT => Self::Conflict(message),
            StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => {
                Self::Validation(message)
            }
            _ => Self::Status { status, message },
        }
    }
}

fn kind_for_status(status: StatusCode) -> ErrorKind {
    match status {
        StatusCode::UNAUTHORIZED => ErrorKind::Unauthorized,
        StatusCode::FORBIDDEN => ErrorKind::Forbidden,
        StatusCode::NOT_FOUND => ErrorKind::NotFound,
        StatusCode::CONFLICT => ErrorKind::Conflict,
        StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => ErrorKind::Validation,
        _ => ErrorKind::Transport,
    }
}
