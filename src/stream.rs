use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use log::debug;

use crate::error::ClientError;

pub(crate) const CANCEL_POLL_INTERVAL: Duration = Duration::from_millis(25);

/// Operation kind behind one logical stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamKind {
    Chat,
    ShellView,
    FileView,
    SessionList,
}

impl StreamKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Chat => "chat",
            Self::ShellView => "shell-view",
            Self::FileView => "file-view",
            Self::SessionList => "session-list",
        }
    }
}

/// How a stream ended when it was not cancelled or failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamOutcome {
    /// The server emitted a terminal `done` event.
    Completed,
    /// The transport reached end-of-stream without a terminal event.
    Ended,
}

/// Cancellable representation of one open stream.
///
/// The handle transitions open -> closed exactly once. Cancellation is a
/// latch checked before every event dispatch, not merely a transport close
/// request, so no event is delivered after `cancel()` returns even when
/// frames are already buffered. Cancelling one handle never affects another.
#[derive(Debug, Clone)]
pub struct StreamHandle {
    kind: StreamKind,
    cancelled: Arc<AtomicBool>,
    closed: Arc<AtomicBool>,
}

impl StreamHandle {
    #[must_use]
    pub fn new(kind: StreamKind) -> Self {
        Self {
            kind,
            cancelled: Arc::new(AtomicBool::new(false)),
            closed: Arc::new(AtomicBool::new(false)),
        }
    }

    #[must_use]
    pub fn kind(&self) -> StreamKind {
        self.kind
    }

    /// Cancels the stream. Safe to call repeatedly and after natural
    /// completion; only the first call has any effect.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
        if !self.closed.swap(true, Ordering::AcqRel) {
            debug!("{} stream cancelled", self.kind.as_str());
        }
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }

    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    /// Marks the stream closed after natural completion or failure.
    pub(crate) fn mark_closed(&self) {
        self.closed.store(true, Ordering::Release);
    }
}

pub(crate) async fn await_or_cancel<F>(
    future: F,
    handle: &StreamHandle,
) -> Result<F::Output, ClientError>
where
    F: Future,
{
    let mut future = Box::pin(future);

    loop {
        if handle.is_cancelled() {
            return Err(ClientError::Cancelled);
        }

        if let Ok(output) = tokio::time::timeout(CANCEL_POLL_INTERVAL, &mut future).await {
            if handle.is_cancelled() {
                return Err(ClientError::Cancelled);
            }
            return Ok(output);
        }
    }
}
