use futures_util::StreamExt;
use log::debug;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{Client, Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::config::ClientConfig;
use crate::envelope::decode_envelope;
use crate::error::ClientError;
use crate::events::{map_event, AgentEvent};
use crate::sse::SseStreamParser;
use crate::stream::{await_or_cancel, StreamHandle, StreamOutcome};
use crate::url::{api_url, normalize_base_url};

const ACCEPT_JSON: &str = "application/json";
const ACCEPT_EVENT_STREAM: &str = "text/event-stream";

/// Authorization mode for one request.
///
/// Almost everything carries the caller's bearer credential; the shared
/// session lookup is the one intentionally anonymous read path, and
/// token-gated URLs carry their own authorization outside this client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Auth {
    Bearer,
    None,
}

/// Transport primitive for the Manus backend.
///
/// Owns credential attachment, base-URL resolution, envelope unwrapping,
/// and the SSE stream loop. Holds no mutable state across calls; every
/// stream's open/closed flag lives on its own [`StreamHandle`].
#[derive(Debug)]
pub struct ApiClient {
    http: Client,
    config: ClientConfig,
}

impl ApiClient {
    pub fn new(config: ClientConfig) -> Result<Self, ClientError> {
        let base = normalize_base_url(&config.base_url);
        if reqwest::Url::parse(&base).is_err() {
            return Err(ClientError::InvalidBaseUrl(base));
        }

        let mut builder = Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder.build().map_err(ClientError::from)?;
        Ok(Self { http, config })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub(crate) fn build_headers(
        &self,
        accept: &str,
        auth: Auth,
        extra: &[(&str, &str)],
    ) -> Result<HeaderMap, ClientError> {
        let mut headers = HeaderMap::new();
        insert_header(&mut headers, "accept", accept)?;
        insert_header(&mut headers, "content-type", ACCEPT_JSON)?;

        if auth == Auth::Bearer {
            let token = self.config.access_token.trim();
            if token.is_empty() {
                return Err(ClientError::MissingAccessToken);
            }
            insert_header(&mut headers, "authorization", &format!("Bearer {token}"))?;
        }

        if let Some(user_agent) = self.config.user_agent.as_deref() {
            if !user_agent.trim().is_empty() {
                insert_header(&mut headers, "user-agent", user_agent.trim())?;
            }
        }

        for (key, value) in &self.config.extra_headers {
            insert_header(&mut headers, &key.trim().to_ascii_lowercase(), value.trim())?;
        }

        for (key, value) in extra {
            insert_header(&mut headers, key, value)?;
        }

        Ok(headers)
    }

    /// Issues one request/response call and unwraps the envelope.
    ///
    /// Mutating endpoints go through here exactly once per caller intent;
    /// there is no retry or deduplication at this layer.
    pub(crate) async fn request_json<T, B>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
        auth: Auth,
        extra_headers: &[(&str, &str)],
    ) -> Result<Option<T>, ClientError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let headers = self.build_headers(ACCEPT_JSON, auth, extra_headers)?;
        let mut request = self
            .http
            .request(method, api_url(&self.config.base_url, path))
            .headers(headers);
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await.map_err(ClientError::from)?;
        let status = response.status();
        let body = response.text().await.map_err(ClientError::from)?;

        if !status.is_success() {
            return Err(error_from_response(status, &body));
        }

        decode_envelope(status, &body)
    }

    /// Like [`Self::request_json`] but requires a payload in the envelope.
    pub(crate) async fn request_required<T, B>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
        auth: Auth,
        extra_headers: &[(&str, &str)],
    ) -> Result<T, ClientError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.request_json(method, path, body, auth, extra_headers)
            .await?
            .ok_or_else(|| {
                ClientError::Decode("response envelope is missing required data".to_string())
            })
    }

    /// Like [`Self::request_json`] for endpoints whose success data is null.
    pub(crate) async fn request_empty<B>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> Result<(), ClientError>
    where
        B: Serialize + ?Sized,
    {
        self.request_json::<Value, B>(method, path, body, Auth::Bearer, &[])
            .await
            .map(|_| ())
    }

    /// Opens one logical SSE stream and dispatches decoded events in
    /// arrival order.
    ///
    /// The cancellation latch on `handle` is checked before every transport
    /// await and before every dispatch: once `cancel()` returns, `on_event`
    /// never fires again, even for frames the transport already buffered.
    /// Transport failure (connection drop, non-2xx, malformed frame)
    /// surfaces exactly once as the returned error and closes the handle.
    /// No auto-retry, no hidden reconnection.
    pub async fn open_stream<B, F>(
        &self,
        path: &str,
        body: &B,
        handle: &StreamHandle,
        on_event: F,
    ) -> Result<StreamOutcome, ClientError>
    where
        B: Serialize + ?Sized,
        F: FnMut(AgentEvent),
    {
        if handle.is_closed() {
            return Err(ClientError::Validation(
                "stream handle is already closed".to_string(),
            ));
        }

        debug!("opening {} stream at {path}", handle.kind().as_str());
        let result = self.run_stream(path, body, handle, on_event).await;
        handle.mark_closed();
        debug!(
            "{} stream closed ({})",
            handle.kind().as_str(),
            match &result {
                Ok(outcome) => match outcome {
                    StreamOutcome::Completed => "completed",
                    StreamOutcome::Ended => "ended",
                },
                Err(_) => "failed",
            }
        );
        result
    }

    async fn run_stream<B, F>(
        &self,
        path: &str,
        body: &B,
        handle: &StreamHandle,
        mut on_event: F,
    ) -> Result<StreamOutcome, ClientError>
    where
        B: Serialize + ?Sized,
        F: FnMut(AgentEvent),
    {
        let headers = self.build_headers(ACCEPT_EVENT_STREAM, Auth::Bearer, &[])?;
        let request = self
            .http
            .post(api_url(&self.config.base_url, path))
            .headers(headers)
            .json(body)
            .send();

        let response = await_or_cancel(request, handle)
            .await?
            .map_err(ClientError::from)?;
        let status = response.status();
        if !status.is_success() {
            let body = await_or_cancel(response.text(), handle)
                .await?
                .unwrap_or_default();
            return Err(error_from_response(status, &body));
        }

        let mut bytes = response.bytes_stream();
        let mut parser = SseStreamParser::default();

        loop {
            let Some(chunk) = await_or_cancel(bytes.next(), handle).await? else {
                return Ok(StreamOutcome::Ended);
            };
            let chunk = chunk.map_err(ClientError::from)?;

            for frame in parser.feed(&chunk) {
                // Latch check per frame, not per chunk: a cancel racing an
                // in-flight chunk must still suppress buffered frames.
                if handle.is_cancelled() {
                    return Err(ClientError::Cancelled);
                }

                let payload = serde_json::from_str::<Value>(&frame.data).map_err(|error| {
                    ClientError::Decode(format!("malformed stream frame: {error}"))
                })?;
                let Some(event) = map_event(frame.event.as_deref(), payload) else {
                    return Err(ClientError::Decode(
                        "stream frame is missing an event discriminator".to_string(),
                    ));
                };

                match event {
                    AgentEvent::Error { code, message } => {
                        return Err(ClientError::StreamFailed {
                            message: message
                                .or_else(|| code.clone())
                                .unwrap_or_else(|| "agent stream failed".to_string()),
                            code,
                        });
                    }
                    event => {
                        let terminal = event.is_terminal();
                        on_event(event);
                        if terminal {
                            return Ok(StreamOutcome::Completed);
                        }
                    }
                }
            }
        }
    }
}

fn insert_header(headers: &mut HeaderMap, key: &str, value: &str) -> Result<(), ClientError> {
    let name = HeaderName::from_bytes(key.as_bytes())
        .map_err(|_| ClientError::InvalidHeader(key.to_string()))?;
    let value =
        HeaderValue::from_str(value).map_err(|_| ClientError::InvalidHeader(key.to_string()))?;
    headers.insert(name, value);
    Ok(())
}

/// Translates a non-2xx response into the taxonomy.
///
/// Failure bodies usually still carry the envelope; when they do not, the
/// HTTP status alone decides the kind.
fn error_from_response(status: StatusCode, body: &str) -> ClientError {
    match decode_envelope::<Value>(status, body) {
        Ok(_) => ClientError::from_status(
            status,
            status.canonical_reason().unwrap_or("request failed"),
        ),
        Err(error @ (ClientError::Unauthorized(_)
        | ClientError::Forbidden(_)
        | ClientError::NotFound(_)
        | ClientError::Conflict(_)
        | ClientError::Validation(_)
        | ClientError::Status { .. })) => error,
        Err(_) => {
            let message = if body.trim().is_empty() {
                status
                    .canonical_reason()
                    .unwrap_or("request failed")
                    .to_string()
            } else {
                body.trim().to_string()
            };
            ClientError::from_status(status, message)
        }
    }
}
