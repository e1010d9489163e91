use base64::{engine::general_purpose, Engine as _};
use log::debug;
use reqwest::Method;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::client::{ApiClient, Auth};
use crate::error::ClientError;
use crate::url::{normalize_base_url, ws_base_url};

/// Default TTL requested when the caller does not specify one.
pub const DEFAULT_TTL_MINUTES: u32 = 60;

/// Resource class a capability token is valid for.
///
/// Tokens are single-scope: a file token never opens a VNC socket and vice
/// versa. URL builders enforce this as a typed usage error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenScope {
    File,
    Vnc,
}

impl TokenScope {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::File => "file",
            Self::Vnc => "vnc",
        }
    }
}

/// Scope-limited, time-boxed credential for one resource.
///
/// Minted over the caller's bearer credential; the composed URL then
/// carries its own authorization, which is what lets header-less consumers
/// (iframes, WebSocket viewers, plain hyperlinks) reach the resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessToken {
    pub scope: TokenScope,
    pub resource_id: String,
    /// Opaque token value embedded as a `token` query parameter.
    pub value: String,
    /// Expiry as reported by the backend, which clamps the requested TTL
    /// server-side. `None` when the backend reported nothing recoverable.
    pub expires_at: Option<OffsetDateTime>,
}

#[derive(Debug, Serialize)]
struct MintRequest<'a> {
    resource_type: &'a str,
    resource_id: &'a str,
    expire_minutes: u32,
}

#[derive(Debug, Deserialize)]
struct MintData {
    token: String,
    /// Unix seconds; older backend builds omit this field.
    #[serde(default)]
    expires_at: Option<i64>,
}

impl ApiClient {
    /// Mints a capability token for one resource.
    ///
    /// `ttl_minutes` defaults to [`DEFAULT_TTL_MINUTES`]; no upper bound is
    /// enforced client-side — the backend clamps, and the returned expiry
    /// is whatever it actually granted, never the requested TTL.
    pub async fn mint_access_token(
        &self,
        scope: TokenScope,
        resource_id: &str,
        ttl_minutes: Option<u32>,
    ) -> Result<AccessToken, ClientError> {
        if resource_id.trim().is_empty() {
            return Err(ClientError::Validation(
                "access token needs a target resource id".to_string(),
            ));
        }
        let ttl = ttl_minutes.unwrap_or(DEFAULT_TTL_MINUTES);
        if ttl == 0 {
            return Err(ClientError::Validation(
                "access token TTL must be at least one minute".to_string(),
            ));
        }

        let data: MintData = self
            .request_required(
                Method::POST,
                "resources/access-token",
                Some(&MintRequest {
                    resource_type: scope.as_str(),
                    resource_id,
                    expire_minutes: ttl,
                }),
                Auth::Bearer,
                &[],
            )
            .await?;

        let expires_at = data
            .expires_at
            .and_then(|seconds| OffsetDateTime::from_unix_timestamp(seconds).ok())
            .or_else(|| token_expiry_claim(&data.token));
        debug!(
            "minted {} token for '{resource_id}' (expires_at: {expires_at:?})",
            scope.as_str()
        );

        Ok(AccessToken {
            scope,
            resource_id: resource_id.to_string(),
            value: data.token,
            expires_at,
        })
    }

    /// Composes the credential-less download URL for a file token.
    pub fn file_download_url(&self, token: &AccessToken) -> Result<String, ClientError> {
        require_scope(token, TokenScope::File)?;
        Ok(format!(
            "{}/files/{}?token={}",
            normalize_base_url(&self.config().base_url),
            token.resource_id,
            token.value
        ))
    }

    /// Composes the WebSocket URL for a VNC token.
    pub fn vnc_socket_url(&self, token: &AccessToken) -> Result<String, ClientError> {
        require_scope(token, TokenScope::Vnc)?;
        Ok(format!(
            "{}/sessions/{}/vnc?token={}",
            ws_base_url(&self.config().base_url),
            token.resource_id,
            token.value
        ))
    }
}

fn require_scope(token: &AccessToken, expected: TokenScope) -> Result<(), ClientError> {
    if token.scope == expected {
        Ok(())
    } else {
        Err(ClientError::Validation(format!(
            "token scoped to '{}' cannot build a '{}' URL",
            token.scope.as_str(),
            expected.as_str()
        )))
    }
}

/// Recovers the expiry claim from a JWT-shaped token value.
fn token_expiry_claim(token: &str) -> Option<OffsetDateTime> {
    let mut parts = token.split('.');
    let _header = parts.next()?;
    let payload_segment = parts.next()?;
    let _signature = parts.next()?;
    if parts.next().is_some() {
        return None;
    }

    let decoded = general_purpose::URL_SAFE_NO_PAD
        .decode(payload_segment)
        .or_else(|_| general_purpose::URL_SAFE.decode(payload_segment))
        .ok()?;
    let claims = serde_json::from_slice::<ExpiryClaims>(&decoded).ok()?;
    OffsetDateTime::from_unix_timestamp(claims.exp?).ok()
}

#[derive(Debug, Deserialize)]
struct ExpiryClaims {
    #[serde(default)]
    exp: Option<i64>,
}
