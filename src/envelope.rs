use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::Value;

use crate::error::ClientError;

/// Response envelope shared by every JSON endpoint.
///
/// Payloads arrive as `{ "success": true, "data": ... }` or
/// `{ "success": false, "error": { "code", "message", "details" } }`.
/// Decoding failure is its own error kind, never a crash.
#[derive(Debug, Deserialize)]
pub struct ApiEnvelope<T> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<ApiErrorBody>,
}

/// Structured failure fields carried by a `success: false` envelope.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorBody {
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub details: Option<Value>,
}

impl ApiErrorBody {
    fn message_or(&self, fallback: &str) -> String {
        self.message
            .as_deref()
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .unwrap_or(fallback)
            .to_string()
    }
}

impl<T> ApiEnvelope<T> {
    /// Unwraps the envelope into its payload or a typed failure.
    ///
    /// The envelope's `error.code` takes precedence over the HTTP status for
    /// taxonomy classification; an unrecognized code falls back to status
    /// mapping so failures never lose their kind.
    pub fn into_result(self, status: StatusCode) -> Result<Option<T>, ClientError> {
        if self.success {
            return Ok(self.data);
        }

        let Some(error) = self.error else {
            return Err(ClientError::Decode(
                "failure envelope is missing an 'error' object".to_string(),
            ));
        };

        let message = error.message_or(
            status
                .canonical_reason()
                .unwrap_or("request failed"),
        );

        Err(match error.code.as_deref().map(str::to_ascii_uppercase) {
            Some(code) => match code.as_str() {
                "UNAUTHORIZED" | "INVALID_TOKEN" | "TOKEN_EXPIRED" | "INVALID_SHARE_TOKEN" => {
                    ClientError::Unauthorized(message)
                }
                "FORBIDDEN" => ClientError::Forbidden(message),
                "NOT_FOUND" => ClientError::NotFound(message),
                "CONFLICT" | "INVALID_STATE" => ClientError::Conflict(message),
                "VALIDATION_ERROR" | "BAD_REQUEST" => ClientError::Validation(message),
                _ => ClientError::from_status(status, message),
            },
            None => ClientError::from_status(status, message),
        })
    }
}

/// Decode a raw body into an envelope and unwrap it in one step.
pub fn decode_envelope<T>(status: StatusCode, body: &str) -> Result<Option<T>, ClientError>
where
    T: serde::de::DeserializeOwned,
{
    let envelope = serde_json::from_str::<ApiEnvelope<T>>(body)
        .map_err(|error| ClientError::Decode(format!("invalid response envelope: {error}")))?;
    envelope.into_result(status)
}

#[cfg(test)]
mod tests {
    use reqwest::StatusCode;
    use serde::Deserialize;

    use super::decode_envelope;
    use crate::error::{ClientError, ErrorKind};

    #[derive(Debug, Deserialize, PartialEq)]
    struct Payload {
        session_id: String,
    }

    #[test]
    fn success_envelope_unwraps_data() {
        let body = r#"{"success":true,"data":{"session_id":"s-1"}}"#;
        let payload = decode_envelope::<Payload>(StatusCode::OK, body)
            .expect("success envelope should decode")
            .expect("data should be present");

        assert_eq!(
            payload,
            Payload {
                session_id: "s-1".to_string(),
            }
        );
    }

    #[test]
    fn success_envelope_allows_null_data() {
        let body = r#"{"success":true,"data":null}"#;
        let payload =
            decode_envelope::<Payload>(StatusCode::OK, body).expect("envelope should decode");
        assert!(payload.is_none());
    }

    #[test]
    fn failure_envelope_maps_code_to_taxonomy_kind() {
        let body = r#"{"success":false,"error":{"code":"NOT_FOUND","message":"no such session"}}"#;
        let error = decode_envelope::<Payload>(StatusCode::OK, body)
            .expect_err("failure envelope should yield an error");

        assert_eq!(error.kind(), ErrorKind::NotFound);
        assert!(error.to_string().contains("no such session"));
    }

    #[test]
    fn failure_envelope_falls_back_to_http_status() {
        let body = r#"{"success":false,"error":{"code":"SOMETHING_ELSE","message":"nope"}}"#;
        let error = decode_envelope::<Payload>(StatusCode::CONFLICT, body)
            .expect_err("failure envelope should yield an error");

        assert_eq!(error.kind(), ErrorKind::Conflict);
    }

    #[test]
    fn failure_envelope_without_error_object_is_a_decode_failure() {
        let body = r#"{"success":false}"#;
        let error = decode_envelope::<Payload>(StatusCode::OK, body)
            .expect_err("missing error object should fail");

        assert!(matches!(error, ClientError::Decode(_)));
    }

    #[test]
    fn malformed_envelope_is_a_decode_failure_not_a_crash() {
        let error = decode_envelope::<Payload>(StatusCode::OK, "{not json")
            .expect_err("malformed body should fail");

        assert_eq!(error.kind(), ErrorKind::Decode);
    }

    #[test]
    fn share_token_rejection_classifies_as_unauthorized() {
        let body =
            r#"{"success":false,"error":{"code":"INVALID_SHARE_TOKEN","message":"bad token"}}"#;
        let error = decode_envelope::<Payload>(StatusCode::OK, body)
            .expect_err("invalid share token should fail");

        assert_eq!(error.kind(), ErrorKind::Unauthorized);
    }
}
