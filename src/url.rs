/// Default base URL for Manus backend requests.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8000/api/v1";

/// Normalize a base URL for API requests.
///
/// Normalization rules:
/// 1) empty input falls back to [`DEFAULT_BASE_URL`]
/// 2) surrounding whitespace and trailing slashes are stripped
pub fn normalize_base_url(input: &str) -> String {
    let base = if input.trim().is_empty() {
        DEFAULT_BASE_URL
    } else {
        input.trim()
    };

    base.trim_end_matches('/').to_string()
}

/// Join a request path onto a normalized base URL.
pub fn api_url(base: &str, path: &str) -> String {
    format!("{}/{}", normalize_base_url(base), path.trim_start_matches('/'))
}

/// Map a normalized HTTP base URL to its WebSocket counterpart.
///
/// `https://` becomes `wss://`, `http://` becomes `ws://`. A base without a
/// recognized scheme is returned unchanged apart from normalization, which
/// keeps scheme policy with the deployment rather than guessing here.
pub fn ws_base_url(base: &str) -> String {
    let base = normalize_base_url(base);
    if let Some(rest) = base.strip_prefix("https://") {
        return format!("wss://{rest}");
    }
    if let Some(rest) = base.strip_prefix("http://") {
        return format!("ws://{rest}");
    }
    base
}
