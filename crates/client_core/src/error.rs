use thiserror::Error;

#[derive(Debug, Error)]
pub enum RemoteError {
    #[error("invalid server url '{url}': {reason}")]
    InvalidServerUrl { url: String, reason: String },
    #[error("request failed with status {status}: {message}")]
    Status { status: u16, message: String },
    #[error(transparent)]
    Transport(#[from] reqwest::Error),
}

/// Pulls a human readable message out of an error body. FastAPI style
/// `{"detail": ..}` and `{"error": ..}` payloads are unwrapped, anything else
/// is returned trimmed.
pub(crate) fn error_body_message(body: &str) -> String {
    let parsed = serde_json::from_str::<serde_json::Value>(body).ok();
    let field = parsed.as_ref().and_then(|value| {
        ["detail", "error"]
            .iter()
            .find_map(|key| value.get(*key).and_then(|v| v.as_str()))
    });
    match field {
        Some(message) => message.to_string(),
        None if body.trim().is_empty() => "empty response body".to_string(),
        None => body.trim().to_string(),
    }
}
