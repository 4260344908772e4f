use reqwest::StatusCode;
use serde::Deserialize;
use thiserror::Error;

/// Failure talking to the generation API.
///
/// `Display` yields the string shown to the user: the backend's `detail`
/// when present, otherwise the HTTP status text.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{detail}")]
    Status { status: StatusCode, detail: String },
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("invalid response: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("invalid url: {0}")]
    Url(#[from] url::ParseError),
}

impl ApiError {
    /// Build an error from a non-2xx response body.
    pub(crate) fn from_body(status: StatusCode, body: &[u8]) -> Self {
        #[derive(Deserialize)]
        struct Detail {
            detail: Option<serde_json::Value>,
        }

        let detail = serde_json::from_slice::<Detail>(body)
            .ok()
            .and_then(|d| d.detail)
            .and_then(|v| match v {
                serde_json::Value::String(s) if !s.is_empty() => Some(s),
                serde_json::Value::Null => None,
                // Validation errors carry structured detail; show it raw.
                other => Some(other.to_string()),
            })
            .unwrap_or_else(|| status_text(status));
        ApiError::Status { status, detail }
    }
}

#[cfg(test)]
impl ApiError {
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            ApiError::Transport(e) => e.status(),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(StatusCode::NOT_FOUND)
    }
}

fn status_text(status: StatusCode) -> String {
    status
        .canonical_reason()
        .map(str::to_string)
        .unwrap_or_else(|| status.as_u16().to_string())
}
