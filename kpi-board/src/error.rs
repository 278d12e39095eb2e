use thiserror::Error;

/// All errors a sync of the sheet range can end in.
///
/// Parse problems inside the range never show up here; they degrade to
/// placeholder values instead.
#[derive(Debug, Clone, Eq, PartialEq, Error)]
pub enum SyncError {
    #[error("{}", http_message(.status, .detail))]
    Http { status: u16, detail: Option<String> },

    #[error("request failed: {0}")]
    Transport(String),

    #[error("malformed response body: {0}")]
    Body(String),

    #[error("invalid sheet configuration: {0}")]
    Config(String),
}

fn http_message(status: &u16, detail: &Option<String>) -> String {
    match detail {
        Some(detail) if !detail.trim().is_empty() => format!("HTTP {} — {}", status, detail.trim()),
        _ => format!("HTTP {}", status),
    }
}

impl SyncError {
    /// Whether the server rejected the request itself (bad key, unknown sheet)
    pub fn is_rejected(&self) -> bool {
        matches!(self, SyncError::Http { status, .. } if (400..500).contains(status))
    }
}

impl From<reqwest::Error> for SyncError {
    fn from(value: reqwest::Error) -> Self {
        if value.is_decode() {
            Self::Body(value.to_string())
        } else {
            Self::Transport(value.to_string())
        }
    }
}

impl From<serde_json::Error> for SyncError {
    fn from(value: serde_json::Error) -> Self {
        Self::Body(value.to_string())
    }
}
