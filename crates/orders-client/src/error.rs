use serde_json::Value;

#[derive(thiserror::Error, Debug)]
pub enum ClientError {
    /// Transport failure: connection refused, timeout, or a body that could
    /// not be read.
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("request failed with status {status}: {message}")]
    Request { status: u16, message: String },
    #[error("unexpected response body: {0}")]
    Decode(String),
    #[error("invalid url: {0}")]
    InvalidUrl(String),
}

impl ClientError {
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Request { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }

    pub fn is_network(&self) -> bool {
        matches!(self, ClientError::Network(_))
    }
}

/// Message of a non-2xx response. The backend reports failures as
/// `{"detail": ...}`.
pub(crate) fn error_message(status: u16, body: &[u8]) -> String {
    match serde_json::from_slice::<Value>(body) {
        Ok(value) => match value.get("detail") {
            Some(Value::String(detail)) => detail.clone(),
            Some(Value::Null) | None => format!("HTTP {status}"),
            Some(other) => other.to_string(),
        },
        Err(_) => "Unknown error".to_string(),
    }
}
