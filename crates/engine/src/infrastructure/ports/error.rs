//! Error types for port operations.

use std::time::Duration;

/// Failures talking to the playable locations provider.
///
/// Clone is required: one failed fetch is handed to every caller waiting on it.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ProviderError {
    /// Transport-level failure (connect, TLS, body read).
    #[error("Provider request failed: {0}")]
    RequestFailed(String),

    /// Provider answered with a non-success status.
    #[error("Provider returned status {status}: {message}")]
    Status { status: u16, message: String },

    /// Body could not be decoded.
    #[error("Invalid provider response: {0}")]
    InvalidResponse(String),

    #[error("Provider did not answer within {0:?}")]
    Timeout(Duration),
}

impl ProviderError {
    pub fn status(status: u16, message: impl Into<String>) -> Self {
        Self::Status {
            status,
            message: message.into(),
        }
    }

    /// Whether repeating the same request may succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::RequestFailed(_) | Self::InvalidResponse(_) | Self::Timeout(_) => true,
            // Rate limiting and server-side errors; 4xx means the request itself is wrong
            Self::Status { status, .. } => *status == 429 || *status >= 500,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_errors_are_not_transient() {
        assert!(!ProviderError::status(400, "bad area filter").is_transient());
        assert!(!ProviderError::status(403, "key rejected").is_transient());
    }

    #[test]
    fn server_errors_and_throttling_are_transient() {
        assert!(ProviderError::status(503, "").is_transient());
        assert!(ProviderError::status(429, "").is_transient());
        assert!(ProviderError::Timeout(Duration::from_secs(1)).is_transient());
    }
}
