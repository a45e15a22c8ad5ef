//! Client error types.

use thiserror::Error;

/// Errors that can occur when talking to the portal API.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The request never produced a response.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The server answered with `success: false` or a non-2xx status.
    /// `message` is the envelope's `error`, verbatim.
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// The response body was not the expected shape.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// The configured base URL is unusable.
    #[error("invalid base URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Token file could not be read or written.
    #[error("token file error: {0}")]
    Io(#[from] std::io::Error),
}

impl ClientError {
    /// HTTP status, when the server answered.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Whether the server rejected the credentials or token.
    #[must_use]
    pub const fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Api { status: 401, .. })
    }
}
