//! Error taxonomy for the upstream client layer.

/// Errors from talking to the ActiveNet API.
#[derive(Debug, thiserror::Error)]
pub enum UpstreamError {
    /// The HTTP request itself failed (unreachable, DNS, TLS, timeout).
    #[error("upstream request failed: {0}")]
    Network(#[from] reqwest::Error),

    /// The upstream answered with something we cannot interpret:
    /// malformed HTML/JSON, a missing CSRF token, or an envelope without
    /// its required fields.
    #[error("upstream protocol error: {0}")]
    Protocol(String),

    /// Authentication failed: bad credentials, or a mutating call still
    /// rejected after one CSRF refresh and retry.
    #[error("upstream authentication error: {0}")]
    Auth(String),

    /// The upstream returned a non-success response code in an otherwise
    /// well-formed envelope.
    #[error("upstream API error {code}: {message}")]
    Business { code: String, message: String },
}

impl UpstreamError {
    /// The response code carried by a business failure, if any.
    pub fn business_code(&self) -> Option<&str> {
        match self {
            UpstreamError::Business { code, .. } => Some(code),
            _ => None,
        }
    }
}
