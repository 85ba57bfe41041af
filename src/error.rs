use thiserror::Error;

/// Failure of a single remote call against the Overseerr API.
///
/// Every client method returns this instead of raising, so callers decide
/// per call site whether a failure aborts the operation (pagination) or only
/// degrades one item (enrichment).
#[derive(Debug, Clone, Error)]
pub enum TransportError {
    #[error("request to {url} failed: {message}")]
    Network { url: String, message: String },

    #[error("{url} returned {status}: {body}")]
    Http {
        url: String,
        status: u16,
        body: String,
    },

    #[error("invalid JSON from {url}: {message}")]
    Decode { url: String, message: String },
}

impl TransportError {
    pub fn url(&self) -> &str {
        match self {
            TransportError::Network { url, .. }
            | TransportError::Http { url, .. }
            | TransportError::Decode { url, .. } => url,
        }
    }
}
