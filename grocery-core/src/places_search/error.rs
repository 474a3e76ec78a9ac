use thiserror::Error;

/// Errors from [`crate::places_search::PlacesSearch::search_nearby`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlacesSearchError {
    /// The request timed out.
    #[error("request to {url} timed out after {timeout_secs}s")]
    Timeout {
        /// Requested URL with credentials removed.
        url: String,
        /// Configured timeout.
        timeout_secs: u64,
    },
    /// The service answered with a non-success HTTP status.
    #[error("request to {url} failed with HTTP {status}: {message}")]
    HttpError {
        /// Requested URL with credentials removed.
        url: String,
        /// HTTP status code.
        status: u16,
        /// Error detail.
        message: String,
    },
    /// The request could not be delivered.
    #[error("network error requesting {url}: {message}")]
    NetworkError {
        /// Requested URL with credentials removed.
        url: String,
        /// Error detail.
        message: String,
    },
    /// The response body could not be decoded.
    #[error("failed to parse places response: {message}")]
    ParseError {
        /// Decoder detail.
        message: String,
    },
    /// The service reported a failure status in its payload.
    #[error("places service returned {status}: {message}")]
    ServiceError {
        /// Service status code, e.g. `REQUEST_DENIED`.
        status: String,
        /// Service-supplied detail.
        message: String,
    },
}
