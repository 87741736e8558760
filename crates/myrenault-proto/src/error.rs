use thiserror::Error;

/// Errors that can occur when talking to the MyRenault API.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Transport-level failure (DNS, TLS, connection reset, timeout).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The API answered with a non-success status code.
    #[error("Unexpected status {status}: {body}")]
    Status { status: u16, body: String },

    /// The response body was not valid JSON.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A resource was requested before [`Connection::initialise`](crate::Connection::initialise).
    #[error("Session not initialised")]
    NotInitialised,

    /// The login endpoint rejected the credentials or returned no token.
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// The response was JSON but did not have the expected shape.
    #[error("Malformed response: {0}")]
    MalformedResponse(String),
}

pub type Result<T> = std::result::Result<T, ApiError>;
