use thiserror::Error;

/// Errors produced by the client and its components.
#[derive(Error, Debug)]
pub enum ConsoleError {
    /// Low-level HTTP transport failure (connection refused, timeout, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// JSON decoding failed at the serde level.
    #[error("JSON parsing failed: {0}")]
    Json(#[from] serde_json::Error),

    /// The service answered with a non-success status code.
    #[error("HTTP {status}: {body}")]
    HttpError {
        /// HTTP status code (e.g. 404, 500, 503).
        status: u16,
        /// Response body text.
        body: String,
    },

    /// Invalid configuration detected at build time.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Caller-supplied input was rejected before any request was made.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Catch-all for other errors.
    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, ConsoleError>;
