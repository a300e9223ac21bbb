//! Error types for capedge-client.
//!
//! Every fallible operation surfaces one of these to the immediate caller.
//! Nothing is retried and nothing is suppressed.

/// Error type for client operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Network failure or non-success HTTP status.
    #[error("HTTP request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The server answered with an HTML page where JSON was expected.
    ///
    /// This is how an expired or invalid login shows up upstream.
    #[error("Session expired or invalid. Please update your cookies (response was HTML instead of JSON)")]
    SessionExpired,

    /// The body was not HTML, but it was not valid JSON either.
    #[error("Response is not valid JSON: {0}")]
    Decode(#[source] serde_json::Error),

    /// Decoded JSON lacks a field the mapper requires, or has the wrong shape.
    #[error("Unexpected payload from `{endpoint}`: {source}")]
    Mapping {
        endpoint: String,
        #[source]
        source: serde_json::Error,
    },

    /// Base URL or endpoint could not be turned into a valid URL.
    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    /// Missing or unusable configuration.
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Result type alias for client operations.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Whether the caller should refresh their session cookies.
    #[must_use]
    pub fn is_session_expired(&self) -> bool {
        matches!(self, Self::SessionExpired)
    }
}
