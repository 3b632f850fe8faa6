//! Typed failures for the availability and goal feeds.

use thiserror::Error;

/// Failure to load data for a date.
///
/// None of these are fatal: the board degrades to an inert error state
/// with nothing draggable until a later load succeeds.
#[derive(Debug, Error)]
pub enum LoadError {
    /// Transport-level failure (connection refused, timeout, bad URL).
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The server answered with a non-success status.
    #[error("server returned HTTP {status}")]
    Status {
        /// Numeric HTTP status code.
        status: u16,
    },

    /// The response body was not the expected JSON shape.
    #[error("malformed response: {0}")]
    Decode(#[from] serde_json::Error),

    /// A required endpoint URL is missing from the configuration.
    #[error("endpoint not configured: {0}")]
    Config(&'static str),
}
