use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Outcome of a single provider lookup that did not produce a value.
///
/// Adapters return this instead of raising across component boundaries, so
/// the controller can pattern-match each lookup before merging.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LookupError {
    /// The upstream answered, but with zero results.
    #[error("no matching results")]
    NotFound,

    /// Transport failure, malformed response, timeout, or credential
    /// rejection.
    #[error("upstream request failed: {0}")]
    Upstream(String),
}

impl LookupError {
    pub fn upstream<S: Into<String>>(message: S) -> Self {
        Self::Upstream(message.into())
    }
}

/// User-facing error surfaced in the exploration state.
///
/// Every kind is recoverable by retrying the triggering action; none is
/// fatal to the process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorInfo {
    /// A search resolved to zero candidates. The map keeps its current
    /// center and results.
    LocationNotFound,
    /// A search could not reach the geocoding upstream.
    SearchFailed,
    /// A refresh cycle was aborted because the place lookup failed. The
    /// previous results stay visible.
    FetchFailed,
}

impl ErrorInfo {
    #[must_use]
    pub fn user_message(&self) -> &'static str {
        match self {
            ErrorInfo::LocationNotFound => "Location not found. Please try a different search.",
            ErrorInfo::SearchFailed => "Error searching for location. Please try again.",
            ErrorInfo::FetchFailed => "Failed to fetch location data. Please try again.",
        }
    }
}

impl std::fmt::Display for ErrorInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.user_message())
    }
}
