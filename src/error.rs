//! Error type shared by the fetch, parse, cache and chart stages

use std::path::PathBuf;

use reqwest::StatusCode;
use thiserror::Error;

/// Errors that can occur while retrieving, caching or rendering exchange rates
///
/// A lookup that matches nothing is not an error; see
/// [`find`](crate::repository::find).
#[derive(Debug, Error)]
pub enum CurrencyError {
    /// HTTP request failed before a response was received
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The server answered with something other than 200 OK
    #[error("HTTP request to {url} returned {status}")]
    HttpStatus { url: String, status: StatusCode },

    /// The feed is not well-formed or lacks a required field
    #[error("Failed to parse rates feed: {0}")]
    Parse(String),

    /// The cache file exists but does not hold a valid record list
    #[error("Cache file {} is corrupt: {source}", .path.display())]
    CacheCorrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Reading or writing a file failed
    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A record's value or nominal cannot be turned into a number
    #[error("Invalid value '{value}' for currency {code}")]
    InvalidNumber { code: String, value: String },

    /// The image backend failed to draw or encode the chart
    #[error("Failed to render chart: {0}")]
    Chart(String),

    /// Terminal setup or drawing failed
    #[error("Terminal error: {0}")]
    Terminal(#[source] std::io::Error),
}

impl CurrencyError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T, E = CurrencyError> = std::result::Result<T, E>;
