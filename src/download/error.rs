//! Error types for the transfer engine.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while transferring a stream to disk.
///
/// All of these are transient from the run's point of view: the engine
/// retries within its attempt budget and never deletes partial files, which
/// remain valid resume state for the next run.
#[derive(Debug, Error)]
pub enum TransferError {
    /// Network-level error (DNS, connection refused, TLS, mid-stream drop).
    #[error("network error downloading {url}: {source}")]
    Network {
        /// The URL that failed.
        url: String,
        /// The underlying network error.
        #[source]
        source: reqwest::Error,
    },

    /// Response status outside the accepted set {200, 206}.
    #[error("HTTP {status} downloading {url}")]
    HttpStatus {
        /// The URL that returned the status.
        url: String,
        /// The HTTP status code.
        status: u16,
    },

    /// File system error while opening or writing the destination.
    #[error("IO error writing to {path}: {source}")]
    Io {
        /// Destination path.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },
}

impl TransferError {
    /// Creates a network error from a reqwest error.
    pub fn network(url: impl Into<String>, source: reqwest::Error) -> Self {
        Self::Network {
            url: url.into(),
            source,
        }
    }

    /// Creates an HTTP status error.
    pub fn http_status(url: impl Into<String>, status: u16) -> Self {
        Self::HttpStatus {
            url: url.into(),
            status,
        }
    }

    /// Creates an IO error.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
