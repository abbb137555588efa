//! Error types for API resolution.

use thiserror::Error;

/// Errors surfaced once a resolution attempt budget is exhausted.
#[derive(Debug, Error)]
pub enum ResolveError {
    /// Every attempt failed or the site resolved the payload to null.
    #[error("no manifest produced for {url} after {attempts} attempts")]
    NoManifest {
        /// Endpoint that was queried.
        url: String,
        /// Number of attempts spent.
        attempts: u32,
    },
}

impl ResolveError {
    /// Creates a no-manifest error.
    pub fn no_manifest(url: impl Into<String>, attempts: u32) -> Self {
        Self::NoManifest {
            url: url.into(),
            attempts,
        }
    }
}
