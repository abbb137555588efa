//! Bounded-retry resolution of video manifests and series descriptors.
//!
//! Both endpoints are polled with the same policy: up to `max_tries`
//! attempts, sleeping the configured inter-request delay between attempts.
//! A non-200 status, an unparseable body, and (for videos) a null `resObj`
//! each consume one attempt. Exhaustion abandons the one item; the caller
//! keeps processing the rest of the run.

mod error;

pub use error::ResolveError;

use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::Settings;
use crate::manifest::{ApiResponse, Manifest, SeriesDescriptor};

/// Site origin all API endpoints hang off.
pub const BASE_URL: &str = "https://animelon.com";

/// Query tail of the video manifest endpoint.
const VIDEO_QUERY: &str = "learnerLanguage=en&subs=1&cdnLink=1&viewCounter=1";

/// Outcome of one resolution attempt, kept internal for logging.
#[derive(Debug, Error)]
enum AttemptError {
    #[error("HTTP {status}")]
    Status { status: u16 },
    #[error(transparent)]
    Http(#[from] reqwest::Error),
}

/// Resolves page identifiers into API payloads.
pub struct Resolver {
    client: Client,
    base_url: String,
    settings: Settings,
}

impl Resolver {
    /// Creates a resolver against the production site.
    #[must_use]
    pub fn new(client: Client, settings: Settings) -> Self {
        Self::with_base_url(client, settings, BASE_URL)
    }

    /// Creates a resolver against a different origin (used by tests).
    #[must_use]
    pub fn with_base_url(client: Client, settings: Settings, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
            settings,
        }
    }

    /// Endpoint for one video's manifest.
    #[must_use]
    pub fn video_api_url(&self, id: &str) -> String {
        format!(
            "{}/api/languagevideo/findByVideo?videoId={id}&{VIDEO_QUERY}",
            self.base_url
        )
    }

    /// Endpoint for a series descriptor.
    #[must_use]
    pub fn series_api_url(&self, slug: &str) -> String {
        format!("{}/api/series/{slug}", self.base_url)
    }

    /// Resolves a video id into its manifest.
    ///
    /// # Errors
    ///
    /// Returns [`ResolveError::NoManifest`] once the attempt budget is spent
    /// without a usable manifest (failed requests, unparseable bodies, and
    /// null payloads all count as failed attempts).
    pub async fn resolve_video(&self, id: &str) -> Result<Manifest, ResolveError> {
        let url = self.video_api_url(id);
        for attempt in 1..=self.settings.max_tries {
            if attempt > 1 {
                tokio::time::sleep(self.settings.sleep).await;
            }
            match self.fetch::<Manifest>(&url).await {
                Ok(Some(manifest)) => {
                    debug!(id, attempt, title = %manifest.title, "resolved video manifest");
                    return Ok(manifest);
                }
                Ok(None) => warn!(%url, attempt, "manifest resolved to null"),
                Err(err) => warn!(%url, attempt, error = %err, "manifest request failed"),
            }
        }
        Err(ResolveError::no_manifest(url, self.settings.max_tries))
    }

    /// Resolves a series slug into its descriptor.
    ///
    /// A null payload for a slug containing a literal backslash gets one
    /// corrective retry with the backslashes stripped (the site quirk for
    /// malformed client-supplied URLs), then resolution fails for good.
    ///
    /// # Errors
    ///
    /// Returns [`ResolveError::NoManifest`] when the attempt budget is spent
    /// or the payload stays null after the quirk correction.
    pub async fn resolve_series(&self, slug: &str) -> Result<SeriesDescriptor, ResolveError> {
        let mut slug = slug.to_string();
        let mut quirk_corrected = false;
        loop {
            let url = self.series_api_url(&slug);
            match self.fetch_with_retries::<SeriesDescriptor>(&url).await? {
                Some(descriptor) => return Ok(descriptor),
                None if !quirk_corrected && slug.contains('\\') => {
                    warn!(slug = %slug, "series resolved to null; retrying with backslashes stripped");
                    slug = slug.replace('\\', "");
                    quirk_corrected = true;
                }
                None => return Err(ResolveError::no_manifest(url, self.settings.max_tries)),
            }
        }
    }

    /// Polls one endpoint until a body parses, spending the attempt budget.
    /// `Ok(None)` means the site answered but resolved the payload to null.
    async fn fetch_with_retries<T: DeserializeOwned>(
        &self,
        url: &str,
    ) -> Result<Option<T>, ResolveError> {
        for attempt in 1..=self.settings.max_tries {
            if attempt > 1 {
                tokio::time::sleep(self.settings.sleep).await;
            }
            match self.fetch::<T>(url).await {
                Ok(payload) => return Ok(payload),
                Err(err) => warn!(%url, attempt, error = %err, "series request failed"),
            }
        }
        Err(ResolveError::no_manifest(url, self.settings.max_tries))
    }

    /// One GET + parse attempt. The session default headers are always sent.
    async fn fetch<T: DeserializeOwned>(&self, url: &str) -> Result<Option<T>, AttemptError> {
        let response = self.client.get(url).send().await?;
        if response.status() != StatusCode::OK {
            return Err(AttemptError::Status {
                status: response.status().as_u16(),
            });
        }
        let envelope: ApiResponse<T> = response.json().await?;
        Ok(envelope.res_obj)
    }
}
