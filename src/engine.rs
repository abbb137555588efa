//! Sequential run orchestration.
//!
//! One [`Downloader`] drives the whole run: URLs are classified, series
//! fan out into seasons and episodes, and each item is fully resolved,
//! selected, and transferred before the next begins. Failures are contained
//! per item - every abandoned episode is logged with its id and destination
//! so the run can be resumed by hand - while a malformed input URL aborts
//! the run outright.

use std::path::{Path, PathBuf};

use reqwest::Client;
use thiserror::Error;
use tracing::{error, info, warn};

use crate::config::Settings;
use crate::download::{TransferError, TransferOutcome, sanitize_title, transfer_video};
use crate::manifest::Manifest;
use crate::parser::{PageKind, ParseError, classify_url};
use crate::resolver::{ResolveError, Resolver};
use crate::selector::select_stream;
use crate::session::build_session;
use crate::subtitles::{SubtitleError, save_subtitles};

/// Errors that abort the whole run.
#[derive(Debug, Error)]
pub enum RunError {
    /// An input URL could not be segmented at all.
    #[error(transparent)]
    Parse(#[from] ParseError),

    /// The save directory could not be created.
    #[error("could not create save directory {path}: {source}")]
    SaveDir {
        /// The directory that failed.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },
}

/// Errors that abandon a single video/episode; the run continues.
#[derive(Debug, Error)]
pub enum EpisodeError {
    /// No manifest could be resolved.
    #[error(transparent)]
    Resolve(#[from] ResolveError),

    /// Subtitle decryption or persistence failed.
    #[error(transparent)]
    Subtitle(#[from] SubtitleError),

    /// The transfer failed after its retry budget.
    #[error(transparent)]
    Transfer(#[from] TransferError),

    /// No user-agent entry carried any requested quality.
    #[error("no stream matched the quality priorities for {title}")]
    NoStream {
        /// Title of the video reported undownloadable.
        title: String,
    },
}

/// Counters reported at the end of a run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    /// Videos fully transferred during this run.
    pub videos_completed: usize,
    /// Videos already complete on disk from an earlier run.
    pub videos_already_complete: usize,
    /// Subtitle files written during this run.
    pub subtitles_written: usize,
    /// Subtitle files that already existed.
    pub subtitles_already_saved: usize,
    /// Episodes or videos abandoned after their retry budgets.
    pub failed_items: usize,
    /// Parseable URLs of a kind this tool does not handle.
    pub skipped_urls: usize,
}

/// Drives the resolve -> select -> transfer pipeline for a whole run.
pub struct Downloader {
    client: Client,
    resolver: Resolver,
    settings: Settings,
}

impl Downloader {
    /// Creates a downloader against the production site.
    #[must_use]
    pub fn new(settings: Settings) -> Self {
        let client = build_session();
        let resolver = Resolver::new(client.clone(), settings.clone());
        Self {
            client,
            resolver,
            settings,
        }
    }

    /// Creates a downloader against a different origin (used by tests).
    #[must_use]
    pub fn with_base_url(settings: Settings, base_url: impl Into<String>) -> Self {
        let client = build_session();
        let resolver = Resolver::with_base_url(client.clone(), settings.clone(), base_url);
        Self {
            client,
            resolver,
            settings,
        }
    }

    /// Processes every URL in order and returns the run counters.
    ///
    /// # Errors
    ///
    /// Returns [`RunError`] when an input URL is malformed (the whole run
    /// aborts, per the input contract) or the save directory cannot be
    /// created. Per-item failures are counted, not returned.
    pub async fn run(&self, urls: &[String]) -> Result<RunSummary, RunError> {
        tokio::fs::create_dir_all(&self.settings.save_path)
            .await
            .map_err(|err| RunError::SaveDir {
                path: self.settings.save_path.clone(),
                source: err,
            })?;

        let mut summary = RunSummary::default();
        for raw in urls {
            match classify_url(raw)? {
                PageKind::Series { slug } => {
                    self.download_series(&slug, &mut summary).await;
                }
                PageKind::Video { id } => {
                    self.download_single_video(&id, &mut summary).await;
                }
                PageKind::Unknown { kind } => {
                    warn!(url = %raw, kind = %kind, "unrecognized URL type, skipping");
                    summary.skipped_urls += 1;
                }
            }
        }
        Ok(summary)
    }

    /// Downloads every episode of a series, season by season.
    async fn download_series(&self, slug: &str, summary: &mut RunSummary) {
        let descriptor = match self.resolver.resolve_series(slug).await {
            Ok(descriptor) => descriptor,
            Err(err) => {
                error!(slug, error = %err, "series resolution failed");
                summary.failed_items += 1;
                return;
            }
        };
        let title = sanitize_title(&descriptor.title);
        info!(title = %descriptor.title, seasons = descriptor.seasons.len(), "resolved series");

        let series_dir = self.settings.save_path.join(&title);
        for season in &descriptor.seasons {
            let season_dir = series_dir.join(format!("S{:02}", season.number));
            if let Err(err) = tokio::fs::create_dir_all(&season_dir).await {
                error!(path = %season_dir.display(), error = %err, "could not create season directory");
                summary.failed_items += 1;
                continue;
            }
            let season_settings = self.settings.with_save_path(&season_dir);
            info!(season = season.number, episodes = season.episodes.len(), "season");

            for (index, episode_id) in season.episodes.iter().enumerate() {
                let file_name = format!("{title} S{}E{}.mp4", season.number, index + 1);
                let destination = season_dir.join(&file_name);
                info!(episode = %file_name, id = %episode_id, "processing episode");
                match self.resolver.resolve_video(episode_id).await {
                    Ok(manifest) => {
                        if let Err(err) = self
                            .process_manifest(&manifest, &destination, &season_settings, summary)
                            .await
                        {
                            error!(
                                id = %episode_id,
                                path = %destination.display(),
                                error = %err,
                                "episode abandoned"
                            );
                            summary.failed_items += 1;
                        }
                    }
                    Err(err) => {
                        error!(
                            id = %episode_id,
                            path = %destination.display(),
                            error = %err,
                            "episode abandoned"
                        );
                        summary.failed_items += 1;
                    }
                }
            }
        }
    }

    /// Downloads one video page; the destination name comes from the title.
    async fn download_single_video(&self, id: &str, summary: &mut RunSummary) {
        let manifest = match self.resolver.resolve_video(id).await {
            Ok(manifest) => manifest,
            Err(err) => {
                error!(id, error = %err, "video abandoned");
                summary.failed_items += 1;
                return;
            }
        };
        let title = sanitize_title(&manifest.title);
        let destination = self.settings.save_path.join(format!("{title}.mp4"));
        if let Err(err) = self
            .process_manifest(&manifest, &destination, &self.settings, summary)
            .await
        {
            error!(id, path = %destination.display(), error = %err, "video abandoned");
            summary.failed_items += 1;
        }
    }

    /// Saves subtitles and, unless subtitles-only, transfers the video with
    /// a linear-backoff retry budget.
    async fn process_manifest(
        &self,
        manifest: &Manifest,
        destination: &Path,
        settings: &Settings,
        summary: &mut RunSummary,
    ) -> Result<(), EpisodeError> {
        let stem = destination
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_else(|| sanitize_title(&manifest.title));

        let saved = save_subtitles(
            manifest,
            &stem,
            &settings.save_path,
            &settings.subtitle_languages,
        )
        .await?;
        summary.subtitles_written += saved.iter().filter(|s| !s.already_saved).count();
        summary.subtitles_already_saved += saved.iter().filter(|s| s.already_saved).count();

        if settings.subtitles_only {
            info!(path = %destination.display(), "subtitles only, skipping video stream");
            return Ok(());
        }

        let Some(stream) = select_stream(manifest, &settings.quality_priorities) else {
            return Err(EpisodeError::NoStream {
                title: manifest.title.clone(),
            });
        };

        let mut attempt = 1;
        loop {
            match transfer_video(
                &self.client,
                &stream.url,
                destination,
                &stream.user_agent,
                &stream.quality,
                settings,
            )
            .await
            {
                Ok(TransferOutcome::Completed) => {
                    summary.videos_completed += 1;
                    return Ok(());
                }
                Ok(TransferOutcome::AlreadyComplete) => {
                    summary.videos_already_complete += 1;
                    return Ok(());
                }
                Err(err) if attempt < settings.max_tries => {
                    warn!(
                        attempt,
                        remaining = settings.max_tries - attempt,
                        error = %err,
                        "transfer failed, retrying"
                    );
                    tokio::time::sleep(settings.retry_sleep * attempt).await;
                    attempt += 1;
                }
                Err(err) => return Err(err.into()),
            }
        }
    }
}
