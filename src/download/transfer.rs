//! Streaming video transfer with byte-range resume.

use std::path::Path;

use futures_util::StreamExt;
use reqwest::header::{RANGE, USER_AGENT};
use reqwest::{Client, StatusCode};
use tokio::fs::{File, OpenOptions};
use tokio::io::AsyncWriteExt;
use tracing::{debug, info};

use super::error::TransferError;
use super::progress::TransferProgress;
use crate::config::Settings;

/// How a transfer ended when it did not fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferOutcome {
    /// Bytes were fetched and persisted during this run.
    Completed,
    /// The file on disk already held every byte (the server replied 416 to
    /// our resume range).
    AlreadyComplete,
}

/// Streams one video URL into `destination`, resuming from whatever the
/// file already holds.
///
/// An existing file of size S turns into a `Range: bytes=S-` request; the
/// range header and the per-stream `user_agent` apply to this one request
/// only, leaving the session defaults untouched. The configured
/// inter-request sleep runs before the request is issued.
///
/// # Errors
///
/// Any status outside {200, 206} and any network or filesystem failure is
/// returned as a [`TransferError`]. Partial files are never deleted; they
/// are next run's resume state.
pub async fn transfer_video(
    client: &Client,
    url: &str,
    destination: &Path,
    user_agent: &str,
    quality: &str,
    settings: &Settings,
) -> Result<TransferOutcome, TransferError> {
    let bytes_on_disk = match tokio::fs::metadata(destination).await {
        Ok(meta) => meta.len(),
        Err(_) => 0,
    };
    let resuming = bytes_on_disk > 0;

    tokio::time::sleep(settings.sleep).await;

    let mut request = client.get(url).header(USER_AGENT, user_agent);
    if resuming {
        debug!(path = %destination.display(), bytes_on_disk, "resuming partial file");
        request = request.header(RANGE, format!("bytes={bytes_on_disk}-"));
    }

    let response = request
        .send()
        .await
        .map_err(|err| TransferError::network(url, err))?;

    match response.status() {
        StatusCode::RANGE_NOT_SATISFIABLE => {
            // The whole file landed in a previous run.
            info!(path = %destination.display(), "already fully downloaded");
            return Ok(TransferOutcome::AlreadyComplete);
        }
        StatusCode::OK | StatusCode::PARTIAL_CONTENT => {}
        status => return Err(TransferError::http_status(url, status.as_u16())),
    }

    // The content length covers only the remainder being sent.
    let expected_total = response
        .content_length()
        .unwrap_or(0)
        .saturating_add(bytes_on_disk);

    let mut file = if resuming {
        OpenOptions::new()
            .append(true)
            .open(destination)
            .await
            .map_err(|err| TransferError::io(destination, err))?
    } else {
        File::create(destination)
            .await
            .map_err(|err| TransferError::io(destination, err))?
    };

    let label = destination
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| destination.display().to_string());
    info!(file = %label, quality, "downloading");

    let progress = TransferProgress::new(&label, expected_total);
    progress.update(bytes_on_disk);

    let mut stream = response.bytes_stream();
    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(|err| TransferError::network(url, err))?;
        file.write_all(&chunk)
            .await
            .map_err(|err| TransferError::io(destination, err))?;
        file.flush()
            .await
            .map_err(|err| TransferError::io(destination, err))?;
        // Account from the persisted size, not a counter, so the display
        // stays truthful across a crash mid-chunk.
        let on_disk = tokio::fs::metadata(destination)
            .await
            .map_err(|err| TransferError::io(destination, err))?
            .len();
        progress.update(on_disk);
    }

    progress.finish();
    info!(path = %destination.display(), quality, "download complete");
    Ok(TransferOutcome::Completed)
}
