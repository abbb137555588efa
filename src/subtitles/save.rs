//! Subtitle track persistence.

use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, info};

use super::decrypt::{DecryptError, decrypt};
use crate::manifest::Manifest;

/// First four bytes of a decrypted SRT payload (`"1\n00"`). Anything else
/// is written as ASS. Deliberately a 4-byte sniff, not a grammar check;
/// downstream consumers depend on exactly this split for borderline files.
const SRT_MAGIC: [u8; 4] = [0x31, 0x0A, 0x30, 0x30];

/// Fixed mapping from manifest language keys to filename codes.
const LANGUAGE_CODES: [(&str, &str); 5] = [
    ("englishSub", "en"),
    ("romajiSub", "ro"),
    ("hiraganaSub", "hi"),
    ("japaneseSub", "jp"),
    ("katakanaSub", "ka"),
];

/// Errors from persisting subtitle tracks.
#[derive(Debug, Error)]
pub enum SubtitleError {
    /// A payload failed to decrypt.
    #[error(transparent)]
    Decrypt(#[from] DecryptError),

    /// Filesystem error writing a subtitle file.
    #[error("IO error writing subtitle {path}: {source}")]
    Io {
        /// Destination path.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },
}

/// One persisted (or skipped) subtitle file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavedSubtitle {
    /// Where the file lives.
    pub path: PathBuf,
    /// True when the file predated this run and nothing was written.
    pub already_saved: bool,
}

/// Chooses the extension for decrypted subtitle content.
#[must_use]
pub fn subtitle_extension(content: &[u8]) -> &'static str {
    if content.len() >= 4 && content[..4] == SRT_MAGIC {
        ".srt"
    } else {
        ".ass"
    }
}

fn language_code(key: &str) -> Option<&'static str> {
    LANGUAGE_CODES
        .iter()
        .find(|(language, _)| *language == key)
        .map(|(_, code)| *code)
}

/// Checks whether a subtitle for `stem`/`code` already exists under either
/// extension. Pure existence check; repeat runs never re-decrypt.
fn existing_subtitle(dir: &Path, stem: &str, code: &str) -> Option<PathBuf> {
    [".srt", ".ass"]
        .iter()
        .map(|ext| dir.join(format!("{stem}.{code}{ext}")))
        .find(|path| path.exists())
}

/// Decrypts and writes every requested subtitle track of a manifest.
///
/// Files land at `<dir>/<stem>.<code>.<ext>` where `code` is the fixed
/// 2-letter mapping of the language key and `ext` comes from sniffing the
/// plaintext. Returns one entry per track/language pair handled, in track
/// order.
///
/// # Errors
///
/// Returns a [`SubtitleError`] when a payload fails to decrypt or a file
/// cannot be written. Already-written files are reported, not rewritten.
pub async fn save_subtitles(
    manifest: &Manifest,
    stem: &str,
    dir: &Path,
    languages: &[String],
) -> Result<Vec<SavedSubtitle>, SubtitleError> {
    let mut saved = Vec::new();
    for track in &manifest.subtitles {
        for key in languages {
            let Some(code) = language_code(key) else {
                continue;
            };
            let Some(ciphertext) = track.content.get(key) else {
                continue;
            };

            if let Some(path) = existing_subtitle(dir, stem, code) {
                debug!(path = %path.display(), "subtitle already saved");
                saved.push(SavedSubtitle {
                    path,
                    already_saved: true,
                });
                continue;
            }

            let plain = decrypt(ciphertext)?;
            let ext = subtitle_extension(&plain);
            let path = dir.join(format!("{stem}.{code}{ext}"));
            tokio::fs::write(&path, &plain)
                .await
                .map_err(|err| SubtitleError::Io {
                    path: path.clone(),
                    source: err,
                })?;
            info!(path = %path.display(), language = key.as_str(), "saved subtitle");
            saved.push(SavedSubtitle {
                path,
                already_saved: false,
            });
        }
    }
    Ok(saved)
}
