//! Immutable run configuration.
//!
//! One [`Settings`] value is built per invocation and passed explicitly down
//! the call chain. A series download derives a new value per season (via
//! [`Settings::with_save_path`]) instead of mutating shared state.

use std::path::PathBuf;
use std::time::Duration;

/// Browser User-Agent sent as the session default on every request.
///
/// The site gates its API behind a browser-looking UA; individual stream
/// fetches override this per request with the UA the manifest demands.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
    AppleWebKit/537.36 (KHTML, like Gecko) Chrome/92.0.4515.107 Safari/537.36";

/// Stream quality labels tried in order, highest quality first.
pub const DEFAULT_QUALITY_PRIORITIES: [&str; 3] = ["ozez", "stz", "tsz"];

/// Subtitle tracks fetched when the user does not narrow the list.
pub const DEFAULT_SUBTITLE_KEYS: [&str; 4] =
    ["englishSub", "romajiSub", "hiraganaSub", "japaneseSub"];

/// Default number of attempts for failed requests.
pub const DEFAULT_MAX_TRIES: u32 = 5;

/// Default inter-request sleep in seconds (rate-limiting courtesy).
pub const DEFAULT_SLEEP_SECS: f64 = 5.0;

/// Immutable run configuration.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Directory downloads are written into.
    pub save_path: PathBuf,
    /// Skip video streams, write subtitles only.
    pub subtitles_only: bool,
    /// Quality labels tried in order; first label present in a manifest wins.
    pub quality_priorities: Vec<String>,
    /// Subtitle language keys to persist (manifest `content` map keys).
    pub subtitle_languages: Vec<String>,
    /// Sleep before each network request.
    pub sleep: Duration,
    /// Base sleep between retries of a failed transfer (scales linearly
    /// with the attempt number).
    pub retry_sleep: Duration,
    /// Attempt budget for resolution and transfer retries.
    pub max_tries: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            save_path: PathBuf::from("."),
            subtitles_only: false,
            quality_priorities: DEFAULT_QUALITY_PRIORITIES.map(str::to_string).to_vec(),
            subtitle_languages: DEFAULT_SUBTITLE_KEYS.map(str::to_string).to_vec(),
            sleep: Duration::from_secs_f64(DEFAULT_SLEEP_SECS),
            retry_sleep: Duration::from_secs_f64(DEFAULT_SLEEP_SECS),
            max_tries: DEFAULT_MAX_TRIES,
        }
    }
}

impl Settings {
    /// Returns a copy of these settings rebound to a different save
    /// directory. Used to derive per-season settings during a series run.
    #[must_use]
    pub fn with_save_path(&self, save_path: impl Into<PathBuf>) -> Self {
        Self {
            save_path: save_path.into(),
            ..self.clone()
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();
        assert_eq!(settings.save_path, PathBuf::from("."));
        assert!(!settings.subtitles_only);
        assert_eq!(settings.quality_priorities, ["ozez", "stz", "tsz"]);
        assert_eq!(settings.max_tries, 5);
        assert_eq!(settings.sleep, Duration::from_secs(5));
    }

    #[test]
    fn test_with_save_path_changes_only_the_directory() {
        let base = Settings {
            subtitles_only: true,
            max_tries: 2,
            ..Settings::default()
        };
        let rebound = base.with_save_path("/tmp/season");

        assert_eq!(rebound.save_path, PathBuf::from("/tmp/season"));
        assert!(rebound.subtitles_only);
        assert_eq!(rebound.max_tries, 2);
        // the original is untouched
        assert_eq!(base.save_path, PathBuf::from("."));
    }
}
