//! CLI argument definitions using clap derive macros.

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

use animelon_dl::config::{
    DEFAULT_MAX_TRIES, DEFAULT_QUALITY_PRIORITIES, DEFAULT_SLEEP_SECS, DEFAULT_SUBTITLE_KEYS,
    Settings,
};

/// Downloads videos and subtitles from animelon.com.
///
/// Accepts series or single-video page URLs and saves streams with
/// byte-range resume, so an interrupted run picks up where it stopped.
#[derive(Parser, Debug)]
#[command(name = "animelon-dl")]
#[command(author, version, about)]
pub struct Args {
    /// Series or video page URLs, e.g. https://animelon.com/series/Death%20Note
    #[arg(required = true)]
    pub urls: Vec<String>,

    /// Directory downloads are saved into
    #[arg(short = 'f', long, default_value = ".")]
    pub save_path: PathBuf,

    /// Seconds slept before each request (rate-limiting courtesy)
    #[arg(short = 'd', long, default_value_t = DEFAULT_SLEEP_SECS, allow_negative_numbers = true)]
    pub sleep_time: f64,

    /// Seconds slept between retries of a failed transfer (scales with the attempt)
    #[arg(long, default_value_t = DEFAULT_SLEEP_SECS, allow_negative_numbers = true)]
    pub sleep_time_retry: f64,

    /// Maximum attempts for failed requests (1-20)
    #[arg(long, default_value_t = DEFAULT_MAX_TRIES, value_parser = clap::value_parser!(u32).range(1..=20))]
    pub max_tries: u32,

    /// Subtitle tracks to save (englishSub, romajiSub, hiraganaSub, japaneseSub, katakanaSub)
    #[arg(long, num_args = 1.., default_values_t = DEFAULT_SUBTITLE_KEYS.map(str::to_string))]
    pub subtitles_type: Vec<String>,

    /// Only download subtitles, skip video streams entirely
    #[arg(long)]
    pub subtitles_only: bool,

    /// Stream quality labels tried in order
    #[arg(long, num_args = 1.., default_values_t = DEFAULT_QUALITY_PRIORITIES.map(str::to_string))]
    pub quality_priorities: Vec<String>,

    /// Increase output verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(short, long)]
    pub quiet: bool,
}

impl Args {
    /// Builds the immutable run settings from the parsed arguments.
    #[must_use]
    pub fn settings(&self) -> Settings {
        Settings {
            save_path: self.save_path.clone(),
            subtitles_only: self.subtitles_only,
            quality_priorities: self.quality_priorities.clone(),
            subtitle_languages: self.subtitles_type.clone(),
            sleep: Duration::from_secs_f64(self.sleep_time.max(0.0)),
            retry_sleep: Duration::from_secs_f64(self.sleep_time_retry.max(0.0)),
            max_tries: self.max_tries,
        }
    }
}
