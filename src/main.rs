//! CLI entry point for the animelon downloader.

use anyhow::Result;
use clap::Parser;
use tracing::{debug, info};

use animelon_dl::Downloader;

mod cli;

use cli::Args;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments first (before tracing, so --help works without logs)
    let args = Args::parse();

    // Determine log level based on verbose/quiet flags
    // Priority: RUST_LOG env var > quiet flag > verbose flag > default (info)
    let default_level = if args.quiet {
        "error"
    } else {
        match args.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    };

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));

    tracing_subscriber::fmt().with_env_filter(filter).init();

    debug!(?args, "CLI arguments parsed");

    let settings = args.settings();
    let downloader = Downloader::new(settings);
    let summary = downloader.run(&args.urls).await?;

    info!(
        videos = summary.videos_completed,
        already_complete = summary.videos_already_complete,
        subtitles = summary.subtitles_written,
        subtitles_already_saved = summary.subtitles_already_saved,
        failed = summary.failed_items,
        skipped_urls = summary.skipped_urls,
        "run finished"
    );

    if summary.failed_items > 0 {
        std::process::exit(1);
    }
    Ok(())
}
