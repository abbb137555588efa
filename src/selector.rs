//! Stream selection from a manifest's quality map.
//!
//! The site serves each video under several user-agent-gated entries, and
//! each entry maps quality labels to URLs. Selection scans entries in
//! manifest-declared order and, within each entry, the configured priority
//! list in order; the first hit wins outright.

use crate::manifest::Manifest;

/// Token the site uses to escape literal dots in user-agent keys.
const DOT_TOKEN: &str = "=+(dot)+=";

/// The stream chosen for a transfer, together with the User-Agent the site
/// requires when fetching it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedStream {
    /// Stream URL.
    pub url: String,
    /// Decoded user-agent string to send with the fetch.
    pub user_agent: String,
    /// Quality label that matched.
    pub quality: String,
}

/// Decodes a stream-map key back into a usable User-Agent string.
#[must_use]
pub fn decode_user_agent_key(key: &str) -> String {
    key.replace(DOT_TOKEN, ".")
}

/// Picks the stream to fetch, or `None` when no entry carries any of the
/// requested qualities (the video is reported undownloadable by the caller).
#[must_use]
pub fn select_stream(manifest: &Manifest, priorities: &[String]) -> Option<SelectedStream> {
    for (user_agent_key, entry) in &manifest.video.stream_map {
        for quality in priorities {
            if let Some(url) = entry.video_urls.get(quality) {
                return Some(SelectedStream {
                    url: url.clone(),
                    user_agent: decode_user_agent_key(user_agent_key),
                    quality: quality.clone(),
                });
            }
        }
    }
    None
}
