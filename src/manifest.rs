//! Serde data model for the site API.
//!
//! Every endpoint wraps its payload in a `{"resObj": ...}` envelope where
//! `null` means "nothing resolved". Manifests are immutable once parsed.

use std::collections::HashMap;
use std::fmt;
use std::marker::PhantomData;

use serde::de::{MapAccess, Visitor};
use serde::{Deserialize, Deserializer};

/// Envelope returned by every API endpoint.
#[derive(Debug, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
pub struct ApiResponse<T> {
    /// Payload, or `None` when the site resolved nothing.
    #[serde(rename = "resObj", default)]
    pub res_obj: Option<T>,
}

/// The API description of one video: title, subtitle tracks, and the
/// per-user-agent stream map.
#[derive(Debug, Clone, Deserialize)]
pub struct Manifest {
    /// Video title, used to derive destination filenames.
    pub title: String,
    /// Subtitle tracks; each holds ciphertext per language key.
    #[serde(default)]
    pub subtitles: Vec<SubtitleTrack>,
    /// Stream map container.
    pub video: VideoSources,
}

/// One subtitle track from a manifest.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SubtitleTrack {
    /// Track kind as declared by the site, when present.
    #[serde(rename = "type", default)]
    pub track_kind: Option<String>,
    /// Language key (`englishSub`, `romajiSub`, ...) to ciphertext payload.
    #[serde(default)]
    pub content: HashMap<String, String>,
}

/// Stream map for one video.
///
/// Keys are user-agent strings (with dots escaped, see the selector) and the
/// scan order is significant, so entries are kept as a vector of pairs in
/// manifest-declared order instead of a hash map.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct VideoSources {
    /// User-agent key to quality map, in declared order.
    #[serde(
        rename = "videoURLsData",
        default,
        deserialize_with = "ordered_entries"
    )]
    pub stream_map: Vec<(String, StreamEntry)>,
}

/// Quality labels and their URLs for one user-agent entry.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StreamEntry {
    /// Quality label to stream URL.
    #[serde(rename = "videoURLs", default)]
    pub video_urls: HashMap<String, String>,
}

/// The API description of a series: its title and episode ids per season.
#[derive(Debug, Clone, Deserialize)]
pub struct SeriesDescriptor {
    /// Series title (the API uses it as the document id).
    #[serde(rename = "_id")]
    pub title: String,
    /// Seasons in declared order.
    #[serde(default)]
    pub seasons: Vec<Season>,
}

/// One season of a series.
#[derive(Debug, Clone, Deserialize)]
pub struct Season {
    /// Season number; the API ships it as either a JSON number or a string.
    #[serde(deserialize_with = "number_or_string")]
    pub number: u32,
    /// Video ids in episode order.
    #[serde(default)]
    pub episodes: Vec<String>,
}

/// Deserializes a JSON object into a vector of `(key, value)` pairs,
/// preserving declared order.
fn ordered_entries<'de, D, T>(deserializer: D) -> Result<Vec<(String, T)>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    struct Entries<T>(PhantomData<T>);

    impl<'de, T: Deserialize<'de>> Visitor<'de> for Entries<T> {
        type Value = Vec<(String, T)>;

        fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
            formatter.write_str("a JSON object")
        }

        fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
            let mut entries = Vec::with_capacity(map.size_hint().unwrap_or(0));
            while let Some(entry) = map.next_entry::<String, T>()? {
                entries.push(entry);
            }
            Ok(entries)
        }
    }

    deserializer.deserialize_map(Entries(PhantomData))
}

/// Accepts a season number encoded as either a JSON integer or a string.
fn number_or_string<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    struct NumberOrString;

    impl Visitor<'_> for NumberOrString {
        type Value = u32;

        fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
            formatter.write_str("a season number as integer or string")
        }

        fn visit_u64<E: serde::de::Error>(self, value: u64) -> Result<Self::Value, E> {
            u32::try_from(value).map_err(E::custom)
        }

        fn visit_i64<E: serde::de::Error>(self, value: i64) -> Result<Self::Value, E> {
            u32::try_from(value).map_err(E::custom)
        }

        fn visit_str<E: serde::de::Error>(self, value: &str) -> Result<Self::Value, E> {
            value.trim().parse().map_err(E::custom)
        }
    }

    deserializer.deserialize_any(NumberOrString)
}
