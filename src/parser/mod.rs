//! Input URL classification.
//!
//! User-supplied URLs are segmented into the page kinds the site serves:
//! `/series/<slug>` and `/video/<id>`. A URL that cannot be segmented at all
//! is a hard error (the whole run aborts); a segmentable URL of an
//! unrecognized kind is reported and skipped by the caller.

use thiserror::Error;
use url::Url;

/// Error for URLs that cannot be segmented into a recognizable page path.
#[derive(Debug, Error)]
pub enum ParseError {
    /// The URL is missing a scheme, host, or page path.
    #[error("malformed URL: {url}")]
    Malformed {
        /// The offending input.
        url: String,
    },
}

impl ParseError {
    /// Creates a malformed-URL error.
    pub fn malformed(url: impl Into<String>) -> Self {
        Self::Malformed { url: url.into() }
    }
}

/// Kind of page a user-supplied URL points at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageKind {
    /// A series page; `slug` is the final path segment, kept verbatim
    /// (including any stray backslash, which the resolver corrects).
    Series {
        /// Series slug as it appears in the URL.
        slug: String,
    },
    /// A single video page.
    Video {
        /// Video id as it appears in the URL.
        id: String,
    },
    /// Parseable URL of a kind this tool does not handle.
    Unknown {
        /// The first path segment.
        kind: String,
    },
}

/// Classifies a user-supplied URL into a [`PageKind`].
///
/// Segments are taken from the raw string rather than a normalized URL so
/// that a literal backslash in a slug survives untouched (the WHATWG parser
/// would rewrite it into a path separator, hiding the site quirk the
/// resolver needs to detect).
///
/// # Errors
///
/// Returns [`ParseError::Malformed`] when the URL has no scheme, no path
/// segments, or names a series/video page without a target segment.
pub fn classify_url(raw: &str) -> Result<PageKind, ParseError> {
    // Validation only; backslashes are legal here because the WHATWG rules
    // treat them as separators.
    Url::parse(raw).map_err(|_| ParseError::malformed(raw))?;

    let rest = raw
        .split_once("://")
        .map(|(_, rest)| rest)
        .ok_or_else(|| ParseError::malformed(raw))?;

    let mut segments = rest.split('/');
    let _host = segments.next();
    let kind = segments
        .next()
        .filter(|segment| !segment.is_empty())
        .ok_or_else(|| ParseError::malformed(raw))?;

    match kind {
        "series" | "video" => {
            let target = segments
                .next_back()
                .filter(|segment| !segment.is_empty())
                .ok_or_else(|| ParseError::malformed(raw))?;
            if kind == "series" {
                Ok(PageKind::Series {
                    slug: target.to_string(),
                })
            } else {
                Ok(PageKind::Video {
                    id: target.to_string(),
                })
            }
        }
        other => Ok(PageKind::Unknown {
            kind: other.to_string(),
        }),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_series_url() {
        let kind = classify_url("https://animelon.com/series/Death%20Note").unwrap();
        assert_eq!(
            kind,
            PageKind::Series {
                slug: "Death%20Note".to_string()
            }
        );
    }

    #[test]
    fn test_classify_video_url() {
        let kind = classify_url("https://animelon.com/video/579b1be6c13aa2a6b28f1364").unwrap();
        assert_eq!(
            kind,
            PageKind::Video {
                id: "579b1be6c13aa2a6b28f1364".to_string()
            }
        );
    }

    #[test]
    fn test_classify_preserves_backslash_in_slug() {
        let kind = classify_url(r"https://animelon.com/series/Death\Note").unwrap();
        assert_eq!(
            kind,
            PageKind::Series {
                slug: r"Death\Note".to_string()
            }
        );
    }

    #[test]
    fn test_classify_unknown_kind_is_not_an_error() {
        let kind = classify_url("https://animelon.com/about/team").unwrap();
        assert_eq!(
            kind,
            PageKind::Unknown {
                kind: "about".to_string()
            }
        );
    }

    #[test]
    fn test_classify_rejects_url_without_scheme() {
        assert!(classify_url("animelon.com/video/abc").is_err());
    }

    #[test]
    fn test_classify_rejects_url_without_path() {
        assert!(classify_url("https://animelon.com").is_err());
        assert!(classify_url("https://animelon.com/").is_err());
    }

    #[test]
    fn test_classify_rejects_series_url_without_slug() {
        assert!(classify_url("https://animelon.com/series").is_err());
        assert!(classify_url("https://animelon.com/series/").is_err());
    }

    #[test]
    fn test_classify_rejects_garbage() {
        assert!(classify_url("not a url").is_err());
    }

    #[test]
    fn test_parse_error_display_names_the_input() {
        let err = ParseError::malformed("junk");
        assert!(err.to_string().contains("junk"));
    }
}
