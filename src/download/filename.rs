//! Filename sanitization for titles coming from the site API.

/// Makes a video title safe to use as a filename component.
///
/// Path separators, characters Windows rejects, and control characters are
/// folded to underscores; spaces and everything else survive, since episode
/// filenames intentionally read like titles. Runs of underscores collapse
/// and leading/trailing separators are trimmed.
#[must_use]
pub fn sanitize_title(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut prev_underscore = false;
    for ch in value.chars() {
        let mapped = match ch {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        };
        if mapped == '_' {
            if !prev_underscore {
                out.push('_');
                prev_underscore = true;
            }
        } else {
            out.push(mapped);
            prev_underscore = false;
        }
    }
    out.trim().trim_matches('_').trim().to_string()
}
