//! Video id extraction for `@[youtube](...)` embeds.

use std::sync::LazyLock;

use regex::Regex;

/// Matches the common video URL shapes and captures the id.
static VIDEO_ID_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^.*(?:(?:youtu\.be/|v/|vi/|u/\w/|embed/)|(?:(?:watch)?\?vi?=|&vi?=))([^#&?]*).*",
    )
    .expect("video id regex")
});

/// Resolve the value of a youtube block from an embed link's href.
///
/// Absolute URLs are reduced to the video id; anything else (a bare id, or a
/// URL the pattern does not recognise) is returned verbatim.
pub fn youtube_id(href: &str) -> String {
    let href = href.trim();
    if !(href.starts_with("https://") || href.starts_with("http://")) {
        return href.to_string();
    }

    VIDEO_ID_RE
        .captures(href)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
        .unwrap_or_else(|| href.to_string())
}
