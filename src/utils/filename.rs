//! Canonical media filename generation

use chrono::{DateTime, Utc};
use regex::Regex;

/// File extension for all downloaded media
pub const MEDIA_EXT: &str = "mp4";

/// Build the canonical filename for a video: `{handle}_{YYYY-MM-DD}_{id}.mp4`
///
/// The date is the creation time rendered in UTC, so the same video always
/// maps to the same name regardless of the local timezone.
pub fn video_filename(handle: &str, created_at: &DateTime<Utc>, id: &str) -> String {
    let name = format!(
        "{}_{}_{}.{}",
        handle,
        created_at.format("%Y-%m-%d"),
        id,
        MEDIA_EXT
    );
    sanitize(&name)
}

/// Replace characters that are invalid in filenames
fn sanitize(name: &str) -> String {
    let invalid_chars = Regex::new(r#"[<>:"/\\|?*\x00-\x1f]"#).unwrap();
    invalid_chars.replace_all(name, "_").to_string()
}
