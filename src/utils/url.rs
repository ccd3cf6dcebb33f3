//! URL utilities for normalizing profile handles and parsing share links

use crate::error::RtikError;
use regex::Regex;
use url::Url;

/// Normalize a profile handle: trim whitespace, drop a leading `@`, lowercase
pub fn normalize_handle(input: &str) -> String {
    input.trim().trim_start_matches('@').to_lowercase()
}

/// Build the canonical share link for a video
pub fn video_link(handle: &str, id: &str) -> String {
    format!("https://www.tiktok.com/@{}/video/{}", handle, id)
}

/// Extract `(handle, video_id)` from a share link
pub fn parse_video_link(link: &str) -> Result<(String, String), RtikError> {
    let parsed = Url::parse(link)?;

    match parsed.host_str() {
        Some("tiktok.com") | Some("www.tiktok.com") | Some("m.tiktok.com") => {
            let path_re = Regex::new(r"^/@([^/]+)/video/(\d+)").unwrap();
            match path_re.captures(parsed.path()) {
                Some(caps) => Ok((normalize_handle(&caps[1]), caps[2].to_string())),
                None => Err(RtikError::InvalidLink(
                    "Unsupported video link format".to_string(),
                )),
            }
        }
        _ => Err(RtikError::InvalidLink(
            "Not a supported video link".to_string(),
        )),
    }
}

/// Normalize a pasted target into a full share link.
///
/// Links are often pasted without a scheme (`tiktok.com/@user/video/123`);
/// `https` is assumed in that case, then the host and path are validated.
pub fn normalize_video_link(target: &str) -> Result<String, RtikError> {
    let link = if target.contains("://") {
        target.to_string()
    } else {
        format!("https://{}", target)
    };
    parse_video_link(&link)?;
    Ok(link)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_handle() {
        assert_eq!(normalize_handle("@Alice"), "alice");
        assert_eq!(normalize_handle("  bob  "), "bob");
        assert_eq!(normalize_handle("@@charlie"), "charlie");
        assert_eq!(normalize_handle("dave"), "dave");
    }

    #[test]
    fn test_video_link_round_trip() {
        let link = video_link("alice", "7294857113");
        assert_eq!(link, "https://www.tiktok.com/@alice/video/7294857113");

        let (handle, id) = parse_video_link(&link).unwrap();
        assert_eq!(handle, "alice");
        assert_eq!(id, "7294857113");
    }

    #[test]
    fn test_parse_video_link() {
        assert_eq!(
            parse_video_link("https://www.tiktok.com/@bob/video/123").unwrap(),
            ("bob".to_string(), "123".to_string())
        );
        assert_eq!(
            parse_video_link("https://m.tiktok.com/@bob/video/123?lang=en").unwrap(),
            ("bob".to_string(), "123".to_string())
        );

        // Test error cases
        assert!(parse_video_link("https://www.tiktok.com/@bob").is_err());
        assert!(parse_video_link("https://example.com/@bob/video/123").is_err());
        assert!(parse_video_link("not-a-url").is_err());
    }

    #[test]
    fn test_normalize_video_link() {
        // Scheme is optional in pasted links
        assert_eq!(
            normalize_video_link("tiktok.com/@alice/video/7294857113").unwrap(),
            "https://tiktok.com/@alice/video/7294857113"
        );
        assert_eq!(
            normalize_video_link("https://www.tiktok.com/@bob/video/123").unwrap(),
            "https://www.tiktok.com/@bob/video/123"
        );
        assert_eq!(
            normalize_video_link("http://m.tiktok.com/@bob/video/123").unwrap(),
            "http://m.tiktok.com/@bob/video/123"
        );

        // Handles and foreign hosts are not video links
        assert!(normalize_video_link("bob").is_err());
        assert!(normalize_video_link("@bob").is_err());
        assert!(normalize_video_link("example.com/@bob/video/123").is_err());
        assert!(normalize_video_link("tiktok.com/@bob").is_err());
    }
}
