//! Video metadata structures

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::RtikError;

/// Resolvable metadata for one remote video
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoRecord {
    /// Platform video ID
    pub id: String,
    /// Author's unique handle
    pub author_handle: String,
    /// Video creation time
    #[serde(with = "chrono::serde::ts_seconds")]
    pub created_at: DateTime<Utc>,
    /// Standard quality media URL
    pub play_url: Option<String>,
    /// HD media URL, never present on listing records
    pub hd_play_url: Option<String>,
}

impl VideoRecord {
    /// Canonical local filename for this video
    pub fn filename(&self) -> String {
        crate::utils::filename::video_filename(&self.author_handle, &self.created_at, &self.id)
    }

    /// Canonical share link for this video
    pub fn share_link(&self) -> String {
        crate::utils::url::video_link(&self.author_handle, &self.id)
    }

    /// Pick the media URL to download, preferring HD.
    ///
    /// Falling back to standard quality is signalled through
    /// [`MediaQuality::Standard`] so the caller can warn about it.
    pub fn best_media(&self) -> Result<ResolvedMedia, RtikError> {
        if let Some(url) = &self.hd_play_url {
            Ok(ResolvedMedia {
                url: url.clone(),
                quality: MediaQuality::Hd,
            })
        } else if let Some(url) = &self.play_url {
            Ok(ResolvedMedia {
                url: url.clone(),
                quality: MediaQuality::Standard,
            })
        } else {
            Err(RtikError::NoMediaFound)
        }
    }
}

/// One page of a profile listing, newest first
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfilePage {
    /// Videos on this page
    pub videos: Vec<VideoRecord>,
    /// Opaque cursor for requesting the next page
    pub cursor: String,
    /// Whether another page follows
    pub has_more: bool,
}

/// Media URL selected for download
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedMedia {
    /// Direct media URL
    pub url: String,
    /// Quality tier the URL points at
    pub quality: MediaQuality,
}

/// Quality tier of a selected media URL
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaQuality {
    Hd,
    Standard,
}
