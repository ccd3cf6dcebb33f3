//! # rtik - TikTok Downloader
//!
//! Downloads TikTok videos and mirrors whole profiles into local
//! directories, keeping every metadata request behind a shared rate limit.
//!
//! ## Features
//!
//! - Incremental profile sync that stops at the first already-saved video
//! - Full-listing scan mode for filling gaps in older history
//! - HD media with automatic standard-quality fallback
//! - Process-wide request throttling shared by all API clients
//! - Optional H.264 re-encoding through ffmpeg
//!
//! ## Example
//!
//! ```rust,no_run
//! use rtik::{DownloadOptions, Downloader};
//! use rtik::platform::RequestThrottle;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let throttle = Arc::new(RequestThrottle::default());
//!     let downloader = Downloader::with_options(DownloadOptions::default(), throttle);
//!
//!     let report = downloader.sync_profile("astronomy.daily").await?;
//!     println!("{} new videos", report.downloaded);
//!
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod core;
pub mod download;
pub mod error;
pub mod utils;
pub mod platform;

// Re-export main types
pub use crate::core::{
    DownloadOptions, Downloader, PresenceIndex, Progress, ProfileCrawler, SyncMode, SyncReport,
    VideoRecord,
};
pub use error::RtikError;

/// Result type alias for rtik operations
pub type Result<T> = std::result::Result<T, RtikError>;
