//! Incremental profile sync crawler

use std::path::Path;

use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::core::presence::PresenceIndex;
use crate::core::video_info::ProfilePage;
use crate::error::RtikError;
use crate::platform::tikwm::START_CURSOR;

/// How the crawler reacts to an already-downloaded video
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncMode {
    /// Stop at the first existing video; everything older is assumed synced
    Strict,
    /// Skip existing videos individually and scan the whole listing
    CheckAll,
}

/// Why a sync run came to an end
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// Strict mode hit a video that is already on disk
    FoundExisting,
    /// The listing reported no further pages
    EndOfListing,
}

/// Summary of one completed profile sync
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncReport {
    /// Videos fetched during this run
    pub downloaded: usize,
    /// Videos recognized as already present
    pub skipped: usize,
    /// Listing pages requested
    pub pages: usize,
    /// Why the run stopped
    pub reason: StopReason,
}

/// Crawler state between transitions
enum SyncState {
    Fetching { cursor: String },
    Evaluating { page: ProfilePage },
    Stopped(StopReason),
}

/// Capability to fetch one listing page
#[async_trait::async_trait]
pub trait PageLister: Send + Sync {
    /// Fetch one page of a profile's listing, newest first
    async fn profile_page(&self, handle: &str, cursor: &str) -> Result<ProfilePage, RtikError>;
}

/// Capability to fetch one video into a directory
#[async_trait::async_trait]
pub trait VideoDownloader: Send + Sync {
    /// Download the video behind `link` into `dir`, returning its filename
    async fn download_video(&self, link: &str, dir: &Path) -> Result<String, RtikError>;
}

/// Walks a profile's listing newest-first and downloads what is missing.
///
/// Pagination, the presence decision per video, and the stop conditions all
/// live here; fetching pages and transferring bytes are injected capabilities
/// so the whole state machine tests without any network.
pub struct ProfileCrawler<'a> {
    lister: &'a dyn PageLister,
    downloader: &'a dyn VideoDownloader,
    mode: SyncMode,
    cancel: CancellationToken,
}

impl<'a> ProfileCrawler<'a> {
    /// Create a strict-mode crawler over the given capabilities
    pub fn new(lister: &'a dyn PageLister, downloader: &'a dyn VideoDownloader) -> Self {
        Self {
            lister,
            downloader,
            mode: SyncMode::Strict,
            cancel: CancellationToken::new(),
        }
    }

    /// Set the sync mode
    pub fn with_mode(mut self, mode: SyncMode) -> Self {
        self.mode = mode;
        self
    }

    /// Set the cancellation token checked between videos
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Sync one profile into `dir`.
    ///
    /// `index` must be a fresh snapshot of `dir`; filenames downloaded during
    /// the run are added to it so a video listed twice is not fetched twice.
    /// Any page fetch or download failure aborts the whole run.
    pub async fn run(
        &self,
        handle: &str,
        dir: &Path,
        index: &mut PresenceIndex,
    ) -> Result<SyncReport, RtikError> {
        let mut downloaded = 0;
        let mut skipped = 0;
        let mut pages = 0;

        let mut state = SyncState::Fetching {
            cursor: START_CURSOR.to_string(),
        };

        loop {
            state = match state {
                SyncState::Fetching { cursor } => {
                    pages += 1;
                    let page = self
                        .lister
                        .profile_page(handle, &cursor)
                        .await
                        .map_err(|source| RtikError::Profile {
                            handle: handle.to_string(),
                            context: format!("fetching page {}", pages),
                            source: Box::new(source),
                        })?;
                    debug!(
                        "Page {} of @{}: {} videos, has_more={}",
                        pages,
                        handle,
                        page.videos.len(),
                        page.has_more
                    );
                    SyncState::Evaluating { page }
                }

                SyncState::Evaluating { page } => {
                    let mut stopped = None;

                    for video in &page.videos {
                        if self.cancel.is_cancelled() {
                            return Err(RtikError::Cancelled);
                        }

                        let filename = video.filename();
                        if index.contains(&filename) {
                            skipped += 1;
                            match self.mode {
                                SyncMode::Strict => {
                                    debug!("Found existing {}, stopping", filename);
                                    stopped = Some(StopReason::FoundExisting);
                                    break;
                                }
                                SyncMode::CheckAll => {
                                    debug!("Found existing {}, continuing", filename);
                                    continue;
                                }
                            }
                        }

                        let downloaded_name = self
                            .downloader
                            .download_video(&video.share_link(), dir)
                            .await
                            .map_err(|source| RtikError::Profile {
                                handle: handle.to_string(),
                                context: format!("downloading video {}", video.id),
                                source: Box::new(source),
                            })?;
                        index.insert(downloaded_name);
                        downloaded += 1;
                    }

                    match stopped {
                        Some(reason) => SyncState::Stopped(reason),
                        None if !page.has_more => SyncState::Stopped(StopReason::EndOfListing),
                        None => SyncState::Fetching {
                            cursor: page.cursor,
                        },
                    }
                }

                SyncState::Stopped(reason) => {
                    info!(
                        "Synced @{}: {} downloaded, {} already present, {} pages",
                        handle, downloaded, skipped, pages
                    );
                    return Ok(SyncReport {
                        downloaded,
                        skipped,
                        pages,
                        reason,
                    });
                }
            };
        }
    }
}
