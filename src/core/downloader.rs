//! Download and profile sync orchestration

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::core::presence::PresenceIndex;
use crate::core::progress::Progress;
use crate::core::sync::{PageLister, ProfileCrawler, SyncMode, SyncReport, VideoDownloader};
use crate::core::video_info::{MediaQuality, ProfilePage};
use crate::download::convert::{Converter, FfmpegConverter, DEFAULT_FFMPEG};
use crate::download::fetcher::{HttpFetcher, MediaFetcher};
use crate::error::RtikError;
use crate::platform::client::{ApiClient, HttpConfig};
use crate::platform::throttle::RequestThrottle;
use crate::platform::tikwm::TikwmClient;
use crate::utils::url::normalize_handle;

/// Main downloader configuration
#[derive(Debug, Clone)]
pub struct DownloadOptions {
    /// Target directory, profile syncs default to one named after the handle
    pub directory: Option<PathBuf>,
    /// How profile syncs treat already-present videos
    pub mode: SyncMode,
    /// Re-encode each downloaded video to H.264
    pub convert: bool,
    /// ffmpeg binary used when converting
    pub ffmpeg_path: PathBuf,
    /// HTTP timeout
    pub timeout: Duration,
    /// User-Agent override
    pub user_agent: Option<String>,
    /// Proxy URL for all requests
    pub proxy_url: Option<String>,
}

impl Default for DownloadOptions {
    fn default() -> Self {
        Self {
            directory: None,
            mode: SyncMode::Strict,
            convert: false,
            ffmpeg_path: PathBuf::from(DEFAULT_FFMPEG),
            timeout: Duration::from_secs(30),
            user_agent: None,
            proxy_url: None,
        }
    }
}

/// Orchestrates metadata lookups, media transfers and profile syncs
pub struct Downloader {
    options: DownloadOptions,
    http: ApiClient,
    client: TikwmClient,
    fetcher: Box<dyn MediaFetcher>,
    custom_fetcher: bool,
    converter: Box<dyn Converter>,
    cancel: CancellationToken,
}

impl Downloader {
    /// Create a downloader with default options and its own throttle
    pub fn new() -> Self {
        Self::with_options(
            DownloadOptions::default(),
            Arc::new(RequestThrottle::default()),
        )
    }

    /// Create a downloader whose API requests go through `throttle`
    pub fn with_options(options: DownloadOptions, throttle: Arc<RequestThrottle>) -> Self {
        let http = ApiClient::with_config(HttpConfig {
            timeout: options.timeout,
            user_agent: options.user_agent.clone(),
            proxy_url: options.proxy_url.clone(),
        });

        Self {
            client: TikwmClient::new(http.clone(), throttle),
            fetcher: Box::new(HttpFetcher::with_client(http.clone())),
            custom_fetcher: false,
            converter: Box::new(FfmpegConverter::with_binary(&options.ffmpeg_path)),
            http,
            options,
            cancel: CancellationToken::new(),
        }
    }

    /// Override the metadata API base URL
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.client = self.client.with_base_url(base_url);
        self
    }

    /// Replace the media fetcher
    pub fn with_fetcher(mut self, fetcher: impl MediaFetcher + 'static) -> Self {
        self.fetcher = Box::new(fetcher);
        self.custom_fetcher = true;
        self
    }

    /// Stream transfer progress to `callback`.
    ///
    /// Configures the built-in HTTP fetcher; a fetcher injected with
    /// `with_fetcher` stays in place regardless of call order.
    pub fn with_progress_callback<F>(mut self, callback: F) -> Self
    where
        F: Fn(Progress) + Send + Sync + 'static,
    {
        if !self.custom_fetcher {
            self.fetcher = Box::new(
                HttpFetcher::with_client(self.http.clone()).with_progress_callback(callback),
            );
        }
        self
    }

    /// Replace the converter
    pub fn with_converter(mut self, converter: impl Converter + 'static) -> Self {
        self.converter = Box::new(converter);
        self
    }

    /// Set the cancellation token observed by every stage
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.client = self.client.with_cancellation(cancel.clone());
        self.cancel = cancel;
        self
    }

    /// Resolve a share link and download the video into `dir`.
    ///
    /// Prefers the HD rendition, falling back to standard quality with a
    /// warning. Returns the canonical filename the video was stored under.
    pub async fn download_video(&self, link: &str, dir: &Path) -> Result<String, RtikError> {
        let video = self.client.resolve_video(link).await?;
        let media = video.best_media()?;
        if media.quality == MediaQuality::Standard {
            warn!(
                "No HD media for video {}, falling back to standard quality",
                video.id
            );
        }

        let filename = video.filename();
        let dest = dir.join(&filename);
        info!("Downloading video {} as {}", video.id, filename);
        self.fetcher.fetch(&media.url, &dest).await?;

        if self.options.convert {
            // The original download stays usable when re-encoding fails
            if let Err(e) = self.converter.convert(&dest).await {
                warn!("Conversion of {} failed: {}", filename, e);
            }
        }

        Ok(filename)
    }

    /// Mirror a profile into its directory.
    ///
    /// The directory defaults to one named after the normalized handle and is
    /// created when missing. Presence of earlier downloads is decided from a
    /// snapshot taken before the first page is fetched.
    pub async fn sync_profile(&self, handle: &str) -> Result<SyncReport, RtikError> {
        let handle = normalize_handle(handle);

        let dir = match &self.options.directory {
            Some(directory) => directory.clone(),
            None => PathBuf::from(&handle),
        };
        tokio::fs::create_dir_all(&dir)
            .await
            .map_err(|source| RtikError::Directory {
                path: dir.clone(),
                source,
            })?;

        let mut index = PresenceIndex::scan(&dir)?;
        info!(
            "Syncing @{} into {} ({} files already present)",
            handle,
            dir.display(),
            index.len()
        );

        let crawler = ProfileCrawler::new(&self.client, self)
            .with_mode(self.options.mode)
            .with_cancellation(self.cancel.clone());
        crawler.run(&handle, &dir, &mut index).await
    }
}

impl Default for Downloader {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl PageLister for TikwmClient {
    async fn profile_page(&self, handle: &str, cursor: &str) -> Result<ProfilePage, RtikError> {
        TikwmClient::profile_page(self, handle, cursor).await
    }
}

#[async_trait::async_trait]
impl VideoDownloader for Downloader {
    async fn download_video(&self, link: &str, dir: &Path) -> Result<String, RtikError> {
        Downloader::download_video(self, link, dir).await
    }
}
