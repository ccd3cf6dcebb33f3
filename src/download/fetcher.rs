//! Streaming media transfer

use std::path::Path;
use std::sync::Arc;

use futures_util::StreamExt;
use tokio::fs::File;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, warn};

use crate::core::progress::Progress;
use crate::error::RtikError;
use crate::platform::client::ApiClient;

/// Capability to transfer one media URL into a local file
#[async_trait::async_trait]
pub trait MediaFetcher: Send + Sync {
    /// Fetch `url` into `dest`, replacing any earlier partial attempt
    async fn fetch(&self, url: &str, dest: &Path) -> Result<(), RtikError>;
}

/// HTTP fetcher streaming the response body straight to disk.
///
/// Bytes land in a `.tmp` sibling first; `dest` only appears once the whole
/// body arrived, so an interrupted transfer never leaves a truncated file
/// under the final name.
pub struct HttpFetcher {
    http: ApiClient,
    progress_callback: Option<Arc<dyn Fn(Progress) + Send + Sync>>,
}

impl HttpFetcher {
    /// Create a fetcher with a default transport
    pub fn new() -> Self {
        Self::with_client(ApiClient::new())
    }

    /// Create a fetcher over an existing transport
    pub fn with_client(http: ApiClient) -> Self {
        Self {
            http,
            progress_callback: None,
        }
    }

    /// Set a callback invoked after every chunk written
    pub fn with_progress_callback<F>(mut self, callback: F) -> Self
    where
        F: Fn(Progress) + Send + Sync + 'static,
    {
        self.progress_callback = Some(Arc::new(callback));
        self
    }

    async fn stream_to_file(&self, url: &str, file: &mut File) -> Result<u64, RtikError> {
        let response = self
            .http
            .client()
            .get(url)
            .send()
            .await
            .and_then(|response| response.error_for_status())
            .map_err(|source| RtikError::Transfer {
                url: url.to_string(),
                source,
            })?;

        let mut progress = Progress::new(response.content_length().unwrap_or(0));
        let mut stream = response.bytes_stream();
        let mut downloaded = 0u64;

        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|source| RtikError::Transfer {
                url: url.to_string(),
                source,
            })?;
            file.write_all(&chunk).await?;
            downloaded += chunk.len() as u64;

            if let Some(callback) = &self.progress_callback {
                progress.update(downloaded);
                callback(progress.clone());
            }
        }

        file.flush().await?;
        file.sync_all().await?;
        Ok(downloaded)
    }
}

impl Default for HttpFetcher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl MediaFetcher for HttpFetcher {
    async fn fetch(&self, url: &str, dest: &Path) -> Result<(), RtikError> {
        debug!("Fetching {} into {}", url, dest.display());

        let tmp_path = dest.with_extension("tmp");
        let mut file = File::create(&tmp_path).await?;

        match self.stream_to_file(url, &mut file).await {
            Ok(bytes) => {
                drop(file);
                tokio::fs::rename(&tmp_path, dest).await?;
                info!("Fetched {} bytes into {}", bytes, dest.display());
                Ok(())
            }
            Err(e) => {
                warn!("Transfer failed: {}, removing partial file", e);
                let _ = tokio::fs::remove_file(&tmp_path).await;
                Err(e)
            }
        }
    }
}
