//! tikwm.com metadata API client

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::core::video_info::{ProfilePage, VideoRecord};
use crate::error::RtikError;
use crate::platform::client::ApiClient;
use crate::platform::throttle::RequestThrottle;

/// Production API base URL
pub const DEFAULT_BASE_URL: &str = "https://www.tikwm.com";

/// Page size for profile listings
pub const PAGE_SIZE: u32 = 34;

/// Sentinel cursor requesting the first listing page
pub const START_CURSOR: &str = "0";

/// Metadata API client
///
/// Every request goes through the shared [`RequestThrottle`], so all clients
/// holding the same handle observe one global request spacing.
pub struct TikwmClient {
    http: ApiClient,
    throttle: Arc<RequestThrottle>,
    cancel: CancellationToken,
    base_url: String,
}

impl TikwmClient {
    /// Create a client over the given transport and shared throttle
    pub fn new(http: ApiClient, throttle: Arc<RequestThrottle>) -> Self {
        Self {
            http,
            throttle,
            cancel: CancellationToken::new(),
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    /// Override the API base URL
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    /// Set the cancellation token checked while throttled
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Resolve a share link into a full video record
    pub async fn resolve_video(&self, link: &str) -> Result<VideoRecord, RtikError> {
        info!("Resolving video metadata for {}", link);

        let info: ResolvedInfo = self
            .post_form("/api/", &[("url", link), ("hd", "1")])
            .await?;

        Ok(info.into())
    }

    /// Fetch one page of a profile's video listing, newest first.
    ///
    /// The first page is requested with [`START_CURSOR`]; later pages use
    /// the cursor returned by the previous one.
    pub async fn profile_page(&self, handle: &str, cursor: &str) -> Result<ProfilePage, RtikError> {
        info!("Fetching posts of @{} at cursor {}", handle, cursor);

        let count = PAGE_SIZE.to_string();
        let data: PostsData = self
            .post_form(
                "/api/user/posts/",
                &[("unique_id", handle), ("count", &count), ("cursor", cursor)],
            )
            .await?;

        Ok(ProfilePage {
            videos: data.videos.into_iter().map(Into::into).collect(),
            cursor: data.cursor,
            has_more: data.has_more,
        })
    }

    /// POST a form and unwrap the response envelope.
    ///
    /// The envelope is decoded in two steps so an application-level rejection
    /// (`code != 0`), a transport failure, and a malformed payload stay
    /// distinguishable.
    async fn post_form<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        form: &[(&str, &str)],
    ) -> Result<T, RtikError> {
        self.throttle.wait(&self.cancel).await?;

        let url = format!("{}{}", self.base_url, endpoint);
        debug!("POST {}", url);

        let response = self
            .http
            .client()
            .post(&url)
            .form(form)
            .send()
            .await?
            .error_for_status()?;

        let body = response.text().await?;
        let envelope: Envelope = serde_json::from_str(&body)?;

        if envelope.code != 0 {
            return Err(RtikError::Remote(envelope.msg));
        }

        Ok(serde_json::from_value(envelope.data)?)
    }
}

/// Outer response wrapper shared by both endpoints
#[derive(Debug, Deserialize)]
struct Envelope {
    code: i64,
    #[serde(default)]
    msg: String,
    #[serde(default)]
    data: serde_json::Value,
}

/// Payload of the resolve endpoint
#[derive(Debug, Deserialize)]
struct ResolvedInfo {
    id: String,
    #[serde(default)]
    play: String,
    #[serde(default)]
    hdplay: String,
    #[serde(with = "chrono::serde::ts_seconds")]
    create_time: DateTime<Utc>,
    author: AuthorInfo,
}

/// Payload of the listing endpoint
#[derive(Debug, Deserialize)]
struct PostsData {
    #[serde(default)]
    videos: Vec<ListedInfo>,
    cursor: String,
    #[serde(rename = "hasMore")]
    has_more: bool,
}

/// One video entry in a listing page
#[derive(Debug, Deserialize)]
struct ListedInfo {
    video_id: String,
    #[serde(default)]
    play: String,
    #[serde(default)]
    wmplay: String,
    #[serde(with = "chrono::serde::ts_seconds")]
    create_time: DateTime<Utc>,
    author: AuthorInfo,
}

#[derive(Debug, Deserialize)]
struct AuthorInfo {
    unique_id: String,
}

/// The API reports a missing URL as an empty string
fn non_empty(value: String) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value)
    }
}

impl From<ResolvedInfo> for VideoRecord {
    fn from(info: ResolvedInfo) -> Self {
        VideoRecord {
            id: info.id,
            author_handle: info.author.unique_id,
            created_at: info.create_time,
            play_url: non_empty(info.play),
            hd_play_url: non_empty(info.hdplay),
        }
    }
}

impl From<ListedInfo> for VideoRecord {
    fn from(info: ListedInfo) -> Self {
        VideoRecord {
            id: info.video_id,
            author_handle: info.author.unique_id,
            created_at: info.create_time,
            // Listing entries carry no HD URL; prefer the clean variant
            play_url: non_empty(info.play).or_else(|| non_empty(info.wmplay)),
            hd_play_url: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::video_info::MediaQuality;
    use mockito::{Matcher, Server};
    use std::time::Duration;

    fn test_client(base_url: &str) -> TikwmClient {
        let throttle = Arc::new(RequestThrottle::new(Duration::ZERO));
        TikwmClient::new(ApiClient::new(), throttle).with_base_url(base_url)
    }

    #[tokio::test]
    async fn test_resolve_video_decodes_record() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/api/")
            .match_body(Matcher::AllOf(vec![
                Matcher::UrlEncoded(
                    "url".into(),
                    "https://www.tiktok.com/@alice/video/123".into(),
                ),
                Matcher::UrlEncoded("hd".into(), "1".into()),
            ]))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{"code":0,"msg":"success","processed_time":0.17,
                    "data":{"id":"123","play":"http://x/sd.mp4","hdplay":"http://x/hd.mp4",
                            "create_time":1690000000,"author":{"unique_id":"alice"}}}"#,
            )
            .create_async()
            .await;

        let client = test_client(&server.url());
        let record = client
            .resolve_video("https://www.tiktok.com/@alice/video/123")
            .await
            .unwrap();

        assert_eq!(record.id, "123");
        assert_eq!(record.author_handle, "alice");
        assert_eq!(record.play_url.as_deref(), Some("http://x/sd.mp4"));
        assert_eq!(record.hd_play_url.as_deref(), Some("http://x/hd.mp4"));
        assert_eq!(record.filename(), "alice_2023-07-22_123.mp4");
        assert_eq!(record.best_media().unwrap().quality, MediaQuality::Hd);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_resolve_video_empty_urls_become_none() {
        let mut server = Server::new_async().await;
        server
            .mock("POST", "/api/")
            .with_status(200)
            .with_body(
                r#"{"code":0,"msg":"success",
                    "data":{"id":"5","play":"","hdplay":"","create_time":1690000000,
                            "author":{"unique_id":"alice"}}}"#,
            )
            .create_async()
            .await;

        let client = test_client(&server.url());
        let record = client.resolve_video("link").await.unwrap();

        assert_eq!(record.play_url, None);
        assert_eq!(record.hd_play_url, None);
        assert!(matches!(
            record.best_media(),
            Err(RtikError::NoMediaFound)
        ));
    }

    #[tokio::test]
    async fn test_remote_rejection_carries_message() {
        let mut server = Server::new_async().await;
        server
            .mock("POST", "/api/")
            .with_status(200)
            .with_body(r#"{"code":-1,"msg":"url is invalid!","data":null}"#)
            .create_async()
            .await;

        let client = test_client(&server.url());
        let err = client.resolve_video("nonsense").await.unwrap_err();

        match err {
            RtikError::Remote(msg) => assert_eq!(msg, "url is invalid!"),
            other => panic!("expected Remote error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_malformed_body_is_decode_error() {
        let mut server = Server::new_async().await;
        server
            .mock("POST", "/api/")
            .with_status(200)
            .with_body("<html>definitely not json</html>")
            .create_async()
            .await;

        let client = test_client(&server.url());
        let err = client.resolve_video("link").await.unwrap_err();
        assert!(matches!(err, RtikError::Decode(_)));
    }

    #[tokio::test]
    async fn test_missing_data_is_decode_error() {
        let mut server = Server::new_async().await;
        server
            .mock("POST", "/api/")
            .with_status(200)
            .with_body(r#"{"code":0,"msg":"success"}"#)
            .create_async()
            .await;

        let client = test_client(&server.url());
        let err = client.resolve_video("link").await.unwrap_err();
        assert!(matches!(err, RtikError::Decode(_)));
    }

    #[tokio::test]
    async fn test_http_failure_is_transport_error() {
        let mut server = Server::new_async().await;
        server
            .mock("POST", "/api/")
            .with_status(502)
            .create_async()
            .await;

        let client = test_client(&server.url());
        let err = client.resolve_video("link").await.unwrap_err();
        assert!(matches!(err, RtikError::Transport(_)));
    }

    #[tokio::test]
    async fn test_profile_page_decodes_listing() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/api/user/posts/")
            .match_body(Matcher::AllOf(vec![
                Matcher::UrlEncoded("unique_id".into(), "bob".into()),
                Matcher::UrlEncoded("count".into(), "34".into()),
                Matcher::UrlEncoded("cursor".into(), "0".into()),
            ]))
            .with_status(200)
            .with_body(
                r#"{"code":0,"msg":"success",
                    "data":{"videos":[
                        {"video_id":"11","play":"http://x/11.mp4","wmplay":"http://x/11wm.mp4",
                         "create_time":1641038400,"author":{"unique_id":"bob"}},
                        {"video_id":"10","play":"","wmplay":"http://x/10wm.mp4",
                         "create_time":1640995200,"author":{"unique_id":"bob"}}],
                    "cursor":"1640995200000","hasMore":true}}"#,
            )
            .create_async()
            .await;

        let client = test_client(&server.url());
        let page = client.profile_page("bob", START_CURSOR).await.unwrap();

        assert_eq!(page.videos.len(), 2);
        assert_eq!(page.cursor, "1640995200000");
        assert!(page.has_more);

        assert_eq!(page.videos[0].id, "11");
        assert_eq!(page.videos[0].play_url.as_deref(), Some("http://x/11.mp4"));
        assert_eq!(page.videos[0].hd_play_url, None);

        // Watermarked URL is the fallback when the clean one is missing
        assert_eq!(
            page.videos[1].play_url.as_deref(),
            Some("http://x/10wm.mp4")
        );
        assert_eq!(page.videos[1].filename(), "bob_2022-01-01_10.mp4");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_profile_page_unknown_handle() {
        let mut server = Server::new_async().await;
        server
            .mock("POST", "/api/user/posts/")
            .with_status(200)
            .with_body(r#"{"code":-1,"msg":"user not found","data":null}"#)
            .create_async()
            .await;

        let client = test_client(&server.url());
        let err = client.profile_page("ghost", START_CURSOR).await.unwrap_err();
        assert!(matches!(err, RtikError::Remote(_)));
    }
}
