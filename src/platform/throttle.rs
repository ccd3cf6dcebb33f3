//! Fixed-interval spacing between metadata API requests

use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::error::RtikError;

/// Default minimum gap between API requests
pub const DEFAULT_REQUEST_INTERVAL: Duration = Duration::from_secs(12);

/// Process-wide minimum spacing between API requests.
///
/// One instance is shared via `Arc` by every component that talks to the
/// remote API, so the gap holds across profile syncs and single-video
/// downloads alike. The interval starts when a request is released, not
/// when it completes.
#[derive(Debug)]
pub struct RequestThrottle {
    interval: Duration,
    /// `None` until the first request has been released
    last_request: Mutex<Option<Instant>>,
}

impl RequestThrottle {
    /// Create a throttle with the given minimum gap
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last_request: Mutex::new(None),
        }
    }

    /// Get the configured minimum gap
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Block until at least the configured interval has passed since the
    /// previous call returned, then record the current request.
    ///
    /// The first call returns immediately. Callers are serialized on the
    /// internal lock, so two concurrent waiters can never be released less
    /// than one interval apart. Cancellation aborts the wait without
    /// recording a request.
    pub async fn wait(&self, cancel: &CancellationToken) -> Result<(), RtikError> {
        let mut last_request = self.last_request.lock().await;

        if let Some(last) = *last_request {
            let elapsed = last.elapsed();
            if elapsed < self.interval {
                let delay = self.interval - elapsed;
                debug!("Throttling request for {:?}", delay);
                tokio::select! {
                    _ = tokio::time::sleep(delay) => {}
                    _ = cancel.cancelled() => return Err(RtikError::Cancelled),
                }
            }
        } else {
            debug!("First request, no throttle delay");
        }

        *last_request = Some(Instant::now());
        Ok(())
    }
}

impl Default for RequestThrottle {
    fn default() -> Self {
        Self::new(DEFAULT_REQUEST_INTERVAL)
    }
}
