//! H.264 re-encoding via ffmpeg

use std::path::{Path, PathBuf};

use tokio::process::Command;
use tracing::{debug, info};

use crate::error::RtikError;

/// Default ffmpeg binary, resolved through PATH
pub const DEFAULT_FFMPEG: &str = "ffmpeg";

/// Encoder preset trading a little size for speed
const FFMPEG_PRESET: &str = "faster";

/// Capability to re-encode a downloaded file in place
#[async_trait::async_trait]
pub trait Converter: Send + Sync {
    /// Re-encode `file`, replacing it on success
    async fn convert(&self, file: &Path) -> Result<(), RtikError>;
}

/// H.264/AAC converter shelling out to ffmpeg.
///
/// Output goes to a `.h264.mp4` sidecar which replaces the original only
/// after ffmpeg exits cleanly.
pub struct FfmpegConverter {
    ffmpeg: PathBuf,
}

impl FfmpegConverter {
    /// Create a converter using the `ffmpeg` from PATH
    pub fn new() -> Self {
        Self::with_binary(DEFAULT_FFMPEG)
    }

    /// Create a converter using a specific ffmpeg binary
    pub fn with_binary(ffmpeg: impl Into<PathBuf>) -> Self {
        Self {
            ffmpeg: ffmpeg.into(),
        }
    }
}

impl Default for FfmpegConverter {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl Converter for FfmpegConverter {
    async fn convert(&self, file: &Path) -> Result<(), RtikError> {
        let mut sidecar = file.as_os_str().to_os_string();
        sidecar.push(".h264.mp4");
        let out_path = PathBuf::from(sidecar);

        debug!(
            "Converting {} with {}",
            file.display(),
            self.ffmpeg.display()
        );

        let output = Command::new(&self.ffmpeg)
            .arg("-i")
            .arg(file)
            .args(["-vcodec", "libx264", "-acodec", "aac", "-y"])
            .args(["-preset", FFMPEG_PRESET])
            .arg(&out_path)
            .output()
            .await
            .map_err(|e| {
                RtikError::Convert(format!("cannot run {}: {}", self.ffmpeg.display(), e))
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let detail = stderr
                .lines()
                .rev()
                .find(|line| !line.trim().is_empty())
                .unwrap_or("no output")
                .trim();
            let _ = tokio::fs::remove_file(&out_path).await;
            return Err(RtikError::Convert(format!(
                "{} exited with {}: {}",
                self.ffmpeg.display(),
                output.status,
                detail
            )));
        }

        tokio::fs::rename(&out_path, file).await?;
        info!("Converted {} to H.264", file.display());
        Ok(())
    }
}
