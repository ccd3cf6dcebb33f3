//! Command line argument parsing

use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;

use crate::core::downloader::DownloadOptions;
use crate::core::sync::SyncMode;
use crate::platform::throttle::DEFAULT_REQUEST_INTERVAL;

/// RTIK - TikTok video downloader and profile mirror
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Video links, or profile handles with --profile
    pub targets: Vec<String>,

    /// Treat targets as profile handles and sync their videos
    #[arg(short, long)]
    pub profile: bool,

    /// Scan the whole listing instead of stopping at the first existing video
    #[arg(short = 'a', long)]
    pub check_all: bool,

    /// Directory downloads go to (defaults to one per profile)
    #[arg(short, long, value_name = "DIR")]
    pub directory: Option<PathBuf>,

    /// Re-encode downloads to H.264 with ffmpeg
    #[arg(short, long)]
    pub convert: bool,

    /// ffmpeg binary used with --convert
    #[arg(long, value_name = "PATH", default_value = "ffmpeg")]
    pub ffmpeg_path: PathBuf,

    /// Minimum spacing between API requests, set once at startup (default 12s)
    #[arg(long, value_name = "DURATION")]
    pub throttle: Option<humantime::Duration>,

    /// HTTP timeout (e.g. 30s, 1m)
    #[arg(long, value_name = "DURATION", default_value = "30s")]
    pub timeout: humantime::Duration,

    /// Disable progress output
    #[arg(long)]
    pub no_progress: bool,

    /// Override User-Agent header
    #[arg(long, value_name = "USER_AGENT")]
    pub user_agent: Option<String>,

    /// Proxy URL (http/https/socks)
    #[arg(long, value_name = "URL")]
    pub proxy: Option<String>,

    /// Verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Quiet output (only errors)
    #[arg(short, long)]
    pub quiet: bool,
}

impl Args {
    /// Whether targets name profiles rather than single videos
    pub fn profile_mode(&self) -> bool {
        self.profile || self.check_all
    }

    /// Sync mode selected by the flags
    pub fn sync_mode(&self) -> SyncMode {
        if self.check_all {
            SyncMode::CheckAll
        } else {
            SyncMode::Strict
        }
    }

    /// Get HTTP timeout as Duration
    pub fn timeout_duration(&self) -> Duration {
        self.timeout.into()
    }

    /// Get API request spacing as Duration
    pub fn throttle_duration(&self) -> Duration {
        self.throttle
            .map(Into::into)
            .unwrap_or(DEFAULT_REQUEST_INTERVAL)
    }

    /// Get output verbosity level
    pub fn verbosity_level(&self) -> VerbosityLevel {
        if self.quiet {
            VerbosityLevel::Quiet
        } else if self.verbose {
            VerbosityLevel::Verbose
        } else {
            VerbosityLevel::Normal
        }
    }

    /// Assemble downloader options from the flags
    pub fn download_options(&self) -> DownloadOptions {
        DownloadOptions {
            directory: self.directory.clone(),
            mode: self.sync_mode(),
            convert: self.convert,
            ffmpeg_path: self.ffmpeg_path.clone(),
            timeout: self.timeout_duration(),
            user_agent: self.user_agent.clone(),
            proxy_url: self.proxy.clone(),
        }
    }
}

/// Output verbosity level
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerbosityLevel {
    /// Quiet (only errors)
    Quiet,
    /// Normal
    Normal,
    /// Verbose (debug info)
    Verbose,
}
