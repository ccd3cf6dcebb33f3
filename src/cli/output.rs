//! Output formatting and progress display

use crate::cli::args::VerbosityLevel;
use crate::core::progress::{format_bytes_per_second, format_duration, Progress};
use crate::core::sync::{StopReason, SyncReport};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use std::io::Write;
use std::sync::Arc;
use std::time::Duration;

/// Output formatter for rtik
pub struct OutputFormatter {
    verbosity: VerbosityLevel,
    progress_bar: Option<ProgressBar>,
}

impl OutputFormatter {
    /// Create a new output formatter
    pub fn new(verbosity: VerbosityLevel) -> Self {
        Self {
            verbosity,
            progress_bar: None,
        }
    }

    /// Attach a transfer progress bar unless running quiet
    pub fn with_progress_bar(mut self) -> Self {
        if self.verbosity == VerbosityLevel::Quiet {
            return self;
        }

        let style = ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {bytes}/{total_bytes} {msg}")
            .unwrap()
            .progress_chars("#>-");

        let progress_bar = ProgressBar::new(0);
        progress_bar.set_style(style);

        self.progress_bar = Some(progress_bar);
        self
    }

    /// Update progress bar from a transfer snapshot
    pub fn update_progress(&self, progress: &Progress) {
        if let Some(progress_bar) = &self.progress_bar {
            progress_bar.set_length(progress.total_size);
            progress_bar.set_position(progress.downloaded_size);

            if let Some(speed) = progress.speed {
                progress_bar.set_message(format_bytes_per_second(speed));
            }
        }
    }

    /// Remove the progress bar from the terminal
    pub fn finish_progress(&self) {
        if let Some(progress_bar) = &self.progress_bar {
            progress_bar.finish_and_clear();
        }
    }

    /// Print info message
    pub fn info(&self, message: &str) {
        if self.verbosity != VerbosityLevel::Quiet {
            println!("ℹ️  {}", message);
        }
    }

    /// Print success message
    pub fn success(&self, message: &str) {
        if self.verbosity != VerbosityLevel::Quiet {
            println!("✅ {}", message);
        }
    }

    /// Print warning message
    pub fn warning(&self, message: &str) {
        if self.verbosity != VerbosityLevel::Quiet {
            eprintln!("⚠️  {}", message);
        }
    }

    /// Print error message
    pub fn error(&self, message: &str) {
        eprintln!("❌ {}", message.red());
    }

    /// Print the interactive mode banner
    pub fn print_banner(&self) {
        println!(
            "{} {}",
            "RTIK".cyan().bold(),
            concat!("v", env!("CARGO_PKG_VERSION"))
        );
        println!("Paste video links, or handles with --profile.");
        println!("Enter 'help' for options, an empty line exits.");
        println!();
    }

    /// Print the interactive prompt without a trailing newline
    pub fn print_prompt(&self) {
        print!("{} ", ">>>".green());
        let _ = std::io::stdout().flush();
    }

    /// Announce the start of a profile sync
    pub fn print_profile_start(&self, handle: &str) {
        if self.verbosity == VerbosityLevel::Quiet {
            return;
        }
        println!("📥 Syncing @{}...", handle.bold());
    }

    /// Summarize a finished profile sync
    pub fn print_profile_summary(&self, handle: &str, report: &SyncReport, elapsed: Duration) {
        if self.verbosity == VerbosityLevel::Quiet {
            return;
        }

        let coverage = match report.reason {
            StopReason::FoundExisting => "up to date",
            StopReason::EndOfListing => "full history checked",
        };
        println!(
            "✅ @{}: {} new, {} already present, {} ({})",
            handle.bold(),
            report.downloaded,
            report.skipped,
            coverage,
            format_duration(elapsed)
        );
    }

    /// Report a single saved video
    pub fn print_video_saved(&self, filename: &str) {
        self.success(&format!("Saved {}", filename));
    }
}

/// Create a progress callback for the downloader
pub fn create_progress_callback(
    formatter: Arc<OutputFormatter>,
) -> impl Fn(Progress) + Send + Sync + 'static {
    move |progress: Progress| {
        formatter.update_progress(&progress);
    }
}
