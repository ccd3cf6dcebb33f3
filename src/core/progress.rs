//! Transfer progress reporting

use std::time::{Duration, Instant};

/// Snapshot of one media transfer
#[derive(Debug, Clone)]
pub struct Progress {
    /// Expected size in bytes, 0 when the server did not say
    pub total_size: u64,
    /// Bytes written so far
    pub downloaded_size: u64,
    /// Completion percentage, stays 0.0 while the total is unknown
    pub percent: f64,
    /// Average speed in bytes per second
    pub speed: Option<f64>,
    /// When the transfer started
    pub start_time: Instant,
}

impl Progress {
    /// Start tracking a transfer of `total_size` bytes
    pub fn new(total_size: u64) -> Self {
        Self {
            total_size,
            downloaded_size: 0,
            percent: 0.0,
            speed: None,
            start_time: Instant::now(),
        }
    }

    /// Record the new byte count
    pub fn update(&mut self, downloaded_size: u64) {
        self.downloaded_size = downloaded_size;
        if self.total_size > 0 {
            self.percent = downloaded_size as f64 / self.total_size as f64 * 100.0;
        }

        let elapsed = self.start_time.elapsed();
        if elapsed.as_millis() > 0 {
            self.speed = Some(downloaded_size as f64 / elapsed.as_secs_f64());
        }
    }
}

/// Format a byte count for humans
pub fn format_bytes(bytes: u64) -> String {
    const UNITS: &[&str] = &["B", "KB", "MB", "GB", "TB"];

    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }

    if unit == 0 {
        format!("{} {}", bytes, UNITS[0])
    } else {
        format!("{:.1} {}", value, UNITS[unit])
    }
}

/// Format a transfer speed for humans
pub fn format_bytes_per_second(bytes_per_second: f64) -> String {
    format!("{}/s", format_bytes(bytes_per_second as u64))
}

/// Format a wall-clock duration for humans
pub fn format_duration(duration: Duration) -> String {
    let secs = duration.as_secs();

    if secs < 60 {
        format!("{}s", secs)
    } else if secs < 3600 {
        match secs % 60 {
            0 => format!("{}m", secs / 60),
            rest => format!("{}m {}s", secs / 60, rest),
        }
    } else {
        match (secs % 3600) / 60 {
            0 => format!("{}h", secs / 3600),
            minutes => format!("{}h {}m", secs / 3600, minutes),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_progress_tracks_percent() {
        let mut progress = Progress::new(2000);
        assert_eq!(progress.percent, 0.0);

        progress.update(500);
        assert_eq!(progress.percent, 25.0);

        progress.update(2000);
        assert_eq!(progress.percent, 100.0);
    }

    #[test]
    fn test_unknown_total_keeps_percent_at_zero() {
        let mut progress = Progress::new(0);
        progress.update(5000);
        assert_eq!(progress.percent, 0.0);
        assert_eq!(progress.downloaded_size, 5000);
    }

    #[test]
    fn test_speed_appears_after_time_passes() {
        let mut progress = Progress::new(1000);
        std::thread::sleep(Duration::from_millis(50));
        progress.update(100);
        assert!(progress.speed.unwrap() > 0.0);
    }

    #[test]
    fn test_format_bytes() {
        assert_eq!(format_bytes(0), "0 B");
        assert_eq!(format_bytes(512), "512 B");
        assert_eq!(format_bytes(1024), "1.0 KB");
        assert_eq!(format_bytes(1024 * 1024 * 3 / 2), "1.5 MB");
        assert_eq!(format_bytes(5 * 1024 * 1024 * 1024), "5.0 GB");
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(Duration::from_secs(45)), "45s");
        assert_eq!(format_duration(Duration::from_secs(120)), "2m");
        assert_eq!(format_duration(Duration::from_secs(150)), "2m 30s");
        assert_eq!(format_duration(Duration::from_secs(7200)), "2h");
        assert_eq!(format_duration(Duration::from_secs(7260)), "2h 1m");
    }
}
