//! Error types for rtik

use std::path::PathBuf;

use thiserror::Error;

/// Main error type for rtik operations
#[derive(Debug, Error)]
pub enum RtikError {
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("API rejected request: {0}")]
    Remote(String),

    #[error("Malformed API response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("No playable media found")]
    NoMediaFound,

    #[error("Invalid video link: {0}")]
    InvalidLink(String),

    #[error("Cannot use directory {path}: {source}")]
    Directory {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Transfer failed for {url}: {source}")]
    Transfer {
        url: String,
        source: reqwest::Error,
    },

    #[error("Conversion failed: {0}")]
    Convert(String),

    #[error("Operation cancelled")]
    Cancelled,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("URL parsing error: {0}")]
    UrlError(#[from] url::ParseError),

    #[error("Profile @{handle} failed while {context}")]
    Profile {
        handle: String,
        context: String,
        source: Box<RtikError>,
    },
}

impl RtikError {
    /// Check if error is a cooperative cancellation
    pub fn is_cancelled(&self) -> bool {
        match self {
            RtikError::Cancelled => true,
            RtikError::Profile { source, .. } => source.is_cancelled(),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profile_wrapper_keeps_cause_visible() {
        let err = RtikError::Profile {
            handle: "alice".to_string(),
            context: "fetching page 2".to_string(),
            source: Box::new(RtikError::Remote("profile not found".to_string())),
        };
        assert_eq!(
            err.to_string(),
            "Profile @alice failed while fetching page 2"
        );
        let source = std::error::Error::source(&err).expect("source should be set");
        assert_eq!(source.to_string(), "API rejected request: profile not found");
    }

    #[test]
    fn test_cancellation_detected_through_wrapper() {
        let err = RtikError::Profile {
            handle: "alice".to_string(),
            context: "downloading video 123".to_string(),
            source: Box::new(RtikError::Cancelled),
        };
        assert!(err.is_cancelled());
        assert!(!RtikError::NoMediaFound.is_cancelled());
    }
}
