use serde::Serialize;
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TranscriptError {
    #[error("Could not locate the embedded player configuration in the page")]
    ConfigNotFound,

    #[error("No caption track available: {0}")]
    NoCaptionTrack(String),

    #[error("HTTP {status} while fetching {url}")]
    Fetch { status: u16, url: String },

    #[error("HTTP error: {0}")]
    Http(String),

    #[error("Malformed response: {0}")]
    Parse(String),

    #[error("The video has captions but no transcript text could be extracted")]
    EmptyTranscript,

    #[error("Timed out after {0:?}")]
    Timeout(Duration),

    #[error("Invalid timestamp: {0} (must be a finite, non-negative number of milliseconds)")]
    InvalidTimestamp(f64),

    #[error("Invalid video ID: {0}")]
    InvalidVideoId(String),

    #[error("Not a YouTube watch page: {0}")]
    NotAVideoPage(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Could not extract enough readable text from the page")]
    NoPageText,
}

/// Coarse failure categories a caller can render a distinct message for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    NoConfig,
    NoCaptions,
    Network,
    Malformed,
    EmptyTranscript,
    InvalidInput,
    Timeout,
}

impl TranscriptError {
    pub fn kind(&self) -> FailureKind {
        match self {
            TranscriptError::ConfigNotFound => FailureKind::NoConfig,
            TranscriptError::NoCaptionTrack(_) => FailureKind::NoCaptions,
            TranscriptError::Fetch { .. } | TranscriptError::Http(_) => FailureKind::Network,
            TranscriptError::Parse(_) => FailureKind::Malformed,
            TranscriptError::EmptyTranscript | TranscriptError::NoPageText => {
                FailureKind::EmptyTranscript
            }
            TranscriptError::Timeout(_) => FailureKind::Timeout,
            TranscriptError::InvalidTimestamp(_)
            | TranscriptError::InvalidVideoId(_)
            | TranscriptError::NotAVideoPage(_)
            | TranscriptError::Config(_) => FailureKind::InvalidInput,
        }
    }
}

pub type Result<T> = std::result::Result<T, TranscriptError>;
