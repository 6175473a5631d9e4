use thiserror::Error;

pub type Result<T> = std::result::Result<T, TranscriptError>;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum TranscriptError {
    #[error("'{0}' is not a valid video ID (expected 11 characters from [0-9A-Za-z_-])")]
    InvalidIdentifier(String),

    #[error("Video {video_id} is unavailable: {reason}")]
    VideoUnavailable { video_id: String, reason: String },

    #[error("Transcripts are disabled for video {0}")]
    TranscriptsDisabled(String),

    #[error("Upstream is rate limiting requests for video {0}")]
    RateLimited(String),

    #[error("No transcript in '{requested}' for video {video_id}")]
    LanguageNotFound { video_id: String, requested: String },

    #[error("Cannot translate the '{source_lang}' transcript of video {video_id} into '{target}'")]
    TranslationUnavailable {
        video_id: String,
        source_lang: String,
        target: String,
    },

    #[error(
        "Could not resolve a '{requested}' transcript for video {video_id} ({reason}). Available languages: {}",
        describe_available(.available)
    )]
    ResolutionFailed {
        video_id: String,
        requested: String,
        reason: String,
        /// `(code, display name)` for every track in the catalog.
        available: Vec<(String, String)>,
    },

    #[error("Unexpected upstream failure: {0}")]
    UpstreamUnknown(String),
}

impl TranscriptError {
    /// Only rate limiting is worth another attempt.
    pub fn is_retryable(&self) -> bool {
        matches!(self, TranscriptError::RateLimited(_))
    }
}

fn describe_available(available: &[(String, String)]) -> String {
    if available.is_empty() {
        return "none".to_string();
    }
    available
        .iter()
        .map(|(code, name)| format!("{} ({})", name, code))
        .collect::<Vec<_>>()
        .join(", ")
}

impl From<reqwest::Error> for TranscriptError {
    fn from(error: reqwest::Error) -> Self {
        TranscriptError::UpstreamUnknown(error.to_string())
    }
}
