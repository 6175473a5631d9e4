use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

use crate::error::{Result, TranscriptError};

const VIDEO_ID_LEN: usize = 11;

static QUERY_PARAM_ID: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?:^|[?&])v=([0-9A-Za-z_-]{11})(?:[^0-9A-Za-z_-]|$)").expect("valid regex")
});

static PATH_SEGMENT_ID: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"/([0-9A-Za-z_-]{11})(?:[?#&/]|$)").expect("valid regex")
});

/// A validated 11-character YouTube video identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct VideoId(String);

impl VideoId {
    /// Normalizes raw caller input and validates the result.
    pub fn parse(raw: &str) -> Result<Self> {
        let candidate = normalize(raw);
        if validate(&candidate) {
            Ok(VideoId(candidate))
        } else {
            Err(TranscriptError::InvalidIdentifier(raw.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for VideoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for VideoId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Extracts a video id from a bare id or a watch/short/embed URL.
///
/// A trailing `&t=...` timestamp is dropped first. Input that contains
/// neither a `v=<id>` parameter nor a `/<id>` path segment is returned as-is,
/// so validation decides whether it was usable.
pub fn normalize(raw: &str) -> String {
    let mut input = raw.trim();
    if let Some(pos) = input.find("&t=") {
        input = &input[..pos];
    }

    if let Some(caps) = QUERY_PARAM_ID.captures(input) {
        return caps[1].to_string();
    }
    if let Some(caps) = PATH_SEGMENT_ID.captures(input) {
        return caps[1].to_string();
    }
    input.to_string()
}

pub fn validate(candidate: &str) -> bool {
    candidate.len() == VIDEO_ID_LEN
        && candidate
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}
