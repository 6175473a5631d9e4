use serde::Serialize;

use crate::error::{Result, TranscriptError};
use crate::video_id::VideoId;

/// One timed caption line. Times are in seconds.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Segment {
    pub text: String,
    pub start: f64,
    pub duration: f64,
}

/// Caption segments for a video, tagged with what they actually are.
///
/// `language_code` is the language of the text, which can differ from the
/// language a caller asked for (and from the cache key it is stored under)
/// when the resolver had to fall back to a translation.
#[derive(Debug, Clone, PartialEq)]
pub struct Transcript {
    pub video_id: VideoId,
    pub language_code: String,
    pub language: String,
    /// Code of the catalog track the segments were fetched from.
    pub source_language_code: String,
    pub is_generated: bool,
    pub translated: bool,
    pub segments: Vec<Segment>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TranslationLanguage {
    pub language: String,
    pub language_code: String,
}

/// A caption track listed by the upstream provider.
#[derive(Debug, Clone, PartialEq)]
pub struct CaptionTrack {
    pub language: String,
    pub language_code: String,
    pub is_generated: bool,
    pub is_translatable: bool,
    /// Transport-specific locator for the track's timed text.
    pub base_url: String,
    pub translation_languages: Vec<TranslationLanguage>,
}

impl CaptionTrack {
    pub fn is_manually_created(&self) -> bool {
        !self.is_generated
    }

    pub fn can_translate_to(&self, target: &str) -> bool {
        self.is_translatable
            && self
                .translation_languages
                .iter()
                .any(|t| t.language_code == target)
    }

    /// Display name of `target` as offered for this track, if any.
    pub fn translation_name(&self, target: &str) -> Option<&str> {
        self.translation_languages
            .iter()
            .find(|t| t.language_code == target)
            .map(|t| t.language.as_str())
    }
}

/// Every caption track available for one video, in upstream listing order.
#[derive(Debug, Clone, PartialEq)]
pub struct TrackCatalog {
    pub video_id: VideoId,
    pub tracks: Vec<CaptionTrack>,
}

impl TrackCatalog {
    /// Human-authored tracks, in listing order.
    pub fn manually_created(&self) -> impl Iterator<Item = &CaptionTrack> {
        self.tracks.iter().filter(|t| t.is_manually_created())
    }

    /// Auto-generated (ASR) tracks, in listing order.
    pub fn generated(&self) -> impl Iterator<Item = &CaptionTrack> {
        self.tracks.iter().filter(|t| t.is_generated)
    }

    pub fn first_manual(&self) -> Option<&CaptionTrack> {
        self.manually_created().next()
    }

    /// Looks up a track for `language_code`, preferring a manual one.
    pub fn find(&self, language_code: &str) -> Result<&CaptionTrack> {
        self.manually_created()
            .find(|t| t.language_code == language_code)
            .or_else(|| self.generated().find(|t| t.language_code == language_code))
            .ok_or_else(|| TranscriptError::LanguageNotFound {
                video_id: self.video_id.to_string(),
                requested: language_code.to_string(),
            })
    }

    /// Looks up the track to translate from and checks that it can reach `target`.
    pub fn translation_source(&self, source: &str, target: &str) -> Result<&CaptionTrack> {
        let track = self.find(source)?;
        if !track.can_translate_to(target) {
            return Err(TranscriptError::TranslationUnavailable {
                video_id: self.video_id.to_string(),
                source_lang: source.to_string(),
                target: target.to_string(),
            });
        }
        Ok(track)
    }

    /// `(code, display name)` for every track, in listing order.
    pub fn describe(&self) -> Vec<(String, String)> {
        self.tracks
            .iter()
            .map(|t| (t.language_code.clone(), t.language.clone()))
            .collect()
    }
}
