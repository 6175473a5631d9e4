//! In-memory transport for tests: a fixed track list, scripted failures per
//! operation, and a record of every call.

use std::collections::{HashMap, VecDeque};

use async_trait::async_trait;
use parking_lot::Mutex;

use super::Transport;
use crate::error::{Result, TranscriptError};
use crate::model::{CaptionTrack, Segment, TrackCatalog, Transcript, TranslationLanguage};
use crate::video_id::VideoId;

pub fn manual(code: &str, name: &str, targets: &[&str]) -> CaptionTrack {
    CaptionTrack {
        language: name.to_string(),
        language_code: code.to_string(),
        is_generated: false,
        is_translatable: !targets.is_empty(),
        base_url: format!("stub://{}", code),
        translation_languages: targets
            .iter()
            .map(|c| TranslationLanguage {
                language: format!("{} language", c),
                language_code: c.to_string(),
            })
            .collect(),
    }
}

pub fn generated(code: &str, name: &str) -> CaptionTrack {
    CaptionTrack {
        language: name.to_string(),
        language_code: code.to_string(),
        is_generated: true,
        is_translatable: false,
        base_url: format!("stub://{}/asr", code),
        translation_languages: Vec::new(),
    }
}

/// The segments the stub serves for a track, optionally translated.
pub fn segments_for(source: &str, target: Option<&str>) -> Vec<Segment> {
    let text = match target {
        Some(target) => format!("{} caption translated to {}", source, target),
        None => format!("{} caption", source),
    };
    vec![
        Segment {
            text,
            start: 0.0,
            duration: 1.5,
        },
        Segment {
            text: "second line".to_string(),
            start: 1.5,
            duration: 2.0,
        },
    ]
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    List,
    Direct,
    Translated,
}

#[derive(Default)]
pub struct StubTransport {
    tracks: Vec<CaptionTrack>,
    list_error: Option<TranscriptError>,
    failures: Mutex<HashMap<Operation, VecDeque<TranscriptError>>>,
    list_calls: Mutex<usize>,
    direct_calls: Mutex<Vec<String>>,
    translated_calls: Mutex<Vec<(String, String)>>,
}

impl StubTransport {
    pub fn new(tracks: Vec<CaptionTrack>) -> Self {
        Self {
            tracks,
            ..Default::default()
        }
    }

    /// Every listing fails with `error`.
    pub fn failing(error: TranscriptError) -> Self {
        Self {
            list_error: Some(error),
            ..Default::default()
        }
    }

    /// The next `times` calls of `operation` fail with `error`, before any
    /// other outcome.
    pub fn fail_next(self, operation: Operation, error: TranscriptError, times: usize) -> Self {
        {
            let mut failures = self.failures.lock();
            let queue = failures.entry(operation).or_default();
            for _ in 0..times {
                queue.push_back(error.clone());
            }
        }
        self
    }

    /// The first `times` listings are rate limited.
    pub fn rate_limited_first(self, times: usize) -> Self {
        self.fail_next(
            Operation::List,
            TranscriptError::RateLimited("PMtlIBtqNJo".to_string()),
            times,
        )
    }

    fn next_failure(&self, operation: Operation) -> Option<TranscriptError> {
        self.failures
            .lock()
            .get_mut(&operation)
            .and_then(VecDeque::pop_front)
    }

    pub fn list_calls(&self) -> usize {
        *self.list_calls.lock()
    }

    pub fn direct_calls(&self) -> Vec<String> {
        self.direct_calls.lock().clone()
    }

    pub fn translated_calls(&self) -> Vec<(String, String)> {
        self.translated_calls.lock().clone()
    }
}

fn transcript(catalog: &TrackCatalog, track: &CaptionTrack, target: Option<&str>) -> Transcript {
    Transcript {
        video_id: catalog.video_id.clone(),
        language_code: target.unwrap_or(&track.language_code).to_string(),
        language: match target {
            Some(target) => track.translation_name(target).unwrap_or(target).to_string(),
            None => track.language.clone(),
        },
        source_language_code: track.language_code.clone(),
        is_generated: track.is_generated,
        translated: target.is_some(),
        segments: segments_for(&track.language_code, target),
    }
}

#[async_trait]
impl Transport for StubTransport {
    async fn list_available(&self, video_id: &VideoId) -> Result<TrackCatalog> {
        *self.list_calls.lock() += 1;
        if let Some(error) = self.next_failure(Operation::List) {
            return Err(error);
        }
        if let Some(error) = &self.list_error {
            return Err(error.clone());
        }
        Ok(TrackCatalog {
            video_id: video_id.clone(),
            tracks: self.tracks.clone(),
        })
    }

    async fn fetch_direct(&self, catalog: &TrackCatalog, language_code: &str) -> Result<Transcript> {
        self.direct_calls.lock().push(language_code.to_string());
        if let Some(error) = self.next_failure(Operation::Direct) {
            return Err(error);
        }
        let track = catalog.find(language_code)?;
        Ok(transcript(catalog, track, None))
    }

    async fn fetch_translated(
        &self,
        catalog: &TrackCatalog,
        source: &str,
        target: &str,
    ) -> Result<Transcript> {
        self.translated_calls
            .lock()
            .push((source.to_string(), target.to_string()));
        if let Some(error) = self.next_failure(Operation::Translated) {
            return Err(error);
        }
        let track = catalog.translation_source(source, target)?;
        Ok(transcript(catalog, track, Some(target)))
    }
}
