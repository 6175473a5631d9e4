use std::sync::Arc;

use log::{debug, info};

use crate::cache::ResponseCache;
use crate::catalog::{list_languages, Languages};
use crate::error::{Result, TranscriptError};
use crate::model::{TrackCatalog, Transcript};
use crate::upstream::{with_retry, RetryPolicy, Transport};
use crate::video_id::VideoId;

/// Source language tried first when the requested one has no track.
pub const DEFAULT_SOURCE_LANGUAGE: &str = "en";

/// Resolves transcripts through the language fallback chain.
#[derive(Clone)]
pub struct TranscriptService {
    transport: Arc<dyn Transport>,
    cache: Arc<ResponseCache>,
    retry: RetryPolicy,
}

impl TranscriptService {
    pub fn new(transport: Arc<dyn Transport>, cache: Arc<ResponseCache>, retry: RetryPolicy) -> Self {
        Self {
            transport,
            cache,
            retry,
        }
    }

    pub fn cache(&self) -> &ResponseCache {
        &self.cache
    }

    /// Parses raw caller input into a video id and resolves its transcript.
    pub async fn fetch(&self, raw_video_id: &str, language: &str) -> Result<Transcript> {
        let video_id = VideoId::parse(raw_video_id)?;
        self.resolve(&video_id, language).await
    }

    /// Parses raw caller input into a video id and lists its caption languages.
    pub async fn languages(&self, raw_video_id: &str) -> Result<(VideoId, Languages)> {
        let video_id = VideoId::parse(raw_video_id)?;
        let languages = list_languages(self.transport.as_ref(), &self.retry, &video_id).await?;
        Ok((video_id, languages))
    }

    /// Returns a transcript in `requested`, trying in order: the cache, a
    /// direct track, a translation of the English track, and a translation of
    /// the first manually created track.
    ///
    /// The result is cached under `requested` even when it came from a
    /// translation; the transcript's own tags say what it actually is.
    pub async fn resolve(&self, video_id: &VideoId, requested: &str) -> Result<Transcript> {
        if let Some(transcript) = self.cache.get(video_id, requested) {
            return Ok(transcript);
        }

        let transport = self.transport.as_ref();
        let catalog = with_retry(&self.retry, "list_available", || {
            transport.list_available(video_id)
        })
        .await?;

        let transcript = self.resolve_from_catalog(&catalog, requested).await?;
        info!(
            "Resolved {} ({}) to '{}' from '{}'{}",
            video_id,
            requested,
            transcript.language_code,
            transcript.source_language_code,
            if transcript.translated { " via translation" } else { "" }
        );
        self.cache.put(video_id, requested, transcript.clone());
        Ok(transcript)
    }

    async fn resolve_from_catalog(&self, catalog: &TrackCatalog, requested: &str) -> Result<Transcript> {
        match self.fetch_direct(catalog, requested).await {
            Ok(transcript) => return Ok(transcript),
            Err(TranscriptError::LanguageNotFound { .. }) => {}
            // Only an exhausted listing answers "too many requests".
            Err(e @ TranscriptError::RateLimited(_)) => {
                return Err(resolution_failed(
                    catalog,
                    requested,
                    format!("direct fetch failed: {}", e),
                ))
            }
            Err(e) => return Err(e),
        }

        match self
            .fetch_translated(catalog, DEFAULT_SOURCE_LANGUAGE, requested)
            .await
        {
            Ok(transcript) => return Ok(transcript),
            Err(e) => debug!(
                "No {} translation of {} via '{}': {}",
                requested, catalog.video_id, DEFAULT_SOURCE_LANGUAGE, e
            ),
        }

        let Some(fallback) = catalog.first_manual() else {
            return Err(resolution_failed(
                catalog,
                requested,
                "no manually created transcript to translate from".to_string(),
            ));
        };

        self.fetch_translated(catalog, &fallback.language_code, requested)
            .await
            .map_err(|e| {
                resolution_failed(
                    catalog,
                    requested,
                    format!("translation from '{}' failed: {}", fallback.language_code, e),
                )
            })
    }

    async fn fetch_direct(&self, catalog: &TrackCatalog, language: &str) -> Result<Transcript> {
        let transport = self.transport.as_ref();
        with_retry(&self.retry, "fetch_direct", || {
            transport.fetch_direct(catalog, language)
        })
        .await
    }

    async fn fetch_translated(
        &self,
        catalog: &TrackCatalog,
        source: &str,
        target: &str,
    ) -> Result<Transcript> {
        let transport = self.transport.as_ref();
        with_retry(&self.retry, "fetch_translated", || {
            transport.fetch_translated(catalog, source, target)
        })
        .await
    }
}

fn resolution_failed(catalog: &TrackCatalog, requested: &str, reason: String) -> TranscriptError {
    TranscriptError::ResolutionFailed {
        video_id: catalog.video_id.to_string(),
        requested: requested.to_string(),
        reason,
        available: catalog.describe(),
    }
}
