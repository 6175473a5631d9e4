use serde::Serialize;

use crate::error::Result;
use crate::model::{CaptionTrack, TranslationLanguage};
use crate::upstream::{with_retry, RetryPolicy, Transport};
use crate::video_id::VideoId;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LanguageEntry {
    pub language: String,
    pub code: String,
}

impl From<&CaptionTrack> for LanguageEntry {
    fn from(track: &CaptionTrack) -> Self {
        Self {
            language: track.language.clone(),
            code: track.language_code.clone(),
        }
    }
}

/// Languages a video offers, split the way callers choose a request language.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Languages {
    pub manual: Vec<LanguageEntry>,
    pub generated: Vec<LanguageEntry>,
    /// Translation targets of the first manually created track.
    pub translatable: Vec<TranslationLanguage>,
}

/// Lists the caption languages of a video straight from upstream (never cached).
pub async fn list_languages(
    transport: &dyn Transport,
    retry: &RetryPolicy,
    video_id: &VideoId,
) -> Result<Languages> {
    let catalog = with_retry(retry, "list_available", || transport.list_available(video_id)).await?;

    Ok(Languages {
        manual: catalog.manually_created().map(LanguageEntry::from).collect(),
        generated: catalog.generated().map(LanguageEntry::from).collect(),
        translatable: catalog
            .first_manual()
            .map(|track| track.translation_languages.clone())
            .unwrap_or_default(),
    })
}
