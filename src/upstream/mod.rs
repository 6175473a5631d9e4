//! Access to the upstream caption provider.

use async_trait::async_trait;

use crate::error::Result;
use crate::model::{TrackCatalog, Transcript};
use crate::video_id::VideoId;

pub mod retry;
#[cfg(test)]
pub mod stub;
pub mod youtube;

pub use retry::{with_retry, RetryPolicy};
pub use youtube::YoutubeTransport;

/// Listing and fetching of caption tracks.
///
/// Implementations map upstream signals onto the error taxonomy:
/// rate limiting must surface as `RateLimited` so callers can retry it, and
/// anything unrecognized as `UpstreamUnknown`.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Lists the manual and auto-generated tracks for a video.
    async fn list_available(&self, video_id: &VideoId) -> Result<TrackCatalog>;

    /// Fetches the track already in `language_code`.
    ///
    /// Fails with `LanguageNotFound` when the catalog has no such track.
    async fn fetch_direct(&self, catalog: &TrackCatalog, language_code: &str) -> Result<Transcript>;

    /// Fetches an upstream machine translation of the `source` track into `target`.
    ///
    /// Fails with `LanguageNotFound` when there is no `source` track and with
    /// `TranslationUnavailable` when it cannot be translated into `target`.
    async fn fetch_translated(
        &self,
        catalog: &TrackCatalog,
        source: &str,
        target: &str,
    ) -> Result<Transcript>;
}
