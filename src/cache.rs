//! In-process transcript cache with a fixed time-to-live.
//!
//! Entries are keyed by the video and the language the caller *requested*,
//! so a request that needed a translation fallback is answered from the cache
//! next time without walking the fallback chain again. Stale entries are
//! evicted lazily on read. There is no size bound.

use std::collections::HashMap;
use std::time::Duration;

use log::debug;
use parking_lot::RwLock;
use tokio::time::Instant;

use crate::model::Transcript;
use crate::video_id::VideoId;

pub const DEFAULT_TTL: Duration = Duration::from_secs(3600);

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct CacheKey {
    video_id: VideoId,
    requested_language: String,
}

impl CacheKey {
    fn new(video_id: &VideoId, requested_language: &str) -> Self {
        Self {
            video_id: video_id.clone(),
            requested_language: requested_language.to_string(),
        }
    }
}

struct CacheEntry {
    transcript: Transcript,
    created_at: Instant,
}

pub struct ResponseCache {
    entries: RwLock<HashMap<CacheKey, CacheEntry>>,
    ttl: Duration,
}

impl Default for ResponseCache {
    fn default() -> Self {
        Self::new(DEFAULT_TTL)
    }
}

impl ResponseCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Returns the cached transcript unless it is missing or has outlived the TTL.
    pub fn get(&self, video_id: &VideoId, requested_language: &str) -> Option<Transcript> {
        let key = CacheKey::new(video_id, requested_language);
        {
            let entries = self.entries.read();
            match entries.get(&key) {
                Some(entry) if entry.created_at.elapsed() < self.ttl => {
                    debug!("Cache hit for {} ({})", video_id, requested_language);
                    return Some(entry.transcript.clone());
                }
                Some(_) => {}
                None => {
                    debug!("Cache miss for {} ({})", video_id, requested_language);
                    return None;
                }
            }
        }

        // Re-check under the write lock: a fresh put may have landed in between.
        let mut entries = self.entries.write();
        if let Some(entry) = entries.get(&key) {
            if entry.created_at.elapsed() < self.ttl {
                return Some(entry.transcript.clone());
            }
            entries.remove(&key);
            debug!("Evicted stale entry for {} ({})", video_id, requested_language);
        }
        None
    }

    /// Stores `transcript` under the requested language, replacing any previous entry.
    pub fn put(&self, video_id: &VideoId, requested_language: &str, transcript: Transcript) {
        let key = CacheKey::new(video_id, requested_language);
        self.entries.write().insert(
            key,
            CacheEntry {
                transcript,
                created_at: Instant::now(),
            },
        );
        debug!("Cached transcript for {} ({})", video_id, requested_language);
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}
