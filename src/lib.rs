//! Fetches YouTube caption transcripts, falling back through translations
//! when the requested language has no track of its own.

pub mod cache;
pub mod catalog;
pub mod config;
pub mod error;
pub mod formatter;
pub mod model;
pub mod server;
pub mod transcript;
pub mod upstream;
pub mod video_id;

pub use cache::ResponseCache;
pub use config::Config;
pub use error::{Result, TranscriptError};
pub use model::{Segment, Transcript};
pub use transcript::TranscriptService;
pub use video_id::VideoId;
