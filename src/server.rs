//! HTTP routes in front of the transcript service.

use axum::extract::{Path, Query, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use thiserror::Error;

use crate::catalog::Languages;
use crate::error::TranscriptError;
use crate::model::Segment;
use crate::transcript::TranscriptService;
use crate::video_id::VideoId;

/// Video known to carry Thai captions, offered to callers after a failure.
pub const SUGGESTED_VIDEO_ID: &str = "PMtlIBtqNJo";

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error(transparent)]
    Transcript(#[from] TranscriptError),
}

impl ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Transcript(e) => match e {
                TranscriptError::RateLimited(_) => StatusCode::TOO_MANY_REQUESTS,
                TranscriptError::InvalidIdentifier(_)
                | TranscriptError::VideoUnavailable { .. }
                | TranscriptError::TranscriptsDisabled(_)
                | TranscriptError::LanguageNotFound { .. }
                | TranscriptError::TranslationUnavailable { .. }
                | TranscriptError::ResolutionFailed { .. }
                | TranscriptError::UpstreamUnknown(_) => StatusCode::BAD_REQUEST,
            },
        }
    }

    fn suggests_known_video(&self) -> bool {
        match self {
            ApiError::BadRequest(_) => false,
            ApiError::Transcript(e) => match e {
                TranscriptError::VideoUnavailable { .. }
                | TranscriptError::TranscriptsDisabled(_)
                | TranscriptError::LanguageNotFound { .. }
                | TranscriptError::TranslationUnavailable { .. }
                | TranscriptError::ResolutionFailed { .. }
                | TranscriptError::UpstreamUnknown(_) => true,
                TranscriptError::InvalidIdentifier(_) | TranscriptError::RateLimited(_) => false,
            },
        }
    }
}

#[derive(Serialize)]
struct ErrorResponse {
    detail: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let detail = if self.suggests_known_video() {
            format!(
                "{}. Try video ID: '{}' which has Thai captions.",
                self, SUGGESTED_VIDEO_ID
            )
        } else {
            self.to_string()
        };
        log::warn!("Request failed with {}: {}", status, self);

        (status, Json(ErrorResponse { detail })).into_response()
    }
}

#[derive(Clone)]
pub struct AppState {
    pub service: TranscriptService,
    pub default_language: String,
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/transcript/", get(get_transcript))
        .route("/languages/:video_id", get(get_languages))
        .with_state(state)
}

#[derive(Debug, Deserialize)]
pub struct TranscriptQuery {
    pub video_id: Option<String>,
    pub language: Option<String>,
}

async fn get_transcript(
    State(state): State<AppState>,
    Query(query): Query<TranscriptQuery>,
) -> ApiResult<impl IntoResponse> {
    let raw_video_id = query
        .video_id
        .filter(|id| !id.trim().is_empty())
        .ok_or_else(|| ApiError::BadRequest("Query parameter 'video_id' is required".to_string()))?;
    let language = query
        .language
        .map(|lang| lang.trim().to_string())
        .filter(|lang| !lang.is_empty())
        .unwrap_or_else(|| state.default_language.clone());

    let transcript = state.service.fetch(&raw_video_id, &language).await?;
    let segments: Vec<Segment> = transcript.segments;

    Ok((
        [(header::CONTENT_LANGUAGE, transcript.language_code)],
        Json(segments),
    ))
}

#[derive(Serialize)]
struct LanguagesResponse {
    #[serde(flatten)]
    languages: Languages,
    video_id: VideoId,
}

async fn get_languages(
    State(state): State<AppState>,
    Path(raw_video_id): Path<String>,
) -> ApiResult<Json<LanguagesResponse>> {
    let (video_id, languages) = state.service.languages(&raw_video_id).await?;
    Ok(Json(LanguagesResponse {
        languages,
        video_id,
    }))
}

async fn root() -> Json<Value> {
    Json(json!({
        "message": "Welcome to the YouTube transcript service",
        "usage": {
            "get_transcript": "GET /transcript/?video_id=YOUR_VIDEO_ID&language=th",
            "check_languages": "GET /languages/YOUR_VIDEO_ID"
        },
        "example": {
            "transcript": format!("/transcript/?video_id={}&language=th", SUGGESTED_VIDEO_ID),
            "languages": format!("/languages/{}", SUGGESTED_VIDEO_ID)
        },
        "note": "Check available languages first using the /languages endpoint before requesting a specific language transcript."
    }))
}
