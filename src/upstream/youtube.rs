use std::sync::Arc;

use async_trait::async_trait;
use log::{debug, info, warn};
use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::cookie::Jar;
use reqwest::{header, Client, Response, StatusCode, Url};
use serde_json::{json, Value};

use super::Transport;
use crate::error::{Result, TranscriptError};
use crate::formatter::parse_timed_text;
use crate::model::{CaptionTrack, TrackCatalog, Transcript, TranslationLanguage};
use crate::video_id::VideoId;

pub const YOUTUBE_BASE_URL: &str = "https://www.youtube.com";

const INNERTUBE_CLIENT_NAME: &str = "ANDROID";
const INNERTUBE_CLIENT_VERSION: &str = "20.10.38";

const CONSENT_FORM_MARKER: &str = "action=\"https://consent.youtube.com/s\"";

static INNERTUBE_API_KEY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#""INNERTUBE_API_KEY":\s*"([a-zA-Z0-9_-]+)""#).expect("valid regex"));
static CONSENT_VALUE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"name="v" value="(.*?)""#).expect("valid regex"));

/// Transport backed by YouTube's watch page and InnerTube player API.
pub struct YoutubeTransport {
    client: Client,
    cookies: Arc<Jar>,
    base_url: String,
}

impl YoutubeTransport {
    pub fn new() -> Result<Self> {
        Self::with_base_url(YOUTUBE_BASE_URL)
    }

    /// Points the transport at another host, e.g. a local mock server.
    pub fn with_base_url(base_url: impl Into<String>) -> Result<Self> {
        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::ACCEPT_LANGUAGE,
            header::HeaderValue::from_static("en-US"),
        );
        let cookies = Arc::new(Jar::default());
        let client = Client::builder()
            .cookie_provider(cookies.clone())
            .default_headers(headers)
            .build()?;

        Ok(Self {
            client,
            cookies,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    async fn fetch_watch_page(&self, video_id: &VideoId) -> Result<String> {
        let url = format!("{}/watch?v={}", self.base_url, video_id);
        let mut html = self.get_watch_html(&url, video_id).await?;

        if html.contains(CONSENT_FORM_MARKER) {
            self.accept_consent(&html, video_id)?;
            html = self.get_watch_html(&url, video_id).await?;
            if html.contains(CONSENT_FORM_MARKER) {
                return Err(TranscriptError::UpstreamUnknown(format!(
                    "consent page for video {} persists after accepting it",
                    video_id
                )));
            }
        }

        if html.contains("class=\"g-recaptcha\"") {
            return Err(TranscriptError::RateLimited(video_id.to_string()));
        }
        Ok(html)
    }

    async fn get_watch_html(&self, url: &str, video_id: &VideoId) -> Result<String> {
        let response = self.client.get(url).send().await?;
        Ok(check_status(response, video_id)?.text().await?)
    }

    /// Stores the `CONSENT` cookie the EU consent interstitial asks for.
    fn accept_consent(&self, html: &str, video_id: &VideoId) -> Result<()> {
        let value = CONSENT_VALUE
            .captures(html)
            .map(|caps| caps[1].to_string())
            .ok_or_else(|| {
                TranscriptError::UpstreamUnknown(format!(
                    "unreadable consent page for video {}",
                    video_id
                ))
            })?;
        let url = Url::parse(&self.base_url).map_err(|e| {
            TranscriptError::UpstreamUnknown(format!("invalid base URL {}: {}", self.base_url, e))
        })?;

        warn!("Accepting the consent interstitial for {}", video_id);
        self.cookies
            .add_cookie_str(&format!("CONSENT=YES+{}; Path=/", value), &url);
        Ok(())
    }

    async fn fetch_player_data(&self, video_id: &VideoId, api_key: &str) -> Result<Value> {
        let url = format!("{}/youtubei/v1/player?key={}", self.base_url, api_key);
        let body = json!({
            "context": {
                "client": {
                    "clientName": INNERTUBE_CLIENT_NAME,
                    "clientVersion": INNERTUBE_CLIENT_VERSION
                }
            },
            "videoId": video_id.as_str()
        });

        let response = self.client.post(&url).json(&body).send().await?;
        let data = check_status(response, video_id)?.json::<Value>().await?;
        Ok(data)
    }

    async fn fetch_track(
        &self,
        catalog: &TrackCatalog,
        track: &CaptionTrack,
        translate_to: Option<&str>,
    ) -> Result<Transcript> {
        let mut url = track.base_url.clone();
        if let Some(target) = translate_to {
            url.push_str("&tlang=");
            url.push_str(target);
        }
        if url.contains("&exp=xpe") {
            return Err(TranscriptError::UpstreamUnknown(format!(
                "track '{}' of video {} requires a proof-of-origin token",
                track.language_code, catalog.video_id
            )));
        }

        debug!("Fetching timed text for {} from {}", catalog.video_id, url);
        let response = self.client.get(&url).send().await?;
        let xml = check_status(response, &catalog.video_id)?.text().await?;
        let segments = parse_timed_text(&xml).map_err(|e| {
            TranscriptError::UpstreamUnknown(format!(
                "unreadable timed text for video {}: {}",
                catalog.video_id, e
            ))
        })?;

        let (language_code, language) = match translate_to {
            Some(target) => (
                target.to_string(),
                track.translation_name(target).unwrap_or(target).to_string(),
            ),
            None => (track.language_code.clone(), track.language.clone()),
        };

        Ok(Transcript {
            video_id: catalog.video_id.clone(),
            language_code,
            language,
            source_language_code: track.language_code.clone(),
            is_generated: track.is_generated,
            translated: translate_to.is_some(),
            segments,
        })
    }
}

#[async_trait]
impl Transport for YoutubeTransport {
    async fn list_available(&self, video_id: &VideoId) -> Result<TrackCatalog> {
        let html = self.fetch_watch_page(video_id).await?;
        let api_key = INNERTUBE_API_KEY
            .captures(&html)
            .map(|caps| caps[1].to_string())
            .ok_or_else(|| {
                TranscriptError::UpstreamUnknown(format!(
                    "no InnerTube API key on the watch page of {}",
                    video_id
                ))
            })?;

        let data = self.fetch_player_data(video_id, &api_key).await?;
        let catalog = parse_catalog(video_id, &data)?;
        info!(
            "Listed {} caption tracks for {}",
            catalog.tracks.len(),
            video_id
        );
        Ok(catalog)
    }

    async fn fetch_direct(&self, catalog: &TrackCatalog, language_code: &str) -> Result<Transcript> {
        let track = catalog.find(language_code)?;
        self.fetch_track(catalog, track, None).await
    }

    async fn fetch_translated(
        &self,
        catalog: &TrackCatalog,
        source: &str,
        target: &str,
    ) -> Result<Transcript> {
        let track = catalog.translation_source(source, target)?;
        self.fetch_track(catalog, track, Some(target)).await
    }
}

fn check_status(response: Response, video_id: &VideoId) -> Result<Response> {
    let status = response.status();
    if status == StatusCode::TOO_MANY_REQUESTS {
        return Err(TranscriptError::RateLimited(video_id.to_string()));
    }
    if !status.is_success() {
        return Err(TranscriptError::UpstreamUnknown(format!(
            "HTTP {} while fetching video {}",
            status, video_id
        )));
    }
    Ok(response)
}

fn check_playability(video_id: &VideoId, data: &Value) -> Result<()> {
    let Some(playability) = data.get("playabilityStatus") else {
        return Ok(());
    };
    let status = playability.get("status").and_then(Value::as_str).unwrap_or("OK");
    if status == "OK" {
        return Ok(());
    }
    let reason = playability
        .get("reason")
        .and_then(Value::as_str)
        .unwrap_or("")
        .to_string();

    if status == "LOGIN_REQUIRED" && reason.contains("not a bot") {
        return Err(TranscriptError::RateLimited(video_id.to_string()));
    }

    let reason = if reason.is_empty() {
        format!("playability status {}", status)
    } else {
        reason
    };
    Err(TranscriptError::VideoUnavailable {
        video_id: video_id.to_string(),
        reason,
    })
}

/// First `runs[].text` of an InnerTube text object, or its `simpleText`.
fn text_of(value: Option<&Value>) -> Option<String> {
    let value = value?;
    value
        .get("runs")
        .and_then(Value::as_array)
        .and_then(|runs| runs.first())
        .and_then(|run| run.get("text"))
        .or_else(|| value.get("simpleText"))
        .and_then(Value::as_str)
        .map(str::to_string)
}

fn parse_catalog(video_id: &VideoId, data: &Value) -> Result<TrackCatalog> {
    check_playability(video_id, data)?;

    let renderer = data
        .get("captions")
        .and_then(|c| c.get("playerCaptionsTracklistRenderer"))
        .ok_or_else(|| TranscriptError::TranscriptsDisabled(video_id.to_string()))?;

    let translation_languages: Vec<TranslationLanguage> = renderer
        .get("translationLanguages")
        .and_then(Value::as_array)
        .map(|languages| {
            languages
                .iter()
                .filter_map(|lang| {
                    Some(TranslationLanguage {
                        language_code: lang.get("languageCode")?.as_str()?.to_string(),
                        language: text_of(lang.get("languageName"))?,
                    })
                })
                .collect()
        })
        .unwrap_or_default();

    let tracks: Vec<CaptionTrack> = renderer
        .get("captionTracks")
        .and_then(Value::as_array)
        .map(|tracks| {
            tracks
                .iter()
                .filter_map(|track| {
                    let language_code = track.get("languageCode")?.as_str()?.to_string();
                    let base_url = track.get("baseUrl")?.as_str()?.replace("&fmt=srv3", "");
                    let language =
                        text_of(track.get("name")).unwrap_or_else(|| language_code.clone());
                    let is_generated = track.get("kind").and_then(Value::as_str) == Some("asr");
                    let is_translatable = track
                        .get("isTranslatable")
                        .and_then(Value::as_bool)
                        .unwrap_or(false);

                    Some(CaptionTrack {
                        language,
                        language_code,
                        is_generated,
                        is_translatable,
                        base_url,
                        translation_languages: if is_translatable {
                            translation_languages.clone()
                        } else {
                            Vec::new()
                        },
                    })
                })
                .collect()
        })
        .unwrap_or_default();

    if tracks.is_empty() {
        return Err(TranscriptError::TranscriptsDisabled(video_id.to_string()));
    }

    Ok(TrackCatalog {
        video_id: video_id.clone(),
        tracks,
    })
}
