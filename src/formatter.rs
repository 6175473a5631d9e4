use html_escape::decode_html_entities;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::model::Segment;

static TEXT_ELEMENT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)<text\b([^>]*?)(?:/>|>(.*?)</text>)").expect("valid regex"));
static ATTRIBUTE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"([A-Za-z_:][-A-Za-z0-9_:.]*)="([^"]*)""#).expect("valid regex"));
static MARKUP: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]*>").expect("valid regex"));

/// Parses an upstream timed-text document into chronological segments.
pub fn parse_timed_text(xml: &str) -> Result<Vec<Segment>, &'static str> {
    if !xml.contains("<transcript") {
        return Err("response is not a timed text document");
    }

    let mut segments = Vec::new();
    for element in TEXT_ELEMENT.captures_iter(xml) {
        // Self-closing and empty elements carry no caption text.
        let body = match element.get(2) {
            Some(body) if !body.as_str().is_empty() => body.as_str(),
            _ => continue,
        };

        let mut start = None;
        let mut duration = 0.0;
        for attr in ATTRIBUTE.captures_iter(&element[1]) {
            match &attr[1] {
                "start" => start = attr[2].parse::<f64>().ok(),
                "dur" => duration = attr[2].parse::<f64>().unwrap_or(0.0),
                _ => {}
            }
        }
        let start = start.ok_or("caption line without a valid start time")?;

        segments.push(Segment {
            text: clean_caption_text(body),
            start,
            duration,
        });
    }

    Ok(segments)
}

/// Decodes entities (upstream double-encodes some of them) and drops inline markup.
pub fn clean_caption_text(raw: &str) -> String {
    let decoded = decode_html_entities(raw).replace("&#39;", "'");
    let without_markup = MARKUP.replace_all(&decoded, "");
    decode_html_entities(&without_markup).trim().to_string()
}
