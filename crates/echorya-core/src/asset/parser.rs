//! Best-effort decoder for asset payloads embedded in assistant replies.
//!
//! The model is asked to answer generation requests with something that
//! looks like a serialized mapping, but the quoting is not reliable:
//!
//! ```text
//! {'type': 'asset', 'key': 'mp3_urls', 'value': ['https://…/a.mp3'], 'metadata': {'style': 'Lo-Fi'}}
//! ```
//!
//! Decoding runs as a pipeline:
//!
//! 1. reject anything that does not start with the asset marker,
//! 2. [`strict_decode`] the text after normalizing it to JSON,
//! 3. [`lenient_extract`] style and URLs by pattern when strict decoding fails.

use super::payload::{ASSET_TYPE, AssetPayload, MP3_URLS_KEY, UNKNOWN_STYLE};
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

const ASSET_MARKERS: [&str; 2] = ["{'type': 'asset'", r#"{"type": "asset""#];

static PYTHON_LITERAL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b(True|False|None)\b").expect("literal pattern is valid"));

static STYLE_FIELD: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"['"]style['"]\s*:\s*['"]([^'"]+)['"]"#).expect("style pattern is valid")
});

static MP3_URL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"https?://[^\s'",]+\.mp3"#).expect("url pattern is valid"));

/// Why [`strict_decode`] did not produce a payload.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AssetParseError {
    /// The text does not start with the asset marker.
    #[error("text is not an asset payload")]
    NotAnAsset,
    /// The normalized text is not valid JSON.
    #[error("malformed asset payload: {0}")]
    Malformed(String),
    /// Valid JSON, but not an MP3 asset.
    #[error("unexpected asset shape: {0}")]
    WrongShape(String),
}

/// How a piece of text was classified by [`classify`].
#[derive(Debug, Clone, PartialEq)]
pub enum ParseOutcome {
    /// No asset marker; nothing beyond the prefix check ran.
    Rejected,
    /// Decoded as structured data.
    Strict(AssetPayload),
    /// Recovered by pattern extraction.
    Lenient(AssetPayload),
    /// Marker present but no payload could be recovered.
    Unrecognized,
}

impl ParseOutcome {
    pub fn into_payload(self) -> Option<AssetPayload> {
        match self {
            ParseOutcome::Strict(payload) | ParseOutcome::Lenient(payload) => Some(payload),
            ParseOutcome::Rejected | ParseOutcome::Unrecognized => None,
        }
    }
}

/// Returns the asset encoded in `text`, or `None` if the text should be
/// rendered as plain prose. Never fails.
pub fn parse(text: &str) -> Option<AssetPayload> {
    classify(text).into_payload()
}

/// Runs the full pipeline and reports which stage produced the result.
pub fn classify(text: &str) -> ParseOutcome {
    let trimmed = text.trim();
    if !has_asset_marker(trimmed) {
        return ParseOutcome::Rejected;
    }

    match strict_decode(trimmed) {
        Ok(payload) => ParseOutcome::Strict(payload),
        Err(AssetParseError::Malformed(reason)) => {
            debug!(%reason, "strict asset decode failed, trying pattern extraction");
            lenient_extract(trimmed)
                .map(ParseOutcome::Lenient)
                .unwrap_or(ParseOutcome::Unrecognized)
        }
        Err(err) => {
            debug!(error = %err, "asset marker present but payload rejected");
            ParseOutcome::Unrecognized
        }
    }
}

fn has_asset_marker(trimmed: &str) -> bool {
    !trimmed.is_empty() && ASSET_MARKERS.iter().any(|m| trimmed.starts_with(m))
}

/// Normalizes Python-style quoting and literals, then decodes as JSON.
///
/// Succeeds only for `type == "asset"`, `key == "mp3_urls"` and an array
/// `value`. Extra metadata fields are preserved.
pub fn strict_decode(text: &str) -> Result<AssetPayload, AssetParseError> {
    let trimmed = text.trim();
    if !has_asset_marker(trimmed) {
        return Err(AssetParseError::NotAnAsset);
    }

    let quoted = trimmed.replace('\'', "\"");
    let normalized = PYTHON_LITERAL.replace_all(&quoted, json_literal);

    let value: Value = serde_json::from_str(&normalized)
        .map_err(|err| AssetParseError::Malformed(err.to_string()))?;

    if value.get("type").and_then(Value::as_str) != Some(ASSET_TYPE) {
        return Err(wrong_shape("type is not \"asset\""));
    }
    if value.get("key").and_then(Value::as_str) != Some(MP3_URLS_KEY) {
        return Err(wrong_shape("key is not \"mp3_urls\""));
    }
    if !value.get("value").is_some_and(Value::is_array) {
        return Err(wrong_shape("value is not a list"));
    }

    serde_json::from_value(value).map_err(|err| wrong_shape(&err.to_string()))
}

/// Maps a captured Python literal to its JSON spelling.
fn json_literal(caps: &regex::Captures<'_>) -> &'static str {
    match &caps[1] {
        "True" => "true",
        "False" => "false",
        _ => "null",
    }
}

fn wrong_shape(reason: &str) -> AssetParseError {
    AssetParseError::WrongShape(reason.to_string())
}

/// Recovers a payload by pattern: a `style` field and every `.mp3` URL.
///
/// Returns `None` when no URL is found. Metadata other than `style` is not
/// recovered.
pub fn lenient_extract(text: &str) -> Option<AssetPayload> {
    let urls: Vec<String> = MP3_URL
        .find_iter(text)
        .map(|m| m.as_str().to_string())
        .collect();
    if urls.is_empty() {
        return None;
    }

    let style = STYLE_FIELD
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
        .unwrap_or(UNKNOWN_STYLE);

    Some(AssetPayload::mp3(urls, style))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strict_payload() {
        let text = "{'type': 'asset', 'key': 'mp3_urls', 'value': ['http://x/a.mp3'], 'metadata': {'style': 'Lo-Fi'}}";
        let outcome = classify(text);
        let expected = AssetPayload::mp3(vec!["http://x/a.mp3".to_string()], "Lo-Fi");
        assert_eq!(outcome, ParseOutcome::Strict(expected));
    }

    #[test]
    fn test_strict_preserves_extra_metadata() {
        let text = "{'type': 'asset', 'key': 'mp3_urls', 'value': ['http://x/a.mp3'], \
                    'metadata': {'style': 'Synthwave', 'bpm': 128, 'loop': True, 'key_sig': None}}";
        let payload = parse(text).unwrap();
        assert_eq!(payload.metadata.style.as_deref(), Some("Synthwave"));
        assert_eq!(payload.metadata.extra["bpm"], 128);
        assert_eq!(payload.metadata.extra["loop"], true);
        assert!(payload.metadata.extra["key_sig"].is_null());
    }

    #[test]
    fn test_strict_without_metadata() {
        let text = "{'type': 'asset', 'key': 'mp3_urls', 'value': ['http://x/a.mp3', 'http://x/b.mp3']}";
        let payload = parse(text).unwrap();
        assert_eq!(payload.value.len(), 2);
        assert_eq!(payload.metadata.style, None);
        assert_eq!(payload.display_style(), "Generated Audio");
    }

    #[test]
    fn test_strict_accepts_null_metadata() {
        let text = "{'type': 'asset', 'key': 'mp3_urls', 'value': ['http://x/a.mp3'], 'metadata': None}";
        let ParseOutcome::Strict(payload) = classify(text) else {
            panic!("expected a strict decode");
        };
        assert_eq!(payload.metadata.style, None);
        assert!(payload.metadata.extra.is_empty());
        assert_eq!(payload.display_style(), "Generated Audio");
    }

    #[test]
    fn test_strict_keeps_non_string_style() {
        let text = "{'type': 'asset', 'key': 'mp3_urls', 'value': ['http://x/a.mp3'], 'metadata': {'style': 808}}";
        let ParseOutcome::Strict(payload) = classify(text) else {
            panic!("expected a strict decode");
        };
        assert_eq!(payload.metadata.style, None);
        assert_eq!(payload.metadata.extra["style"], 808);
    }

    #[test]
    fn test_strict_skips_non_string_urls() {
        let text = "{'type': 'asset', 'key': 'mp3_urls', 'value': ['http://x/a.mp3', None], 'metadata': {'style': 'Dub'}}";
        let ParseOutcome::Strict(payload) = classify(text) else {
            panic!("expected a strict decode");
        };
        assert_eq!(payload.value, vec!["http://x/a.mp3"]);
        assert_eq!(payload.display_style(), "Dub");
    }

    #[test]
    fn test_double_quoted_marker_is_accepted() {
        let text = r#"{"type": "asset", "key": "mp3_urls", "value": ["https://x/a.mp3"], "metadata": {"style": "Jazz"}}"#;
        assert!(matches!(classify(text), ParseOutcome::Strict(_)));
    }

    #[test]
    fn test_leading_whitespace_is_trimmed() {
        let text = "\n  {'type': 'asset', 'key': 'mp3_urls', 'value': ['http://x/a.mp3']}  ";
        assert!(parse(text).is_some());
    }

    #[test]
    fn test_fallback_on_embedded_apostrophe() {
        let text = "{'type': 'asset', 'value': 'Custom Style w/ apostrophe's', urls: http://x/b.mp3 http://x/c.mp3}";
        match classify(text) {
            ParseOutcome::Lenient(payload) => {
                assert_eq!(payload.value, vec!["http://x/b.mp3", "http://x/c.mp3"]);
                assert_eq!(payload.metadata.style.as_deref(), Some("Unknown"));
                assert_eq!(payload.kind, "asset");
                assert_eq!(payload.key, "mp3_urls");
            }
            other => panic!("expected lenient outcome, got {other:?}"),
        }
    }

    #[test]
    fn test_fallback_recovers_style() {
        let text = "{'type': 'asset', 'key': 'mp3_urls', 'value': ['https://cdn.x/rock'n'roll.mp3', \
                    'https://cdn.x/b.mp3'], 'metadata': {'style': 'Rock', 'mood': 'loud'}}";
        match classify(text) {
            ParseOutcome::Lenient(payload) => {
                assert_eq!(payload.metadata.style.as_deref(), Some("Rock"));
                assert!(payload.metadata.extra.is_empty());
                assert!(payload.value.contains(&"https://cdn.x/b.mp3".to_string()));
            }
            other => panic!("expected lenient outcome, got {other:?}"),
        }
    }

    #[test]
    fn test_fallback_without_urls_is_none() {
        let text = "{'type': 'asset', 'value': 'it's broken', no links here}";
        assert_eq!(classify(text), ParseOutcome::Unrecognized);
        assert_eq!(parse(text), None);
    }

    #[test]
    fn test_plain_prose_is_rejected_before_any_decoding() {
        let text = "Here are two tracks: http://x/a.mp3 and http://x/b.mp3";
        assert_eq!(classify(text), ParseOutcome::Rejected);
        assert_eq!(strict_decode(text), Err(AssetParseError::NotAnAsset));
    }

    #[test]
    fn test_empty_text_is_rejected() {
        assert_eq!(classify(""), ParseOutcome::Rejected);
        assert_eq!(classify("   "), ParseOutcome::Rejected);
    }

    #[test]
    fn test_wrong_key_does_not_fall_back() {
        let text = "{'type': 'asset', 'key': 'wav_urls', 'value': ['http://x/a.mp3']}";
        assert!(matches!(
            strict_decode(text),
            Err(AssetParseError::WrongShape(_))
        ));
        assert_eq!(classify(text), ParseOutcome::Unrecognized);
    }

    #[test]
    fn test_non_list_value_is_rejected() {
        let text = "{'type': 'asset', 'key': 'mp3_urls', 'value': 'http://x/a.mp3'}";
        assert_eq!(parse(text), None);
    }

    #[test]
    fn test_literal_words_inside_text_are_untouched() {
        let text = "{'type': 'asset', 'key': 'mp3_urls', 'value': ['http://x/a.mp3'], 'metadata': {'style': 'Nonesuch Truest'}}";
        let payload = parse(text).unwrap();
        assert_eq!(payload.metadata.style.as_deref(), Some("Nonesuch Truest"));
    }
}
