use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// Value of the `type` field of an asset payload.
pub const ASSET_TYPE: &str = "asset";
/// Value of the `key` field of an asset payload carrying MP3 links.
pub const MP3_URLS_KEY: &str = "mp3_urls";
/// Style recorded when the lenient extractor finds no style field.
pub const UNKNOWN_STYLE: &str = "Unknown";
/// Style shown for a payload that carries no style at all.
pub const DEFAULT_DISPLAY_STYLE: &str = "Generated Audio";

/// A playable asset recovered from an assistant reply.
///
/// Derived on demand from message text; never stored on its own.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetPayload {
    #[serde(rename = "type")]
    pub kind: String,
    pub key: String,
    /// Track URLs in playback order. Non-string entries are skipped.
    #[serde(deserialize_with = "string_items")]
    pub value: Vec<String>,
    #[serde(default)]
    pub metadata: AssetMetadata,
}

/// Descriptive metadata attached to an [`AssetPayload`].
///
/// Only a string `style` is interpreted. Any other fields decoded from a
/// well-formed payload, including a non-string `style`, are kept verbatim
/// in `extra`. A `null` metadata object decodes as empty.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(from = "Option<Map<String, Value>>")]
pub struct AssetMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl From<Option<Map<String, Value>>> for AssetMetadata {
    fn from(fields: Option<Map<String, Value>>) -> Self {
        let mut extra = fields.unwrap_or_default();
        let style = match extra.remove("style") {
            Some(Value::String(style)) => Some(style),
            Some(other) => {
                extra.insert("style".to_string(), other);
                None
            }
            None => None,
        };
        Self { style, extra }
    }
}

fn string_items<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let items = Vec::<Value>::deserialize(deserializer)?;
    Ok(items
        .into_iter()
        .filter_map(|item| match item {
            Value::String(url) => Some(url),
            _ => None,
        })
        .collect())
}

/// One entry of a payload's track list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Track<'a> {
    pub url: &'a str,
    /// Last path segment of the URL
    pub name: &'a str,
}

impl AssetPayload {
    /// Builds an MP3 payload with only a style recorded.
    pub fn mp3(urls: Vec<String>, style: impl Into<String>) -> Self {
        Self {
            kind: ASSET_TYPE.to_string(),
            key: MP3_URLS_KEY.to_string(),
            value: urls,
            metadata: AssetMetadata {
                style: Some(style.into()),
                extra: Map::new(),
            },
        }
    }

    /// Style label for display, falling back to "Generated Audio".
    pub fn display_style(&self) -> &str {
        self.metadata
            .style
            .as_deref()
            .unwrap_or(DEFAULT_DISPLAY_STYLE)
    }

    pub fn tracks(&self) -> impl Iterator<Item = Track<'_>> {
        self.value.iter().map(|url| Track {
            url: url.as_str(),
            name: track_name(url),
        })
    }
}

fn track_name(url: &str) -> &str {
    let path = url.split(['?', '#']).next().unwrap_or(url);
    path.rsplit('/')
        .find(|segment| !segment.is_empty())
        .unwrap_or(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_style_falls_back() {
        let mut payload = AssetPayload::mp3(vec!["http://x/a.mp3".into()], "Lo-Fi");
        assert_eq!(payload.display_style(), "Lo-Fi");
        payload.metadata.style = None;
        assert_eq!(payload.display_style(), DEFAULT_DISPLAY_STYLE);
    }

    #[test]
    fn test_track_names_use_last_segment() {
        let payload = AssetPayload::mp3(
            vec![
                "https://cdn.example.com/gen/track_01.mp3".into(),
                "https://cdn.example.com/gen/track_02.mp3?sig=abc".into(),
            ],
            "Ambient",
        );
        let names: Vec<&str> = payload.tracks().map(|t| t.name).collect();
        assert_eq!(names, vec!["track_01.mp3", "track_02.mp3"]);
    }

    #[test]
    fn test_metadata_keeps_non_string_style_opaque() {
        let payload: AssetPayload = serde_json::from_value(serde_json::json!({
            "type": "asset",
            "key": "mp3_urls",
            "value": ["http://x/a.mp3", null, 7],
            "metadata": {"style": 808, "bpm": 90}
        }))
        .unwrap();
        assert_eq!(payload.value, vec!["http://x/a.mp3"]);
        assert_eq!(payload.metadata.style, None);
        assert_eq!(payload.metadata.extra["style"], 808);
        assert_eq!(payload.metadata.extra["bpm"], 90);
        assert_eq!(payload.display_style(), DEFAULT_DISPLAY_STYLE);
    }

    #[test]
    fn test_serializes_type_field() {
        let payload = AssetPayload::mp3(vec!["http://x/a.mp3".into()], "Lo-Fi");
        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json["type"], "asset");
        assert_eq!(json["key"], "mp3_urls");
        assert_eq!(json["metadata"]["style"], "Lo-Fi");
    }
}
