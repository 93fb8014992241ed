//! JSON document the templates are exported to and imported from.
//!
//! ```json
//! { "templates": { "0 <id>": { "name": "...", "anchor": [tx, ty, px, py],
//!   "scaleFactor": 3, "enabled": true,
//!   "palette": { "0,0,0": { "count": 12, "enabled": true } },
//!   "sourceImageDataURL": "data:image/png;base64,..." } } }
//! ```
//!
//! The numeric prefix of each storage key records insertion order, since the
//! object itself is unordered.

use base64::{Engine, engine::general_purpose::STANDARD};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use domain::{
    color::ColorKey,
    coords::Anchor,
    template::{ColorPalette, ColorStat, TemplateId, TemplateWarning},
};

use crate::error::{AppError, AppResult};

pub const PNG_DATA_URL_PREFIX: &str = "data:image/png;base64,";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TemplatesDocument {
    #[serde(default)]
    pub templates: BTreeMap<String, StoredTemplate>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredTemplate {
    pub name: String,
    pub anchor: Anchor,
    #[serde(default)]
    pub scale_factor: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    /// Kept as raw strings so unknown keys can be reported instead of failing the import.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub palette: Option<BTreeMap<String, ColorStat>>,
    #[serde(
        default,
        rename = "sourceImageDataURL",
        skip_serializing_if = "Option::is_none"
    )]
    pub source_image_data_url: Option<String>,
}

impl TemplatesDocument {
    pub fn parse(json: &str) -> AppResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> AppResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn push(&mut self, id: TemplateId, stored: StoredTemplate) {
        let key = storage_key(self.templates.len(), id);
        self.templates.insert(key, stored);
    }

    /// Entries in the order they were added.
    #[must_use]
    pub fn into_ordered(self) -> Vec<StoredTemplate> {
        let mut entries: Vec<(String, StoredTemplate)> = self.templates.into_iter().collect();
        entries.sort_by(|(a, _), (b, _)| insertion_rank(a).cmp(&insertion_rank(b)).then(a.cmp(b)));
        entries.into_iter().map(|(_, stored)| stored).collect()
    }
}

#[must_use]
pub fn storage_key(index: usize, id: TemplateId) -> String {
    format!("{index} {id}")
}

/// Keys without a numeric prefix sort after every ordered key.
fn insertion_rank(key: &str) -> u64 {
    key.split_once(' ')
        .and_then(|(rank, _)| rank.parse::<u64>().ok())
        .unwrap_or(u64::MAX)
}

#[must_use]
pub fn encode_data_url(png: &[u8]) -> String {
    format!("{PNG_DATA_URL_PREFIX}{}", STANDARD.encode(png))
}

/// Accepts any base64 data URL; the codec sniffs the actual format.
pub fn decode_data_url(url: &str) -> AppResult<Vec<u8>> {
    let payload = url
        .strip_prefix("data:")
        .and_then(|rest| rest.split_once(";base64,"))
        .map(|(_, payload)| payload)
        .ok_or_else(|| AppError::CodecError {
            message: "Source image is not a base64 data URL".to_string(),
        })?;

    STANDARD
        .decode(payload.trim())
        .map_err(|e| AppError::CodecError {
            message: format!("Invalid base64 in source image data URL: {e}"),
        })
}

#[must_use]
pub fn palette_to_stored(palette: &ColorPalette) -> BTreeMap<String, ColorStat> {
    palette
        .iter()
        .map(|(key, stat)| (key.to_string(), *stat))
        .collect()
}

/// Unparseable keys are dropped and reported.
#[must_use]
pub fn palette_from_stored(
    stored: &BTreeMap<String, ColorStat>,
) -> (ColorPalette, Vec<TemplateWarning>) {
    let mut palette = ColorPalette::new();
    let mut warnings = Vec::new();

    for (raw_key, stat) in stored {
        match raw_key.parse::<ColorKey>() {
            Ok(key) => palette.insert(key, *stat),
            Err(e) => warnings.push(TemplateWarning::CorruptedState {
                detail: format!("dropped palette entry '{raw_key}': {e}"),
            }),
        }
    }

    (palette, warnings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain::color::RgbColor;

    fn stored(name: &str) -> StoredTemplate {
        StoredTemplate {
            name: name.to_string(),
            anchor: Anchor::new(1, 2, 3, 4),
            scale_factor: Some(3),
            enabled: Some(true),
            palette: None,
            source_image_data_url: None,
        }
    }

    #[test]
    fn insertion_order_survives_key_sorting() {
        let mut document = TemplatesDocument::default();
        for i in 0..12 {
            let name = format!("t{i}");
            let id = TemplateId::derive(&name, &Anchor::new(0, 0, 0, 0));
            document.push(id, stored(&name));
        }

        let json = document.to_json().unwrap();
        let names: Vec<String> = TemplatesDocument::parse(&json)
            .unwrap()
            .into_ordered()
            .into_iter()
            .map(|t| t.name)
            .collect();
        let expected: Vec<String> = (0..12).map(|i| format!("t{i}")).collect();
        assert_eq!(names, expected);
    }

    #[test]
    fn optional_fields_may_be_missing() {
        let json = r#"{"templates":{"0 x":{"name":"bare","anchor":[5,6,7,8]}}}"#;
        let mut ordered = TemplatesDocument::parse(json).unwrap().into_ordered();
        let bare = ordered.pop().unwrap();
        assert_eq!(bare.anchor, Anchor::new(5, 6, 7, 8));
        assert!(bare.scale_factor.is_none());
        assert!(bare.palette.is_none());
        assert!(bare.source_image_data_url.is_none());

        assert!(TemplatesDocument::parse("{}").unwrap().templates.is_empty());
    }

    #[test]
    fn palette_entries_may_miss_fields() {
        let json = r#"{"templates":{"0 x":{"name":"p","anchor":[0,0,0,0],
            "palette":{"0,0,0":{"count":3},"237,28,36":{"enabled":false},"64,147,228":{}}}}}"#;
        let stored = TemplatesDocument::parse(json)
            .unwrap()
            .into_ordered()
            .pop()
            .unwrap()
            .palette
            .unwrap();

        let (palette, warnings) = palette_from_stored(&stored);
        assert!(warnings.is_empty());
        let black = palette.get(&ColorKey::Rgb(RgbColor::new(0, 0, 0))).unwrap();
        assert_eq!((black.count, black.enabled), (3, true));
        let red = palette.get(&ColorKey::Rgb(RgbColor::new(237, 28, 36))).unwrap();
        assert_eq!((red.count, red.enabled), (0, false));
        let blue = palette.get(&ColorKey::Rgb(RgbColor::new(64, 147, 228))).unwrap();
        assert_eq!((blue.count, blue.enabled), (0, true));
    }

    #[test]
    fn uses_camel_case_field_names() {
        let mut with_url = stored("named");
        with_url.source_image_data_url = Some(encode_data_url(&[1, 2, 3]));
        let json = serde_json::to_string(&with_url).unwrap();
        assert!(json.contains("\"scaleFactor\":3"));
        assert!(json.contains("\"sourceImageDataURL\":\"data:image/png;base64,AQID\""));
    }

    #[test]
    fn data_url_round_trip() {
        let url = encode_data_url(&[0, 255, 7]);
        assert_eq!(decode_data_url(&url).unwrap(), vec![0, 255, 7]);
        assert!(decode_data_url("https://example.com/a.png").is_err());
        assert!(decode_data_url("data:image/png;base64,@@@").is_err());
    }

    #[test]
    fn unknown_palette_keys_are_reported() {
        let mut stored = BTreeMap::new();
        stored.insert(
            "0,0,0".to_string(),
            ColorStat {
                count: 4,
                enabled: false,
            },
        );
        stored.insert(
            "not-a-color".to_string(),
            ColorStat {
                count: 1,
                enabled: true,
            },
        );

        let (palette, warnings) = palette_from_stored(&stored);
        assert_eq!(
            palette.is_enabled(&ColorKey::Rgb(RgbColor::new(0, 0, 0))),
            Some(false)
        );
        assert_eq!(palette.len(), 1);
        assert_eq!(warnings.len(), 1);
    }
}
