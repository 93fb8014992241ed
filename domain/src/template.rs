use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use uuid::Uuid;

use crate::bitmap::RgbaBitmap;
use crate::chunk_key::ChunkKey;
use crate::color::{ColorKey, RgbColor};
use crate::coords::{Anchor, PixelCoord, TileCoord};

const TEMPLATE_NAMESPACE: Uuid = Uuid::from_u128(0x6f1c_2a4e_8d3b_4c77_9e2a_51d0_b7c4_a913);

/// Derived from name and anchor, so importing the same template twice lands on the same id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TemplateId(pub Uuid);

impl TemplateId {
    #[must_use]
    pub fn derive(name: &str, anchor: &Anchor) -> Self {
        let seed = format!("{name}@{anchor}");
        Self(Uuid::new_v5(&TEMPLATE_NAMESPACE, seed.as_bytes()))
    }
}

impl fmt::Display for TemplateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Missing fields read back as an enabled color with no pixels counted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColorStat {
    #[serde(default)]
    pub count: u64,
    #[serde(default = "enabled_by_default")]
    pub enabled: bool,
}

const fn enabled_by_default() -> bool {
    true
}

impl ColorStat {
    #[must_use]
    pub fn new(enabled: bool) -> Self {
        Self { count: 0, enabled }
    }
}

/// Per-color usage tally of a template, keyed by quantized color bucket.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ColorPalette(BTreeMap<ColorKey, ColorStat>);

impl ColorPalette {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tally(&mut self, key: ColorKey, enabled: bool) {
        self.0
            .entry(key)
            .or_insert_with(|| ColorStat::new(enabled))
            .count += 1;
    }

    pub fn insert(&mut self, key: ColorKey, stat: ColorStat) {
        self.0.insert(key, stat);
    }

    #[must_use]
    pub fn get(&self, key: &ColorKey) -> Option<&ColorStat> {
        self.0.get(key)
    }

    /// Returns false when the key is unknown.
    pub fn set_enabled(&mut self, key: &ColorKey, enabled: bool) -> bool {
        match self.0.get_mut(key) {
            Some(stat) => {
                stat.enabled = enabled;
                true
            }
            None => false,
        }
    }

    #[must_use]
    pub fn is_enabled(&self, key: &ColorKey) -> Option<bool> {
        self.0.get(key).map(|stat| stat.enabled)
    }

    #[must_use]
    pub fn contains(&self, key: &ColorKey) -> bool {
        self.0.contains_key(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ColorKey, &ColorStat)> {
        self.0.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Keys by descending count, ties in key order.
    #[must_use]
    pub fn ranked(&self) -> Vec<(ColorKey, ColorStat)> {
        let mut ranked: Vec<(ColorKey, ColorStat)> =
            self.0.iter().map(|(key, stat)| (*key, *stat)).collect();
        ranked.sort_by(|(a_key, a), (b_key, b)| b.count.cmp(&a.count).then(a_key.cmp(b_key)));
        ranked
    }

    /// Total pixels the painter has to place: every enabled drawable color.
    #[must_use]
    pub fn paintable_pixels(&self) -> u64 {
        self.0
            .iter()
            .filter(|(key, stat)| key.is_drawable() && stat.enabled)
            .map(|(_, stat)| stat.count)
            .sum()
    }
}

/// The part of a template that falls inside one tile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    pub key: ChunkKey,
    pub width: u32,
    pub height: u32,
    pub scale_factor: u32,
    /// Upscaled to `width * scale_factor` by `height * scale_factor`.
    pub bitmap: RgbaBitmap,
    /// Color bucket of each source pixel, row-major; `None` where the source was transparent.
    pub provenance: Vec<Option<ColorKey>>,
}

impl Chunk {
    #[must_use]
    pub fn tile(&self) -> TileCoord {
        self.key.tile
    }

    #[must_use]
    pub fn local_offset(&self) -> PixelCoord {
        self.key.local
    }

    #[must_use]
    pub fn source_key(&self, x: u32, y: u32) -> Option<ColorKey> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.provenance
            .get(y as usize * self.width as usize + x as usize)
            .copied()
            .flatten()
    }
}

pub type ChunkMap = BTreeMap<ChunkKey, Chunk>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplateWarning {
    UnmappableColor { rgb: RgbColor, count: u64 },
    CorruptedState { detail: String },
}

impl fmt::Display for TemplateWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnmappableColor { rgb, count } => {
                write!(f, "color ({rgb}) is not in the palette ({count} pixels)")
            }
            Self::CorruptedState { detail } => write!(f, "corrupted template state: {detail}"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Template {
    pub id: TemplateId,
    pub name: String,
    pub anchor: Anchor,
    pub scale_factor: u32,
    /// Kept so the template can be re-chunked or exported; `None` for inert imports.
    pub source: Option<Arc<RgbaBitmap>>,
    pub chunks: Arc<ChunkMap>,
    pub color_palette: ColorPalette,
    pub should_be_drawn: bool,
    pub warnings: Vec<TemplateWarning>,
}

impl Template {
    #[must_use]
    pub fn is_inert(&self) -> bool {
        self.chunks.is_empty()
    }

    pub fn chunks_for_tile(&self, tile: TileCoord) -> impl Iterator<Item = &Chunk> {
        let start = ChunkKey {
            tile,
            local: PixelCoord::new(0, 0),
        };
        self.chunks
            .range(start..)
            .take_while(move |(key, _)| key.matches_tile(tile))
            .map(|(_, chunk)| chunk)
    }

    #[must_use]
    pub fn touches_tile(&self, tile: TileCoord) -> bool {
        self.chunks_for_tile(tile).next().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn id_is_deterministic() {
        let anchor = Anchor::new(1, 2, 3, 4);
        assert_eq!(
            TemplateId::derive("castle", &anchor),
            TemplateId::derive("castle", &anchor)
        );
        assert_ne!(
            TemplateId::derive("castle", &anchor),
            TemplateId::derive("castle", &Anchor::new(1, 2, 3, 5))
        );
        assert_ne!(
            TemplateId::derive("castle", &anchor),
            TemplateId::derive("tower", &anchor)
        );
    }

    #[test]
    fn palette_ranking_and_toggles() {
        let black = ColorKey::Rgb(RgbColor::new(0, 0, 0));
        let white = ColorKey::Rgb(RgbColor::new(255, 255, 255));
        let mut palette = ColorPalette::new();
        palette.tally(white, true);
        palette.tally(black, true);
        palette.tally(black, true);
        palette.tally(ColorKey::Sentinel, true);

        let ranked: Vec<ColorKey> = palette.ranked().into_iter().map(|(k, _)| k).collect();
        assert_eq!(ranked, vec![black, white, ColorKey::Sentinel]);
        assert_eq!(palette.paintable_pixels(), 3);

        assert!(palette.set_enabled(&black, false));
        assert_eq!(palette.get(&black).map(|s| s.count), Some(2));
        assert_eq!(palette.paintable_pixels(), 1);
        assert!(!palette.set_enabled(&ColorKey::Other, false));
    }
}
