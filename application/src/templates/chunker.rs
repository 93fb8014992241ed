use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use tracing::debug;

use domain::{
    bitmap::RgbaBitmap,
    chunk_key::ChunkKey,
    color::{ColorKey, RgbColor, alpha_of},
    coords::{Anchor, WorldCoord},
    error::{DomainError, DomainResult},
    palette::{self, PaletteEntry},
    template::{Chunk, ChunkMap, ColorPalette, TemplateWarning},
};

pub const MAX_SCALE_FACTOR: u32 = 16;

/// Upper bound on pixels allocated for one upscaled tile, and for all chunks of one template.
pub const MAX_UPSCALED_PIXELS: u64 = 1 << 27;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ColorMatching {
    /// Colors off the palette are tallied as "other" and never drawn.
    #[default]
    #[serde(rename = "exact")]
    Exact,
    /// Every opaque color snaps to the closest palette entry.
    #[serde(rename = "nearest")]
    Nearest,
}

impl ColorMatching {
    fn resolve(self, rgb: RgbColor) -> Option<&'static PaletteEntry> {
        match self {
            Self::Exact => palette::lookup_exact(rgb),
            Self::Nearest => Some(palette::lookup_nearest(rgb)),
        }
    }
}

/// Colors that start out hidden. They are still chunked, so re-enabling them needs no re-chunk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaletteFilter {
    pub allow_premium: bool,
    pub disabled: BTreeSet<ColorKey>,
}

impl Default for PaletteFilter {
    fn default() -> Self {
        Self {
            allow_premium: true,
            disabled: BTreeSet::new(),
        }
    }
}

impl PaletteFilter {
    #[must_use]
    pub fn allows(&self, entry: &PaletteEntry) -> bool {
        (self.allow_premium || !entry.premium) && !self.disabled.contains(&ColorKey::Rgb(entry.rgb))
    }
}

#[derive(Debug, Clone)]
pub struct ChunkSettings {
    pub tile_size: u32,
    pub tiles_per_axis: u32,
    pub scale_factor: u32,
    pub alpha_threshold: u8,
    pub matching: ColorMatching,
    pub filter: PaletteFilter,
}

#[derive(Debug, Clone)]
pub struct ChunkOutput {
    pub chunks: ChunkMap,
    pub color_palette: ColorPalette,
    pub warnings: Vec<TemplateWarning>,
}

/// World-space rectangle, half-open on the right and bottom.
#[derive(Debug, Clone, Copy)]
struct WorldRect {
    left: u32,
    top: u32,
    right: u32,
    bottom: u32,
}

pub fn chunk(
    source: &RgbaBitmap,
    anchor: Anchor,
    settings: &ChunkSettings,
) -> DomainResult<ChunkOutput> {
    if source.is_empty() {
        return Err(DomainError::InvalidTemplate(format!(
            "Source image is empty ({}x{})",
            source.width(),
            source.height()
        )));
    }

    if settings.scale_factor == 0 || settings.scale_factor > MAX_SCALE_FACTOR {
        return Err(DomainError::InvalidTemplate(format!(
            "Scale factor {} must be between 1 and {MAX_SCALE_FACTOR}",
            settings.scale_factor
        )));
    }

    anchor.validate(settings.tile_size, settings.tiles_per_axis)?;
    let origin = anchor.to_world(settings.tile_size)?;
    let bounds = visible_bounds(source, origin, settings)?;
    check_upscaled_area(bounds, settings)?;

    let mut chunks = ChunkMap::new();
    let mut color_palette = ColorPalette::new();
    let mut unmappable: BTreeMap<RgbColor, u64> = BTreeMap::new();

    let tile_size = settings.tile_size;
    for tile_y in bounds.top / tile_size..=(bounds.bottom - 1) / tile_size {
        for tile_x in bounds.left / tile_size..=(bounds.right - 1) / tile_size {
            let rect = WorldRect {
                left: bounds.left.max(tile_x * tile_size),
                top: bounds.top.max(tile_y * tile_size),
                right: bounds.right.min((tile_x + 1) * tile_size),
                bottom: bounds.bottom.min((tile_y + 1) * tile_size),
            };

            let key = ChunkKey::new(
                tile_x,
                tile_y,
                rect.left - tile_x * tile_size,
                rect.top - tile_y * tile_size,
            );

            let mut quantizer = Quantizer {
                settings,
                palette: &mut color_palette,
                unmappable: &mut unmappable,
            };

            if let Some(chunk) = quantizer.build_chunk(source, origin, rect, key) {
                chunks.insert(key, chunk);
            }
        }
    }

    if color_palette.is_empty() {
        return Err(DomainError::InvalidTemplate(
            "Every pixel of the source image is transparent".to_string(),
        ));
    }

    let warnings = unmappable
        .into_iter()
        .map(|(rgb, count)| TemplateWarning::UnmappableColor { rgb, count })
        .collect();

    debug!(
        "Chunked {}x{} template at {} into {} chunks, {} colors",
        source.width(),
        source.height(),
        anchor,
        chunks.len(),
        color_palette.len()
    );

    Ok(ChunkOutput {
        chunks,
        color_palette,
        warnings,
    })
}

fn visible_bounds(
    source: &RgbaBitmap,
    origin: WorldCoord,
    settings: &ChunkSettings,
) -> DomainResult<WorldRect> {
    let extent = settings
        .tiles_per_axis
        .checked_mul(settings.tile_size)
        .ok_or_else(|| {
            DomainError::OutOfBounds(format!(
                "World of {} tiles of {} pixels overflows",
                settings.tiles_per_axis, settings.tile_size
            ))
        })?;

    if origin.x >= extent || origin.y >= extent {
        return Err(DomainError::OutOfBounds(format!(
            "Anchor {origin} lies outside the {extent}x{extent} world"
        )));
    }

    Ok(WorldRect {
        left: origin.x,
        top: origin.y,
        right: origin.x.saturating_add(source.width()).min(extent),
        bottom: origin.y.saturating_add(source.height()).min(extent),
    })
}

fn check_upscaled_area(bounds: WorldRect, settings: &ChunkSettings) -> DomainResult<()> {
    let scale_sq = u64::from(settings.scale_factor).pow(2);
    let tile_area = u64::from(settings.tile_size).pow(2).saturating_mul(scale_sq);
    if tile_area > MAX_UPSCALED_PIXELS {
        return Err(DomainError::InvalidTemplate(format!(
            "Scale factor {} is too large for {}px tiles",
            settings.scale_factor, settings.tile_size
        )));
    }

    let template_area = u64::from(bounds.right - bounds.left)
        .saturating_mul(u64::from(bounds.bottom - bounds.top))
        .saturating_mul(scale_sq);
    if template_area > MAX_UPSCALED_PIXELS {
        return Err(DomainError::InvalidTemplate(format!(
            "{}x{} pixels at scale {} exceed the {MAX_UPSCALED_PIXELS} pixel limit",
            bounds.right - bounds.left,
            bounds.bottom - bounds.top,
            settings.scale_factor
        )));
    }
    Ok(())
}

struct Quantizer<'a> {
    settings: &'a ChunkSettings,
    palette: &'a mut ColorPalette,
    unmappable: &'a mut BTreeMap<RgbColor, u64>,
}

impl Quantizer<'_> {
    fn build_chunk(
        &mut self,
        source: &RgbaBitmap,
        origin: WorldCoord,
        rect: WorldRect,
        key: ChunkKey,
    ) -> Option<Chunk> {
        let scale = self.settings.scale_factor;
        let dot = scale / 2;
        let width = rect.right - rect.left;
        let height = rect.bottom - rect.top;

        let mut bitmap = RgbaBitmap::transparent(width * scale, height * scale);
        let mut provenance = Vec::with_capacity(width as usize * height as usize);

        for world_y in rect.top..rect.bottom {
            for world_x in rect.left..rect.right {
                let rgba = source
                    .get(world_x - origin.x, world_y - origin.y)
                    .unwrap_or_default();
                let (color_key, drawn) = self.quantize(rgba);
                provenance.push(color_key);

                if let Some(rgb) = drawn {
                    bitmap.set(
                        (world_x - rect.left) * scale + dot,
                        (world_y - rect.top) * scale + dot,
                        rgb.to_rgba_u32(),
                    );
                }
            }
        }

        if provenance.iter().all(Option::is_none) {
            return None;
        }

        Some(Chunk {
            key,
            width,
            height,
            scale_factor: scale,
            bitmap,
            provenance,
        })
    }

    /// Returns the bucket the pixel is tallied under and the color to draw, if any.
    fn quantize(&mut self, rgba: u32) -> (Option<ColorKey>, Option<RgbColor>) {
        if alpha_of(rgba) < self.settings.alpha_threshold {
            return (None, None);
        }

        let rgb = RgbColor::from_rgba_u32(rgba);
        if palette::is_sentinel(rgb) {
            self.palette.tally(ColorKey::Sentinel, true);
            return (Some(ColorKey::Sentinel), None);
        }

        match self.settings.matching.resolve(rgb) {
            Some(entry) => {
                let key = ColorKey::Rgb(entry.rgb);
                self.palette.tally(key, self.settings.filter.allows(entry));
                (Some(key), Some(entry.rgb))
            }
            None => {
                self.palette.tally(ColorKey::Other, false);
                *self.unmappable.entry(rgb).or_insert(0) += 1;
                (Some(ColorKey::Other), None)
            }
        }
    }
}
