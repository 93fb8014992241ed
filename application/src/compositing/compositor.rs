use std::borrow::Cow;
use std::sync::Arc;
use tracing::{trace, warn};

use domain::{
    bitmap::RgbaBitmap,
    color::alpha_of,
    coords::TileCoord,
    error::DomainError,
    template::{Chunk, ColorPalette, Template, TemplateId},
};

use crate::templates::snapshot::overlapping_chunks;

#[derive(Debug)]
pub struct TileComposite<'a> {
    pub bitmap: Cow<'a, RgbaBitmap>,
    /// Templates left out because their scale factor differs from the store's.
    pub conflicts: Vec<DomainError>,
}

impl TileComposite<'_> {
    #[must_use]
    pub fn is_unchanged(&self) -> bool {
        matches!(self.bitmap, Cow::Borrowed(_))
    }
}

/// Draws every drawable template chunk for `tile` over `raw`.
///
/// One scale factor holds for the whole store: that of the first drawable
/// template, whether or not it touches this tile. Templates with any other
/// scale are skipped and reported on every tile they land on. Later templates
/// draw over earlier ones. When nothing drawable touches the tile the raw
/// bitmap is handed back borrowed.
pub fn composite<'a>(
    tile: TileCoord,
    raw: &'a RgbaBitmap,
    templates: &[Arc<Template>],
) -> TileComposite<'a> {
    let mut conflicts: Vec<DomainError> = Vec::new();
    let Some(scale_factor) = reference_scale_factor(templates) else {
        return TileComposite {
            bitmap: Cow::Borrowed(raw),
            conflicts,
        };
    };

    let mut reported: Vec<TemplateId> = Vec::new();
    let mut output: Option<RgbaBitmap> = None;

    for overlap in overlapping_chunks(templates, tile) {
        let template = overlap.template;
        if template.scale_factor != scale_factor {
            if !reported.contains(&template.id) {
                warn!(
                    "Skipping template {} on tile {}: scale factor {} differs from {}",
                    template.id, tile, template.scale_factor, scale_factor
                );
                reported.push(template.id);
                conflicts.push(DomainError::ScaleFactorConflict {
                    template: template.id.to_string(),
                    expected: scale_factor,
                    found: template.scale_factor,
                });
            }
            continue;
        }

        let canvas = output.get_or_insert_with(|| raw.upscale(scale_factor));
        draw_chunk(canvas, overlap.chunk, &template.color_palette);
    }

    TileComposite {
        bitmap: output.map_or(Cow::Borrowed(raw), Cow::Owned),
        conflicts,
    }
}

/// Scale factor of the first-created drawable template.
#[must_use]
pub fn reference_scale_factor(templates: &[Arc<Template>]) -> Option<u32> {
    templates
        .iter()
        .find(|template| template.should_be_drawn)
        .map(|template| template.scale_factor)
}

fn draw_chunk(output: &mut RgbaBitmap, chunk: &Chunk, palette: &ColorPalette) {
    let scale = chunk.scale_factor;
    let origin_x = chunk.key.local.x * scale;
    let origin_y = chunk.key.local.y * scale;
    let mut missing_keys = 0usize;

    for source_y in 0..chunk.height {
        for source_x in 0..chunk.width {
            let Some(key) = chunk.source_key(source_x, source_y) else {
                continue;
            };

            match palette.is_enabled(&key) {
                Some(true) => {}
                Some(false) => continue,
                None => {
                    missing_keys += 1;
                    continue;
                }
            }

            for dy in 0..scale {
                for dx in 0..scale {
                    let x = source_x * scale + dx;
                    let y = source_y * scale + dy;
                    match chunk.bitmap.get(x, y) {
                        Some(pixel) if alpha_of(pixel) > 0 => {
                            output.set(origin_x + x, origin_y + y, pixel);
                        }
                        _ => {}
                    }
                }
            }
        }
    }

    if missing_keys > 0 {
        warn!(
            "Chunk {} skipped {} pixels whose color is missing from the template palette",
            chunk.key, missing_keys
        );
    } else {
        trace!("Drew chunk {}", chunk.key);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::templates::chunker::{self, ChunkSettings, ColorMatching, PaletteFilter};
    use domain::{
        color::{ColorKey, RgbColor, SENTINEL_RGB, TRANSPARENT_RGBA, pack_rgba},
        coords::Anchor,
        template::ColorStat,
    };

    const BLACK: RgbColor = RgbColor::new(0, 0, 0);
    const RED: RgbColor = RgbColor::new(237, 28, 36);
    const BASE: u32 = 0xFF80_8080;

    fn template(name: &str, anchor: Anchor, scale: u32, pixels: &[RgbColor]) -> Arc<Template> {
        let width = u32::try_from(pixels.len()).unwrap();
        let source = RgbaBitmap::from_pixels(
            width,
            1,
            pixels.iter().map(RgbColor::to_rgba_u32).collect(),
        )
        .unwrap();
        let settings = ChunkSettings {
            tile_size: 1000,
            tiles_per_axis: 2048,
            scale_factor: scale,
            alpha_threshold: 64,
            matching: ColorMatching::Exact,
            filter: PaletteFilter::default(),
        };
        let output = chunker::chunk(&source, anchor, &settings).unwrap();
        Arc::new(Template {
            id: TemplateId::derive(name, &anchor),
            name: name.to_string(),
            anchor,
            scale_factor: scale,
            source: Some(Arc::new(source)),
            chunks: Arc::new(output.chunks),
            color_palette: output.color_palette,
            should_be_drawn: true,
            warnings: output.warnings,
        })
    }

    fn raw_tile(size: u32) -> RgbaBitmap {
        RgbaBitmap::from_pixels(size, size, vec![BASE; (size * size) as usize]).unwrap()
    }

    #[test]
    fn untouched_tile_is_borrowed() {
        let raw = raw_tile(4);
        let templates = vec![template("a", Anchor::new(3, 3, 0, 0), 3, &[BLACK])];
        let result = composite(TileCoord::new(0, 0), &raw, &templates);
        assert!(result.is_unchanged());
        assert!(std::ptr::eq(result.bitmap.as_ref(), &raw));
    }

    #[test]
    fn draws_center_dots_over_upscaled_tile() {
        let raw = raw_tile(1000);
        let templates = vec![template(
            "pair",
            Anchor::new(0, 0, 998, 0),
            3,
            &[BLACK, SENTINEL_RGB],
        )];

        let left = composite(TileCoord::new(0, 0), &raw, &templates);
        assert_eq!(left.bitmap.width(), 3000);
        for dy in 0..3 {
            for dx in 0..3 {
                let expected = if (dx, dy) == (1, 1) {
                    BLACK.to_rgba_u32()
                } else {
                    BASE
                };
                assert_eq!(left.bitmap.get(998 * 3 + dx, dy), Some(expected));
            }
        }

        let right = composite(TileCoord::new(1, 0), &raw, &templates);
        assert!(!right.is_unchanged());
        assert!(right.bitmap.pixels().iter().all(|&p| p == BASE));
    }

    #[test]
    fn later_templates_draw_on_top() {
        let raw = raw_tile(10);
        let anchor = Anchor::new(0, 0, 2, 2);
        let templates = vec![
            template("under", anchor, 1, &[BLACK]),
            template("over", anchor, 1, &[RED]),
        ];
        let result = composite(TileCoord::new(0, 0), &raw, &templates);
        assert_eq!(result.bitmap.get(2, 2), Some(RED.to_rgba_u32()));
    }

    #[test]
    fn hidden_templates_are_skipped() {
        let raw = raw_tile(10);
        let mut hidden = template("hidden", Anchor::new(0, 0, 1, 1), 1, &[BLACK]);
        Arc::make_mut(&mut hidden).should_be_drawn = false;
        let result = composite(TileCoord::new(0, 0), &raw, &[hidden]);
        assert!(result.is_unchanged());
    }

    #[test]
    fn disabled_colors_are_not_drawn_and_counts_stay() {
        let raw = raw_tile(10);
        let mut shown = template("mix", Anchor::new(0, 0, 0, 0), 1, &[BLACK, RED]);
        let inner = Arc::make_mut(&mut shown);
        assert!(inner.color_palette.set_enabled(&ColorKey::Rgb(RED), false));

        let result = composite(TileCoord::new(0, 0), &raw, &[Arc::clone(&shown)]);
        assert_eq!(result.bitmap.get(0, 0), Some(BLACK.to_rgba_u32()));
        assert_eq!(result.bitmap.get(1, 0), Some(BASE));
        assert_eq!(
            shown.color_palette.get(&ColorKey::Rgb(RED)).map(|s| s.count),
            Some(1)
        );
    }

    #[test]
    fn keys_missing_from_palette_are_skipped() {
        let raw = raw_tile(10);
        let mut corrupted = template("broken", Anchor::new(0, 0, 0, 0), 1, &[BLACK, RED]);
        let inner = Arc::make_mut(&mut corrupted);
        let mut palette = ColorPalette::new();
        palette.insert(
            ColorKey::Rgb(BLACK),
            ColorStat {
                count: 1,
                enabled: true,
            },
        );
        inner.color_palette = palette;

        let result = composite(TileCoord::new(0, 0), &raw, &[corrupted]);
        assert_eq!(result.bitmap.get(0, 0), Some(BLACK.to_rgba_u32()));
        assert_eq!(result.bitmap.get(1, 0), Some(BASE));
    }

    #[test]
    fn conflicting_scale_factors_keep_first_template() {
        let raw = raw_tile(10);
        let templates = vec![
            template("first", Anchor::new(0, 0, 0, 0), 3, &[BLACK]),
            template("second", Anchor::new(0, 0, 1, 0), 1, &[RED]),
        ];
        let result = composite(TileCoord::new(0, 0), &raw, &templates);
        assert_eq!(result.bitmap.width(), 30);
        assert_eq!(result.bitmap.get(1, 1), Some(BLACK.to_rgba_u32()));
        assert_eq!(result.bitmap.get(3, 0), Some(BASE));
        assert_eq!(result.conflicts.len(), 1);
        assert!(matches!(
            result.conflicts.first(),
            Some(DomainError::ScaleFactorConflict {
                expected: 3,
                found: 1,
                ..
            })
        ));
    }

    #[test]
    fn scale_factor_is_global_across_tiles() {
        let raw = raw_tile(10);
        let templates = vec![
            template("first", Anchor::new(0, 0, 0, 0), 3, &[BLACK]),
            template("second", Anchor::new(1, 0, 0, 0), 1, &[BLACK]),
        ];

        let own_tile = composite(TileCoord::new(0, 0), &raw, &templates);
        assert_eq!(own_tile.bitmap.width(), 30);
        assert!(own_tile.conflicts.is_empty());

        let other_tile = composite(TileCoord::new(1, 0), &raw, &templates);
        assert!(other_tile.is_unchanged());
        assert_eq!(other_tile.bitmap.get(0, 0), Some(BASE));
        assert_eq!(other_tile.conflicts.len(), 1);
        assert!(matches!(
            other_tile.conflicts.first(),
            Some(DomainError::ScaleFactorConflict {
                expected: 3,
                found: 1,
                ..
            })
        ));
    }

    #[test]
    fn hidden_first_template_does_not_set_the_scale() {
        let raw = raw_tile(10);
        let mut hidden = template("hidden", Anchor::new(0, 0, 0, 0), 3, &[BLACK]);
        Arc::make_mut(&mut hidden).should_be_drawn = false;
        let templates = vec![
            hidden,
            template("shown", Anchor::new(1, 0, 0, 0), 1, &[BLACK]),
        ];

        let result = composite(TileCoord::new(1, 0), &raw, &templates);
        assert_eq!(result.bitmap.width(), 10);
        assert_eq!(result.bitmap.get(0, 0), Some(BLACK.to_rgba_u32()));
        assert!(result.conflicts.is_empty());
    }

    #[test]
    fn compositing_is_idempotent() {
        let raw = RgbaBitmap::from_pixels(
            10,
            10,
            (0..100u32).map(|i| pack_rgba(i as u8, 0, 0, 255)).collect(),
        )
        .unwrap();
        let templates = vec![template("a", Anchor::new(0, 0, 4, 4), 3, &[BLACK, RED, BLACK])];
        let first = composite(TileCoord::new(0, 0), &raw, &templates);
        let second = composite(TileCoord::new(0, 0), &raw, &templates);
        assert_eq!(first.bitmap, second.bitmap);
        assert_ne!(first.bitmap.get(4 * 3 + 1, 4 * 3 + 1), Some(TRANSPARENT_RGBA));
    }
}
