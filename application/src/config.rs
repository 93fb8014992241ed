use crate::infrastructure_config::Config;
use crate::templates::chunker::{ChunkSettings, ColorMatching, PaletteFilter};

#[derive(Debug, Clone)]
pub struct TileSettings {
    pub tile_size: u32,
    pub tiles_per_axis: u32,
    pub scale_factor: u32,
    pub alpha_threshold: u8,
    pub color_matching: ColorMatching,
    pub allow_premium: bool,
}

impl TileSettings {
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        Self {
            tile_size: config.tiles.tile_size,
            tiles_per_axis: config.tiles.tiles_per_axis,
            scale_factor: config.templates.scale_factor,
            alpha_threshold: config.templates.alpha_threshold,
            color_matching: config.templates.color_matching,
            allow_premium: config.templates.allow_premium,
        }
    }

    #[must_use]
    pub fn default_filter(&self) -> PaletteFilter {
        PaletteFilter {
            allow_premium: self.allow_premium,
            ..PaletteFilter::default()
        }
    }

    #[must_use]
    pub fn chunk_settings(&self, scale_factor: u32, filter: PaletteFilter) -> ChunkSettings {
        ChunkSettings {
            tile_size: self.tile_size,
            tiles_per_axis: self.tiles_per_axis,
            scale_factor,
            alpha_threshold: self.alpha_threshold,
            matching: self.color_matching,
            filter,
        }
    }
}

impl Default for TileSettings {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}
