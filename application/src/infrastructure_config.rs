use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::templates::chunker::{ColorMatching, MAX_SCALE_FACTOR};

/// Widest tile whose pixel offsets still fit the three-digit chunk key field.
pub const MAX_TILE_SIZE: u32 = 1000;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub tiles: TileConfig,
    pub templates: TemplateConfig,
    pub storage: StorageConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TileConfig {
    pub tile_size: u32,
    pub tiles_per_axis: u32,
    pub raw_cache_capacity: usize,
    pub composite_timeout_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TemplateConfig {
    pub scale_factor: u32,
    pub alpha_threshold: u8,
    pub color_matching: ColorMatching,
    pub allow_premium: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    pub path: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
    pub include_location: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum LogFormat {
    #[serde(rename = "json")]
    Json,
    #[serde(rename = "pretty")]
    Pretty,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            tiles: TileConfig {
                tile_size: 1000,
                tiles_per_axis: 2048,
                raw_cache_capacity: 64,
                composite_timeout_ms: 2000,
            },
            templates: TemplateConfig {
                scale_factor: 3,
                alpha_threshold: 64,
                color_matching: ColorMatching::Exact,
                allow_premium: true,
            },
            storage: StorageConfig {
                path: "templates.json".to_string(),
            },
            logging: LoggingConfig {
                level: "debug".to_string(),
                format: LogFormat::Pretty,
                include_location: false,
            },
        }
    }
}

impl Config {
    pub fn validate(&self) -> AppResult<()> {
        if self.tiles.tile_size == 0 || self.tiles.tile_size > MAX_TILE_SIZE {
            return Err(AppError::ConfigError {
                message: format!("tile_size must be between 1 and {MAX_TILE_SIZE}"),
            });
        }

        if self.tiles.tiles_per_axis == 0 || self.tiles.tiles_per_axis > 9999 {
            return Err(AppError::ConfigError {
                message: "tiles_per_axis must be between 1 and 9999".to_string(),
            });
        }

        if self.tiles.raw_cache_capacity == 0 {
            return Err(AppError::ConfigError {
                message: "raw_cache_capacity must be greater than 0".to_string(),
            });
        }

        if self.tiles.composite_timeout_ms == 0 {
            return Err(AppError::ConfigError {
                message: "composite_timeout_ms must be greater than 0".to_string(),
            });
        }

        if self.templates.scale_factor == 0 || self.templates.scale_factor > MAX_SCALE_FACTOR {
            return Err(AppError::ConfigError {
                message: format!("scale_factor must be between 1 and {MAX_SCALE_FACTOR}"),
            });
        }

        if self.templates.alpha_threshold == 0 {
            return Err(AppError::ConfigError {
                message: "alpha_threshold must be greater than 0".to_string(),
            });
        }

        if self.storage.path.trim().is_empty() {
            return Err(AppError::ConfigError {
                message: "storage path cannot be empty".to_string(),
            });
        }

        if self.logging.level.trim().is_empty() {
            return Err(AppError::ConfigError {
                message: "logging level cannot be empty".to_string(),
            });
        }

        Ok(())
    }
}
