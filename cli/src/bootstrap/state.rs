use std::sync::Arc;
use std::time::Duration;
use tracing::info;

use tile_overlay_adapters::{
    incoming::interceptor::tile_interceptor::{
        TileInterceptor, TileInterceptorConfig, TileInterceptorDeps,
    },
    outgoing::{
        image_rs::png_codec_image::ImagePngAdapter,
        json_file::template_storage_file::FileTemplateStorageAdapter,
        tile_cache_lru::tile_cache_memory::{LruTileCacheAdapter, LruTileCacheConfig},
    },
};
use tile_overlay_application::{
    compositing::service::TileCompositeService,
    config::TileSettings,
    error::AppResult,
    infrastructure_config::Config,
    ports::{
        incoming::{
            templates::{DynTemplateUseCase, TemplateManagementUseCase},
            tiles::DynTileCompositeUseCase,
        },
        outgoing::{image_codec::DynImageCodecPort, template_storage::DynTemplateStoragePort},
    },
    templates::service::{TemplateService, TemplateServiceDeps},
};

pub struct AppState {
    pub config: Config,
    pub settings: Arc<TileSettings>,
    pub codec: DynImageCodecPort,
    pub templates: DynTemplateUseCase,
    pub compositor: DynTileCompositeUseCase,
}

impl AppState {
    /// Wires the adapters and restores the stored templates.
    pub fn new(config: Config) -> AppResult<Self> {
        let settings = Arc::new(TileSettings::from_config(&config));
        let codec: DynImageCodecPort = Arc::new(ImagePngAdapter::default());
        let storage: DynTemplateStoragePort =
            Arc::new(FileTemplateStorageAdapter::new(&config.storage.path));

        let mut templates: DynTemplateUseCase = Box::new(TemplateService::new(
            &settings,
            TemplateServiceDeps {
                codec_port: Arc::clone(&codec),
                storage_port: storage,
            },
        ));
        let summary = templates.load_from_storage()?;
        info!(
            "Restored {} templates from {} ({} inert)",
            summary.imported, config.storage.path, summary.inert
        );

        let compositor: DynTileCompositeUseCase =
            Arc::new(TileCompositeService::new(Arc::clone(&codec)));

        Ok(Self {
            config,
            settings,
            codec,
            templates,
            compositor,
        })
    }

    /// A fresh interceptor with an empty raw tile cache.
    pub fn interceptor(&self) -> TileInterceptor {
        TileInterceptor::new(
            TileInterceptorConfig {
                tiles_per_axis: self.settings.tiles_per_axis,
                composite_timeout: Duration::from_millis(self.config.tiles.composite_timeout_ms),
            },
            TileInterceptorDeps {
                tile_cache: Arc::new(LruTileCacheAdapter::new(LruTileCacheConfig {
                    capacity: self.config.tiles.raw_cache_capacity,
                })),
                compositor: Arc::clone(&self.compositor),
            },
        )
    }
}
