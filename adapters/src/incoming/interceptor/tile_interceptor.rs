use std::borrow::Cow;
use std::sync::Arc;
use std::time::Duration;
use tokio::{task::spawn_blocking, time::timeout};
use tracing::{debug, instrument, trace, warn};

use domain::coords::TileCoord;
use tile_overlay_application::{
    ports::{incoming::tiles::DynTileCompositeUseCase, outgoing::tile_cache::DynTileCachePort},
    templates::snapshot::TemplateSnapshot,
};

use super::{
    correlation::{BlobId, CorrelationTable},
    tile_url::parse_tile_url,
};

#[derive(Debug, Clone, Copy)]
pub struct TileInterceptorConfig {
    pub tiles_per_axis: u32,
    pub composite_timeout: Duration,
}

pub struct TileInterceptorDeps {
    pub tile_cache: DynTileCachePort,
    pub compositor: DynTileCompositeUseCase,
}

#[derive(Debug, Clone)]
pub struct InterceptedTile {
    /// `None` when the response was not a tile we asked about.
    pub tile: Option<TileCoord>,
    pub body: Arc<[u8]>,
    pub composited: bool,
}

impl InterceptedTile {
    fn untouched(tile: Option<TileCoord>, body: Arc<[u8]>) -> Self {
        Self {
            tile,
            body,
            composited: false,
        }
    }
}

/// Sits between the host's tile fetches and the page.
///
/// Requests are registered by blob id as they go out; responses arrive in any
/// order and are matched back to their tile through the correlation table.
/// Compositing runs on the blocking pool and falls back to the raw body on
/// any failure or timeout.
pub struct TileInterceptor {
    correlation: CorrelationTable,
    tile_cache: DynTileCachePort,
    compositor: DynTileCompositeUseCase,
    config: TileInterceptorConfig,
}

impl TileInterceptor {
    pub fn new(config: TileInterceptorConfig, deps: TileInterceptorDeps) -> Self {
        Self {
            correlation: CorrelationTable::new(),
            tile_cache: deps.tile_cache,
            compositor: deps.compositor,
            config,
        }
    }

    pub fn pending_requests(&self) -> usize {
        self.correlation.pending()
    }

    /// Remembers which tile `blob` will carry. Non-tile URLs are ignored.
    pub fn register_request(&self, blob: BlobId, url: &str) -> Option<TileCoord> {
        let tile = parse_tile_url(url)?;
        if let Err(e) = tile.validate_bounds(self.config.tiles_per_axis) {
            debug!("Ignoring tile request {}: {}", url, e);
            return None;
        }

        if let Some(previous) = self.correlation.register(blob.clone(), tile) {
            debug!("Blob {} re-registered: {} -> {}", blob, previous, tile);
        }
        trace!("Registered blob {} for tile {}", blob, tile);
        Some(tile)
    }

    /// Call when a registered request failed and no body will follow.
    pub fn abandon_request(&self, blob: &BlobId) -> Option<TileCoord> {
        let tile = self.correlation.forget(blob)?;
        debug!("Abandoned request {} for tile {}", blob, tile);
        Some(tile)
    }

    #[instrument(skip(self, body, snapshot), fields(blob = %blob, bytes = body.len()))]
    pub async fn handle_response(
        &self,
        blob: &BlobId,
        body: Arc<[u8]>,
        snapshot: &TemplateSnapshot,
    ) -> InterceptedTile {
        let Some(tile) = self.correlation.resolve(blob) else {
            trace!("Blob {} is not a tracked tile, passing through", blob);
            return InterceptedTile::untouched(None, body);
        };

        self.tile_cache.put(tile, Arc::clone(&body));
        self.composite(tile, body, snapshot).await
    }

    /// Redraws a recently seen tile from its cached raw bytes.
    pub async fn recomposite(
        &self,
        tile: TileCoord,
        snapshot: &TemplateSnapshot,
    ) -> Option<InterceptedTile> {
        let raw = self.tile_cache.get(tile)?;
        Some(self.composite(tile, raw, snapshot).await)
    }

    /// Redraws every cached tile, e.g. after a template was toggled.
    pub async fn recomposite_cached(&self, snapshot: &TemplateSnapshot) -> Vec<InterceptedTile> {
        let mut redrawn = Vec::new();
        for tile in self.tile_cache.coords() {
            if let Some(result) = self.recomposite(tile, snapshot).await {
                redrawn.push(result);
            }
        }
        redrawn
    }

    async fn composite(
        &self,
        tile: TileCoord,
        raw: Arc<[u8]>,
        snapshot: &TemplateSnapshot,
    ) -> InterceptedTile {
        if !snapshot.touches_tile(tile) {
            return InterceptedTile::untouched(Some(tile), raw);
        }

        let compositor = Arc::clone(&self.compositor);
        let templates = snapshot.clone();
        let input = Arc::clone(&raw);
        let task = spawn_blocking(move || {
            match compositor.composite_tile(tile, &input, &templates) {
                Cow::Owned(encoded) => Some(encoded),
                Cow::Borrowed(_) => None,
            }
        });

        match timeout(self.config.composite_timeout, task).await {
            Ok(Ok(Some(encoded))) => InterceptedTile {
                tile: Some(tile),
                body: Arc::from(encoded),
                composited: true,
            },
            Ok(Ok(None)) => InterceptedTile::untouched(Some(tile), raw),
            Ok(Err(e)) => {
                warn!("Compositing task for tile {} failed: {}", tile, e);
                InterceptedTile::untouched(Some(tile), raw)
            }
            Err(_) => {
                warn!(
                    "Compositing tile {} timed out after {:?}, serving original",
                    tile, self.config.composite_timeout
                );
                InterceptedTile::untouched(Some(tile), raw)
            }
        }
    }
}
