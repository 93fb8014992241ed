use domain::coords::TileCoord;
use std::sync::Arc;

/// Most recently seen raw tile responses. Purely an optimisation; a miss is never an error.
pub trait TileCachePort: Send + Sync {
    fn get(&self, coord: TileCoord) -> Option<Arc<[u8]>>;
    fn put(&self, coord: TileCoord, raw: Arc<[u8]>);
    fn coords(&self) -> Vec<TileCoord>;
    fn clear(&self);
}

pub type DynTileCachePort = Arc<dyn TileCachePort>;
