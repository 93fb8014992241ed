use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::trace;

use domain::coords::TileCoord;
use tile_overlay_application::ports::outgoing::tile_cache::TileCachePort;

#[derive(Clone, Copy)]
pub struct LruTileCacheConfig {
    pub capacity: usize,
}

#[derive(Default)]
struct LruState {
    entries: HashMap<TileCoord, Arc<[u8]>>,
    /// Front is least recently used.
    order: VecDeque<TileCoord>,
}

impl LruState {
    fn touch(&mut self, coord: TileCoord) {
        if let Some(position) = self.order.iter().position(|c| *c == coord) {
            self.order.remove(position);
        }
        self.order.push_back(coord);
    }
}

/// Raw tile bytes as last served by the host, bounded by tile count.
pub struct LruTileCacheAdapter {
    capacity: usize,
    state: Mutex<LruState>,
}

impl LruTileCacheAdapter {
    pub fn new(config: LruTileCacheConfig) -> Self {
        Self {
            capacity: config.capacity.max(1),
            state: Mutex::new(LruState::default()),
        }
    }

    pub fn len(&self) -> usize {
        self.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> MutexGuard<'_, LruState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl TileCachePort for LruTileCacheAdapter {
    fn get(&self, coord: TileCoord) -> Option<Arc<[u8]>> {
        let mut state = self.lock();
        let raw = state.entries.get(&coord).map(Arc::clone)?;
        state.touch(coord);
        Some(raw)
    }

    fn put(&self, coord: TileCoord, raw: Arc<[u8]>) {
        let mut state = self.lock();
        state.entries.insert(coord, raw);
        state.touch(coord);

        while state.entries.len() > self.capacity {
            let Some(evicted) = state.order.pop_front() else {
                break;
            };
            state.entries.remove(&evicted);
            trace!("Evicted raw tile {}", evicted);
        }
    }

    fn coords(&self) -> Vec<TileCoord> {
        self.lock().order.iter().copied().collect()
    }

    fn clear(&self) {
        let mut state = self.lock();
        state.entries.clear();
        state.order.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bytes(tag: u8) -> Arc<[u8]> {
        Arc::from(vec![tag])
    }

    #[test]
    fn evicts_least_recently_used() {
        let cache = LruTileCacheAdapter::new(LruTileCacheConfig { capacity: 2 });
        cache.put(TileCoord::new(0, 0), bytes(0));
        cache.put(TileCoord::new(1, 0), bytes(1));

        assert!(cache.get(TileCoord::new(0, 0)).is_some());
        cache.put(TileCoord::new(2, 0), bytes(2));

        assert!(cache.get(TileCoord::new(1, 0)).is_none());
        assert_eq!(cache.get(TileCoord::new(0, 0)).as_deref(), Some(&[0u8][..]));
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn put_replaces_existing_entry() {
        let cache = LruTileCacheAdapter::new(LruTileCacheConfig { capacity: 4 });
        cache.put(TileCoord::new(3, 3), bytes(1));
        cache.put(TileCoord::new(3, 3), bytes(2));

        assert_eq!(cache.coords(), vec![TileCoord::new(3, 3)]);
        assert_eq!(cache.get(TileCoord::new(3, 3)).as_deref(), Some(&[2u8][..]));

        cache.clear();
        assert!(cache.is_empty());
    }
}
