use dashmap::DashMap;
use std::fmt;

use domain::coords::TileCoord;

/// Handle the network layer gives a response body before the body is read.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BlobId(String);

impl BlobId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BlobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Outstanding tile requests, keyed by the blob their response will arrive in.
#[derive(Debug, Default)]
pub struct CorrelationTable {
    pending: DashMap<BlobId, TileCoord>,
}

impl CorrelationTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the tile previously registered under `blob`, if any.
    pub fn register(&self, blob: BlobId, tile: TileCoord) -> Option<TileCoord> {
        self.pending.insert(blob, tile)
    }

    /// Each registration resolves at most once.
    pub fn resolve(&self, blob: &BlobId) -> Option<TileCoord> {
        self.pending.remove(blob).map(|(_, tile)| tile)
    }

    /// Drops a registration whose response will never arrive.
    pub fn forget(&self, blob: &BlobId) -> Option<TileCoord> {
        self.pending.remove(blob).map(|(_, tile)| tile)
    }

    pub fn pending(&self) -> usize {
        self.pending.len()
    }
}
