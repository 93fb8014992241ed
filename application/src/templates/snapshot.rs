use std::sync::Arc;

use domain::{
    coords::{PixelCoord, TileCoord},
    template::{Chunk, Template},
};

/// Read-only view of the store at one instant, in insertion order.
///
/// Cloning is an `Arc` bump; an in-flight composite keeps using the snapshot it
/// was handed even if the store changes underneath it.
#[derive(Debug, Clone, Default)]
pub struct TemplateSnapshot(Arc<[Arc<Template>]>);

impl TemplateSnapshot {
    #[must_use]
    pub fn new(templates: Vec<Arc<Template>>) -> Self {
        Self(templates.into())
    }

    #[must_use]
    pub fn templates(&self) -> &[Arc<Template>] {
        &self.0
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn touches_tile(&self, tile: TileCoord) -> bool {
        overlapping_chunks(&self.0, tile).next().is_some()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct OverlappingChunk<'a> {
    pub template: &'a Arc<Template>,
    pub chunk: &'a Chunk,
    pub local_offset: PixelCoord,
}

/// Chunks of drawable templates that land on `tile`, first-added template first.
pub fn overlapping_chunks(
    templates: &[Arc<Template>],
    tile: TileCoord,
) -> impl Iterator<Item = OverlappingChunk<'_>> {
    templates
        .iter()
        .filter(|template| template.should_be_drawn)
        .flat_map(move |template| {
            template
                .chunks_for_tile(tile)
                .map(move |chunk| OverlappingChunk {
                    template,
                    chunk,
                    local_offset: chunk.local_offset(),
                })
        })
}
