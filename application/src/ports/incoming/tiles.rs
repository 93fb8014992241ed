use std::borrow::Cow;
use std::sync::Arc;

use domain::coords::TileCoord;

use crate::templates::snapshot::TemplateSnapshot;

pub trait TileCompositeUseCase: Send + Sync {
    fn composite_tile<'a>(
        &self,
        tile: TileCoord,
        raw: &'a [u8],
        templates: &TemplateSnapshot,
    ) -> Cow<'a, [u8]>;
}

pub type DynTileCompositeUseCase = Arc<dyn TileCompositeUseCase>;
