use std::borrow::Cow;
use tracing::{debug, instrument, warn};

use domain::coords::TileCoord;

use crate::{
    error::AppResult,
    ports::{incoming::tiles::TileCompositeUseCase, outgoing::image_codec::DynImageCodecPort},
    templates::snapshot::TemplateSnapshot,
};

use super::compositor::composite;

/// Encoded-bytes front of the compositor: decode, draw, re-encode.
pub struct TileCompositeService {
    codec_port: DynImageCodecPort,
}

impl TileCompositeService {
    pub fn new(codec_port: DynImageCodecPort) -> Self {
        Self { codec_port }
    }

    /// Never fails: any error hands back the raw bytes untouched.
    #[instrument(skip(self, raw, templates), fields(bytes = raw.len()))]
    pub fn composite_tile_bytes<'a>(
        &self,
        tile: TileCoord,
        raw: &'a [u8],
        templates: &TemplateSnapshot,
    ) -> Cow<'a, [u8]> {
        if !templates.touches_tile(tile) {
            return Cow::Borrowed(raw);
        }

        match self.try_composite(tile, raw, templates) {
            Ok(Some(encoded)) => Cow::Owned(encoded),
            Ok(None) => Cow::Borrowed(raw),
            Err(e) => {
                warn!("Compositing tile {} failed, serving original: {}", tile, e);
                Cow::Borrowed(raw)
            }
        }
    }

    fn try_composite(
        &self,
        tile: TileCoord,
        raw: &[u8],
        templates: &TemplateSnapshot,
    ) -> AppResult<Option<Vec<u8>>> {
        let bitmap = self.codec_port.decode(raw)?;
        let result = composite(tile, &bitmap, templates.templates());

        if result.is_unchanged() {
            return Ok(None);
        }

        let encoded = self.codec_port.encode_png(&result.bitmap)?;
        debug!(
            "Composited tile {}: {} -> {} bytes, {} scale conflicts",
            tile,
            raw.len(),
            encoded.len(),
            result.conflicts.len()
        );
        Ok(Some(encoded))
    }
}

impl TileCompositeUseCase for TileCompositeService {
    fn composite_tile<'a>(
        &self,
        tile: TileCoord,
        raw: &'a [u8],
        templates: &TemplateSnapshot,
    ) -> Cow<'a, [u8]> {
        self.composite_tile_bytes(tile, raw, templates)
    }
}
