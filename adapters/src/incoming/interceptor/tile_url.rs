use domain::coords::TileCoord;

const TILES_SEGMENT: &str = "tiles";
const TILE_EXTENSION: &str = ".png";

/// Extracts the tile coordinate from `.../tiles/{tx}/{ty}.png`.
///
/// Query strings and fragments are ignored. Anything else is not a tile request.
pub fn parse_tile_url(url: &str) -> Option<TileCoord> {
    let path = url.split(['?', '#']).next()?;
    let mut segments = path.rsplit('/');

    let file = segments.next()?;
    let x = segments.next()?;
    if segments.next()? != TILES_SEGMENT {
        return None;
    }

    let y = file.strip_suffix(TILE_EXTENSION)?;
    Some(TileCoord::new(parse_index(x)?, parse_index(y)?))
}

fn parse_index(segment: &str) -> Option<u32> {
    if segment.is_empty() || !segment.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    segment.parse().ok()
}
