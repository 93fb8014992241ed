use serde_with::{DeserializeFromStr, SerializeDisplay};
use std::{fmt, str::FromStr};

use crate::coords::{PixelCoord, TileCoord};
use crate::error::{DomainError, DomainResult};

/// Index of one chunk inside a template's chunk map.
///
/// Rendered as `"TTTT,TTTT,PPP,PPP"`: zero-padded tile X, tile Y, then the
/// chunk's local pixel offset inside that tile. Field order makes the derived
/// ordering agree with the string ordering for in-range values.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, SerializeDisplay, DeserializeFromStr,
)]
pub struct ChunkKey {
    pub tile: TileCoord,
    pub local: PixelCoord,
}

impl ChunkKey {
    #[must_use]
    pub fn new(tile_x: u32, tile_y: u32, local_x: u32, local_y: u32) -> Self {
        Self {
            tile: TileCoord::new(tile_x, tile_y),
            local: PixelCoord::new(local_x, local_y),
        }
    }

    #[must_use]
    pub fn matches_tile(&self, tile: TileCoord) -> bool {
        self.tile == tile
    }
}

impl fmt::Display for ChunkKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:04},{:04},{:03},{:03}",
            self.tile.x, self.tile.y, self.local.x, self.local.y
        )
    }
}

impl FromStr for ChunkKey {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split(',').collect();
        let [tile_x, tile_y, local_x, local_y] = parts.as_slice() else {
            return Err(DomainError::InvalidChunkKey(format!(
                "Expected format 'TTTT,TTTT,PPP,PPP', got '{s}'"
            )));
        };

        Ok(Self::new(
            parse_component(tile_x, s)?,
            parse_component(tile_y, s)?,
            parse_component(local_x, s)?,
            parse_component(local_y, s)?,
        ))
    }
}

fn parse_component(part: &str, key: &str) -> DomainResult<u32> {
    if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
        return Err(DomainError::InvalidChunkKey(format!(
            "Component '{part}' of '{key}' is not a non-negative integer"
        )));
    }
    part.parse::<u32>()
        .map_err(|e| DomainError::InvalidChunkKey(format!("Component '{part}' of '{key}': {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_zero_padded() {
        assert_eq!(ChunkKey::new(1, 23, 4, 998).to_string(), "0001,0023,004,998");
        assert_eq!(ChunkKey::new(0, 0, 0, 0).to_string(), "0000,0000,000,000");
    }

    #[test]
    fn parses_back_exactly() {
        for key in [
            ChunkKey::new(0, 0, 0, 0),
            ChunkKey::new(2047, 2047, 999, 999),
            ChunkKey::new(12, 3, 45, 6),
        ] {
            assert_eq!(key.to_string().parse::<ChunkKey>(), Ok(key));
        }
    }

    #[test]
    fn rejects_malformed_keys() {
        for bad in ["", "1,2,3", "1,2,3,4,5", "a,0,0,0", "-1,0,0,0", "0,,0,0"] {
            assert!(
                matches!(bad.parse::<ChunkKey>(), Err(DomainError::InvalidChunkKey(_))),
                "{bad} should not parse"
            );
        }
    }

    #[test]
    fn ordering_matches_string_ordering() {
        let mut keys = vec![
            ChunkKey::new(1, 0, 0, 0),
            ChunkKey::new(0, 1, 0, 0),
            ChunkKey::new(0, 0, 5, 0),
            ChunkKey::new(0, 0, 0, 5),
        ];
        let mut strings: Vec<String> = keys.iter().map(ToString::to_string).collect();
        keys.sort();
        strings.sort();
        let sorted: Vec<String> = keys.iter().map(ToString::to_string).collect();
        assert_eq!(sorted, strings);
    }
}
