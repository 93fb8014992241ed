use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{DomainError, DomainResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TileCoord {
    pub x: u32,
    pub y: u32,
}

impl TileCoord {
    #[must_use]
    pub fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }

    pub fn validate_bounds(&self, tiles_per_axis: u32) -> DomainResult<()> {
        if self.x >= tiles_per_axis || self.y >= tiles_per_axis {
            return Err(DomainError::OutOfBounds(format!(
                "Tile {self} lies outside the {tiles_per_axis}x{tiles_per_axis} tile grid"
            )));
        }
        Ok(())
    }
}

impl fmt::Display for TileCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.x, self.y)
    }
}

/// Pixel coordinate within a single tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PixelCoord {
    pub x: u32,
    pub y: u32,
}

impl PixelCoord {
    #[must_use]
    pub fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }

    pub fn validate(&self, tile_size: u32) -> DomainResult<()> {
        if self.x >= tile_size || self.y >= tile_size {
            return Err(DomainError::Range(format!(
                "Pixel coordinates ({}, {}) exceed tile size {tile_size}",
                self.x, self.y
            )));
        }
        Ok(())
    }
}

/// Position in the flattened, tile-independent pixel space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WorldCoord {
    pub x: u32,
    pub y: u32,
}

impl WorldCoord {
    #[must_use]
    pub fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }

    pub fn from_tile_and_pixel(
        tile: TileCoord,
        pixel: PixelCoord,
        tile_size: u32,
    ) -> DomainResult<Self> {
        Ok(Self::new(
            to_world(tile.x, pixel.x, tile_size)?,
            to_world(tile.y, pixel.y, tile_size)?,
        ))
    }

    #[must_use]
    pub fn to_tile_coord(&self, tile_size: u32) -> TileCoord {
        TileCoord::new(self.x / tile_size, self.y / tile_size)
    }

    #[must_use]
    pub fn to_pixel_coord(&self, tile_size: u32) -> PixelCoord {
        PixelCoord::new(self.x % tile_size, self.y % tile_size)
    }
}

impl fmt::Display for WorldCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Server-space position as the host site reports it: tile plus pixel within the tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "[u32; 4]", into = "[u32; 4]")]
pub struct Anchor {
    pub tile: TileCoord,
    pub pixel: PixelCoord,
}

impl Anchor {
    #[must_use]
    pub fn new(tile_x: u32, tile_y: u32, pixel_x: u32, pixel_y: u32) -> Self {
        Self {
            tile: TileCoord::new(tile_x, tile_y),
            pixel: PixelCoord::new(pixel_x, pixel_y),
        }
    }

    pub fn validate(&self, tile_size: u32, tiles_per_axis: u32) -> DomainResult<()> {
        self.pixel.validate(tile_size)?;
        self.tile.validate_bounds(tiles_per_axis)
    }

    pub fn to_world(&self, tile_size: u32) -> DomainResult<WorldCoord> {
        WorldCoord::from_tile_and_pixel(self.tile, self.pixel, tile_size)
    }

    #[must_use]
    pub fn from_world(world: WorldCoord, tile_size: u32) -> Self {
        Self {
            tile: world.to_tile_coord(tile_size),
            pixel: world.to_pixel_coord(tile_size),
        }
    }
}

impl From<[u32; 4]> for Anchor {
    fn from([tile_x, tile_y, pixel_x, pixel_y]: [u32; 4]) -> Self {
        Self::new(tile_x, tile_y, pixel_x, pixel_y)
    }
}

impl From<Anchor> for [u32; 4] {
    fn from(anchor: Anchor) -> Self {
        [anchor.tile.x, anchor.tile.y, anchor.pixel.x, anchor.pixel.y]
    }
}

impl fmt::Display for Anchor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{},{},{},{}",
            self.tile.x, self.tile.y, self.pixel.x, self.pixel.y
        )
    }
}

/// Parses `"tx,ty,px,py"`, the same form `Display` writes.
impl FromStr for Anchor {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts = s
            .split(',')
            .map(|part| part.trim().parse::<u32>())
            .collect::<Result<Vec<u32>, _>>()
            .map_err(|e| DomainError::Range(format!("Invalid anchor '{s}': {e}")))?;

        match parts.as_slice() {
            [tile_x, tile_y, pixel_x, pixel_y] => {
                Ok(Self::new(*tile_x, *tile_y, *pixel_x, *pixel_y))
            }
            _ => Err(DomainError::Range(format!(
                "Anchor '{s}' needs four comma-separated numbers"
            ))),
        }
    }
}

/// Flattens one axis of a tile/pixel pair into world space.
pub fn to_world(tile: u32, pixel: u32, tile_size: u32) -> DomainResult<u32> {
    if pixel >= tile_size {
        return Err(DomainError::Range(format!(
            "Pixel {pixel} must be below tile size {tile_size}"
        )));
    }
    tile.checked_mul(tile_size)
        .and_then(|origin| origin.checked_add(pixel))
        .ok_or_else(|| {
            DomainError::Range(format!(
                "Tile {tile} with pixel {pixel} overflows world space"
            ))
        })
}

/// Splits one world axis back into `(tile, pixel)`.
#[must_use]
pub fn to_tile_pixel(world: u32, tile_size: u32) -> (u32, u32) {
    (world / tile_size, world % tile_size)
}
