use serde::{Deserialize, Serialize};
use serde_with::{DeserializeFromStr, SerializeDisplay};
use std::{fmt, str::FromStr};

use crate::error::DomainError;

/// Reserved "leave this pixel blank" marker, `#DEFACE`.
pub const SENTINEL_RGB: RgbColor = RgbColor::new(222, 250, 206);

pub const TRANSPARENT_RGBA: u32 = 0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RgbColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl RgbColor {
    #[must_use]
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    #[must_use]
    pub fn to_rgba_u32(&self) -> u32 {
        pack_rgba(self.r, self.g, self.b, 255)
    }

    #[must_use]
    pub fn from_rgba_u32(rgba: u32) -> Self {
        let [r, g, b, _] = unpack_rgba(rgba);
        Self { r, g, b }
    }

    #[must_use]
    pub fn distance_squared(&self, other: &RgbColor) -> u32 {
        let dr = i32::from(self.r) - i32::from(other.r);
        let dg = i32::from(self.g) - i32::from(other.g);
        let db = i32::from(self.b) - i32::from(other.b);
        (dr * dr + dg * dg + db * db) as u32
    }

    #[must_use]
    pub fn is_sentinel(&self) -> bool {
        *self == SENTINEL_RGB
    }
}

impl fmt::Display for RgbColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{},{}", self.r, self.g, self.b)
    }
}

impl FromStr for RgbColor {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut channels = s.split(',').map(|part| part.trim().parse::<u8>());
        match (
            channels.next(),
            channels.next(),
            channels.next(),
            channels.next(),
        ) {
            (Some(Ok(r)), Some(Ok(g)), Some(Ok(b)), None) => Ok(Self::new(r, g, b)),
            _ => Err(DomainError::InvalidColorKey(format!(
                "Expected format 'r,g,b', got '{s}'"
            ))),
        }
    }
}

/// Bucket a quantized template pixel is tallied under.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, SerializeDisplay, DeserializeFromStr,
)]
pub enum ColorKey {
    Rgb(RgbColor),
    Sentinel,
    Other,
}

impl ColorKey {
    pub const OTHER: &'static str = "other";

    #[must_use]
    pub fn from_rgb(rgb: RgbColor) -> Self {
        if rgb.is_sentinel() {
            Self::Sentinel
        } else {
            Self::Rgb(rgb)
        }
    }

    #[must_use]
    pub fn is_drawable(&self) -> bool {
        matches!(self, Self::Rgb(_))
    }
}

impl fmt::Display for ColorKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Rgb(rgb) => write!(f, "{rgb}"),
            Self::Sentinel => write!(f, "{SENTINEL_RGB}"),
            Self::Other => f.write_str(Self::OTHER),
        }
    }
}

impl FromStr for ColorKey {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == Self::OTHER {
            return Ok(Self::Other);
        }
        s.parse::<RgbColor>().map(Self::from_rgb)
    }
}

#[inline]
#[must_use]
pub fn pack_rgba(r: u8, g: u8, b: u8, a: u8) -> u32 {
    (u32::from(a) << 24) | (u32::from(b) << 16) | (u32::from(g) << 8) | u32::from(r)
}

#[inline]
#[must_use]
pub fn unpack_rgba(rgba: u32) -> [u8; 4] {
    rgba.to_le_bytes()
}

#[inline]
#[must_use]
pub fn alpha_of(rgba: u32) -> u8 {
    (rgba >> 24) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pack_and_unpack_agree() {
        let packed = pack_rgba(1, 2, 3, 4);
        assert_eq!(unpack_rgba(packed), [1, 2, 3, 4]);
        assert_eq!(alpha_of(packed), 4);
        assert_eq!(RgbColor::from_rgba_u32(packed), RgbColor::new(1, 2, 3));
    }

    #[test]
    fn color_key_string_forms() {
        assert_eq!(ColorKey::Rgb(RgbColor::new(0, 0, 0)).to_string(), "0,0,0");
        assert_eq!(ColorKey::Sentinel.to_string(), "222,250,206");
        assert_eq!(ColorKey::Other.to_string(), "other");

        assert_eq!("222,250,206".parse::<ColorKey>(), Ok(ColorKey::Sentinel));
        assert_eq!("other".parse::<ColorKey>(), Ok(ColorKey::Other));
        assert_eq!(
            "237, 28, 36".parse::<ColorKey>(),
            Ok(ColorKey::Rgb(RgbColor::new(237, 28, 36)))
        );
    }

    #[test]
    fn color_key_rejects_garbage() {
        assert!("1,2".parse::<ColorKey>().is_err());
        assert!("1,2,3,4".parse::<ColorKey>().is_err());
        assert!("256,0,0".parse::<ColorKey>().is_err());
        assert!("deface".parse::<ColorKey>().is_err());
    }

    #[test]
    fn color_key_serializes_as_string() {
        let json = serde_json::to_string(&ColorKey::Rgb(RgbColor::new(9, 8, 7))).unwrap();
        assert_eq!(json, "\"9,8,7\"");
        let back: ColorKey = serde_json::from_str(&json).unwrap();
        assert_eq!(back, ColorKey::Rgb(RgbColor::new(9, 8, 7)));
    }
}
