use std::iter;

use crate::color::{TRANSPARENT_RGBA, pack_rgba};
use crate::error::{DomainError, DomainResult};

/// Row-major RGBA image, one packed `u32` per pixel (see [`pack_rgba`]).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RgbaBitmap {
    width: u32,
    height: u32,
    pixels: Vec<u32>,
}

impl RgbaBitmap {
    #[must_use]
    pub fn transparent(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![TRANSPARENT_RGBA; width as usize * height as usize],
        }
    }

    pub fn from_pixels(width: u32, height: u32, pixels: Vec<u32>) -> DomainResult<Self> {
        let expected = width as usize * height as usize;
        if pixels.len() != expected {
            return Err(DomainError::CodecError(format!(
                "Expected {expected} pixels for {width}x{height}, got {}",
                pixels.len()
            )));
        }
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    pub fn from_rgba_bytes(width: u32, height: u32, bytes: &[u8]) -> DomainResult<Self> {
        if bytes.len() % 4 != 0 {
            return Err(DomainError::CodecError(format!(
                "RGBA byte buffer length {} is not a multiple of 4",
                bytes.len()
            )));
        }
        let pixels = bytes
            .chunks_exact(4)
            .map(|px| match px {
                [r, g, b, a] => pack_rgba(*r, *g, *b, *a),
                _ => TRANSPARENT_RGBA,
            })
            .collect();
        Self::from_pixels(width, height, pixels)
    }

    #[must_use]
    pub fn to_rgba_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(self.pixels.len() * 4);
        for &pixel in &self.pixels {
            bytes.extend_from_slice(&pixel.to_le_bytes());
        }
        bytes
    }

    #[must_use]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[must_use]
    pub fn height(&self) -> u32 {
        self.height
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    #[must_use]
    pub fn pixels(&self) -> &[u32] {
        &self.pixels
    }

    fn index(&self, x: u32, y: u32) -> Option<usize> {
        (x < self.width && y < self.height)
            .then(|| y as usize * self.width as usize + x as usize)
    }

    #[must_use]
    pub fn get(&self, x: u32, y: u32) -> Option<u32> {
        self.index(x, y)
            .and_then(|index| self.pixels.get(index).copied())
    }

    /// Writes one pixel; out-of-range coordinates are ignored.
    pub fn set(&mut self, x: u32, y: u32, rgba: u32) {
        if let Some(slot) = self
            .index(x, y)
            .and_then(|index| self.pixels.get_mut(index))
        {
            *slot = rgba;
        }
    }

    /// Nearest-neighbour upscale, each pixel becoming a `factor x factor` block.
    #[must_use]
    pub fn upscale(&self, factor: u32) -> Self {
        if factor <= 1 {
            return self.clone();
        }
        let width = self.width * factor;
        let height = self.height * factor;
        let mut pixels = Vec::with_capacity(width as usize * height as usize);
        for row in self.pixels.chunks_exact(self.width.max(1) as usize) {
            let mut scaled_row = Vec::with_capacity(width as usize);
            for &pixel in row {
                scaled_row.extend(iter::repeat_n(pixel, factor as usize));
            }
            for _ in 0..factor {
                pixels.extend_from_slice(&scaled_row);
            }
        }
        Self {
            width,
            height,
            pixels,
        }
    }
}
