//! In-memory raster source.

use crate::RasterSource;
use crate::error::RasterError;
use crate::metadata::{RasterLayout, RasterMetadata};

/// A raster held entirely in memory as row-major little-endian samples.
///
/// Serves synthetic elevation data and exposes either layout, so code paths
/// for strip and tile rasters can be driven without files.
#[derive(Clone, Debug)]
pub struct MemoryRaster {
    metadata: RasterMetadata,
    bytes: Vec<u8>,
}

impl MemoryRaster {
    /// Wrap raw row-major sample bytes.
    ///
    /// Returns [`RasterError::BufferSize`] if `bytes` does not cover
    /// `width * height` pixels.
    pub fn new(metadata: RasterMetadata, bytes: Vec<u8>) -> Result<Self, RasterError> {
        let expected = metadata.width as usize
            * metadata.height as usize
            * usize::from(metadata.samples_per_pixel)
            * metadata.bytes_per_sample();
        if bytes.len() < expected {
            return Err(RasterError::BufferSize {
                expected,
                actual: bytes.len(),
            });
        }
        Ok(Self { metadata, bytes })
    }

    /// A strip-encoded 32-bit float raster.
    pub fn from_f32(width: u32, height: u32, samples: &[f32]) -> Result<Self, RasterError> {
        let bytes = samples.iter().flat_map(|s| s.to_le_bytes()).collect();
        Self::new(RasterMetadata::strips(width, height, 32, 1), bytes)
    }

    /// A strip-encoded 16-bit unsigned raster.
    pub fn from_u16(width: u32, height: u32, samples: &[u16]) -> Result<Self, RasterError> {
        let bytes = samples.iter().flat_map(|s| s.to_le_bytes()).collect();
        Self::new(RasterMetadata::strips(width, height, 16, 1), bytes)
    }

    /// A 32-bit raster where every sample is `value`.
    pub fn constant(width: u32, height: u32, value: f32) -> Self {
        let bytes = std::iter::repeat_n(value.to_le_bytes(), width as usize * height as usize)
            .flatten()
            .collect();
        Self {
            metadata: RasterMetadata::strips(width, height, 32, 1),
            bytes,
        }
    }

    /// Re-expose the same samples with a tile layout.
    pub fn with_tiles(self, tile_width: u32, tile_height: u32) -> Self {
        let m = &self.metadata;
        let metadata = RasterMetadata::tiles(
            m.width,
            m.height,
            m.bits_per_sample,
            m.samples_per_pixel,
            tile_width,
            tile_height,
        );
        Self {
            metadata,
            bytes: self.bytes,
        }
    }

    fn pixel_bytes(&self) -> usize {
        usize::from(self.metadata.samples_per_pixel) * self.metadata.bytes_per_sample()
    }
}

impl RasterSource for MemoryRaster {
    fn metadata(&self) -> &RasterMetadata {
        &self.metadata
    }

    fn read_row(&mut self, buf: &mut [u8], row: u32) -> Result<(), RasterError> {
        let RasterLayout::Strips { scanline_bytes } = self.metadata.layout else {
            return Err(RasterError::WrongLayout { expected: "strip" });
        };
        if row >= self.metadata.height {
            return Err(RasterError::OutOfBounds {
                x: 0,
                y: row,
                width: self.metadata.width,
                height: self.metadata.height,
            });
        }
        if buf.len() < scanline_bytes {
            return Err(RasterError::BufferSize {
                expected: scanline_bytes,
                actual: buf.len(),
            });
        }
        let start = row as usize * scanline_bytes;
        buf[..scanline_bytes].copy_from_slice(&self.bytes[start..start + scanline_bytes]);
        Ok(())
    }

    fn read_tile(&mut self, buf: &mut [u8], x: u32, y: u32) -> Result<(), RasterError> {
        let RasterLayout::Tiles {
            tile_width,
            tile_height,
            tile_bytes,
        } = self.metadata.layout
        else {
            return Err(RasterError::WrongLayout { expected: "tile" });
        };
        self.metadata.check_dimensions()?;
        let (width, height) = (self.metadata.width, self.metadata.height);
        if x >= width || y >= height {
            return Err(RasterError::OutOfBounds {
                x,
                y,
                width,
                height,
            });
        }
        if buf.len() < tile_bytes {
            return Err(RasterError::BufferSize {
                expected: tile_bytes,
                actual: buf.len(),
            });
        }

        let pixel = self.pixel_bytes();
        let origin_x = x - x % tile_width;
        let origin_y = y - y % tile_height;
        let cols = tile_width.min(width - origin_x) as usize;
        let rows = tile_height.min(height - origin_y) as usize;
        let tile_row_bytes = tile_width as usize * pixel;

        buf[..tile_bytes].fill(0);
        for r in 0..rows {
            let src = ((origin_y as usize + r) * width as usize + origin_x as usize) * pixel;
            let dst = r * tile_row_bytes;
            buf[dst..dst + cols * pixel].copy_from_slice(&self.bytes[src..src + cols * pixel]);
        }
        Ok(())
    }
}
