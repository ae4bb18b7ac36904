//! Raster metadata read once per handle.

use crate::error::RasterError;

/// How sample data is laid out in the file.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RasterLayout {
    /// Scanline/strip encoding, read one row at a time.
    Strips {
        /// Bytes in one full row.
        scanline_bytes: usize,
    },
    /// Tile encoding, read one tile at a time.
    Tiles {
        tile_width: u32,
        tile_height: u32,
        /// Bytes in one full (padded) tile.
        tile_bytes: usize,
    },
}

/// Dimensions and encoding of an open raster.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RasterMetadata {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Bits per sample. Elevation rasters use 16 or 32.
    pub bits_per_sample: u16,
    /// Samples per pixel. Elevation rasters have exactly one.
    pub samples_per_pixel: u16,
    /// Strip or tile layout.
    pub layout: RasterLayout,
}

impl RasterMetadata {
    /// Metadata for a strip-encoded raster.
    pub fn strips(width: u32, height: u32, bits_per_sample: u16, samples_per_pixel: u16) -> Self {
        let scanline_bytes =
            width as usize * usize::from(samples_per_pixel) * usize::from(bits_per_sample / 8);
        Self {
            width,
            height,
            bits_per_sample,
            samples_per_pixel,
            layout: RasterLayout::Strips { scanline_bytes },
        }
    }

    /// Metadata for a tile-encoded raster.
    pub fn tiles(
        width: u32,
        height: u32,
        bits_per_sample: u16,
        samples_per_pixel: u16,
        tile_width: u32,
        tile_height: u32,
    ) -> Self {
        let tile_bytes = tile_width as usize
            * tile_height as usize
            * usize::from(samples_per_pixel)
            * usize::from(bits_per_sample / 8);
        Self {
            width,
            height,
            bits_per_sample,
            samples_per_pixel,
            layout: RasterLayout::Tiles {
                tile_width,
                tile_height,
                tile_bytes,
            },
        }
    }

    /// Bytes occupied by one sample.
    pub fn bytes_per_sample(&self) -> usize {
        usize::from(self.bits_per_sample / 8)
    }

    pub fn is_tiled(&self) -> bool {
        matches!(self.layout, RasterLayout::Tiles { .. })
    }

    /// Reject rasters without pixels and tile layouts with an empty tile.
    pub fn check_dimensions(&self) -> Result<(), RasterError> {
        if self.width == 0 || self.height == 0 {
            return Err(RasterError::FileFormat(format!(
                "raster of {}x{} pixels has no samples",
                self.width, self.height
            )));
        }
        if let RasterLayout::Tiles {
            tile_width,
            tile_height,
            ..
        } = self.layout
            && (tile_width == 0 || tile_height == 0)
        {
            return Err(RasterError::FileFormat(format!(
                "tile size {tile_width}x{tile_height} is empty"
            )));
        }
        Ok(())
    }

    /// Check that the raster can serve as an elevation source: at least one
    /// pixel, 16 or 32 bits per sample and a single sample per pixel.
    pub fn validate_elevation(&self) -> Result<(), RasterError> {
        self.check_dimensions()?;
        if self.bits_per_sample != 16 && self.bits_per_sample != 32 {
            return Err(RasterError::FileFormat(format!(
                "elevation rasters need 16 or 32 bits per sample, got {}",
                self.bits_per_sample
            )));
        }
        if self.samples_per_pixel != 1 {
            return Err(RasterError::FileFormat(format!(
                "elevation rasters need 1 sample per pixel, got {}",
                self.samples_per_pixel
            )));
        }
        Ok(())
    }
}
