//! Decoded elevation grids and downsampled sampling.

use crate::RasterSource;
use crate::decode::decode_samples;
use crate::error::RasterError;
use crate::metadata::{RasterLayout, RasterMetadata};

/// A fully decoded elevation raster, row-major, one height per pixel.
///
/// 16-bit sources hold normalized `[0, 1]` values, 32-bit sources hold the
/// raw float samples.
#[derive(Clone, Debug)]
pub struct HeightField {
    metadata: RasterMetadata,
    samples: Vec<f32>,
}

impl HeightField {
    /// Validate `source` as an elevation raster and decode every row or tile.
    pub fn load(source: &mut dyn RasterSource) -> Result<Self, RasterError> {
        let metadata = source.metadata().clone();
        metadata.validate_elevation()?;

        let width = metadata.width as usize;
        let height = metadata.height as usize;
        let bits = metadata.bits_per_sample;

        let samples = match metadata.layout {
            RasterLayout::Strips { scanline_bytes } => {
                let mut buf = vec![0u8; scanline_bytes];
                let mut samples = Vec::with_capacity(width * height);
                for row in 0..metadata.height {
                    source.read_row(&mut buf, row)?;
                    let line = decode_samples(&buf, bits)?;
                    samples.extend_from_slice(&line[..width.min(line.len())]);
                }
                samples
            }
            RasterLayout::Tiles {
                tile_width,
                tile_height,
                tile_bytes,
            } => {
                let mut buf = vec![0u8; tile_bytes];
                let mut samples = vec![0.0; width * height];
                let (tw, th) = (tile_width as usize, tile_height as usize);
                for ty in (0..height).step_by(th.max(1)) {
                    for tx in (0..width).step_by(tw.max(1)) {
                        source.read_tile(&mut buf, tx as u32, ty as u32)?;
                        let tile = decode_samples(&buf, bits)?;
                        let cols = tw.min(width - tx);
                        for r in 0..th.min(height - ty) {
                            let dst = (ty + r) * width + tx;
                            samples[dst..dst + cols].copy_from_slice(&tile[r * tw..r * tw + cols]);
                        }
                    }
                }
                samples
            }
        };

        if samples.len() != width * height {
            return Err(RasterError::FileFormat(format!(
                "decoded {} samples for a {width}x{height} raster",
                samples.len()
            )));
        }

        Ok(Self { metadata, samples })
    }

    /// Build a 32-bit height field from already decoded samples. Fields need
    /// at least one pixel.
    pub fn from_samples(width: u32, height: u32, samples: Vec<f32>) -> Result<Self, RasterError> {
        let expected = width as usize * height as usize;
        if samples.len() != expected {
            return Err(RasterError::BufferSize {
                expected,
                actual: samples.len(),
            });
        }
        let metadata = RasterMetadata::strips(width, height, 32, 1);
        metadata.check_dimensions()?;
        Ok(Self { metadata, samples })
    }

    pub fn metadata(&self) -> &RasterMetadata {
        &self.metadata
    }

    pub fn width(&self) -> u32 {
        self.metadata.width
    }

    pub fn height(&self) -> u32 {
        self.metadata.height
    }

    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    /// Sample at `(x, y)`, clamped to the raster edges.
    pub fn get(&self, x: u32, y: u32) -> f32 {
        let x = x.min(self.metadata.width.saturating_sub(1)) as usize;
        let y = y.min(self.metadata.height.saturating_sub(1)) as usize;
        self.samples[y * self.metadata.width as usize + x]
    }

    /// Height at nominal pixel `(x, y)` for the given downsample factor.
    ///
    /// A factor of 1 (or 0) reads the pixel directly. Larger factors average
    /// a `(downsample + 1)`-wide square window centred on the pixel, clipped
    /// to the raster.
    pub fn sample(&self, x: u32, y: u32, downsample: u32) -> f32 {
        if downsample <= 1 {
            return self.get(x, y);
        }

        let (x0, x1) = window(x, downsample, self.metadata.width);
        let (y0, y1) = window(y, downsample, self.metadata.height);
        let width = self.metadata.width as usize;

        let mut sum = 0.0f64;
        let mut count = 0u32;
        for row in y0..=y1 {
            let line = &self.samples[row as usize * width..(row as usize + 1) * width];
            for &s in &line[x0 as usize..=x1 as usize] {
                sum += f64::from(s);
                count += 1;
            }
        }
        (sum / f64::from(count.max(1))) as f32
    }

    /// Smallest and largest sample.
    pub fn min_max(&self) -> (f32, f32) {
        self.samples
            .iter()
            .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), &s| {
                (lo.min(s), hi.max(s))
            })
    }
}

/// Inclusive sample range of a `downsample + 1` window centred on `center`.
fn window(center: u32, downsample: u32, extent: u32) -> (u32, u32) {
    let last = i64::from(extent.saturating_sub(1));
    let start = i64::from(center) - i64::from(downsample / 2);
    let end = start + i64::from(downsample);
    (start.clamp(0, last) as u32, end.clamp(0, last) as u32)
}
