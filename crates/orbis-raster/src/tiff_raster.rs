//! TIFF-backed raster handles.

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use tiff::decoder::{ChunkType, Decoder, DecodingResult, Limits};
use tiff::tags::Tag;
use tiff::{ColorType, TiffError};

use crate::RasterSource;
use crate::error::RasterError;
use crate::metadata::{RasterLayout, RasterMetadata};

const SAMPLE_FORMAT_UINT: u32 = 1;
const SAMPLE_FORMAT_FLOAT: u32 = 3;

/// Open the TIFF at `path` and read its metadata.
///
/// # Errors
///
/// - [`RasterError::FileNotSpecified`] for an empty path
/// - [`RasterError::FileNotFound`] if nothing exists at `path`
/// - [`RasterError::FileRead`] if the file cannot be read or is corrupt
/// - [`RasterError::FileFormat`] if the encoding is unsupported
pub fn open(path: &Path) -> Result<TiffRaster, RasterError> {
    TiffRaster::open(path)
}

/// An open TIFF elevation raster.
///
/// Decoded strips or tiles are cached one at a time, so reading consecutive
/// rows of the same strip decodes it once.
pub struct TiffRaster {
    path: PathBuf,
    decoder: Decoder<BufReader<File>>,
    metadata: RasterMetadata,
    /// Rows per strip, or tile height for tiled rasters.
    chunk_height: u32,
    cached_chunk: Option<(u32, Vec<u8>)>,
}

impl TiffRaster {
    /// See [`open`].
    pub fn open(path: &Path) -> Result<Self, RasterError> {
        if path.as_os_str().is_empty() {
            return Err(RasterError::FileNotSpecified);
        }
        if !path.exists() {
            return Err(RasterError::FileNotFound(path.to_path_buf()));
        }

        let file = File::open(path).map_err(|e| RasterError::FileRead {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        let mut decoder = Decoder::new(BufReader::new(file))
            .map_err(|e| map_tiff_error(path, e))?
            .with_limits(Limits::unlimited());

        let (width, height) = decoder.dimensions().map_err(|e| map_tiff_error(path, e))?;
        let (bits_per_sample, samples_per_pixel) =
            match decoder.colortype().map_err(|e| map_tiff_error(path, e))? {
                ColorType::Gray(bits) | ColorType::Palette(bits) => (u16::from(bits), 1),
                ColorType::GrayA(bits) => (u16::from(bits), 2),
                ColorType::RGB(bits) | ColorType::YCbCr(bits) => (u16::from(bits), 3),
                ColorType::RGBA(bits) | ColorType::CMYK(bits) => (u16::from(bits), 4),
                other => {
                    return Err(RasterError::FileFormat(format!(
                        "unsupported colour type {other:?}"
                    )));
                }
            };

        let sample_format = decoder
            .get_tag_u32(Tag::SampleFormat)
            .unwrap_or(SAMPLE_FORMAT_UINT);
        match (bits_per_sample, sample_format) {
            (32, SAMPLE_FORMAT_FLOAT) | (16, SAMPLE_FORMAT_UINT) => {}
            (16 | 32, format) => {
                return Err(RasterError::FileFormat(format!(
                    "{bits_per_sample}-bit samples with sample format {format} are not supported"
                )));
            }
            // Other bit depths are rejected by elevation validation.
            _ => {}
        }

        let (chunk_width, chunk_height) = decoder.chunk_dimensions();
        let bytes_per_pixel = usize::from(samples_per_pixel) * usize::from(bits_per_sample / 8);
        let layout = match decoder.get_chunk_type() {
            ChunkType::Strip => RasterLayout::Strips {
                scanline_bytes: width as usize * bytes_per_pixel,
            },
            ChunkType::Tile => RasterLayout::Tiles {
                tile_width: chunk_width,
                tile_height: chunk_height,
                tile_bytes: chunk_width as usize * chunk_height as usize * bytes_per_pixel,
            },
        };

        let metadata = RasterMetadata {
            width,
            height,
            bits_per_sample,
            samples_per_pixel,
            layout,
        };
        tracing::debug!(
            path = %path.display(),
            width,
            height,
            bits_per_sample,
            tiled = metadata.is_tiled(),
            "opened raster"
        );

        Ok(Self {
            path: path.to_path_buf(),
            decoder,
            metadata,
            chunk_height: chunk_height.max(1),
            cached_chunk: None,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Decode a strip or tile into little-endian bytes, reusing the cache.
    fn chunk(&mut self, index: u32) -> Result<&[u8], RasterError> {
        let cached = matches!(&self.cached_chunk, Some((i, _)) if *i == index);
        if !cached {
            let decoded = self
                .decoder
                .read_chunk(index)
                .map_err(|e| map_tiff_error(&self.path, e))?;
            let bytes = match decoded {
                DecodingResult::U16(data) => data.iter().flat_map(|v| v.to_le_bytes()).collect(),
                DecodingResult::F32(data) => data.iter().flat_map(|v| v.to_le_bytes()).collect(),
                _ => {
                    return Err(RasterError::FileFormat(
                        "samples must be 16-bit unsigned or 32-bit float".to_string(),
                    ));
                }
            };
            self.cached_chunk = Some((index, bytes));
        }
        match &self.cached_chunk {
            Some((_, bytes)) => Ok(bytes),
            None => Err(RasterError::FileRead {
                path: self.path.clone(),
                reason: format!("chunk {index} was not decoded"),
            }),
        }
    }

    fn out_of_bounds(&self, x: u32, y: u32) -> RasterError {
        RasterError::OutOfBounds {
            x,
            y,
            width: self.metadata.width,
            height: self.metadata.height,
        }
    }
}

impl RasterSource for TiffRaster {
    fn metadata(&self) -> &RasterMetadata {
        &self.metadata
    }

    fn read_row(&mut self, buf: &mut [u8], row: u32) -> Result<(), RasterError> {
        let RasterLayout::Strips { scanline_bytes } = self.metadata.layout else {
            return Err(RasterError::WrongLayout { expected: "strip" });
        };
        if row >= self.metadata.height {
            return Err(self.out_of_bounds(0, row));
        }
        if buf.len() < scanline_bytes {
            return Err(RasterError::BufferSize {
                expected: scanline_bytes,
                actual: buf.len(),
            });
        }

        let strip = row / self.chunk_height;
        let offset = (row % self.chunk_height) as usize * scanline_bytes;
        let path = self.path.clone();
        let bytes = self.chunk(strip)?;
        let line = bytes
            .get(offset..offset + scanline_bytes)
            .ok_or_else(|| RasterError::FileRead {
                path,
                reason: format!("strip {strip} is shorter than expected"),
            })?;
        buf[..scanline_bytes].copy_from_slice(line);
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
            return Err(self.out_of_bounds(x, y));
        }
        if buf.len() < tile_bytes {
            return Err(RasterError::BufferSize {
                expected: tile_bytes,
                actual: buf.len(),
            });
        }

        let tiles_across = width.div_ceil(tile_width);
        let (tile_x, tile_y) = (x / tile_width, y / tile_height);
        let index = tile_y * tiles_across + tile_x;

        // Edge tiles decode cropped to the image; pad them back to full size.
        let cols = tile_width.min(width - tile_x * tile_width) as usize;
        let rows = tile_height.min(height - tile_y * tile_height) as usize;
        let pixel = tile_bytes / (tile_width as usize * tile_height as usize);
        let tile_row_bytes = tile_width as usize * pixel;

        let path = self.path.clone();
        let bytes = self.chunk(index)?;
        if bytes.len() < rows * cols * pixel {
            return Err(RasterError::FileRead {
                path,
                reason: format!("tile {index} is shorter than expected"),
            });
        }
        buf[..tile_bytes].fill(0);
        for r in 0..rows {
            let src = r * cols * pixel;
            let dst = r * tile_row_bytes;
            buf[dst..dst + cols * pixel].copy_from_slice(&bytes[src..src + cols * pixel]);
        }
        Ok(())
    }
}

fn map_tiff_error(path: &Path, err: TiffError) -> RasterError {
    match err {
        TiffError::UnsupportedError(e) => RasterError::FileFormat(e.to_string()),
        other => RasterError::FileRead {
            path: path.to_path_buf(),
            reason: other.to_string(),
        },
    }
}
