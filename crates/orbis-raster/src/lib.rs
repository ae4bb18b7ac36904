//! Elevation raster access: opening raster files, decoding sample buffers,
//! and sampling heights at power-of-two (or arbitrary) downsample factors.
//!
//! Container decoding is delegated to the `tiff` crate. This crate only
//! consumes the decoded metadata and little-endian sample buffers.

mod decode;
mod error;
mod height_field;
mod memory;
mod metadata;
mod tiff_raster;

pub use decode::decode_samples;
pub use error::RasterError;
pub use height_field::HeightField;
pub use memory::MemoryRaster;
pub use metadata::{RasterLayout, RasterMetadata};
pub use tiff_raster::{TiffRaster, open};

/// A handle to an open elevation raster.
///
/// Strip-encoded rasters are read row by row, tile-encoded rasters tile by
/// tile. Buffers hold little-endian samples. The handle is closed when it is
/// dropped.
pub trait RasterSource: Send {
    /// Metadata read when the handle was opened.
    fn metadata(&self) -> &RasterMetadata;

    /// Read scanline `row` into `buf`. Only valid for strip layouts.
    fn read_row(&mut self, buf: &mut [u8], row: u32) -> Result<(), RasterError>;

    /// Read the tile containing pixel `(x, y)` into `buf`, padded to the full
    /// tile size. Only valid for tile layouts.
    fn read_tile(&mut self, buf: &mut [u8], x: u32, y: u32) -> Result<(), RasterError>;
}
