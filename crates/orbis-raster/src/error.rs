//! Raster access error types.

use std::path::PathBuf;

/// Errors raised while opening, validating, or reading a raster.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RasterError {
    /// The path was empty.
    #[error("no raster file specified")]
    FileNotSpecified,

    /// Nothing exists at the path.
    #[error("raster file not found: {}", .0.display())]
    FileNotFound(PathBuf),

    /// The file exists but could not be read or decoded.
    #[error("failed to read raster {}: {reason}", path.display())]
    FileRead { path: PathBuf, reason: String },

    /// The raster encoding is not usable as an elevation source.
    #[error("unsupported raster format: {0}")]
    FileFormat(String),

    /// A row, tile, or pixel outside the raster was requested.
    #[error("pixel ({x}, {y}) is outside the {width}x{height} raster")]
    OutOfBounds {
        x: u32,
        y: u32,
        width: u32,
        height: u32,
    },

    /// The caller's buffer cannot hold the requested row or tile.
    #[error("buffer of {actual} bytes is smaller than the required {expected}")]
    BufferSize { expected: usize, actual: usize },

    /// Row access on a tiled raster, or tile access on a strip raster.
    #[error("raster is not {expected}-encoded")]
    WrongLayout { expected: &'static str },
}

impl RasterError {
    /// True for failures of the underlying file rather than of the request.
    pub fn is_io(&self) -> bool {
        matches!(self, Self::FileNotFound(_) | Self::FileRead { .. })
    }
}
