//! Terrain generation error types.

use orbis_geodesy::GeodesyError;
use orbis_mesh::MeshError;
use orbis_raster::RasterError;

/// Coarse classification of a [`TerrainError`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// No raster path was given.
    FileNotSpecified,
    /// The raster file does not exist.
    FileNotFound,
    /// The raster could not be read or decoded.
    FileRead,
    /// The raster is not a usable elevation source, or is missing.
    FileFormat,
    /// The request itself is invalid (bad downsample, bad bounding box, ...).
    Domain,
}

/// Errors raised by mesh generation and height rescaling.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TerrainError {
    #[error(transparent)]
    Raster(#[from] RasterError),

    #[error(transparent)]
    Geodesy(#[from] GeodesyError),

    #[error(transparent)]
    Mesh(#[from] MeshError),

    /// Spherical generation indexes the raster by powers of two only.
    #[error("downsample factor {0} is not a power of two")]
    NonPowerOfTwoDownsample(u32),

    /// `2^exponent` does not fit a 32-bit downsample factor.
    #[error("downsample exponent {0} is too large")]
    DownsampleOverflow(u32),

    /// Rescaling divides by the reference height scale.
    #[error("reference height scale must be non-zero")]
    ZeroReferenceScale,
}

impl TerrainError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Raster(e) => match e {
                RasterError::FileNotSpecified => ErrorKind::FileNotSpecified,
                RasterError::FileNotFound(_) => ErrorKind::FileNotFound,
                RasterError::FileRead { .. } => ErrorKind::FileRead,
                RasterError::FileFormat(_) | RasterError::WrongLayout { .. } => {
                    ErrorKind::FileFormat
                }
                RasterError::OutOfBounds { .. } | RasterError::BufferSize { .. } => {
                    ErrorKind::Domain
                }
            },
            Self::Geodesy(_)
            | Self::Mesh(_)
            | Self::NonPowerOfTwoDownsample(_)
            | Self::DownsampleOverflow(_)
            | Self::ZeroReferenceScale => ErrorKind::Domain,
        }
    }

    /// True for transient I/O failures worth retrying. Caller errors and
    /// unusable rasters are not.
    pub fn is_retryable(&self) -> bool {
        matches!(self.kind(), ErrorKind::FileNotFound | ErrorKind::FileRead)
    }
}
