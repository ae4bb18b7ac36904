//! Collaborators that turn a job's raster input into an open raster.

use std::path::{Path, PathBuf};

use orbis_geodesy::BoundingBox;
use orbis_raster::{RasterError, RasterSource};

/// Opens raster files.
pub trait RasterAccess: Send + Sync {
    fn open(&self, path: &Path) -> Result<Box<dyn RasterSource>, RasterError>;
}

impl<F> RasterAccess for F
where
    F: Fn(&Path) -> Result<Box<dyn RasterSource>, RasterError> + Send + Sync,
{
    fn open(&self, path: &Path) -> Result<Box<dyn RasterSource>, RasterError> {
        self(path)
    }
}

/// Opens GeoTIFF rasters from disk.
#[derive(Clone, Copy, Debug, Default)]
pub struct TiffRasterAccess;

impl RasterAccess for TiffRasterAccess {
    fn open(&self, path: &Path) -> Result<Box<dyn RasterSource>, RasterError> {
        Ok(Box::new(orbis_raster::open(path)?))
    }
}

/// A request for a raster product covering `bbox` at a given output size.
#[derive(Clone, Debug, PartialEq)]
pub struct ProductRequest {
    pub product_id: String,
    pub bbox: BoundingBox,
    pub width: u32,
    pub height: u32,
    /// File extension of the product image, e.g. `tif`.
    pub format: String,
}

impl ProductRequest {
    pub fn new(
        product_id: impl Into<String>,
        bbox: BoundingBox,
        width: u32,
        height: u32,
        format: impl Into<String>,
    ) -> Self {
        Self {
            product_id: product_id.into(),
            bbox,
            width,
            height,
            format: format.into(),
        }
    }

    /// File name the product is cached under:
    /// `{product}_{lon0}_{lat0}_{lon1}_{lat1}_{w}x{h}.{format}`.
    pub fn cache_key(&self) -> String {
        format!(
            "{}_{}_{}x{}.{}",
            self.product_id,
            self.bbox.to_string().replace(',', "_"),
            self.width,
            self.height,
            self.format
        )
    }
}

/// Resolves a product request to a local raster file.
pub trait ProductAcquisition: Send + Sync {
    fn resolve(&self, request: &ProductRequest) -> Result<PathBuf, RasterError>;
}

impl<F> ProductAcquisition for F
where
    F: Fn(&ProductRequest) -> Result<PathBuf, RasterError> + Send + Sync,
{
    fn resolve(&self, request: &ProductRequest) -> Result<PathBuf, RasterError> {
        self(request)
    }
}

/// Looks products up in a directory populated by an external fetcher.
#[derive(Clone, Debug)]
pub struct LocalProductCache {
    root: PathBuf,
}

impl LocalProductCache {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn path_for(&self, request: &ProductRequest) -> PathBuf {
        self.root.join(request.cache_key())
    }
}

impl ProductAcquisition for LocalProductCache {
    fn resolve(&self, request: &ProductRequest) -> Result<PathBuf, RasterError> {
        if request.product_id.is_empty() {
            return Err(RasterError::FileNotSpecified);
        }
        let path = self.path_for(request);
        if !path.is_file() {
            return Err(RasterError::FileNotFound(path));
        }
        Ok(path)
    }
}
