//! Command-line surface and translation into terrain jobs.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use orbis_config::{CliArgs, Config, RasterConfig};
use orbis_geodesy::{BoundingBox, GeodesyError, SquareAnchor, UvBounds, calculate_uv_bounds};
use orbis_terrain::{
    BaseSectionGenerator, GlobeGenerator, PlanarGenerator, ProductRequest, RasterInput,
    RescaleFrame, SectionGenerator, TerrainGenerator, TerrainJob, TerrainMeshMetadata,
};

/// Generate terrain meshes from elevation rasters.
#[derive(Parser, Debug)]
#[command(name = "orbis", version, about = "Terrain mesh generator")]
pub struct Cli {
    #[command(flatten)]
    pub overrides: CliArgs,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// Whole-planet sphere from an equirectangular raster.
    Globe {
        #[command(flatten)]
        input: InputArgs,
    },
    /// Curved patch covering a bounding box.
    Section {
        /// Region as "lonStart,latStart,lonEnd,latEnd".
        #[arg(long, allow_hyphen_values = true)]
        bbox: BoundingBox,
        #[command(flatten)]
        atlas: AtlasArgs,
        #[command(flatten)]
        input: InputArgs,
    },
    /// Flat heightmap.
    Planar {
        /// Side length of the longer axis (defaults to `terrain.planar_size`).
        #[arg(long)]
        size: Option<f32>,
        #[command(flatten)]
        input: InputArgs,
    },
    /// Constant-radius stand-in for a section, no raster needed.
    Placeholder {
        #[arg(long, allow_hyphen_values = true)]
        bbox: BoundingBox,
        #[command(flatten)]
        atlas: AtlasArgs,
        /// Nominal raster width (defaults to `raster.output_width`).
        #[arg(long)]
        width: Option<u32>,
        /// Nominal raster height (defaults to `raster.output_height`).
        #[arg(long)]
        height: Option<u32>,
    },
    /// Generate at `terrain.reference_height_scale`, then re-exaggerate the
    /// meshes to `terrain.height_scale` without reading the raster again.
    Rescale {
        /// Rescale a section over this region instead of the globe.
        #[arg(long, allow_hyphen_values = true)]
        bbox: Option<BoundingBox>,
        #[command(flatten)]
        atlas: AtlasArgs,
        #[command(flatten)]
        input: InputArgs,
    },
}

/// Where elevation comes from. Without `--raster` the product is looked up
/// in the local product cache.
#[derive(Args, Debug, Clone, Default, PartialEq)]
pub struct InputArgs {
    /// Raster file to read.
    #[arg(long, conflicts_with = "product")]
    pub raster: Option<PathBuf>,

    /// Product id (defaults to `raster.default_product`).
    #[arg(long)]
    pub product: Option<String>,
}

impl InputArgs {
    fn resolve(&self, bbox: BoundingBox, raster: &RasterConfig) -> RasterInput {
        if let Some(path) = &self.raster {
            return RasterInput::Path(path.clone());
        }
        let product = self
            .product
            .clone()
            .unwrap_or_else(|| raster.default_product.clone());
        RasterInput::Product(ProductRequest::new(
            product,
            bbox,
            raster.output_width,
            raster.output_height,
            raster.image_format.clone(),
        ))
    }
}

/// Texture atlas placement of a patch.
#[derive(Args, Debug, Clone, Default, PartialEq)]
pub struct AtlasArgs {
    /// Region the atlas texture was produced for (defaults to `--bbox`).
    /// It is squared up before UVs are computed.
    #[arg(long, allow_hyphen_values = true)]
    pub atlas_bbox: Option<BoundingBox>,

    /// Edge the atlas region stays pinned to when squared up.
    #[arg(long, value_enum, default_value_t = Anchor::Center)]
    pub anchor: Anchor,
}

impl AtlasArgs {
    pub fn uv_bounds(&self, bbox: &BoundingBox) -> Result<UvBounds, GeodesyError> {
        let atlas = self
            .atlas_bbox
            .unwrap_or(*bbox)
            .expand_to_square_clamped(self.anchor.into())?;
        Ok(calculate_uv_bounds(&atlas, bbox))
    }
}

#[derive(ValueEnum, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Anchor {
    TopLeft,
    Top,
    TopRight,
    Left,
    #[default]
    Center,
    Right,
    BottomLeft,
    Bottom,
    BottomRight,
}

impl From<Anchor> for SquareAnchor {
    fn from(anchor: Anchor) -> Self {
        match anchor {
            Anchor::TopLeft => Self::TopLeft,
            Anchor::Top => Self::Top,
            Anchor::TopRight => Self::TopRight,
            Anchor::Left => Self::Left,
            Anchor::Center => Self::Center,
            Anchor::Right => Self::Right,
            Anchor::BottomLeft => Self::BottomLeft,
            Anchor::Bottom => Self::Bottom,
            Anchor::BottomRight => Self::BottomRight,
        }
    }
}

/// Build the terrain job a command describes.
pub fn build_job(command: &Command, config: &Config) -> Result<TerrainJob, GeodesyError> {
    let metadata = TerrainMeshMetadata::from_config(&config.terrain);
    let raster = &config.raster;

    let job = match command {
        Command::Globe { input } => TerrainJob::new(
            TerrainGenerator::Globe(GlobeGenerator),
            metadata,
            input.resolve(BoundingBox::globe(), raster),
        ),
        Command::Section { bbox, atlas, input } => TerrainJob::new(
            TerrainGenerator::Section(SectionGenerator::new(*bbox, atlas.uv_bounds(bbox)?)),
            metadata,
            input.resolve(*bbox, raster),
        ),
        Command::Planar { size, input } => TerrainJob::new(
            TerrainGenerator::Planar(PlanarGenerator::new(
                size.unwrap_or(config.terrain.planar_size),
            )),
            metadata,
            input.resolve(BoundingBox::globe(), raster),
        ),
        Command::Placeholder {
            bbox,
            atlas,
            width,
            height,
        } => TerrainJob::new(
            TerrainGenerator::BaseSection(BaseSectionGenerator::new(
                *bbox,
                atlas.uv_bounds(bbox)?,
                width.unwrap_or(raster.output_width),
                height.unwrap_or(raster.output_height),
            )),
            metadata,
            RasterInput::None,
        ),
        Command::Rescale { bbox, atlas, input } => {
            let reference = metadata.with_height_scale(config.terrain.reference_height_scale);
            match bbox {
                Some(bbox) => TerrainJob::new(
                    TerrainGenerator::Section(SectionGenerator::new(*bbox, atlas.uv_bounds(bbox)?)),
                    reference,
                    input.resolve(*bbox, raster),
                ),
                None => TerrainJob::new(
                    TerrainGenerator::Globe(GlobeGenerator),
                    reference,
                    input.resolve(BoundingBox::globe(), raster),
                ),
            }
        }
    };
    Ok(job)
}

/// Second pass of the `rescale` command: reference meshes generated at
/// `reference_height_scale` are brought to `metadata.height_scale`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RescalePlan {
    pub metadata: TerrainMeshMetadata,
    pub reference_height_scale: f32,
    pub frame: RescaleFrame,
}

pub fn rescale_plan(command: &Command, config: &Config) -> Option<RescalePlan> {
    let Command::Rescale { bbox, .. } = command else {
        return None;
    };
    Some(RescalePlan {
        metadata: TerrainMeshMetadata::from_config(&config.terrain),
        reference_height_scale: config.terrain.reference_height_scale,
        frame: if bbox.is_some() {
            RescaleFrame::Section
        } else {
            RescaleFrame::Globe
        },
    })
}
