//! Command-line overrides for configuration values.

use std::path::PathBuf;

use clap::Args;

use crate::Config;

/// Flags that override settings loaded from `config.ron`.
///
/// Meant to be flattened into a binary's own parser.
#[derive(Args, Debug, Clone, Default, PartialEq)]
pub struct CliArgs {
    /// Sphere radius in scene units.
    #[arg(long, global = true)]
    pub radius: Option<f32>,

    /// Height exaggeration applied to raster samples.
    #[arg(long, global = true)]
    pub height_scale: Option<f32>,

    /// Extra LODs beyond the base one.
    #[arg(long, global = true)]
    pub lod_levels: Option<u32>,

    /// Exponent of the finest downsample factor.
    #[arg(long, global = true)]
    pub base_downsample: Option<u32>,

    /// Exponent of the physics mesh downsample factor (negative = none).
    #[arg(long, global = true, allow_negative_numbers = true)]
    pub physics_downsample: Option<i32>,

    /// Worker threads (0 = auto).
    #[arg(long, global = true)]
    pub threads: Option<usize>,

    /// Root of the local product cache.
    #[arg(long, global = true)]
    pub product_dir: Option<PathBuf>,

    /// Log level (error, warn, info, debug, trace).
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Path to config directory (overrides default location).
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
}

impl Config {
    /// Apply CLI overrides to a loaded config.
    pub fn apply_cli_overrides(&mut self, args: &CliArgs) {
        if let Some(radius) = args.radius {
            self.terrain.radius = radius;
        }
        if let Some(scale) = args.height_scale {
            self.terrain.height_scale = scale;
        }
        if let Some(levels) = args.lod_levels {
            self.terrain.lod_levels = levels;
        }
        if let Some(base) = args.base_downsample {
            self.terrain.base_downsample = base;
        }
        if let Some(physics) = args.physics_downsample {
            self.terrain.physics_downsample = physics;
        }
        if let Some(threads) = args.threads {
            self.workers.thread_count = threads;
        }
        if let Some(ref dir) = args.product_dir {
            self.raster.product_dir = dir.clone();
        }
        if let Some(ref level) = args.log_level {
            self.debug.log_level = level.clone();
        }
    }
}
