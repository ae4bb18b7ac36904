//! Configuration structs with defaults and RON persistence.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

const CONFIG_FILE: &str = "config.ron";

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Mesh generation parameters.
    pub terrain: TerrainConfig,
    /// Background worker settings.
    pub workers: WorkerConfig,
    /// Raster product lookup.
    pub raster: RasterConfig,
    /// Debug/development settings.
    pub debug: DebugConfig,
}

/// Mesh generation parameters.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TerrainConfig {
    /// Sphere radius in scene units.
    pub radius: f32,
    /// Multiplier from raster samples to scene units.
    pub height_scale: f32,
    /// Height scale the `rescale` command generates its reference meshes at.
    pub reference_height_scale: f32,
    /// Extra LODs beyond the base one.
    pub lod_levels: u32,
    /// Exponent of the finest downsample factor.
    pub base_downsample: u32,
    /// Exponent of the physics mesh downsample factor (negative = none).
    pub physics_downsample: i32,
    /// Side length of planar meshes in scene units.
    pub planar_size: f32,
}

/// Background worker settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct WorkerConfig {
    /// Worker threads (0 = one per core, minus two).
    pub thread_count: usize,
    /// How long callers wait for a task callback before giving up.
    pub task_timeout_seconds: u64,
}

/// Raster product lookup.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RasterConfig {
    /// Root of the local product cache.
    pub product_dir: PathBuf,
    /// Product used when a command names none.
    pub default_product: String,
    /// Requested product width in pixels.
    pub output_width: u32,
    /// Requested product height in pixels.
    pub output_height: u32,
    /// Product file extension.
    pub image_format: String,
}

/// Debug/development configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DebugConfig {
    /// Log level override (e.g., "debug", "info", "warn").
    pub log_level: String,
    /// Also write JSON logs to a file in the config directory.
    pub log_to_file: bool,
}

impl Default for TerrainConfig {
    fn default() -> Self {
        Self {
            radius: 1.0,
            height_scale: 1.0,
            reference_height_scale: 1.0,
            lod_levels: 2,
            base_downsample: 0,
            physics_downsample: -1,
            planar_size: 10.0,
        }
    }
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            thread_count: 0,
            task_timeout_seconds: 60,
        }
    }
}

impl Default for RasterConfig {
    fn default() -> Self {
        Self {
            product_dir: PathBuf::from("products"),
            default_product: "elevation".to_string(),
            output_width: 1024,
            output_height: 512,
            image_format: "tif".to_string(),
        }
    }
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_to_file: false,
        }
    }
}

/// Per-user config directory, e.g. `~/.config/orbis` on Linux.
pub fn default_config_dir() -> Result<PathBuf, ConfigError> {
    dirs::config_dir()
        .map(|dir| dir.join("orbis"))
        .ok_or(ConfigError::NoConfigDir)
}

// --- Load / Save / Reload ---

impl Config {
    /// Load config from the given directory, or create a default config file.
    pub fn load_or_create(config_dir: &Path) -> Result<Self, ConfigError> {
        let config_path = config_dir.join(CONFIG_FILE);

        if config_path.exists() {
            let contents = std::fs::read_to_string(&config_path).map_err(ConfigError::ReadError)?;
            let config: Config = ron::from_str(&contents).map_err(ConfigError::ParseError)?;
            log::info!("Loaded config from {}", config_path.display());
            Ok(config)
        } else {
            let config = Config::default();
            config.save(config_dir)?;
            log::info!("Created default config at {}", config_path.display());
            Ok(config)
        }
    }

    /// Save config to the given directory as `config.ron`.
    pub fn save(&self, config_dir: &Path) -> Result<(), ConfigError> {
        std::fs::create_dir_all(config_dir).map_err(ConfigError::WriteError)?;

        let pretty = ron::ser::PrettyConfig::new()
            .depth_limit(2)
            .enumerate_arrays(false);
        let serialized =
            ron::ser::to_string_pretty(self, pretty).map_err(ConfigError::SerializeError)?;

        std::fs::write(config_dir.join(CONFIG_FILE), serialized).map_err(ConfigError::WriteError)
    }

    /// Re-read the file: `Some(new_config)` if it changed, `None` otherwise.
    pub fn reload(&self, config_dir: &Path) -> Result<Option<Self>, ConfigError> {
        let contents = std::fs::read_to_string(config_dir.join(CONFIG_FILE))
            .map_err(ConfigError::ReadError)?;
        let new_config: Config = ron::from_str(&contents).map_err(ConfigError::ParseError)?;

        if &new_config != self {
            log::info!("Config reloaded with changes");
            Ok(Some(new_config))
        } else {
            Ok(None)
        }
    }

    /// Reject values that would make every generation request fail.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |field: &'static str, reason: &str| {
            Err(ConfigError::Invalid {
                field,
                reason: reason.to_string(),
            })
        };

        let t = &self.terrain;
        if !(t.radius.is_finite() && t.radius > 0.0) {
            return invalid("terrain.radius", "must be a positive number");
        }
        if !t.height_scale.is_finite() {
            return invalid("terrain.height_scale", "must be finite");
        }
        if !(t.reference_height_scale.is_finite() && t.reference_height_scale != 0.0) {
            return invalid("terrain.reference_height_scale", "must be finite and non-zero");
        }
        if t.base_downsample.saturating_add(t.lod_levels) >= 32 {
            return invalid("terrain.lod_levels", "base_downsample + lod_levels must be below 32");
        }
        if t.physics_downsample >= 32 {
            return invalid("terrain.physics_downsample", "must be below 32");
        }
        if !(t.planar_size.is_finite() && t.planar_size > 0.0) {
            return invalid("terrain.planar_size", "must be a positive number");
        }
        if self.workers.task_timeout_seconds == 0 {
            return invalid("workers.task_timeout_seconds", "must be at least 1");
        }
        if self.raster.output_width < 2 || self.raster.output_height < 2 {
            return invalid("raster.output_width", "product size must be at least 2x2");
        }
        Ok(())
    }
}
