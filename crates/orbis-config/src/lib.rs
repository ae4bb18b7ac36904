//! Configuration for the Orbis terrain tools.
//!
//! Settings persist to disk as RON, can be overridden from the command line
//! via clap, and tolerate missing or unknown fields so older and newer config
//! files keep loading.

mod cli;
mod config;
mod error;

pub use cli::CliArgs;
pub use config::{Config, DebugConfig, RasterConfig, TerrainConfig, WorkerConfig, default_config_dir};
pub use error::ConfigError;
