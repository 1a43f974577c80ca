//! Layered config composition over the `config` crate.

use crate::config::sources::{environment, global_file, workspace_file};
use crate::config::StudioConfig;
use config::{Config, ConfigError, File};
use std::path::Path;

pub struct LayeredConfig;

impl LayeredConfig {
    /// Precedence: global file (lowest) -> workspace file -> environment (highest).
    /// Missing files are skipped; unset keys keep their serde defaults.
    pub fn load(workspace_root: &Path) -> Result<StudioConfig, ConfigError> {
        let builder = Config::builder();
        let builder = global_file::add_to_builder(builder)?;
        let builder = workspace_file::add_to_builder(builder, workspace_root)?;
        let builder = environment::add_to_builder(builder)?;

        builder.build()?.try_deserialize()
    }

    /// Load a specific file (required) with the environment overlay.
    pub fn load_from_file(path: &Path) -> Result<StudioConfig, ConfigError> {
        let builder = Config::builder().add_source(File::from(path).required(true));
        let builder = environment::add_to_builder(builder)?;

        builder.build()?.try_deserialize()
    }
}
