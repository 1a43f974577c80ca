//! ConfigLoader facade delegating to the layering service.

use super::layering::LayeredConfig;
use super::StudioConfig;
use crate::error::ApiError;
use std::path::Path;

/// Configuration loader facade.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from files and environment, then validate it.
    pub fn load(workspace_root: &Path) -> Result<StudioConfig, ApiError> {
        let config = LayeredConfig::load(workspace_root)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a specific file with environment overlay.
    pub fn load_from_file(path: &Path) -> Result<StudioConfig, ApiError> {
        let config = LayeredConfig::load_from_file(path)?;
        config.validate()?;
        Ok(config)
    }

    /// Create default configuration.
    pub fn default() -> StudioConfig {
        StudioConfig::default()
    }
}
