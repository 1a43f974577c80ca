//! Configuration
//!
//! Layered settings for the merge service client, result delivery and logging.
//! See [`ConfigLoader`] for source precedence.

pub mod facade;
pub mod layering;
pub mod paths;
pub mod sources;

pub use facade::ConfigLoader;

use crate::error::ApiError;
use crate::logging::LoggingConfig;
use crate::merge::DEFAULT_MERGE_PATH;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Top-level configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StudioConfig {
    pub merge_service: MergeServiceConfig,
    pub delivery: DeliveryConfig,
    pub logging: LoggingConfig,
}

impl StudioConfig {
    pub fn validate(&self) -> Result<(), ApiError> {
        self.merge_service.validate().map_err(ApiError::ConfigError)?;
        self.delivery.validate().map_err(ApiError::ConfigError)?;
        Ok(())
    }
}

/// Merge service endpoint settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MergeServiceConfig {
    /// Backend base URL, e.g. `https://api.example.com`
    pub base_url: String,
    /// Route of the merge job, appended to `base_url`
    pub merge_path: String,
    /// Bearer token sent with merge requests
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_token: Option<String>,
    /// Submission timeout in seconds; 0 disables the bound
    pub timeout_secs: u64,
}

impl Default for MergeServiceConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".to_string(),
            merge_path: DEFAULT_MERGE_PATH.to_string(),
            api_token: None,
            timeout_secs: 300,
        }
    }
}

impl MergeServiceConfig {
    pub fn endpoint(&self) -> String {
        let base = self.base_url.trim().trim_end_matches('/');
        let path = self.merge_path.trim();
        if path.starts_with('/') {
            format!("{}{}", base, path)
        } else {
            format!("{}/{}", base, path)
        }
    }

    pub fn timeout(&self) -> Option<Duration> {
        (self.timeout_secs > 0).then(|| Duration::from_secs(self.timeout_secs))
    }

    pub fn validate(&self) -> Result<(), String> {
        let base = self.base_url.trim();
        let Some(rest) = base
            .strip_prefix("http://")
            .or_else(|| base.strip_prefix("https://"))
        else {
            return Err(format!(
                "Invalid merge service URL: {} (must start with http:// or https://)",
                self.base_url
            ));
        };
        if rest.is_empty() || rest.chars().any(char::is_whitespace) {
            return Err(format!("Invalid merge service URL: {}", self.base_url));
        }
        if self.merge_path.trim().is_empty() {
            return Err("Merge path cannot be empty".to_string());
        }
        Ok(())
    }
}

/// Local save settings for merged videos
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DeliveryConfig {
    pub output_dir: PathBuf,
    pub file_prefix: String,
    pub extension: String,
}

impl Default for DeliveryConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("."),
            file_prefix: "merged-video".to_string(),
            extension: "mp4".to_string(),
        }
    }
}

impl DeliveryConfig {
    pub fn validate(&self) -> Result<(), String> {
        if self.file_prefix.trim().is_empty() {
            return Err("Delivery file prefix cannot be empty".to_string());
        }
        if self.file_prefix.contains(['/', '\\']) {
            return Err(format!(
                "Delivery file prefix must not contain path separators: {}",
                self.file_prefix
            ));
        }
        if self.extension.trim().is_empty() {
            return Err("Delivery extension cannot be empty".to_string());
        }
        Ok(())
    }
}
