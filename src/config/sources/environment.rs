//! Environment variable source: FRAMEMERGE__* prefix with __ separator

use config::builder::DefaultState;
use config::ConfigBuilder;
use config::ConfigError;
use config::Environment;

/// Add environment variable overlay to builder.
/// e.g. `FRAMEMERGE__MERGE_SERVICE__BASE_URL` sets `merge_service.base_url`.
pub fn add_to_builder(
    builder: ConfigBuilder<DefaultState>,
) -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    let builder = builder.add_source(
        Environment::with_prefix("FRAMEMERGE")
            .separator("__")
            .try_parsing(true),
    );
    Ok(builder)
}
