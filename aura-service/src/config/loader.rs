//! Configuration loading from files and environment variables.

use config::{Config, Environment, File};

use crate::error::{ServiceError, ServiceResult};

use super::dynamic_config::DynamicConfig;
use super::static_config::StaticConfig;

/// Environment variable prefix, e.g. `AURA__SERVER__PORT=9000`
const ENV_PREFIX: &str = "AURA";

/// Conventional variable checked when no key is configured under the prefix
const GEMINI_KEY_FALLBACK_VAR: &str = "GEMINI_API_KEY";

fn build() -> ServiceResult<Config> {
    Config::builder()
        .add_source(File::with_name("config").required(false))
        .add_source(
            Environment::with_prefix(ENV_PREFIX)
                .separator("__")
                .try_parsing(true),
        )
        .build()
        .map_err(|e| ServiceError::Config {
            message: format!("Failed to build config: {}", e),
        })
}

/// Load static configuration from file and env vars
pub fn load_static_config() -> ServiceResult<StaticConfig> {
    build()?
        .try_deserialize()
        .map_err(|e| ServiceError::Config {
            message: format!("Failed to deserialize static config: {}", e),
        })
}

/// Load dynamic configuration from file and env vars (without runtime overrides)
pub fn load_dynamic_config() -> ServiceResult<DynamicConfig> {
    let mut dynamic: DynamicConfig =
        build()?
            .try_deserialize()
            .map_err(|e| ServiceError::Config {
                message: format!("Failed to deserialize dynamic config: {}", e),
            })?;

    if dynamic.gemini.credential().is_none()
        && let Ok(key) = std::env::var(GEMINI_KEY_FALLBACK_VAR)
        && !key.trim().is_empty()
    {
        dynamic.gemini.api_key = Some(key);
    }

    Ok(dynamic)
}
