//! Service configuration.
//!
//! Static settings (server binding) are read once at startup. Dynamic
//! settings (model, speech, limits) live behind an [`ArcSwap`] and can be
//! overridden at runtime through the settings API without a restart.

mod dynamic_config;
mod loader;
mod static_config;

use arc_swap::ArcSwap;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::error::{ServiceError, ServiceResult};

pub use dynamic_config::{DynamicConfig, GeminiConfig};
pub use static_config::StaticConfig;

/// Runtime configuration manager
/// Combines static config (startup-only) with dynamic config (hot-reloadable via ArcSwap)
pub struct RuntimeConfig {
    /// Static configuration (never changes after startup)
    pub static_config: StaticConfig,
    /// File/env defaults that overrides are applied on top of
    base: DynamicConfig,
    /// Runtime overrides set through the settings API
    overrides: RwLock<HashMap<String, serde_json::Value>>,
    /// Dynamic configuration (can be hot-reloaded)
    dynamic: ArcSwap<DynamicConfig>,
}

impl RuntimeConfig {
    /// Load config from the config file and environment
    pub fn load() -> ServiceResult<Self> {
        let static_config = loader::load_static_config()?;
        let dynamic = loader::load_dynamic_config()?;
        Ok(Self::new(static_config, dynamic))
    }

    pub fn new(static_config: StaticConfig, base: DynamicConfig) -> Self {
        Self {
            static_config,
            dynamic: ArcSwap::from_pointee(base.clone()),
            base,
            overrides: RwLock::new(HashMap::new()),
        }
    }

    /// Get current dynamic config snapshot (lock-free read)
    pub fn dynamic(&self) -> arc_swap::Guard<Arc<DynamicConfig>> {
        self.dynamic.load()
    }

    /// Keys currently overridden at runtime
    pub fn overridden_keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self
            .overrides
            .read()
            .map(|o| o.keys().cloned().collect())
            .unwrap_or_default();
        keys.sort();
        keys
    }

    /// Apply setting updates and swap in the rebuilt config.
    ///
    /// A null value removes the override and reverts to the file/env default.
    pub fn apply_overrides(
        &self,
        updates: HashMap<String, serde_json::Value>,
    ) -> ServiceResult<()> {
        let valid_keys = DynamicConfig::valid_keys();
        if let Some(unknown) = updates.keys().find(|k| !valid_keys.contains(k.as_str())) {
            return Err(ServiceError::InvalidRequest {
                message: format!("Unknown setting key: {}", unknown),
            });
        }
        for (key, value) in updates.iter().filter(|(_, v)| !v.is_null()) {
            DynamicConfig::validate_setting(key, value)
                .map_err(|message| ServiceError::InvalidRequest { message })?;
        }

        let mut overrides = self.overrides.write().map_err(|_| ServiceError::Internal {
            message: "Settings lock poisoned".to_string(),
        })?;
        for (key, value) in updates {
            if value.is_null() {
                overrides.remove(&key);
            } else {
                overrides.insert(key, value);
            }
        }

        let mut dynamic = self.base.clone();
        dynamic.merge_overrides(&overrides);
        self.dynamic.store(Arc::new(dynamic));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn runtime() -> RuntimeConfig {
        RuntimeConfig::new(StaticConfig::default(), DynamicConfig::default())
    }

    #[test]
    fn test_defaults() {
        let config = runtime();
        assert_eq!(config.static_config.server.bind_address(), "0.0.0.0:8080");
        let dynamic = config.dynamic();
        assert_eq!(dynamic.gemini.model, "gemini-2.5-pro");
        assert!(dynamic.gemini.credential().is_none());
    }

    #[test]
    fn test_apply_and_revert_override() {
        let config = runtime();
        config
            .apply_overrides(HashMap::from([(
                "gemini.api_key".to_string(),
                serde_json::json!("secret"),
            )]))
            .unwrap();
        assert_eq!(config.dynamic().gemini.credential(), Some("secret"));
        assert_eq!(config.overridden_keys(), vec!["gemini.api_key"]);

        config
            .apply_overrides(HashMap::from([(
                "gemini.api_key".to_string(),
                serde_json::Value::Null,
            )]))
            .unwrap();
        assert!(config.dynamic().gemini.credential().is_none());
        assert!(config.overridden_keys().is_empty());
    }

    #[test]
    fn test_unknown_key_rejected() {
        let config = runtime();
        let err = config
            .apply_overrides(HashMap::from([(
                "ollama.base_url".to_string(),
                serde_json::json!("http://x"),
            )]))
            .unwrap_err();
        assert!(matches!(err, ServiceError::InvalidRequest { .. }));
        assert!(config.overridden_keys().is_empty());
    }

    #[test]
    fn test_invalid_value_rejects_whole_update() {
        let config = runtime();
        let err = config
            .apply_overrides(HashMap::from([
                ("gemini.temperature".to_string(), serde_json::json!("hot")),
                ("gemini.model".to_string(), serde_json::json!("gemini-2.5-flash")),
            ]))
            .unwrap_err();
        assert!(matches!(err, ServiceError::InvalidRequest { message } if message.contains("gemini.temperature")));

        let err = config
            .apply_overrides(HashMap::from([(
                "gemini.request_timeout_secs".to_string(),
                serde_json::json!(0),
            )]))
            .unwrap_err();
        assert!(matches!(err, ServiceError::InvalidRequest { .. }));

        assert!(config.overridden_keys().is_empty());
        let dynamic = config.dynamic();
        assert_eq!(dynamic.gemini.model, "gemini-2.5-pro");
        assert_eq!(dynamic.gemini.request_timeout_secs, 120);
    }
}
