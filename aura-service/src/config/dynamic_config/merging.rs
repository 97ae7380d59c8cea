//! Key-value conversion and override merging logic for DynamicConfig.

use std::collections::HashMap;

use super::DynamicConfig;
use super::keys::SECRET_SETTING_KEYS;

const MASKED_SECRET: &str = "********";

impl DynamicConfig {
    /// Convert config to key-value map for API response.
    ///
    /// Secrets are masked; an unset secret is reported as null.
    pub fn to_key_value_map(&self) -> HashMap<String, serde_json::Value> {
        let mut map = HashMap::new();

        // Gemini settings
        map.insert(
            "gemini.base_url".to_string(),
            serde_json::Value::String(self.gemini.base_url.clone()),
        );
        map.insert(
            "gemini.model".to_string(),
            serde_json::Value::String(self.gemini.model.clone()),
        );
        map.insert(
            "gemini.api_key".to_string(),
            optional_string(&self.gemini.api_key),
        );
        map.insert(
            "gemini.temperature".to_string(),
            serde_json::json!(self.gemini.temperature),
        );
        map.insert(
            "gemini.request_timeout_secs".to_string(),
            serde_json::json!(self.gemini.request_timeout_secs),
        );

        // Speech settings
        map.insert(
            "speech.base_url".to_string(),
            serde_json::Value::String(self.speech.base_url.clone()),
        );
        map.insert(
            "speech.api_key".to_string(),
            optional_string(&self.speech.api_key),
        );
        map.insert(
            "speech.model".to_string(),
            serde_json::Value::String(self.speech.model.clone()),
        );
        map.insert(
            "speech.language".to_string(),
            optional_string(&self.speech.language),
        );
        map.insert(
            "speech.request_timeout_secs".to_string(),
            serde_json::json!(self.speech.request_timeout_secs),
        );

        // Limits settings
        map.insert(
            "limits.max_audio_bytes".to_string(),
            serde_json::json!(self.limits.max_audio_bytes),
        );
        map.insert(
            "limits.max_audio_seconds".to_string(),
            serde_json::json!(self.limits.max_audio_seconds),
        );

        for key in SECRET_SETTING_KEYS {
            if let Some(value) = map.get_mut(*key)
                && !value.is_null()
            {
                *value = serde_json::Value::String(MASKED_SECRET.to_string());
            }
        }

        map
    }

    /// Apply overrides on top of this config
    pub fn merge_overrides(&mut self, overrides: &HashMap<String, serde_json::Value>) {
        for (key, value) in overrides {
            self.apply_setting(key, value);
        }
    }

    /// Check that a non-null override value has the right type and range
    /// for its key.
    pub fn validate_setting(key: &str, value: &serde_json::Value) -> Result<(), String> {
        match key {
            "gemini.base_url" | "gemini.model" | "speech.base_url" | "speech.model" => {
                match value.as_str() {
                    Some(v) if !v.trim().is_empty() => Ok(()),
                    _ => Err(format!("{} must be a non-empty string", key)),
                }
            }
            "gemini.api_key" | "speech.api_key" | "speech.language" => {
                if value.is_string() {
                    Ok(())
                } else {
                    Err(format!("{} must be a string or null", key))
                }
            }
            "gemini.temperature" => match value.as_f64() {
                Some(v) if (0.0..=2.0).contains(&v) => Ok(()),
                _ => Err(format!("{} must be a number between 0 and 2", key)),
            },
            "gemini.request_timeout_secs"
            | "speech.request_timeout_secs"
            | "limits.max_audio_bytes"
            | "limits.max_audio_seconds" => match value.as_u64() {
                Some(v) if v > 0 => Ok(()),
                _ => Err(format!("{} must be a positive integer", key)),
            },
            _ => Err(format!("Unknown setting key: {}", key)),
        }
    }

    /// Apply a single setting value
    fn apply_setting(&mut self, key: &str, value: &serde_json::Value) {
        match key {
            // Gemini settings
            "gemini.base_url" => {
                if let Some(v) = value.as_str() {
                    self.gemini.base_url = v.to_string();
                }
            }
            "gemini.model" => {
                if let Some(v) = value.as_str() {
                    self.gemini.model = v.to_string();
                }
            }
            "gemini.api_key" => apply_optional_string(&mut self.gemini.api_key, value),
            "gemini.temperature" => {
                if let Some(v) = value.as_f64() {
                    self.gemini.temperature = v as f32;
                }
            }
            "gemini.request_timeout_secs" => {
                if let Some(v) = value.as_u64() {
                    self.gemini.request_timeout_secs = v;
                }
            }

            // Speech settings
            "speech.base_url" => {
                if let Some(v) = value.as_str() {
                    self.speech.base_url = v.to_string();
                }
            }
            "speech.api_key" => apply_optional_string(&mut self.speech.api_key, value),
            "speech.model" => {
                if let Some(v) = value.as_str() {
                    self.speech.model = v.to_string();
                }
            }
            "speech.language" => apply_optional_string(&mut self.speech.language, value),
            "speech.request_timeout_secs" => {
                if let Some(v) = value.as_u64() {
                    self.speech.request_timeout_secs = v;
                }
            }

            // Limits settings
            "limits.max_audio_bytes" => {
                if let Some(v) = value.as_u64() {
                    self.limits.max_audio_bytes = v;
                }
            }
            "limits.max_audio_seconds" => {
                if let Some(v) = value.as_u64() {
                    self.limits.max_audio_seconds = v;
                }
            }

            _ => {
                tracing::warn!(key = %key, "Unknown setting key in merge_overrides");
            }
        }
    }
}

fn optional_string(value: &Option<String>) -> serde_json::Value {
    match value {
        Some(v) => serde_json::Value::String(v.clone()),
        None => serde_json::Value::Null,
    }
}

fn apply_optional_string(target: &mut Option<String>, value: &serde_json::Value) {
    if value.is_null() {
        *target = None;
    } else if let Some(v) = value.as_str() {
        *target = Some(v.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_secrets_are_masked() {
        let mut config = DynamicConfig::default();
        config.gemini.api_key = Some("AIza-secret".to_string());

        let map = config.to_key_value_map();
        assert_eq!(map["gemini.api_key"], serde_json::json!(MASKED_SECRET));
        assert_eq!(map["speech.api_key"], serde_json::Value::Null);
        assert_eq!(map["gemini.model"], serde_json::json!("gemini-2.5-pro"));
    }

    #[test]
    fn test_map_covers_every_key() {
        let map = DynamicConfig::default().to_key_value_map();
        for key in DynamicConfig::valid_keys() {
            assert!(map.contains_key(key), "missing {key}");
        }
        assert_eq!(map.len(), DynamicConfig::valid_keys().len());
    }

    #[test]
    fn test_merge_overrides() {
        let mut config = DynamicConfig::default();
        let overrides = HashMap::from([
            ("gemini.api_key".to_string(), serde_json::json!("k1")),
            ("gemini.temperature".to_string(), serde_json::json!(0.2)),
            ("limits.max_audio_bytes".to_string(), serde_json::json!(1024)),
            ("speech.language".to_string(), serde_json::json!("en")),
        ]);
        config.merge_overrides(&overrides);

        assert_eq!(config.gemini.credential(), Some("k1"));
        assert!((config.gemini.temperature - 0.2).abs() < f32::EPSILON);
        assert_eq!(config.limits.max_audio_bytes, 1024);
        assert_eq!(config.speech.language.as_deref(), Some("en"));

        config.merge_overrides(&HashMap::from([(
            "gemini.api_key".to_string(),
            serde_json::Value::Null,
        )]));
        assert_eq!(config.gemini.credential(), None);
    }

    #[test]
    fn test_validate_setting() {
        let check =
            |key: &str, value: serde_json::Value| DynamicConfig::validate_setting(key, &value);

        assert!(check("gemini.temperature", serde_json::json!(0)).is_ok());
        assert!(check("gemini.temperature", serde_json::json!(2.0)).is_ok());
        assert!(check("gemini.temperature", serde_json::json!(2.5)).is_err());
        assert!(check("gemini.temperature", serde_json::json!("hot")).is_err());
        assert!(check("gemini.request_timeout_secs", serde_json::json!(30)).is_ok());
        assert!(check("gemini.request_timeout_secs", serde_json::json!(0)).is_err());
        assert!(check("limits.max_audio_seconds", serde_json::json!(-5)).is_err());
        assert!(check("gemini.model", serde_json::json!("")).is_err());
        assert!(check("speech.language", serde_json::json!("de")).is_ok());
        assert!(check("speech.api_key", serde_json::json!(42)).is_err());
    }

    #[test]
    fn test_every_key_accepts_its_current_value() {
        let mut config = DynamicConfig::default();
        config.gemini.api_key = Some("k".to_string());
        config.speech.api_key = Some("k".to_string());
        config.speech.language = Some("en".to_string());
        for (key, value) in config.to_key_value_map() {
            assert!(
                DynamicConfig::validate_setting(&key, &value).is_ok(),
                "{key} rejected {value}"
            );
        }
    }

    #[test]
    fn test_blank_key_is_not_a_credential() {
        let mut config = DynamicConfig::default();
        config.gemini.api_key = Some("   ".to_string());
        assert_eq!(config.gemini.credential(), None);
    }
}
