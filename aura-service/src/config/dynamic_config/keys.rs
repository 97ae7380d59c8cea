//! Valid setting keys for DynamicConfig.

use std::collections::HashSet;

/// All valid setting keys for DynamicConfig
pub const VALID_SETTING_KEYS: &[&str] = &[
    "gemini.base_url",
    "gemini.model",
    "gemini.api_key",
    "gemini.temperature",
    "gemini.request_timeout_secs",
    "speech.base_url",
    "speech.api_key",
    "speech.model",
    "speech.language",
    "speech.request_timeout_secs",
    "limits.max_audio_bytes",
    "limits.max_audio_seconds",
];

/// Keys whose values are never echoed back by the settings API
pub const SECRET_SETTING_KEYS: &[&str] = &["gemini.api_key", "speech.api_key"];

/// Get all valid setting keys as a HashSet
pub fn valid_keys() -> HashSet<&'static str> {
    VALID_SETTING_KEYS.iter().copied().collect()
}
