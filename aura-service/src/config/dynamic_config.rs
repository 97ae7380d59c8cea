//! Dynamic configuration that can be updated at runtime via API.
//! In-memory overrides take precedence over config file/env defaults.

mod defaults;
mod keys;
mod merging;
mod schemas;

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

pub use schemas::{GeminiConfig, LimitsConfig, SpeechConfig};

use defaults::{default_gemini, default_limits, default_speech};

/// Dynamic configuration that can be updated at runtime via API
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DynamicConfig {
    #[serde(default = "default_gemini")]
    pub gemini: GeminiConfig,

    #[serde(default = "default_speech")]
    pub speech: SpeechConfig,

    #[serde(default = "default_limits")]
    pub limits: LimitsConfig,
}

impl Default for DynamicConfig {
    fn default() -> Self {
        Self {
            gemini: default_gemini(),
            speech: default_speech(),
            limits: default_limits(),
        }
    }
}

impl DynamicConfig {
    /// Get all valid setting keys
    pub fn valid_keys() -> HashSet<&'static str> {
        keys::valid_keys()
    }
}
