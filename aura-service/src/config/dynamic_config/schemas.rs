//! Configuration struct definitions for DynamicConfig sections.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Gemini generative model configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeminiConfig {
    #[serde(default = "super::defaults::default_gemini_url")]
    pub base_url: String,

    #[serde(default = "super::defaults::default_model")]
    pub model: String,

    /// API key. When unset, each chat must supply its own.
    #[serde(default)]
    pub api_key: Option<String>,

    #[serde(default = "super::defaults::default_temperature")]
    pub temperature: f32,

    #[serde(default = "super::defaults::default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl GeminiConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// The configured key, if any non-blank one is set
    pub fn credential(&self) -> Option<&str> {
        self.api_key.as_deref().filter(|k| !k.trim().is_empty())
    }
}

/// Speech recognition configuration (OpenAI-compatible transcription API)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpeechConfig {
    #[serde(default = "super::defaults::default_speech_url")]
    pub base_url: String,

    #[serde(default)]
    pub api_key: Option<String>,

    #[serde(default = "super::defaults::default_speech_model")]
    pub model: String,

    /// ISO-639-1 hint passed to the recognizer. None lets it auto-detect.
    #[serde(default)]
    pub language: Option<String>,

    #[serde(default = "super::defaults::default_speech_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl SpeechConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// Size limits
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LimitsConfig {
    #[serde(default = "super::defaults::default_max_audio_bytes")]
    pub max_audio_bytes: u64,

    /// Longest recording accepted for transcription
    #[serde(default = "super::defaults::default_max_audio_seconds")]
    pub max_audio_seconds: u64,
}
