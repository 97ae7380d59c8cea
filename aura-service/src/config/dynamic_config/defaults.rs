//! Default value functions for DynamicConfig.

use super::schemas::{GeminiConfig, LimitsConfig, SpeechConfig};

// ==================== Top-level Section Defaults ====================

pub(crate) fn default_gemini() -> GeminiConfig {
    GeminiConfig {
        base_url: default_gemini_url(),
        model: default_model(),
        api_key: None,
        temperature: default_temperature(),
        request_timeout_secs: default_request_timeout_secs(),
    }
}

pub(crate) fn default_speech() -> SpeechConfig {
    SpeechConfig {
        base_url: default_speech_url(),
        api_key: None,
        model: default_speech_model(),
        language: None,
        request_timeout_secs: default_speech_timeout_secs(),
    }
}

pub(crate) fn default_limits() -> LimitsConfig {
    LimitsConfig {
        max_audio_bytes: default_max_audio_bytes(),
        max_audio_seconds: default_max_audio_seconds(),
    }
}

// ==================== Gemini Defaults ====================

pub(crate) fn default_gemini_url() -> String {
    "https://generativelanguage.googleapis.com/v1beta".to_string()
}

pub(crate) fn default_model() -> String {
    "gemini-2.5-pro".to_string()
}

pub(crate) fn default_temperature() -> f32 {
    0.7
}

pub(crate) fn default_request_timeout_secs() -> u64 {
    120
}

// ==================== Speech Defaults ====================

pub(crate) fn default_speech_url() -> String {
    "https://api.openai.com/v1".to_string()
}

pub(crate) fn default_speech_model() -> String {
    "whisper-1".to_string()
}

pub(crate) fn default_speech_timeout_secs() -> u64 {
    30
}

// ==================== Limits Defaults ====================

pub(crate) fn default_max_audio_bytes() -> u64 {
    10_485_760 // 10MB
}

pub(crate) fn default_max_audio_seconds() -> u64 {
    300
}
