//! Speech recognition backends.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Client;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use tracing::{debug, warn};

use crate::config::RuntimeConfig;
use crate::error::TranscriptionError;

/// Turns a normalized WAV clip into text. An empty string means nothing
/// was recognized.
#[async_trait]
pub trait SpeechRecognizer: Send + Sync {
    async fn recognize(&self, wav: Vec<u8>) -> Result<String, TranscriptionError>;
}

/// OpenAI-compatible `/audio/transcriptions` client (Whisper and friends)
pub struct HttpSpeechRecognizer {
    client: Client,
    runtime_config: Arc<RuntimeConfig>,
}

#[derive(Debug, Deserialize)]
struct TranscriptionResponse {
    #[serde(default)]
    text: String,
}

impl HttpSpeechRecognizer {
    pub fn new(runtime_config: Arc<RuntimeConfig>) -> Self {
        Self {
            client: Client::new(),
            runtime_config,
        }
    }
}

#[async_trait]
impl SpeechRecognizer for HttpSpeechRecognizer {
    async fn recognize(&self, wav: Vec<u8>) -> Result<String, TranscriptionError> {
        let config = self.runtime_config.dynamic().speech.clone();
        let api_key = config
            .api_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .ok_or_else(|| {
                TranscriptionError::Failure("No speech recognition API key configured".to_string())
            })?;

        let url = format!(
            "{}/audio/transcriptions",
            config.base_url.trim_end_matches('/')
        );

        let part = Part::bytes(wav)
            .file_name("audio.wav")
            .mime_str("audio/wav")
            .map_err(|e| TranscriptionError::Failure(e.to_string()))?;
        let mut form = Form::new()
            .part("file", part)
            .text("model", config.model.clone());
        if let Some(language) = config.language.clone() {
            form = form.text("language", language);
        }

        debug!(url = %url, model = %config.model, "Sending audio for transcription");

        let response = self
            .client
            .post(&url)
            .bearer_auth(api_key)
            .timeout(config.request_timeout())
            .multipart(form)
            .send()
            .await
            .map_err(|e| TranscriptionError::Failure(e.without_url().to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            warn!(status = %status, "Speech recognition request failed");
            return Err(TranscriptionError::Failure(format!(
                "Speech API error {}: {}",
                status, body
            )));
        }

        let body: TranscriptionResponse = response
            .json()
            .await
            .map_err(|e| TranscriptionError::Failure(e.without_url().to_string()))?;

        Ok(body.text.trim().to_string())
    }
}
