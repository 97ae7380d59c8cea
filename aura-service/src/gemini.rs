//! Generative model client.
//!
//! [`GenerativeModel`] is the seam between the chat session and the hosted
//! model: every call carries the system instruction and the whole
//! transcript, since the service keeps no memory between calls.
//! [`GeminiClient`] implements it against the Gemini `generateContent` API.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, warn};

use crate::config::{GeminiConfig, RuntimeConfig};
use crate::error::{ModelError, ServiceError, ServiceResult};
use crate::service::{Message, Role};

/// A stateless text generator
#[async_trait]
pub trait GenerativeModel: Send + Sync {
    /// Name of the underlying model, for logging
    fn model_name(&self) -> &str;

    /// Generate the next model turn for the transcript
    async fn generate(
        &self,
        system_instruction: &str,
        transcript: &[Message],
    ) -> Result<String, ModelError>;
}

/// Builds model clients bound to a credential
pub trait ModelFactory: Send + Sync {
    fn connect(&self, api_key: &str) -> ServiceResult<Arc<dyn GenerativeModel>>;
}

/// Gemini REST API client
pub struct GeminiClient {
    client: Client,
    config: GeminiConfig,
    api_key: String,
}

impl GeminiClient {
    pub fn new(config: GeminiConfig, api_key: impl Into<String>) -> ServiceResult<Self> {
        let client = Client::builder()
            .timeout(config.request_timeout())
            .build()
            .map_err(|e| {
                ServiceError::Model(ModelError::Connection {
                    url: config.base_url.clone(),
                    source: e,
                })
            })?;

        Ok(Self {
            client,
            config,
            api_key: api_key.into(),
        })
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.config.base_url.trim_end_matches('/'),
            self.config.model
        )
    }
}

#[async_trait]
impl GenerativeModel for GeminiClient {
    fn model_name(&self) -> &str {
        &self.config.model
    }

    async fn generate(
        &self,
        system_instruction: &str,
        transcript: &[Message],
    ) -> Result<String, ModelError> {
        let url = self.endpoint();
        let request = GenerateContentRequest::new(
            system_instruction,
            transcript,
            self.config.temperature,
        );

        debug!(
            model = %self.config.model,
            message_count = transcript.len(),
            "Sending generateContent request"
        );

        let response = self
            .client
            .post(&url)
            .query(&[("key", self.api_key.as_str())])
            .json(&request)
            .send()
            .await
            .map_err(|e| ModelError::Connection {
                url: url.clone(),
                source: e.without_url(),
            })?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let message = response.text().await.unwrap_or_default();
            warn!(status, "Gemini request failed");
            return Err(ModelError::Generation { status, message });
        }

        let body: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| ModelError::InvalidResponse {
                source: e.without_url(),
            })?;

        body.into_text()
    }
}

/// Creates [`GeminiClient`]s from the current runtime configuration
pub struct GeminiFactory {
    runtime_config: Arc<RuntimeConfig>,
}

impl GeminiFactory {
    pub fn new(runtime_config: Arc<RuntimeConfig>) -> Self {
        Self { runtime_config }
    }
}

impl ModelFactory for GeminiFactory {
    fn connect(&self, api_key: &str) -> ServiceResult<Arc<dyn GenerativeModel>> {
        let config = self.runtime_config.dynamic().gemini.clone();
        let client: Arc<dyn GenerativeModel> = Arc::new(GeminiClient::new(config, api_key)?);
        Ok(client)
    }
}

// Gemini API types

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    system_instruction: Content,
    contents: Vec<Content>,
    generation_config: GenerationConfig,
}

impl GenerateContentRequest {
    fn new(system_instruction: &str, transcript: &[Message], temperature: f32) -> Self {
        Self {
            system_instruction: Content {
                role: None,
                parts: vec![Part::text(system_instruction)],
            },
            contents: transcript
                .iter()
                .map(|m| Content {
                    role: Some(
                        match m.role {
                            Role::User => "user",
                            Role::Model => "model",
                        }
                        .to_string(),
                    ),
                    parts: vec![Part::text(&m.text)],
                })
                .collect(),
            generation_config: GenerationConfig { temperature },
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,
}

impl Part {
    fn text(text: &str) -> Self {
        Self {
            text: Some(text.to_string()),
        }
    }
}

#[derive(Debug, Serialize)]
struct GenerationConfig {
    temperature: f32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(default)]
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    #[serde(default)]
    content: Option<Content>,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    #[serde(default)]
    block_reason: Option<String>,
}

impl GenerateContentResponse {
    /// Concatenate the text parts of the first candidate
    fn into_text(self) -> Result<String, ModelError> {
        if let Some(reason) = self.prompt_feedback.and_then(|f| f.block_reason) {
            return Err(ModelError::Blocked { reason });
        }

        let candidate = self
            .candidates
            .into_iter()
            .next()
            .ok_or(ModelError::EmptyResponse)?;

        let text: String = candidate
            .content
            .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
            .unwrap_or_default();

        if text.is_empty() {
            return Err(match candidate.finish_reason.as_deref() {
                Some("SAFETY") | Some("RECITATION") | Some("PROHIBITED_CONTENT") => {
                    ModelError::Blocked {
                        reason: candidate.finish_reason.unwrap_or_default(),
                    }
                }
                _ => ModelError::EmptyResponse,
            });
        }

        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DynamicConfig;

    fn transcript() -> Vec<Message> {
        vec![
            Message::user("I feel stuck"),
            Message::model("You're doing fine."),
            Message::user("Tell me more"),
        ]
    }

    #[test]
    fn test_request_shape() {
        let request = GenerateContentRequest::new("be kind", &transcript(), 0.7);
        let json = serde_json::to_value(&request).unwrap();

        assert_eq!(json["systemInstruction"]["parts"][0]["text"], "be kind");
        assert!(json["systemInstruction"].get("role").is_none());
        assert_eq!(json["contents"].as_array().unwrap().len(), 3);
        assert_eq!(json["contents"][0]["role"], "user");
        assert_eq!(json["contents"][1]["role"], "model");
        assert_eq!(json["contents"][1]["parts"][0]["text"], "You're doing fine.");
        assert!((json["generationConfig"]["temperature"].as_f64().unwrap() - 0.7).abs() < 1e-6);
    }

    #[test]
    fn test_response_text_joins_parts() {
        let body: GenerateContentResponse = serde_json::from_value(serde_json::json!({
            "candidates": [{
                "content": {"role": "model", "parts": [{"text": "Hello "}, {"text": "there"}]},
                "finishReason": "STOP"
            }]
        }))
        .unwrap();
        assert_eq!(body.into_text().unwrap(), "Hello there");
    }

    #[test]
    fn test_blocked_prompt() {
        let body: GenerateContentResponse = serde_json::from_value(serde_json::json!({
            "promptFeedback": {"blockReason": "SAFETY"}
        }))
        .unwrap();
        assert!(matches!(
            body.into_text(),
            Err(ModelError::Blocked { reason }) if reason == "SAFETY"
        ));
    }

    #[test]
    fn test_empty_candidates() {
        let body: GenerateContentResponse =
            serde_json::from_value(serde_json::json!({"candidates": []})).unwrap();
        assert!(matches!(body.into_text(), Err(ModelError::EmptyResponse)));

        let body: GenerateContentResponse = serde_json::from_value(serde_json::json!({
            "candidates": [{"finishReason": "SAFETY"}]
        }))
        .unwrap();
        assert!(matches!(body.into_text(), Err(ModelError::Blocked { .. })));
    }

    #[test]
    fn test_endpoint() {
        let mut config = DynamicConfig::default().gemini;
        config.base_url = "https://example.test/v1beta/".to_string();
        let client = GeminiClient::new(config, "key").unwrap();
        assert_eq!(
            client.endpoint(),
            "https://example.test/v1beta/models/gemini-2.5-pro:generateContent"
        );
        assert_eq!(client.model_name(), "gemini-2.5-pro");
    }
}
