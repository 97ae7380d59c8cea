pub mod prompts;
pub mod reply;
mod session;
mod state;

pub use session::{ChatSession, SessionSnapshot, TurnOutcome};
pub use state::{ChatSetup, Message, Role, UserContext};

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{debug, info};

use crate::config::RuntimeConfig;
use crate::error::{ServiceError, ServiceResult};
use crate::gemini::{GeminiFactory, GenerativeModel, ModelFactory};
use crate::i18n::I18n;
use crate::voice::{HttpSpeechRecognizer, SpeechRecognizer, VoiceTranscriber};
use crate::websocket::WebSocketManager;

/// Main service coordinator
pub struct AuraService {
    pub runtime_config: Arc<RuntimeConfig>,
    pub i18n: Arc<I18n>,
    pub ws_manager: Arc<WebSocketManager>,
    pub transcriber: Arc<VoiceTranscriber>,
    model_factory: Arc<dyn ModelFactory>,
    started_at: Instant,
}

impl AuraService {
    /// Create a service talking to Gemini and the configured speech API
    pub fn new(runtime_config: Arc<RuntimeConfig>) -> Self {
        info!("Initializing Aura service");

        let dynamic = runtime_config.dynamic();
        info!(
            model = %dynamic.gemini.model,
            credential_configured = dynamic.gemini.credential().is_some(),
            speech_url = %dynamic.speech.base_url,
            "Model backends configured"
        );

        let model_factory = Arc::new(GeminiFactory::new(runtime_config.clone()));
        let recognizer = Arc::new(HttpSpeechRecognizer::new(runtime_config.clone()));
        Self::with_backends(runtime_config, model_factory, recognizer)
    }

    /// Create a service with explicit model and speech backends
    pub fn with_backends(
        runtime_config: Arc<RuntimeConfig>,
        model_factory: Arc<dyn ModelFactory>,
        recognizer: Arc<dyn SpeechRecognizer>,
    ) -> Self {
        let transcriber = Arc::new(VoiceTranscriber::new(recognizer, runtime_config.clone()));
        Self {
            runtime_config,
            i18n: Arc::new(I18n::new()),
            ws_manager: Arc::new(WebSocketManager::new()),
            transcriber,
            model_factory,
            started_at: Instant::now(),
        }
    }

    pub fn uptime(&self) -> Duration {
        self.started_at.elapsed()
    }

    /// Whether a model key is configured service-wide
    pub fn has_credential(&self) -> bool {
        self.runtime_config.dynamic().gemini.credential().is_some()
    }

    /// Build a model backend for a session.
    ///
    /// A key provided on the session wins over the configured one.
    pub fn model_for(&self, session: &ChatSession) -> ServiceResult<Arc<dyn GenerativeModel>> {
        let dynamic = self.runtime_config.dynamic();
        let api_key = session
            .credential()
            .or_else(|| dynamic.gemini.credential())
            .ok_or(ServiceError::MissingCredential)?;

        debug!(
            session_id = %session.id(),
            from_session = session.credential().is_some(),
            "Resolved model credential"
        );

        self.model_factory.connect(api_key)
    }

    /// Update settings and hot-reload the dynamic config
    pub fn update_settings(&self, updates: HashMap<String, serde_json::Value>) -> ServiceResult<()> {
        let keys: Vec<String> = updates.keys().cloned().collect();
        self.runtime_config.apply_overrides(updates)?;
        info!(keys = ?keys, "Settings updated");
        Ok(())
    }
}
