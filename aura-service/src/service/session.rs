//! The per-connection chat session.
//!
//! A session starts Uninitialized, becomes Active when [`ChatSession::activate`]
//! binds a model, and returns to Uninitialized on [`ChatSession::reset`].
//! Turns are strictly sequential: the owner awaits each turn before handing
//! the session the next input.

use std::sync::Arc;
use std::time::Instant;

use serde::Serialize;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::{ServiceError, ServiceResult, format_error_chain};
use crate::gemini::GenerativeModel;

use super::prompts;
use super::reply::{self, ParsedReply};
use super::state::{ChatSetup, Message, ModelHandle, Transcript, UserContext};

/// What a submitted turn did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TurnOutcome {
    /// Blank input; nothing was sent
    Skipped,
    Replied(ParsedReply),
}

/// Snapshot of a session for the client
#[derive(Debug, Clone, Serialize)]
pub struct SessionSnapshot {
    pub session_id: String,
    pub active: bool,
    pub narrative_mode: bool,
    pub transcript: Transcript,
    pub options: Vec<String>,
}

#[derive(Debug)]
pub struct ChatSession {
    id: String,
    transcript: Transcript,
    options: Vec<String>,
    narrative_mode: bool,
    model: Option<ModelHandle>,
    context: Option<UserContext>,
    last_audio_id: Option<String>,
    credential: Option<String>,
}

impl Default for ChatSession {
    fn default() -> Self {
        Self::new()
    }
}

impl ChatSession {
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            transcript: Transcript::default(),
            options: Vec::new(),
            narrative_mode: true,
            model: None,
            context: None,
            last_audio_id: None,
            credential: None,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn is_active(&self) -> bool {
        self.model.is_some()
    }

    pub fn narrative_mode(&self) -> bool {
        self.narrative_mode
    }

    pub fn options(&self) -> &[String] {
        &self.options
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    pub fn context(&self) -> Option<&UserContext> {
        self.context.as_ref()
    }

    /// API key supplied by the user for this session, if any
    pub fn credential(&self) -> Option<&str> {
        self.credential.as_deref()
    }

    pub fn set_credential(&mut self, api_key: &str) {
        let key = api_key.trim();
        self.credential = (!key.is_empty()).then(|| key.to_string());
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            session_id: self.id.clone(),
            active: self.is_active(),
            narrative_mode: self.narrative_mode,
            transcript: self.transcript.clone(),
            options: self.options.clone(),
        }
    }

    /// Start the chat and run the first turn with the problem statement.
    ///
    /// A blank problem leaves the session Uninitialized and returns
    /// [`TurnOutcome::Skipped`]. If the first turn fails the session is
    /// left Uninitialized so the user can try again.
    pub async fn activate(
        &mut self,
        backend: Arc<dyn GenerativeModel>,
        setup: ChatSetup,
    ) -> ServiceResult<TurnOutcome> {
        if self.is_active() {
            return Err(ServiceError::SessionAlreadyActive);
        }

        if setup.problem.trim().is_empty() {
            debug!(session_id = %self.id, "Empty problem statement, chat not started");
            return Ok(TurnOutcome::Skipped);
        }

        let system_instruction = prompts::compose_for(&setup.context, self.narrative_mode);

        info!(
            session_id = %self.id,
            personality = %setup.context.personality,
            model = %backend.model_name(),
            narrative_mode = self.narrative_mode,
            "Starting chat"
        );

        self.model = Some(ModelHandle {
            system_instruction,
            backend,
        });
        self.context = Some(setup.context);

        match self.take_turn(&setup.problem).await {
            Ok(outcome) => Ok(outcome),
            Err(e) => {
                self.model = None;
                self.context = None;
                Err(e)
            }
        }
    }

    /// Send one user message and record the model's reply.
    ///
    /// On a model failure the user message is removed again, leaving the
    /// transcript and options exactly as they were.
    pub async fn take_turn(&mut self, text: &str) -> ServiceResult<TurnOutcome> {
        if text.trim().is_empty() {
            return Ok(TurnOutcome::Skipped);
        }

        let Some(handle) = self.model.clone() else {
            return Err(ServiceError::SessionNotActive);
        };

        self.transcript.push(Message::user(text));

        let start = Instant::now();
        let result = handle
            .backend
            .generate(&handle.system_instruction, self.transcript.messages())
            .await;
        metrics::histogram!("aura_model_call_seconds").record(start.elapsed().as_secs_f64());

        let raw = match result {
            Ok(raw) => raw,
            Err(e) => {
                self.transcript.pop_last();
                metrics::counter!("aura_model_failures_total").increment(1);
                warn!(
                    session_id = %self.id,
                    error = %format_error_chain(&e),
                    "Model call failed, user message rolled back"
                );
                return Err(ServiceError::Model(e));
            }
        };

        let parsed = reply::parse(&raw, self.narrative_mode);
        self.transcript.push(Message::model(parsed.text.clone()));
        self.options = parsed.options.clone();
        metrics::counter!("aura_turns_total").increment(1);

        debug!(
            session_id = %self.id,
            transcript_len = self.transcript.len(),
            option_count = self.options.len(),
            "Turn complete"
        );

        Ok(TurnOutcome::Replied(parsed))
    }

    /// Submit one of the current options as the next user turn
    pub async fn select_option(&mut self, index: usize) -> ServiceResult<TurnOutcome> {
        if !self.is_active() {
            return Err(ServiceError::SessionNotActive);
        }

        let Some(text) = self.options.get(index).cloned() else {
            return Err(ServiceError::InvalidRequest {
                message: format!("No option at index {}", index),
            });
        };

        let previous = std::mem::take(&mut self.options);
        let result = self.take_turn(&text).await;
        if result.is_err() {
            self.options = previous;
        }
        result
    }

    /// Applies to subsequent turns only; the system instruction composed at
    /// activation is not rebuilt.
    pub fn set_narrative_mode(&mut self, enabled: bool) {
        self.narrative_mode = enabled;
        if !enabled {
            self.options.clear();
        }
    }

    /// Record a recording id. Returns false if it was already seen.
    pub fn accept_audio(&mut self, id: &str) -> bool {
        if self.last_audio_id.as_deref() == Some(id) {
            return false;
        }
        self.last_audio_id = Some(id.to_string());
        true
    }

    /// Start over. The session credential survives a reset.
    pub fn reset(&mut self) {
        info!(session_id = %self.id, "Resetting chat");
        self.transcript.clear();
        self.options.clear();
        self.model = None;
        self.context = None;
        self.last_audio_id = None;
        self.narrative_mode = true;
    }
}
