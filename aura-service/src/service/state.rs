//! State structures for a chat session.
//!
//! Everything here is owned by a single connection and never shared.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::gemini::GenerativeModel;

/// Who the user is, captured once when the chat starts
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserContext {
    /// MBTI code as entered; unknown codes fall back to a generic description
    pub personality: String,
    #[serde(default)]
    pub financial_info: Option<String>,
    #[serde(default)]
    pub orientation_info: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Model,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub text: String,
    pub timestamp: DateTime<Utc>,
}

impl Message {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            text: text.into(),
            timestamp: Utc::now(),
        }
    }

    pub fn model(text: impl Into<String>) -> Self {
        Self {
            role: Role::Model,
            text: text.into(),
            timestamp: Utc::now(),
        }
    }
}

/// Ordered log of the conversation.
///
/// The whole log is sent to the model on every turn, so each call costs
/// O(n) in the conversation length.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(transparent)]
pub struct Transcript {
    messages: Vec<Message>,
}

impl Transcript {
    pub fn push(&mut self, message: Message) {
        self.messages.push(message);
    }

    /// The full slice sent with each model call
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Drop the most recent message. Only used to undo a user turn whose
    /// model call failed.
    pub(super) fn pop_last(&mut self) -> Option<Message> {
        self.messages.pop()
    }

    pub(super) fn clear(&mut self) {
        self.messages.clear();
    }
}

/// A model backend bound to the system instruction composed at activation
#[derive(Clone)]
pub struct ModelHandle {
    pub system_instruction: String,
    pub backend: Arc<dyn GenerativeModel>,
}

impl std::fmt::Debug for ModelHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelHandle")
            .field("model", &self.backend.model_name())
            .field("system_instruction_len", &self.system_instruction.len())
            .finish()
    }
}

/// Setup submitted by the user when starting a chat
#[derive(Debug, Clone, Default)]
pub struct ChatSetup {
    pub context: UserContext,
    /// Opening problem statement; becomes the first user turn
    pub problem: String,
}
