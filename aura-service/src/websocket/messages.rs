//! WebSocket message types.
//!
//! Defines the client-to-server and server-to-client message formats
//! for a chat connection.

use serde::{Deserialize, Serialize};

use crate::error::ServiceError;
use crate::i18n::I18n;
use crate::service::SessionSnapshot;
use crate::service::reply::ParsedReply;

/// Messages sent from client to server
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    /// Keepalive ping
    Ping,
    /// Gemini API key to use for this connection only
    ProvideApiKey { api_key: String },
    /// Start the chat with the user's setup and opening problem
    StartChat {
        personality: String,
        #[serde(default)]
        financial_info: Option<String>,
        #[serde(default)]
        orientation_info: Option<String>,
        problem: String,
    },
    /// Typed user message
    SendMessage { text: String },
    /// Click on one of the suggested options
    SelectOption { index: usize },
    /// Recorded voice clip, base64 encoded
    Audio { id: String, data: String },
    SetNarrativeMode { enabled: bool },
    /// Discard the conversation and start over
    NewChat,
}

/// Messages sent from server to client
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    /// Keepalive pong response
    Pong { timestamp: u64 },
    /// Sent once when the connection opens
    Welcome {
        session_id: String,
        message: String,
        about_mbti: String,
        free_test_url: String,
        credential_configured: bool,
    },
    /// Full session state after any change
    SessionState(SessionSnapshot),
    /// Reply to a user turn
    TurnComplete { text: String, options: Vec<String> },
    /// Progress notice such as "Aura is thinking..."
    Status { message: String },
    /// Text recognized from a voice clip
    Transcription { id: String, text: String },
    /// Something the user should know about that is not an error
    Warning { code: String, message: String },
    /// Error message
    Error {
        code: String,
        message: String,
        recoverable: bool,
    },
}

impl ServerMessage {
    pub fn error(error: &ServiceError, i18n: &I18n, locale: &str) -> Self {
        ServerMessage::Error {
            code: error.error_code().to_string(),
            message: error.user_message(i18n, locale),
            recoverable: error.is_recoverable(),
        }
    }
}

impl From<ParsedReply> for ServerMessage {
    fn from(reply: ParsedReply) -> Self {
        ServerMessage::TurnComplete {
            text: reply.text,
            options: reply.options,
        }
    }
}
