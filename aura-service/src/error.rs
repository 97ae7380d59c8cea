use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use crate::i18n::I18n;

/// Main service error type
#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("No API credential configured for the generative model")]
    MissingCredential,

    #[error("Chat has not been started")]
    SessionNotActive,

    #[error("Chat already started")]
    SessionAlreadyActive,

    #[error("{0}")]
    Model(#[from] ModelError),

    #[error("{0}")]
    Transcription(#[from] TranscriptionError),

    #[error("Invalid request: {message}")]
    InvalidRequest { message: String },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Internal error: {message}")]
    Internal { message: String },
}

/// Generative model client errors
#[derive(Error, Debug)]
pub enum ModelError {
    #[error("Connection failed to model API at {url}")]
    Connection {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Generation failed (status {status}): {message}")]
    Generation { status: u16, message: String },

    #[error("Prompt blocked by the model: {reason}")]
    Blocked { reason: String },

    #[error("Model returned no text")]
    EmptyResponse,

    #[error("Invalid response from model API")]
    InvalidResponse {
        #[source]
        source: reqwest::Error,
    },
}

/// Voice transcription outcomes other than recognized text
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TranscriptionError {
    #[error("Speech could not be understood")]
    Unintelligible,

    #[error("Transcription failed: {0}")]
    Failure(String),
}

/// API error response (matches Axum's built-in JsonRejection format)
#[derive(Serialize)]
pub struct ErrorResponse {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

impl ServiceError {
    fn status_code(&self) -> StatusCode {
        match self {
            ServiceError::MissingCredential => StatusCode::SERVICE_UNAVAILABLE,
            ServiceError::SessionNotActive | ServiceError::SessionAlreadyActive => {
                StatusCode::CONFLICT
            }
            ServiceError::InvalidRequest { .. } => StatusCode::BAD_REQUEST,
            ServiceError::Transcription(TranscriptionError::Unintelligible) => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            ServiceError::Model(_) => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            ServiceError::MissingCredential => "missing_credential",
            ServiceError::SessionNotActive => "session_not_active",
            ServiceError::SessionAlreadyActive => "session_already_active",
            ServiceError::Model(ModelError::Connection { .. }) => "model_connection",
            ServiceError::Model(ModelError::Generation { .. }) => "model_generation",
            ServiceError::Model(ModelError::Blocked { .. }) => "model_blocked",
            ServiceError::Model(ModelError::EmptyResponse) => "model_empty_response",
            ServiceError::Model(ModelError::InvalidResponse { .. }) => "model_invalid_response",
            ServiceError::Transcription(TranscriptionError::Unintelligible) => {
                "speech_unintelligible"
            }
            ServiceError::Transcription(TranscriptionError::Failure(_)) => "transcription_failed",
            ServiceError::InvalidRequest { .. } => "invalid_request",
            ServiceError::Config { .. } => "config_error",
            ServiceError::Internal { .. } => "internal_error",
        }
    }

    /// Whether the client can carry on after this error without reconnecting
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, ServiceError::Internal { .. })
    }

    /// Get a user-friendly translated message
    pub fn user_message(&self, i18n: &I18n, locale: &str) -> String {
        match self {
            ServiceError::MissingCredential => i18n.get(locale, "error-missing-credential", None),
            ServiceError::SessionNotActive => i18n.get(locale, "error-session-not-active", None),
            ServiceError::Model(_) => {
                i18n.format(locale, "error-model", &[("detail", &self.to_string())])
            }
            ServiceError::Transcription(TranscriptionError::Unintelligible) => {
                i18n.get(locale, "voice-unintelligible", None)
            }
            ServiceError::Transcription(TranscriptionError::Failure(detail)) => {
                i18n.format(locale, "voice-failed", &[("detail", detail)])
            }
            ServiceError::Internal { .. } => i18n.get(locale, "error-internal", None),
            // For other errors, fall back to the technical message
            _ => self.to_string(),
        }
    }

    /// Convert to an error response with i18n support
    pub fn into_response_with_i18n(self, i18n: &I18n, locale: &str) -> Response {
        let status = self.status_code();
        let response = ErrorResponse {
            message: self.user_message(i18n, locale),
            code: Some(self.error_code().to_string()),
        };

        (status, Json(response)).into_response()
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let response = ErrorResponse {
            message: self.to_string(),
            code: Some(self.error_code().to_string()),
        };

        (status, Json(response)).into_response()
    }
}

/// Result type alias for service operations
pub type ServiceResult<T> = Result<T, ServiceError>;

/// Error wrapper with i18n support for API responses
pub struct I18nError {
    pub error: ServiceError,
    pub i18n: std::sync::Arc<I18n>,
    pub locale: String,
}

impl I18nError {
    pub fn new(error: ServiceError, i18n: std::sync::Arc<I18n>, locale: impl Into<String>) -> Self {
        Self {
            error,
            i18n,
            locale: locale.into(),
        }
    }
}

impl IntoResponse for I18nError {
    fn into_response(self) -> Response {
        self.error.into_response_with_i18n(&self.i18n, &self.locale)
    }
}

/// Render an error with its full source chain for logging
pub fn format_error_chain(error: &dyn std::error::Error) -> String {
    let mut out = error.to_string();
    let mut source = error.source();
    while let Some(cause) = source {
        out.push_str(": ");
        out.push_str(&cause.to_string());
        source = cause.source();
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(
            ServiceError::MissingCredential.error_code(),
            "missing_credential"
        );
        assert_eq!(
            ServiceError::from(TranscriptionError::Unintelligible).error_code(),
            "speech_unintelligible"
        );
        assert_eq!(
            ServiceError::from(ModelError::EmptyResponse).error_code(),
            "model_empty_response"
        );
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(
            ServiceError::InvalidRequest {
                message: "bad".to_string()
            }
            .status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ServiceError::from(ModelError::Generation {
                status: 500,
                message: "boom".to_string()
            })
            .status_code(),
            StatusCode::BAD_GATEWAY
        );
    }

    #[test]
    fn test_user_messages_are_translated() {
        let i18n = I18n::new();
        let msg = ServiceError::Transcription(TranscriptionError::Unintelligible)
            .user_message(&i18n, "en");
        assert_eq!(msg, "Aura couldn't understand the audio. Please try again.");

        let msg = ServiceError::MissingCredential.user_message(&i18n, "en");
        assert!(msg.contains("API key"));
    }

    #[test]
    fn test_format_error_chain() {
        let io = std::io::Error::other("disk on fire");
        let err = ServiceError::Internal {
            message: "write failed".to_string(),
        };
        assert_eq!(format_error_chain(&err), "Internal error: write failed");
        assert_eq!(format_error_chain(&io), "disk on fire");
    }

    #[test]
    fn test_recoverable() {
        assert!(ServiceError::MissingCredential.is_recoverable());
        assert!(
            !ServiceError::Internal {
                message: "x".to_string()
            }
            .is_recoverable()
        );
    }
}
