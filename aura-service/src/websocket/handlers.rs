//! WebSocket message handlers.
//!
//! Each connection owns one [`ChatSession`]. Client messages are handled
//! strictly in order: a turn finishes before the next message is read.

use axum::extract::ws::{Message, WebSocket};
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use futures::{SinkExt, StreamExt};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use crate::catalog;
use crate::error::{ServiceError, ServiceResult, TranscriptionError};
use crate::service::{AuraService, ChatSession, ChatSetup, TurnOutcome, UserContext};

use super::messages::{ClientMessage, ServerMessage};

const LOCALE: &str = "en";

/// Handle a WebSocket connection
///
/// Runs until the client disconnects. The session dies with the connection.
pub async fn handle_ws_connection(socket: WebSocket, service: Arc<AuraService>) {
    let mut session = ChatSession::new();
    let session_id = session.id().to_string();
    info!(session_id = %session_id, "New WebSocket connection");

    let (mut ws_tx, mut ws_rx) = socket.split();
    let (msg_tx, mut msg_rx) = mpsc::unbounded_channel::<ServerMessage>();
    service.ws_manager.add_connection(session_id.clone(), msg_tx);

    // Forward queued messages to the socket
    let session_id_clone = session_id.clone();
    let send_task = tokio::spawn(async move {
        while let Some(msg) = msg_rx.recv().await {
            match serde_json::to_string(&msg) {
                Ok(json) => {
                    if ws_tx.send(Message::Text(json.into())).await.is_err() {
                        break;
                    }
                }
                Err(e) => {
                    error!(error = %e, "Failed to serialize WebSocket message");
                }
            }
        }
        debug!(session_id = %session_id_clone, "WebSocket send task ended");
    });

    send_welcome(&session, &service);

    while let Some(result) = ws_rx.next().await {
        match result {
            Ok(Message::Text(text)) => {
                handle_client_message(&mut session, &text, &service).await;
            }
            Ok(Message::Binary(data)) => {
                if let Ok(text) = String::from_utf8(data.to_vec()) {
                    handle_client_message(&mut session, &text, &service).await;
                }
            }
            Ok(Message::Ping(_)) | Ok(Message::Pong(_)) => {}
            Ok(Message::Close(_)) => {
                info!(session_id = %session_id, "WebSocket connection closed by client");
                break;
            }
            Err(e) => {
                error!(session_id = %session_id, error = %e, "WebSocket error");
                break;
            }
        }
    }

    service.ws_manager.remove_connection(&session_id);
    send_task.abort();
    info!(
        session_id = %session_id,
        transcript_len = session.transcript().len(),
        "WebSocket connection closed"
    );
}

fn send_welcome(session: &ChatSession, service: &AuraService) {
    service.ws_manager.send_to(
        session.id(),
        ServerMessage::Welcome {
            session_id: session.id().to_string(),
            message: service.i18n.get(LOCALE, "chat-welcome", None),
            about_mbti: service.i18n.get(LOCALE, "mbti-about", None),
            free_test_url: catalog::FREE_TEST_URL.to_string(),
            credential_configured: service.has_credential(),
        },
    );
}

/// Handle one client message against the connection's session
pub(crate) async fn handle_client_message(
    session: &mut ChatSession,
    text: &str,
    service: &AuraService,
) {
    let msg: ClientMessage = match serde_json::from_str(text) {
        Ok(msg) => msg,
        Err(e) => {
            warn!(
                session_id = %session.id(),
                error = %e,
                "Failed to parse client message"
            );
            service.ws_manager.send_to(
                session.id(),
                ServerMessage::Error {
                    code: "parse_error".to_string(),
                    message: format!("Failed to parse message: {}", e),
                    recoverable: true,
                },
            );
            return;
        }
    };

    match msg {
        ClientMessage::Ping => {
            let timestamp = SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|d| d.as_millis() as u64)
                .unwrap_or(0);
            service
                .ws_manager
                .send_to(session.id(), ServerMessage::Pong { timestamp });
        }
        ClientMessage::ProvideApiKey { api_key } => {
            session.set_credential(&api_key);
            debug!(
                session_id = %session.id(),
                credential_set = session.credential().is_some(),
                "Session API key updated"
            );
            send_state(session, service);
        }
        ClientMessage::StartChat {
            personality,
            financial_info,
            orientation_info,
            problem,
        } => {
            let setup = ChatSetup {
                context: UserContext {
                    personality,
                    financial_info,
                    orientation_info,
                },
                problem,
            };
            let result = start_chat(session, setup, service).await;
            report_turn(session, service, result);
        }
        ClientMessage::SendMessage { text } => {
            if text.trim().is_empty() {
                debug!(session_id = %session.id(), "Ignored blank message");
                return;
            }
            send_status(session, service, "chat-thinking");
            let result = session.take_turn(&text).await;
            report_turn(session, service, result);
        }
        ClientMessage::SelectOption { index } => {
            send_status(session, service, "chat-thinking");
            let result = session.select_option(index).await;
            report_turn(session, service, result);
        }
        ClientMessage::Audio { id, data } => {
            handle_audio(session, service, id, &data).await;
        }
        ClientMessage::SetNarrativeMode { enabled } => {
            session.set_narrative_mode(enabled);
            debug!(session_id = %session.id(), enabled, "Narrative mode changed");
            send_state(session, service);
        }
        ClientMessage::NewChat => {
            session.reset();
            service.ws_manager.set_chat_active(session.id(), false);
            send_state(session, service);
        }
    }
}

async fn start_chat(
    session: &mut ChatSession,
    setup: ChatSetup,
    service: &AuraService,
) -> ServiceResult<TurnOutcome> {
    if session.is_active() {
        return Err(ServiceError::SessionAlreadyActive);
    }
    if setup.problem.trim().is_empty() {
        return Ok(TurnOutcome::Skipped);
    }

    let backend = service.model_for(session)?;
    send_status(session, service, "chat-thinking");
    session.activate(backend, setup).await
}

/// Send the outcome of a turn back to the client
fn report_turn(session: &ChatSession, service: &AuraService, result: ServiceResult<TurnOutcome>) {
    match result {
        Ok(TurnOutcome::Replied(reply)) => {
            service.ws_manager.set_chat_active(session.id(), true);
            service.ws_manager.send_to(session.id(), reply.into());
            send_state(session, service);
        }
        Ok(TurnOutcome::Skipped) if !session.is_active() => {
            service.ws_manager.send_to(
                session.id(),
                ServerMessage::Warning {
                    code: "empty_problem".to_string(),
                    message: service.i18n.get(LOCALE, "chat-empty-problem", None),
                },
            );
        }
        Ok(TurnOutcome::Skipped) => {
            debug!(session_id = %session.id(), "Ignored blank message");
        }
        Err(e) => {
            warn!(
                session_id = %session.id(),
                code = e.error_code(),
                error = %e,
                "Chat turn failed"
            );
            service
                .ws_manager
                .send_to(session.id(), ServerMessage::error(&e, &service.i18n, LOCALE));
        }
    }
}

async fn handle_audio(session: &mut ChatSession, service: &AuraService, id: String, data: &str) {
    if !session.accept_audio(&id) {
        debug!(session_id = %session.id(), audio_id = %id, "Ignoring repeated recording");
        return;
    }

    let bytes = match BASE64.decode(data.trim()) {
        Ok(bytes) => bytes,
        Err(e) => {
            let err = ServiceError::InvalidRequest {
                message: format!("Audio is not valid base64: {}", e),
            };
            service
                .ws_manager
                .send_to(session.id(), ServerMessage::error(&err, &service.i18n, LOCALE));
            return;
        }
    };

    send_status(session, service, "voice-transcribing");
    match service.transcriber.transcribe(&bytes).await {
        Ok(text) => {
            service.ws_manager.send_to(
                session.id(),
                ServerMessage::Transcription {
                    id,
                    text: text.clone(),
                },
            );
            // Before the chat starts the client uses the text as its problem statement
            if session.is_active() {
                send_status(session, service, "chat-thinking");
                let result = session.take_turn(&text).await;
                report_turn(session, service, result);
            }
        }
        Err(TranscriptionError::Unintelligible) => {
            service.ws_manager.send_to(
                session.id(),
                ServerMessage::Warning {
                    code: "speech_unintelligible".to_string(),
                    message: service.i18n.get(LOCALE, "voice-unintelligible", None),
                },
            );
        }
        Err(failure) => {
            let err = ServiceError::Transcription(failure);
            service
                .ws_manager
                .send_to(session.id(), ServerMessage::error(&err, &service.i18n, LOCALE));
        }
    }
}

fn send_status(session: &ChatSession, service: &AuraService, key: &str) {
    service.ws_manager.send_to(
        session.id(),
        ServerMessage::Status {
            message: service.i18n.get(LOCALE, key, None),
        },
    );
}

fn send_state(session: &ChatSession, service: &AuraService) {
    service
        .ws_manager
        .send_to(session.id(), ServerMessage::SessionState(session.snapshot()));
}
