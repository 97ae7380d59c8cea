//! HTTP API for the Aura service.
//!
//! This module provides the REST API endpoints for:
//! - Health and metrics monitoring
//! - The personality catalog
//! - System prompt preview
//! - Runtime settings
//! - WebSocket chat connections

use axum::{
    Json, Router,
    extract::{State, WebSocketUpgrade},
    http::{StatusCode, header},
    response::IntoResponse,
    routing::{get, post},
};
use metrics_exporter_prometheus::PrometheusHandle;
use serde::Serialize;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::error::{I18nError, ServiceError};
use crate::service::AuraService;
use crate::websocket::handle_ws_connection;

pub mod personalities;
pub mod prompt;
pub mod settings;
use personalities::list_personalities_handler;
use prompt::preview_prompt_handler;
use settings::{get_settings_handler, update_settings_handler};

/// Application state
pub struct AppState {
    pub service: Arc<AuraService>,
    pub metrics: PrometheusHandle,
}

impl AppState {
    /// Create an i18n-aware error from a service error
    pub fn i18n_error(&self, error: ServiceError) -> I18nError {
        I18nError::new(error, self.service.i18n.clone(), "en")
    }
}

/// Build the API router
pub fn router(service: Arc<AuraService>, metrics: PrometheusHandle) -> Router {
    let state = Arc::new(AppState { service, metrics });

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api_routes = Router::new()
        .route("/personalities", get(list_personalities_handler))
        .route("/prompt/preview", post(preview_prompt_handler))
        .route(
            "/settings",
            get(get_settings_handler).put(update_settings_handler),
        );

    Router::new()
        .route("/health", get(health_handler))
        .route("/metrics", get(metrics_handler))
        .route("/ws", get(ws_handler))
        .nest("/api", api_routes)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// === Health & Metrics ===

async fn health_handler(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let service = &state.service;
    let credential_configured = service.has_credential();

    // Users can still supply their own key, so a missing one only degrades
    let status = if credential_configured {
        service.i18n.get("en", "health-status-healthy", None)
    } else {
        service.i18n.format(
            "en",
            "health-status-degraded",
            &[("reason", "no Gemini API key configured")],
        )
    };

    Json(HealthResponse {
        status,
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: service.uptime().as_secs(),
        credential_configured,
        model: service.runtime_config.dynamic().gemini.model.clone(),
        connections: service.ws_manager.connection_count(),
        active_chats: service.ws_manager.active_chat_count(),
    })
}

#[derive(Serialize)]
struct HealthResponse {
    status: String,
    version: String,
    uptime_seconds: u64,
    credential_configured: bool,
    model: String,
    connections: usize,
    active_chats: usize,
}

async fn metrics_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

// === WebSocket ===

async fn ws_handler(ws: WebSocketUpgrade, State(state): State<Arc<AppState>>) -> impl IntoResponse {
    info!("WebSocket upgrade request received");
    ws.on_upgrade(move |socket| handle_ws_connection(socket, state.service.clone()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::tests::test_service;
    use axum::body::{Body, to_bytes};
    use axum::http::Request;
    use metrics_exporter_prometheus::PrometheusBuilder;
    use tower::ServiceExt;

    fn app(api_key: Option<&str>) -> Router {
        let (service, _) = test_service(api_key, vec![], Ok(String::new()));
        let handle = PrometheusBuilder::new().build_recorder().handle();
        router(service, handle)
    }

    async fn json_body(response: axum::response::Response) -> serde_json::Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn json_request(method: &str, uri: &str, body: serde_json::Value) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let response = app(None)
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = json_body(response).await;
        assert_eq!(body["credential_configured"], false);
        assert_eq!(body["model"], "gemini-2.5-pro");
        assert_eq!(body["connections"], 0);
        assert!(body["status"].as_str().unwrap().contains("degraded"));
    }

    #[tokio::test]
    async fn test_metrics_content_type() {
        let response = app(None)
            .oneshot(Request::get("/metrics").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "text/plain; version=0.0.4"
        );
    }

    #[tokio::test]
    async fn test_personalities() {
        let response = app(None)
            .oneshot(Request::get("/api/personalities").body(Body::empty()).unwrap())
            .await
            .unwrap();
        let body = json_body(response).await;

        let list = body["personalities"].as_array().unwrap();
        assert_eq!(list.len(), 16);
        assert_eq!(list[0]["code"], "INTJ");
        assert!(body["about"].as_str().unwrap().starts_with("The MBTI"));
        assert_eq!(body["free_test_url"], crate::catalog::FREE_TEST_URL);
    }

    #[tokio::test]
    async fn test_prompt_preview() {
        let response = app(None)
            .oneshot(json_request(
                "POST",
                "/api/prompt/preview",
                serde_json::json!({
                    "personality": "infp",
                    "financial_info": "student",
                    "narrative_mode": false
                }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = json_body(response).await;
        let prompt = body["system_instruction"].as_str().unwrap();
        assert_eq!(body["known_personality"], true);
        assert!(prompt.contains("'student'"));
        assert!(!prompt.contains(crate::service::reply::OPTIONS_DELIMITER));
        assert!(prompt.contains(crate::service::prompts::CRISIS_MESSAGE));
    }

    #[tokio::test]
    async fn test_settings_roundtrip_masks_secrets() {
        let app = app(None);

        let response = app
            .clone()
            .oneshot(json_request(
                "PUT",
                "/api/settings",
                serde_json::json!({"settings": {"gemini.api_key": "secret", "gemini.model": "gemini-2.5-flash"}}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["settings"]["gemini.api_key"], "********");
        assert_eq!(body["settings"]["gemini.model"], "gemini-2.5-flash");
        assert_eq!(
            body["overridden"],
            serde_json::json!(["gemini.api_key", "gemini.model"])
        );

        let response = app
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(json_body(response).await["credential_configured"], true);
    }

    #[tokio::test]
    async fn test_unknown_setting_rejected() {
        let response = app(None)
            .oneshot(json_request(
                "PUT",
                "/api/settings",
                serde_json::json!({"settings": {"ollama.base_url": "x"}}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json_body(response).await["code"], "invalid_request");
    }

    #[tokio::test]
    async fn test_mistyped_setting_rejected() {
        let app = app(None);

        let response = app
            .clone()
            .oneshot(json_request(
                "PUT",
                "/api/settings",
                serde_json::json!({"settings": {"gemini.temperature": "hot", "gemini.request_timeout_secs": 0}}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json_body(response).await["code"], "invalid_request");

        let response = app
            .oneshot(Request::get("/api/settings").body(Body::empty()).unwrap())
            .await
            .unwrap();
        let body = json_body(response).await;
        assert_eq!(body["overridden"], serde_json::json!([]));
        assert_eq!(body["settings"]["gemini.request_timeout_secs"], 120);
    }
}
