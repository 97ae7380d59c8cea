//! Settings API endpoints for changing dynamic configuration at runtime.

use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

use crate::api::AppState;
use crate::error::I18nError;

/// Response for GET /api/settings
#[derive(Debug, Serialize)]
pub struct SettingsResponse {
    /// Current effective settings, secrets masked
    pub settings: HashMap<String, serde_json::Value>,
    /// Keys set at runtime (vs file/env defaults)
    pub overridden: Vec<String>,
}

/// Request body for PUT /api/settings
#[derive(Debug, Deserialize)]
pub struct UpdateSettingsRequest {
    /// Settings to update (key -> value). Use null to revert to the default.
    pub settings: HashMap<String, serde_json::Value>,
}

/// GET /api/settings - retrieve all settings with their current values
pub async fn get_settings_handler(State(state): State<Arc<AppState>>) -> Json<SettingsResponse> {
    let runtime_config = &state.service.runtime_config;
    Json(SettingsResponse {
        settings: runtime_config.dynamic().to_key_value_map(),
        overridden: runtime_config.overridden_keys(),
    })
}

/// PUT /api/settings - update settings (takes effect for the next request)
pub async fn update_settings_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<UpdateSettingsRequest>,
) -> Result<Json<SettingsResponse>, I18nError> {
    state
        .service
        .update_settings(request.settings)
        .map_err(|e| state.i18n_error(e))?;

    Ok(get_settings_handler(State(state)).await)
}
