//! Personality catalog endpoint backing the client's type selector.

use axum::{Json, extract::State};
use serde::Serialize;
use std::sync::Arc;

use crate::api::AppState;
use crate::catalog::{self, PersonalityCode};

#[derive(Debug, Serialize)]
pub struct PersonalityEntry {
    pub code: PersonalityCode,
    pub description: &'static str,
}

#[derive(Debug, Serialize)]
pub struct PersonalitiesResponse {
    pub personalities: Vec<PersonalityEntry>,
    /// What the four MBTI letters mean
    pub about: String,
    pub free_test_url: &'static str,
}

/// GET /api/personalities
pub async fn list_personalities_handler(
    State(state): State<Arc<AppState>>,
) -> Json<PersonalitiesResponse> {
    let personalities = PersonalityCode::all()
        .map(|code| PersonalityEntry {
            code,
            description: code.description(),
        })
        .collect();

    Json(PersonalitiesResponse {
        personalities,
        about: state.service.i18n.get("en", "mbti-about", None),
        free_test_url: catalog::FREE_TEST_URL,
    })
}
