//! System prompt preview, so operators can see exactly what the model is told.

use axum::Json;
use serde::{Deserialize, Serialize};

use crate::catalog;
use crate::service::UserContext;
use crate::service::prompts;

fn default_narrative_mode() -> bool {
    true
}

#[derive(Debug, Deserialize)]
pub struct PromptPreviewRequest {
    #[serde(flatten)]
    pub context: UserContext,
    #[serde(default = "default_narrative_mode")]
    pub narrative_mode: bool,
}

#[derive(Debug, Serialize)]
pub struct PromptPreviewResponse {
    pub system_instruction: String,
    /// False when the personality code fell back to the generic description
    pub known_personality: bool,
}

/// POST /api/prompt/preview
pub async fn preview_prompt_handler(
    Json(request): Json<PromptPreviewRequest>,
) -> Json<PromptPreviewResponse> {
    let known_personality = request
        .context
        .personality
        .trim()
        .parse::<catalog::PersonalityCode>()
        .is_ok();

    Json(PromptPreviewResponse {
        system_instruction: prompts::compose_for(&request.context, request.narrative_mode),
        known_personality,
    })
}
