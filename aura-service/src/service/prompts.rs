//! System prompt building for the companion persona.

use crate::catalog;

use super::reply::OPTIONS_DELIMITER;
use super::state::UserContext;

/// Fixed reply the model must give when the user signals danger
pub const CRISIS_MESSAGE: &str = "It sounds like you are going through a very difficult time, and it's important to talk to someone who can help you stay safe right now. Please reach out to a crisis hotline immediately. In India, you can connect with AASRA at +91-9820466726. Help is available and you deserve support.";

const SYSTEM_PROMPT_TEMPLATE: &str = include_str!("../../prompts/system.txt");
const NARRATIVE_TEMPLATE: &str = include_str!("../../prompts/narrative.txt");

/// Build the system instruction for a new chat.
///
/// Deterministic: identical inputs always produce identical text. Context
/// fields that are blank after trimming are left out entirely; non-blank
/// ones are quoted as given.
pub fn compose(
    code: &str,
    financial_info: Option<&str>,
    orientation_info: Option<&str>,
    narrative_mode: bool,
) -> String {
    let description = catalog::lookup(code);

    let mut prompt = SYSTEM_PROMPT_TEMPLATE
        .replace("{mbti_type}", code)
        .replace("{description}", description)
        .replace("{crisis_message}", CRISIS_MESSAGE);

    if narrative_mode {
        prompt.push_str(&NARRATIVE_TEMPLATE.replace("{delimiter}", OPTIONS_DELIMITER));
    }

    if let Some(info) = non_blank(financial_info) {
        prompt.push_str(&format!(
            "\n- The user has optionally shared this about their financial situation: '{}'. Be mindful of this context without making assumptions.",
            info
        ));
    }
    if let Some(info) = non_blank(orientation_info) {
        prompt.push_str(&format!(
            "\n- The user has optionally shared this about their sexual orientation: '{}'. Be respectful and inclusive of this identity.",
            info
        ));
    }

    prompt
}

/// Build the system instruction from a session's user context
pub fn compose_for(context: &UserContext, narrative_mode: bool) -> String {
    compose(
        &context.personality,
        context.financial_info.as_deref(),
        context.orientation_info.as_deref(),
        narrative_mode,
    )
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}
