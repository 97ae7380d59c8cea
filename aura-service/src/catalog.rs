//! MBTI personality catalog.
//!
//! Sixteen fixed type codes, each mapped to the paragraph used to
//! personalize the system prompt.

use serde::Serialize;
use strum::{AsRefStr, Display, EnumIter, EnumString, IntoEnumIterator};

/// Description used for any code outside the catalog
pub const FALLBACK_DESCRIPTION: &str = "a unique individual";

/// Link offered to users who don't know their type
pub const FREE_TEST_URL: &str = "https://www.16personalities.com/free-personality-test";

/// One of the sixteen MBTI personality type codes
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Display,
    AsRefStr,
    EnumString,
    EnumIter,
)]
#[strum(ascii_case_insensitive)]
pub enum PersonalityCode {
    #[strum(serialize = "INTJ")]
    #[serde(rename = "INTJ")]
    Intj,
    #[strum(serialize = "INTP")]
    #[serde(rename = "INTP")]
    Intp,
    #[strum(serialize = "ENTJ")]
    #[serde(rename = "ENTJ")]
    Entj,
    #[strum(serialize = "ENTP")]
    #[serde(rename = "ENTP")]
    Entp,
    #[strum(serialize = "INFJ")]
    #[serde(rename = "INFJ")]
    Infj,
    #[strum(serialize = "INFP")]
    #[serde(rename = "INFP")]
    Infp,
    #[strum(serialize = "ENFJ")]
    #[serde(rename = "ENFJ")]
    Enfj,
    #[strum(serialize = "ENFP")]
    #[serde(rename = "ENFP")]
    Enfp,
    #[strum(serialize = "ISTJ")]
    #[serde(rename = "ISTJ")]
    Istj,
    #[strum(serialize = "ISFJ")]
    #[serde(rename = "ISFJ")]
    Isfj,
    #[strum(serialize = "ESTJ")]
    #[serde(rename = "ESTJ")]
    Estj,
    #[strum(serialize = "ESFJ")]
    #[serde(rename = "ESFJ")]
    Esfj,
    #[strum(serialize = "ISTP")]
    #[serde(rename = "ISTP")]
    Istp,
    #[strum(serialize = "ISFP")]
    #[serde(rename = "ISFP")]
    Isfp,
    #[strum(serialize = "ESTP")]
    #[serde(rename = "ESTP")]
    Estp,
    #[strum(serialize = "ESFP")]
    #[serde(rename = "ESFP")]
    Esfp,
}

impl PersonalityCode {
    /// All codes in catalog order
    pub fn all() -> impl Iterator<Item = PersonalityCode> {
        PersonalityCode::iter()
    }

    pub fn description(&self) -> &'static str {
        match self {
            PersonalityCode::Intj => {
                "As an INTJ, you're a strategic thinker, known for your logic, creativity, and drive. You appreciate directness and well-reasoned ideas. Your mentor will respect your independence and offer clear, logical perspectives."
            }
            PersonalityCode::Intp => {
                "As an INTP, you're an innovative inventor, fascinated by logical analysis and complex systems. You value intellectual connection and precision. Your mentor will engage your curiosity and explore possibilities with you."
            }
            PersonalityCode::Entj => {
                "As an ENTJ, you're a bold commander, a natural leader who is decisive and loves a good challenge. You thrive on momentum and accomplishment. Your mentor will be a strategic partner, helping you channel your energy effectively."
            }
            PersonalityCode::Entp => {
                "As an ENTP, you're a clever debater, always questioning the status quo and exploring new ideas. You are quick-witted and enjoy intellectual sparring. Your mentor will brainstorm with you and challenge your ideas constructively."
            }
            PersonalityCode::Infj => {
                "As an INFJ, you're a quiet advocate, driven by your strong values and a desire to help others. You are insightful and compassionate. Your mentor will listen deeply and help you navigate your rich inner world."
            }
            PersonalityCode::Infp => {
                "As an INFP, you are a thoughtful mediator, guided by your core values and a vivid imagination. You are empathetic and seek harmony. Your mentor will be a gentle guide, supporting your journey of self-discovery."
            }
            PersonalityCode::Enfj => {
                "As an ENFJ, you're a charismatic protagonist, inspiring others with your passion and idealism. You are a natural connector of people. Your mentor will be an encouraging coach, helping you realize your vision."
            }
            PersonalityCode::Enfp => {
                "As an ENFP, you're a creative campaigner, full of energy and a desire to connect with others on an emotional level. You are enthusiastic and imaginative. Your mentor will be a supportive friend, celebrating your ideas and spirit."
            }
            PersonalityCode::Istj => {
                "As an ISTJ, you're a practical logistician, known for your reliability, integrity, and dedication to facts. You value structure and order. Your mentor will provide dependable, fact-based guidance."
            }
            PersonalityCode::Isfj => {
                "As an ISFJ, you're a warm defender, dedicated to protecting and caring for the people you love. You are meticulous and kind-hearted. Your mentor will be a source of steady, compassionate support."
            }
            PersonalityCode::Estj => {
                "As an ESTJ, you're an effective executive, a pillar of your community who values order and tradition. You are organized and honest. Your mentor will offer practical advice to help you manage your responsibilities."
            }
            PersonalityCode::Esfj => {
                "As an ESFJ, you're a caring consul, a popular and supportive friend who is always eager to help. You thrive in social harmony. Your mentor will be a warm and encouraging presence."
            }
            PersonalityCode::Istp => {
                "As an ISTP, you're a hands-on virtuoso, a natural maker and troubleshooter who loves to understand how things work. You are practical and action-oriented. Your mentor will focus on concrete steps and tangible solutions."
            }
            PersonalityCode::Isfp => {
                "As an ISFP, you're a charming adventurer, always ready to explore and experience something new. You are artistic and live in the moment. Your mentor will encourage your creativity and unique perspective."
            }
            PersonalityCode::Estp => {
                "As an ESTP, you're an energetic entrepreneur, living life on the edge with a love for action and immediate results. You are perceptive and sociable. Your mentor will keep things engaging and focus on the here-and-now."
            }
            PersonalityCode::Esfp => {
                "As an ESFP, you're a spontaneous entertainer, lighting up any room with your energy and love for life. You are vivacious and generous. Your mentor will be a fun and engaging supporter of your journey."
            }
        }
    }
}

/// Look up the description for a type code, falling back for unknown codes
pub fn lookup(code: &str) -> &'static str {
    code.trim()
        .parse::<PersonalityCode>()
        .map(|c| c.description())
        .unwrap_or(FALLBACK_DESCRIPTION)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_every_code_has_distinct_description() {
        let mut seen = HashSet::new();
        for code in PersonalityCode::all() {
            let name: &str = code.as_ref();
            let desc = lookup(name);
            assert!(!desc.is_empty());
            assert_ne!(desc, FALLBACK_DESCRIPTION);
            assert!(desc.contains(name), "{code} description names its type");
            assert!(seen.insert(desc));
        }
        assert_eq!(seen.len(), 16);
    }

    #[test]
    fn test_unknown_code_falls_back() {
        assert_eq!(lookup("XXXX"), FALLBACK_DESCRIPTION);
        assert_eq!(lookup(""), FALLBACK_DESCRIPTION);
        assert_eq!(lookup("INTJX"), FALLBACK_DESCRIPTION);
    }

    #[test]
    fn test_parse_is_case_insensitive() {
        assert_eq!("infp".parse::<PersonalityCode>().ok(), Some(PersonalityCode::Infp));
        assert_eq!(lookup(" enfj "), PersonalityCode::Enfj.description());
    }

    #[test]
    fn test_catalog_order() {
        let codes: Vec<String> = PersonalityCode::all().map(|c| c.to_string()).collect();
        assert_eq!(codes.first().map(String::as_str), Some("INTJ"));
        assert_eq!(codes.last().map(String::as_str), Some("ESFP"));
    }
}
