use fluent_bundle::concurrent::FluentBundle;
use fluent_bundle::{FluentArgs, FluentResource};
use std::collections::HashMap;
use std::sync::RwLock;
use tracing::{debug, warn};
use unic_langid::LanguageIdentifier;

/// Internationalization service using Fluent (thread-safe)
pub struct I18n {
    bundles: RwLock<HashMap<String, FluentBundle<FluentResource>>>,
    default_locale: String,
}

impl I18n {
    /// Create a new i18n service with embedded English translations
    pub fn new() -> Self {
        let i18n = Self {
            bundles: RwLock::new(HashMap::new()),
            default_locale: "en".to_string(),
        };

        i18n.load_embedded_en();

        i18n
    }

    /// Add a locale with translations
    pub fn add_locale(&self, locale: &str, content: &str) -> Result<(), String> {
        let lang_id: LanguageIdentifier = locale
            .parse()
            .map_err(|e| format!("Invalid locale '{}': {}", locale, e))?;

        let resource = FluentResource::try_new(content.to_string())
            .map_err(|(_, errors)| format!("Failed to parse Fluent resource: {:?}", errors))?;

        let mut bundle = FluentBundle::new_concurrent(vec![lang_id]);
        bundle
            .add_resource(resource)
            .map_err(|errors| format!("Failed to add resource to bundle: {:?}", errors))?;

        let mut bundles = self
            .bundles
            .write()
            .map_err(|_| "Translation bundles lock poisoned".to_string())?;
        bundles.insert(locale.to_string(), bundle);

        debug!(locale = %locale, "Loaded translations");

        Ok(())
    }

    /// Get a translated message
    pub fn get(&self, locale: &str, key: &str, args: Option<&FluentArgs>) -> String {
        // Try requested locale, fall back to default, fall back to key
        self.try_get(locale, key, args)
            .or_else(|| self.try_get(&self.default_locale, key, args))
            .unwrap_or_else(|| key.to_string())
    }

    fn try_get(&self, locale: &str, key: &str, args: Option<&FluentArgs>) -> Option<String> {
        let bundles = self.bundles.read().ok()?;
        let bundle = bundles.get(locale)?;
        let message = bundle.get_message(key)?;
        let pattern = message.value()?;

        let mut errors = vec![];
        let result = bundle.format_pattern(pattern, args, &mut errors);

        if !errors.is_empty() {
            warn!(key = %key, errors = ?errors, "Fluent formatting errors");
        }

        Some(result.to_string())
    }

    /// Get a translated message with arguments
    pub fn format(&self, locale: &str, key: &str, args: &[(&str, &str)]) -> String {
        let mut fluent_args = FluentArgs::new();
        for (k, v) in args {
            fluent_args.set(*k, *v);
        }
        self.get(locale, key, Some(&fluent_args))
    }

    fn load_embedded_en(&self) {
        let en_translations = r#"
# Aura - English Translations

# Errors
error-missing-credential = Please provide your Gemini API key to begin.
error-session-not-active = Start a chat first by sharing what's on your mind.
error-model = Aura couldn't reply just now ({ $detail }). Your message was not kept, so please send it again.
error-internal = An internal error occurred

# Chat
chat-welcome = Welcome! I'm here to listen. To help me understand you better, please share your MBTI personality type, it helps me know more about you. If you don't know your type, you can take a free test at 16Personalities.
chat-empty-problem = Please share what's on your mind to start the chat.
chat-thinking = Aura is thinking...

# Voice
voice-transcribing = Transcribing your voice...
voice-unintelligible = Aura couldn't understand the audio. Please try again.
voice-failed = An error occurred during transcription: { $detail }

# MBTI explainer
mbti-about =
    The MBTI was built on the theories of the Swiss psychiatrist Carl Jung, but he didn't create the personality test himself. The actual creators were an American mother-daughter team, Katharine Cook Briggs and Isabel Myers. It looks at four key areas:
    - Where you get your energy: from the inner world (Introversion - I) or the outer world (Extraversion - E).
    - How you process information: focusing on facts and details (Sensing - S) or patterns and possibilities (Intuition - N).
    - How you make decisions: based on logic and reason (Thinking - T) or values and people (Feeling - F).
    - How you prefer to live: in a planned, organized way (Judging - J) or a more spontaneous, flexible way (Perceiving - P).
    Your four preferences combine to make up your unique personality type!

# Health
health-status-healthy = Service is healthy
health-status-degraded = Service is degraded: { $reason }
"#;

        if let Err(e) = self.add_locale("en", en_translations) {
            warn!(error = %e, "Failed to load embedded English translations");
        }
    }
}

impl Default for I18n {
    fn default() -> Self {
        Self::new()
    }
}
