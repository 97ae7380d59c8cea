//! Splitting model output into the reply text and suggested follow-ups.
//!
//! The wire contract with the model is a line holding [`OPTIONS_DELIMITER`]
//! after the main reply, followed by `- ` bulleted suggestions. Output that
//! doesn't follow it degrades to a plain reply with no options.

use serde::Serialize;

/// Separator line between the reply and its follow-up options
pub const OPTIONS_DELIMITER: &str = "---OPTIONS---";

/// Most options the prompt asks the model for
pub const MAX_OPTIONS: usize = 3;

/// A model reply split into its visible text and follow-up options
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ParsedReply {
    pub text: String,
    pub options: Vec<String>,
}

/// Parse raw model text.
///
/// With narrative mode off the delimiter is not interpreted at all. Splitting
/// is total: a missing delimiter or malformed bullets just yield fewer (or
/// no) options, never an error.
pub fn parse(raw: &str, narrative_mode: bool) -> ParsedReply {
    let split = if narrative_mode {
        raw.split_once(OPTIONS_DELIMITER)
    } else {
        None
    };

    let Some((head, tail)) = split else {
        return ParsedReply {
            text: raw.trim().to_string(),
            options: Vec::new(),
        };
    };

    let options = tail
        .lines()
        .map(|line| strip_bullet(line.trim()))
        .filter(|line| !line.is_empty())
        .take(MAX_OPTIONS)
        .map(str::to_string)
        .collect();

    ParsedReply {
        text: head.trim().to_string(),
        options,
    }
}

/// Bullet markers are stripped as a run of leading dashes and spaces
fn strip_bullet(line: &str) -> &str {
    line.trim_start_matches(['-', ' ']).trim()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_text_without_delimiter() {
        let reply = parse("Hello there", true);
        assert_eq!(reply.text, "Hello there");
        assert!(reply.options.is_empty());
    }

    #[test]
    fn test_options_are_split_off() {
        let reply = parse("Hi!\n---OPTIONS---\n- A\n- B\n- C", true);
        assert_eq!(reply.text, "Hi!");
        assert_eq!(reply.options, vec!["A", "B", "C"]);
    }

    #[test]
    fn test_delimiter_ignored_when_narrative_off() {
        let raw = "Hi!\n---OPTIONS---\n- A";
        let reply = parse(raw, false);
        assert_eq!(reply.text, raw);
        assert!(reply.options.is_empty());
    }

    #[test]
    fn test_reparse_of_main_text_is_stable() {
        let inputs = [
            "Hi!\n---OPTIONS---\n- A\n- B",
            "Hello there",
            "A\n---OPTIONS---\n- x\n---OPTIONS---\n- y",
            "  padded  \n---OPTIONS---\n",
        ];
        for raw in inputs {
            let first = parse(raw, true);
            let second = parse(&first.text, true);
            assert_eq!(second.text, first.text);
            assert!(second.options.is_empty());
        }
    }

    #[test]
    fn test_blank_lines_and_bullet_variants() {
        let reply = parse(
            "You're doing fine.\n---OPTIONS---\n\n  - Tell me more  \n\n-I feel better now\n",
            true,
        );
        assert_eq!(reply.text, "You're doing fine.");
        assert_eq!(reply.options, vec!["Tell me more", "I feel better now"]);
    }

    #[test]
    fn test_splits_on_first_delimiter_only() {
        let reply = parse("Main\n---OPTIONS---\n- one\n---OPTIONS---\n- two", true);
        assert_eq!(reply.text, "Main");
        assert_eq!(reply.options, vec!["one", "OPTIONS---", "two"]);
    }

    #[test]
    fn test_options_capped() {
        let reply = parse("Hey\n---OPTIONS---\n- 1\n- 2\n- 3\n- 4\n- 5", true);
        assert_eq!(reply.options, vec!["1", "2", "3"]);
    }

    #[test]
    fn test_empty_options_section() {
        let reply = parse("Only text\n---OPTIONS---\n   \n", true);
        assert_eq!(reply.text, "Only text");
        assert!(reply.options.is_empty());
    }
}
