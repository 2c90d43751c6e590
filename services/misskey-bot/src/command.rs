//! Mention text parsing for the `amesh [place]` command.

use amesh::DEFAULT_PLACE;

/// Result of parsing a mention.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedCommand {
    /// Place to render; empty when not recognized
    pub place: String,
    pub is_recognized: bool,
}

impl ParsedCommand {
    fn recognized(place: impl Into<String>) -> Self {
        Self {
            place: place.into(),
            is_recognized: true,
        }
    }

    fn unrecognized() -> Self {
        Self {
            place: String::new(),
            is_recognized: false,
        }
    }
}

/// Parse mention text.
///
/// `@` tokens are dropped and the rest is rejoined with single spaces.
/// `amesh <place>` and bare `amesh` are recognized; the latter uses the
/// default place. Anything else, including `ameshi`, is not a command.
pub fn parse_command(text: &str) -> ParsedCommand {
    let cleaned = text
        .split_whitespace()
        .filter(|word| !word.starts_with('@'))
        .collect::<Vec<_>>()
        .join(" ");

    if let Some(place) = cleaned.strip_prefix("amesh ") {
        return ParsedCommand::recognized(place.trim());
    }
    if cleaned == "amesh" {
        return ParsedCommand::recognized(DEFAULT_PLACE);
    }
    ParsedCommand::unrecognized()
}
