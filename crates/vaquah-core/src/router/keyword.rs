//! Keyword parser: ordered, case-insensitive substring rules. First match wins.

use super::IntentParser;
use crate::action::CanonicalAction;

/// Rule order matters: "go back home" is a home command, "scroll up to the
/// top" is a scroll-up command.
const RULES: &[(&[&str], CanonicalAction)] = &[
    (
        &["close", "exit", "goodbye", "stop listening", "dismiss"],
        CanonicalAction::CloseAssistant,
    ),
    (&["checkout", "buy now"], CanonicalAction::NavigateCheckout),
    (&["cart", "basket"], CanonicalAction::NavigateCart),
    (&["home", "main page"], CanonicalAction::NavigateHome),
    (&["product", "shop"], CanonicalAction::NavigateProducts),
    (&["back", "go back"], CanonicalAction::NavigateBack),
    (&["scroll down", "down"], CanonicalAction::ScrollDown),
    (&["scroll up", "up"], CanonicalAction::ScrollUp),
    (&["top"], CanonicalAction::ScrollTop),
    (&["bottom"], CanonicalAction::ScrollBottom),
];

pub struct KeywordParser;

impl KeywordParser {
    pub fn new() -> Self {
        Self
    }
}

impl Default for KeywordParser {
    fn default() -> Self {
        Self::new()
    }
}

impl IntentParser for KeywordParser {
    fn parse(&self, text: &str) -> Option<CanonicalAction> {
        let text = text.to_lowercase();
        let action = RULES
            .iter()
            .find(|(phrases, _)| phrases.iter().any(|p| text.contains(p)))
            .map(|&(_, action)| action);
        log::debug!("KeywordParser: {text:?} → {action:?}");
        action
    }

    fn name(&self) -> &str {
        "keyword"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(text: &str) -> Option<CanonicalAction> {
        KeywordParser::new().parse(text)
    }

    #[test]
    fn checkout_inside_sentence() {
        assert_eq!(parse("please checkout now"), Some(CanonicalAction::NavigateCheckout));
    }

    #[test]
    fn gibberish_is_no_match() {
        assert_eq!(parse("asdkjasd"), None);
        assert_eq!(parse(""), None);
    }

    #[test]
    fn matching_is_case_insensitive() {
        assert_eq!(parse("Show me my BASKET"), Some(CanonicalAction::NavigateCart));
        assert_eq!(parse("Main Page"), Some(CanonicalAction::NavigateHome));
    }

    #[test]
    fn every_rule_has_a_phrase_that_reaches_it() {
        let cases = [
            ("close the assistant", CanonicalAction::CloseAssistant),
            ("buy now", CanonicalAction::NavigateCheckout),
            ("open my cart", CanonicalAction::NavigateCart),
            ("go home", CanonicalAction::NavigateHome),
            ("show products", CanonicalAction::NavigateProducts),
            ("go back", CanonicalAction::NavigateBack),
            ("scroll down", CanonicalAction::ScrollDown),
            ("scroll up", CanonicalAction::ScrollUp),
            ("to the top", CanonicalAction::ScrollTop),
            ("bottom of the page", CanonicalAction::ScrollBottom),
        ];
        for (text, expected) in cases {
            assert_eq!(parse(text), Some(expected), "{text:?}");
        }
    }

    #[test]
    fn earlier_rules_win() {
        // close beats everything
        assert_eq!(parse("close the cart"), Some(CanonicalAction::CloseAssistant));
        // checkout beats cart
        assert_eq!(parse("checkout my cart"), Some(CanonicalAction::NavigateCheckout));
        // home beats back
        assert_eq!(parse("go back home"), Some(CanonicalAction::NavigateHome));
        // shop beats down
        assert_eq!(parse("shop down the street"), Some(CanonicalAction::NavigateProducts));
        // down beats up and top
        assert_eq!(parse("scroll down from the top"), Some(CanonicalAction::ScrollDown));
        // up beats top
        assert_eq!(parse("scroll up to the top"), Some(CanonicalAction::ScrollUp));
    }
}
