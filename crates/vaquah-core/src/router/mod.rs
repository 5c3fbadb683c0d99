//! Intent parser: pluggable trait + factory.
//!
//! Maps a final command transcript onto a [`CanonicalAction`], or nothing.

pub mod keyword;

use crate::action::CanonicalAction;

/// Trait for transcript → action parsers.
pub trait IntentParser: Send + Sync {
    /// `None` means "no match": nothing is dispatched and it is not an error.
    fn parse(&self, text: &str) -> Option<CanonicalAction>;
    fn name(&self) -> &str;
}

/// Create a parser backend by name.
pub fn create_parser(backend: &str) -> anyhow::Result<Box<dyn IntentParser>> {
    match backend {
        "keyword" => Ok(Box::new(keyword::KeywordParser::new())),
        other => anyhow::bail!("Unknown parser backend: {other}"),
    }
}
