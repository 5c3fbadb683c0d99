//! Wake-word detection over transcripts from the continuous recognizer.

/// Common interface for wake detection backends.
pub trait WakeDetector: Send + Sync {
    /// Returns `true` if `text` contains a wake phrase.
    fn detect(&self, text: &str) -> bool;
}

/// Case-insensitive substring match against a fixed phrase list.
pub struct PhraseWakeDetector {
    phrases: Vec<String>,
}

impl PhraseWakeDetector {
    /// Blank phrases are dropped; they would match every transcript.
    pub fn new(phrases: &[String]) -> Self {
        let phrases: Vec<String> = phrases
            .iter()
            .map(|p| p.trim().to_lowercase())
            .filter(|p| !p.is_empty())
            .collect();
        if phrases.is_empty() {
            log::warn!("No wake phrases configured; wake word will never trigger");
        }
        Self { phrases }
    }
}

impl WakeDetector for PhraseWakeDetector {
    fn detect(&self, text: &str) -> bool {
        let text = text.to_lowercase();
        self.phrases.iter().any(|p| text.contains(p.as_str()))
    }
}
