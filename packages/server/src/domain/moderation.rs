//! Forbidden-word moderation.

/// Words refused by a relay started without an explicit list.
pub const DEFAULT_FORBIDDEN_WORDS: [&str; 8] = [
    "Cocacola",
    "Pepsi",
    "Danone",
    "Nestle",
    "Puleva",
    "Bimbo",
    "Pascual",
    "Campofrio",
];

/// Result of evaluating one chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Allowed,
    Rejected,
}

/// Case-insensitive substring filter over a fixed word set.
///
/// Read-only after construction, so it is shared between sessions without a
/// lock.
#[derive(Debug, Clone)]
pub struct ModerationPolicy {
    /// Lowercased forbidden words
    words: Vec<String>,
}

impl ModerationPolicy {
    /// Build a policy from a word list. Blank words are dropped since they
    /// would match every message.
    pub fn new<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let words = words
            .into_iter()
            .map(|word| word.as_ref().trim().to_lowercase())
            .filter(|word| !word.is_empty())
            .collect();
        Self { words }
    }

    pub fn evaluate(&self, message: &str) -> Verdict {
        let message = message.to_lowercase();
        if self.words.iter().any(|word| message.contains(word.as_str())) {
            Verdict::Rejected
        } else {
            Verdict::Allowed
        }
    }

    pub fn word_count(&self) -> usize {
        self.words.len()
    }
}

impl Default for ModerationPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_FORBIDDEN_WORDS)
    }
}
