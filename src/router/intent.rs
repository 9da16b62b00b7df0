//! Utterance classification
//!
//! A fixed table of keywords checked in order against the lowercased
//! utterance. The first keyword found decides the intent and is cut out of
//! the utterance to form the argument.

use std::fmt;

/// What the user wants done
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    /// Encyclopedia summary of a topic
    Wikipedia,
    /// Current weather for a city
    Weather,
    /// Open a known website
    OpenSite,
    /// Reminders (not implemented, fixed reply)
    Reminder,
    /// Anything else goes to the chat model
    Conversation,
}

impl Intent {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Wikipedia => "wikipedia-lookup",
            Self::Weather => "weather-lookup",
            Self::OpenSite => "open-site",
            Self::Reminder => "reminder-stub",
            Self::Conversation => "general-conversation",
        }
    }
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Keyword rules in priority order, first match wins
pub const RULES: [(&str, Intent); 4] = [
    ("wikipedia", Intent::Wikipedia),
    ("weather", Intent::Weather),
    ("open", Intent::OpenSite),
    ("reminder", Intent::Reminder),
];

/// A classified utterance
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    pub intent: Intent,
    /// Utterance minus the keyword; the verbatim utterance for conversation
    pub argument: String,
}

impl Command {
    /// Classify an utterance
    ///
    /// Removal is literal: every occurrence of the keyword goes, the words
    /// around it stay, and only the ends are trimmed. "what's the weather
    /// like" becomes "what's the  like".
    #[must_use]
    pub fn classify(utterance: &str) -> Self {
        let lowered = utterance.to_lowercase();

        RULES
            .iter()
            .find(|(keyword, _)| lowered.contains(keyword))
            .map_or_else(
                || Self {
                    intent: Intent::Conversation,
                    argument: utterance.to_string(),
                },
                |&(keyword, intent)| Self {
                    intent,
                    argument: lowered.replace(keyword, "").trim().to_string(),
                },
            )
    }
}
