//! Command routing
//!
//! Classifies each utterance, calls exactly one response provider and keeps
//! the conversation window up to date. Provider failures come back as a
//! spoken error message instead of an error value.

mod intent;

pub use intent::{Command, Intent, RULES};

use crate::conversation::{Conversation, Turn};
use crate::providers::{ConversationProvider, ResponseProvider};

/// Fixed reply for the reminder intent
pub const REMINDER_STUB: &str = "Reminder feature not implemented yet!";

/// Result of routing one utterance
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    /// Intent the utterance was classified as
    pub intent: Intent,
    /// Text to speak
    pub text: String,
    /// Whether the provider failed and `text` is an error message
    pub failed: bool,
}

impl Reply {
    fn answered(intent: Intent, text: String) -> Self {
        Self {
            intent,
            text,
            failed: false,
        }
    }

    fn failed(intent: Intent, error: &crate::Error) -> Self {
        Self {
            intent,
            text: format!("An error occurred: {error}"),
            failed: true,
        }
    }
}

/// Dispatches classified utterances to their providers
pub struct CommandRouter {
    knowledge: Box<dyn ResponseProvider>,
    weather: Box<dyn ResponseProvider>,
    sites: Box<dyn ResponseProvider>,
    chat: Box<dyn ConversationProvider>,
}

impl CommandRouter {
    #[must_use]
    pub fn new(
        knowledge: Box<dyn ResponseProvider>,
        weather: Box<dyn ResponseProvider>,
        sites: Box<dyn ResponseProvider>,
        chat: Box<dyn ConversationProvider>,
    ) -> Self {
        Self {
            knowledge,
            weather,
            sites,
            chat,
        }
    }

    /// Route one utterance
    ///
    /// Only a successful general-conversation turn touches `conversation`,
    /// appending the user turn and the reply.
    pub fn route(&mut self, utterance: &str, conversation: &mut Conversation) -> Reply {
        let Command { intent, argument } = Command::classify(utterance);
        tracing::info!(%intent, argument, "routing command");

        let provider = match intent {
            Intent::Wikipedia => &mut self.knowledge,
            Intent::Weather => &mut self.weather,
            Intent::OpenSite => &mut self.sites,
            Intent::Reminder => return Reply::answered(intent, REMINDER_STUB.to_string()),
            Intent::Conversation => return self.converse(argument, conversation),
        };

        match provider.lookup(&argument) {
            Ok(text) => Reply::answered(intent, text),
            Err(e) => {
                tracing::warn!(provider = provider.name(), error = %e, "provider failed");
                Reply::failed(intent, &e)
            }
        }
    }

    fn converse(&mut self, message: String, conversation: &mut Conversation) -> Reply {
        let history = conversation.snapshot();

        match self.chat.reply(&message, &history) {
            Ok(text) => {
                conversation.append(Turn::user(message), Turn::assistant(text.clone()));
                tracing::debug!(turns = conversation.len(), "conversation updated");
                Reply::answered(Intent::Conversation, text)
            }
            Err(e) => {
                tracing::warn!(provider = self.chat.name(), error = %e, "chat provider failed");
                Reply::failed(Intent::Conversation, &e)
            }
        }
    }
}
