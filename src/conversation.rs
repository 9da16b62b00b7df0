//! Bounded conversational memory
//!
//! Holds the most recent turns of general conversation so the chat provider
//! can see some context. Only the command router appends to it; providers get
//! a snapshot.

use std::collections::VecDeque;
use std::sync::Arc;

use serde::Serialize;

/// Default number of turns kept in the sliding window
pub const DEFAULT_HISTORY_LIMIT: usize = 5;

/// Who produced a turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// The person talking to the assistant
    User,
    /// The assistant's reply
    Assistant,
}

impl Role {
    /// Wire name used by chat APIs
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }
}

/// A single message in the conversation log
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Turn {
    role: Role,
    content: String,
}

impl Turn {
    /// Create a user turn
    #[must_use]
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    /// Create an assistant turn
    #[must_use]
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }

    #[must_use]
    pub const fn role(&self) -> Role {
        self.role
    }

    #[must_use]
    pub fn content(&self) -> &str {
        &self.content
    }
}

/// Read-only copy of the conversation handed to providers
pub type Snapshot = Arc<[Turn]>;

/// Sliding window of recent turns, oldest first
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conversation {
    turns: VecDeque<Turn>,
    limit: usize,
}

impl Default for Conversation {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_LIMIT)
    }
}

impl Conversation {
    /// Create an empty conversation that keeps at most `limit` turns
    #[must_use]
    pub fn new(limit: usize) -> Self {
        Self {
            turns: VecDeque::with_capacity(limit + 2),
            limit,
        }
    }

    /// Append a completed exchange, then drop the oldest turns over the limit
    pub fn append(&mut self, user: Turn, assistant: Turn) {
        self.turns.push_back(user);
        self.turns.push_back(assistant);

        let mut dropped = 0;
        while self.turns.len() > self.limit {
            self.turns.pop_front();
            dropped += 1;
        }

        if dropped > 0 {
            tracing::trace!(dropped, kept = self.turns.len(), "trimmed conversation window");
        }
    }

    /// Immutable ordered copy of the current window
    #[must_use]
    pub fn snapshot(&self) -> Snapshot {
        self.turns.iter().cloned().collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.turns.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    /// Maximum number of turns kept
    #[must_use]
    pub const fn limit(&self) -> usize {
        self.limit
    }

    /// Iterate turns oldest first
    pub fn iter(&self) -> impl Iterator<Item = &Turn> {
        self.turns.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_append_keeps_order() {
        let mut conversation = Conversation::new(5);
        conversation.append(Turn::user("hi"), Turn::assistant("hello"));

        let turns: Vec<_> = conversation.iter().map(Turn::content).collect();
        assert_eq!(turns, ["hi", "hello"]);
        assert_eq!(conversation.iter().next().unwrap().role(), Role::User);
    }

    #[test]
    fn test_window_drops_oldest_first() {
        let mut conversation = Conversation::new(5);
        for i in 0..3 {
            conversation.append(Turn::user(format!("q{i}")), Turn::assistant(format!("a{i}")));
        }

        // Six turns were added, the first one falls out
        let turns: Vec<_> = conversation.iter().map(Turn::content).collect();
        assert_eq!(turns, ["a0", "q1", "a1", "q2", "a2"]);
    }

    #[test]
    fn test_window_bound_holds_every_turn() {
        let mut conversation = Conversation::new(5);
        for i in 0..20 {
            conversation.append(Turn::user(format!("q{i}")), Turn::assistant(format!("a{i}")));
            assert!(conversation.len() <= 5);
            assert_eq!(conversation.iter().last().unwrap().content(), format!("a{i}"));
        }
    }

    #[test]
    fn test_snapshot_is_detached() {
        let mut conversation = Conversation::default();
        conversation.append(Turn::user("one"), Turn::assistant("two"));

        let snapshot = conversation.snapshot();
        conversation.append(Turn::user("three"), Turn::assistant("four"));

        assert_eq!(snapshot.len(), 2);
        assert_eq!(conversation.len(), 4);
    }

    #[test]
    fn test_role_wire_names() {
        assert_eq!(Role::User.as_str(), "user");
        assert_eq!(Role::Assistant.as_str(), "assistant");
        assert_eq!(
            serde_json::to_string(&Turn::assistant("ok")).unwrap(),
            r#"{"role":"assistant","content":"ok"}"#
        );
    }
}
