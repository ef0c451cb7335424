//! Turns: the stored unit of a conversation.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::SystemTime;

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::{Message, MessageRole};

/// Stable identity of a stored turn. Deletions reference turns by id.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct TurnId(String);

impl TurnId {
    /// Generate a fresh, process-unique id.
    pub fn generate() -> Self {
        let ts = SystemTime::now()
            .duration_since(SystemTime::UNIX_EPOCH)
            .unwrap_or_default()
            .as_nanos();
        // Counter keeps ids unique when the clock doesn't advance between calls.
        static COUNTER: AtomicU64 = AtomicU64::new(0);
        let count = COUNTER.fetch_add(1, Ordering::Relaxed);
        Self(format!("turn-{ts:x}-{count:04x}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for TurnId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TurnId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// Who produced a turn.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TurnRole {
    System,
    User,
    Assistant,
    /// Synthetic turn that condenses a compacted history prefix.
    Summary,
}

impl TurnRole {
    /// Role used when the turn is sent to the chat API. Summaries are model
    /// output, so they travel as assistant messages.
    pub fn wire_role(self) -> MessageRole {
        match self {
            TurnRole::System => MessageRole::System,
            TurnRole::User => MessageRole::User,
            TurnRole::Assistant | TurnRole::Summary => MessageRole::Assistant,
        }
    }
}

impl std::fmt::Display for TurnRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TurnRole::System => write!(f, "system"),
            TurnRole::User => write!(f, "user"),
            TurnRole::Assistant => write!(f, "assistant"),
            TurnRole::Summary => write!(f, "summary"),
        }
    }
}

/// One immutable message in a conversation thread.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Turn {
    pub id: TurnId,
    pub role: TurnRole,
    pub content: String,
    /// RFC 3339 creation time.
    pub created_at: String,
}

impl Turn {
    pub fn new(role: TurnRole, content: impl Into<String>) -> Self {
        Self {
            id: TurnId::generate(),
            role,
            content: content.into(),
            created_at: Utc::now().to_rfc3339(),
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::new(TurnRole::System, content)
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(TurnRole::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(TurnRole::Assistant, content)
    }

    pub fn summary(content: impl Into<String>) -> Self {
        Self::new(TurnRole::Summary, content)
    }

    /// A new turn with the same role and content but its own identity.
    pub fn rematerialize(&self) -> Self {
        Self::new(self.role, self.content.clone())
    }

    pub fn to_message(&self) -> Message {
        let content = self.content.clone();
        match self.role.wire_role() {
            MessageRole::System => Message::system(content),
            MessageRole::User => Message::user(content),
            MessageRole::Assistant => Message::assistant(content),
        }
    }
}

/// Convert an ordered run of turns into API messages.
pub fn to_messages(turns: &[Turn]) -> Vec<Message> {
    turns.iter().map(Turn::to_message).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_ids_are_unique() {
        let ids: std::collections::HashSet<_> = (0..1000).map(|_| TurnId::generate()).collect();
        assert_eq!(ids.len(), 1000);
    }

    #[test]
    fn summary_is_sent_as_assistant() {
        let turn = Turn::summary("they talked about work");
        let msg = turn.to_message();
        assert_eq!(msg.role, MessageRole::Assistant);
        assert_eq!(msg.content, "they talked about work");
    }

    #[test]
    fn wire_roles_follow_turn_roles() {
        assert_eq!(Turn::system("s").to_message(), Message::system("s"));
        assert_eq!(Turn::user("u").to_message(), Message::user("u"));
        assert_eq!(Turn::assistant("a").to_message(), Message::assistant("a"));
    }

    #[test]
    fn rematerialize_keeps_content_changes_identity() {
        let original = Turn::user("hello");
        let copy = original.rematerialize();
        assert_eq!(copy.role, TurnRole::User);
        assert_eq!(copy.content, "hello");
        assert_ne!(copy.id, original.id);
    }

    #[test]
    fn turn_serializes_role_lowercase() {
        let turn = Turn::summary("s");
        let json = serde_json::to_value(&turn).unwrap();
        assert_eq!(json["role"], "summary");
        assert_eq!(json["id"], turn.id.as_str());
    }
}
