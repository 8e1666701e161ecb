//! Append-only chat log
//!
//! Global invariants enforced:
//! - Messages are kept in insertion order
//! - Stored messages are never mutated, removed, reordered, or deduplicated

use serde::{Deserialize, Serialize};

/// Message author
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

/// One exchanged message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
    /// Image payload as a data URL, only set for uploads
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub attachment: Option<String>,
}

impl ChatMessage {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        ChatMessage {
            role,
            content: content.into(),
            attachment: None,
        }
    }

    pub fn with_attachment(mut self, data_url: String) -> Self {
        self.attachment = Some(data_url);
        self
    }
}

/// Ordered log of the session's messages
#[derive(Debug, Clone, Default, Serialize)]
pub struct ConversationStore {
    messages: Vec<ChatMessage>,
}

impl ConversationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a message to the end of the log and return a reference to it
    pub fn append(&mut self, message: ChatMessage) -> &ChatMessage {
        self.messages.push(message);
        &self.messages[self.messages.len() - 1]
    }

    /// Full ordered history
    pub fn all(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn last(&self) -> Option<&ChatMessage> {
        self.messages.last()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Render the log as a JSON array
    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(&self.messages).unwrap_or_else(|_| "[]".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_append_preserves_order() {
        let mut store = ConversationStore::new();
        let a = ChatMessage::new(Role::User, "A");
        let b = ChatMessage::new(Role::Assistant, "B");

        store.append(a.clone());
        store.append(b.clone());

        assert_eq!(store.all(), &[a, b]);
    }

    #[test]
    fn test_duplicates_are_kept() {
        let mut store = ConversationStore::new();
        store.append(ChatMessage::new(Role::User, "same"));
        store.append(ChatMessage::new(Role::User, "same"));
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_append_leaves_earlier_entries_untouched() {
        let mut store = ConversationStore::new();
        store.append(ChatMessage::new(Role::User, "first"));
        let before = store.all()[0].clone();

        store.append(ChatMessage::new(Role::Assistant, "second"));

        assert_eq!(store.all()[0], before);
        assert_eq!(store.last().map(|m| m.content.as_str()), Some("second"));
    }

    #[test]
    fn test_json_omits_missing_attachment() {
        let mut store = ConversationStore::new();
        store.append(ChatMessage::new(Role::User, "hi"));
        let json = store.to_json();
        assert!(json.contains(r#""role": "user""#));
        assert!(!json.contains("attachment"));
    }
}
