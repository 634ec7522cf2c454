//! Message types for the shared conversation
//!
//! A [`Transcript`] is the ordered history every node of the crew reads from.
//! It only grows: there is deliberately no API to remove or reorder entries.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Who produced a message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    System,
    User,
    Assistant,
    /// Tool output or a worker's answer fed back into the conversation
    Observation,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::System => "system",
            Role::User => "user",
            Role::Assistant => "assistant",
            Role::Observation => "observation",
        }
    }
}

/// A single transcript entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
    /// Originating worker or node, when known
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Message {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            name: None,
            created_at: Utc::now(),
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::new(Role::System, content)
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }

    pub fn observation(content: impl Into<String>) -> Self {
        Self::new(Role::Observation, content)
    }

    /// Tag the message with the node that produced it
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Whether the body is blank after trimming
    pub fn is_blank(&self) -> bool {
        self.content.trim().is_empty()
    }
}

/// Append-only conversation history
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Transcript {
    messages: Vec<Message>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, message: Message) {
        self.messages.push(message);
    }

    pub fn extend(&mut self, messages: impl IntoIterator<Item = Message>) {
        self.messages.extend(messages);
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

/// One independent conversation thread
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Conversation {
    pub id: Uuid,
    pub transcript: Transcript,
}

impl Conversation {
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            transcript: Transcript::new(),
        }
    }
}

impl Default for Conversation {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transcript_preserves_order() {
        let mut transcript = Transcript::new();
        transcript.push(Message::user("first"));
        transcript.push(Message::assistant("second").with_name("Supervisor"));
        transcript.extend(vec![Message::observation("third")]);

        let bodies: Vec<&str> = transcript
            .messages()
            .iter()
            .map(|m| m.content.as_str())
            .collect();
        assert_eq!(bodies, vec!["first", "second", "third"]);
        assert_eq!(transcript.messages()[1].name.as_deref(), Some("Supervisor"));
        assert_eq!(transcript.last().unwrap().role, Role::Observation);
    }

    #[test]
    fn test_blank_detection() {
        assert!(Message::assistant("   \n\t").is_blank());
        assert!(!Message::assistant(" done ").is_blank());
    }

    #[test]
    fn test_message_serialization_skips_missing_name() {
        let json = serde_json::to_string(&Message::user("hi")).unwrap();
        assert!(!json.contains("\"name\""));
        assert!(json.contains("\"role\":\"user\""));
    }

    #[test]
    fn test_conversations_are_independent() {
        let mut a = Conversation::new();
        let b = Conversation::new();
        a.transcript.push(Message::user("only in a"));

        assert_ne!(a.id, b.id);
        assert_eq!(a.transcript.len(), 1);
        assert!(b.transcript.is_empty());
    }
}
