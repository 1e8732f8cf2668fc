//! UI-agnostic transcript types
//!
//! Shared between the chat session and any front end that renders it.

use serde::{Deserialize, Serialize};

use crate::retrieval::Citation;

/// Identity of a message within one session's transcript.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MessageId(pub u64);

/// A chat message in the transcript
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: MessageId,
    pub role: ChatRole,
    pub content: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub citations: Vec<Citation>,
    pub status: MessageStatus,
}

/// The role of a chat message sender
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChatRole {
    User,
    Assistant,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MessageStatus {
    Complete,
    /// Placeholder waiting on the retrieval service
    Pending,
    Failed,
}

impl ChatMessage {
    pub fn user(id: MessageId, content: impl Into<String>) -> Self {
        Self {
            id,
            role: ChatRole::User,
            content: content.into(),
            citations: Vec::new(),
            status: MessageStatus::Complete,
        }
    }

    pub fn placeholder(id: MessageId) -> Self {
        Self {
            id,
            role: ChatRole::Assistant,
            content: String::new(),
            citations: Vec::new(),
            status: MessageStatus::Pending,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.status == MessageStatus::Pending
    }

    /// Answer text followed by one `Source: ...` line per citation.
    pub fn display_text(&self) -> String {
        let mut text = self.content.clone();
        for citation in &self.citations {
            if !text.is_empty() {
                text.push('\n');
            }
            text.push_str(&citation.display_line());
        }
        text
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_placeholder_is_pending_assistant() {
        let msg = ChatMessage::placeholder(MessageId(2));
        assert_eq!(msg.role, ChatRole::Assistant);
        assert!(msg.is_pending());
        assert!(msg.content.is_empty());
    }

    #[test]
    fn test_display_text_appends_citation_lines() {
        let mut msg = ChatMessage::placeholder(MessageId(1));
        msg.content = "Answer".to_string();
        msg.citations = vec![
            Citation::new("a.pdf"),
            Citation {
                document: "b.pdf".to_string(),
                date: None,
                section: Some("Intro".to_string()),
            },
        ];
        msg.status = MessageStatus::Complete;

        assert_eq!(msg.display_text(), "Answer\nSource: a.pdf\nSource: b.pdf - Intro");
    }
}
