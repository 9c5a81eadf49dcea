use chrono::{DateTime, Local};
use serde::Serialize;

/// Who or what produced a log entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageKind {
    User,
    Assistant,
    Info,
    Error,
}

impl MessageKind {
    /// Label shown next to the timestamp
    pub fn label(&self) -> &'static str {
        match self {
            Self::User => "You",
            Self::Assistant => "Assistant",
            Self::Info => "Info",
            Self::Error => "Error",
        }
    }
}

/// A single conversation entry. Immutable once created.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Message {
    kind: MessageKind,
    content: String,
    timestamp: DateTime<Local>,
}

impl Message {
    pub fn new(kind: MessageKind, content: impl Into<String>) -> Self {
        Self {
            kind,
            content: content.into(),
            timestamp: Local::now(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(MessageKind::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(MessageKind::Assistant, content)
    }

    pub fn info(content: impl Into<String>) -> Self {
        Self::new(MessageKind::Info, content)
    }

    pub fn error(content: impl Into<String>) -> Self {
        Self::new(MessageKind::Error, content)
    }

    pub fn kind(&self) -> MessageKind {
        self.kind
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn timestamp(&self) -> DateTime<Local> {
        self.timestamp
    }
}

/// Ordered, append-only record of the conversation
#[derive(Debug, Clone, Default)]
pub struct SessionLog {
    messages: Vec<Message>,
}

impl SessionLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, message: Message) {
        self.messages.push(message);
    }

    /// An independent copy of every entry, oldest first
    pub fn history(&self) -> Vec<Message> {
        self.messages.clone()
    }

    /// Borrowed view for rendering
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Drop everything. Only used when the whole session is reset.
    pub fn clear(&mut self) {
        self.messages.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_append_preserves_order() {
        let mut log = SessionLog::new();
        log.append(Message::user("hi"));
        log.append(Message::assistant("hello"));
        log.append(Message::info("note"));

        let kinds: Vec<_> = log.messages().iter().map(Message::kind).collect();
        assert_eq!(kinds, vec![MessageKind::User, MessageKind::Assistant, MessageKind::Info]);
        assert!(log.messages()[0].timestamp() <= log.messages()[2].timestamp());
    }

    #[test]
    fn test_history_is_independent_copy() {
        let mut log = SessionLog::new();
        log.append(Message::user("first"));

        let mut copy = log.history();
        copy.push(Message::user("injected"));
        copy.clear();

        assert_eq!(log.len(), 1);
        assert_eq!(log.messages()[0].content(), "first");

        let snapshot = log.history();
        log.append(Message::user("second"));
        assert_eq!(snapshot.len(), 1);
    }

    #[test]
    fn test_clear() {
        let mut log = SessionLog::new();
        log.append(Message::error("boom"));
        log.clear();
        assert!(log.is_empty());
    }

    #[test]
    fn test_labels() {
        assert_eq!(MessageKind::User.label(), "You");
        assert_eq!(MessageKind::Error.label(), "Error");
    }
}
