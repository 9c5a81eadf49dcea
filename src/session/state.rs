use chrono::{DateTime, Local};
use tracing::warn;

use super::log::{Message, SessionLog};
use crate::utils::ChatError;

/// The most recent recovered error
#[derive(Debug, Clone, PartialEq)]
pub struct ErrorInfo {
    pub error: ChatError,
    pub timestamp: DateTime<Local>,
}

/// Live state of the session
///
/// `partial_output` only carries text while `streaming` is set.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionState {
    pub current_model: Option<String>,
    pub streaming: bool,
    pub partial_output: String,
    pub last_error: Option<ErrorInfo>,
}

impl SessionState {
    pub fn with_model(model: Option<String>) -> Self {
        Self {
            current_model: model,
            ..Self::default()
        }
    }
}

/// State and log, passed explicitly to whatever needs to touch the session
#[derive(Debug, Clone, Default)]
pub struct SessionContext {
    pub state: SessionState,
    pub log: SessionLog,
}

impl SessionContext {
    pub fn new(current_model: Option<String>) -> Self {
        Self {
            state: SessionState::with_model(current_model),
            log: SessionLog::new(),
        }
    }

    pub fn info(&mut self, content: impl Into<String>) {
        self.log.append(Message::info(content));
    }

    /// Log a recovered error as one entry and remember it as the last error
    pub fn record_error(&mut self, error: ChatError) {
        let content = error.to_string();
        self.push_error(content, error);
    }

    /// Like `record_error`, with `context` leading the same entry
    pub fn record_error_with_context(&mut self, context: impl Into<String>, error: ChatError) {
        let content = format!("{}\n{}", context.into(), error);
        self.push_error(content, error);
    }

    fn push_error(&mut self, content: String, error: ChatError) {
        if error.is_informational() {
            self.log.append(Message::info(content));
        } else {
            warn!(%error, "session error");
            self.log.append(Message::error(content));
        }
        self.state.last_error = Some(ErrorInfo {
            error,
            timestamp: Local::now(),
        });
    }

    /// Back to an empty conversation, keeping the selected model
    pub fn reset(&mut self) {
        self.log.clear();
        self.state = SessionState::with_model(self.state.current_model.take());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::MessageKind;

    #[test]
    fn test_record_error_kinds() {
        let mut ctx = SessionContext::new(None);
        ctx.record_error(ChatError::UnknownCommand("frobnicate".to_string()));
        ctx.record_error(ChatError::NoModelSelected);

        let kinds: Vec<_> = ctx.log.messages().iter().map(|m| m.kind()).collect();
        assert_eq!(kinds, vec![MessageKind::Info, MessageKind::Error]);
        assert_eq!(
            ctx.state.last_error.as_ref().map(|e| e.error.clone()),
            Some(ChatError::NoModelSelected)
        );
    }

    #[test]
    fn test_reset_keeps_model() {
        let mut ctx = SessionContext::new(Some("llama3.2".to_string()));
        ctx.info("hello");
        ctx.state.streaming = true;
        ctx.reset();

        assert!(ctx.log.is_empty());
        assert!(!ctx.state.streaming);
        assert_eq!(ctx.state.current_model.as_deref(), Some("llama3.2"));
    }
}
