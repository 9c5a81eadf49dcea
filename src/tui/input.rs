use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::session::InputEvent;

/// Translates terminal key presses into session input
#[derive(Debug, Default)]
pub struct InputHandler;

impl InputHandler {
    pub fn new() -> Self {
        Self
    }

    /// Process a key event. Keys the session has no use for map to `None`.
    pub fn handle_key(&self, key: KeyEvent) -> Option<InputEvent> {
        if key.kind == KeyEventKind::Release {
            return None;
        }

        if key.modifiers.contains(KeyModifiers::CONTROL) {
            return match key.code {
                KeyCode::Char('c') => Some(InputEvent::Interrupt),
                KeyCode::Char('a') => Some(InputEvent::Home),
                KeyCode::Char('e') => Some(InputEvent::End),
                _ => None,
            };
        }

        match key.code {
            KeyCode::Enter => Some(InputEvent::Submit),
            KeyCode::Char(c) => Some(InputEvent::Char(c)),
            KeyCode::Backspace => Some(InputEvent::Backspace),
            KeyCode::Delete => Some(InputEvent::Delete),
            KeyCode::Left => Some(InputEvent::Left),
            KeyCode::Right => Some(InputEvent::Right),
            KeyCode::Home => Some(InputEvent::Home),
            KeyCode::End => Some(InputEvent::End),
            _ => None,
        }
    }
}
