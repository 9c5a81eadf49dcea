use tracing::debug;

use super::coordinator::{StreamCoordinator, StreamEvent, StreamPhase};
use super::editor::{EditorBuffer, LineEditor};
use super::log::{Message, SessionLog};
use super::router::{Action, CommandRouter};
use super::state::{SessionContext, SessionState};
use crate::models::{GenerateOptions, ModelProvider};
use crate::ollama::ModelDiscoveryService;

/// Input the terminal layer hands to the session
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputEvent {
    Char(char),
    Paste(String),
    Backspace,
    Delete,
    Left,
    Right,
    Home,
    End,
    Submit,
    Interrupt,
}

/// What the caller should do after an input event
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputOutcome {
    Continue,
    /// A line was taken from the editor; pass it to `submit`
    Submitted(String),
    /// Submission refused because a reply is still streaming
    Busy,
    Quit,
}

/// Everything the renderer needs for one frame
#[derive(Debug)]
pub struct SessionView<'a> {
    pub messages: &'a [Message],
    pub partial_output: Option<&'a str>,
    pub input: EditorBuffer,
    pub current_model: Option<&'a str>,
    pub streaming: bool,
}

/// The chat session: input line, commands, streamed replies and the log
pub struct SessionEngine {
    editor: LineEditor,
    ctx: SessionContext,
    coordinator: StreamCoordinator,
    provider: Box<dyn ModelProvider>,
    discovery: Option<ModelDiscoveryService>,
    options: GenerateOptions,
}

impl SessionEngine {
    pub fn new(provider: Box<dyn ModelProvider>, options: GenerateOptions) -> Self {
        let ctx = SessionContext::new(provider.current_model());
        Self {
            editor: LineEditor::new(),
            ctx,
            coordinator: StreamCoordinator::new(),
            provider,
            discovery: None,
            options,
        }
    }

    /// Use `discovery` to answer `/model`
    pub fn with_discovery(mut self, discovery: ModelDiscoveryService) -> Self {
        self.discovery = Some(discovery);
        self
    }

    /// Apply one keystroke-level event
    pub fn handle_input(&mut self, event: InputEvent) -> InputOutcome {
        match event {
            InputEvent::Char(ch) => self.editor.insert_char(ch),
            InputEvent::Paste(text) => self.editor.insert(&text),
            InputEvent::Backspace => self.editor.delete_backward(),
            InputEvent::Delete => self.editor.delete_forward(),
            InputEvent::Left => self.editor.move_cursor(-1),
            InputEvent::Right => self.editor.move_cursor(1),
            InputEvent::Home => self.editor.move_home(),
            InputEvent::End => self.editor.move_end(),
            InputEvent::Interrupt => return InputOutcome::Quit,
            InputEvent::Submit => {
                if self.coordinator.is_streaming() {
                    debug!("submission rejected while streaming");
                    return InputOutcome::Busy;
                }
                if self.editor.is_blank() {
                    return InputOutcome::Continue;
                }
                return InputOutcome::Submitted(self.editor.take());
            }
        }
        InputOutcome::Continue
    }

    /// Route a submitted line and act on it.
    ///
    /// Chat lines are logged and start a streamed reply; commands run to
    /// completion here. While a reply is streaming nothing is routed and
    /// `Streaming` is returned.
    pub async fn submit(&mut self, line: String) -> StreamPhase {
        if self.coordinator.is_streaming() {
            return StreamPhase::Streaming;
        }

        match CommandRouter::route(&line) {
            Action::Chat(prompt) => {
                self.ctx.log.append(Message::user(prompt.clone()));
                self.coordinator
                    .start_stream(&mut self.ctx, self.provider.as_ref(), &prompt, &self.options)
            }
            action => {
                CommandRouter::dispatch(
                    action,
                    &mut self.ctx,
                    self.provider.as_mut(),
                    self.discovery.as_ref(),
                )
                .await;
                StreamPhase::Idle
            }
        }
    }

    /// Next event of the streaming reply; see `StreamCoordinator::next_chunk`
    pub async fn next_chunk(&mut self) -> StreamEvent {
        self.coordinator.next_chunk().await
    }

    pub fn apply_chunk(&mut self, event: StreamEvent) -> StreamPhase {
        self.coordinator.apply(&mut self.ctx, event)
    }

    /// Drain the current reply, if any
    pub async fn finish_turn(&mut self) -> StreamPhase {
        self.coordinator.run_to_completion(&mut self.ctx).await
    }

    pub fn is_streaming(&self) -> bool {
        self.coordinator.is_streaming()
    }

    pub fn view(&self) -> SessionView<'_> {
        let state = &self.ctx.state;
        SessionView {
            messages: self.ctx.log.messages(),
            partial_output: state.streaming.then_some(state.partial_output.as_str()),
            input: self.editor.snapshot(),
            current_model: state.current_model.as_deref(),
            streaming: state.streaming,
        }
    }

    pub fn history(&self) -> Vec<Message> {
        self.ctx.log.history()
    }

    pub fn log(&self) -> &SessionLog {
        &self.ctx.log
    }

    pub fn state(&self) -> &SessionState {
        &self.ctx.state
    }

    /// Append an informational entry, e.g. a startup notice
    pub fn notify(&mut self, content: impl Into<String>) {
        self.ctx.info(content);
    }

    /// Clear the conversation and input. Only valid between turns.
    pub fn reset(&mut self) {
        if !self.is_streaming() {
            self.editor.reset();
            self.ctx.reset();
        }
    }
}
