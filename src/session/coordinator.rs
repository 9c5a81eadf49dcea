use futures::StreamExt;
use tracing::{debug, info};

use super::log::Message;
use super::state::SessionContext;
use crate::models::{ChunkStream, GenerateOptions, ModelProvider};
use crate::utils::ChatError;

/// Where the current turn stands.
///
/// The coordinator itself only rests in `Idle` or `Streaming`; `Resolved` and
/// `Failed` are reported once when a turn ends, after which it is idle again.
#[derive(Debug, Clone, PartialEq)]
pub enum StreamPhase {
    Idle,
    Streaming,
    Resolved(String),
    Failed(ChatError),
}

/// One pull from the active stream: a chunk, a failure, or the end
pub type StreamEvent = Option<Result<String, ChatError>>;

/// Drives one streamed reply at a time into the session
#[derive(Default)]
pub struct StreamCoordinator {
    stream: Option<ChunkStream>,
}

impl StreamCoordinator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_streaming(&self) -> bool {
        self.stream.is_some()
    }

    /// Begin a turn for `prompt`.
    ///
    /// Without a selected model the turn fails immediately and is committed
    /// as an error entry.
    ///
    /// # Panics
    /// If a turn is already streaming.
    pub fn start_stream(
        &mut self,
        ctx: &mut SessionContext,
        provider: &dyn ModelProvider,
        prompt: &str,
        options: &GenerateOptions,
    ) -> StreamPhase {
        assert!(
            !self.is_streaming(),
            "start_stream called while a reply is still streaming"
        );

        let Some(model) = provider.current_model() else {
            return self.fail(ctx, ChatError::NoModelSelected);
        };

        info!(%model, "starting reply stream");
        ctx.state.current_model = Some(model);
        ctx.state.streaming = true;
        ctx.state.partial_output.clear();
        self.stream = Some(provider.stream_response(prompt, options));
        StreamPhase::Streaming
    }

    /// Wait for the next event of the active stream.
    ///
    /// Cancel safe: dropping the future loses nothing. Returns `None` right
    /// away when nothing is streaming.
    pub async fn next_chunk(&mut self) -> StreamEvent {
        match self.stream.as_mut() {
            Some(stream) => stream.next().await,
            None => None,
        }
    }

    /// Fold one stream event into the session
    pub fn apply(&mut self, ctx: &mut SessionContext, event: StreamEvent) -> StreamPhase {
        if !self.is_streaming() {
            return StreamPhase::Idle;
        }

        match event {
            Some(Ok(chunk)) => {
                ctx.state.partial_output.push_str(&chunk);
                StreamPhase::Streaming
            }
            Some(Err(e)) => self.fail(ctx, e),
            None => self.resolve(ctx),
        }
    }

    /// Pull and apply until the current turn ends
    pub async fn run_to_completion(&mut self, ctx: &mut SessionContext) -> StreamPhase {
        if !self.is_streaming() {
            return StreamPhase::Idle;
        }
        loop {
            let event = self.next_chunk().await;
            match self.apply(ctx, event) {
                StreamPhase::Streaming => continue,
                done => return done,
            }
        }
    }

    fn resolve(&mut self, ctx: &mut SessionContext) -> StreamPhase {
        self.stream = None;
        let text = std::mem::take(&mut ctx.state.partial_output);
        ctx.state.streaming = false;
        debug!(chars = text.chars().count(), "reply complete");
        ctx.log.append(Message::assistant(text.clone()));
        StreamPhase::Resolved(text)
    }

    fn fail(&mut self, ctx: &mut SessionContext, error: ChatError) -> StreamPhase {
        // Dropping the receiver stops the producer at its next send
        self.stream = None;
        ctx.state.partial_output.clear();
        ctx.state.streaming = false;
        ctx.record_error(error.clone());
        StreamPhase::Failed(error)
    }
}
