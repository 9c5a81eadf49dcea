use anyhow::Result;
use crossterm::event::{Event, EventStream};
use futures::StreamExt;
use tracing::{debug, info};

use super::input::InputHandler;
use super::render::render_ui;
use super::terminal::TerminalSession;
use crate::session::{InputEvent, InputOutcome, SessionEngine};

/// Run the chat screen until the user quits or the process is told to stop
pub async fn run_ui(engine: &mut SessionEngine, session: &mut TerminalSession) -> Result<()> {
    let input = InputHandler::new();
    let mut events = EventStream::new();
    let shutdown = shutdown_signal();
    tokio::pin!(shutdown);

    loop {
        session.terminal().draw(|f| render_ui(f, &engine.view()))?;

        tokio::select! {
            event = events.next() => match event {
                Some(Ok(Event::Key(key))) => {
                    let Some(input_event) = input.handle_key(key) else {
                        continue;
                    };
                    match engine.handle_input(input_event) {
                        InputOutcome::Quit => break,
                        InputOutcome::Submitted(line) => {
                            engine.submit(line).await;
                        }
                        InputOutcome::Busy | InputOutcome::Continue => {}
                    }
                }
                Some(Ok(Event::Paste(text))) => {
                    // The input is a single line
                    let text = text.replace(['\r', '\n'], " ");
                    engine.handle_input(InputEvent::Paste(text));
                }
                Some(Ok(_)) => {}
                Some(Err(e)) => return Err(e.into()),
                None => break,
            },
            chunk = engine.next_chunk(), if engine.is_streaming() => {
                engine.apply_chunk(chunk);
            }
            _ = &mut shutdown => {
                info!("termination signal received");
                break;
            }
        }
    }

    debug!(messages = engine.log().len(), "chat screen closed");
    Ok(())
}

/// Completes on SIGINT or SIGTERM
async fn shutdown_signal() {
    let interrupt = async {
        if tokio::signal::ctrl_c().await.is_err() {
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(_) => std::future::pending::<()>().await,
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = interrupt => {}
        _ = terminate => {}
    }
}
