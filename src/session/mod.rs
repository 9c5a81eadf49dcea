/// Session engine module - Gateway
mod coordinator;
mod editor;
mod engine;
mod log;
mod router;
mod state;

pub use coordinator::{StreamCoordinator, StreamEvent, StreamPhase};
pub use editor::{EditorBuffer, LineEditor};
pub use engine::{InputEvent, InputOutcome, SessionEngine, SessionView};
pub use log::{Message, MessageKind, SessionLog};
pub use router::{Action, CommandRouter, HELP_TEXT};
pub use state::{ErrorInfo, SessionContext, SessionState};
