// Gateway module for TUI - follows the Train Station Pattern
// All external access must go through this gateway

// Private submodules - not directly accessible from outside
mod input;
mod render;
mod selector;
mod terminal;
mod ui;

// Public re-exports - the ONLY way to access TUI functionality
pub use input::InputHandler;
pub use render::render_ui;
pub use selector::{ModelSelector, SelectorOutcome};
pub use terminal::{TerminalSession, Tui};
pub use ui::run_ui;
