//! # glyphterm
//!
//! A bitmap-font terminal window running the user's login shell.
//!
//! ## Architecture
//!
//! This is Layer 3 - the application that ties together:
//! - glyphterm-core: Core types, configuration and errors
//! - glyphterm-emulator: Grid, VTE parser and PTY
//! - glyphterm-session: Shell session, reader thread and event bridge
//! - glyphterm-render: Font atlas and software renderer
//!
//! Three threads cooperate: the window thread (winit) and the PTY reader
//! produce events, and the terminal thread consumes them and owns all
//! terminal state.

pub mod cli;
pub mod frontend;
pub mod terminal;

// Re-export commonly used types
pub use cli::Cli;
pub use frontend::{spawn_terminal, FrontendEvent, ProxyPresenter, WindowApp};
pub use terminal::{ExitReason, Terminal};
