//! # glyphterm-emulator
//!
//! Terminal emulation for glyphterm.
//!
//! This crate provides:
//! - VTE parser for ANSI/VT escape sequences, feeding a fixed-size grid
//! - Terminal grid state with per-row change tracking
//! - PTY (pseudo-terminal) allocation and login-shell spawning
//!
//! ## Architecture
//!
//! This is Layer 1 in the architecture - it depends on glyphterm-core
//! and provides terminal emulation functionality.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod grid;
pub mod parser;
pub mod pty;

// Re-export commonly used types
pub use grid::{Cursor, Grid};
pub use parser::{Host, NullHost, Parser};
pub use pty::{login_shell, PtyHandle};
