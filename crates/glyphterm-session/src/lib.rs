//! # glyphterm-session
//!
//! Session plumbing for glyphterm.
//!
//! This crate provides:
//! - The event bridge: a multi-producer, single-consumer event queue
//! - The PTY reader thread that turns reads into owned messages
//! - Session creation, status tracking and teardown
//! - Encoding of key presses and text input into PTY bytes
//!
//! ## Architecture
//!
//! This is Layer 2 in the architecture - it depends on glyphterm-core
//! and glyphterm-emulator to manage the shell's lifetime.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod bridge;
pub mod input;
pub mod reader;
pub mod session;

// Re-export commonly used types
pub use bridge::{EventBridge, EventReceiver, EventSender};
pub use input::InputEncoder;
pub use reader::{spawn_reader, READ_CHUNK_SIZE};
pub use session::{Session, SessionStatus, DEFAULT_SHUTDOWN_GRACE};
