//! # glyphterm-core
//!
//! Core types for glyphterm.
//!
//! This crate contains all fundamental types with **no internal dependencies**
//! on other glyphterm crates. It provides:
//!
//! - Packed grid cells (glyph index plus opaque attribute bits)
//! - Geometry types (Position, Dimensions)
//! - Key codes delivered by the windowing layer
//! - Events and PTY messages carried by the event bridge
//! - Configuration and error types
//!
//! ## Architecture
//!
//! This is Layer 0 in the architecture - all other crates depend on this one,
//! but this crate has no dependencies on other glyphterm crates.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod cell;
pub mod config;
pub mod error;
pub mod event;
pub mod geometry;
pub mod key;

// Re-export commonly used types
pub use cell::Cell;
pub use config::{FontSettings, TermConfig, TerminalSettings, WindowSettings};
pub use error::{Error, Result};
pub use event::{Event, Message};
pub use geometry::{Dimensions, Position};
pub use key::{ArrowLayout, KeyCode};
