//! # glyphterm-render
//!
//! Software rendering of a terminal grid with a bitmap font.
//!
//! This crate provides:
//! - Font atlas loading (256 fixed-size glyphs in one PNG)
//! - A `0x00RRGGBB` frame buffer with clipped glyph blits
//! - A dirty-gated renderer that draws a grid and hands the frame to a [`Presenter`]
//!
//! ## Architecture
//!
//! This is Layer 2 in the architecture - it depends on glyphterm-core and
//! glyphterm-emulator and knows nothing about windows. Frontends implement
//! [`Presenter`].

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod atlas;
pub mod frame;
pub mod renderer;
pub mod testing;

// Re-export commonly used types
pub use atlas::{FontAtlas, GLYPH_COUNT};
pub use frame::{FrameBuffer, Rect, BACKGROUND};
pub use renderer::{frame_size, Padding, Presenter, Renderer};
