//! Key and text encoding for bytes sent to the PTY.

use glyphterm_core::{ArrowLayout, KeyCode};

const ESC: &[u8] = b"\x1b";
const DEL: &[u8] = b"\x7f";
const CR: &[u8] = b"\r";
const CURSOR_UP: &[u8] = b"\x1b[A";
const CURSOR_DOWN: &[u8] = b"\x1b[B";
const CURSOR_FORWARD: &[u8] = b"\x1b[C";
const CURSOR_BACKWARD: &[u8] = b"\x1b[D";

/// Maps key presses and text input to PTY bytes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InputEncoder {
    arrows: ArrowLayout,
}

impl InputEncoder {
    /// Create an encoder with the given arrow-key layout.
    pub fn new(arrows: ArrowLayout) -> Self {
        Self { arrows }
    }

    /// Bytes for a key press, or None for keys that send nothing.
    pub fn encode_key(&self, key: KeyCode) -> Option<&'static [u8]> {
        let bytes = match key {
            KeyCode::Escape => ESC,
            KeyCode::Backspace => DEL,
            KeyCode::Up => CURSOR_UP,
            KeyCode::Down => CURSOR_DOWN,
            KeyCode::Right => match self.arrows {
                ArrowLayout::Standard => CURSOR_FORWARD,
                ArrowLayout::Legacy => CURSOR_BACKWARD,
            },
            KeyCode::Left => match self.arrows {
                ArrowLayout::Standard => CURSOR_BACKWARD,
                ArrowLayout::Legacy => CURSOR_FORWARD,
            },
            KeyCode::Enter | KeyCode::KeypadEnter => CR,
            KeyCode::Other(_) => return None,
        };
        Some(bytes)
    }

    /// Bytes for a text-input event: the UTF-8 text, unmodified.
    pub fn encode_text<'a>(&self, text: &'a str) -> &'a [u8] {
        text.as_bytes()
    }
}
