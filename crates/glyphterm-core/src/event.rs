//! Events flowing through the event bridge.

use crate::KeyCode;

/// One completed read from the PTY.
///
/// A message has exactly one owner at a time: the reader thread builds it,
/// moves it into an [`Event::PtyData`], and whoever receives that event
/// releases it by dropping it. There is intentionally no `Clone`.
#[derive(Debug, PartialEq, Eq)]
pub struct Message {
    data: Box<[u8]>,
}

impl Message {
    /// Take ownership of a buffer sized exactly to the bytes read.
    pub fn new(data: impl Into<Box<[u8]>>) -> Self {
        Self { data: data.into() }
    }

    /// Copy a slice into a freshly allocated message.
    pub fn copy_from(bytes: &[u8]) -> Self {
        Self::new(bytes)
    }

    /// Number of bytes carried.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Check if the message carries no bytes.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Borrow the payload.
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }
}

/// Typed event consumed by the terminal loop.
#[derive(Debug, PartialEq, Eq)]
pub enum Event {
    /// The user asked to close the terminal
    Quit,
    /// A key with a fixed encoding was pressed
    KeyDown(KeyCode),
    /// Text produced by the keyboard or an input method
    TextInput(String),
    /// Bytes read from the PTY
    PtyData(Message),
    /// The PTY reached end-of-file or failed; the child is gone
    PtyClosed,
}

impl Event {
    /// Short name used in log output.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Quit => "quit",
            Self::KeyDown(_) => "key_down",
            Self::TextInput(_) => "text_input",
            Self::PtyData(_) => "pty_data",
            Self::PtyClosed => "pty_closed",
        }
    }
}
