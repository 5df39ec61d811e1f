//! The terminal event loop.
//!
//! [`Terminal`] is the single owner of the grid, the renderer and the PTY
//! writer. It drains the event bridge one event at a time, so nothing it
//! owns is ever touched from another thread.

use std::io::Write;

use tracing::{debug, info, warn};

use glyphterm_core::{Error, Event, KeyCode, Message, Result};
use glyphterm_emulator::{Host, Parser};
use glyphterm_render::{Presenter, Renderer};
use glyphterm_session::{EventReceiver, InputEncoder};

/// Why the event loop stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitReason {
    /// Quit was requested (window closed, or every producer went away)
    Quit,
    /// The shell side of the PTY closed
    ChildExited,
}

/// Context object for the event loop.
pub struct Terminal<P> {
    parser: Parser,
    renderer: Renderer,
    encoder: InputEncoder,
    writer: Box<dyn Write + Send>,
    presenter: P,
}

impl<P: Presenter> Terminal<P> {
    /// Assemble a terminal. The parser grid and renderer must agree on size.
    pub fn new(
        parser: Parser,
        renderer: Renderer,
        encoder: InputEncoder,
        writer: Box<dyn Write + Send>,
        presenter: P,
    ) -> Result<Self> {
        let grid_dims = parser.grid().dimensions();
        if grid_dims != renderer.dimensions() {
            return Err(Error::GridMismatch {
                expected: renderer.dimensions(),
                actual: grid_dims,
            });
        }
        Ok(Self {
            parser,
            renderer,
            encoder,
            writer,
            presenter,
        })
    }

    /// The parser and its grid.
    pub fn parser(&self) -> &Parser {
        &self.parser
    }

    /// The renderer.
    pub fn renderer(&self) -> &Renderer {
        &self.renderer
    }

    /// The presenter.
    pub fn presenter(&self) -> &P {
        &self.presenter
    }

    /// Run until quit or until the PTY closes.
    ///
    /// Each iteration presents a frame if anything changed, then blocks for
    /// the next event. Render and present failures end the loop with an
    /// error.
    pub fn run(&mut self, events: &mut EventReceiver) -> Result<ExitReason> {
        info!("Terminal loop started");
        loop {
            self.renderer
                .redraw_if_dirty(self.parser.grid(), &mut self.presenter)?;

            let event = events.wait_event();
            if let Some(reason) = self.handle_event(event) {
                info!("Terminal loop finished: {:?}", reason);
                return Ok(reason);
            }
        }
    }

    /// Dispatch one event. Returns the exit reason if the loop should stop.
    pub fn handle_event(&mut self, event: Event) -> Option<ExitReason> {
        match event {
            Event::Quit => return Some(ExitReason::Quit),
            Event::PtyClosed => return Some(ExitReason::ChildExited),
            Event::KeyDown(key) => self.key_down(key),
            Event::TextInput(text) => {
                let bytes = self.encoder.encode_text(&text);
                if !bytes.is_empty() {
                    write_pty(&mut self.writer, bytes);
                }
            }
            Event::PtyData(message) => self.pty_data(message),
        }
        None
    }

    fn key_down(&mut self, key: KeyCode) {
        match self.encoder.encode_key(key) {
            Some(bytes) => write_pty(&mut self.writer, bytes),
            None => debug!("No encoding for {:?}", key),
        }
    }

    fn pty_data(&mut self, message: Message) {
        let mut host = LoopHost {
            writer: &mut self.writer,
            presenter: &mut self.presenter,
        };
        let changed = self.parser.feed(message.as_bytes(), &mut host);
        debug!("{} bytes from PTY, {} rows changed", message.len(), changed);
        if changed > 0 {
            self.renderer.mark_dirty();
        }
    }
}

impl<P> std::fmt::Debug for Terminal<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Terminal")
            .field("parser", &self.parser)
            .field("renderer", &self.renderer)
            .field("encoder", &self.encoder)
            .finish_non_exhaustive()
    }
}

/// Best-effort write to the PTY; failures are logged and dropped.
fn write_pty(writer: &mut dyn Write, bytes: &[u8]) {
    if let Err(e) = writer.write_all(bytes).and_then(|()| writer.flush()) {
        warn!("Failed to write {} bytes to PTY: {}", bytes.len(), e);
    }
}

/// Parser callbacks during one feed.
struct LoopHost<'a, P> {
    writer: &'a mut Box<dyn Write + Send>,
    presenter: &'a mut P,
}

impl<P: Presenter> Host for LoopHost<'_, P> {
    fn bell(&mut self) {
        self.presenter.bell();
    }

    fn set_title(&mut self, title: &str) {
        self.presenter.set_title(title);
    }

    fn write(&mut self, bytes: &[u8]) {
        write_pty(self.writer.as_mut(), bytes);
    }
}
