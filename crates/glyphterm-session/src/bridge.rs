//! Event bridge between producer threads and the terminal loop.
//!
//! Any number of producers (the window, the PTY reader) push events through
//! cloned [`EventSender`]s; exactly one [`EventReceiver`] drains them. The
//! queue is unbounded, so pushing never blocks. Events from one producer
//! arrive in the order that producer pushed them.
//!
//! Wake-on-quit: `wait_event` blocks until an event arrives. Pushing
//! [`Event::Quit`] wakes it, and so does dropping the last sender, which is
//! reported as `Event::Quit` too.

use tokio::sync::mpsc::{self, error::TryRecvError};
use tracing::trace;

use glyphterm_core::{Error, Event, Result};

/// Constructor for a connected sender/receiver pair.
#[derive(Debug)]
pub struct EventBridge;

impl EventBridge {
    /// Create a new bridge.
    #[allow(clippy::new_ret_no_self)]
    pub fn new() -> (EventSender, EventReceiver) {
        let (tx, rx) = mpsc::unbounded_channel();
        (EventSender { tx }, EventReceiver { rx })
    }
}

/// Producer side of the bridge.
#[derive(Debug, Clone)]
pub struct EventSender {
    tx: mpsc::UnboundedSender<Event>,
}

impl EventSender {
    /// Enqueue an event without blocking.
    ///
    /// Ownership of the event (and any message it carries) moves into the
    /// queue. Fails with [`Error::BridgeClosed`] once the receiver is gone,
    /// in which case the event is dropped.
    pub fn push(&self, event: Event) -> Result<()> {
        trace!("Pushing {} event", event.kind());
        self.tx.send(event).map_err(|_| Error::BridgeClosed)
    }

    /// Check if the receiver has been dropped.
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

/// Consumer side of the bridge. Not cloneable.
#[derive(Debug)]
pub struct EventReceiver {
    rx: mpsc::UnboundedReceiver<Event>,
}

impl EventReceiver {
    /// Block the calling thread until an event is available.
    ///
    /// Returns [`Event::Quit`] once every sender has been dropped and the
    /// queue is drained. Must not be called from inside an async runtime.
    pub fn wait_event(&mut self) -> Event {
        self.rx.blocking_recv().unwrap_or(Event::Quit)
    }

    /// Take the next event if one is queued.
    ///
    /// Returns `Some(Event::Quit)` once every sender has been dropped.
    pub fn try_event(&mut self) -> Option<Event> {
        match self.rx.try_recv() {
            Ok(event) => Some(event),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => Some(Event::Quit),
        }
    }
}
