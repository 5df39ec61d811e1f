//! Blocking PTY reader thread.

use std::io::{ErrorKind, Read};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use tracing::{debug, info, warn};

use glyphterm_core::{Event, Message};

use crate::bridge::EventSender;

/// Maximum number of bytes taken from the PTY per read.
pub const READ_CHUNK_SIZE: usize = 256;

/// Start the reader thread.
///
/// Each successful read becomes one [`Message`] sized to the bytes read and
/// is pushed as [`Event::PtyData`]. End-of-file or a read error ends the
/// thread after pushing [`Event::PtyClosed`]. Setting `shutdown` stops the
/// thread from pushing anything further.
pub fn spawn_reader(
    reader: Box<dyn Read + Send>,
    sender: EventSender,
    shutdown: Arc<AtomicBool>,
) -> std::io::Result<JoinHandle<()>> {
    thread::Builder::new()
        .name("pty-reader".to_string())
        .spawn(move || read_loop(reader, sender, shutdown))
}

fn read_loop(mut reader: Box<dyn Read + Send>, sender: EventSender, shutdown: Arc<AtomicBool>) {
    let mut buf = [0u8; READ_CHUNK_SIZE];
    let mut total = 0usize;

    loop {
        match reader.read(&mut buf) {
            Ok(0) => {
                info!("PTY reached end-of-file after {} bytes", total);
                break;
            }
            Ok(n) => {
                if shutdown.load(Ordering::Acquire) {
                    debug!("Reader shutting down, discarding {} bytes", n);
                    return;
                }
                total += n;
                debug!("Read {} bytes from PTY", n);
                let message = Message::copy_from(&buf[..n]);
                if sender.push(Event::PtyData(message)).is_err() {
                    debug!("Event bridge closed, stopping reader");
                    return;
                }
            }
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => {
                // EIO is how Linux reports a PTY whose child has gone away
                info!("PTY read ended: {}", e);
                break;
            }
        }
    }

    if shutdown.load(Ordering::Acquire) {
        return;
    }
    if sender.push(Event::PtyClosed).is_err() {
        warn!("Event bridge closed before PTY close could be reported");
    }
}
