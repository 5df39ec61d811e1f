//! Integration tests for the terminal event loop.

use std::io::{self, Write};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use proptest::prelude::*;

use glyphterm::{ExitReason, Terminal};
use glyphterm_core::{ArrowLayout, Dimensions, Event, KeyCode, Message};
use glyphterm_emulator::Parser;
use glyphterm_render::testing::{numbered_atlas, RecordingPresenter};
use glyphterm_render::{Padding, Renderer};
use glyphterm_session::{EventBridge, InputEncoder};

/// Writer whose output stays inspectable after the terminal takes it.
#[derive(Clone, Default)]
struct SharedWriter(Arc<Mutex<Vec<u8>>>);

impl SharedWriter {
    fn bytes(&self) -> Vec<u8> {
        self.0.lock().unwrap().clone()
    }
}

impl Write for SharedWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

fn terminal(
    dims: Dimensions,
    arrows: ArrowLayout,
    writer: SharedWriter,
) -> Terminal<RecordingPresenter> {
    Terminal::new(
        Parser::init(dims),
        Renderer::new(dims, numbered_atlas(8, 16, 32), Padding::new(8, 8)),
        InputEncoder::new(arrows),
        Box::new(writer),
        RecordingPresenter::default(),
    )
    .unwrap()
}

#[test]
fn test_run_dispatches_until_quit() {
    let out = SharedWriter::default();
    let mut term = terminal(Dimensions::new(25, 80), ArrowLayout::Standard, out.clone());
    let (tx, mut rx) = EventBridge::new();

    tx.push(Event::KeyDown(KeyCode::Left)).unwrap();
    tx.push(Event::TextInput("ls".to_string())).unwrap();
    tx.push(Event::KeyDown(KeyCode::Enter)).unwrap();
    tx.push(Event::PtyData(Message::copy_from(b"hello\r\n"))).unwrap();
    tx.push(Event::Quit).unwrap();

    assert_eq!(term.run(&mut rx).unwrap(), ExitReason::Quit);
    assert_eq!(out.bytes(), b"\x1b[Dls\r");
    assert_eq!(term.parser().grid().row_text(0), "hello");
    assert_eq!(term.parser().grid().cursor().position.row, 1);
    assert_eq!(term.parser().grid().cursor().position.col, 0);
    // Initial frame plus one after "hello"
    assert_eq!(term.presenter().frames, 2);
}

#[test]
fn test_no_redraw_without_changes() {
    let mut term = terminal(Dimensions::new(5, 20), ArrowLayout::Standard, SharedWriter::default());
    let (tx, mut rx) = EventBridge::new();

    tx.push(Event::KeyDown(KeyCode::Up)).unwrap();
    tx.push(Event::PtyData(Message::copy_from(b"\x1b[3;3H"))).unwrap();
    tx.push(Event::KeyDown(KeyCode::Other(99))).unwrap();
    tx.push(Event::Quit).unwrap();

    term.run(&mut rx).unwrap();
    assert_eq!(term.presenter().frames, 1);
}

#[test]
fn test_split_escape_sequence_across_messages() {
    let mut term = terminal(Dimensions::new(5, 20), ArrowLayout::Standard, SharedWriter::default());
    let (tx, mut rx) = EventBridge::new();

    tx.push(Event::PtyData(Message::copy_from(b"ab\x1b["))).unwrap();
    tx.push(Event::PtyData(Message::copy_from(b"2Jcd"))).unwrap();
    tx.push(Event::Quit).unwrap();

    term.run(&mut rx).unwrap();
    let grid = term.parser().grid();
    assert_eq!(grid.row_text(0), "  cd");
}

#[test]
fn test_pty_closed_stops_loop() {
    let mut term = terminal(Dimensions::new(5, 20), ArrowLayout::Standard, SharedWriter::default());
    let (tx, mut rx) = EventBridge::new();

    tx.push(Event::PtyData(Message::copy_from(b"bye"))).unwrap();
    tx.push(Event::PtyClosed).unwrap();
    tx.push(Event::KeyDown(KeyCode::Enter)).unwrap();

    assert_eq!(term.run(&mut rx).unwrap(), ExitReason::ChildExited);
    // Events after the close are never dispatched
    assert_eq!(rx.try_event(), Some(Event::KeyDown(KeyCode::Enter)));
}

#[test]
fn test_dropping_every_sender_quits() {
    let mut term = terminal(Dimensions::new(5, 20), ArrowLayout::Standard, SharedWriter::default());
    let (tx, mut rx) = EventBridge::new();

    let producer = thread::spawn(move || {
        tx.push(Event::PtyData(Message::copy_from(b"x"))).unwrap();
        thread::sleep(Duration::from_millis(20));
    });

    assert_eq!(term.run(&mut rx).unwrap(), ExitReason::Quit);
    producer.join().unwrap();
    assert_eq!(term.parser().grid().row_text(0), "x");
}

#[test]
fn test_legacy_arrow_layout() {
    let out = SharedWriter::default();
    let mut term = terminal(Dimensions::new(5, 20), ArrowLayout::Legacy, out.clone());
    let (tx, mut rx) = EventBridge::new();

    tx.push(Event::KeyDown(KeyCode::Left)).unwrap();
    tx.push(Event::KeyDown(KeyCode::Right)).unwrap();
    tx.push(Event::Quit).unwrap();

    term.run(&mut rx).unwrap();
    assert_eq!(out.bytes(), b"\x1b[C\x1b[D");
}

#[cfg(unix)]
#[test]
fn test_shell_round_trip() {
    use glyphterm_core::TerminalSettings;
    use glyphterm_session::Session;

    let dims = Dimensions::new(10, 40);
    let settings = TerminalSettings {
        shell: Some("/bin/sh".to_string()),
        login_shell: false,
        ..TerminalSettings::default()
    };
    let (tx, mut rx) = EventBridge::new();
    let (mut session, writer) = Session::open(dims, &settings, tx.clone()).unwrap();

    let mut term = Terminal::new(
        Parser::init(dims),
        Renderer::new(dims, numbered_atlas(8, 16, 32), Padding::default()),
        InputEncoder::default(),
        writer,
        RecordingPresenter::default(),
    )
    .unwrap();

    tx.push(Event::TextInput("echo glyph-$((6*7))".to_string()))
        .unwrap();
    tx.push(Event::KeyDown(KeyCode::Enter)).unwrap();
    tx.push(Event::TextInput("exit".to_string())).unwrap();
    tx.push(Event::KeyDown(KeyCode::Enter)).unwrap();

    // Watchdog in case the shell never exits
    let watchdog = tx.clone();
    thread::spawn(move || {
        thread::sleep(Duration::from_secs(20));
        let _ = watchdog.push(Event::Quit);
    });
    drop(tx);

    assert_eq!(term.run(&mut rx).unwrap(), ExitReason::ChildExited);
    assert!(term.parser().grid().to_plain_text().contains("glyph-42"));
    assert!(term.presenter().frames >= 1);

    session.shutdown(Duration::from_secs(5)).unwrap();
}

fn key_code() -> impl Strategy<Value = KeyCode> {
    prop_oneof![
        Just(KeyCode::Escape),
        Just(KeyCode::Backspace),
        Just(KeyCode::Up),
        Just(KeyCode::Down),
        Just(KeyCode::Left),
        Just(KeyCode::Right),
        Just(KeyCode::Enter),
        Just(KeyCode::KeypadEnter),
        (0u32..512).prop_map(KeyCode::Other),
    ]
}

proptest! {
    /// The PTY receives exactly the concatenated encodings, in event order.
    #[test]
    fn writer_receives_encodings_in_order(keys in prop::collection::vec(key_code(), 0..32)) {
        let out = SharedWriter::default();
        let mut term = terminal(Dimensions::new(5, 20), ArrowLayout::Standard, out.clone());
        let encoder = InputEncoder::default();
        let (tx, mut rx) = EventBridge::new();

        let mut expected = Vec::new();
        for key in &keys {
            if let Some(bytes) = encoder.encode_key(*key) {
                expected.extend_from_slice(bytes);
            }
            tx.push(Event::KeyDown(*key)).unwrap();
        }
        drop(tx);

        prop_assert_eq!(term.run(&mut rx).unwrap(), ExitReason::Quit);
        prop_assert_eq!(out.bytes(), expected);
    }
}
