//! Terminal session: a shell on a PTY plus the thread reading from it.

use std::io::Write;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use glyphterm_core::{Dimensions, Error, Result, TerminalSettings};
use glyphterm_emulator::pty::{login_shell, PtyHandle};

use crate::bridge::EventSender;
use crate::reader::spawn_reader;

/// How long teardown waits for the reader thread by default.
pub const DEFAULT_SHUTDOWN_GRACE: Duration = Duration::from_secs(2);

/// Status of a terminal session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    /// Shell is running
    Running,
    /// Shell exited on its own with the given code
    Exited(u32),
    /// Session was torn down by us
    Terminated,
}

/// A shell attached to a pseudo-terminal.
///
/// The session owns the PTY, the child process and the reader thread. The
/// write side of the PTY is handed out at [`Session::open`] so the terminal
/// loop can own it exclusively.
#[derive(Debug)]
pub struct Session {
    /// PTY handle
    pty: PtyHandle,
    /// Reader thread, until joined
    reader: Option<JoinHandle<()>>,
    /// Tells the reader to stop pushing events
    shutdown: Arc<AtomicBool>,
    /// Current session status
    status: SessionStatus,
}

impl Session {
    /// Open a PTY, start the shell and the reader thread.
    ///
    /// The shell is `settings.shell` if set, otherwise the user's login
    /// shell from the account database. It is started as a login shell
    /// unless `settings.login_shell` is off. Returns the session together
    /// with the PTY writer.
    pub fn open(
        dimensions: Dimensions,
        settings: &TerminalSettings,
        sender: EventSender,
    ) -> Result<(Self, Box<dyn Write + Send>)> {
        let shell = settings.shell.clone().unwrap_or_else(login_shell);
        info!(
            "Creating session: shell='{}', dimensions={}",
            shell, dimensions
        );

        let mut pty = PtyHandle::open(dimensions, &shell, settings.login_shell, &settings.term)?;
        let writer = pty.take_writer()?;
        let reader = pty.clone_reader()?;

        let shutdown = Arc::new(AtomicBool::new(false));
        let handle = spawn_reader(reader, sender, Arc::clone(&shutdown)).map_err(|e| {
            Error::PtyError(format!("Failed to start reader thread: {e}"))
        })?;

        info!("Session created: pid={:?}", pty.process_id());

        Ok((
            Self {
                pty,
                reader: Some(handle),
                shutdown,
                status: SessionStatus::Running,
            },
            writer,
        ))
    }

    /// Get the PTY handle.
    pub fn pty(&self) -> &PtyHandle {
        &self.pty
    }

    /// Operating system process id of the shell.
    pub fn process_id(&self) -> Option<u32> {
        self.pty.process_id()
    }

    /// Current status, refreshing it from the child if still running.
    pub fn status(&mut self) -> SessionStatus {
        if self.status == SessionStatus::Running {
            match self.pty.try_wait() {
                Ok(Some(code)) => self.set_status(SessionStatus::Exited(code)),
                Ok(None) => {}
                Err(e) => warn!("Failed to poll shell status: {}", e),
            }
        }
        self.status
    }

    /// Exit code of the shell, once it has exited on its own.
    pub fn exit_status(&mut self) -> Option<u32> {
        match self.status() {
            SessionStatus::Exited(code) => Some(code),
            _ => None,
        }
    }

    /// Check if the shell is still running.
    pub fn is_alive(&mut self) -> bool {
        self.status() == SessionStatus::Running
    }

    fn set_status(&mut self, status: SessionStatus) {
        info!("Session status changed: {:?} → {:?}", self.status, status);
        self.status = status;
    }

    /// Stop the shell and join the reader thread.
    ///
    /// Kills the shell if it is still running, which closes the PTY and
    /// unblocks the reader. If the reader has not finished within `grace`
    /// (another process may still hold the PTY open) it is left detached.
    /// If the kill fails the reader is kept so a later call can retry, and
    /// the kill error is returned. Once the reader is gone further calls
    /// are no-ops.
    pub fn shutdown(&mut self, grace: Duration) -> Result<()> {
        let Some(handle) = self.reader.take() else {
            return Ok(());
        };

        info!("Shutting down session pid={:?}", self.pty.process_id());
        self.shutdown.store(true, Ordering::Release);

        let killed = if self.is_alive() {
            self.pty.kill()
        } else {
            Ok(())
        };

        match killed {
            Ok(()) => {
                if self.status == SessionStatus::Running {
                    self.set_status(SessionStatus::Terminated);
                    match self.pty.wait() {
                        Ok(code) => debug!("Shell reaped with code {}", code),
                        Err(e) => warn!("Failed to reap shell: {}", e),
                    }
                }
                if join_reader(handle, grace).is_some() {
                    warn!("Reader thread still blocked after {:?}, detaching", grace);
                }
                Ok(())
            }
            Err(e) => {
                self.reader = join_reader(handle, grace);
                Err(e)
            }
        }
    }
}

/// Join the reader if it finishes within `grace`, otherwise hand it back.
fn join_reader(handle: JoinHandle<()>, grace: Duration) -> Option<JoinHandle<()>> {
    let deadline = Instant::now() + grace;
    while !handle.is_finished() {
        if Instant::now() >= deadline {
            return Some(handle);
        }
        thread::sleep(Duration::from_millis(10));
    }

    if handle.join().is_err() {
        warn!("Reader thread panicked");
    }
    debug!("Reader thread joined");
    None
}

impl Drop for Session {
    fn drop(&mut self) {
        if let Err(e) = self.shutdown(DEFAULT_SHUTDOWN_GRACE) {
            warn!("Session teardown failed: {}", e);
        }
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::bridge::EventBridge;
    use glyphterm_core::Event;

    fn settings() -> TerminalSettings {
        TerminalSettings {
            shell: Some("/bin/sh".to_string()),
            login_shell: false,
            ..TerminalSettings::default()
        }
    }

    #[test]
    fn test_session_open() {
        let (tx, _rx) = EventBridge::new();
        let (mut session, _writer) =
            Session::open(Dimensions::new(25, 80), &settings(), tx).unwrap();
        assert!(session.is_alive());
        assert!(session.process_id().is_some());
        assert_eq!(session.pty().shell(), "/bin/sh");
        assert_eq!(session.status(), SessionStatus::Running);
    }

    #[test]
    fn test_shutdown_kills_and_joins() {
        let (tx, _rx) = EventBridge::new();
        let (mut session, _writer) =
            Session::open(Dimensions::new(25, 80), &settings(), tx).unwrap();

        session.shutdown(Duration::from_secs(5)).unwrap();
        assert_eq!(session.status(), SessionStatus::Terminated);
        assert!(session.reader.is_none());

        // Second call is a no-op
        session.shutdown(Duration::from_secs(5)).unwrap();
    }

    #[test]
    fn test_join_reader_returns_unfinished_thread() {
        let (release, wait) = std::sync::mpsc::channel::<()>();
        let handle = thread::spawn(move || {
            let _ = wait.recv();
        });

        let handle = join_reader(handle, Duration::from_millis(30)).unwrap();
        release.send(()).unwrap();
        assert!(join_reader(handle, Duration::from_secs(5)).is_none());
    }

    #[test]
    fn test_login_shell_by_default() {
        if !std::path::Path::new("/bin/bash").exists() {
            return;
        }
        let settings = TerminalSettings {
            shell: Some("/bin/bash".to_string()),
            ..TerminalSettings::default()
        };
        let (tx, mut rx) = EventBridge::new();
        let (mut session, mut writer) =
            Session::open(Dimensions::new(25, 80), &settings, tx).unwrap();

        writer
            .write_all(b"echo LOGIN=$(shopt -q login_shell && echo yes || echo no)\n")
            .unwrap();
        writer.flush().unwrap();

        let deadline = Instant::now() + Duration::from_secs(10);
        let mut output = Vec::new();
        while Instant::now() < deadline && !String::from_utf8_lossy(&output).contains("LOGIN=yes") {
            match rx.try_event() {
                Some(Event::PtyData(msg)) => output.extend_from_slice(msg.as_bytes()),
                Some(Event::PtyClosed) | Some(Event::Quit) => break,
                Some(_) => {}
                None => thread::sleep(Duration::from_millis(10)),
            }
        }
        assert!(
            String::from_utf8_lossy(&output).contains("LOGIN=yes"),
            "output: {:?}",
            String::from_utf8_lossy(&output)
        );
        session.shutdown(Duration::from_secs(5)).unwrap();
    }

    #[test]
    fn test_child_exit_reports_pty_closed() {
        let (tx, mut rx) = EventBridge::new();
        let (mut session, mut writer) =
            Session::open(Dimensions::new(25, 80), &settings(), tx).unwrap();

        writer.write_all(b"exit 7\n").unwrap();
        writer.flush().unwrap();

        let deadline = Instant::now() + Duration::from_secs(10);
        let mut closed = false;
        while Instant::now() < deadline {
            match rx.wait_event() {
                Event::PtyClosed => {
                    closed = true;
                    break;
                }
                Event::Quit => break,
                _ => {}
            }
        }
        assert!(closed);

        // Reaping may lag slightly behind EOF
        let deadline = Instant::now() + Duration::from_secs(5);
        while session.exit_status().is_none() && Instant::now() < deadline {
            thread::sleep(Duration::from_millis(10));
        }
        assert_eq!(session.exit_status(), Some(7));
    }
}
