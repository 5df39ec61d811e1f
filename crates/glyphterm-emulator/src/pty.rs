//! PTY (Pseudo-Terminal) handling with portable-pty.

use portable_pty::{native_pty_system, Child, CommandBuilder, MasterPty, PtySize};
use std::io::{Read, Write};
use tracing::{debug, error, info, warn};

use glyphterm_core::{Dimensions, Error, Result};

/// Shell used when the account database has no usable entry.
#[cfg(unix)]
pub const DEFAULT_SHELL: &str = "/bin/sh";
/// Shell used when the account database has no usable entry.
#[cfg(windows)]
pub const DEFAULT_SHELL: &str = "cmd.exe";

/// Resolve the invoking user's login shell.
///
/// Reads the shell field of the current uid's account database entry and
/// falls back to [`DEFAULT_SHELL`] when it is missing or empty.
pub fn login_shell() -> String {
    #[cfg(unix)]
    if let Some(shell) = passwd_shell() {
        return shell;
    }
    DEFAULT_SHELL.to_string()
}

#[cfg(unix)]
fn passwd_shell() -> Option<String> {
    // SAFETY: getpwuid returns either null or a pointer to static storage that
    // stays valid until the next getpw* call; the shell string is copied out
    // before endpwent releases it.
    let shell = unsafe {
        let pwd = libc::getpwuid(libc::getuid());
        let shell = if pwd.is_null() || (*pwd).pw_shell.is_null() {
            None
        } else {
            std::ffi::CStr::from_ptr((*pwd).pw_shell)
                .to_str()
                .ok()
                .map(str::to_string)
        };
        libc::endpwent();
        shell
    };
    shell.filter(|s| !s.trim().is_empty())
}

/// Handle to a shell running on a pseudo-terminal.
pub struct PtyHandle {
    /// The master PTY end
    master: Box<dyn MasterPty + Send>,
    /// The child process
    child: Box<dyn Child + Send + Sync>,
    /// PTY writer, until handed out
    writer: Option<Box<dyn Write + Send>>,
    /// PTY dimensions, fixed at open time
    dimensions: Dimensions,
    /// Shell program that was started
    shell: String,
}

impl std::fmt::Debug for PtyHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PtyHandle")
            .field("dimensions", &self.dimensions)
            .field("shell", &self.shell)
            .field("pid", &self.child.process_id())
            .finish_non_exhaustive()
    }
}

impl PtyHandle {
    /// Allocate a PTY of the given size and start `shell` on it.
    ///
    /// The child gets its own session with the PTY as controlling terminal
    /// and `TERM` set to `term`. With `login` set the shell is started with
    /// `-l` on unix, so it reads the profile scripts. If the shell cannot be
    /// executed the error is reported here rather than through the child's
    /// exit status.
    ///
    /// # Example
    /// ```no_run
    /// use glyphterm_emulator::pty::{login_shell, PtyHandle};
    /// use glyphterm_core::Dimensions;
    ///
    /// # fn example() -> glyphterm_core::Result<()> {
    /// let pty = PtyHandle::open(Dimensions::new(25, 80), &login_shell(), true, "xterm")?;
    /// # Ok(())
    /// # }
    /// ```
    pub fn open(dimensions: Dimensions, shell: &str, login: bool, term: &str) -> Result<Self> {
        if dimensions.rows == 0 || dimensions.cols == 0 {
            return Err(Error::InvalidDimensions {
                rows: dimensions.rows,
                cols: dimensions.cols,
            });
        }

        info!(
            "Opening PTY: shell='{}', login={}, TERM={}, dimensions={}",
            shell, login, term, dimensions
        );

        let pty_system = native_pty_system();

        let pty_size = PtySize {
            rows: dimensions.rows,
            cols: dimensions.cols,
            pixel_width: 0,
            pixel_height: 0,
        };

        let pair = pty_system.openpty(pty_size).map_err(|e| {
            error!("Failed to open PTY: {}", e);
            Error::PtyError(format!("Failed to open PTY: {e}"))
        })?;

        let mut cmd = CommandBuilder::new(shell);
        cmd.env("TERM", term);
        #[cfg(unix)]
        if login {
            cmd.arg("-l");
        }
        #[cfg(not(unix))]
        let _ = login;

        debug!("Spawning child process: {}", shell);
        let child = pair.slave.spawn_command(cmd).map_err(|e| {
            error!("Failed to spawn shell '{}': {}", shell, e);
            Error::Spawn {
                shell: shell.to_string(),
                reason: e.to_string(),
            }
        })?;

        // Only the child may hold the slave, otherwise reads never see EOF
        drop(pair.slave);

        let writer = pair.master.take_writer().map_err(|e| {
            error!("Failed to take PTY writer: {}", e);
            Error::PtyError(format!("Failed to take writer: {e}"))
        })?;

        info!(
            "PTY opened: shell='{}', pid={:?}",
            shell,
            child.process_id()
        );

        Ok(Self {
            master: pair.master,
            child,
            writer: Some(writer),
            dimensions,
            shell: shell.to_string(),
        })
    }

    /// Clone a blocking reader over the master side.
    pub fn clone_reader(&self) -> Result<Box<dyn Read + Send>> {
        self.master
            .try_clone_reader()
            .map_err(|e| Error::PtyError(format!("Failed to clone reader: {e}")))
    }

    /// Hand out the master writer. Succeeds once.
    pub fn take_writer(&mut self) -> Result<Box<dyn Write + Send>> {
        self.writer
            .take()
            .ok_or_else(|| Error::PtyError("PTY writer already taken".to_string()))
    }

    /// PTY dimensions.
    pub fn dimensions(&self) -> Dimensions {
        self.dimensions
    }

    /// Shell program running on the PTY.
    pub fn shell(&self) -> &str {
        &self.shell
    }

    /// Operating system process id of the shell, if known.
    pub fn process_id(&self) -> Option<u32> {
        self.child.process_id()
    }

    /// Check if the child process is still running.
    pub fn is_alive(&mut self) -> bool {
        matches!(self.child.try_wait(), Ok(None))
    }

    /// Exit code of the child, or None while it is still running.
    pub fn try_wait(&mut self) -> Result<Option<u32>> {
        Ok(self.child.try_wait()?.map(|status| status.exit_code()))
    }

    /// Kill the child process.
    pub fn kill(&mut self) -> Result<()> {
        info!("Killing shell pid={:?}", self.child.process_id());
        self.child.kill().map_err(|e| {
            warn!("Kill failed: {}", e);
            Error::PtyError(format!("Kill failed: {e}"))
        })
    }

    /// Block until the child exits and return its exit code.
    pub fn wait(&mut self) -> Result<u32> {
        let status = self.child.wait()?;
        Ok(status.exit_code())
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::time::{Duration, Instant};

    fn read_until(reader: &mut dyn Read, needle: &str) -> String {
        let deadline = Instant::now() + Duration::from_secs(5);
        let mut output = Vec::new();
        let mut buf = [0u8; 256];
        while Instant::now() < deadline {
            match reader.read(&mut buf) {
                Ok(0) | Err(_) => break,
                Ok(n) => {
                    output.extend_from_slice(&buf[..n]);
                    if String::from_utf8_lossy(&output).contains(needle) {
                        break;
                    }
                }
            }
        }
        String::from_utf8_lossy(&output).into_owned()
    }

    #[test]
    fn test_login_shell_is_not_empty() {
        let shell = login_shell();
        assert!(!shell.trim().is_empty());
    }

    #[test]
    fn test_pty_open() {
        let mut pty = PtyHandle::open(Dimensions::new(25, 80), "/bin/sh", false, "xterm").unwrap();
        assert!(pty.is_alive());
        assert!(pty.process_id().is_some());
        assert_eq!(pty.dimensions(), Dimensions::new(25, 80));
        assert_eq!(pty.shell(), "/bin/sh");
        pty.kill().unwrap();
    }

    #[test]
    fn test_pty_rejects_zero_dimensions() {
        let result = PtyHandle::open(Dimensions::new(0, 80), "/bin/sh", false, "xterm");
        assert!(matches!(result, Err(Error::InvalidDimensions { .. })));
    }

    #[test]
    fn test_pty_missing_shell_fails_to_spawn() {
        let result = PtyHandle::open(
            Dimensions::new(25, 80),
            "/nonexistent/glyphterm-shell",
            false,
            "xterm",
        );
        assert!(matches!(result, Err(Error::Spawn { .. })));
    }

    #[test]
    fn test_pty_sets_term() {
        let mut pty = PtyHandle::open(Dimensions::new(25, 80), "/bin/sh", false, "vt100").unwrap();
        let mut reader = pty.clone_reader().unwrap();
        let mut writer = pty.take_writer().unwrap();

        writer.write_all(b"echo term=$TERM\n").unwrap();
        writer.flush().unwrap();

        let output = read_until(&mut reader, "term=vt100");
        assert!(output.contains("term=vt100"), "output: {output:?}");
        pty.kill().unwrap();
    }

    /// Ask bash whether it considers itself a login shell.
    fn bash_login_flag(login: bool) -> Option<String> {
        if !std::path::Path::new("/bin/bash").exists() {
            return None;
        }
        let mut pty = PtyHandle::open(Dimensions::new(25, 80), "/bin/bash", login, "xterm").unwrap();
        let mut reader = pty.clone_reader().unwrap();
        let mut writer = pty.take_writer().unwrap();

        writer
            .write_all(b"echo LOGIN=$(shopt -q login_shell && echo yes || echo no)\n")
            .unwrap();
        writer.flush().unwrap();

        let output = read_until(&mut reader, if login { "LOGIN=yes" } else { "LOGIN=no" });
        pty.kill().unwrap();
        Some(output)
    }

    #[test]
    fn test_login_flag_starts_login_shell() {
        if let Some(output) = bash_login_flag(true) {
            assert!(output.contains("LOGIN=yes"), "output: {output:?}");
        }
    }

    #[test]
    fn test_plain_shell_is_not_login() {
        if let Some(output) = bash_login_flag(false) {
            assert!(output.contains("LOGIN=no"), "output: {output:?}");
        }
    }

    #[test]
    fn test_take_writer_once() {
        let mut pty = PtyHandle::open(Dimensions::new(25, 80), "/bin/sh", false, "xterm").unwrap();
        assert!(pty.take_writer().is_ok());
        assert!(pty.take_writer().is_err());
        pty.kill().unwrap();
    }

    #[test]
    fn test_exit_status_after_exit() {
        let mut pty = PtyHandle::open(Dimensions::new(25, 80), "/bin/sh", false, "xterm").unwrap();
        let mut writer = pty.take_writer().unwrap();
        writer.write_all(b"exit 3\n").unwrap();
        writer.flush().unwrap();

        assert_eq!(pty.wait().unwrap(), 3);
        assert_eq!(pty.try_wait().unwrap(), Some(3));
        assert!(!pty.is_alive());
    }
}
