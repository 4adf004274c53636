//! Terminal session management.
//!
//! A session owns a PTY with the presentation command running in it and
//! a virtual pane mirroring what the command has drawn. The trait seam
//! exists so the capture driver can be exercised against a scripted
//! stand-in.

use std::io::Read;

use tempfile::NamedTempFile;
use thiserror::Error;
use tokio::time::{timeout, Duration};

use crate::pane::Pane;
use crate::pty::Pty;

/// How long to keep draining PTY output once it stops arriving.
const DRAIN_IDLE: Duration = Duration::from_millis(10);

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("failed to start session: {0}")]
    StartFailed(anyhow::Error),
    #[error("session has no pane attached")]
    NoPaneAttached,
    #[error("session i/o failed: {0}")]
    Io(anyhow::Error),
}

/// A terminal a presentation can be driven inside of.
#[allow(async_fn_in_trait)]
pub trait TerminalSession {
    /// Forward keystrokes to the running command.
    async fn send_keys(&mut self, keys: &str) -> Result<(), SessionError>;

    /// Drain pending output into the pane.
    async fn pump(&mut self) -> Result<(), SessionError>;

    /// Snapshot the pane, one styled string per visible row.
    fn capture_pane(&self) -> Result<Vec<String>, SessionError>;

    fn columns(&self) -> Option<u16>;

    fn rows(&self) -> Option<u16>;

    /// Anything the command wrote to stderr so far, if non-empty.
    fn stderr_output(&self) -> Option<String>;

    fn terminate(&mut self);
}

/// A live session backed by a PTY.
pub struct PtySession {
    pty: Pty,
    pane: Pane,
    stderr_file: NamedTempFile,
    buf: Vec<u8>,
    terminated: bool,
}

impl PtySession {
    /// Spawn `command` in a PTY of the given size. The command's stderr
    /// is split off to a file so diagnostics don't corrupt the pane.
    pub fn spawn(command: &str, cols: u16, rows: u16) -> Result<Self, SessionError> {
        let stderr_file = NamedTempFile::new()
            .map_err(|e| SessionError::StartFailed(e.into()))?;
        let wrapped = format!("{} 2> {}", command, stderr_file.path().display());
        let pty = Pty::spawn(&wrapped, cols, rows).map_err(SessionError::StartFailed)?;
        Ok(Self {
            pty,
            pane: Pane::new(cols, rows),
            stderr_file,
            buf: vec![0u8; 8192],
            terminated: false,
        })
    }
}

impl TerminalSession for PtySession {
    async fn send_keys(&mut self, keys: &str) -> Result<(), SessionError> {
        self.pty
            .write(keys.as_bytes())
            .await
            .map_err(SessionError::Io)
    }

    async fn pump(&mut self) -> Result<(), SessionError> {
        loop {
            match timeout(DRAIN_IDLE, self.pty.read(&mut self.buf)).await {
                Ok(Ok(0)) => break, // child side closed
                Ok(Ok(n)) => self.pane.feed(&self.buf[..n]),
                Ok(Err(e)) => return Err(SessionError::Io(e)),
                Err(_) => break, // idle
            }
        }
        Ok(())
    }

    fn capture_pane(&self) -> Result<Vec<String>, SessionError> {
        if self.terminated {
            return Err(SessionError::NoPaneAttached);
        }
        Ok(self.pane.styled_rows())
    }

    fn columns(&self) -> Option<u16> {
        Some(self.pane.columns())
    }

    fn rows(&self) -> Option<u16> {
        Some(self.pane.rows())
    }

    fn stderr_output(&self) -> Option<String> {
        let mut output = String::new();
        let mut file = self.stderr_file.reopen().ok()?;
        file.read_to_string(&mut output).ok()?;
        let trimmed = output.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    }

    fn terminate(&mut self) {
        self.pty.shutdown();
        self.terminated = true;
    }
}
