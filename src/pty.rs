//! PTY (pseudo-terminal) handling.
//!
//! Creates a PTY pair, spawns the target command under `/bin/sh`, and
//! provides async read/write on the master side.

use std::ffi::CString;
use std::os::fd::{AsFd, AsRawFd, FromRawFd, IntoRawFd, OwnedFd};

use anyhow::Result;
use nix::errno::Errno;
use nix::fcntl::{fcntl, FcntlArg, OFlag};
use nix::pty::{forkpty, Winsize};
use nix::sys::signal::{signal, SigHandler, Signal};
use nix::sys::wait::{waitpid, WaitPidFlag};
use nix::unistd::{ForkResult, Pid};
use tokio::io::unix::AsyncFd;

/// A running PTY with a child process attached.
pub struct Pty {
    master_fd: AsyncFd<OwnedFd>,
    child_pid: Pid,
}

impl Pty {
    /// Spawn `command` under `/bin/sh -c` in a new PTY of the given size.
    pub fn spawn(command: &str, cols: u16, rows: u16) -> Result<Self> {
        let winsize = Winsize {
            ws_row: rows,
            ws_col: cols,
            ws_xpixel: 0,
            ws_ypixel: 0,
        };

        // SAFETY: forkpty creates a new PTY and forks. The child execs
        // immediately, so no shared state survives the fork.
        let result = unsafe { forkpty(&winsize, None)? };

        match result.fork_result {
            ForkResult::Child => {
                // SAFETY: restoring SIGPIPE to default is safe in the child
                // before exec; the child has no other threads at this point.
                unsafe { signal(Signal::SIGPIPE, SigHandler::SigDfl).ok() };
                // The presentation runner draws with truecolor SGR; make
                // sure it believes the terminal supports it.
                std::env::set_var("TERM", "xterm-256color");
                std::env::set_var("COLORTERM", "truecolor");

                let shell = CString::new("/bin/sh").unwrap();
                let args = [
                    CString::new("/bin/sh").unwrap(),
                    CString::new("-c").unwrap(),
                    CString::new(command).unwrap(),
                ];
                nix::unistd::execvp(&shell, &args)?;
                unreachable!()
            }
            ForkResult::Parent { child } => {
                let master = result.master;
                set_non_blocking(&master)?;

                // SAFETY: we own the master fd from forkpty and transfer
                // ownership to OwnedFd; it is not used elsewhere after this.
                let owned: OwnedFd = unsafe { OwnedFd::from_raw_fd(master.into_raw_fd()) };
                let async_fd = AsyncFd::new(owned)?;

                Ok(Self {
                    master_fd: async_fd,
                    child_pid: child,
                })
            }
        }
    }

    /// Read output from the PTY.
    pub async fn read(&self, buf: &mut [u8]) -> Result<usize> {
        loop {
            let mut guard = self.master_fd.readable().await?;
            match read_nonblocking(self.master_fd.get_ref(), buf)? {
                Some(n) => return Ok(n),
                None => guard.clear_ready(),
            }
        }
    }

    /// Write input to the PTY (sends to the child's stdin).
    pub async fn write(&self, data: &[u8]) -> Result<()> {
        let mut written = 0;
        while written < data.len() {
            let mut guard = self.master_fd.writable().await?;
            match write_nonblocking(self.master_fd.get_ref(), &data[written..])? {
                Some(n) => written += n,
                None => guard.clear_ready(),
            }
        }
        Ok(())
    }

    /// Kill the child and reap it without blocking. Best effort; callers
    /// tearing a session down ignore the result.
    pub fn shutdown(&self) {
        let _ = nix::sys::signal::kill(self.child_pid, Signal::SIGHUP);
        let _ = nix::sys::signal::kill(self.child_pid, Signal::SIGKILL);
        let _ = waitpid(self.child_pid, Some(WaitPidFlag::WNOHANG));
    }
}

fn set_non_blocking<F: AsRawFd>(fd: &F) -> nix::Result<()> {
    let flags = fcntl(fd.as_raw_fd(), FcntlArg::F_GETFL)?;
    let flags = OFlag::from_bits_truncate(flags) | OFlag::O_NONBLOCK;
    fcntl(fd.as_raw_fd(), FcntlArg::F_SETFL(flags))?;
    Ok(())
}

/// Read, handling EAGAIN. Returns None if the read would block.
fn read_nonblocking<F: AsRawFd>(fd: &F, buf: &mut [u8]) -> nix::Result<Option<usize>> {
    match nix::unistd::read(fd.as_raw_fd(), buf) {
        Ok(n) => Ok(Some(n)),
        Err(Errno::EAGAIN) => Ok(None),
        Err(Errno::EIO) => Ok(Some(0)), // PTY closed
        Err(e) => Err(e),
    }
}

/// Write, handling EAGAIN. Returns None if the write would block.
fn write_nonblocking<F: AsFd>(fd: &F, buf: &[u8]) -> nix::Result<Option<usize>> {
    match nix::unistd::write(fd, buf) {
        Ok(n) => Ok(Some(n)),
        Err(Errno::EAGAIN) => Ok(None),
        Err(e) => Err(e),
    }
}
