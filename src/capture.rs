//! Capture driver.
//!
//! Runs the capture script against a terminal session: forwards
//! keystrokes, waits out render settles, and snapshots the pane after
//! each slide transition. The session is always torn down, whether the
//! script succeeded or not.

use thiserror::Error;
use tokio::time::{sleep, Duration};

use crate::meta::CaptureCommand;
use crate::output;
use crate::session::{PtySession, SessionError, TerminalSession};

/// Settle time after spawning before the first command runs.
const STARTUP_SETTLE: Duration = Duration::from_millis(1000);
/// Settle time for a wait-for-change step.
const CHANGE_SETTLE: Duration = Duration::from_millis(500);

/// Terminal dimensions in character cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Geometry {
    pub columns: u16,
    pub rows: u16,
}

/// Everything a capture run produced: one snapshot per slide, plus the
/// geometry they were rendered at.
#[derive(Debug)]
pub struct CapturedDeck {
    pub snapshots: Vec<String>,
    pub geometry: Geometry,
}

#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("failed to start capture session: {0}")]
    SessionStartFailed(String),
    #[error("could not determine terminal geometry")]
    GeometryUnavailable,
    #[error("presentation command reported errors:\n{0}")]
    TargetProcessError(String),
    #[error("no slides were captured")]
    NoSlidesCaptured,
    #[error(transparent)]
    Session(#[from] SessionError),
}

/// Run the presentation command in a PTY sized like the invoking
/// terminal and capture every slide the script visits.
pub async fn capture_slides(
    command: &str,
    commands: &[CaptureCommand],
) -> Result<CapturedDeck, CaptureError> {
    let (columns, rows) =
        crossterm::terminal::size().map_err(|_| CaptureError::GeometryUnavailable)?;
    let mut session = PtySession::spawn(command, columns, rows)
        .map_err(|e| CaptureError::SessionStartFailed(e.to_string()))?;
    run_script(&mut session, commands).await
}

/// Drive the script to completion and tear the session down afterwards.
pub async fn run_script<S: TerminalSession>(
    session: &mut S,
    commands: &[CaptureCommand],
) -> Result<CapturedDeck, CaptureError> {
    let result = drive(session, commands).await;
    session.terminate();
    result
}

async fn drive<S: TerminalSession>(
    session: &mut S,
    commands: &[CaptureCommand],
) -> Result<CapturedDeck, CaptureError> {
    let geometry = match (session.columns(), session.rows()) {
        (Some(columns), Some(rows)) => Geometry { columns, rows },
        _ => return Err(CaptureError::GeometryUnavailable),
    };

    sleep(STARTUP_SETTLE).await;

    let mut snapshots: Vec<String> = Vec::new();
    for command in commands {
        session.pump().await?;
        match command {
            CaptureCommand::SendKeys(keys) => session.send_keys(keys).await?,
            CaptureCommand::WaitForChange => sleep(CHANGE_SETTLE).await,
            CaptureCommand::CaptureSnapshot => {
                let mut rows = session.capture_pane()?;
                // Some backends drop a trailing blank row from the
                // snapshot; restore it so every snapshot spans the full
                // pane height.
                if rows.len() + 1 == geometry.rows as usize {
                    rows.push(String::new());
                }
                snapshots.push(rows.join("\n") + "\n");
                output::print_progress(format!("captured slide {}", snapshots.len()));
            }
        }
    }
    session.pump().await?;

    if let Some(stderr) = session.stderr_output() {
        return Err(CaptureError::TargetProcessError(stderr));
    }
    if snapshots.is_empty() {
        return Err(CaptureError::NoSlidesCaptured);
    }
    Ok(CapturedDeck {
        snapshots,
        geometry,
    })
}

#[cfg(test)]
#[path = "capture_tests.rs"]
mod tests;
