//! Snapshot-to-grid conversion.
//!
//! A captured snapshot is a newline-joined block of SGR-styled rows.
//! This flattens each one into a rectangular grid of styled runs sized
//! exactly to the capture geometry, which is what the reconstruction
//! pass walks.

use crate::ansi::{self, StyledRun};
use crate::capture::Geometry;
use crate::output;

/// One slide as a rectangle of styled runs, geometry.rows tall.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlideGrid {
    pub rows: Vec<Vec<StyledRun>>,
}

/// An empty unstyled row, the padding unit.
fn blank_row() -> Vec<StyledRun> {
    vec![StyledRun::plain(String::new())]
}

/// The trailing artifact of splitting a newline-terminated snapshot.
fn is_artifact_row(row: &[StyledRun]) -> bool {
    matches!(row, [run] if run.text.is_empty() && run.fg.is_none() && run.bg.is_none())
}

/// Parse a snapshot into a grid, padding or truncating to the capture
/// height when the row count disagrees.
pub fn to_grid(snapshot: &str, geometry: Geometry) -> SlideGrid {
    let mut rows: Vec<Vec<StyledRun>> = snapshot.split('\n').map(ansi::parse_row).collect();
    if rows.last().is_some_and(|row| is_artifact_row(row)) {
        rows.pop();
    }

    let want = geometry.rows as usize;
    if rows.len() != want {
        output::print_warning(format!(
            "snapshot has {} rows, expected {}; adjusting",
            rows.len(),
            want
        ));
        rows.resize_with(want, blank_row);
    }

    SlideGrid { rows }
}

#[cfg(test)]
#[path = "grid_tests.rs"]
mod tests;
