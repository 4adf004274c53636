//! Presentation source rewriting.
//!
//! Swapping image references for replacement paths is offset-based text
//! surgery, and replacement text rarely has the same length as the
//! reference it replaces. The source is therefore kept immutable while
//! edits are collected against it, then every edit is applied in one
//! descending-offset pass so no splice can shift an offset computed for
//! an earlier reference.

use thiserror::Error;

/// Front matter delimiter. A block opened by this marker at the very
/// start of the source and closed by its next occurrence is metadata,
/// not slide content; reference line numbers start after it.
const FRONT_MATTER_MARKER: &str = "---";

#[derive(Debug, Error)]
pub enum RewriteError {
    #[error("could not find image reference {0}")]
    ImageReferenceNotFound(String),
}

/// A single splice: replace `old_len` bytes at `offset` with `text`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edit {
    pub offset: usize,
    pub old_len: usize,
    pub text: String,
}

/// Maps (line, column) reference coordinates to byte offsets in one
/// immutable source.
pub struct SourceMap<'a> {
    source: &'a str,
    front_matter_end: usize,
    line_offsets: Vec<usize>,
}

impl<'a> SourceMap<'a> {
    pub fn new(source: &'a str) -> Self {
        let front_matter_end = front_matter_end(source);
        let line_offsets = cumulative_line_lengths(&source[front_matter_end..]);
        Self {
            source,
            front_matter_end,
            line_offsets,
        }
    }

    /// Offset at which to start searching for a reference at (line,
    /// column), both 1-based, the line counted after the front matter.
    ///
    /// Line lengths are summed without newline bytes, so the result can
    /// undershoot the real position but never overshoot it; the lookup
    /// searches forward from here.
    pub fn search_offset(&self, line: usize, column: usize) -> usize {
        let before = self
            .line_offsets
            .get(line.saturating_sub(1))
            .or(self.line_offsets.last())
            .copied()
            .unwrap_or(0);
        self.front_matter_end + before + column.saturating_sub(1)
    }

    /// Build the splice replacing the reference at (line, column) with
    /// `replacement`.
    pub fn edit(
        &self,
        reference: &str,
        line: usize,
        column: usize,
        replacement: &str,
    ) -> Result<Edit, RewriteError> {
        let start = self.search_offset(line, column);
        let offset = self
            .source
            .get(start..)
            .and_then(|tail| tail.find(reference))
            .map(|found| start + found)
            .ok_or_else(|| RewriteError::ImageReferenceNotFound(reference.to_string()))?;
        Ok(Edit {
            offset,
            old_len: reference.len(),
            text: replacement.to_string(),
        })
    }
}

/// Byte offset just past the leading front matter block, or 0 when the
/// source has none (including an unterminated block).
pub fn front_matter_end(source: &str) -> usize {
    if !source.starts_with(FRONT_MATTER_MARKER) {
        return 0;
    }
    match source[FRONT_MATTER_MARKER.len()..].find(FRONT_MATTER_MARKER) {
        Some(index) => FRONT_MATTER_MARKER.len() + index + FRONT_MATTER_MARKER.len(),
        None => 0,
    }
}

/// Byte lengths of all lines before each 0-indexed line, newlines not
/// counted.
fn cumulative_line_lengths(source: &str) -> Vec<usize> {
    let mut sum = 0;
    let mut offsets = Vec::new();
    for line in source.split('\n') {
        offsets.push(sum);
        sum += line.len();
    }
    offsets
}

/// Apply edits in one descending-offset pass.
///
/// Edits must be non-overlapping; sorting them descending makes every
/// splice leave all smaller offsets untouched.
pub fn apply_edits(source: &str, mut edits: Vec<Edit>) -> String {
    edits.sort_by(|a, b| b.offset.cmp(&a.offset));
    let mut output = source.to_string();
    for edit in edits {
        output.replace_range(edit.offset..edit.offset + edit.old_len, &edit.text);
    }
    output
}

#[cfg(test)]
#[path = "rewrite_tests.rs"]
mod tests;
