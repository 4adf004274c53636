//! Stdin metadata document.
//!
//! The presentation runner hands over one JSON document describing the
//! presentation path, its image references, and the capture script.

use serde::Deserialize;
use std::io::Read;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MetaError {
    #[error("failed to read metadata: {0}")]
    Io(#[from] std::io::Error),

    #[error("metadata is corrupted: {0}")]
    InputCorrupted(#[from] serde_json::Error),
}

/// Top-level metadata document.
#[derive(Debug, Clone, Deserialize)]
pub struct PresentationMeta {
    pub presentation_path: String,

    #[serde(default)]
    pub images: Vec<ImageMeta>,

    #[serde(default)]
    pub commands: Vec<RawCommand>,
}

/// One image reference in the presentation source.
#[derive(Debug, Clone, Deserialize)]
pub struct ImageMeta {
    /// The reference text as written in the source; this is what gets
    /// replaced during preparation.
    pub content_path: String,

    /// Filesystem path of the original image, if it has one.
    #[serde(default)]
    pub full_path: Option<String>,

    /// Base64-encoded image bytes for sources with embedded images.
    #[serde(default)]
    pub content_base64: Option<String>,

    /// 1-based line of the reference, counted after the front matter.
    pub line: usize,

    /// 1-based column of the reference.
    pub column: usize,

    /// Pre-assigned color key, if the runner already picked one.
    #[serde(default)]
    pub color_key: Option<u32>,
}

/// A capture script entry as it appears on the wire.
///
/// The schema is loose on purpose: an empty or absent type is a no-op,
/// not an error.
#[derive(Debug, Clone, Deserialize)]
pub struct RawCommand {
    #[serde(rename = "type", default)]
    pub kind: Option<String>,

    #[serde(default)]
    pub keys: Option<String>,
}

/// A capture script entry after interpretation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaptureCommand {
    /// Forward literal keystrokes to the pane.
    SendKeys(String),
    /// Give a transition time to finish.
    WaitForChange,
    /// Snapshot the visible pane.
    CaptureSnapshot,
}

impl RawCommand {
    /// Interpret the wire record, or `None` for no-ops.
    pub fn interpret(&self) -> Option<CaptureCommand> {
        match self.kind.as_deref() {
            Some("capture") => Some(CaptureCommand::CaptureSnapshot),
            Some("wait_for_change") => Some(CaptureCommand::WaitForChange),
            Some("") | None => None,
            Some(_) => self.keys.clone().map(CaptureCommand::SendKeys),
        }
    }
}

impl PresentationMeta {
    /// The capture script with no-op entries dropped.
    pub fn capture_commands(&self) -> Vec<CaptureCommand> {
        self.commands.iter().filter_map(RawCommand::interpret).collect()
    }
}

/// Read and parse the metadata document.
pub fn load(reader: &mut impl Read) -> Result<PresentationMeta, MetaError> {
    let mut raw = String::new();
    reader.read_to_string(&mut raw)?;
    Ok(serde_json::from_str(&raw)?)
}

#[cfg(test)]
#[path = "meta_tests.rs"]
mod tests;
