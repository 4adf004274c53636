//! Page and glyph sizing.
//!
//! The document geometry is a pure function of the captured terminal
//! geometry: one terminal cell maps to exactly one rendered cell, one
//! terminal row to exactly one rendered line. The renderer must receive
//! these values unchanged or rows reflow and the transcription is no
//! longer faithful.

use crate::capture::Geometry;

/// Multiplier that converts a font size in pixels to a glyph width.
///
/// There is probably something somewhere that specifies what the real
/// relationship is, but this value was found by trial and error against
/// the reference renderer. Treat it as opaque; the point is visual
/// fidelity, not typography.
pub const FONT_SIZE_WIDTH: f64 = 0.605;

/// Font metrics for the rendered document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StyleOptions {
    /// Font size in pixels.
    pub font_size: u32,
    /// Line height in pixels.
    pub line_height: u32,
}

impl Default for StyleOptions {
    fn default() -> Self {
        Self {
            font_size: 10,
            line_height: 12,
        }
    }
}

/// Pixel dimensions of one page.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageBox {
    pub width: f64,
    pub height: f64,
}

/// Pixel width of one terminal cell at the given font size.
pub fn char_pixel_width(font_size: u32) -> f64 {
    font_size as f64 * FONT_SIZE_WIDTH
}

/// Page box for a full terminal grid.
pub fn page_box(geometry: Geometry, style: StyleOptions) -> PageBox {
    PageBox {
        width: geometry.columns as f64 * char_pixel_width(style.font_size),
        height: geometry.rows as f64 * style.line_height as f64,
    }
}

/// Pixel width of a run spanning `chars` terminal cells, rounded up.
pub fn run_pixel_width(chars: usize, font_size: u32) -> u32 {
    (chars as f64 * char_pixel_width(font_size)).ceil() as u32
}

#[cfg(test)]
#[path = "layout_tests.rs"]
mod tests;
