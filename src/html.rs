//! HTML assembly.
//!
//! The reconstructed document becomes one `<pre>` block per slide, one
//! `.content-line` div per terminal row, one inline-styled span per
//! run. The stylesheet pins every dimension in pixels so the renderer
//! reproduces the terminal grid exactly.

use std::fmt::Write as _;

use crate::ansi::{Rgb, StyledRun};
use crate::grid::SlideGrid;
use crate::layout::PageBox;
use crate::reconstruct::{Document, Element};

/// Everything the stylesheet needs to pin the page geometry.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StyleSheet {
    pub page: PageBox,
    pub background: Rgb,
    pub font_size: u32,
    pub line_height: u32,
}

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(ch),
        }
    }
    out
}

fn run_span(run: &StyledRun) -> String {
    let mut styles = String::new();
    if let Some(fg) = run.fg {
        let _ = write!(styles, "color: {};", fg.css());
    }
    if let Some(bg) = run.bg {
        let _ = write!(styles, " background-color: {};", bg.css());
    }
    if styles.is_empty() {
        format!("<span>{}</span>", escape(&run.text))
    } else {
        format!(
            "<span style=\"{}\">{}</span>",
            styles.trim_start(),
            escape(&run.text)
        )
    }
}

fn element_html(element: &Element) -> String {
    match element {
        Element::Text(run) => run_span(run),
        Element::Image {
            path,
            width_px,
            pad_cols,
        } => format!(
            "<img width=\"{}\" src=\"file://{}\" style=\"position: absolute\" /><span>{}</span>",
            width_px,
            path.display(),
            " ".repeat(*pad_cols)
        ),
    }
}

fn rows_html<R>(out: &mut String, rows: &[R], mut row_html: impl FnMut(&R) -> String) {
    out.push_str("<pre>");
    for row in rows {
        let _ = writeln!(out, "<div class=\"content-line\">{}</div>", row_html(row));
    }
    out.push_str("</pre>\n");
}

/// The final document body: every slide in capture order.
pub fn document_html(document: &Document) -> String {
    let mut out = String::from("<html>\n<body>\n");
    for slide in &document.slides {
        rows_html(&mut out, &slide.rows, |row| {
            row.iter().map(element_html).collect()
        });
    }
    out.push_str("</body>\n</html>\n");
    out
}

/// Pre-substitution form of the grids, for intermediate output.
pub fn grids_html(grids: &[SlideGrid]) -> String {
    let mut out = String::from("<html>\n<body>\n");
    for grid in grids {
        rows_html(&mut out, &grid.rows, |row| {
            row.iter().map(run_span).collect()
        });
    }
    out.push_str("</body>\n</html>\n");
    out
}

/// The pixel-pinned stylesheet for the rendered document.
pub fn stylesheet_css(sheet: &StyleSheet) -> String {
    format!(
        "\
pre {{
    margin: 0;
}}

span {{
    display: inline-block;
}}

body {{
    margin: 0;
    font-size: {font_size}px;
    background-color: {background};
    width: {width}px;
}}

.content-line {{
    display: inline-block;
    line-height: {line_height}px;
    margin: 0px;
    width: {width}px;
}}

@page {{
    margin: 0;
    height: {height}px;
    width: {width}px;
}}
",
        font_size = sheet.font_size,
        line_height = sheet.line_height,
        background = sheet.background.css(),
        width = sheet.page.width,
        height = sheet.page.height,
    )
}

#[cfg(test)]
#[path = "html_tests.rs"]
mod tests;
