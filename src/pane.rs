//! Virtual terminal pane.
//!
//! Raw PTY bytes are fed through a vte parser into a cell grid tracking
//! the colors of everything on screen. Snapshots come back out as one
//! SGR-styled string per visible row, which is the wire form the grid
//! converter consumes.

use unicode_width::UnicodeWidthChar;
use vte::{Params, Parser, Perform};

use crate::ansi::{self, Rgb};

/// One grid cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Cell {
    ch: char,
    fg: Option<Rgb>,
    bg: Option<Rgb>,
}

impl Default for Cell {
    fn default() -> Self {
        Self {
            ch: ' ',
            fg: None,
            bg: None,
        }
    }
}

/// A terminal pane with a fixed-size cell grid.
pub struct Pane {
    parser: Parser,
    screen: Screen,
}

impl Pane {
    pub fn new(cols: u16, rows: u16) -> Self {
        Self {
            parser: Parser::new(),
            screen: Screen::new(cols as usize, rows as usize),
        }
    }

    /// Feed raw terminal output through the parser.
    pub fn feed(&mut self, data: &[u8]) {
        self.parser.advance(&mut self.screen, data);
    }

    pub fn columns(&self) -> u16 {
        self.screen.cols as u16
    }

    pub fn rows(&self) -> u16 {
        self.screen.rows as u16
    }

    /// Serialize every visible row with its styling. Trailing unstyled
    /// blanks are trimmed, matching what terminal capture backends emit.
    pub fn styled_rows(&self) -> Vec<String> {
        self.screen.cells.iter().map(|row| serialize_row(row)).collect()
    }
}

fn serialize_row(cells: &[Cell]) -> String {
    let end = cells
        .iter()
        .rposition(|cell| cell.ch != ' ' || cell.fg.is_some() || cell.bg.is_some())
        .map_or(0, |index| index + 1);

    let mut out = String::new();
    let mut current = (None, None);
    for cell in &cells[..end] {
        let style = (cell.fg, cell.bg);
        if style != current {
            out.push_str("\x1b[0m");
            if let Some(fg) = cell.fg {
                out.push_str(&format!("\x1b[38;2;{};{};{}m", fg.r, fg.g, fg.b));
            }
            if let Some(bg) = cell.bg {
                out.push_str(&format!("\x1b[48;2;{};{};{}m", bg.r, bg.g, bg.b));
            }
            current = style;
        }
        out.push(cell.ch);
    }
    if current != (None, None) {
        out.push_str("\x1b[0m");
    }
    out
}

/// Grid state driven by the vte parser.
struct Screen {
    cols: usize,
    rows: usize,
    cells: Vec<Vec<Cell>>,
    row: usize,
    col: usize,
    fg: Option<Rgb>,
    bg: Option<Rgb>,
}

impl Screen {
    fn new(cols: usize, rows: usize) -> Self {
        Self {
            cols: cols.max(1),
            rows: rows.max(1),
            cells: vec![vec![Cell::default(); cols.max(1)]; rows.max(1)],
            row: 0,
            col: 0,
            fg: None,
            bg: None,
        }
    }

    fn put_char(&mut self, ch: char) {
        if self.col >= self.cols {
            self.wrap();
        }
        self.cells[self.row][self.col] = Cell {
            ch,
            fg: self.fg,
            bg: self.bg,
        };
        self.col += 1;
    }

    fn wrap(&mut self) {
        self.col = 0;
        if self.row + 1 >= self.rows {
            self.scroll_up();
        } else {
            self.row += 1;
        }
    }

    fn scroll_up(&mut self) {
        self.cells.remove(0);
        self.cells.push(vec![Cell::default(); self.cols]);
    }

    fn line_feed(&mut self) {
        if self.row + 1 >= self.rows {
            self.scroll_up();
        } else {
            self.row += 1;
        }
    }

    fn clear_cell_range(&mut self, row: usize, from: usize, to: usize) {
        for col in from..to.min(self.cols) {
            self.cells[row][col] = Cell::default();
        }
    }

    fn clear_rows(&mut self, from: usize, to: usize) {
        for row in from..to.min(self.rows) {
            self.clear_cell_range(row, 0, self.cols);
        }
    }

    /// CSI J
    fn erase_display(&mut self, mode: u16) {
        match mode {
            0 => {
                self.clear_cell_range(self.row, self.col, self.cols);
                self.clear_rows(self.row + 1, self.rows);
            }
            1 => {
                self.clear_rows(0, self.row);
                self.clear_cell_range(self.row, 0, (self.col + 1).min(self.cols));
            }
            _ => self.clear_rows(0, self.rows),
        }
    }

    /// CSI K
    fn erase_line(&mut self, mode: u16) {
        match mode {
            0 => self.clear_cell_range(self.row, self.col, self.cols),
            1 => self.clear_cell_range(self.row, 0, (self.col + 1).min(self.cols)),
            _ => self.clear_cell_range(self.row, 0, self.cols),
        }
    }
}

impl Perform for Screen {
    fn print(&mut self, ch: char) {
        match ch.width().unwrap_or(1) {
            0 => {}
            2 => {
                // Wide glyph: left half carries the char, right half is a
                // zero-width filler cell with the same colors.
                if self.col + 1 >= self.cols {
                    self.wrap();
                }
                self.put_char(ch);
                if self.col < self.cols {
                    self.cells[self.row][self.col] = Cell {
                        ch: ' ',
                        fg: self.fg,
                        bg: self.bg,
                    };
                    self.col += 1;
                }
            }
            _ => self.put_char(ch),
        }
    }

    fn execute(&mut self, byte: u8) {
        match byte {
            b'\n' => self.line_feed(),
            b'\r' => self.col = 0,
            0x08 => self.col = self.col.saturating_sub(1),
            b'\t' => self.col = (((self.col / 8) + 1) * 8).min(self.cols - 1),
            _ => {}
        }
    }

    fn hook(&mut self, _params: &Params, _intermediates: &[u8], _ignore: bool, _action: char) {}

    fn put(&mut self, _byte: u8) {}

    fn unhook(&mut self) {}

    fn osc_dispatch(&mut self, _params: &[&[u8]], _bell_terminated: bool) {}

    fn csi_dispatch(&mut self, params: &Params, intermediates: &[u8], _ignore: bool, action: char) {
        // Private modes (alternate screen, cursor visibility, ...) don't
        // affect the captured cell contents.
        if !intermediates.is_empty() {
            return;
        }

        let list: Vec<u16> = params.iter().map(|p| p[0]).collect();
        let arg = |index: usize, default: u16| -> u16 {
            match list.get(index) {
                Some(&0) | None => default,
                Some(&value) => value,
            }
        };

        match action {
            'H' | 'f' => {
                self.row = (arg(0, 1) as usize - 1).min(self.rows - 1);
                self.col = (arg(1, 1) as usize - 1).min(self.cols - 1);
            }
            'A' => self.row = self.row.saturating_sub(arg(0, 1) as usize),
            'B' => self.row = (self.row + arg(0, 1) as usize).min(self.rows - 1),
            'C' => self.col = (self.col + arg(0, 1) as usize).min(self.cols - 1),
            'D' => self.col = self.col.saturating_sub(arg(0, 1) as usize),
            'G' => self.col = (arg(0, 1) as usize - 1).min(self.cols - 1),
            'd' => self.row = (arg(0, 1) as usize - 1).min(self.rows - 1),
            'J' => self.erase_display(list.first().copied().unwrap_or(0)),
            'K' => self.erase_line(list.first().copied().unwrap_or(0)),
            'm' => {
                let params = if list.is_empty() { vec![0] } else { list };
                ansi::apply_sgr(&params, &mut self.fg, &mut self.bg);
            }
            _ => {}
        }
    }

    fn esc_dispatch(&mut self, _intermediates: &[u8], _ignore: bool, _byte: u8) {}
}

#[cfg(test)]
#[path = "pane_tests.rs"]
mod tests;
