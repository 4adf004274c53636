//! ANSI SGR parsing.
//!
//! Turns one row of captured terminal output into a sequence of styled
//! text runs. Only SGR (`ESC [ ... m`) sequences carry meaning at this
//! point; cursor movement and erasure have already been resolved by the
//! virtual terminal before a row reaches this parser.

use regex::Regex;
use std::sync::LazyLock;

/// Regex for SGR escape sequences: ESC [ followed by semicolon-separated
/// numbers, ending with 'm'.
static SGR_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    // SAFETY: this regex pattern is a compile-time constant and is guaranteed to be valid
    #[allow(clippy::expect_used)]
    Regex::new(r"\x1b\[([0-9;]*)m").expect("SGR regex pattern is invalid")
});

/// A 24-bit color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Pack into a 24-bit integer, 0xRRGGBB.
    pub fn to_u32(self) -> u32 {
        (self.r as u32) << 16 | (self.g as u32) << 8 | self.b as u32
    }

    pub fn from_u32(value: u32) -> Self {
        Self {
            r: (value >> 16) as u8,
            g: (value >> 8) as u8,
            b: value as u8,
        }
    }

    /// CSS hex form, e.g. `#ffbad3`.
    pub fn css(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

/// A stretch of row text sharing one foreground/background pair.
///
/// Concatenating `text` across a row's runs reconstructs the row's
/// visible characters.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StyledRun {
    pub text: String,
    pub fg: Option<Rgb>,
    pub bg: Option<Rgb>,
}

impl StyledRun {
    pub fn plain(text: impl Into<String>) -> Self {
        StyledRun {
            text: text.into(),
            fg: None,
            bg: None,
        }
    }
}

/// Parse one row of SGR-styled text into runs.
///
/// Color state accumulates left to right and resets clear it. An empty
/// row parses to a single empty run so callers can tell a blank row
/// apart from a missing one.
pub fn parse_row(row: &str) -> Vec<StyledRun> {
    let mut runs = Vec::new();
    let mut fg = None;
    let mut bg = None;
    let mut last_end = 0;

    for cap in SGR_REGEX.captures_iter(row) {
        let Some(full) = cap.get(0) else {
            continue;
        };
        let params = cap.get(1).map(|m| m.as_str()).unwrap_or("");

        let text = &row[last_end..full.start()];
        if !text.is_empty() {
            runs.push(StyledRun {
                text: text.to_string(),
                fg,
                bg,
            });
        }

        apply_sgr(&parse_params(params), &mut fg, &mut bg);
        last_end = full.end();
    }

    let rest = &row[last_end..];
    if !rest.is_empty() || runs.is_empty() {
        runs.push(StyledRun {
            text: rest.to_string(),
            fg,
            bg,
        });
    }

    runs
}

fn parse_params(params: &str) -> Vec<u16> {
    if params.is_empty() {
        // Bare ESC[m is a reset
        return vec![0];
    }
    params
        .split(';')
        .map(|p| p.parse().unwrap_or(0))
        .collect()
}

/// Apply a flat SGR parameter list to the current color state.
///
/// Non-color attributes (bold, dim, inverse, ...) are ignored: the page
/// reconstruction only cares about foreground and background colors.
pub fn apply_sgr(params: &[u16], fg: &mut Option<Rgb>, bg: &mut Option<Rgb>) {
    let mut i = 0;
    while i < params.len() {
        match params[i] {
            0 => {
                *fg = None;
                *bg = None;
            }
            30..=37 => *fg = Some(indexed_to_rgb((params[i] - 30) as u8)),
            90..=97 => *fg = Some(indexed_to_rgb((params[i] - 90 + 8) as u8)),
            40..=47 => *bg = Some(indexed_to_rgb((params[i] - 40) as u8)),
            100..=107 => *bg = Some(indexed_to_rgb((params[i] - 100 + 8) as u8)),
            39 => *fg = None,
            49 => *bg = None,
            38 | 48 => {
                let target = if params[i] == 38 { &mut *fg } else { &mut *bg };
                match params.get(i + 1) {
                    Some(&2) if i + 4 < params.len() => {
                        *target = Some(Rgb::new(
                            params[i + 2] as u8,
                            params[i + 3] as u8,
                            params[i + 4] as u8,
                        ));
                        i += 4;
                    }
                    Some(&5) if i + 2 < params.len() => {
                        *target = Some(indexed_to_rgb(params[i + 2] as u8));
                        i += 2;
                    }
                    // Truncated extended color; drop the rest of the sequence
                    _ => return,
                }
            }
            _ => {}
        }
        i += 1;
    }
}

/// Map an xterm 256-color index to RGB.
pub fn indexed_to_rgb(index: u8) -> Rgb {
    const BASIC: [(u8, u8, u8); 16] = [
        (0, 0, 0),
        (205, 49, 49),
        (13, 188, 121),
        (229, 229, 16),
        (36, 114, 200),
        (188, 63, 188),
        (17, 168, 205),
        (229, 229, 229),
        (102, 102, 102),
        (241, 76, 76),
        (35, 209, 139),
        (245, 245, 67),
        (59, 142, 234),
        (214, 112, 214),
        (41, 184, 219),
        (255, 255, 255),
    ];
    const CUBE: [u8; 6] = [0, 95, 135, 175, 215, 255];

    match index {
        0..=15 => {
            let (r, g, b) = BASIC[index as usize];
            Rgb::new(r, g, b)
        }
        16..=231 => {
            let v = index - 16;
            Rgb::new(
                CUBE[(v / 36) as usize],
                CUBE[((v % 36) / 6) as usize],
                CUBE[(v % 6) as usize],
            )
        }
        _ => {
            let level = 8 + 10 * (index - 232);
            Rgb::new(level, level, level)
        }
    }
}

#[cfg(test)]
#[path = "ansi_tests.rs"]
mod tests;
