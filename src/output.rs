//! Progress and warning printing.

use std::fmt::Display;

/// Print a progress line to stdout.
pub fn print_progress(message: impl Display) {
    println!("{}", message);
}

/// Print a warning to stderr without failing the run.
pub fn print_warning(message: impl Display) {
    eprintln!("warning: {}", message);
}
