#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
use super::*;

fn pane_with(cols: u16, rows: u16, input: &str) -> Pane {
    let mut pane = Pane::new(cols, rows);
    pane.feed(input.as_bytes());
    pane
}

#[test]
fn plain_text_lands_on_first_row() {
    let pane = pane_with(20, 4, "Hello");
    let rows = pane.styled_rows();
    assert_eq!(rows.len(), 4);
    assert_eq!(rows[0], "Hello");
    assert_eq!(rows[1], "");
}

#[test]
fn cursor_positioning_places_text() {
    let pane = pane_with(20, 4, "\x1b[2;5HABC");
    let rows = pane.styled_rows();
    assert_eq!(rows[0], "");
    assert_eq!(rows[1], "    ABC");
}

#[test]
fn truecolor_background_round_trips_through_serialization() {
    let pane = pane_with(10, 2, "\x1b[48;2;255;186;211m   \x1b[0mx");
    let row = &pane.styled_rows()[0];
    assert!(row.contains("48;2;255;186;211"));

    let runs = ansi::parse_row(row);
    let colored = runs
        .iter()
        .find(|run| run.bg == Some(Rgb::new(255, 186, 211)))
        .unwrap();
    assert_eq!(colored.text, "   ");
    let plain = runs.iter().find(|run| run.text == "x").unwrap();
    assert_eq!(plain.bg, None);
}

#[test]
fn foreground_color_applies_to_following_cells() {
    let pane = pane_with(10, 2, "\x1b[38;2;1;2;3mhi\x1b[0m there");
    let row = &pane.styled_rows()[0];
    let runs = ansi::parse_row(row);
    assert_eq!(runs[0].fg, Some(Rgb::new(1, 2, 3)));
    assert_eq!(runs[0].text, "hi");
}

#[test]
fn erase_display_clears_everything() {
    let pane = pane_with(10, 3, "one\r\ntwo\r\nthree\x1b[2J");
    assert!(pane.styled_rows().iter().all(String::is_empty));
}

#[test]
fn erase_line_to_end_drops_tail() {
    let pane = pane_with(10, 2, "abcdef\x1b[1;4H\x1b[0K");
    assert_eq!(pane.styled_rows()[0], "abc");
}

#[test]
fn long_line_wraps_to_next_row() {
    let pane = pane_with(4, 3, "abcdef");
    let rows = pane.styled_rows();
    assert_eq!(rows[0], "abcd");
    assert_eq!(rows[1], "ef");
}

#[test]
fn line_feed_at_bottom_scrolls() {
    let pane = pane_with(10, 2, "one\r\ntwo\r\nthree");
    let rows = pane.styled_rows();
    assert_eq!(rows[0], "two");
    assert_eq!(rows[1], "three");
}

#[test]
fn carriage_return_overwrites_in_place() {
    let pane = pane_with(10, 2, "aaaa\rbb");
    assert_eq!(pane.styled_rows()[0], "bbaa");
}

#[test]
fn wide_glyph_occupies_two_cells() {
    let pane = pane_with(10, 2, "漢x");
    assert_eq!(pane.styled_rows()[0], "漢 x");
}

#[test]
fn geometry_is_reported() {
    let pane = Pane::new(80, 24);
    assert_eq!(pane.columns(), 80);
    assert_eq!(pane.rows(), 24);
}
