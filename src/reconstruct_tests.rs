#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
use super::*;
use tempfile::TempDir;

use crate::color_key::{AssetSource, BASE_COLOR};

const THEME_BG: Rgb = Rgb {
    r: 30,
    g: 30,
    b: 46,
};

fn themed(text: &str) -> StyledRun {
    StyledRun {
        text: text.into(),
        fg: None,
        bg: Some(THEME_BG),
    }
}

fn key_run(key: u32, cols: usize) -> StyledRun {
    StyledRun {
        text: " ".repeat(cols),
        fg: Some(Rgb::from_u32(key)),
        bg: Some(Rgb::from_u32(key)),
    }
}

fn grid_of(rows: Vec<Vec<StyledRun>>) -> SlideGrid {
    SlideGrid { rows }
}

fn style() -> StyleOptions {
    StyleOptions::default()
}

#[test]
fn background_is_first_non_key_background() {
    let grids = [grid_of(vec![
        vec![StyledRun::plain("no colors here")],
        vec![key_run(BASE_COLOR, 4), themed("text")],
    ])];
    assert_eq!(find_background_color(&grids).unwrap(), THEME_BG);
}

#[test]
fn all_plain_grids_have_no_background() {
    let grids = [grid_of(vec![vec![StyledRun::plain("plain")]])];
    let err = find_background_color(&grids).unwrap_err();
    assert!(matches!(err, ReconstructError::BackgroundColorNotFound));
}

#[test]
fn key_run_becomes_an_image_element() {
    let dir = TempDir::new().unwrap();
    let mut registry = ColorKeyRegistry::new();
    let key = registry.assign(AssetSource::Inline(vec![1, 2, 3]));

    let grids = [grid_of(vec![vec![
        themed(""),
        key_run(key.value(), 10),
    ]])];
    let document = reconstruct(&grids, &registry, &style(), dir.path()).unwrap();

    match &document.slides[0].rows[0][1] {
        Element::Image {
            width_px, pad_cols, ..
        } => {
            // 10 chars at font size 10: ceil(10 * 10 * 0.605)
            assert_eq!(*width_px, 61);
            assert_eq!(*pad_cols, 10);
        }
        other => panic!("expected image, got {other:?}"),
    }
    assert_eq!(document.background, THEME_BG);
}

#[test]
fn later_rows_of_an_image_become_padding() {
    let dir = TempDir::new().unwrap();
    let mut registry = ColorKeyRegistry::new();
    let key = registry.assign(AssetSource::Inline(vec![0]));

    let grids = [grid_of(vec![
        vec![themed("bg")],
        vec![key_run(key.value(), 6)],
        vec![key_run(key.value(), 6)],
    ])];
    let document = reconstruct(&grids, &registry, &style(), dir.path()).unwrap();

    assert!(matches!(
        document.slides[0].rows[1][0],
        Element::Image { .. }
    ));
    assert_eq!(
        document.slides[0].rows[2][0],
        Element::Text(StyledRun::plain("      "))
    );
}

#[test]
fn leaked_key_foreground_is_recolored_to_background() {
    let dir = TempDir::new().unwrap();
    let registry = ColorKeyRegistry::new();

    let leak = StyledRun {
        text: "▄▄".into(),
        fg: Some(Rgb::from_u32(BASE_COLOR + 9)),
        bg: Some(THEME_BG),
    };
    let grids = [grid_of(vec![vec![themed("x"), leak]])];
    let document = reconstruct(&grids, &registry, &style(), dir.path()).unwrap();

    match &document.slides[0].rows[0][1] {
        Element::Text(run) => assert_eq!(run.fg, Some(THEME_BG)),
        other => panic!("expected text, got {other:?}"),
    }
}

#[test]
fn key_background_without_assignment_is_unknown() {
    let dir = TempDir::new().unwrap();
    let registry = ColorKeyRegistry::new();

    let grids = [grid_of(vec![vec![
        themed("x"),
        key_run(BASE_COLOR + 2, 3),
    ]])];
    let err = reconstruct(&grids, &registry, &style(), dir.path()).unwrap_err();
    assert!(matches!(
        err,
        ReconstructError::Registry(RegistryError::UnknownColorKey(_))
    ));
}

#[test]
fn assigned_key_missing_from_every_grid_is_unknown() {
    let dir = TempDir::new().unwrap();
    let mut registry = ColorKeyRegistry::new();
    registry.assign(AssetSource::Inline(vec![7]));

    let grids = [grid_of(vec![vec![themed("no image anywhere")]])];
    let err = reconstruct(&grids, &registry, &style(), dir.path()).unwrap_err();
    assert!(matches!(
        err,
        ReconstructError::Registry(RegistryError::UnknownColorKey(_))
    ));
}

#[test]
fn theme_colors_outside_the_window_pass_through() {
    let dir = TempDir::new().unwrap();
    let registry = ColorKeyRegistry::new();

    let styled = StyledRun {
        text: "keyword".into(),
        fg: Some(Rgb::new(137, 180, 250)),
        bg: Some(THEME_BG),
    };
    let grids = [grid_of(vec![vec![styled.clone()]])];
    let document = reconstruct(&grids, &registry, &style(), dir.path()).unwrap();
    assert_eq!(document.slides[0].rows[0][0], Element::Text(styled));
}
