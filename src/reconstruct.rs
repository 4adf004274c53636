//! Image reconstruction.
//!
//! After capture, every image the registry replaced shows up in the
//! grids as runs painted with its key color. This pass swaps those runs
//! back: the first run of a key anchors the real image, every other run
//! of that key becomes blank padding underneath it, and stray key-color
//! pixels that leaked into foregrounds are recolored to the page
//! background.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::ansi::{Rgb, StyledRun};
use crate::color_key::{ColorKeyRegistry, RegistryError};
use crate::grid::SlideGrid;
use crate::layout::{self, StyleOptions};
use crate::output;

#[derive(Debug, Error)]
pub enum ReconstructError {
    #[error("presentation background color not found")]
    BackgroundColorNotFound,
    #[error(transparent)]
    Registry(#[from] RegistryError),
}

/// One positioned piece of a reconstructed row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Element {
    Text(StyledRun),
    /// An image anchored at this run's position. `pad_cols` character
    /// cells of blank padding keep the surrounding text in place while
    /// the image itself is absolutely positioned over them.
    Image {
        path: PathBuf,
        width_px: u32,
        pad_cols: usize,
    },
}

/// A slide after image reconstruction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Slide {
    pub rows: Vec<Vec<Element>>,
}

/// The fully reconstructed presentation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    pub slides: Vec<Slide>,
    pub background: Rgb,
}

/// The page background: the first background color any run carries that
/// is not a color key.
pub fn find_background_color(grids: &[SlideGrid]) -> Result<Rgb, ReconstructError> {
    grids
        .iter()
        .flat_map(|grid| grid.rows.iter())
        .flat_map(|row| row.iter())
        .filter_map(|run| run.bg)
        .find(|bg| !ColorKeyRegistry::in_key_window(*bg))
        .ok_or(ReconstructError::BackgroundColorNotFound)
}

/// Rebuild every grid into a document with real images. Inline image
/// content is materialized under `scratch_dir`.
pub fn reconstruct(
    grids: &[SlideGrid],
    registry: &ColorKeyRegistry,
    style: &StyleOptions,
    scratch_dir: &Path,
) -> Result<Document, ReconstructError> {
    let background = find_background_color(grids)?;
    let mut seen: BTreeSet<u32> = BTreeSet::new();

    let mut slides = Vec::with_capacity(grids.len());
    for grid in grids {
        let mut rows = Vec::with_capacity(grid.rows.len());
        for row in &grid.rows {
            let mut elements = Vec::with_capacity(row.len());
            for run in row {
                elements.push(reconstruct_run(
                    run, registry, style, scratch_dir, background, &mut seen,
                )?);
            }
            rows.push(elements);
        }
        slides.push(Slide { rows });
    }

    // Every assigned key must have shown up somewhere; a key that never
    // rendered means the capture missed its image.
    for asset in registry.assets() {
        if !seen.contains(&asset.key.value()) {
            return Err(RegistryError::UnknownColorKey(asset.key.rgb()).into());
        }
    }

    Ok(Document { slides, background })
}

fn reconstruct_run(
    run: &StyledRun,
    registry: &ColorKeyRegistry,
    style: &StyleOptions,
    scratch_dir: &Path,
    background: Rgb,
    seen: &mut BTreeSet<u32>,
) -> Result<Element, ReconstructError> {
    if let Some(bg) = run.bg {
        if ColorKeyRegistry::in_key_window(bg) {
            let asset = registry.resolve(bg)?;
            let pad_cols = run.text.chars().count();
            if !seen.insert(bg.to_u32()) {
                // The image continues onto another row; it was already
                // anchored at its first run.
                return Ok(Element::Text(StyledRun::plain(" ".repeat(pad_cols))));
            }
            let path = asset.materialize(scratch_dir)?;
            output::print_progress(format!(
                "restoring image {} at color {}",
                path.display(),
                bg.css()
            ));
            return Ok(Element::Image {
                path,
                width_px: layout::run_pixel_width(pad_cols, style.font_size),
                pad_cols,
            });
        }
    }

    let mut run = run.clone();
    // Anti-aliased edges can leak a key color into a foreground outside
    // any image run; paint those over with the page background.
    if run.fg.is_some_and(ColorKeyRegistry::in_key_window) {
        run.fg = Some(background);
    }
    Ok(Element::Text(run))
}

#[cfg(test)]
#[path = "reconstruct_tests.rs"]
mod tests;
