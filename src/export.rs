//! Export pipeline.
//!
//! One run end to end: rewrite the presentation source so every image
//! is a color block, run it in a PTY and capture each slide, convert
//! the captures to grids, put the real images back, and render the
//! assembled HTML to a PDF next to the source file.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};

use crate::capture;
use crate::color_key::{AssetSource, ColorKeyRegistry};
use crate::grid;
use crate::html::{self, StyleSheet};
use crate::layout::{self, StyleOptions};
use crate::meta::PresentationMeta;
use crate::output;
use crate::reconstruct;
use crate::render::{RenderEngine, WeasyPrint};
use crate::rewrite::{self, SourceMap};

pub struct ExportOptions {
    /// Persist the pre- and post-substitution HTML next to the source.
    pub emit_intermediate: bool,
    pub style: StyleOptions,
}

/// Run the whole export: `args` is the presentation command line,
/// exactly as the runner would invoke it.
pub async fn run(args: &[String], meta: &PresentationMeta, options: &ExportOptions) -> Result<()> {
    let scratch = tempfile::tempdir().context("failed to create scratch directory")?;
    output::print_progress(format!(
        "writing temporary files into {}",
        scratch.path().display()
    ));

    let source_path = PathBuf::from(&meta.presentation_path);
    let source = std::fs::read_to_string(&source_path)
        .with_context(|| format!("failed to read {}", source_path.display()))?;

    let mut registry = ColorKeyRegistry::new();
    let prepared = prepare_images(&source, meta, &mut registry, scratch.path())?;
    let prepared_path = scratch.path().join(
        source_path
            .file_name()
            .unwrap_or_else(|| std::ffi::OsStr::new("presentation.md")),
    );
    std::fs::write(&prepared_path, &prepared)
        .with_context(|| format!("failed to write {}", prepared_path.display()))?;

    let command = build_command(args, &meta.presentation_path, &prepared_path);
    output::print_progress(format!("running {command}"));
    let deck = capture::capture_slides(&command, &meta.capture_commands()).await?;

    output::print_progress("converting slides to html");
    let grids: Vec<_> = deck
        .snapshots
        .iter()
        .map(|snapshot| grid::to_grid(snapshot, deck.geometry))
        .collect();
    if options.emit_intermediate {
        persist(&source_path, "pre.html", &html::grids_html(&grids))?;
    }

    output::print_progress("replacing images");
    let document = reconstruct::reconstruct(&grids, &registry, &options.style, scratch.path())?;
    let body = html::document_html(&document);
    if options.emit_intermediate {
        persist(&source_path, "final.html", &body)?;
    }

    output::print_progress("generating pdf");
    let sheet = StyleSheet {
        page: layout::page_box(deck.geometry, options.style),
        background: document.background,
        font_size: options.style.font_size,
        line_height: options.style.line_height,
    };
    let pdf = WeasyPrint::default().render(&body, &sheet).await?;

    let pdf_path = source_path.with_extension("pdf");
    std::fs::write(&pdf_path, pdf)
        .with_context(|| format!("failed to write {}", pdf_path.display()))?;
    output::print_progress(format!("pdf generation finished, output is at {}", pdf_path.display()));
    Ok(())
}

/// Assign a color key to every image reference and rewrite the source
/// so each reference points at its solid replacement block.
fn prepare_images(
    source: &str,
    meta: &PresentationMeta,
    registry: &mut ColorKeyRegistry,
    scratch: &Path,
) -> Result<String> {
    let map = SourceMap::new(source);
    let mut images = meta.images.clone();
    // Bottom-to-top so key assignment order matches reference order in
    // descending application.
    images.sort_by(|a, b| (b.line, b.column).cmp(&(a.line, a.column)));

    let mut edits = Vec::with_capacity(images.len());
    for image in &images {
        let asset_source = match (&image.full_path, &image.content_base64) {
            (Some(path), _) => AssetSource::Path(PathBuf::from(path)),
            (None, Some(content)) => AssetSource::inline_from_base64(content)?,
            (None, None) => bail!(
                "image {} has neither a path nor inline content",
                image.content_path
            ),
        };
        let key = match image.color_key {
            Some(value) => registry.assign_fixed(value, asset_source),
            None => registry.assign(asset_source),
        };
        let replacement = registry.write_replacement(key, scratch)?;
        output::print_progress(format!(
            "assigning color {} to image {}",
            key.rgb().css(),
            image.content_path
        ));
        edits.push(map.edit(
            &image.content_path,
            image.line,
            image.column,
            &replacement.display().to_string(),
        )?);
    }
    Ok(rewrite::apply_edits(source, edits))
}

/// The shell command for the capture session, with the original
/// presentation path swapped for the prepared copy.
fn build_command(args: &[String], original: &str, prepared: &Path) -> String {
    args.iter()
        .map(|arg| {
            if arg == original {
                format!("'{}'", prepared.display())
            } else {
                format!("'{arg}'")
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn persist(source_path: &Path, extension: &str, contents: &str) -> Result<()> {
    let path = source_path.with_extension(extension);
    std::fs::write(&path, contents)
        .with_context(|| format!("failed to write {}", path.display()))?;
    output::print_progress(format!("wrote intermediate file {}", path.display()));
    Ok(())
}

#[cfg(test)]
#[path = "export_tests.rs"]
mod tests;
