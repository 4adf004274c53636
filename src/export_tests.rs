#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
use super::*;
use tempfile::TempDir;

use crate::color_key::BASE_COLOR;
use crate::meta::ImageMeta;

fn write_png(dir: &Path, name: &str, width: u32, height: u32) -> PathBuf {
    let path = dir.join(name);
    image::RgbImage::from_pixel(width, height, image::Rgb([1, 2, 3]))
        .save(&path)
        .unwrap();
    path
}

fn image_meta(content_path: &str, full_path: Option<PathBuf>, line: usize, column: usize) -> ImageMeta {
    ImageMeta {
        content_path: content_path.to_string(),
        full_path: full_path.map(|p| p.display().to_string()),
        content_base64: None,
        line,
        column,
        color_key: None,
    }
}

fn meta_with_images(images: Vec<ImageMeta>) -> PresentationMeta {
    PresentationMeta {
        presentation_path: "deck.md".to_string(),
        images,
        commands: Vec::new(),
    }
}

#[test]
fn build_command_quotes_every_argument() {
    let command = build_command(
        &["slides".into(), "-x".into(), "deck.md".into()],
        "deck.md",
        Path::new("/scratch/deck.md"),
    );
    assert_eq!(command, "'slides' '-x' '/scratch/deck.md'");
}

#[test]
fn build_command_leaves_other_arguments_alone() {
    let command = build_command(
        &["viewer".into(), "other.md".into()],
        "deck.md",
        Path::new("/scratch/deck.md"),
    );
    assert_eq!(command, "'viewer' 'other.md'");
}

#[test]
fn prepare_images_rewrites_each_reference() {
    let dir = TempDir::new().unwrap();
    let original = write_png(dir.path(), "logo.png", 4, 2);

    let source = "# Slide\n\n![](logo.png)\n";
    let meta = meta_with_images(vec![image_meta("logo.png", Some(original), 3, 5)]);

    let mut registry = ColorKeyRegistry::new();
    let prepared = prepare_images(source, &meta, &mut registry, dir.path()).unwrap();

    assert_eq!(registry.len(), 1);
    let replacement = dir
        .path()
        .join(format!("replacement_{:06x}.png", BASE_COLOR));
    assert!(prepared.contains(&replacement.display().to_string()));
    assert!(!prepared.contains("](logo.png)"));
    assert_eq!(image::image_dimensions(&replacement).unwrap(), (4, 2));
}

#[test]
fn preassigned_color_keys_are_honored() {
    let dir = TempDir::new().unwrap();
    let original = write_png(dir.path(), "pic.png", 2, 2);

    let source = "![](pic.png)\n";
    let mut image = image_meta("pic.png", Some(original), 1, 1);
    image.color_key = Some(BASE_COLOR + 7);
    let meta = meta_with_images(vec![image]);

    let mut registry = ColorKeyRegistry::new();
    prepare_images(source, &meta, &mut registry, dir.path()).unwrap();
    assert!(registry
        .resolve(crate::ansi::Rgb::from_u32(BASE_COLOR + 7))
        .is_ok());
}

#[test]
fn image_without_any_source_is_rejected() {
    let dir = TempDir::new().unwrap();
    let meta = meta_with_images(vec![image_meta("ghost.png", None, 1, 1)]);
    let mut registry = ColorKeyRegistry::new();
    let err = prepare_images("![](ghost.png)\n", &meta, &mut registry, dir.path()).unwrap_err();
    assert!(err.to_string().contains("ghost.png"));
}

#[test]
fn references_are_processed_bottom_to_top() {
    let dir = TempDir::new().unwrap();
    let first = write_png(dir.path(), "a.png", 2, 2);
    let second = write_png(dir.path(), "b.png", 2, 2);

    let source = "![](a.png)\n\n![](b.png)\n";
    let meta = meta_with_images(vec![
        image_meta("a.png", Some(first), 1, 5),
        image_meta("b.png", Some(second), 3, 5),
    ]);

    let mut registry = ColorKeyRegistry::new();
    let prepared = prepare_images(source, &meta, &mut registry, dir.path()).unwrap();

    // The later reference gets the base color, the earlier one the next.
    let b_replacement = format!("replacement_{:06x}.png", BASE_COLOR);
    let a_replacement = format!("replacement_{:06x}.png", BASE_COLOR + 1);
    let a_at = prepared.find(&a_replacement).unwrap();
    let b_at = prepared.find(&b_replacement).unwrap();
    assert!(a_at < b_at);
}
