//! Color-key registry.
//!
//! Images cannot survive a text-only capture round trip, so before the
//! presentation runs every image reference is swapped for a solid-color
//! block of the same pixel dimensions, and after capture the blocks are
//! swapped back. The registry owns that bijection for one export run:
//! each image gets the next color in a reserved window that no themed
//! presentation comes near in practice.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use image::GenericImageView;
use thiserror::Error;

use crate::ansi::Rgb;

/// First color handed out; keys count up from here. The value comes
/// from the reference environment and sits far from common theme
/// palettes; it is not derived from anything.
pub const BASE_COLOR: u32 = 0xFFBAD3;

/// Size of the color window treated as key space. A background inside
/// the window that matches no assignment is a corrupted capture, not a
/// theme color.
pub const KEY_SPAN: u32 = 0x100;

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("unknown color key {}", .0.css())]
    UnknownColorKey(Rgb),

    #[error("failed to read image {path}: {source}")]
    ReadImage {
        path: String,
        #[source]
        source: image::ImageError,
    },

    #[error("failed to write replacement image {}: {source}", path.display())]
    WriteImage {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("invalid inline image content: {0}")]
    InlineContent(#[from] base64::DecodeError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// A unique solid color standing in for one image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct ColorKey(u32);

impl ColorKey {
    pub fn value(self) -> u32 {
        self.0
    }

    pub fn rgb(self) -> Rgb {
        Rgb::from_u32(self.0)
    }
}

/// Where an image's bytes live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssetSource {
    Path(PathBuf),
    Inline(Vec<u8>),
}

impl AssetSource {
    /// Decode inline image content from its base64 wire form.
    pub fn inline_from_base64(content: &str) -> Result<Self, RegistryError> {
        use base64::Engine as _;
        let bytes = base64::engine::general_purpose::STANDARD.decode(content)?;
        Ok(AssetSource::Inline(bytes))
    }
}

/// One image reference, keyed by its stand-in color.
#[derive(Debug, Clone)]
pub struct ImageAsset {
    pub key: ColorKey,
    pub source: AssetSource,
}

impl ImageAsset {
    /// Pixel dimensions of the original image.
    pub fn dimensions(&self) -> Result<(u32, u32), RegistryError> {
        match &self.source {
            AssetSource::Path(path) => {
                image::image_dimensions(path).map_err(|source| RegistryError::ReadImage {
                    path: path.display().to_string(),
                    source,
                })
            }
            AssetSource::Inline(bytes) => {
                let decoded =
                    image::load_from_memory(bytes).map_err(|source| RegistryError::ReadImage {
                        path: format!("<inline image for {}>", self.key.rgb().css()),
                        source,
                    })?;
                Ok((decoded.width(), decoded.height()))
            }
        }
    }

    /// A path on disk for the image, materializing inline bytes into
    /// `dir` on demand.
    pub fn materialize(&self, dir: &Path) -> Result<PathBuf, RegistryError> {
        match &self.source {
            AssetSource::Path(path) => Ok(path.clone()),
            AssetSource::Inline(bytes) => {
                let path = dir.join(format!("inline_{:06x}.png", self.key.value()));
                if !path.exists() {
                    std::fs::write(&path, bytes)?;
                }
                Ok(path)
            }
        }
    }
}

/// Owns the color-to-image mapping for one export run.
#[derive(Debug)]
pub struct ColorKeyRegistry {
    next: u32,
    assets: BTreeMap<u32, ImageAsset>,
}

impl Default for ColorKeyRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ColorKeyRegistry {
    pub fn new() -> Self {
        Self {
            next: BASE_COLOR,
            assets: BTreeMap::new(),
        }
    }

    /// Issue the next unused key for `source`.
    pub fn assign(&mut self, source: AssetSource) -> ColorKey {
        let key = ColorKey(self.next);
        self.register(key, source)
    }

    /// Register an image under a key the caller already picked.
    ///
    /// Later automatic assignments skip past it.
    pub fn assign_fixed(&mut self, value: u32, source: AssetSource) -> ColorKey {
        self.register(ColorKey(value), source)
    }

    fn register(&mut self, key: ColorKey, source: AssetSource) -> ColorKey {
        self.next = self.next.max(key.value() + 1);
        self.assets.insert(key.value(), ImageAsset { key, source });
        key
    }

    /// Look up the image standing behind a key color.
    pub fn resolve(&self, color: Rgb) -> Result<&ImageAsset, RegistryError> {
        self.assets
            .get(&color.to_u32())
            .ok_or(RegistryError::UnknownColorKey(color))
    }

    /// Whether `color` falls inside the window reserved for keys.
    pub fn in_key_window(color: Rgb) -> bool {
        (BASE_COLOR..BASE_COLOR + KEY_SPAN).contains(&color.to_u32())
    }

    pub fn len(&self) -> usize {
        self.assets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }

    /// All registered assets in key order.
    pub fn assets(&self) -> impl Iterator<Item = &ImageAsset> {
        self.assets.values()
    }

    /// Write the solid block that stands in for `key`'s image: the
    /// original's pixel dimensions, every pixel the key color.
    pub fn write_replacement(&self, key: ColorKey, dir: &Path) -> Result<PathBuf, RegistryError> {
        let asset = self.resolve(key.rgb())?;
        let (width, height) = asset.dimensions()?;
        let rgb = key.rgb();
        let block = image::RgbImage::from_pixel(width, height, image::Rgb([rgb.r, rgb.g, rgb.b]));
        let path = dir.join(format!("replacement_{:06x}.png", key.value()));
        block
            .save(&path)
            .map_err(|source| RegistryError::WriteImage {
                path: path.clone(),
                source,
            })?;
        Ok(path)
    }
}

#[cfg(test)]
#[path = "color_key_tests.rs"]
mod tests;
