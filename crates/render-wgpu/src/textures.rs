//! RGBA8 images for the four texture slots, decoded from disk with the
//! `image` crate or generated when a file is missing.

use std::path::{Path, PathBuf};

use gallery_render::TextureSlot;
use thiserror::Error;
use tracing::{info, warn};

#[derive(Debug, Error)]
pub enum TextureError {
    #[error("failed to decode {path}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextureImage {
    pub width: u32,
    pub height: u32,
    pub rgba: Vec<u8>,
}

impl TextureImage {
    pub fn load(path: &Path) -> Result<Self, TextureError> {
        let img = image::open(path)
            .map_err(|source| TextureError::Decode {
                path: path.to_path_buf(),
                source,
            })?
            .to_rgba8();
        let (width, height) = img.dimensions();
        Ok(Self {
            width,
            height,
            rgba: img.into_raw(),
        })
    }

    fn from_fn(width: u32, height: u32, pixel: impl Fn(u32, u32) -> [u8; 4]) -> Self {
        let mut rgba = Vec::with_capacity((width * height * 4) as usize);
        for y in 0..height {
            for x in 0..width {
                rgba.extend_from_slice(&pixel(x, y));
            }
        }
        Self {
            width,
            height,
            rgba,
        }
    }

    pub fn checker(size: u32, cell: u32, a: [u8; 4], b: [u8; 4]) -> Self {
        let cell = cell.max(1);
        Self::from_fn(size, size, |x, y| if (x / cell + y / cell) % 2 == 0 { a } else { b })
    }

    /// Vertical blend from `top` to `bottom`.
    pub fn gradient(width: u32, height: u32, top: [u8; 4], bottom: [u8; 4]) -> Self {
        let span = height.saturating_sub(1).max(1) as f32;
        Self::from_fn(width, height, |_, y| {
            let t = y as f32 / span;
            std::array::from_fn(|i| {
                (top[i] as f32 + (bottom[i] as f32 - top[i] as f32) * t).round() as u8
            })
        })
    }

    /// Transparent square with an opaque plus through the middle.
    pub fn crosshair(size: u32) -> Self {
        let mid = size / 2;
        let half_width = (size / 16).max(1);
        Self::from_fn(size, size, |x, y| {
            if x.abs_diff(mid) < half_width || y.abs_diff(mid) < half_width {
                [255, 255, 255, 255]
            } else {
                [0, 0, 0, 0]
            }
        })
    }

    pub fn fallback(slot: TextureSlot) -> Self {
        match slot {
            TextureSlot::Ground => Self::checker(64, 8, [96, 120, 72, 255], [80, 100, 60, 255]),
            TextureSlot::MainMesh => Self::checker(32, 4, [160, 120, 80, 255], [120, 90, 60, 255]),
            TextureSlot::Skybox => Self::gradient(4, 64, [90, 140, 220, 255], [200, 220, 240, 255]),
            TextureSlot::Crosshair => Self::crosshair(32),
        }
    }
}

/// One image per slot.
#[derive(Debug, Clone)]
pub struct TextureSet {
    images: Vec<TextureImage>,
}

impl Default for TextureSet {
    fn default() -> Self {
        Self {
            images: TextureSlot::ALL.iter().map(|s| TextureImage::fallback(*s)).collect(),
        }
    }
}

impl TextureSet {
    /// Loads `<slot>.png` for each slot from `dir`. Missing or undecodable
    /// files fall back to a generated image.
    pub fn load_dir(dir: Option<&Path>) -> Self {
        let images = TextureSlot::ALL
            .iter()
            .map(|slot| {
                let Some(dir) = dir else {
                    return TextureImage::fallback(*slot);
                };
                let path = dir.join(format!("{}.png", slot.name()));
                if !path.exists() {
                    info!(path = %path.display(), "texture missing, using generated image");
                    return TextureImage::fallback(*slot);
                }
                match TextureImage::load(&path) {
                    Ok(image) => {
                        info!(
                            path = %path.display(),
                            width = image.width,
                            height = image.height,
                            "texture loaded"
                        );
                        image
                    }
                    Err(e) => {
                        warn!(error = %e, "texture unusable, using generated image");
                        TextureImage::fallback(*slot)
                    }
                }
            })
            .collect();
        Self { images }
    }

    pub fn get(&self, slot: TextureSlot) -> &TextureImage {
        &self.images[slot.index()]
    }
}
