use eframe::egui::{self, ColorImage, TextureHandle};
use std::collections::{HashMap, HashSet};
use std::path::Path;
use tracing::{debug, warn};

use crate::core::ImageRef;

/// Thumbnails decoded per frame, so a fresh page does not freeze the window
const LOADS_PER_FRAME: usize = 6;

/// Decode an image file and shrink it to fit a `size` x `size` box
pub fn decode_thumbnail(path: &Path, size: u32) -> image::ImageResult<ColorImage> {
    let img = image::open(path)?.thumbnail(size, size).to_rgba8();
    let dims = [img.width() as usize, img.height() as usize];
    Ok(ColorImage::from_rgba_unmultiplied(
        dims,
        img.as_flat_samples().as_slice(),
    ))
}

/// Texture cache for the thumbnails of the page on screen
#[derive(Default)]
pub struct ThumbnailCache {
    textures: HashMap<String, TextureHandle>,
    failed: HashSet<String>,
    size: u32,
}

impl ThumbnailCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.textures.clear();
        self.failed.clear();
    }

    /// Drop textures for images that left the page
    pub fn retain_page(&mut self, page: &[ImageRef]) {
        let keep: HashSet<&str> = page.iter().map(|image| image.path.as_str()).collect();
        self.textures.retain(|path, _| keep.contains(path.as_str()));
        self.failed.retain(|path| keep.contains(path.as_str()));
    }

    pub fn get(&self, path: &str) -> Option<&TextureHandle> {
        self.textures.get(path)
    }

    pub fn is_failed(&self, path: &str) -> bool {
        self.failed.contains(path)
    }

    /// Decode a few missing thumbnails. Returns `true` while some are still pending.
    pub fn load_missing(&mut self, ctx: &egui::Context, page: &[ImageRef], size: u32) -> bool {
        if size != self.size {
            debug!("Thumbnail size changed {} -> {}, dropping cache", self.size, size);
            self.clear();
            self.size = size;
        }

        let pending: Vec<&ImageRef> = page
            .iter()
            .filter(|image| {
                !self.textures.contains_key(&image.path) && !self.failed.contains(&image.path)
            })
            .collect();

        for image in pending.iter().take(LOADS_PER_FRAME) {
            match decode_thumbnail(Path::new(&image.path), size) {
                Ok(color_image) => {
                    let texture =
                        ctx.load_texture(&image.path, color_image, egui::TextureOptions::LINEAR);
                    self.textures.insert(image.path.clone(), texture);
                }
                Err(e) => {
                    warn!("Failed to load thumbnail for {}: {}", image.path, e);
                    self.failed.insert(image.path.clone());
                }
            }
        }

        pending.len() > LOADS_PER_FRAME
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_decode_thumbnail_fits_box() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("wide.png");
        image::RgbImage::from_pixel(400, 100, image::Rgb([200, 10, 10]))
            .save(&path)
            .unwrap();

        let thumb = decode_thumbnail(&path, 80).unwrap();
        assert_eq!(thumb.size[0], 80);
        assert!(thumb.size[1] <= 80);
    }

    #[test]
    fn test_decode_thumbnail_rejects_garbage() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("broken.png");
        std::fs::write(&path, b"not an image").unwrap();

        assert!(decode_thumbnail(&path, 80).is_err());
    }
}
