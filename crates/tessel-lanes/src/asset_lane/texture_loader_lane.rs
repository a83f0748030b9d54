// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Image decoding for the texture cache.

use anyhow::Context;
use image::DynamicImage;
use std::path::{Path, PathBuf};
use tessel_core::asset::{Image, ImageLoader, LoadError};
use tessel_core::math::Extent2D;

/// Errors specific to image decoding.
#[derive(Debug, thiserror::Error)]
pub enum ImageLoadError {
    /// The decoded image has a zero dimension.
    #[error("image '{path}' has no pixels")]
    Empty {
        /// The offending file.
        path: PathBuf,
    },
}

/// A lane that decodes image files with the `image` crate.
///
/// Rows are flipped so that row 0 is the bottom of the picture, and the
/// file's native channel count is preserved so the cache can reject formats
/// it does not upload.
#[derive(Debug, Clone, Copy, Default)]
pub struct TextureLoaderLane;

impl TextureLoaderLane {
    /// Converts an already decoded image.
    pub fn convert(image: DynamicImage) -> Image {
        let image = image.flipv();
        let channels = image.color().channel_count();
        let size = Extent2D::new(image.width(), image.height());
        let pixels = match channels {
            1 => image.into_luma8().into_raw(),
            2 => image.into_luma_alpha8().into_raw(),
            3 => image.into_rgb8().into_raw(),
            _ => image.into_rgba8().into_raw(),
        };
        Image {
            pixels,
            size,
            channels: channels.min(4),
        }
    }

    /// Decodes an image held in memory.
    pub fn decode(bytes: &[u8]) -> Result<Image, LoadError> {
        let image = image::load_from_memory(bytes).context("Failed to decode image from memory")?;
        Ok(Self::convert(image))
    }
}

impl ImageLoader for TextureLoaderLane {
    fn load(&self, path: &Path) -> Result<Image, LoadError> {
        let image = image::open(path)
            .with_context(|| format!("Failed to decode image '{}'", path.display()))?;
        let image = Self::convert(image);
        if image.size.is_empty() {
            return Err(ImageLoadError::Empty {
                path: path.to_path_buf(),
            }
            .into());
        }
        log::trace!(
            "Decoded '{}': {}x{}, {} channels",
            path.display(),
            image.size.width,
            image.size.height,
            image.channels
        );
        Ok(image)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage, Rgba, RgbaImage};

    #[test]
    fn rows_are_flipped_bottom_up() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stripes.png");
        let mut picture = RgbImage::new(1, 2);
        picture.put_pixel(0, 0, Rgb([255, 0, 0]));
        picture.put_pixel(0, 1, Rgb([0, 0, 255]));
        picture.save(&path).unwrap();

        let image = TextureLoaderLane.load(&path).unwrap();

        assert_eq!(image.channels, 3);
        assert_eq!(image.size, Extent2D::new(1, 2));
        assert_eq!(image.pixels, vec![0, 0, 255, 255, 0, 0]);
    }

    #[test]
    fn alpha_channel_is_preserved() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dot.png");
        RgbaImage::from_pixel(2, 2, Rgba([10, 20, 30, 40])).save(&path).unwrap();

        let image = TextureLoaderLane.load(&path).unwrap();

        assert_eq!(image.channels, 4);
        assert_eq!(image.stride(), 8);
        assert_eq!(&image.pixels[..4], &[10, 20, 30, 40]);
    }

    #[test]
    fn grayscale_keeps_its_single_channel() {
        let gray = DynamicImage::ImageLuma8(image::GrayImage::new(3, 1));
        assert_eq!(TextureLoaderLane::convert(gray).channels, 1);
    }

    #[test]
    fn decodes_encoded_bytes_from_memory() {
        let mut picture = RgbaImage::new(1, 2);
        picture.put_pixel(0, 0, Rgba([255, 0, 0, 255]));
        picture.put_pixel(0, 1, Rgba([0, 255, 0, 128]));
        let mut encoded = std::io::Cursor::new(Vec::new());
        DynamicImage::ImageRgba8(picture)
            .write_to(&mut encoded, image::ImageFormat::Png)
            .unwrap();

        let image = TextureLoaderLane::decode(encoded.get_ref()).unwrap();

        assert_eq!(image.channels, 4);
        assert_eq!(image.size, Extent2D::new(1, 2));
        assert_eq!(image.pixels, vec![0, 255, 0, 128, 255, 0, 0, 255]);

        let err = TextureLoaderLane::decode(b"not an image").unwrap_err();
        assert!(err.to_string().contains("from memory"));
    }

    #[test]
    fn missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = TextureLoaderLane.load(&dir.path().join("nope.png")).unwrap_err();
        assert!(err.to_string().contains("nope.png"));
    }
}
