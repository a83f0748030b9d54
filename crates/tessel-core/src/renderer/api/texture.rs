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

//! Defines data structures related to GPU textures.

use crate::math::Extent2D;
use std::borrow::Cow;

/// An opaque handle to a GPU texture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TextureId(pub usize);

/// The texel formats the renderer creates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextureFormat {
    /// 8-bit RGB, used for 3-channel images.
    Rgb8,
    /// 8-bit RGBA, used for 4-channel images and LDR render targets.
    Rgba8,
    /// 16-bit float RGBA, used for normals and positions in the G-buffer.
    Rgba16Float,
    /// 24-bit depth.
    Depth24,
}

impl TextureFormat {
    /// Picks the upload format for an image with `channels` components.
    ///
    /// Only 3- and 4-channel images are supported; anything else returns `None`.
    pub fn from_channel_count(channels: u8) -> Option<Self> {
        match channels {
            3 => Some(TextureFormat::Rgb8),
            4 => Some(TextureFormat::Rgba8),
            _ => None,
        }
    }

    /// Size of one texel in the CPU-side upload buffer.
    pub const fn bytes_per_pixel(self) -> usize {
        match self {
            TextureFormat::Rgb8 => 3,
            TextureFormat::Rgba8 => 4,
            TextureFormat::Rgba16Float => 8,
            TextureFormat::Depth24 => 4,
        }
    }

    /// Returns `true` for depth formats.
    pub const fn is_depth(self) -> bool {
        matches!(self, TextureFormat::Depth24)
    }
}

/// Texture sampling filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FilterMode {
    /// Nearest texel.
    Nearest,
    /// Bilinear.
    Linear,
    /// Trilinear across mip levels. Only valid as a minification filter.
    LinearMipmapLinear,
}

/// Texture addressing mode outside `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WrapMode {
    /// Clamp to the edge texel.
    ClampToEdge,
    /// Tile.
    Repeat,
}

/// A descriptor used to create a [`TextureId`].
#[derive(Debug, Clone)]
pub struct TextureDescriptor<'a> {
    /// An optional debug label for the texture.
    pub label: Option<Cow<'a, str>>,
    /// The size of mip level 0.
    pub size: Extent2D,
    /// The texel format.
    pub format: TextureFormat,
    /// Minification filter.
    pub min_filter: FilterMode,
    /// Magnification filter.
    pub mag_filter: FilterMode,
    /// Addressing mode for all axes.
    pub wrap: WrapMode,
    /// If `true`, the backend generates the full mip chain after upload.
    pub generate_mipmaps: bool,
}

impl<'a> TextureDescriptor<'a> {
    /// A mipmapped, clamped texture sampled from an image file.
    pub fn sampled_image(
        label: impl Into<Cow<'a, str>>,
        size: Extent2D,
        format: TextureFormat,
    ) -> Self {
        Self {
            label: Some(label.into()),
            size,
            format,
            min_filter: FilterMode::LinearMipmapLinear,
            mag_filter: FilterMode::Linear,
            wrap: WrapMode::ClampToEdge,
            generate_mipmaps: true,
        }
    }

    /// A render-target attachment: nearest filtering, clamped, no mips.
    pub fn render_target(
        label: impl Into<Cow<'a, str>>,
        size: Extent2D,
        format: TextureFormat,
    ) -> Self {
        Self {
            label: Some(label.into()),
            size,
            format,
            min_filter: FilterMode::Nearest,
            mag_filter: FilterMode::Nearest,
            wrap: WrapMode::ClampToEdge,
            generate_mipmaps: false,
        }
    }

    /// The number of bytes an upload for mip 0 must contain.
    pub fn expected_upload_size(&self) -> usize {
        self.size.width as usize * self.size.height as usize * self.format.bytes_per_pixel()
    }
}
