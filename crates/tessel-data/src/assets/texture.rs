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

use std::path::PathBuf;
use tessel_core::math::Extent2D;
use tessel_core::renderer::TextureId;

/// A GPU 2D texture held by the cache.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Texture {
    /// The file the texture was decoded from, or a `builtin://` name.
    pub path: PathBuf,
    /// The GPU texture.
    pub id: TextureId,
    /// Components per pixel of the source image.
    pub channels: u8,
    /// Size of level 0.
    pub size: Extent2D,
}

/// Textures created in memory at startup and used when a material slot is empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BuiltinTexture {
    /// Opaque white; neutral albedo.
    White,
    /// Opaque black; no emission, flat height map.
    Black,
    /// `(0.5, 0.5, 1.0)`; an unperturbed tangent-space normal.
    FlatNormal,
}

impl BuiltinTexture {
    /// Every built-in texture.
    pub const ALL: [BuiltinTexture; 3] = [
        BuiltinTexture::White,
        BuiltinTexture::Black,
        BuiltinTexture::FlatNormal,
    ];

    /// The cache path used as the texture's identity.
    pub fn path(self) -> &'static str {
        match self {
            BuiltinTexture::White => "builtin://white",
            BuiltinTexture::Black => "builtin://black",
            BuiltinTexture::FlatNormal => "builtin://flat_normal",
        }
    }

    /// The single RGBA8 texel.
    pub fn texel(self) -> [u8; 4] {
        match self {
            BuiltinTexture::White => [255, 255, 255, 255],
            BuiltinTexture::Black => [0, 0, 0, 255],
            BuiltinTexture::FlatNormal => [128, 128, 255, 255],
        }
    }
}
