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

use super::LoadError;
use crate::math::Extent2D;
use std::path::Path;

/// Decoded pixels, rows already flipped so that row 0 is the bottom of the image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Image {
    /// Tightly packed 8-bit pixels.
    pub pixels: Vec<u8>,
    /// Width and height in pixels.
    pub size: Extent2D,
    /// Components per pixel as stored in the file.
    pub channels: u8,
}

impl Image {
    /// Bytes per row.
    pub fn stride(&self) -> usize {
        self.size.width as usize * self.channels as usize
    }
}

/// Decodes an image file into [`Image`].
///
/// Implementations flip rows vertically so that the first row in memory is the
/// bottom row, matching the GPU's bottom-left texture origin.
pub trait ImageLoader {
    /// Loads the image at `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file is missing or cannot be decoded.
    fn load(&self, path: &Path) -> Result<Image, LoadError>;
}
