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

//! Information reported by the graphics driver.

use std::fmt;

/// Hardware limits queried once at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeviceLimits {
    /// Minimum alignment of any range bound as its own uniform block.
    pub uniform_buffer_offset_alignment: u32,
    /// Maximum size of a single uniform block, in bytes.
    pub max_uniform_block_size: u32,
}

impl Default for DeviceLimits {
    fn default() -> Self {
        // The minimums an OpenGL 4.3 implementation must support.
        Self {
            uniform_buffer_offset_alignment: 256,
            max_uniform_block_size: 16 * 1024,
        }
    }
}

/// Human-readable driver identification.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AdapterInfo {
    /// API version string.
    pub version: String,
    /// Renderer (GPU) name.
    pub renderer: String,
    /// Vendor name.
    pub vendor: String,
    /// Shading language version string.
    pub shading_language_version: String,
    /// Supported extensions.
    pub extensions: Vec<String>,
}

impl fmt::Display for AdapterInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({}) | {} | GLSL {} | {} extensions",
            self.renderer,
            self.vendor,
            self.version,
            self.shading_language_version,
            self.extensions.len()
        )
    }
}
