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

//! Global settings for the rendering system.

use serde::{Deserialize, Serialize};

/// The pass family rendered each frame. Selected externally; never changes
/// mid-frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum RenderMode {
    /// A single textured quad; smoke test for the texture path.
    TexturedQuad,
    /// One lit pass into the off-screen colour target, then a colour blit.
    Forward,
    /// G-buffer geometry pass, full-screen lighting pass, depth blit, gizmos.
    #[default]
    Deferred,
}

/// The intermediate target a debug UI shows next to the final image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum DebugView {
    /// The G-buffer albedo attachment.
    #[default]
    Albedo,
    /// The G-buffer normals attachment.
    Normals,
    /// The depth attachment.
    Depth,
    /// The G-buffer world-position attachment.
    Position,
}

impl DebugView {
    /// All views, in UI order.
    pub const ALL: [DebugView; 4] = [
        DebugView::Albedo,
        DebugView::Normals,
        DebugView::Depth,
        DebugView::Position,
    ];

    /// The label shown in the UI.
    pub fn label(self) -> &'static str {
        match self {
            DebugView::Albedo => "Albedo",
            DebugView::Normals => "Normals",
            DebugView::Depth => "Depth",
            DebugView::Position => "Position",
        }
    }
}

/// A collection of global settings that can affect the rendering process.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderSettings {
    /// The pass family to render.
    pub mode: RenderMode,
    /// Draw a cube or sphere at every light after the deferred lighting pass.
    pub show_gizmo: bool,
    /// Enables parallax relief mapping in the geometry pass.
    pub show_relief: bool,
    /// Which intermediate target the debug UI displays.
    pub debug_view: DebugView,
    /// Clear colour of the off-screen target.
    pub clear_color: [f32; 4],
    /// Path of the shader family file.
    pub shader_path: String,
    /// Recompile programs whose source file changed on disk.
    pub hot_reload: bool,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            mode: RenderMode::Deferred,
            show_gizmo: true,
            show_relief: false,
            debug_view: DebugView::Albedo,
            clear_color: [0.2, 0.2, 0.2, 1.0],
            shader_path: "assets/shaders/shaders.glsl".to_string(),
            hot_reload: true,
        }
    }
}
