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

//! Immediate per-draw state: clears, fixed-function toggles and topology.

/// How vertices are assembled into primitives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Topology {
    /// Independent triangles.
    Triangles,
    /// A strip where each new vertex forms a triangle with the previous two.
    TriangleStrip,
}

/// What to clear on the currently bound target.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClearDescriptor {
    /// Clear every enabled draw buffer to this colour.
    pub color: Option<[f32; 4]>,
    /// Clear depth to 1.0.
    pub depth: bool,
}

impl ClearDescriptor {
    /// Clears colour and depth.
    pub fn color_and_depth(color: [f32; 4]) -> Self {
        Self {
            color: Some(color),
            depth: true,
        }
    }
}

/// Fixed-function state applied before a pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderState {
    /// Enables `LESS` depth testing.
    pub depth_test: bool,
    /// Enables `SRC_ALPHA, ONE_MINUS_SRC_ALPHA` blending.
    pub alpha_blend: bool,
}

impl Default for RenderState {
    fn default() -> Self {
        Self {
            depth_test: true,
            alpha_blend: true,
        }
    }
}
