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

//! The shader variants of the shared shader family and the vertex inputs each
//! one declares.

use tessel_core::renderer::{ResourceError, VertexInputLayout};
use tessel_data::assets::ProgramHandle;

use super::SetupContext;

/// One `#define`-selected variant of the shader family file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgramVariant {
    /// The preprocessor symbol.
    pub name: &'static str,
    /// `(location, components)` of every vertex input.
    pub inputs: &'static [(u32, u8)],
}

impl ProgramVariant {
    /// The declared vertex-input layout.
    pub fn layout(&self) -> VertexInputLayout {
        VertexInputLayout::new(self.inputs)
    }

    /// Loads the variant from the context's shader file.
    pub fn load(&self, ctx: &mut SetupContext<'_>) -> Result<ProgramHandle, ResourceError> {
        ctx.cache
            .load_program(ctx.device, ctx.shader_path, self.name, self.layout())
    }
}

/// The textured-quad demo.
pub const TEXTURED_GEOMETRY: ProgramVariant = ProgramVariant {
    name: "TEXTURED_GEOMETRY",
    inputs: &[(0, 3), (1, 2)],
};

/// Forward-lit textured meshes.
pub const SHOW_TEXTURED_MESH: ProgramVariant = ProgramVariant {
    name: "SHOW_TEXTURED_MESH",
    inputs: &[(0, 3), (1, 3), (2, 2)],
};

/// The deferred geometry pass. Needs the tangent frame for normal and relief mapping.
pub const SHOW_GEOMETRY: ProgramVariant = ProgramVariant {
    name: "SHOW_GEOMETRY",
    inputs: &[(0, 3), (1, 3), (2, 2), (3, 3), (4, 3)],
};

/// The deferred lighting pass over a full-screen quad.
pub const SHOW_LIGHT: ProgramVariant = ProgramVariant {
    name: "SHOW_LIGHT",
    inputs: &[(0, 3), (1, 2)],
};

/// The light gizmo.
pub const DRAW_LIGHT: ProgramVariant = ProgramVariant {
    name: "DRAW_LIGHT",
    inputs: &[(0, 3)],
};

/// Every variant, in the order they appear in the shader file.
pub const ALL: [ProgramVariant; 5] = [
    TEXTURED_GEOMETRY,
    SHOW_TEXTURED_MESH,
    SHOW_GEOMETRY,
    SHOW_LIGHT,
    DRAW_LIGHT,
];
