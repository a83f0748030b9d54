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
use crate::renderer::api::VertexBufferLayout;
use std::path::{Path, PathBuf};

/// One drawable index range with its own interleaved vertices.
#[derive(Debug, Clone, Default)]
pub struct SubmeshData {
    /// Name from the source file, for logs.
    pub name: String,
    /// The interleaved layout of [`vertices`](Self::vertices).
    pub layout: VertexBufferLayout,
    /// Interleaved float vertex data.
    pub vertices: Vec<f32>,
    /// Triangle-list indices, local to this submesh's vertices.
    pub indices: Vec<u32>,
    /// Index into [`ModelData::materials`].
    pub material: Option<usize>,
}

impl SubmeshData {
    /// Number of vertices.
    pub fn vertex_count(&self) -> usize {
        match self.layout.floats_per_vertex() {
            0 => 0,
            n => self.vertices.len() / n,
        }
    }
}

/// Surface description referenced by submeshes.
#[derive(Debug, Clone, PartialEq)]
pub struct MaterialData {
    /// Material name.
    pub name: String,
    /// Diffuse colour.
    pub albedo: [f32; 3],
    /// Emissive colour.
    pub emissive: [f32; 3],
    /// Scalar smoothness in `[0, 1]`.
    pub smoothness: f32,
    /// Resolved path of the albedo map.
    pub albedo_texture: Option<PathBuf>,
    /// Resolved path of the emissive map.
    pub emissive_texture: Option<PathBuf>,
    /// Resolved path of the tangent-space normal map.
    pub normal_texture: Option<PathBuf>,
    /// Resolved path of the height (bump) map.
    pub bump_texture: Option<PathBuf>,
}

impl Default for MaterialData {
    fn default() -> Self {
        Self {
            name: String::new(),
            albedo: [1.0; 3],
            emissive: [0.0; 3],
            smoothness: 0.0,
            albedo_texture: None,
            emissive_texture: None,
            normal_texture: None,
            bump_texture: None,
        }
    }
}

/// Everything a model file yields: one mesh made of submeshes, and its materials.
#[derive(Debug, Clone, Default)]
pub struct ModelData {
    /// The submeshes, in file order.
    pub submeshes: Vec<SubmeshData>,
    /// The materials, indexed by [`SubmeshData::material`].
    pub materials: Vec<MaterialData>,
}

/// Parses a model file into [`ModelData`].
pub trait ModelLoader {
    /// Loads the model at `path`. Texture paths in the returned materials are
    /// resolved against the model's directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the file is missing or cannot be parsed.
    fn load(&self, path: &Path) -> Result<ModelData, LoadError>;
}
