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

use super::TextureHandle;
use tessel_core::math::Vec3;

/// Surface appearance of a submesh. Texture slots may hold
/// [`TextureHandle::INVALID`] when the material has no map for them.
#[derive(Debug, Clone, PartialEq)]
pub struct Material {
    /// Material name.
    pub name: String,
    /// Diffuse colour.
    pub albedo: Vec3,
    /// Emissive colour.
    pub emissive: Vec3,
    /// Scalar smoothness.
    pub smoothness: f32,
    /// Albedo map.
    pub albedo_texture: TextureHandle,
    /// Emissive map.
    pub emissive_texture: TextureHandle,
    /// Tangent-space normal map.
    pub normal_texture: TextureHandle,
    /// Height map used for relief mapping.
    pub bump_texture: TextureHandle,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            name: "default".to_string(),
            albedo: Vec3::ONE,
            emissive: Vec3::ZERO,
            smoothness: 0.0,
            albedo_texture: TextureHandle::INVALID,
            emissive_texture: TextureHandle::INVALID,
            normal_texture: TextureHandle::INVALID,
            bump_texture: TextureHandle::INVALID,
        }
    }
}

/// A loaded model: one mesh and the material drawn with each of its submeshes.
#[derive(Debug, Clone, PartialEq)]
pub struct Model {
    /// The model file.
    pub path: std::path::PathBuf,
    /// The uploaded geometry.
    pub mesh: super::MeshHandle,
    /// One material per submesh, in submesh order.
    pub materials: Vec<super::MaterialHandle>,
}
