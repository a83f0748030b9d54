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

//! Defines a lane for loading Wavefront OBJ models with their materials.

use anyhow::Context;
use std::path::{Path, PathBuf};
use tessel_core::asset::{LoadError, MaterialData, ModelData, ModelLoader, SubmeshData};
use tessel_core::math::{Vec2, Vec3};
use tessel_core::renderer::{locations, VertexBufferLayout};

/// Errors specific to OBJ parsing.
#[derive(Debug, thiserror::Error)]
pub enum ModelLoadError {
    /// The file parsed but holds no triangles.
    #[error("'{path}' contains no meshes")]
    NoGeometry {
        /// The offending file.
        path: PathBuf,
    },
}

/// The interleaved layout every OBJ submesh is expanded to:
/// position, normal, uv, tangent, bitangent.
pub fn obj_vertex_layout() -> VertexBufferLayout {
    VertexBufferLayout::packed(&[
        (locations::POSITION, 3),
        (locations::NORMAL, 3),
        (locations::UV, 2),
        (locations::TANGENT, 3),
        (locations::BITANGENT, 3),
    ])
}

/// Lane for loading OBJ models through `tobj`.
///
/// Every `o`/`g` group becomes one submesh. Missing normals are rebuilt from
/// the faces, missing UVs are zero, and tangent frames are always derived
/// from the UVs so relief mapping works on any model.
#[derive(Debug, Clone, Copy, Default)]
pub struct ObjLoaderLane;

impl ModelLoader for ObjLoaderLane {
    fn load(&self, path: &Path) -> Result<ModelData, LoadError> {
        let (models, materials) = tobj::load_obj(
            path,
            &tobj::LoadOptions {
                triangulate: true,
                single_index: true,
                ..Default::default()
            },
        )
        .with_context(|| format!("Failed to parse OBJ file '{}'", path.display()))?;

        let materials = materials.unwrap_or_else(|e| {
            log::warn!("No materials for '{}': {e}", path.display());
            Vec::new()
        });
        let directory = path.parent().unwrap_or(Path::new(""));

        let submeshes: Vec<SubmeshData> = models
            .iter()
            .filter(|m| !m.mesh.indices.is_empty())
            .map(|m| build_submesh(&m.name, &m.mesh))
            .collect();
        if submeshes.is_empty() {
            return Err(ModelLoadError::NoGeometry {
                path: path.to_path_buf(),
            }
            .into());
        }

        Ok(ModelData {
            submeshes,
            materials: materials
                .iter()
                .map(|m| convert_material(m, directory))
                .collect(),
        })
    }
}

fn build_submesh(name: &str, mesh: &tobj::Mesh) -> SubmeshData {
    let positions: Vec<Vec3> = mesh
        .positions
        .chunks_exact(3)
        .map(|p| Vec3::new(p[0], p[1], p[2]))
        .collect();
    let count = positions.len();
    let uvs: Vec<Vec2> = if mesh.texcoords.len() >= count * 2 {
        mesh.texcoords
            .chunks_exact(2)
            .map(|t| Vec2::new(t[0], t[1]))
            .collect()
    } else {
        vec![Vec2::ZERO; count]
    };
    let normals: Vec<Vec3> = if mesh.normals.len() >= count * 3 {
        mesh.normals
            .chunks_exact(3)
            .map(|n| Vec3::new(n[0], n[1], n[2]))
            .collect()
    } else {
        face_normals(&positions, &mesh.indices)
    };
    let (tangents, bitangents) = tangent_frames(&positions, &uvs, &mesh.indices);

    let layout = obj_vertex_layout();
    let mut vertices = Vec::with_capacity(count * layout.floats_per_vertex());
    for i in 0..count {
        vertices.extend_from_slice(&positions[i].to_array());
        vertices.extend_from_slice(&normals[i].to_array());
        vertices.extend_from_slice(&uvs[i].to_array());
        vertices.extend_from_slice(&tangents[i].to_array());
        vertices.extend_from_slice(&bitangents[i].to_array());
    }

    SubmeshData {
        name: name.to_string(),
        layout,
        vertices,
        indices: mesh.indices.clone(),
        material: mesh.material_id,
    }
}

fn triangles(indices: &[u32]) -> impl Iterator<Item = [usize; 3]> + '_ {
    indices
        .chunks_exact(3)
        .map(|t| [t[0] as usize, t[1] as usize, t[2] as usize])
}

/// Area-weighted vertex normals.
fn face_normals(positions: &[Vec3], indices: &[u32]) -> Vec<Vec3> {
    let mut normals = vec![Vec3::ZERO; positions.len()];
    for [a, b, c] in triangles(indices) {
        let n = (positions[b] - positions[a]).cross(positions[c] - positions[a]);
        normals[a] += n;
        normals[b] += n;
        normals[c] += n;
    }
    normals
        .into_iter()
        .map(|n| n.normalize_or(Vec3::Y))
        .collect()
}

/// Per-vertex tangent and bitangent accumulated from the UV gradients of
/// adjacent triangles.
fn tangent_frames(positions: &[Vec3], uvs: &[Vec2], indices: &[u32]) -> (Vec<Vec3>, Vec<Vec3>) {
    let mut tangents = vec![Vec3::ZERO; positions.len()];
    let mut bitangents = vec![Vec3::ZERO; positions.len()];
    for [a, b, c] in triangles(indices) {
        let e1 = positions[b] - positions[a];
        let e2 = positions[c] - positions[a];
        let d1 = uvs[b] - uvs[a];
        let d2 = uvs[c] - uvs[a];
        let det = d1.x * d2.y - d2.x * d1.y;
        if det.abs() < f32::EPSILON {
            continue;
        }
        let f = 1.0 / det;
        let tangent = (e1 * d2.y - e2 * d1.y) * f;
        let bitangent = (e2 * d1.x - e1 * d2.x) * f;
        for v in [a, b, c] {
            tangents[v] += tangent;
            bitangents[v] += bitangent;
        }
    }
    (
        tangents.into_iter().map(|t| t.normalize_or(Vec3::X)).collect(),
        bitangents.into_iter().map(|b| b.normalize_or(Vec3::Y)).collect(),
    )
}

fn parse_color(text: &str) -> Option<[f32; 3]> {
    let mut parts = text.split_whitespace().map(str::parse::<f32>);
    match (parts.next(), parts.next(), parts.next()) {
        (Some(Ok(r)), Some(Ok(g)), Some(Ok(b))) => Some([r, g, b]),
        _ => None,
    }
}

fn convert_material(material: &tobj::Material, directory: &Path) -> MaterialData {
    let resolve = |name: Option<&String>| {
        name.map(|n| n.trim())
            .filter(|n| !n.is_empty())
            .map(|n| directory.join(n))
    };
    let param = |key: &str| material.unknown_param.get(key);

    MaterialData {
        name: material.name.clone(),
        albedo: material.diffuse.unwrap_or([1.0; 3]),
        emissive: param("Ke").and_then(|v| parse_color(v)).unwrap_or([0.0; 3]),
        smoothness: material
            .shininess
            .map(|s| (s / 1000.0).clamp(0.0, 1.0))
            .unwrap_or(0.0),
        albedo_texture: resolve(material.diffuse_texture.as_ref()),
        emissive_texture: resolve(param("map_Ke")),
        normal_texture: resolve(param("norm").or_else(|| param("map_Kn"))),
        // `tobj` reads `bump`/`map_Bump` into its normal slot; here it is a height map.
        bump_texture: resolve(material.normal_texture.as_ref()),
    }
}
