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

//! Procedural shapes shared by the render lanes.
//!
//! Every shape is uploaded once when the cache is built and drawn through the
//! same vertex-binding path as loaded models.

use std::f32::consts::PI;
use tessel_core::asset::SubmeshData;
use tessel_core::math::Vec3;
use tessel_core::renderer::{
    GraphicsDevice, ProgramId, ResourceError, Topology, VertexBufferLayout,
};
use tessel_data::assets::{Mesh, ShaderProgram};

/// Horizontal segments of the gizmo sphere.
pub const SPHERE_SEGMENTS: u32 = 32;
/// Vertical rings of the gizmo sphere.
pub const SPHERE_RINGS: u32 = 16;

/// The shapes the cache holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Shape {
    /// A clip-space quad covering the screen, drawn as a strip.
    FullscreenQuad,
    /// A unit cube centred on the origin, spanning `[-0.5, 0.5]` on every axis.
    Cube,
    /// A unit UV sphere.
    Sphere,
    /// A half-unit quad for the textured-quad demo.
    TexturedQuad,
}

/// Owns the procedural meshes.
#[derive(Debug)]
pub struct GeometryCache {
    fullscreen_quad: Mesh,
    cube: Mesh,
    sphere: Mesh,
    textured_quad: Mesh,
}

impl GeometryCache {
    /// Generates and uploads every shape.
    pub fn new(device: &mut dyn GraphicsDevice) -> Result<Self, ResourceError> {
        Ok(Self {
            fullscreen_quad: Mesh::upload(
                device,
                "fullscreen quad",
                &[fullscreen_quad()],
                Topology::TriangleStrip,
            )?,
            cube: Mesh::upload(device, "cube", &[cube()], Topology::Triangles)?,
            sphere: Mesh::upload(device, "sphere", &[sphere()], Topology::TriangleStrip)?,
            textured_quad: Mesh::upload(
                device,
                "textured quad",
                &[textured_quad()],
                Topology::Triangles,
            )?,
        })
    }

    /// The uploaded mesh of `shape`.
    pub fn mesh(&self, shape: Shape) -> &Mesh {
        match shape {
            Shape::FullscreenQuad => &self.fullscreen_quad,
            Shape::Cube => &self.cube,
            Shape::Sphere => &self.sphere,
            Shape::TexturedQuad => &self.textured_quad,
        }
    }

    fn mesh_mut(&mut self, shape: Shape) -> &mut Mesh {
        match shape {
            Shape::FullscreenQuad => &mut self.fullscreen_quad,
            Shape::Cube => &mut self.cube,
            Shape::Sphere => &mut self.sphere,
            Shape::TexturedQuad => &mut self.textured_quad,
        }
    }

    /// Binds `shape` for `program` and issues one indexed draw.
    ///
    /// `program` must already be active.
    pub fn draw(
        &mut self,
        device: &mut dyn GraphicsDevice,
        shape: Shape,
        program: &ShaderProgram,
    ) -> Result<(), ResourceError> {
        let mesh = self.mesh_mut(shape);
        let vertex_array = mesh.binding_for(device, 0, program)?;
        let submesh = &mesh.submeshes[0];
        device.bind_vertex_array(Some(vertex_array))?;
        device.draw_indexed(
            submesh.topology,
            Mesh::INDEX_FORMAT,
            submesh.index_count,
            submesh.index_offset,
        );
        Ok(())
    }

    /// Drops the bindings built for a program that no longer exists.
    pub fn forget_program(&mut self, device: &mut dyn GraphicsDevice, program: ProgramId) -> usize {
        [
            Shape::FullscreenQuad,
            Shape::Cube,
            Shape::Sphere,
            Shape::TexturedQuad,
        ]
        .into_iter()
        .map(|shape| self.mesh_mut(shape).forget_program(device, program))
        .sum()
    }

    /// Releases every mesh.
    pub fn destroy(mut self, device: &mut dyn GraphicsDevice) {
        self.fullscreen_quad.destroy(device);
        self.cube.destroy(device);
        self.sphere.destroy(device);
        self.textured_quad.destroy(device);
    }
}

/// Full-screen passes read the UV at location 1.
fn position_uv_layout() -> VertexBufferLayout {
    VertexBufferLayout::packed(&[(0, 3), (1, 2)])
}

fn fullscreen_quad() -> SubmeshData {
    #[rustfmt::skip]
    let vertices = vec![
        -1.0,  1.0, 0.0, 0.0, 1.0,
        -1.0, -1.0, 0.0, 0.0, 0.0,
         1.0,  1.0, 0.0, 1.0, 1.0,
         1.0, -1.0, 0.0, 1.0, 0.0,
    ];
    SubmeshData {
        name: "fullscreen quad".into(),
        layout: position_uv_layout(),
        vertices,
        indices: vec![0, 1, 2, 3],
        material: None,
    }
}

fn textured_quad() -> SubmeshData {
    #[rustfmt::skip]
    let vertices = vec![
        -0.5, -0.5, 0.0, 0.0, 0.0,
         0.5, -0.5, 0.0, 1.0, 0.0,
         0.5,  0.5, 0.0, 1.0, 1.0,
        -0.5,  0.5, 0.0, 0.0, 1.0,
    ];
    SubmeshData {
        name: "textured quad".into(),
        layout: position_uv_layout(),
        vertices,
        indices: vec![0, 1, 2, 0, 2, 3],
        material: None,
    }
}

fn cube() -> SubmeshData {
    // (normal, s axis, t axis) with s x t == normal, so every face winds counter-clockwise.
    let faces = [
        (Vec3::X, Vec3::NEG_Z, Vec3::Y),
        (Vec3::NEG_X, Vec3::Z, Vec3::Y),
        (Vec3::Y, Vec3::X, Vec3::NEG_Z),
        (Vec3::NEG_Y, Vec3::X, Vec3::Z),
        (Vec3::Z, Vec3::X, Vec3::Y),
        (Vec3::NEG_Z, Vec3::NEG_X, Vec3::Y),
    ];
    let corners = [(-1.0, -1.0), (1.0, -1.0), (1.0, 1.0), (1.0, 1.0), (-1.0, 1.0), (-1.0, -1.0)];

    let mut vertices = Vec::with_capacity(36 * 8);
    for (normal, s_axis, t_axis) in faces {
        for (s, t) in corners {
            let position = (normal + s_axis * s + t_axis * t) * 0.5;
            vertices.extend_from_slice(&position.to_array());
            vertices.extend_from_slice(&normal.to_array());
            vertices.extend_from_slice(&[(s + 1.0) * 0.5, (t + 1.0) * 0.5]);
        }
    }
    SubmeshData {
        name: "cube".into(),
        layout: VertexBufferLayout::packed(&[(0, 3), (1, 3), (2, 2)]),
        vertices,
        indices: (0..36).collect(),
        material: None,
    }
}

fn sphere() -> SubmeshData {
    let columns = SPHERE_RINGS + 1;
    let mut vertices = Vec::with_capacity(((SPHERE_SEGMENTS + 1) * columns * 8) as usize);
    for h in 0..=SPHERE_SEGMENTS {
        for v in 0..=SPHERE_RINGS {
            let u = h as f32 / SPHERE_SEGMENTS as f32;
            let w = v as f32 / SPHERE_RINGS as f32;
            let point = Vec3::new(
                (u * 2.0 * PI).cos() * (w * PI).sin(),
                (w * PI).cos(),
                (u * 2.0 * PI).sin() * (w * PI).sin(),
            );
            vertices.extend_from_slice(&point.to_array());
            vertices.extend_from_slice(&[u, w]);
            vertices.extend_from_slice(&point.to_array());
        }
    }

    // One strip; odd rows walk backwards so consecutive rows stay connected.
    let mut indices = Vec::with_capacity((SPHERE_SEGMENTS * columns * 2) as usize);
    for h in 0..SPHERE_SEGMENTS {
        let row = h * columns;
        let next = (h + 1) * columns;
        if h % 2 == 0 {
            for v in 0..=SPHERE_RINGS {
                indices.extend_from_slice(&[row + v, next + v]);
            }
        } else {
            for v in (0..=SPHERE_RINGS).rev() {
                indices.extend_from_slice(&[next + v, row + v]);
            }
        }
    }

    SubmeshData {
        name: "sphere".into(),
        layout: VertexBufferLayout::packed(&[(0, 3), (1, 2), (2, 3)]),
        vertices,
        indices,
        material: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use tessel_core::renderer::testing::RecordingDevice;
    use tessel_core::renderer::{IndexFormat, VertexInputLayout};
    use tessel_data::assets::ProgramKey;

    fn program(device: &mut RecordingDevice, layout: &[(u32, u8)]) -> ShaderProgram {
        let id = device
            .create_program(&tessel_core::renderer::ProgramSource {
                label: "test".into(),
                vertex: "".into(),
                fragment: "".into(),
            })
            .unwrap()
            .id;
        ShaderProgram {
            key: ProgramKey::new("shaders.glsl", "TEST"),
            id,
            input_layout: VertexInputLayout::new(layout),
            reflected: Vec::new(),
            last_modified: None,
            compile_log: None,
        }
    }

    #[test]
    fn cube_faces_wind_towards_their_normals() {
        let data = cube();
        assert_eq!(data.vertex_count(), 36);
        for triangle in data.vertices.chunks(8 * 3) {
            let p = |i: usize| Vec3::from_slice(&triangle[i * 8..i * 8 + 3]);
            let n = Vec3::from_slice(&triangle[3..6]);
            let winding = (p(1) - p(0)).cross(p(2) - p(0)).normalize();
            assert_relative_eq!(winding.dot(n), 1.0, epsilon = 1e-5);
        }
    }

    #[test]
    fn cube_has_unit_side_length() {
        let data = cube();
        for vertex in data.vertices.chunks(8) {
            for coordinate in &vertex[0..3] {
                assert_relative_eq!(coordinate.abs(), 0.5, epsilon = 1e-6);
            }
        }
    }

    #[test]
    fn sphere_vertices_lie_on_the_unit_sphere() {
        let data = sphere();
        assert_eq!(data.vertex_count() as u32, (SPHERE_SEGMENTS + 1) * (SPHERE_RINGS + 1));
        assert_eq!(data.indices.len() as u32, SPHERE_SEGMENTS * (SPHERE_RINGS + 1) * 2);
        for vertex in data.vertices.chunks(8) {
            assert_relative_eq!(Vec3::from_slice(&vertex[0..3]).length(), 1.0, epsilon = 1e-5);
        }
        let max = *data.indices.iter().max().unwrap();
        assert!((max as usize) < data.vertex_count());
    }

    #[test]
    fn quad_is_drawn_as_a_four_index_strip() {
        let mut device = RecordingDevice::new();
        let mut cache = GeometryCache::new(&mut device).unwrap();
        let light = program(&mut device, &[(0, 3), (1, 2)]);
        device.use_program(Some(light.id)).unwrap();

        cache.draw(&mut device, Shape::FullscreenQuad, &light).unwrap();

        let draws = device.draws();
        assert_eq!(draws.len(), 1);
        assert_eq!(draws[0].topology, Topology::TriangleStrip);
        assert_eq!(draws[0].index_format, Some(IndexFormat::Uint32));
        assert_eq!(draws[0].count, 4);
    }

    #[test]
    fn repeated_draws_reuse_one_binding() {
        let mut device = RecordingDevice::new();
        let mut cache = GeometryCache::new(&mut device).unwrap();
        let gizmo = program(&mut device, &[(0, 3)]);
        device.use_program(Some(gizmo.id)).unwrap();
        let before = device.vertex_array_count();

        for _ in 0..3 {
            cache.draw(&mut device, Shape::Sphere, &gizmo).unwrap();
            cache.draw(&mut device, Shape::Cube, &gizmo).unwrap();
        }

        assert_eq!(device.vertex_array_count(), before + 2);
        assert_eq!(cache.forget_program(&mut device, gizmo.id), 2);
        assert_eq!(device.vertex_array_count(), before);
    }
}
