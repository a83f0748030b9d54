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

//! Uploaded geometry and the per-submesh vertex-binding cache.

use super::ShaderProgram;
use tessel_core::asset::SubmeshData;
use tessel_core::renderer::{
    BufferDescriptor, BufferId, BufferKind, BufferUsageHint, GraphicsDevice, IndexFormat,
    ProgramId, ResourceError, Topology, VertexArrayDescriptor, VertexArrayId,
    VertexAttributeBinding, VertexBufferLayout,
};

/// GPU state linking one submesh's vertices to one program's inputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VertexBinding {
    /// The program the binding was built for.
    pub program: ProgramId,
    /// The vertex array.
    pub vertex_array: VertexArrayId,
}

/// One drawable index range inside a [`Mesh`]'s shared buffers.
#[derive(Debug, Clone)]
pub struct Submesh {
    /// Name, for logs.
    pub name: String,
    /// Interleaved layout of this submesh's vertices.
    pub layout: VertexBufferLayout,
    /// Byte offset of the first vertex in the shared vertex buffer.
    pub vertex_offset: u64,
    /// Byte offset of the first index in the shared index buffer.
    pub index_offset: u64,
    /// Number of indices to draw.
    pub index_count: u32,
    /// Number of vertices.
    pub vertex_count: u32,
    /// Primitive topology of the index list.
    pub topology: Topology,
    /// Index into the owning model's materials, if any.
    pub material: Option<usize>,
    bindings: Vec<VertexBinding>,
}

impl Submesh {
    /// The bindings created so far, in creation order.
    pub fn bindings(&self) -> &[VertexBinding] {
        &self.bindings
    }

    fn find_binding(&self, program: ProgramId) -> Option<VertexArrayId> {
        self.bindings
            .iter()
            .find(|b| b.program == program)
            .map(|b| b.vertex_array)
    }

    /// Joins the program's declared inputs with this submesh's layout.
    fn attribute_bindings(
        &self,
        program: &ShaderProgram,
    ) -> Result<Vec<VertexAttributeBinding>, ResourceError> {
        program
            .input_layout
            .attributes
            .iter()
            .map(|input| {
                let attr = self.layout.find(input.location).ok_or_else(|| {
                    ResourceError::MissingVertexAttribute {
                        submesh: self.name.clone(),
                        program: program.key.label(),
                        location: input.location,
                    }
                })?;
                Ok(VertexAttributeBinding {
                    location: input.location,
                    components: attr.components,
                    offset: self.vertex_offset + attr.offset as u64,
                })
            })
            .collect()
    }
}

/// Geometry whose submeshes share one vertex buffer and one index buffer.
#[derive(Debug)]
pub struct Mesh {
    /// Debug label.
    pub label: String,
    /// The shared vertex buffer.
    pub vertex_buffer: BufferId,
    /// The shared `u32` index buffer.
    pub index_buffer: BufferId,
    /// The submeshes, in upload order.
    pub submeshes: Vec<Submesh>,
}

impl Mesh {
    /// Index type of every mesh.
    pub const INDEX_FORMAT: IndexFormat = IndexFormat::Uint32;

    /// Packs every submesh into a shared vertex buffer and a shared index buffer.
    ///
    /// Indices stay local to their submesh; the vertex offset is folded into
    /// the attribute pointers when a binding is created.
    pub fn upload(
        device: &mut dyn GraphicsDevice,
        label: &str,
        submeshes: &[SubmeshData],
        topology: Topology,
    ) -> Result<Self, ResourceError> {
        let mut vertices: Vec<u8> = Vec::new();
        let mut indices: Vec<u8> = Vec::new();
        let mut placed = Vec::with_capacity(submeshes.len());

        for data in submeshes {
            let vertex_offset = vertices.len() as u64;
            let index_offset = indices.len() as u64;
            vertices.extend_from_slice(bytemuck::cast_slice(&data.vertices));
            indices.extend_from_slice(bytemuck::cast_slice(&data.indices));
            placed.push(Submesh {
                name: data.name.clone(),
                layout: data.layout.clone(),
                vertex_offset,
                index_offset,
                index_count: data.indices.len() as u32,
                vertex_count: data.vertex_count() as u32,
                topology,
                material: data.material,
                bindings: Vec::new(),
            });
        }

        if vertices.is_empty() || indices.is_empty() {
            return Err(ResourceError::UnsupportedFormat(format!(
                "mesh '{label}' has no indexed geometry"
            )));
        }

        let vertex_buffer = device.create_buffer(
            &BufferDescriptor {
                label: Some(format!("{label} vertices").into()),
                kind: BufferKind::Vertex,
                size: vertices.len() as u64,
                usage: BufferUsageHint::Static,
            },
            Some(&vertices),
        )?;
        let index_buffer = device.create_buffer(
            &BufferDescriptor {
                label: Some(format!("{label} indices").into()),
                kind: BufferKind::Index,
                size: indices.len() as u64,
                usage: BufferUsageHint::Static,
            },
            Some(&indices),
        )?;

        log::debug!(
            "Uploaded mesh '{label}': {} submeshes, {} vertex bytes, {} index bytes",
            placed.len(),
            vertices.len(),
            indices.len()
        );

        Ok(Self {
            label: label.to_string(),
            vertex_buffer,
            index_buffer,
            submeshes: placed,
        })
    }

    /// Returns the vertex binding of `submesh` for `program`, creating it on
    /// first use.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::InvalidHandle`] for an unknown submesh index and
    /// [`ResourceError::MissingVertexAttribute`] when the program consumes a
    /// location the submesh does not provide. The latter is a content error and
    /// also trips a debug assertion.
    pub fn binding_for(
        &mut self,
        device: &mut dyn GraphicsDevice,
        submesh: usize,
        program: &ShaderProgram,
    ) -> Result<VertexArrayId, ResourceError> {
        let vertex_buffer = self.vertex_buffer;
        let index_buffer = self.index_buffer;
        let sub = self
            .submeshes
            .get_mut(submesh)
            .ok_or(ResourceError::InvalidHandle)?;

        if let Some(existing) = sub.find_binding(program.id) {
            return Ok(existing);
        }

        let attributes = match sub.attribute_bindings(program) {
            Ok(attributes) => attributes,
            Err(err) => {
                log::error!("{err}");
                debug_assert!(false, "{err}");
                return Err(err);
            }
        };

        let vertex_array = device.create_vertex_array(&VertexArrayDescriptor {
            label: Some(format!("{}/{}", sub.name, program.key.label()).into()),
            vertex_buffer,
            index_buffer: Some(index_buffer),
            stride: sub.layout.stride,
            attributes: attributes.into(),
        })?;
        sub.bindings.push(VertexBinding {
            program: program.id,
            vertex_array,
        });
        log::debug!(
            "Created vertex binding for '{}' with {}",
            sub.name,
            program.key.label()
        );
        Ok(vertex_array)
    }

    /// Drops every binding built for `program`, returning how many were destroyed.
    pub fn forget_program(&mut self, device: &mut dyn GraphicsDevice, program: ProgramId) -> usize {
        let mut removed = 0;
        for sub in &mut self.submeshes {
            sub.bindings.retain(|binding| {
                if binding.program != program {
                    return true;
                }
                if let Err(e) = device.destroy_vertex_array(binding.vertex_array) {
                    log::warn!("Failed to destroy vertex array: {e}");
                }
                removed += 1;
                false
            });
        }
        removed
    }

    /// Releases the buffers and every vertex binding.
    pub fn destroy(&mut self, device: &mut dyn GraphicsDevice) {
        for sub in &mut self.submeshes {
            for binding in sub.bindings.drain(..) {
                let _ = device.destroy_vertex_array(binding.vertex_array);
            }
        }
        let _ = device.destroy_buffer(self.vertex_buffer);
        let _ = device.destroy_buffer(self.index_buffer);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::ProgramKey;
    use tessel_core::renderer::testing::RecordingDevice;
    use tessel_core::renderer::{ProgramSource, VertexInputLayout};

    fn quad(name: &str, layout: &[(u32, u8)]) -> SubmeshData {
        let layout = VertexBufferLayout::packed(layout);
        let floats = layout.floats_per_vertex();
        SubmeshData {
            name: name.to_string(),
            layout,
            vertices: vec![0.5; floats * 4],
            indices: vec![0, 1, 2, 2, 3, 0],
            material: None,
        }
    }

    fn program(device: &mut RecordingDevice, variant: &str, inputs: &[(u32, u8)]) -> ShaderProgram {
        let id = device
            .create_program(&ProgramSource {
                label: variant.into(),
                vertex: "".into(),
                fragment: "".into(),
            })
            .unwrap()
            .id;
        ShaderProgram {
            key: ProgramKey::new("shaders.glsl", variant),
            id,
            input_layout: VertexInputLayout::new(inputs),
            reflected: Vec::new(),
            last_modified: None,
            compile_log: None,
        }
    }

    #[test]
    fn submeshes_share_buffers_with_stable_offsets() {
        let mut device = RecordingDevice::new();
        let mesh = Mesh::upload(
            &mut device,
            "pair",
            &[quad("a", &[(0, 3), (1, 3), (2, 2)]), quad("b", &[(0, 3), (2, 2)])],
            Topology::Triangles,
        )
        .unwrap();

        assert_eq!(mesh.submeshes[0].vertex_offset, 0);
        assert_eq!(mesh.submeshes[1].vertex_offset, 4 * 32);
        assert_eq!(mesh.submeshes[1].index_offset, 6 * 4);
        assert_eq!(mesh.submeshes[1].index_count, 6);
        assert_eq!(device.buffer_count(), 2);
        assert_eq!(
            device.buffer_contents(mesh.vertex_buffer).map(<[u8]>::len),
            Some(4 * 32 + 4 * 20)
        );
    }

    #[test]
    fn binding_is_created_once_per_program() {
        let mut device = RecordingDevice::new();
        let mut mesh = Mesh::upload(
            &mut device,
            "quad",
            &[quad("q", &[(0, 3), (1, 3), (2, 2)])],
            Topology::Triangles,
        )
        .unwrap();
        let textured = program(&mut device, "SHOW_TEXTURED_MESH", &[(0, 3), (1, 3), (2, 2)]);
        let gizmo = program(&mut device, "DRAW_LIGHT", &[(0, 3)]);

        let first = mesh.binding_for(&mut device, 0, &textured).unwrap();
        for _ in 0..5 {
            assert_eq!(mesh.binding_for(&mut device, 0, &textured).unwrap(), first);
        }
        let other = mesh.binding_for(&mut device, 0, &gizmo).unwrap();

        assert_ne!(first, other);
        assert_eq!(device.vertex_array_count(), 2);
        assert_eq!(mesh.submeshes[0].bindings().len(), 2);
    }

    #[test]
    fn attribute_offsets_include_submesh_placement() {
        let mut device = RecordingDevice::new();
        let mut mesh = Mesh::upload(
            &mut device,
            "pair",
            &[quad("a", &[(0, 3)]), quad("b", &[(0, 3), (2, 2)])],
            Topology::Triangles,
        )
        .unwrap();
        let uv_only = program(&mut device, "UV", &[(2, 2)]);

        let vao = mesh.binding_for(&mut device, 1, &uv_only).unwrap();
        let record = device.vertex_array(vao).unwrap();

        assert_eq!(record.stride, 20);
        assert_eq!(record.index_buffer, Some(mesh.index_buffer));
        assert_eq!(record.attributes.len(), 1);
        assert_eq!(record.attributes[0].offset, 4 * 12 + 12);
        assert_eq!(record.attributes[0].components, 2);
    }

    #[test]
    fn forgetting_a_program_destroys_its_bindings() {
        let mut device = RecordingDevice::new();
        let mut mesh =
            Mesh::upload(&mut device, "q", &[quad("q", &[(0, 3)])], Topology::Triangles).unwrap();
        let gizmo = program(&mut device, "DRAW_LIGHT", &[(0, 3)]);
        mesh.binding_for(&mut device, 0, &gizmo).unwrap();

        assert_eq!(mesh.forget_program(&mut device, gizmo.id), 1);
        assert_eq!(device.vertex_array_count(), 0);
        assert!(mesh.submeshes[0].bindings().is_empty());
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "no vertex attribute at location 3")]
    fn missing_attribute_asserts_in_debug_builds() {
        let mut device = RecordingDevice::new();
        let submesh = quad("q", &[(0, 3), (1, 3), (2, 2)]);
        let mut mesh = Mesh::upload(&mut device, "q", &[submesh], Topology::Triangles).unwrap();
        let geometry = program(
            &mut device,
            "SHOW_GEOMETRY",
            &[(0, 3), (1, 3), (2, 2), (3, 3), (4, 3)],
        );
        let _ = mesh.binding_for(&mut device, 0, &geometry);
    }

    #[test]
    fn empty_geometry_is_rejected() {
        let mut device = RecordingDevice::new();
        let result = Mesh::upload(&mut device, "empty", &[], Topology::Triangles);
        assert!(matches!(result, Err(ResourceError::UnsupportedFormat(_))));
        assert_eq!(device.buffer_count(), 0);
    }
}
