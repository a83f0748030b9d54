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

//! Vertex layouts on both sides of a vertex binding.
//!
//! A submesh describes what it *provides* with a [`VertexBufferLayout`]; a
//! program describes what it *consumes* with a [`VertexInputLayout`]. A vertex
//! array ([`VertexArrayDescriptor`]) is the join of the two.

use super::buffer::BufferId;
use std::borrow::Cow;

/// An opaque handle to a GPU vertex array object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VertexArrayId(pub usize);

/// Conventional attribute locations shared by every shader variant.
pub mod locations {
    /// `vec3` position.
    pub const POSITION: u32 = 0;
    /// `vec3` normal.
    pub const NORMAL: u32 = 1;
    /// `vec2` texture coordinates.
    pub const UV: u32 = 2;
    /// `vec3` tangent.
    pub const TANGENT: u32 = 3;
    /// `vec3` bitangent.
    pub const BITANGENT: u32 = 4;
}

/// One float attribute inside an interleaved vertex.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VertexBufferAttribute {
    /// The shader location this attribute feeds.
    pub location: u32,
    /// Number of `f32` components.
    pub components: u8,
    /// Byte offset within one vertex.
    pub offset: u32,
}

/// The interleaved layout of a submesh's vertices.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct VertexBufferLayout {
    /// Attributes in the order they appear in memory.
    pub attributes: Vec<VertexBufferAttribute>,
    /// Size of one vertex in bytes.
    pub stride: u32,
}

impl VertexBufferLayout {
    /// Builds a tightly packed float layout from `(location, components)` pairs.
    pub fn packed(attributes: &[(u32, u8)]) -> Self {
        let mut offset = 0;
        let attributes = attributes
            .iter()
            .map(|&(location, components)| {
                let attr = VertexBufferAttribute {
                    location,
                    components,
                    offset,
                };
                offset += components as u32 * 4;
                attr
            })
            .collect();
        Self {
            attributes,
            stride: offset,
        }
    }

    /// Finds the attribute bound to `location`.
    pub fn find(&self, location: u32) -> Option<&VertexBufferAttribute> {
        self.attributes.iter().find(|a| a.location == location)
    }

    /// Number of floats per vertex.
    pub fn floats_per_vertex(&self) -> usize {
        self.stride as usize / 4
    }
}

/// One input a program's vertex stage consumes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VertexInputAttribute {
    /// The shader location.
    pub location: u32,
    /// Number of `f32` components.
    pub components: u8,
}

/// The ordered set of vertex inputs a program declares. Immutable once the
/// program is created.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct VertexInputLayout {
    /// The inputs, in declaration order.
    pub attributes: Vec<VertexInputAttribute>,
}

impl VertexInputLayout {
    /// Builds a layout from `(location, components)` pairs.
    pub fn new(attributes: &[(u32, u8)]) -> Self {
        Self {
            attributes: attributes
                .iter()
                .map(|&(location, components)| VertexInputAttribute {
                    location,
                    components,
                })
                .collect(),
        }
    }
}

/// One attribute pointer of a vertex array.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VertexAttributeBinding {
    /// The shader location.
    pub location: u32,
    /// Number of `f32` components.
    pub components: u8,
    /// Absolute byte offset of the first element in the vertex buffer.
    pub offset: u64,
}

/// A descriptor used to create a [`VertexArrayId`].
#[derive(Debug, Clone)]
pub struct VertexArrayDescriptor<'a> {
    /// An optional debug label.
    pub label: Option<Cow<'a, str>>,
    /// The buffer the attributes read from.
    pub vertex_buffer: BufferId,
    /// The element buffer recorded into the vertex array, if any.
    pub index_buffer: Option<BufferId>,
    /// Byte distance between consecutive vertices.
    pub stride: u32,
    /// The enabled attributes.
    pub attributes: Cow<'a, [VertexAttributeBinding]>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn packed_layout_computes_offsets_and_stride() {
        let layout = VertexBufferLayout::packed(&[(0, 3), (2, 2), (1, 3)]);
        assert_eq!(layout.stride, 32);
        assert_eq!(layout.find(2).map(|a| a.offset), Some(12));
        assert_eq!(layout.find(1).map(|a| a.offset), Some(20));
        assert!(layout.find(3).is_none());
        assert_eq!(layout.floats_per_vertex(), 8);
    }
}
