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

use eframe::glow;

use tessel_core::renderer::api::{
    BlitMask, BufferKind, BufferUsageHint, FilterMode, FramebufferStatus, IndexFormat,
    TextureFormat, Topology, WrapMode,
};

/// A local extension trait to convert our engine's types into GL enums.
/// This avoids Rust's orphan rules while keeping an idiomatic `.into_gl()` syntax.
pub trait IntoGl<T> {
    /// Consumes self and converts it into a GL-compatible value.
    fn into_gl(self) -> T;
}

/// The three enums `glTexImage2D` needs for one texel format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GlTextureFormat {
    pub internal_format: i32,
    pub format: u32,
    pub ty: u32,
}

// --- Textures ---

impl IntoGl<GlTextureFormat> for TextureFormat {
    fn into_gl(self) -> GlTextureFormat {
        let (internal, format, ty) = match self {
            TextureFormat::Rgb8 => (glow::RGB8, glow::RGB, glow::UNSIGNED_BYTE),
            TextureFormat::Rgba8 => (glow::RGBA8, glow::RGBA, glow::UNSIGNED_BYTE),
            TextureFormat::Rgba16Float => (glow::RGBA16F, glow::RGBA, glow::HALF_FLOAT),
            TextureFormat::Depth24 => (
                glow::DEPTH_COMPONENT24,
                glow::DEPTH_COMPONENT,
                glow::UNSIGNED_INT,
            ),
        };
        GlTextureFormat {
            internal_format: internal as i32,
            format,
            ty,
        }
    }
}

impl IntoGl<u32> for FilterMode {
    fn into_gl(self) -> u32 {
        match self {
            FilterMode::Nearest => glow::NEAREST,
            FilterMode::Linear => glow::LINEAR,
            FilterMode::LinearMipmapLinear => glow::LINEAR_MIPMAP_LINEAR,
        }
    }
}

impl IntoGl<u32> for WrapMode {
    fn into_gl(self) -> u32 {
        match self {
            WrapMode::ClampToEdge => glow::CLAMP_TO_EDGE,
            WrapMode::Repeat => glow::REPEAT,
        }
    }
}

// --- Buffers ---

impl IntoGl<u32> for BufferKind {
    fn into_gl(self) -> u32 {
        match self {
            BufferKind::Vertex => glow::ARRAY_BUFFER,
            BufferKind::Index => glow::ELEMENT_ARRAY_BUFFER,
            BufferKind::Uniform => glow::UNIFORM_BUFFER,
        }
    }
}

impl IntoGl<u32> for BufferUsageHint {
    fn into_gl(self) -> u32 {
        match self {
            BufferUsageHint::Static => glow::STATIC_DRAW,
            BufferUsageHint::Stream => glow::STREAM_DRAW,
        }
    }
}

impl IntoGl<u32> for IndexFormat {
    fn into_gl(self) -> u32 {
        match self {
            IndexFormat::Uint16 => glow::UNSIGNED_SHORT,
            IndexFormat::Uint32 => glow::UNSIGNED_INT,
        }
    }
}

// --- Drawing ---

impl IntoGl<u32> for Topology {
    fn into_gl(self) -> u32 {
        match self {
            Topology::Triangles => glow::TRIANGLES,
            Topology::TriangleStrip => glow::TRIANGLE_STRIP,
        }
    }
}

impl IntoGl<u32> for BlitMask {
    fn into_gl(self) -> u32 {
        match self {
            BlitMask::Color => glow::COLOR_BUFFER_BIT,
            BlitMask::Depth => glow::DEPTH_BUFFER_BIT,
        }
    }
}

/// Maps a `glCheckFramebufferStatus` result to its engine-side name.
pub fn framebuffer_status_from_gl(status: u32) -> FramebufferStatus {
    match status {
        glow::FRAMEBUFFER_COMPLETE => FramebufferStatus::Complete,
        glow::FRAMEBUFFER_UNDEFINED => FramebufferStatus::Undefined,
        glow::FRAMEBUFFER_INCOMPLETE_ATTACHMENT => FramebufferStatus::IncompleteAttachment,
        glow::FRAMEBUFFER_INCOMPLETE_MISSING_ATTACHMENT => FramebufferStatus::MissingAttachment,
        glow::FRAMEBUFFER_INCOMPLETE_DRAW_BUFFER => FramebufferStatus::IncompleteDrawBuffer,
        glow::FRAMEBUFFER_INCOMPLETE_READ_BUFFER => FramebufferStatus::IncompleteReadBuffer,
        glow::FRAMEBUFFER_UNSUPPORTED => FramebufferStatus::Unsupported,
        glow::FRAMEBUFFER_INCOMPLETE_MULTISAMPLE => FramebufferStatus::IncompleteMultisample,
        glow::FRAMEBUFFER_INCOMPLETE_LAYER_TARGETS => FramebufferStatus::IncompleteLayerTargets,
        glow::FRAMEBUFFER_INCOMPLETE_DIMENSIONS => FramebufferStatus::IncompleteDimensions,
        other => FramebufferStatus::Unknown(other),
    }
}

/// Number of float components of an active attribute's GLSL type, if it is
/// a float vector the vertex binding cache can feed.
pub fn attribute_components(gl_type: u32) -> Option<u8> {
    match gl_type {
        glow::FLOAT => Some(1),
        glow::FLOAT_VEC2 => Some(2),
        glow::FLOAT_VEC3 => Some(3),
        glow::FLOAT_VEC4 => Some(4),
        _ => None,
    }
}

/// The colour attachment enum for attachment index `index`.
pub fn color_attachment(index: u32) -> u32 {
    glow::COLOR_ATTACHMENT0 + index
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn framebuffer_statuses_map_to_their_names() {
        assert_eq!(
            framebuffer_status_from_gl(glow::FRAMEBUFFER_COMPLETE),
            FramebufferStatus::Complete
        );
        assert_eq!(
            framebuffer_status_from_gl(glow::FRAMEBUFFER_INCOMPLETE_MULTISAMPLE),
            FramebufferStatus::IncompleteMultisample
        );
        assert_eq!(
            framebuffer_status_from_gl(glow::FRAMEBUFFER_INCOMPLETE_DIMENSIONS),
            FramebufferStatus::IncompleteDimensions
        );
        assert_eq!(framebuffer_status_from_gl(0x1234), FramebufferStatus::Unknown(0x1234));
    }

    #[test]
    fn depth_textures_upload_as_depth_components() {
        let depth: GlTextureFormat = TextureFormat::Depth24.into_gl();
        assert_eq!(depth.internal_format, glow::DEPTH_COMPONENT24 as i32);
        assert_eq!(depth.format, glow::DEPTH_COMPONENT);

        let rgb: GlTextureFormat = TextureFormat::Rgb8.into_gl();
        assert_eq!(rgb.format, glow::RGB);
        assert_eq!(rgb.ty, glow::UNSIGNED_BYTE);
    }

    #[test]
    fn only_float_vectors_are_bindable_attributes() {
        assert_eq!(attribute_components(glow::FLOAT_VEC3), Some(3));
        assert_eq!(attribute_components(glow::FLOAT), Some(1));
        assert_eq!(attribute_components(glow::INT), None);
        assert_eq!(attribute_components(glow::FLOAT_MAT4), None);
    }

    #[test]
    fn attachments_are_numbered_from_color0() {
        assert_eq!(color_attachment(0), glow::COLOR_ATTACHMENT0);
        assert_eq!(color_attachment(3), glow::COLOR_ATTACHMENT3);
        let filter: u32 = FilterMode::LinearMipmapLinear.into_gl();
        assert_eq!(filter, glow::LINEAR_MIPMAP_LINEAR);
    }
}
