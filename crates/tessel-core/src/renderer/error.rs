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

//! Defines the hierarchy of error types for the rendering subsystem.

use crate::renderer::api::buffer::BufferId;
use std::fmt;

/// An error related to loading, compiling or linking a shader program.
#[derive(Debug)]
pub enum ShaderError {
    /// An error occurred while trying to load the shader source from a path.
    LoadError {
        /// The path of the file that failed to load.
        path: String,
        /// The underlying I/O or source error.
        source_error: String,
    },
    /// One stage failed to compile.
    CompilationError {
        /// A descriptive label for the shader, usually `path[VARIANT]`.
        label: String,
        /// Detailed error messages from the shader compiler.
        details: String,
    },
    /// The program failed to link.
    LinkError {
        /// A descriptive label for the program.
        label: String,
        /// Detailed error messages from the linker.
        details: String,
    },
}

impl fmt::Display for ShaderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShaderError::LoadError { path, source_error } => {
                write!(
                    f,
                    "Failed to load shader source from '{path}': {source_error}"
                )
            }
            ShaderError::CompilationError { label, details } => {
                write!(f, "Shader compilation failed for '{label}': {details}")
            }
            ShaderError::LinkError { label, details } => {
                write!(f, "Program link failed for '{label}': {details}")
            }
        }
    }
}

impl std::error::Error for ShaderError {}

/// An error related to the creation or use of a GPU resource (buffers, textures, etc.).
#[derive(Debug)]
pub enum ResourceError {
    /// A shader-specific error occurred.
    Shader(ShaderError),
    /// The handle or ID used to reference a resource is invalid.
    InvalidHandle,
    /// The pixel or vertex format is not one the renderer can upload.
    UnsupportedFormat(String),
    /// An error originating from the specific graphics backend implementation.
    BackendError(String),
    /// An attempt was made to access a resource out of its bounds (e.g., in a buffer).
    OutOfBounds,
    /// A program consumes a vertex attribute the submesh does not provide.
    MissingVertexAttribute {
        /// The submesh being bound.
        submesh: String,
        /// The program's label.
        program: String,
        /// The attribute location the submesh lacks.
        location: u32,
    },
}

impl fmt::Display for ResourceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResourceError::Shader(err) => write!(f, "Shader resource error: {err}"),
            ResourceError::InvalidHandle => write!(f, "Invalid resource handle or ID."),
            ResourceError::UnsupportedFormat(msg) => write!(f, "Unsupported format: {msg}"),
            ResourceError::BackendError(msg) => {
                write!(f, "Backend-specific resource error: {msg}")
            }
            ResourceError::OutOfBounds => {
                write!(f, "Resource access out of bounds.")
            }
            ResourceError::MissingVertexAttribute {
                submesh,
                program,
                location,
            } => write!(
                f,
                "Submesh '{submesh}' has no vertex attribute at location {location}, required by '{program}'"
            ),
        }
    }
}

impl std::error::Error for ResourceError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ResourceError::Shader(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ShaderError> for ResourceError {
    fn from(err: ShaderError) -> Self {
        ResourceError::Shader(err)
    }
}

/// A misuse of the [`UniformArena`](crate::renderer::api::uniform_arena::UniformArena)
/// write cycle.
#[derive(Debug)]
pub enum ArenaError {
    /// A push, align or `end_write` happened outside of a `begin_write`/`end_write` pair.
    NotMapped,
    /// `begin_write` was called while a write cycle was already open.
    AlreadyMapped,
    /// A write would run past the end of the backing buffer.
    Overflow {
        /// The offset the write would have started at.
        offset: u32,
        /// The number of bytes requested.
        size: u32,
        /// The total capacity of the arena.
        capacity: u32,
    },
    /// The device refused to map, write or unmap the backing buffer.
    Device {
        /// The backing buffer.
        buffer: BufferId,
        /// The device's error.
        source: ResourceError,
    },
}

impl fmt::Display for ArenaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArenaError::NotMapped => write!(f, "Uniform arena is not mapped for writing."),
            ArenaError::AlreadyMapped => {
                write!(f, "Uniform arena is already mapped; call end_write first.")
            }
            ArenaError::Overflow {
                offset,
                size,
                capacity,
            } => write!(
                f,
                "Uniform arena overflow: {size} bytes at offset {offset} exceeds capacity {capacity}"
            ),
            ArenaError::Device { buffer, source } => {
                write!(f, "Uniform arena buffer {buffer:?} failed: {source}")
            }
        }
    }
}

impl std::error::Error for ArenaError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ArenaError::Device { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// A high-level error that can occur while rendering a frame.
#[derive(Debug)]
pub enum RenderError {
    /// An operation was attempted before the renderer was set up.
    NotInitialized,
    /// An error occurred while managing a GPU resource.
    ResourceError(ResourceError),
    /// The per-frame uniform arena was misused or overflowed.
    Arena(ArenaError),
}

impl fmt::Display for RenderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RenderError::NotInitialized => {
                write!(f, "The renderer is not initialized.")
            }
            RenderError::ResourceError(err) => {
                write!(f, "Graphics resource operation failed: {err}")
            }
            RenderError::Arena(err) => write!(f, "Uniform upload failed: {err}"),
        }
    }
}

impl std::error::Error for RenderError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RenderError::ResourceError(err) => Some(err),
            RenderError::Arena(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ResourceError> for RenderError {
    fn from(err: ResourceError) -> Self {
        RenderError::ResourceError(err)
    }
}

impl From<ArenaError> for RenderError {
    fn from(err: ArenaError) -> Self {
        RenderError::Arena(err)
    }
}

#[cfg(test)]
mod tests {
    use std::error::Error;

    use super::*;

    #[test]
    fn shader_error_display() {
        let err = ShaderError::LoadError {
            path: "assets/shaders/shaders.glsl".to_string(),
            source_error: "File not found".to_string(),
        };
        assert_eq!(
            format!("{err}"),
            "Failed to load shader source from 'assets/shaders/shaders.glsl': File not found"
        );

        let err_link = ShaderError::LinkError {
            label: "shaders.glsl[SHOW_LIGHT]".to_string(),
            details: "varying mismatch".to_string(),
        };
        assert_eq!(
            format!("{err_link}"),
            "Program link failed for 'shaders.glsl[SHOW_LIGHT]': varying mismatch"
        );
    }

    #[test]
    fn render_error_chains_arena_and_device_errors() {
        let arena_err = ArenaError::Device {
            buffer: BufferId(3),
            source: ResourceError::InvalidHandle,
        };
        let render_err: RenderError = arena_err.into();
        assert_eq!(
            format!("{render_err}"),
            "Uniform upload failed: Uniform arena buffer BufferId(3) failed: Invalid resource handle or ID."
        );
        let arena = render_err.source().unwrap();
        assert!(arena.source().is_some());
    }

    #[test]
    fn shader_errors_convert_into_resource_errors() {
        let err: ResourceError = ShaderError::CompilationError {
            label: "shaders.glsl[SHOW_GEOMETRY] (fragment)".to_string(),
            details: "0:12: undeclared identifier".to_string(),
        }
        .into();
        assert!(matches!(err, ResourceError::Shader(ShaderError::CompilationError { .. })));
        assert_eq!(
            format!("{err}"),
            "Shader resource error: Shader compilation failed for 'shaders.glsl[SHOW_GEOMETRY] (fragment)': 0:12: undeclared identifier"
        );
        assert!(err.source().is_some());
    }

    #[test]
    fn overflow_reports_offsets() {
        let err = ArenaError::Overflow {
            offset: 240,
            size: 64,
            capacity: 256,
        };
        assert_eq!(
            format!("{err}"),
            "Uniform arena overflow: 64 bytes at offset 240 exceeds capacity 256"
        );
    }
}
