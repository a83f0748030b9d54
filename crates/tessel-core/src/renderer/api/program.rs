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

//! Shader program sources, reflection data and uniform values.

use crate::math::{Mat4, Vec3};
use std::borrow::Cow;

/// Fixed uniform-block binding points every shader variant honours.
pub mod bindings {
    /// Binding point of the per-frame camera and lights block.
    pub const GLOBAL_PARAMS: u32 = 0;
    /// Binding point of the per-entity transform block.
    pub const LOCAL_PARAMS: u32 = 1;
    /// Name of the global block in shader source.
    pub const GLOBAL_PARAMS_BLOCK: &str = "GlobalParams";
    /// Name of the local block in shader source.
    pub const LOCAL_PARAMS_BLOCK: &str = "LocalParams";
}

/// An opaque handle to a linked GPU program.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ProgramId(pub usize);

/// A programmable pipeline stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShaderStage {
    /// The vertex stage.
    Vertex,
    /// The fragment stage.
    Fragment,
}

impl ShaderStage {
    /// The preprocessor symbol defined when compiling this stage.
    pub const fn define(self) -> &'static str {
        match self {
            ShaderStage::Vertex => "VERTEX",
            ShaderStage::Fragment => "FRAGMENT",
        }
    }
}

/// Fully composed vertex and fragment sources for one program.
#[derive(Debug, Clone)]
pub struct ProgramSource<'a> {
    /// A label used in logs, e.g. `shaders.glsl[SHOW_GEOMETRY]`.
    pub label: Cow<'a, str>,
    /// The complete vertex stage source, including the version directive.
    pub vertex: Cow<'a, str>,
    /// The complete fragment stage source, including the version directive.
    pub fragment: Cow<'a, str>,
}

/// A vertex input reported by the driver after linking.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveAttribute {
    /// The attribute's name in the vertex stage.
    pub name: String,
    /// The bound location.
    pub location: u32,
    /// Float component count (1 to 4).
    pub components: u8,
}

/// The outcome of [`GraphicsDevice::create_program`](crate::renderer::GraphicsDevice::create_program).
///
/// A program handle is returned even when a stage failed to compile or the
/// link failed; the logs describe what went wrong.
#[derive(Debug, Clone)]
pub struct ProgramCompilation {
    /// The program handle. May be non-functional if any log is present.
    pub id: ProgramId,
    /// The vertex stage compile log, if compilation failed.
    pub vertex_log: Option<String>,
    /// The fragment stage compile log, if compilation failed.
    pub fragment_log: Option<String>,
    /// The link log, if linking failed.
    pub link_log: Option<String>,
    /// The active vertex inputs, sorted by location.
    pub attributes: Vec<ActiveAttribute>,
}

impl ProgramCompilation {
    /// Returns `true` if both stages compiled and the program linked.
    pub fn succeeded(&self) -> bool {
        self.vertex_log.is_none() && self.fragment_log.is_none() && self.link_log.is_none()
    }

    /// Concatenates every failure log into one message.
    pub fn error_summary(&self) -> Option<String> {
        let parts: Vec<String> = [
            ("vertex", &self.vertex_log),
            ("fragment", &self.fragment_log),
            ("link", &self.link_log),
        ]
        .iter()
        .filter_map(|(what, log)| log.as_ref().map(|l| format!("{what}: {}", l.trim_end())))
        .collect();
        if parts.is_empty() {
            None
        } else {
            Some(parts.join("\n"))
        }
    }
}

/// A value for a plain (non-block) uniform.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UniformValue {
    /// `int` or `sampler2D` unit.
    Int(i32),
    /// `bool`, uploaded as an int.
    Bool(bool),
    /// `vec3`.
    Vec3(Vec3),
    /// `mat4`, column-major.
    Mat4(Mat4),
}
