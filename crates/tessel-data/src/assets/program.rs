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

use std::path::{Path, PathBuf};
use std::time::SystemTime;
use tessel_core::renderer::{
    bindings, ActiveAttribute, GraphicsDevice, ProgramCompilation, ProgramId, ProgramSource,
    ResourceError, ShaderError, ShaderStage, VertexInputLayout,
};

/// The version directive prepended to every stage.
pub const GLSL_VERSION_DIRECTIVE: &str = "#version 430\n";

/// Builds one stage's source: version directive, variant switch, stage switch, body.
pub fn compose_stage_source(variant: &str, stage: ShaderStage, body: &str) -> String {
    format!(
        "{GLSL_VERSION_DIRECTIVE}#define {variant}\n#define {}\n{body}",
        stage.define()
    )
}

/// The identity of a program: one source file plus one variant switch.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ProgramKey {
    /// The shader family file.
    pub path: PathBuf,
    /// The `#define` selecting the variant.
    pub variant: String,
}

impl ProgramKey {
    /// Creates a key.
    pub fn new(path: impl Into<PathBuf>, variant: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            variant: variant.into(),
        }
    }

    /// A label of the form `file[VARIANT]` for logs.
    pub fn label(&self) -> String {
        let file = self
            .path
            .file_name()
            .map(|f| f.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path.display().to_string());
        format!("{file}[{}]", self.variant)
    }
}

/// A linked program variant held by the cache.
#[derive(Debug, Clone)]
pub struct ShaderProgram {
    /// The cache identity.
    pub key: ProgramKey,
    /// The GPU program. Replaced in place by a successful hot reload.
    pub id: ProgramId,
    /// The vertex inputs the variant consumes.
    pub input_layout: VertexInputLayout,
    /// Inputs reported by the driver, when the backend reflects them.
    pub reflected: Vec<ActiveAttribute>,
    /// Modification time of the source file when it was last compiled.
    pub last_modified: Option<SystemTime>,
    /// Compile and link errors from the last compilation, if any.
    pub compile_log: Option<String>,
}

impl ShaderProgram {
    /// Returns `true` if the last compilation produced no errors.
    pub fn is_healthy(&self) -> bool {
        self.compile_log.is_none()
    }
}

/// Modification time of `path`, if the filesystem reports one.
pub(crate) fn modified_time(path: &Path) -> Option<SystemTime> {
    std::fs::metadata(path).and_then(|m| m.modified()).ok()
}

/// Reads a shader family file.
pub(crate) fn read_source(path: &Path) -> Result<String, ShaderError> {
    std::fs::read_to_string(path).map_err(|e| ShaderError::LoadError {
        path: path.display().to_string(),
        source_error: e.to_string(),
    })
}

/// Composes both stages for `key`, compiles them and wires the fixed uniform
/// block bindings. Compile and link failures are logged, not returned.
pub(crate) fn compile_variant(
    device: &mut dyn GraphicsDevice,
    key: &ProgramKey,
    body: &str,
) -> Result<ProgramCompilation, ResourceError> {
    let label = key.label();
    let vertex = compose_stage_source(&key.variant, ShaderStage::Vertex, body);
    let fragment = compose_stage_source(&key.variant, ShaderStage::Fragment, body);
    let compilation = device.create_program(&ProgramSource {
        label: label.as_str().into(),
        vertex: vertex.into(),
        fragment: fragment.into(),
    })?;

    if let Some(log) = &compilation.vertex_log {
        log::error!("{}", ShaderError::CompilationError {
            label: format!("{label} (vertex)"),
            details: log.clone(),
        });
    }
    if let Some(log) = &compilation.fragment_log {
        log::error!("{}", ShaderError::CompilationError {
            label: format!("{label} (fragment)"),
            details: log.clone(),
        });
    }
    if let Some(log) = &compilation.link_log {
        log::error!("{}", ShaderError::LinkError {
            label: label.clone(),
            details: log.clone(),
        });
    }

    device.bind_uniform_block(
        compilation.id,
        bindings::GLOBAL_PARAMS_BLOCK,
        bindings::GLOBAL_PARAMS,
    )?;
    device.bind_uniform_block(
        compilation.id,
        bindings::LOCAL_PARAMS_BLOCK,
        bindings::LOCAL_PARAMS,
    )?;
    Ok(compilation)
}

/// Warns when the driver's view of the vertex inputs disagrees with the declared layout.
pub(crate) fn check_reflection(
    label: &str,
    declared: &VertexInputLayout,
    reflected: &[ActiveAttribute],
) {
    if reflected.is_empty() {
        return;
    }
    for attr in reflected {
        let matches = declared
            .attributes
            .iter()
            .any(|d| d.location == attr.location && d.components == attr.components);
        if !matches {
            log::warn!(
                "{label}: active input '{}' at location {} ({} components) is not in the declared layout",
                attr.name,
                attr.location,
                attr.components
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stage_source_prepends_version_variant_and_stage() {
        let src = compose_stage_source("SHOW_GEOMETRY", ShaderStage::Fragment, "void main() {}\n");
        assert_eq!(
            src,
            "#version 430\n#define SHOW_GEOMETRY\n#define FRAGMENT\nvoid main() {}\n"
        );
    }

    #[test]
    fn key_label_uses_file_name() {
        let key = ProgramKey::new("assets/shaders/shaders.glsl", "DRAW_LIGHT");
        assert_eq!(key.label(), "shaders.glsl[DRAW_LIGHT]");
    }
}
