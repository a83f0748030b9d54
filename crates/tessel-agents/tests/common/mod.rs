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

//! Fixtures shared by the render agent integration tests.

#![allow(dead_code)]

use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tessel_agents::render_agent::RenderAgent;
use tessel_core::asset::{
    Image, ImageLoader, LoadError, MaterialData, ModelData, ModelLoader, SubmeshData,
};
use tessel_core::math::Extent2D;
use tessel_core::renderer::testing::RecordingDevice;
use tessel_core::renderer::{RenderMode, RenderSettings};
use tessel_data::scene::SceneDefinition;
use tessel_lanes::asset_lane::obj_vertex_layout;

pub const DISPLAY: Extent2D = Extent2D::new(1280, 720);

/// Decodes every path to a 2x2 RGBA image.
pub struct SolidImages;

impl ImageLoader for SolidImages {
    fn load(&self, _path: &Path) -> Result<Image, LoadError> {
        Ok(Image {
            pixels: vec![200; 16],
            size: Extent2D::new(2, 2),
            channels: 4,
        })
    }
}

/// A 2x2 plane at z = 0 facing +Z, with an albedo map and no bump map.
pub struct PlaneModel;

impl ModelLoader for PlaneModel {
    fn load(&self, path: &Path) -> Result<ModelData, LoadError> {
        let dir = path.parent().unwrap_or(Path::new(""));
        let mut vertices = Vec::new();
        let corners = [
            [-1.0, -1.0, 0.0, 0.0],
            [1.0, -1.0, 1.0, 0.0],
            [1.0, 1.0, 1.0, 1.0],
            [-1.0, 1.0, 0.0, 1.0],
        ];
        for [x, y, u, v] in corners {
            vertices.extend_from_slice(&[
                x, y, 0.0, 0.0, 0.0, 1.0, u, v, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0,
            ]);
        }
        Ok(ModelData {
            submeshes: vec![SubmeshData {
                name: "Plane".into(),
                layout: obj_vertex_layout(),
                vertices,
                indices: vec![0, 1, 2, 0, 2, 3],
                material: Some(0),
            }],
            materials: vec![MaterialData {
                name: "Plane".into(),
                albedo_texture: Some(dir.join("plane_albedo.png")),
                ..MaterialData::default()
            }],
        })
    }
}

/// A shader file on disk; the recording device never parses it.
pub struct ShaderFile {
    pub path: PathBuf,
    _dir: TempDir,
}

impl ShaderFile {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("shaders.glsl");
        std::fs::write(&path, "void main() {}\n").unwrap();
        Self { path, _dir: dir }
    }
}

pub fn settings(shader: &ShaderFile, mode: RenderMode) -> RenderSettings {
    RenderSettings {
        mode,
        shader_path: shader.path.display().to_string(),
        ..RenderSettings::default()
    }
}

/// The default scene on a recording device.
pub fn agent(mode: RenderMode) -> (RecordingDevice, RenderAgent, ShaderFile) {
    let shader = ShaderFile::new();
    let mut device = RecordingDevice::new();
    let agent = RenderAgent::new(
        &mut device,
        DISPLAY,
        settings(&shader, mode),
        &SceneDefinition::default(),
        &PlaneModel,
        &SolidImages,
    )
    .unwrap();
    device.clear_commands();
    (device, agent, shader)
}
