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

//! Shared fixture for the lane tests.

use super::{FrameContext, FrameStats, GeometryCache, RenderLane, RenderTargets, SetupContext};
use crate::asset_lane::obj_vertex_layout;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tessel_core::asset::{
    Image, ImageLoader, LoadError, MaterialData, ModelData, ModelLoader, SubmeshData,
};
use tessel_core::math::{Extent2D, Mat4, Vec3};
use tessel_core::renderer::testing::RecordingDevice;
use tessel_core::renderer::{RenderError, RenderSettings, UniformArena};
use tessel_data::assets::ResourceCache;
use tessel_data::scene::{Camera, Entity, Light, Scene};

/// Decodes every path to a 2x2 RGBA image, except paths containing "missing".
pub(crate) struct SolidImages;

impl ImageLoader for SolidImages {
    fn load(&self, path: &Path) -> Result<Image, LoadError> {
        if path.to_string_lossy().contains("missing") {
            return Err("no such file".into());
        }
        Ok(Image {
            pixels: vec![180; 16],
            size: Extent2D::new(2, 2),
            channels: 4,
        })
    }
}

/// A unit plane facing +Z with a fully textured material.
pub(crate) struct PlaneModel;

impl ModelLoader for PlaneModel {
    fn load(&self, path: &Path) -> Result<ModelData, LoadError> {
        let dir = path.parent().unwrap_or(Path::new(""));
        #[rustfmt::skip]
        let corners = [
            [-1.0, -1.0, 0.0, 0.0], [1.0, -1.0, 1.0, 0.0],
            [1.0, 1.0, 1.0, 1.0], [-1.0, 1.0, 0.0, 1.0],
        ];
        let mut vertices = Vec::new();
        for [x, y, u, v] in corners {
            vertices.extend_from_slice(&[
                x, y, 0.0, 0.0, 0.0, 1.0, u, v, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0,
            ]);
        }
        Ok(ModelData {
            submeshes: vec![SubmeshData {
                name: "plane".into(),
                layout: obj_vertex_layout(),
                vertices,
                indices: vec![0, 1, 2, 0, 2, 3],
                material: Some(0),
            }],
            materials: vec![MaterialData {
                name: "plane".into(),
                albedo_texture: Some(dir.join("albedo.png")),
                normal_texture: Some(dir.join("normal.png")),
                ..MaterialData::default()
            }],
        })
    }
}

pub(crate) struct Fixture {
    pub device: RecordingDevice,
    pub cache: ResourceCache,
    pub arena: UniformArena,
    pub targets: RenderTargets,
    pub geometry: GeometryCache,
    pub scene: Scene,
    pub settings: RenderSettings,
    pub stats: FrameStats,
    pub display: Extent2D,
    pub shader_path: PathBuf,
    _shader_dir: TempDir,
}

impl Fixture {
    pub fn new() -> Self {
        let display = Extent2D::new(1280, 720);
        let mut device = RecordingDevice::new();
        let shader_dir = tempfile::tempdir().unwrap();
        let shader_path = shader_dir.path().join("shaders.glsl");
        std::fs::write(&shader_path, "void main() {}\n").unwrap();

        let mut cache = ResourceCache::new(&mut device).unwrap();
        let arena = UniformArena::from_device_limits(&mut device).unwrap();
        let targets = RenderTargets::new(&mut device, display).unwrap();
        let geometry = GeometryCache::new(&mut device).unwrap();
        let model = cache.load_model(&mut device, &PlaneModel, &SolidImages, "models/plane.obj");

        let mut camera = Camera::default();
        camera.position = Vec3::new(0.0, 0.0, 4.0);
        let scene = Scene {
            camera,
            lights: vec![
                Light::directional(Vec3::ONE, Vec3::new(0.0, -1.0, 1.0), 0.1),
                Light::point(Vec3::new(0.0, 0.8, 0.9), Vec3::new(2.0, -1.6, 2.0), 0.7),
            ],
            entities: vec![Entity::new(model, Mat4::IDENTITY)],
        };

        Self {
            device,
            cache,
            arena,
            targets,
            geometry,
            scene,
            settings: RenderSettings::default(),
            stats: FrameStats::default(),
            display,
            shader_path,
            _shader_dir: shader_dir,
        }
    }

    pub fn setup(&mut self, lane: &mut dyn RenderLane) {
        let mut ctx = SetupContext {
            device: &mut self.device,
            cache: &mut self.cache,
            images: &SolidImages,
            shader_path: &self.shader_path,
            quad_texture: Path::new("textures/dice.png"),
        };
        lane.setup(&mut ctx).unwrap();
    }

    /// Runs one frame with a fresh command log.
    pub fn run(&mut self, lane: &mut dyn RenderLane) -> Result<(), RenderError> {
        self.device.clear_commands();
        self.stats = FrameStats::default();
        let mut ctx = FrameContext {
            device: &mut self.device,
            cache: &mut self.cache,
            arena: &mut self.arena,
            targets: &self.targets,
            geometry: &mut self.geometry,
            scene: &mut self.scene,
            settings: &self.settings,
            display: self.display,
            stats: &mut self.stats,
        };
        lane.execute(&mut ctx)
    }
}
