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

//! Defines the RenderAgent, the central orchestrator for the rendering subsystem.

use anyhow::Context;
use std::path::Path;
use std::time::{Duration, Instant};
use tessel_core::asset::{ImageLoader, ModelLoader};
use tessel_core::math::Extent2D;
use tessel_core::renderer::{
    AdapterInfo, DebugView, FramebufferStatus, GraphicsDevice, ProgramId, RenderError,
    RenderMode, RenderSettings, ResourceError, TextureId, UniformArena,
};
use tessel_data::assets::ResourceCache;
use tessel_data::scene::{Scene, SceneDefinition};
use tessel_lanes::render_lane::uniforms::MAX_LIGHTS;
use tessel_lanes::render_lane::{
    DeferredLane, ForwardLane, FrameContext, FrameStats, GeometryCache, PassKind, RenderLane,
    RenderTargets, SetupContext, TexturedQuadLane,
};

/// What one call to [`RenderAgent::render`] did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameReport {
    /// The mode the frame was rendered in.
    pub mode: RenderMode,
    /// Passes in execution order.
    pub passes: Vec<PassKind>,
    /// Indexed draws issued.
    pub draw_calls: u32,
    /// Error codes the device raised during the frame.
    pub device_errors: Vec<u32>,
}

impl FrameReport {
    fn skipped(mode: RenderMode) -> Self {
        Self {
            mode,
            passes: Vec::new(),
            draw_calls: 0,
            device_errors: Vec::new(),
        }
    }
}

/// The agent responsible for the state and logic of the rendering pipeline.
///
/// It borrows the device on every call instead of holding it, so the same
/// agent can be driven by a GL context that only exists inside a paint callback.
#[derive(Debug)]
pub struct RenderAgent {
    // Programs, textures, meshes, materials and models.
    cache: ResourceCache,
    // Per-frame uniform storage, remapped once per frame.
    arena: UniformArena,
    // The off-screen G-buffer, sized to the display.
    targets: RenderTargets,
    // Full-screen quad, cube, sphere and demo quad.
    geometry: GeometryCache,
    scene: Scene,
    settings: RenderSettings,
    // One lane per mode. Lanes stay alive when the mode changes.
    lanes: Vec<Box<dyn RenderLane>>,
    adapter_info: AdapterInfo,
    // --- Frame metrics ---
    last_frame_time: Duration,
    draw_call_count: u32,
    frame_count: u64,
}

impl RenderAgent {
    /// Builds the render context and sets up every lane.
    ///
    /// # Arguments
    ///
    /// * `device` - The device every resource is created on.
    /// * `display` - The initial size of the default target.
    /// * `settings` - Mode, toggles and the shader file.
    /// * `definition` - The scene to load.
    /// * `models` - Parser for the scene's model files.
    /// * `images` - Decoder for texture files.
    ///
    /// # Errors
    ///
    /// Fails only when the device cannot allocate a resource. Missing models,
    /// missing textures and broken shaders are logged and rendered around.
    pub fn new(
        device: &mut dyn GraphicsDevice,
        display: Extent2D,
        settings: RenderSettings,
        definition: &SceneDefinition,
        models: &dyn ModelLoader,
        images: &dyn ImageLoader,
    ) -> anyhow::Result<Self> {
        let adapter_info = device.adapter_info();
        log::info!("RenderAgent: rendering on {adapter_info}");

        let mut cache = ResourceCache::new(device).context("Failed to create built-in textures")?;
        let arena =
            UniformArena::from_device_limits(device).context("Failed to create the uniform arena")?;
        let targets =
            RenderTargets::new(device, display).context("Failed to create the G-buffer")?;
        let geometry =
            GeometryCache::new(device).context("Failed to upload procedural geometry")?;

        if definition.lights.len() > MAX_LIGHTS {
            log::warn!(
                "Scene has {} lights; only the first {MAX_LIGHTS} are uploaded",
                definition.lights.len()
            );
        }
        let scene = Scene::from_definition(definition, |path| {
            cache.load_model(device, models, images, path)
        });

        let mut lanes: Vec<Box<dyn RenderLane>> = vec![
            Box::new(TexturedQuadLane::new()),
            Box::new(ForwardLane::new()),
            Box::new(DeferredLane::new()),
        ];
        let mut setup = SetupContext {
            device: &mut *device,
            cache: &mut cache,
            images,
            shader_path: Path::new(&settings.shader_path),
            quad_texture: &definition.quad_texture,
        };
        for lane in &mut lanes {
            lane.setup(&mut setup)
                .with_context(|| format!("Failed to set up the {} lane", lane.strategy_name()))?;
            log::debug!("RenderAgent: {} lane ready", lane.strategy_name());
        }

        log::info!(
            "RenderAgent: {} entities, {} lights, mode {:?}",
            scene.entities.len(),
            scene.lights.len(),
            settings.mode
        );
        Ok(Self {
            cache,
            arena,
            targets,
            geometry,
            scene,
            settings,
            lanes,
            adapter_info,
            last_frame_time: Duration::ZERO,
            draw_call_count: 0,
            frame_count: 0,
        })
    }

    /// Returns the name of the lane that serves `mode`.
    pub fn lane_name(mode: RenderMode) -> &'static str {
        match mode {
            RenderMode::TexturedQuad => "TexturedQuad",
            RenderMode::Forward => "Forward",
            RenderMode::Deferred => "Deferred",
        }
    }

    /// Returns the strategy names of the available lanes.
    pub fn lane_names(&self) -> Vec<&'static str> {
        self.lanes.iter().map(|lane| lane.strategy_name()).collect()
    }

    /// Renders one frame in the current mode.
    ///
    /// The G-buffer follows `display`; a new size recreates it before any pass
    /// runs. A zero-sized display (a minimised window) renders nothing.
    ///
    /// # Errors
    ///
    /// Returns the lane's error if a pass fails, or
    /// [`RenderError::NotInitialized`] if no lane serves the mode.
    pub fn render(
        &mut self,
        device: &mut dyn GraphicsDevice,
        display: Extent2D,
    ) -> Result<FrameReport, RenderError> {
        let frame_start = Instant::now();
        let mode = self.settings.mode;
        if display.is_empty() {
            log::trace!("RenderAgent: zero-sized display, frame skipped");
            return Ok(FrameReport::skipped(mode));
        }
        if display != self.targets.size() {
            self.resize(device, display)?;
        }

        let name = Self::lane_name(mode);
        let lane = self
            .lanes
            .iter_mut()
            .find(|lane| lane.strategy_name() == name)
            .ok_or(RenderError::NotInitialized)?;

        let mut stats = FrameStats::default();
        let mut ctx = FrameContext {
            device: &mut *device,
            cache: &mut self.cache,
            arena: &mut self.arena,
            targets: &self.targets,
            geometry: &mut self.geometry,
            scene: &mut self.scene,
            settings: &self.settings,
            display,
            stats: &mut stats,
        };
        lane.execute(&mut ctx)?;

        let device_errors = device.take_errors();
        if !device_errors.is_empty() {
            log::error!(
                "RenderAgent: {} lane raised device errors {:#06x?}",
                name,
                device_errors
            );
        }

        self.draw_call_count = stats.draw_calls;
        self.frame_count += 1;
        self.last_frame_time = frame_start.elapsed();
        log::trace!(
            "RenderAgent: frame {} in {:?}, {} draws",
            self.frame_count,
            self.last_frame_time,
            stats.draw_calls
        );

        Ok(FrameReport {
            mode,
            passes: stats.passes,
            draw_calls: stats.draw_calls,
            device_errors,
        })
    }

    /// Recreates the G-buffer at `display`.
    pub fn resize(
        &mut self,
        device: &mut dyn GraphicsDevice,
        display: Extent2D,
    ) -> Result<(), ResourceError> {
        log::debug!(
            "RenderAgent: resizing targets {:?} -> {:?}",
            self.targets.size(),
            display
        );
        self.targets.resize(device, display)
    }

    /// Recompiles programs whose source changed on disk, if hot reload is on.
    ///
    /// Returns the ids of the programs that were replaced.
    pub fn poll_hot_reload(&mut self, device: &mut dyn GraphicsDevice) -> Vec<ProgramId> {
        if !self.settings.hot_reload {
            return Vec::new();
        }
        let retired = self.cache.reload_changed_programs(device);
        for &program in &retired {
            let dropped = self.geometry.forget_program(device, program);
            log::debug!("RenderAgent: dropped {dropped} shape bindings of {program:?}");
        }
        retired
    }

    /// The active settings.
    pub fn settings(&self) -> &RenderSettings {
        &self.settings
    }

    /// Mutable settings, for a debug UI. Mode changes apply on the next frame.
    pub fn settings_mut(&mut self) -> &mut RenderSettings {
        &mut self.settings
    }

    /// Camera, lights and entities.
    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    /// Mutable camera, lights and entities.
    pub fn scene_mut(&mut self) -> &mut Scene {
        &mut self.scene
    }

    /// The resource cache.
    pub fn cache(&self) -> &ResourceCache {
        &self.cache
    }

    /// Driver identification, captured at construction.
    pub fn adapter_info(&self) -> &AdapterInfo {
        &self.adapter_info
    }

    /// The G-buffer texture a debug UI shows for `view`.
    pub fn debug_view_texture(&self, view: DebugView) -> TextureId {
        self.targets.debug_view_texture(view)
    }

    /// The G-buffer.
    pub fn targets(&self) -> &RenderTargets {
        &self.targets
    }

    /// The G-buffer completeness recorded when it was last created.
    pub fn target_status(&self) -> FramebufferStatus {
        self.targets.status()
    }

    /// Duration of the last [`render`](Self::render) call.
    pub fn last_frame_time(&self) -> Duration {
        self.last_frame_time
    }

    /// Draw calls issued by the last frame.
    pub fn draw_call_count(&self) -> u32 {
        self.draw_call_count
    }

    /// Frames rendered since construction.
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Releases every GPU object the agent owns.
    pub fn destroy(mut self, device: &mut dyn GraphicsDevice) {
        self.geometry.destroy(device);
        self.targets.destroy(device);
        if let Err(err) = self.arena.destroy(device) {
            log::warn!("Failed to release the uniform arena: {err}");
        }
        self.cache.destroy_all(device);
        log::debug!("RenderAgent: destroyed after {} frames", self.frame_count);
    }
}
