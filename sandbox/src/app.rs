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

//! The eframe application: owns the GL device and the render agent, renders
//! the scene behind the UI every frame.

use crate::{input, ui::InfoPanel};
use anyhow::Context;
use eframe::egui_glow;
use eframe::glow;
use std::sync::{Arc, Mutex, MutexGuard};
use tessel_agents::render_agent::{FrameReport, RenderAgent};
use tessel_core::math::Extent2D;
use tessel_core::renderer::{GraphicsDevice, RenderSettings, RenderTarget};
use tessel_data::scene::SceneDefinition;
use tessel_infra::GlDevice;
use tessel_lanes::asset_lane::{ObjLoaderLane, TextureLoaderLane};

const INITIAL_DISPLAY: Extent2D = Extent2D::new(1280, 720);

/// Everything the paint callback touches. Shared with the UI thread through a
/// mutex because egui requires callbacks to be `Send + Sync`.
#[derive(Debug)]
pub struct SceneState {
    pub device: GlDevice,
    /// `None` once the application has shut down.
    pub agent: Option<RenderAgent>,
    pub last_report: Option<FrameReport>,
}

impl SceneState {
    fn render(&mut self, target: Option<glow::Framebuffer>, display: Extent2D) {
        let Some(agent) = self.agent.as_mut() else {
            return;
        };
        self.device.set_default_framebuffer(target);

        let reloaded = agent.poll_hot_reload(&mut self.device);
        if !reloaded.is_empty() {
            log::info!("Hot reload recompiled {} programs", reloaded.len());
        }

        match agent.render(&mut self.device, display) {
            Ok(report) => self.last_report = Some(report),
            Err(err) => log::error!("Frame failed: {err}"),
        }

        // egui keeps drawing into whatever framebuffer is bound.
        if let Err(err) = self.device.bind_render_target(RenderTarget::Default, &[]) {
            log::error!("Could not restore the default target: {err}");
        }
    }
}

/// Locks the scene, recovering the data if a previous frame panicked mid-render.
pub fn lock(scene: &Mutex<SceneState>) -> MutexGuard<'_, SceneState> {
    scene.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

pub struct SandboxApp {
    scene: Arc<Mutex<SceneState>>,
    panel: InfoPanel,
}

impl SandboxApp {
    pub fn new(
        cc: &eframe::CreationContext<'_>,
        definition: &SceneDefinition,
    ) -> anyhow::Result<Self> {
        let gl = cc
            .gl
            .clone()
            .context("The sandbox needs eframe's glow renderer")?;
        let mut device = GlDevice::new(gl)?;
        let agent = RenderAgent::new(
            &mut device,
            INITIAL_DISPLAY,
            RenderSettings::default(),
            definition,
            &ObjLoaderLane,
            &TextureLoaderLane,
        )?;
        log::info!("Render lanes: {:?}", agent.lane_names());

        Ok(Self {
            scene: Arc::new(Mutex::new(SceneState {
                device,
                agent: Some(agent),
                last_report: None,
            })),
            panel: InfoPanel::default(),
        })
    }

    fn viewport(&self, ctx: &egui::Context) {
        egui::CentralPanel::default()
            .frame(egui::Frame::NONE)
            .show(ctx, |ui| {
                let rect = ui.max_rect();
                let response = ui.interact(rect, ui.id().with("viewport"), egui::Sense::drag());

                if let Some(agent) = lock(&self.scene).agent.as_mut() {
                    input::drive_camera(ctx, &response, &mut agent.scene_mut().camera);
                }

                let scene = Arc::clone(&self.scene);
                let callback = egui_glow::CallbackFn::new(move |info, painter| {
                    let viewport = info.viewport_in_pixels();
                    let display = Extent2D::new(
                        viewport.width_px.max(0) as u32,
                        viewport.height_px.max(0) as u32,
                    );
                    lock(&scene).render(painter.intermediate_fbo(), display);
                });
                ui.painter().add(egui::PaintCallback {
                    rect,
                    callback: Arc::new(callback),
                });
            });
    }
}

impl eframe::App for SandboxApp {
    fn update(&mut self, ctx: &egui::Context, frame: &mut eframe::Frame) {
        self.viewport(ctx);
        self.panel.show(ctx, frame, &mut lock(&self.scene));
        ctx.request_repaint();
    }

    fn on_exit(&mut self, _gl: Option<&glow::Context>) {
        let mut state = lock(&self.scene);
        let SceneState { device, agent, .. } = &mut *state;
        if let Some(agent) = agent.take() {
            log::info!("Shutting down after {} frames", agent.frame_count());
            agent.destroy(device);
        }
    }
}
