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

//! The "Info" debug window.

use crate::app::SceneState;
use egui::{load::SizedTexture, pos2, vec2, Rect, Ui};
use std::collections::HashMap;
use tessel_agents::render_agent::RenderAgent;
use tessel_core::math::Vec3;
use tessel_core::renderer::{DebugView, RenderMode, TextureId};
use tessel_data::scene::{Light, LightKind};

const MODES: [RenderMode; 3] = [
    RenderMode::TexturedQuad,
    RenderMode::Forward,
    RenderMode::Deferred,
];

const PREVIEW_WIDTH: f32 = 256.0;

#[derive(Default)]
pub struct InfoPanel {
    show_gpu_info: bool,
    /// Render-target textures already handed to egui.
    previews: HashMap<TextureId, egui::TextureId>,
}

impl InfoPanel {
    pub fn show(&mut self, ctx: &egui::Context, frame: &mut eframe::Frame, state: &mut SceneState) {
        if !ctx.wants_keyboard_input() && ctx.input(|i| i.key_pressed(egui::Key::Num0)) {
            self.show_gpu_info = !self.show_gpu_info;
        }

        egui::Window::new("Info")
            .default_pos([12.0, 12.0])
            .resizable(false)
            .show(ctx, |ui| {
                let dt = ctx.input(|i| i.stable_dt).max(f32::EPSILON);
                ui.label(format!("{:.1} FPS ({:.2} ms)", 1.0 / dt, dt * 1000.0));
                if let Some(report) = &state.last_report {
                    ui.label(format!("{:?}: {} draws", report.passes, report.draw_calls));
                    if !report.device_errors.is_empty() {
                        ui.colored_label(
                            egui::Color32::LIGHT_RED,
                            format!("device errors: {:#06x?}", report.device_errors),
                        );
                    }
                }
                ui.checkbox(&mut self.show_gpu_info, "GPU info (0)");

                let SceneState { device, agent, .. } = state;
                let Some(agent) = agent.as_mut() else {
                    return;
                };
                if self.show_gpu_info {
                    gpu_info(ui, agent);
                }

                ui.separator();
                camera_section(ui, agent);
                ui.separator();
                lights_section(ui, agent);
                ui.separator();
                render_section(ui, agent);

                if agent.settings().mode == RenderMode::Deferred {
                    let texture = agent.debug_view_texture(agent.settings().debug_view);
                    let aspect = {
                        let size = agent.targets().size();
                        size.height as f32 / size.width.max(1) as f32
                    };
                    let preview = match self.previews.get(&texture) {
                        Some(&id) => Some(id),
                        None => device.native_texture(texture).map(|native| {
                            let id = frame.register_native_glow_texture(native);
                            self.previews.insert(texture, id);
                            id
                        }),
                    };
                    if let Some(id) = preview {
                        // GL textures start at the bottom row.
                        let uv = Rect::from_min_max(pos2(0.0, 1.0), pos2(1.0, 0.0));
                        let size = vec2(PREVIEW_WIDTH, PREVIEW_WIDTH * aspect);
                        ui.add(egui::Image::new(SizedTexture::new(id, size)).uv(uv));
                    }
                }
            });
    }
}

fn gpu_info(ui: &mut Ui, agent: &RenderAgent) {
    let info = agent.adapter_info();
    egui::Grid::new("gpu_info").num_columns(2).show(ui, |ui| {
        for (label, value) in [
            ("Version", &info.version),
            ("Renderer", &info.renderer),
            ("Vendor", &info.vendor),
            ("GLSL", &info.shading_language_version),
        ] {
            ui.label(label);
            ui.label(value.as_str());
            ui.end_row();
        }
    });
    ui.collapsing(format!("Extensions ({})", info.extensions.len()), |ui| {
        egui::ScrollArea::vertical().max_height(160.0).show(ui, |ui| {
            for extension in &info.extensions {
                ui.monospace(extension.as_str());
            }
        });
    });
    ui.label(format!("Targets: {}", agent.target_status()));
}

fn vec3_row(ui: &mut Ui, label: &str, value: &mut Vec3, speed: f64) -> bool {
    ui.horizontal(|ui| {
        ui.label(label);
        let mut changed = false;
        for component in [&mut value.x, &mut value.y, &mut value.z] {
            changed |= ui
                .add(egui::DragValue::new(component).speed(speed).max_decimals(2))
                .changed();
        }
        changed
    })
    .inner
}

fn camera_section(ui: &mut Ui, agent: &mut RenderAgent) {
    let camera = &mut agent.scene_mut().camera;
    ui.heading("Camera");
    vec3_row(ui, "Position", &mut camera.position, 0.05);
    let mut rotated = false;
    ui.horizontal(|ui| {
        ui.label("Yaw");
        rotated |= ui.add(egui::DragValue::new(&mut camera.yaw).speed(0.5)).changed();
        ui.label("Pitch");
        rotated |= ui
            .add(egui::DragValue::new(&mut camera.pitch).speed(0.5).range(-89.0..=89.0))
            .changed();
    });
    if rotated {
        camera.update_vectors();
    }
    ui.add(egui::Slider::new(&mut camera.fov, 20.0..=120.0).text("FOV"));
}

fn light_editor(ui: &mut Ui, light: &mut Light) {
    match light.kind {
        LightKind::Directional => {
            vec3_row(ui, "Direction", &mut light.direction, 0.01);
        }
        LightKind::Point => {
            vec3_row(ui, "Position", &mut light.position, 0.05);
        }
    }
    ui.horizontal(|ui| {
        ui.label("Color");
        let mut rgb = light.color.to_array();
        if ui.color_edit_button_rgb(&mut rgb).changed() {
            light.color = Vec3::from_array(rgb);
        }
    });
    ui.add(egui::Slider::new(&mut light.intensity, 0.0..=5.0).text("Intensity"));
}

fn lights_section(ui: &mut Ui, agent: &mut RenderAgent) {
    ui.heading("Lights");
    for (index, light) in agent.scene_mut().lights.iter_mut().enumerate() {
        ui.collapsing(format!("Light {index} ({:?})", light.kind), |ui| light_editor(ui, light));
    }
}

fn render_section(ui: &mut Ui, agent: &mut RenderAgent) {
    let settings = agent.settings_mut();
    egui::ComboBox::from_label("Mode")
        .selected_text(RenderAgent::lane_name(settings.mode))
        .show_ui(ui, |ui| {
            for mode in MODES {
                ui.selectable_value(&mut settings.mode, mode, RenderAgent::lane_name(mode));
            }
        });
    ui.checkbox(&mut settings.show_gizmo, "Show gizmo");
    ui.checkbox(&mut settings.show_relief, "Show relief");
    egui::ComboBox::from_label("Debug target")
        .selected_text(settings.debug_view.label())
        .show_ui(ui, |ui| {
            for view in DebugView::ALL {
                ui.selectable_value(&mut settings.debug_view, view, view.label());
            }
        });
}
