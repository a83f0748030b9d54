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

mod common;

use common::{agent, settings, PlaneModel, ShaderFile, SolidImages, DISPLAY};
use tessel_agents::render_agent::RenderAgent;
use tessel_core::math::Extent2D;
use tessel_core::renderer::testing::{Command, RecordingDevice};
use tessel_core::renderer::{
    BlitMask, DebugView, FilterMode, FramebufferStatus, RenderMode, RenderTarget,
};
use tessel_data::scene::SceneDefinition;
use tessel_lanes::render_lane::targets::attachments;
use tessel_lanes::render_lane::PassKind;

#[test]
fn agent_has_one_lane_per_mode() {
    let (_device, agent, _shader) = agent(RenderMode::Deferred);
    assert_eq!(agent.lane_names(), vec!["TexturedQuad", "Forward", "Deferred"]);
    for mode in [RenderMode::TexturedQuad, RenderMode::Forward, RenderMode::Deferred] {
        assert!(agent.lane_names().contains(&RenderAgent::lane_name(mode)));
    }
    assert_eq!(agent.scene().entities.len(), 1);
    assert_eq!(agent.scene().lights.len(), 2);
}

#[test]
fn forward_mode_never_writes_the_g_buffer() {
    let (mut device, mut agent, _shader) = agent(RenderMode::Forward);

    let report = agent.render(&mut device, DISPLAY).unwrap();

    assert_eq!(report.mode, RenderMode::Forward);
    assert_eq!(report.passes, vec![PassKind::Forward]);
    assert_eq!(report.draw_calls, 1);
    assert!(report.device_errors.is_empty());

    let targets = agent.targets();
    assert!(device.was_written(targets.color(attachments::COLOR).unwrap()));
    for index in [attachments::NORMALS, attachments::ALBEDO, attachments::POSITION] {
        assert!(!device.was_written(targets.color(index).unwrap()), "attachment {index} written");
    }

    let blits = device.blits();
    assert_eq!(blits.len(), 1);
    assert_eq!(blits[0].mask, BlitMask::Color);
    assert_eq!(blits[0].filter, FilterMode::Linear);
    assert!(device.default_target_written());
}

#[test]
fn deferred_mode_runs_geometry_then_lighting() {
    let (mut device, mut agent, _shader) = agent(RenderMode::Deferred);
    agent.settings_mut().show_gizmo = false;

    let report = agent.render(&mut device, DISPLAY).unwrap();

    assert_eq!(report.passes, vec![PassKind::Geometry, PassKind::Lighting]);
    assert!(report.device_errors.is_empty());

    let draws = device.draws();
    assert_eq!(draws.len(), 2);
    assert_eq!(draws[0].target, agent.targets().target());
    assert_eq!(draws[0].draw_attachments, attachments::ALL.to_vec());
    assert_eq!(draws[1].target, RenderTarget::Default);
}

#[test]
fn gizmo_overlay_follows_the_depth_blit() {
    let (mut device, mut agent, _shader) = agent(RenderMode::Deferred);

    let report = agent.render(&mut device, DISPLAY).unwrap();

    assert_eq!(
        report.passes,
        vec![PassKind::Geometry, PassKind::Lighting, PassKind::Gizmo]
    );
    let depth_blit = device
        .commands()
        .iter()
        .position(|c| matches!(c, Command::Blit(b) if b.mask == BlitMask::Depth))
        .unwrap();
    let last_draw = device
        .commands()
        .iter()
        .rposition(|c| matches!(c, Command::Draw(_)))
        .unwrap();
    assert!(depth_blit < last_draw);
    // Geometry, lighting, then one gizmo per light.
    assert_eq!(device.draws().len(), 4);
}

#[test]
fn textured_quad_mode_draws_one_quad() {
    let (mut device, mut agent, _shader) = agent(RenderMode::TexturedQuad);

    let report = agent.render(&mut device, DISPLAY).unwrap();

    assert_eq!(report.passes, vec![PassKind::TexturedQuad]);
    assert_eq!(report.draw_calls, 1);
    assert_eq!(device.draws()[0].count, 6);
}

#[test]
fn mode_changes_apply_on_the_next_frame() {
    let (mut device, mut agent, _shader) = agent(RenderMode::Forward);
    agent.render(&mut device, DISPLAY).unwrap();

    agent.settings_mut().mode = RenderMode::Deferred;
    agent.settings_mut().show_gizmo = false;
    device.clear_commands();
    let report = agent.render(&mut device, DISPLAY).unwrap();

    assert_eq!(report.mode, RenderMode::Deferred);
    assert_eq!(report.passes, vec![PassKind::Geometry, PassKind::Lighting]);
    assert_eq!(agent.frame_count(), 2);
}

#[test]
fn arena_is_mapped_once_per_frame() {
    let (mut device, mut agent, _shader) = agent(RenderMode::Deferred);

    agent.render(&mut device, DISPLAY).unwrap();

    let maps = device
        .commands()
        .iter()
        .filter(|c| matches!(c, Command::MapBuffer(_)))
        .count();
    let first_unmap = device
        .commands()
        .iter()
        .position(|c| matches!(c, Command::UnmapBuffer(_)))
        .unwrap();
    let first_draw = device
        .commands()
        .iter()
        .position(|c| matches!(c, Command::Draw(_)))
        .unwrap();
    assert_eq!(maps, 1);
    assert!(first_unmap < first_draw);
}

#[test]
fn display_change_recreates_the_targets() {
    let (mut device, mut agent, _shader) = agent(RenderMode::Deferred);
    let before = agent.debug_view_texture(DebugView::Albedo);

    let smaller = Extent2D::new(640, 360);
    agent.render(&mut device, smaller).unwrap();

    assert_eq!(agent.targets().size(), smaller);
    let after = agent.debug_view_texture(DebugView::Albedo);
    assert_ne!(before, after);
    assert!(device.texture(before).is_none());
    assert_eq!(device.texture(after).unwrap().size, smaller);
    assert_eq!(device.viewport(), Some(smaller));
}

#[test]
fn zero_sized_display_skips_the_frame() {
    let (mut device, mut agent, _shader) = agent(RenderMode::Deferred);

    let report = agent.render(&mut device, Extent2D::new(0, 0)).unwrap();

    assert!(report.passes.is_empty());
    assert!(device.commands().is_empty());
    assert_eq!(agent.targets().size(), DISPLAY);
}

#[test]
fn incomplete_g_buffer_is_reported_and_rendering_continues() {
    let shader = ShaderFile::new();
    let mut device = RecordingDevice::new();
    device.force_framebuffer_status(FramebufferStatus::IncompleteMultisample);
    let mut agent = RenderAgent::new(
        &mut device,
        DISPLAY,
        settings(&shader, RenderMode::Deferred),
        &SceneDefinition::default(),
        &PlaneModel,
        &SolidImages,
    )
    .unwrap();

    assert_eq!(agent.target_status(), FramebufferStatus::IncompleteMultisample);
    let report = agent.render(&mut device, DISPLAY).unwrap();
    assert!(!report.passes.is_empty());
}

#[test]
fn broken_shader_still_renders() {
    let shader = ShaderFile::new();
    let mut device = RecordingDevice::new();
    device.fail_programs_containing("SHOW_GEOMETRY");
    let mut agent = RenderAgent::new(
        &mut device,
        DISPLAY,
        settings(&shader, RenderMode::Deferred),
        &SceneDefinition::default(),
        &PlaneModel,
        &SolidImages,
    )
    .unwrap();

    let broken = agent
        .cache()
        .programs()
        .iter()
        .filter(|p| p.compile_log.is_some())
        .count();
    assert_eq!(broken, 1);
    let report = agent.render(&mut device, DISPLAY).unwrap();
    assert_eq!(report.passes[0], PassKind::Geometry);
}

#[test]
fn destroy_releases_every_gpu_object() {
    let (mut device, mut agent, _shader) = agent(RenderMode::Deferred);
    agent.render(&mut device, DISPLAY).unwrap();

    agent.destroy(&mut device);

    assert_eq!(device.program_count(), 0);
    assert_eq!(device.texture_count(), 0);
    assert_eq!(device.buffer_count(), 0);
    assert_eq!(device.vertex_array_count(), 0);
}
