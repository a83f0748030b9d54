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

//! Two-pass deferred rendering with an optional light gizmo overlay.
//!
//! 1. Geometry: every entity is drawn into the four colour attachments of the
//!    G-buffer.
//! 2. Lighting: a full-screen quad on the default target resolves lighting from
//!    the position, normal and albedo attachments.
//!
//! The G-buffer depth is then blitted to the default target so the gizmo
//! depth-tests against the scene.

use super::geometry::Shape;
use super::samplers::{bind_samplers, SamplerBinding};
use super::targets::attachments;
use super::uniforms::{
    self, pack_entity_locals, pack_geometry_globals, pack_lighting_globals, write_uniforms,
};
use super::{
    begin_frame, draw_entities, program_id, programs, FrameContext, PassKind, RenderLane,
    SetupContext,
};
use tessel_core::math::Mat4;
use tessel_core::renderer::{
    BlitMask, ClearDescriptor, RenderError, RenderTarget, ResourceError, UniformRange, UniformValue,
};
use tessel_data::assets::{BuiltinTexture, Material, ProgramHandle, TextureHandle};
use tessel_data::scene::LightKind;

/// The ranges one deferred frame binds.
#[derive(Debug, Clone, Copy)]
struct DeferredBlocks {
    geometry: UniformRange,
    lighting: UniformRange,
}

/// Deferred shading over the G-buffer.
#[derive(Debug)]
pub struct DeferredLane {
    geometry_program: ProgramHandle,
    lighting_program: ProgramHandle,
    gizmo_program: ProgramHandle,
}

impl Default for DeferredLane {
    fn default() -> Self {
        Self {
            geometry_program: ProgramHandle::INVALID,
            lighting_program: ProgramHandle::INVALID,
            gizmo_program: ProgramHandle::INVALID,
        }
    }
}

impl DeferredLane {
    /// Creates a lane that still needs [`RenderLane::setup`].
    pub fn new() -> Self {
        Self::default()
    }

    fn pack(&self, ctx: &mut FrameContext<'_>) -> Result<DeferredBlocks, RenderError> {
        let camera_position = ctx.scene.camera.position;
        let view_projection = ctx.scene.camera.view_projection(ctx.display);
        let scene = &mut *ctx.scene;

        let blocks = write_uniforms(ctx.device, ctx.arena, |arena| {
            let geometry = pack_geometry_globals(arena, camera_position, scene.lights.len())?;
            for entity in &mut scene.entities {
                entity.local_range =
                    Some(pack_entity_locals(arena, entity.transform, view_projection)?);
            }
            let lighting = pack_lighting_globals(arena, camera_position, &scene.lights)?;
            Ok(DeferredBlocks { geometry, lighting })
        })?;
        Ok(blocks)
    }

    fn geometry_pass(
        &self,
        ctx: &mut FrameContext<'_>,
        globals: UniformRange,
    ) -> Result<(), RenderError> {
        let program = program_id(ctx.cache, self.geometry_program)?;

        begin_frame(ctx, &attachments::ALL)?;
        ctx.device.use_program(Some(program))?;
        ctx.device
            .set_uniform(program, "uShowRelief", UniformValue::Bool(ctx.settings.show_relief))?;
        uniforms::bind_globals(ctx.device, ctx.arena, globals)?;

        draw_entities(ctx, self.geometry_program, |device, cache, material| {
            let material = cache.material(material);
            let slot = |pick: fn(&Material) -> TextureHandle| {
                material.map_or(TextureHandle::INVALID, pick)
            };
            let albedo = slot(|m| m.albedo_texture);
            let normal = slot(|m| m.normal_texture);
            let bump = slot(|m| m.bump_texture);

            let has_normal_map = UniformValue::Bool(cache.texture(normal).is_some());
            let has_bump_map = UniformValue::Bool(cache.texture(bump).is_some());
            device.set_uniform(program, "uhasNormalMap", has_normal_map)?;
            device.set_uniform(program, "uhasBumpMap", has_bump_map)?;
            let albedo = cache.resolve_texture(albedo, BuiltinTexture::White);
            let normal = cache.resolve_texture(normal, BuiltinTexture::FlatNormal);
            let bump = cache.resolve_texture(bump, BuiltinTexture::Black);
            bind_samplers(
                device,
                program,
                &[
                    SamplerBinding::new("uAlbedoTexture", 0, albedo),
                    SamplerBinding::new("uNormalTexture", 1, normal),
                    SamplerBinding::new("uBumpTexture", 2, bump),
                ],
            )
        })?;
        ctx.stats.passes.push(PassKind::Geometry);
        Ok(())
    }

    fn lighting_pass(
        &self,
        ctx: &mut FrameContext<'_>,
        globals: UniformRange,
    ) -> Result<(), RenderError> {
        let program = program_id(ctx.cache, self.lighting_program)?;

        ctx.device
            .bind_render_target(RenderTarget::Default, &attachments::COLOR_ONLY)?;
        ctx.device.set_viewport(ctx.display);
        ctx.device
            .clear(&ClearDescriptor::color_and_depth(ctx.settings.clear_color));

        ctx.device.use_program(Some(program))?;
        bind_samplers(
            ctx.device,
            program,
            &[
                SamplerBinding::new(
                    "uPositionTexture",
                    0,
                    ctx.targets.color(attachments::POSITION),
                ),
                SamplerBinding::new("uNormalsTexture", 1, ctx.targets.color(attachments::NORMALS)),
                SamplerBinding::new("uAlbedoTexture", 2, ctx.targets.color(attachments::ALBEDO)),
            ],
        )?;
        uniforms::bind_globals(ctx.device, ctx.arena, globals)?;

        let lighting = ctx
            .cache
            .program(self.lighting_program)
            .ok_or(RenderError::NotInitialized)?;
        ctx.geometry.draw(ctx.device, Shape::FullscreenQuad, lighting)?;
        ctx.device.bind_vertex_array(None)?;
        ctx.stats.draw_calls += 1;
        ctx.stats.passes.push(PassKind::Lighting);
        Ok(())
    }

    fn gizmo_pass(&self, ctx: &mut FrameContext<'_>) -> Result<(), RenderError> {
        let program = program_id(ctx.cache, self.gizmo_program)?;
        let view_projection = ctx.scene.camera.view_projection(ctx.display);

        ctx.device.use_program(Some(program))?;
        ctx.device
            .set_uniform(program, "projectionView", UniformValue::Mat4(view_projection))?;

        let gizmo = ctx
            .cache
            .program(self.gizmo_program)
            .ok_or(RenderError::NotInitialized)?;
        for light in &ctx.scene.lights {
            ctx.device.set_uniform(
                program,
                "model",
                UniformValue::Mat4(Mat4::from_translation(light.position)),
            )?;
            ctx.device
                .set_uniform(program, "lightColor", UniformValue::Vec3(light.color))?;
            let shape = match light.kind {
                LightKind::Directional => Shape::Cube,
                LightKind::Point => Shape::Sphere,
            };
            ctx.geometry.draw(ctx.device, shape, gizmo)?;
            ctx.stats.draw_calls += 1;
        }
        ctx.device.bind_vertex_array(None)?;
        ctx.stats.passes.push(PassKind::Gizmo);
        Ok(())
    }
}

impl RenderLane for DeferredLane {
    fn strategy_name(&self) -> &'static str {
        "Deferred"
    }

    fn setup(&mut self, ctx: &mut SetupContext<'_>) -> Result<(), ResourceError> {
        self.geometry_program = programs::SHOW_GEOMETRY.load(ctx)?;
        self.lighting_program = programs::SHOW_LIGHT.load(ctx)?;
        self.gizmo_program = programs::DRAW_LIGHT.load(ctx)?;
        Ok(())
    }

    fn execute(&mut self, ctx: &mut FrameContext<'_>) -> Result<(), RenderError> {
        let blocks = self.pack(ctx)?;
        self.geometry_pass(ctx, blocks.geometry)?;
        self.lighting_pass(ctx, blocks.lighting)?;

        ctx.targets
            .blit_to_default(ctx.device, ctx.display, BlitMask::Depth)?;

        if ctx.settings.show_gizmo {
            self.gizmo_pass(ctx)?;
        }
        ctx.device.use_program(None)?;
        log::trace!(
            "Deferred frame recorded: {:?}, {} draws",
            ctx.stats.passes,
            ctx.stats.draw_calls
        );
        Ok(())
    }
}
