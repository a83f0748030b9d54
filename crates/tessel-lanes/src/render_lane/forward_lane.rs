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

//! Single-pass forward rendering.

use super::samplers::{bind_samplers, SamplerBinding};
use super::targets::attachments;
use super::uniforms::{self, pack_entity_locals, pack_forward_globals, write_uniforms};
use super::{
    begin_frame, draw_entities, program_id, programs, FrameContext, PassKind, RenderLane,
    SetupContext,
};
use tessel_core::renderer::{BlitMask, RenderError, ResourceError};
use tessel_data::assets::{BuiltinTexture, ProgramHandle, TextureHandle};

/// Lights every entity in its own fragment shader, writing only the colour
/// attachment, then blits the result to the default target.
#[derive(Debug)]
pub struct ForwardLane {
    program: ProgramHandle,
}

impl Default for ForwardLane {
    fn default() -> Self {
        Self {
            program: ProgramHandle::INVALID,
        }
    }
}

impl ForwardLane {
    /// Creates a lane that still needs [`RenderLane::setup`].
    pub fn new() -> Self {
        Self::default()
    }
}

impl RenderLane for ForwardLane {
    fn strategy_name(&self) -> &'static str {
        "Forward"
    }

    fn setup(&mut self, ctx: &mut SetupContext<'_>) -> Result<(), ResourceError> {
        self.program = programs::SHOW_TEXTURED_MESH.load(ctx)?;
        Ok(())
    }

    fn execute(&mut self, ctx: &mut FrameContext<'_>) -> Result<(), RenderError> {
        let program = program_id(ctx.cache, self.program)?;
        let camera_position = ctx.scene.camera.position;
        let view_projection = ctx.scene.camera.view_projection(ctx.display);

        let scene = &mut *ctx.scene;
        let globals = write_uniforms(ctx.device, ctx.arena, |arena| {
            let globals = pack_forward_globals(arena, camera_position, &scene.lights)?;
            for entity in &mut scene.entities {
                entity.local_range =
                    Some(pack_entity_locals(arena, entity.transform, view_projection)?);
            }
            Ok(globals)
        })?;

        begin_frame(ctx, &attachments::COLOR_ONLY)?;
        ctx.device.use_program(Some(program))?;
        uniforms::bind_globals(ctx.device, ctx.arena, globals)?;
        draw_entities(ctx, self.program, |device, cache, material| {
            let albedo = cache
                .material(material)
                .map_or(TextureHandle::INVALID, |m| m.albedo_texture);
            let texture = cache.resolve_texture(albedo, BuiltinTexture::White);
            bind_samplers(device, program, &[SamplerBinding::new("uTexture", 0, texture)])
        })?;
        ctx.device.use_program(None)?;
        ctx.stats.passes.push(PassKind::Forward);

        ctx.targets
            .blit_to_default(ctx.device, ctx.display, BlitMask::Color)?;
        log::trace!("Forward frame recorded with {} draws", ctx.stats.draw_calls);
        Ok(())
    }
}
