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

//! The textured-quad demo: one textured quad, no lighting.

use super::samplers::{bind_samplers, SamplerBinding};
use super::targets::attachments;
use super::{
    begin_frame, program_id, programs, FrameContext, PassKind, RenderLane, SetupContext, Shape,
};
use tessel_core::renderer::{BlitMask, RenderError, ResourceError};
use tessel_data::assets::{BuiltinTexture, ProgramHandle, TextureHandle};

/// Draws the demo texture on a quad into the colour target, then shows it.
#[derive(Debug)]
pub struct TexturedQuadLane {
    program: ProgramHandle,
    texture: TextureHandle,
}

impl Default for TexturedQuadLane {
    fn default() -> Self {
        Self {
            program: ProgramHandle::INVALID,
            texture: TextureHandle::INVALID,
        }
    }
}

impl TexturedQuadLane {
    /// Creates a lane that still needs [`RenderLane::setup`].
    pub fn new() -> Self {
        Self::default()
    }
}

impl RenderLane for TexturedQuadLane {
    fn strategy_name(&self) -> &'static str {
        "TexturedQuad"
    }

    fn setup(&mut self, ctx: &mut SetupContext<'_>) -> Result<(), ResourceError> {
        self.program = programs::TEXTURED_GEOMETRY.load(ctx)?;
        self.texture = ctx.cache.load_texture(ctx.device, ctx.images, ctx.quad_texture);
        if !self.texture.is_valid() {
            log::warn!(
                "Textured quad falls back to white: '{}' is unavailable",
                ctx.quad_texture.display()
            );
        }
        Ok(())
    }

    fn execute(&mut self, ctx: &mut FrameContext<'_>) -> Result<(), RenderError> {
        let program_id = program_id(ctx.cache, self.program)?;
        let texture = ctx.cache.resolve_texture(self.texture, BuiltinTexture::White);

        begin_frame(ctx, &attachments::COLOR_ONLY)?;
        ctx.device.use_program(Some(program_id))?;
        bind_samplers(
            ctx.device,
            program_id,
            &[SamplerBinding::new("uTexture", 0, texture)],
        )?;
        let program = ctx.cache.program(self.program).ok_or(RenderError::NotInitialized)?;
        ctx.geometry.draw(ctx.device, Shape::TexturedQuad, program)?;
        ctx.device.bind_vertex_array(None)?;
        ctx.device.use_program(None)?;
        ctx.stats.draw_calls += 1;
        ctx.stats.passes.push(PassKind::TexturedQuad);

        ctx.targets
            .blit_to_default(ctx.device, ctx.display, BlitMask::Color)?;
        log::trace!("Textured quad frame recorded");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tessel_core::renderer::GraphicsDevice;
    use crate::render_lane::test_support::Fixture;
    use tessel_core::renderer::{FilterMode, IndexFormat, RenderTarget, Topology, UniformValue};

    #[test]
    fn test_quad_is_drawn_once_and_blitted() {
        let mut fixture = Fixture::new();
        let mut lane = TexturedQuadLane::new();
        fixture.setup(&mut lane);

        fixture.run(&mut lane).unwrap();

        let draws = fixture.device.draws();
        assert_eq!(draws.len(), 1);
        assert_eq!(draws[0].topology, Topology::Triangles);
        assert_eq!(draws[0].index_format, Some(IndexFormat::Uint32));
        assert_eq!(draws[0].count, 6);
        assert_eq!(draws[0].draw_attachments, vec![attachments::COLOR]);

        let blits = fixture.device.blits();
        assert_eq!(blits.len(), 1);
        assert_eq!(blits[0].destination, RenderTarget::Default);
        assert_eq!(blits[0].mask, BlitMask::Color);
        assert_eq!(blits[0].filter, FilterMode::Linear);
        assert_eq!(fixture.stats.passes, vec![PassKind::TexturedQuad]);
        assert!(fixture.device.take_errors().is_empty());
    }

    #[test]
    fn test_demo_texture_is_sampled_from_unit_zero() {
        let mut fixture = Fixture::new();
        let mut lane = TexturedQuadLane::new();
        fixture.setup(&mut lane);
        fixture.run(&mut lane).unwrap();

        let program = fixture.cache.program(lane.program).unwrap().id;
        let dice = fixture.cache.texture(lane.texture).unwrap().id;
        assert_eq!(fixture.device.uniform(program, "uTexture"), Some(UniformValue::Int(0)));
        assert_eq!(fixture.device.draws()[0].textures, vec![(0, dice)]);
    }

    #[test]
    fn test_execute_before_setup_is_not_initialized() {
        let mut fixture = Fixture::new();
        let mut lane = TexturedQuadLane::new();
        assert!(matches!(fixture.run(&mut lane), Err(RenderError::NotInitialized)));
    }
}
