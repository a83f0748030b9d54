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

//! Rendering lanes: one per render mode, plus the targets, shapes and uniform
//! packing they share.

use std::fmt::Debug;
use std::path::Path;
use tessel_core::asset::ImageLoader;
use tessel_core::math::Extent2D;
use tessel_core::renderer::{
    ClearDescriptor, GraphicsDevice, ProgramId, RenderError, RenderSettings, RenderState,
    ResourceError, UniformArena,
};
use tessel_data::assets::{MaterialHandle, Mesh, ProgramHandle, ResourceCache};
use tessel_data::scene::Scene;

mod deferred_lane;
mod forward_lane;
pub mod geometry;
pub mod programs;
pub mod samplers;
pub mod targets;
#[cfg(test)]
mod test_support;
mod textured_quad_lane;
pub mod uniforms;

pub use deferred_lane::*;
pub use forward_lane::*;
pub use geometry::{GeometryCache, Shape};
pub use targets::RenderTargets;
pub use textured_quad_lane::*;

/// A coarse pass executed during a frame, in submission order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PassKind {
    /// The textured-quad demo draw.
    TexturedQuad,
    /// The single forward pass.
    Forward,
    /// Deferred pass 1: fill the G-buffer.
    Geometry,
    /// Deferred pass 2: resolve lighting into the default target.
    Lighting,
    /// The light gizmo overlay.
    Gizmo,
}

/// What a lane did during one frame.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FrameStats {
    /// Passes in execution order.
    pub passes: Vec<PassKind>,
    /// Indexed draws issued.
    pub draw_calls: u32,
}

/// Everything a lane may touch while loading its programs and textures.
pub struct SetupContext<'a> {
    /// The device.
    pub device: &'a mut dyn GraphicsDevice,
    /// The resource cache.
    pub cache: &'a mut ResourceCache,
    /// Decoder for image files.
    pub images: &'a dyn ImageLoader,
    /// The shader family file.
    pub shader_path: &'a Path,
    /// Texture of the textured-quad demo.
    pub quad_texture: &'a Path,
}

/// Everything a lane may touch while rendering one frame.
pub struct FrameContext<'a> {
    /// The device.
    pub device: &'a mut dyn GraphicsDevice,
    /// The resource cache.
    pub cache: &'a mut ResourceCache,
    /// The per-frame uniform arena.
    pub arena: &'a mut UniformArena,
    /// The off-screen G-buffer.
    pub targets: &'a RenderTargets,
    /// Procedural shapes.
    pub geometry: &'a mut GeometryCache,
    /// Camera, lights and entities.
    pub scene: &'a mut Scene,
    /// The active settings.
    pub settings: &'a RenderSettings,
    /// Size of the default target.
    pub display: Extent2D,
    /// Filled in by the lane.
    pub stats: &'a mut FrameStats,
}

/// A rendering strategy for one [`RenderMode`](tessel_core::renderer::RenderMode).
///
/// The agent calls [`setup`](Self::setup) once, then [`execute`](Self::execute)
/// every frame the lane's mode is selected. Lanes never switch modes themselves.
pub trait RenderLane: Debug + Send + Sync {
    /// A human-readable name for logs.
    fn strategy_name(&self) -> &'static str;

    /// Loads the programs and textures the lane needs.
    ///
    /// Compile failures are not errors: the program is kept and logged, and the
    /// lane renders with it anyway.
    fn setup(&mut self, ctx: &mut SetupContext<'_>) -> Result<(), ResourceError>;

    /// Records one frame.
    fn execute(&mut self, ctx: &mut FrameContext<'_>) -> Result<(), RenderError>;
}

/// Binds the off-screen target with `draw_attachments`, clears it and applies
/// the viewport and fixed-function state every pass starts from.
pub(crate) fn begin_frame(
    ctx: &mut FrameContext<'_>,
    draw_attachments: &[u32],
) -> Result<(), RenderError> {
    ctx.device
        .bind_render_target(ctx.targets.target(), draw_attachments)?;
    ctx.device
        .clear(&ClearDescriptor::color_and_depth(ctx.settings.clear_color));
    ctx.device.set_viewport(ctx.display);
    ctx.device.set_render_state(&RenderState {
        depth_test: true,
        alpha_blend: true,
    });
    Ok(())
}

/// Looks up the id of a program loaded during setup.
pub(crate) fn program_id(
    cache: &ResourceCache,
    handle: ProgramHandle,
) -> Result<ProgramId, RenderError> {
    cache
        .program(handle)
        .map(|program| program.id)
        .ok_or(RenderError::NotInitialized)
}

/// Draws every submesh of every entity with `program`, which must be active.
///
/// Before each entity its local block is bound to binding point 1. Before each
/// submesh `bind_material` binds that submesh's material.
pub(crate) fn draw_entities(
    ctx: &mut FrameContext<'_>,
    program: ProgramHandle,
    mut bind_material: impl FnMut(
        &mut dyn GraphicsDevice,
        &ResourceCache,
        MaterialHandle,
    ) -> Result<(), ResourceError>,
) -> Result<(), RenderError> {
    for entity in &ctx.scene.entities {
        let Some(local) = entity.local_range else {
            log::trace!("Entity without a local block this frame, skipped");
            continue;
        };
        let Some(model) = ctx.cache.model(entity.model) else {
            continue;
        };
        let mesh = model.mesh;
        let submesh_count = ctx.cache.mesh(mesh).map_or(0, |m| m.submeshes.len());
        uniforms::bind_locals(ctx.device, ctx.arena, local)?;

        for index in 0..submesh_count {
            let vertex_array = match ctx.cache.submesh_binding(ctx.device, mesh, index, program) {
                Ok(vertex_array) => vertex_array,
                // Already reported by the binding cache.
                Err(ResourceError::MissingVertexAttribute { .. }) => continue,
                Err(err) => return Err(err.into()),
            };

            let material = ctx
                .cache
                .model(entity.model)
                .and_then(|model| model.materials.get(index).copied())
                .unwrap_or_else(|| ctx.cache.default_material());
            bind_material(ctx.device, ctx.cache, material)?;

            let Some(submesh) = ctx.cache.mesh(mesh).and_then(|m| m.submeshes.get(index)) else {
                continue;
            };
            ctx.device.bind_vertex_array(Some(vertex_array))?;
            ctx.device.draw_indexed(
                submesh.topology,
                Mesh::INDEX_FORMAT,
                submesh.index_count,
                submesh.index_offset,
            );
            ctx.stats.draw_calls += 1;
        }
    }
    ctx.device.bind_vertex_array(None)?;
    Ok(())
}
