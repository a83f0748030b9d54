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

use crate::math::Extent2D;
use crate::renderer::api::*;
use crate::renderer::error::ResourceError;
use std::fmt::Debug;

/// The contract every graphics backend implements.
///
/// Command submission is single-threaded and synchronous: every call executes
/// in program order on the thread that owns the device, which is why methods
/// take `&mut self`.
pub trait GraphicsDevice: Debug {
    /// Returns the hardware limits queried at startup.
    fn limits(&self) -> DeviceLimits;

    /// Returns driver identification strings.
    fn adapter_info(&self) -> AdapterInfo;

    /// Compiles both stages and links them into a program.
    /// ## Arguments
    /// * `source` - The fully composed stage sources.
    /// ## Returns
    /// A [`ProgramCompilation`] that always carries a handle; compile and link
    /// failures are reported in its logs rather than as an error.
    /// ## Errors
    /// * `ResourceError` - Only if the backend could not allocate the program object at all.
    fn create_program(
        &mut self,
        source: &ProgramSource,
    ) -> Result<ProgramCompilation, ResourceError>;

    /// Destroys a program.
    fn destroy_program(&mut self, id: ProgramId) -> Result<(), ResourceError>;

    /// Makes `id` the active program, or unbinds with `None`.
    fn use_program(&mut self, id: Option<ProgramId>) -> Result<(), ResourceError>;

    /// Sets a plain uniform on `program`. Unknown names are ignored, like the driver does.
    /// ## Arguments
    /// * `program` - The program that owns the uniform. It must be the active program.
    /// * `name` - The uniform's name in the shader source.
    /// * `value` - The value to upload.
    fn set_uniform(
        &mut self,
        program: ProgramId,
        name: &str,
        value: UniformValue,
    ) -> Result<(), ResourceError>;

    /// Assigns the uniform block `block` of `program` to the binding point `binding`.
    fn bind_uniform_block(
        &mut self,
        program: ProgramId,
        block: &str,
        binding: u32,
    ) -> Result<(), ResourceError>;

    /// Creates a new GPU buffer, optionally filled with `contents`.
    /// ## Arguments
    /// * `descriptor` - The buffer configuration.
    /// * `contents` - Initial data. Must be exactly `descriptor.size` bytes when present.
    fn create_buffer(
        &mut self,
        descriptor: &BufferDescriptor,
        contents: Option<&[u8]>,
    ) -> Result<BufferId, ResourceError>;

    /// Destroys a GPU buffer.
    fn destroy_buffer(&mut self, id: BufferId) -> Result<(), ResourceError>;

    /// Maps the whole buffer for writing, discarding its previous contents.
    fn map_buffer(&mut self, id: BufferId) -> Result<(), ResourceError>;

    /// Copies `data` into the mapped buffer at `offset`.
    /// ## Errors
    /// * `ResourceError::OutOfBounds` - If the write runs past the buffer end.
    /// * `ResourceError::BackendError` - If the buffer is not mapped.
    fn write_mapped(&mut self, id: BufferId, offset: u64, data: &[u8]) -> Result<(), ResourceError>;

    /// Unmaps the buffer, making the written bytes visible to draws.
    fn unmap_buffer(&mut self, id: BufferId) -> Result<(), ResourceError>;

    /// Binds `[offset, offset + size)` of a uniform buffer to a block binding point.
    fn bind_buffer_range(
        &mut self,
        binding: u32,
        id: BufferId,
        offset: u64,
        size: u64,
    ) -> Result<(), ResourceError>;

    /// Creates a 2D texture, optionally uploading level 0 from `pixels`.
    /// Mipmaps are generated when the descriptor asks for them.
    fn create_texture(
        &mut self,
        descriptor: &TextureDescriptor,
        pixels: Option<&[u8]>,
    ) -> Result<TextureId, ResourceError>;

    /// Destroys a texture.
    fn destroy_texture(&mut self, id: TextureId) -> Result<(), ResourceError>;

    /// Binds `texture` to texture unit `unit`.
    fn bind_texture(&mut self, unit: u32, texture: Option<TextureId>) -> Result<(), ResourceError>;

    /// Creates a vertex array linking buffers to attribute locations.
    fn create_vertex_array(
        &mut self,
        descriptor: &VertexArrayDescriptor,
    ) -> Result<VertexArrayId, ResourceError>;

    /// Destroys a vertex array.
    fn destroy_vertex_array(&mut self, id: VertexArrayId) -> Result<(), ResourceError>;

    /// Binds a vertex array for subsequent draws.
    fn bind_vertex_array(&mut self, id: Option<VertexArrayId>) -> Result<(), ResourceError>;

    /// Creates a framebuffer with the given attachments.
    fn create_framebuffer(
        &mut self,
        descriptor: &FramebufferDescriptor,
    ) -> Result<FramebufferId, ResourceError>;

    /// Destroys a framebuffer. Attached textures are left alive.
    fn destroy_framebuffer(&mut self, id: FramebufferId) -> Result<(), ResourceError>;

    /// Checks whether the framebuffer can be rendered into.
    fn framebuffer_status(&mut self, id: FramebufferId) -> Result<FramebufferStatus, ResourceError>;

    /// Binds `target` for drawing and clearing.
    /// ## Arguments
    /// * `target` - The framebuffer to bind.
    /// * `draw_attachments` - The colour attachment indices that receive fragment
    ///   outputs `0..n`. Ignored for [`RenderTarget::Default`].
    fn bind_render_target(
        &mut self,
        target: RenderTarget,
        draw_attachments: &[u32],
    ) -> Result<(), ResourceError>;

    /// Copies pixels between two targets. Leaves the default target bound for drawing.
    fn blit(&mut self, descriptor: &BlitDescriptor) -> Result<(), ResourceError>;

    /// Clears the bound target.
    fn clear(&mut self, descriptor: &ClearDescriptor);

    /// Sets the viewport to `(0, 0, extent)`.
    fn set_viewport(&mut self, extent: Extent2D);

    /// Applies fixed-function state.
    fn set_render_state(&mut self, state: &RenderState);

    /// Draws `count` indices starting `byte_offset` bytes into the bound index buffer.
    fn draw_indexed(
        &mut self,
        topology: Topology,
        format: IndexFormat,
        count: u32,
        byte_offset: u64,
    );

    /// Draws `count` vertices starting at `first`, without indices.
    fn draw_arrays(&mut self, topology: Topology, first: u32, count: u32);

    /// Drains the device error codes raised since the last call.
    fn take_errors(&mut self) -> Vec<u32>;
}
