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

//! A recording [`GraphicsDevice`] for unit and integration tests.
//!
//! [`RecordingDevice`] hands out monotonically increasing IDs, keeps buffer
//! contents in memory so uploads can be read back, records every state change
//! and draw in order, and tracks which textures received pixels. It raises the
//! same error codes a GL driver would for the misuses the renderer must avoid:
//! drawing while a bound uniform buffer is still mapped, and binding a uniform
//! range at a misaligned offset.

use crate::math::Extent2D;
use crate::renderer::api::*;
use crate::renderer::error::ResourceError;
use crate::renderer::traits::GraphicsDevice;
use std::collections::{HashMap, HashSet};

/// `GL_INVALID_VALUE`.
pub const INVALID_VALUE: u32 = 0x0501;
/// `GL_INVALID_OPERATION`.
pub const INVALID_OPERATION: u32 = 0x0502;

/// One recorded device call.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// `use_program`.
    UseProgram(Option<ProgramId>),
    /// `set_uniform`.
    SetUniform {
        /// The target program.
        program: ProgramId,
        /// The uniform name.
        name: String,
        /// The value.
        value: UniformValue,
    },
    /// `bind_buffer_range`.
    BindBufferRange {
        /// The block binding point.
        binding: u32,
        /// The buffer.
        buffer: BufferId,
        /// Byte offset.
        offset: u64,
        /// Byte size.
        size: u64,
    },
    /// `bind_texture`.
    BindTexture {
        /// The texture unit.
        unit: u32,
        /// The texture.
        texture: Option<TextureId>,
    },
    /// `bind_vertex_array`.
    BindVertexArray(Option<VertexArrayId>),
    /// `bind_render_target`.
    BindRenderTarget {
        /// The target.
        target: RenderTarget,
        /// Enabled colour attachments.
        draw_attachments: Vec<u32>,
    },
    /// `clear`.
    Clear(RenderTarget),
    /// `map_buffer`.
    MapBuffer(BufferId),
    /// `unmap_buffer`.
    UnmapBuffer(BufferId),
    /// A draw call.
    Draw(DrawCall),
    /// `blit`.
    Blit(BlitDescriptor),
}

/// Snapshot of the bound state at the time of a draw.
#[derive(Debug, Clone, PartialEq)]
pub struct DrawCall {
    /// The bound render target.
    pub target: RenderTarget,
    /// Colour attachments receiving output.
    pub draw_attachments: Vec<u32>,
    /// The active program.
    pub program: Option<ProgramId>,
    /// The bound vertex array.
    pub vertex_array: Option<VertexArrayId>,
    /// Textures bound per unit.
    pub textures: Vec<(u32, TextureId)>,
    /// Uniform ranges bound per binding point: `(binding, buffer, offset, size)`.
    pub uniform_ranges: Vec<(u32, BufferId, u64, u64)>,
    /// Primitive topology.
    pub topology: Topology,
    /// Index format, `None` for array draws.
    pub index_format: Option<IndexFormat>,
    /// Number of indices or vertices.
    pub count: u32,
    /// Byte offset into the index buffer, or the first vertex for array draws.
    pub offset: u64,
}

/// A buffer kept in memory.
#[derive(Debug, Clone)]
pub struct BufferRecord {
    /// The buffer kind.
    pub kind: BufferKind,
    /// Current contents.
    pub data: Vec<u8>,
    /// `true` while mapped.
    pub mapped: bool,
}

/// A texture kept in memory.
#[derive(Debug, Clone)]
pub struct TextureRecord {
    /// Debug label.
    pub label: Option<String>,
    /// Size of level 0.
    pub size: Extent2D,
    /// Texel format.
    pub format: TextureFormat,
    /// Level-0 pixels, if uploaded.
    pub pixels: Option<Vec<u8>>,
    /// Whether mipmaps were generated.
    pub mipmapped: bool,
}

/// A vertex array kept in memory.
#[derive(Debug, Clone)]
pub struct VertexArrayRecord {
    /// The vertex buffer.
    pub vertex_buffer: BufferId,
    /// The index buffer.
    pub index_buffer: Option<BufferId>,
    /// Vertex stride in bytes.
    pub stride: u32,
    /// Attribute pointers.
    pub attributes: Vec<VertexAttributeBinding>,
}

#[derive(Debug, Clone)]
struct ProgramRecord {
    label: String,
}

#[derive(Debug, Clone)]
struct FramebufferRecord {
    color: Vec<TextureId>,
    depth: Option<TextureId>,
}

/// A fake graphics device that records everything it is asked to do.
#[derive(Debug)]
pub struct RecordingDevice {
    limits: DeviceLimits,
    next_id: usize,
    programs: HashMap<ProgramId, ProgramRecord>,
    buffers: HashMap<BufferId, BufferRecord>,
    textures: HashMap<TextureId, TextureRecord>,
    vertex_arrays: HashMap<VertexArrayId, VertexArrayRecord>,
    framebuffers: HashMap<FramebufferId, FramebufferRecord>,
    failing_programs: Vec<String>,
    forced_status: Option<FramebufferStatus>,

    target: RenderTarget,
    draw_attachments: Vec<u32>,
    program: Option<ProgramId>,
    vertex_array: Option<VertexArrayId>,
    texture_units: HashMap<u32, TextureId>,
    uniform_ranges: HashMap<u32, (BufferId, u64, u64)>,
    uniforms: HashMap<(ProgramId, String), UniformValue>,
    block_bindings: HashMap<(ProgramId, String), u32>,
    render_state: Option<RenderState>,
    viewport: Option<Extent2D>,

    commands: Vec<Command>,
    written: HashSet<TextureId>,
    default_target_written: bool,
    errors: Vec<u32>,
}

impl Default for RecordingDevice {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordingDevice {
    /// Creates a device reporting [`DeviceLimits::default`].
    pub fn new() -> Self {
        Self::with_limits(DeviceLimits::default())
    }

    /// Creates a device reporting the given limits.
    pub fn with_limits(limits: DeviceLimits) -> Self {
        Self {
            limits,
            next_id: 1,
            programs: HashMap::new(),
            buffers: HashMap::new(),
            textures: HashMap::new(),
            vertex_arrays: HashMap::new(),
            framebuffers: HashMap::new(),
            failing_programs: Vec::new(),
            forced_status: None,
            target: RenderTarget::Default,
            draw_attachments: vec![0],
            program: None,
            vertex_array: None,
            texture_units: HashMap::new(),
            uniform_ranges: HashMap::new(),
            uniforms: HashMap::new(),
            block_bindings: HashMap::new(),
            render_state: None,
            viewport: None,
            commands: Vec::new(),
            written: HashSet::new(),
            default_target_written: false,
            errors: Vec::new(),
        }
    }

    /// Makes every program whose label contains `pattern` fail its fragment stage.
    pub fn fail_programs_containing(&mut self, pattern: impl Into<String>) {
        self.failing_programs.push(pattern.into());
    }

    /// Overrides the status every framebuffer reports.
    pub fn force_framebuffer_status(&mut self, status: FramebufferStatus) {
        self.forced_status = Some(status);
    }

    /// Every recorded command, in order.
    pub fn commands(&self) -> &[Command] {
        &self.commands
    }

    /// Forgets recorded commands and written-texture tracking.
    pub fn clear_commands(&mut self) {
        self.commands.clear();
        self.written.clear();
        self.default_target_written = false;
    }

    /// Every recorded draw call, in order.
    pub fn draws(&self) -> Vec<&DrawCall> {
        self.commands
            .iter()
            .filter_map(|c| match c {
                Command::Draw(draw) => Some(draw),
                _ => None,
            })
            .collect()
    }

    /// Every recorded blit, in order.
    pub fn blits(&self) -> Vec<&BlitDescriptor> {
        self.commands
            .iter()
            .filter_map(|c| match c {
                Command::Blit(blit) => Some(blit),
                _ => None,
            })
            .collect()
    }

    /// Returns `true` if a clear, draw or blit wrote into `texture`.
    pub fn was_written(&self, texture: TextureId) -> bool {
        self.written.contains(&texture)
    }

    /// Returns `true` if anything was drawn or blitted into the default target.
    pub fn default_target_written(&self) -> bool {
        self.default_target_written
    }

    /// The current contents of a buffer.
    pub fn buffer_contents(&self, id: BufferId) -> Option<&[u8]> {
        self.buffers.get(&id).map(|b| b.data.as_slice())
    }

    /// A texture's record.
    pub fn texture(&self, id: TextureId) -> Option<&TextureRecord> {
        self.textures.get(&id)
    }

    /// A vertex array's record.
    pub fn vertex_array(&self, id: VertexArrayId) -> Option<&VertexArrayRecord> {
        self.vertex_arrays.get(&id)
    }

    /// The last value set for `name` on `program`.
    pub fn uniform(&self, program: ProgramId, name: &str) -> Option<UniformValue> {
        self.uniforms.get(&(program, name.to_string())).copied()
    }

    /// The binding point assigned to a program's uniform block.
    pub fn block_binding(&self, program: ProgramId, block: &str) -> Option<u32> {
        self.block_bindings.get(&(program, block.to_string())).copied()
    }

    /// The label a program was created with.
    pub fn program_label(&self, id: ProgramId) -> Option<&str> {
        self.programs.get(&id).map(|p| p.label.as_str())
    }

    /// Number of live programs.
    pub fn program_count(&self) -> usize {
        self.programs.len()
    }

    /// Number of live textures.
    pub fn texture_count(&self) -> usize {
        self.textures.len()
    }

    /// Number of live vertex arrays.
    pub fn vertex_array_count(&self) -> usize {
        self.vertex_arrays.len()
    }

    /// Number of live buffers.
    pub fn buffer_count(&self) -> usize {
        self.buffers.len()
    }

    /// The last viewport set.
    pub fn viewport(&self) -> Option<Extent2D> {
        self.viewport
    }

    /// The last render state applied.
    pub fn render_state(&self) -> Option<RenderState> {
        self.render_state
    }

    fn allocate(&mut self) -> usize {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    fn mark_target_written(&mut self, target: RenderTarget, color: bool, depth: bool) {
        match target {
            RenderTarget::Default => self.default_target_written = true,
            RenderTarget::Offscreen(fb) => {
                let Some(record) = self.framebuffers.get(&fb) else {
                    return;
                };
                if color {
                    for &attachment in &self.draw_attachments {
                        if let Some(texture) = record.color.get(attachment as usize) {
                            self.written.insert(*texture);
                        }
                    }
                }
                if depth {
                    if let Some(texture) = record.depth {
                        self.written.insert(texture);
                    }
                }
            }
        }
    }

    fn record_draw(
        &mut self,
        topology: Topology,
        index_format: Option<IndexFormat>,
        count: u32,
        offset: u64,
    ) {
        if self.program.is_none() {
            self.errors.push(INVALID_OPERATION);
        }
        if index_format.is_some() && self.vertex_array.is_none() {
            self.errors.push(INVALID_OPERATION);
        }
        let mapped_in_use = self
            .uniform_ranges
            .values()
            .any(|(buffer, _, _)| self.buffers.get(buffer).is_some_and(|b| b.mapped));
        if mapped_in_use {
            self.errors.push(INVALID_OPERATION);
        }

        let mut textures: Vec<(u32, TextureId)> =
            self.texture_units.iter().map(|(u, t)| (*u, *t)).collect();
        textures.sort();
        let mut uniform_ranges: Vec<(u32, BufferId, u64, u64)> = self
            .uniform_ranges
            .iter()
            .map(|(binding, (b, o, s))| (*binding, *b, *o, *s))
            .collect();
        uniform_ranges.sort_by_key(|r| r.0);

        let depth = self.render_state.is_some_and(|s| s.depth_test);
        self.mark_target_written(self.target, true, depth);
        self.commands.push(Command::Draw(DrawCall {
            target: self.target,
            draw_attachments: self.draw_attachments.clone(),
            program: self.program,
            vertex_array: self.vertex_array,
            textures,
            uniform_ranges,
            topology,
            index_format,
            count,
            offset,
        }));
    }

    fn target_size(&self, target: RenderTarget) -> Option<Extent2D> {
        match target {
            RenderTarget::Default => None,
            RenderTarget::Offscreen(fb) => self
                .framebuffers
                .get(&fb)
                .and_then(|r| r.color.first().or(r.depth.as_ref()))
                .and_then(|t| self.textures.get(t))
                .map(|t| t.size),
        }
    }
}

impl GraphicsDevice for RecordingDevice {
    fn limits(&self) -> DeviceLimits {
        self.limits
    }

    fn adapter_info(&self) -> AdapterInfo {
        AdapterInfo {
            version: "4.3 (recording)".to_string(),
            renderer: "RecordingDevice".to_string(),
            vendor: "tessel".to_string(),
            shading_language_version: "4.30".to_string(),
            extensions: Vec::new(),
        }
    }

    fn create_program(
        &mut self,
        source: &ProgramSource,
    ) -> Result<ProgramCompilation, ResourceError> {
        let id = ProgramId(self.allocate());
        let fails = self
            .failing_programs
            .iter()
            .any(|pattern| source.label.contains(pattern.as_str()));
        self.programs.insert(
            id,
            ProgramRecord {
                label: source.label.to_string(),
            },
        );
        Ok(ProgramCompilation {
            id,
            vertex_log: None,
            fragment_log: fails.then(|| "0:1: scripted compile failure".to_string()),
            link_log: fails.then(|| "fragment shader failed to compile".to_string()),
            attributes: Vec::new(),
        })
    }

    fn destroy_program(&mut self, id: ProgramId) -> Result<(), ResourceError> {
        self.programs
            .remove(&id)
            .map(|_| ())
            .ok_or(ResourceError::InvalidHandle)
    }

    fn use_program(&mut self, id: Option<ProgramId>) -> Result<(), ResourceError> {
        if let Some(id) = id {
            if !self.programs.contains_key(&id) {
                return Err(ResourceError::InvalidHandle);
            }
        }
        self.program = id;
        self.commands.push(Command::UseProgram(id));
        Ok(())
    }

    fn set_uniform(
        &mut self,
        program: ProgramId,
        name: &str,
        value: UniformValue,
    ) -> Result<(), ResourceError> {
        if !self.programs.contains_key(&program) {
            return Err(ResourceError::InvalidHandle);
        }
        if self.program != Some(program) {
            self.errors.push(INVALID_OPERATION);
        }
        self.uniforms.insert((program, name.to_string()), value);
        self.commands.push(Command::SetUniform {
            program,
            name: name.to_string(),
            value,
        });
        Ok(())
    }

    fn bind_uniform_block(
        &mut self,
        program: ProgramId,
        block: &str,
        binding: u32,
    ) -> Result<(), ResourceError> {
        if !self.programs.contains_key(&program) {
            return Err(ResourceError::InvalidHandle);
        }
        self.block_bindings.insert((program, block.to_string()), binding);
        Ok(())
    }

    fn create_buffer(
        &mut self,
        descriptor: &BufferDescriptor,
        contents: Option<&[u8]>,
    ) -> Result<BufferId, ResourceError> {
        let data = match contents {
            Some(bytes) if bytes.len() as u64 != descriptor.size => {
                return Err(ResourceError::OutOfBounds)
            }
            Some(bytes) => bytes.to_vec(),
            None => vec![0; descriptor.size as usize],
        };
        let id = BufferId(self.allocate());
        self.buffers.insert(
            id,
            BufferRecord {
                kind: descriptor.kind,
                data,
                mapped: false,
            },
        );
        Ok(id)
    }

    fn destroy_buffer(&mut self, id: BufferId) -> Result<(), ResourceError> {
        self.buffers
            .remove(&id)
            .map(|_| ())
            .ok_or(ResourceError::InvalidHandle)
    }

    fn map_buffer(&mut self, id: BufferId) -> Result<(), ResourceError> {
        let buffer = self.buffers.get_mut(&id).ok_or(ResourceError::InvalidHandle)?;
        if buffer.mapped {
            return Err(ResourceError::BackendError(format!("{id:?} is already mapped")));
        }
        buffer.mapped = true;
        buffer.data.fill(0);
        self.commands.push(Command::MapBuffer(id));
        Ok(())
    }

    fn write_mapped(
        &mut self,
        id: BufferId,
        offset: u64,
        data: &[u8],
    ) -> Result<(), ResourceError> {
        let buffer = self.buffers.get_mut(&id).ok_or(ResourceError::InvalidHandle)?;
        if !buffer.mapped {
            return Err(ResourceError::BackendError(format!("{id:?} is not mapped")));
        }
        let start = offset as usize;
        let end = start + data.len();
        if end > buffer.data.len() {
            return Err(ResourceError::OutOfBounds);
        }
        buffer.data[start..end].copy_from_slice(data);
        Ok(())
    }

    fn unmap_buffer(&mut self, id: BufferId) -> Result<(), ResourceError> {
        let buffer = self.buffers.get_mut(&id).ok_or(ResourceError::InvalidHandle)?;
        if !buffer.mapped {
            return Err(ResourceError::BackendError(format!("{id:?} is not mapped")));
        }
        buffer.mapped = false;
        self.commands.push(Command::UnmapBuffer(id));
        Ok(())
    }

    fn bind_buffer_range(
        &mut self,
        binding: u32,
        id: BufferId,
        offset: u64,
        size: u64,
    ) -> Result<(), ResourceError> {
        let buffer = self.buffers.get(&id).ok_or(ResourceError::InvalidHandle)?;
        if offset + size > buffer.data.len() as u64
            || offset % self.limits.uniform_buffer_offset_alignment as u64 != 0
            || size == 0
        {
            self.errors.push(INVALID_VALUE);
        }
        self.uniform_ranges.insert(binding, (id, offset, size));
        self.commands.push(Command::BindBufferRange {
            binding,
            buffer: id,
            offset,
            size,
        });
        Ok(())
    }

    fn create_texture(
        &mut self,
        descriptor: &TextureDescriptor,
        pixels: Option<&[u8]>,
    ) -> Result<TextureId, ResourceError> {
        if let Some(pixels) = pixels {
            if pixels.len() != descriptor.expected_upload_size() {
                return Err(ResourceError::OutOfBounds);
            }
        }
        if descriptor.mag_filter == FilterMode::LinearMipmapLinear {
            self.errors.push(INVALID_VALUE);
        }
        let id = TextureId(self.allocate());
        self.textures.insert(
            id,
            TextureRecord {
                label: descriptor.label.as_ref().map(|l| l.to_string()),
                size: descriptor.size,
                format: descriptor.format,
                pixels: pixels.map(<[u8]>::to_vec),
                mipmapped: descriptor.generate_mipmaps,
            },
        );
        Ok(id)
    }

    fn destroy_texture(&mut self, id: TextureId) -> Result<(), ResourceError> {
        self.textures
            .remove(&id)
            .map(|_| ())
            .ok_or(ResourceError::InvalidHandle)
    }

    fn bind_texture(&mut self, unit: u32, texture: Option<TextureId>) -> Result<(), ResourceError> {
        match texture {
            Some(t) if !self.textures.contains_key(&t) => return Err(ResourceError::InvalidHandle),
            Some(t) => {
                self.texture_units.insert(unit, t);
            }
            None => {
                self.texture_units.remove(&unit);
            }
        }
        self.commands.push(Command::BindTexture { unit, texture });
        Ok(())
    }

    fn create_vertex_array(
        &mut self,
        descriptor: &VertexArrayDescriptor,
    ) -> Result<VertexArrayId, ResourceError> {
        if !self.buffers.contains_key(&descriptor.vertex_buffer) {
            return Err(ResourceError::InvalidHandle);
        }
        let id = VertexArrayId(self.allocate());
        self.vertex_arrays.insert(
            id,
            VertexArrayRecord {
                vertex_buffer: descriptor.vertex_buffer,
                index_buffer: descriptor.index_buffer,
                stride: descriptor.stride,
                attributes: descriptor.attributes.to_vec(),
            },
        );
        Ok(id)
    }

    fn destroy_vertex_array(&mut self, id: VertexArrayId) -> Result<(), ResourceError> {
        self.vertex_arrays
            .remove(&id)
            .map(|_| ())
            .ok_or(ResourceError::InvalidHandle)
    }

    fn bind_vertex_array(&mut self, id: Option<VertexArrayId>) -> Result<(), ResourceError> {
        if let Some(id) = id {
            if !self.vertex_arrays.contains_key(&id) {
                return Err(ResourceError::InvalidHandle);
            }
        }
        self.vertex_array = id;
        self.commands.push(Command::BindVertexArray(id));
        Ok(())
    }

    fn create_framebuffer(
        &mut self,
        descriptor: &FramebufferDescriptor,
    ) -> Result<FramebufferId, ResourceError> {
        let attachments = descriptor
            .color_attachments
            .iter()
            .chain(descriptor.depth_attachment.iter());
        for texture in attachments {
            if !self.textures.contains_key(texture) {
                return Err(ResourceError::InvalidHandle);
            }
        }
        let id = FramebufferId(self.allocate());
        self.framebuffers.insert(
            id,
            FramebufferRecord {
                color: descriptor.color_attachments.to_vec(),
                depth: descriptor.depth_attachment,
            },
        );
        Ok(id)
    }

    fn destroy_framebuffer(&mut self, id: FramebufferId) -> Result<(), ResourceError> {
        self.framebuffers
            .remove(&id)
            .map(|_| ())
            .ok_or(ResourceError::InvalidHandle)
    }

    fn framebuffer_status(
        &mut self,
        id: FramebufferId,
    ) -> Result<FramebufferStatus, ResourceError> {
        let record = self.framebuffers.get(&id).ok_or(ResourceError::InvalidHandle)?;
        if let Some(status) = self.forced_status {
            return Ok(status);
        }
        if record.color.is_empty() && record.depth.is_none() {
            return Ok(FramebufferStatus::MissingAttachment);
        }

        let mut size = None;
        for (index, texture) in record.color.iter().enumerate() {
            let Some(tex) = self.textures.get(texture) else {
                return Ok(FramebufferStatus::IncompleteAttachment);
            };
            if tex.format.is_depth() {
                log::trace!("colour attachment {index} has a depth format");
                return Ok(FramebufferStatus::IncompleteAttachment);
            }
            if *size.get_or_insert(tex.size) != tex.size {
                return Ok(FramebufferStatus::IncompleteDimensions);
            }
        }
        if let Some(depth) = record.depth {
            let Some(tex) = self.textures.get(&depth) else {
                return Ok(FramebufferStatus::IncompleteAttachment);
            };
            if !tex.format.is_depth() {
                return Ok(FramebufferStatus::IncompleteAttachment);
            }
            if *size.get_or_insert(tex.size) != tex.size {
                return Ok(FramebufferStatus::IncompleteDimensions);
            }
        }
        Ok(FramebufferStatus::Complete)
    }

    fn bind_render_target(
        &mut self,
        target: RenderTarget,
        draw_attachments: &[u32],
    ) -> Result<(), ResourceError> {
        if let RenderTarget::Offscreen(fb) = target {
            let record = self.framebuffers.get(&fb).ok_or(ResourceError::InvalidHandle)?;
            if draw_attachments
                .iter()
                .any(|&a| a as usize >= record.color.len())
            {
                self.errors.push(INVALID_OPERATION);
            }
            self.draw_attachments = draw_attachments.to_vec();
        } else {
            self.draw_attachments = vec![0];
        }
        self.target = target;
        self.commands.push(Command::BindRenderTarget {
            target,
            draw_attachments: self.draw_attachments.clone(),
        });
        Ok(())
    }

    fn blit(&mut self, descriptor: &BlitDescriptor) -> Result<(), ResourceError> {
        if descriptor.mask == BlitMask::Depth && descriptor.filter != FilterMode::Nearest {
            self.errors.push(INVALID_OPERATION);
        }
        if let Some(size) = self.target_size(descriptor.source) {
            if size != descriptor.source_extent {
                log::trace!("blit source extent differs from attachment size");
            }
        }
        self.commands.push(Command::Blit(*descriptor));
        // Blits write the destination and leave it bound for drawing.
        self.target = descriptor.destination;
        let is_color = descriptor.mask == BlitMask::Color;
        self.mark_target_written(descriptor.destination, is_color, !is_color);
        Ok(())
    }

    fn clear(&mut self, descriptor: &ClearDescriptor) {
        self.mark_target_written(self.target, descriptor.color.is_some(), descriptor.depth);
        self.commands.push(Command::Clear(self.target));
    }

    fn set_viewport(&mut self, extent: Extent2D) {
        self.viewport = Some(extent);
    }

    fn set_render_state(&mut self, state: &RenderState) {
        self.render_state = Some(*state);
    }

    fn draw_indexed(
        &mut self,
        topology: Topology,
        format: IndexFormat,
        count: u32,
        byte_offset: u64,
    ) {
        self.record_draw(topology, Some(format), count, byte_offset);
    }

    fn draw_arrays(&mut self, topology: Topology, first: u32, count: u32) {
        self.record_draw(topology, None, count, first as u64);
    }

    fn take_errors(&mut self) -> Vec<u32> {
        std::mem::take(&mut self.errors)
    }
}
