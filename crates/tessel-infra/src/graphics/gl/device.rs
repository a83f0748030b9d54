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

use super::conversions::{self, GlTextureFormat, IntoGl};
use anyhow::bail;
use eframe::glow::{self, HasContext};
use std::collections::HashMap;
use std::ops::Range;
use std::ptr::NonNull;
use std::sync::Arc;
use tessel_core::math::Extent2D;
use tessel_core::renderer::api::*;
use tessel_core::renderer::{GraphicsDevice, ResourceError};

/// Uniform buffers, `glMapBufferRange` and `#version 430` shaders.
const REQUIRED_GL_VERSION: (u32, u32) = (4, 3);

/// Upper bound on `glGetError` polls per frame; a lost context reports forever.
const MAX_ERRORS_PER_DRAIN: usize = 64;

#[derive(Debug)]
struct GlProgramEntry {
    program: glow::Program,
    label: String,
    uniform_locations: HashMap<String, Option<glow::UniformLocation>>,
}

/// Pointer returned by `glMapBufferRange`, valid until the buffer is unmapped.
#[derive(Debug)]
struct MappedPtr(NonNull<u8>);

// SAFETY: the pointer is only dereferenced through `&mut GlDevice`, on the
// thread that owns the GL context, between map and unmap.
unsafe impl Send for MappedPtr {}

#[derive(Debug)]
struct GlBufferEntry {
    buffer: glow::Buffer,
    size: u64,
    mapped: Option<MappedPtr>,
}

#[derive(Debug)]
struct GlTextureEntry {
    texture: glow::Texture,
    format: TextureFormat,
}

#[derive(Debug)]
struct GlFramebufferEntry {
    framebuffer: glow::Framebuffer,
    color_count: u32,
}

/// A [`GraphicsDevice`] that drives an OpenGL 4.x context through `glow`.
///
/// Engine handles are plain counters mapped onto GL object names, so
/// destroyed GL names can be recycled by the driver without aliasing.
#[derive(Debug)]
pub struct GlDevice {
    gl: Arc<glow::Context>,
    limits: DeviceLimits,
    adapter_info: AdapterInfo,
    programs: HashMap<ProgramId, GlProgramEntry>,
    buffers: HashMap<BufferId, GlBufferEntry>,
    textures: HashMap<TextureId, GlTextureEntry>,
    vertex_arrays: HashMap<VertexArrayId, glow::VertexArray>,
    framebuffers: HashMap<FramebufferId, GlFramebufferEntry>,
    /// What [`RenderTarget::Default`] resolves to. `None` is the window itself.
    default_framebuffer: Option<glow::Framebuffer>,
    next_id: usize,
}

impl GlDevice {
    /// Wraps a current GL context and queries its limits and identification.
    ///
    /// # Errors
    /// If the context is OpenGL ES or older than desktop OpenGL 4.3.
    pub fn new(gl: Arc<glow::Context>) -> anyhow::Result<Self> {
        let version = gl.version();
        check_version(version.major, version.minor, version.is_embedded)?;
        let (limits, adapter_info) = unsafe { query_device(&gl) };
        log::info!("GlDevice: {adapter_info}");
        log::debug!(
            "GlDevice: uniform offset alignment {} B, max block {} B",
            limits.uniform_buffer_offset_alignment,
            limits.max_uniform_block_size
        );
        Ok(Self {
            gl,
            limits,
            adapter_info,
            programs: HashMap::new(),
            buffers: HashMap::new(),
            textures: HashMap::new(),
            vertex_arrays: HashMap::new(),
            framebuffers: HashMap::new(),
            default_framebuffer: None,
            next_id: 1,
        })
    }

    /// The underlying context.
    pub fn gl(&self) -> &Arc<glow::Context> {
        &self.gl
    }

    /// Redirects [`RenderTarget::Default`] to `framebuffer`.
    ///
    /// Hosts that composite the renderer into their own target (e.g. an
    /// intermediate framebuffer owned by a UI painter) set this every frame.
    pub fn set_default_framebuffer(&mut self, framebuffer: Option<glow::Framebuffer>) {
        self.default_framebuffer = framebuffer;
    }

    /// The GL name behind `id`, for hosts that display render targets in
    /// their own UI.
    pub fn native_texture(&self, id: TextureId) -> Option<glow::Texture> {
        self.textures.get(&id).map(|entry| entry.texture)
    }

    // --- ID Generation Helpers ---

    fn allocate(&mut self) -> usize {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    fn resolve_target(
        &self,
        target: RenderTarget,
    ) -> Result<Option<glow::Framebuffer>, ResourceError> {
        match target {
            RenderTarget::Default => Ok(self.default_framebuffer),
            RenderTarget::Offscreen(id) => self
                .framebuffers
                .get(&id)
                .map(|entry| Some(entry.framebuffer))
                .ok_or(ResourceError::InvalidHandle),
        }
    }

    /// Compiles one stage. The shader object is returned even on failure so
    /// that the link step reports its own log.
    fn compile_stage(
        &self,
        stage: u32,
        source: &str,
    ) -> Result<(glow::Shader, Option<String>), ResourceError> {
        unsafe {
            let shader = self
                .gl
                .create_shader(stage)
                .map_err(ResourceError::BackendError)?;
            self.gl.shader_source(shader, source);
            self.gl.compile_shader(shader);
            let log = if self.gl.get_shader_compile_status(shader) {
                None
            } else {
                Some(self.gl.get_shader_info_log(shader))
            };
            Ok((shader, log))
        }
    }

    fn reflect_attributes(&self, program: glow::Program) -> Vec<ActiveAttribute> {
        let count = unsafe { self.gl.get_active_attributes(program) };
        let mut attributes: Vec<ActiveAttribute> = (0..count)
            .filter_map(|index| {
                let attribute = unsafe { self.gl.get_active_attribute(program, index) }?;
                if attribute.name.starts_with("gl_") {
                    return None;
                }
                let Some(components) = conversions::attribute_components(attribute.atype) else {
                    log::warn!(
                        "GlDevice: vertex input '{}' has non-float type {:#06x}, ignored",
                        attribute.name,
                        attribute.atype
                    );
                    return None;
                };
                let location = unsafe { self.gl.get_attrib_location(program, &attribute.name) }?;
                Some(ActiveAttribute {
                    name: attribute.name,
                    location,
                    components,
                })
            })
            .collect();
        attributes.sort_by_key(|a| a.location);
        attributes
    }
}

fn check_version(major: u32, minor: u32, is_embedded: bool) -> anyhow::Result<()> {
    let (req_major, req_minor) = REQUIRED_GL_VERSION;
    if is_embedded {
        bail!(
            "OpenGL ES {major}.{minor} is not supported, desktop OpenGL {req_major}.{req_minor} is required"
        );
    }
    if (major, minor) < REQUIRED_GL_VERSION {
        bail!(
            "OpenGL {major}.{minor} is too old, {req_major}.{req_minor} or newer is required"
        );
    }
    Ok(())
}

unsafe fn query_device(gl: &glow::Context) -> (DeviceLimits, AdapterInfo) {
    let alignment = gl.get_parameter_i32(glow::UNIFORM_BUFFER_OFFSET_ALIGNMENT);
    let max_block = gl.get_parameter_i32(glow::MAX_UNIFORM_BLOCK_SIZE);
    let defaults = DeviceLimits::default();
    let limits = DeviceLimits {
        uniform_buffer_offset_alignment: u32::try_from(alignment)
            .ok()
            .filter(|&a| a > 0)
            .unwrap_or(defaults.uniform_buffer_offset_alignment),
        max_uniform_block_size: u32::try_from(max_block)
            .ok()
            .filter(|&s| s > 0)
            .unwrap_or(defaults.max_uniform_block_size),
    };

    let mut extensions: Vec<String> = gl.supported_extensions().iter().cloned().collect();
    extensions.sort();
    let adapter_info = AdapterInfo {
        version: gl.get_parameter_string(glow::VERSION),
        renderer: gl.get_parameter_string(glow::RENDERER),
        vendor: gl.get_parameter_string(glow::VENDOR),
        shading_language_version: gl.get_parameter_string(glow::SHADING_LANGUAGE_VERSION),
        extensions,
    };
    (limits, adapter_info)
}

/// The byte range `[offset, offset + len)` inside a buffer of `size` bytes.
fn checked_range(offset: u64, len: usize, size: u64) -> Result<Range<usize>, ResourceError> {
    let end = offset
        .checked_add(len as u64)
        .ok_or(ResourceError::OutOfBounds)?;
    if end > size {
        return Err(ResourceError::OutOfBounds);
    }
    Ok(offset as usize..end as usize)
}

fn gl_i32(value: u64) -> Result<i32, ResourceError> {
    i32::try_from(value).map_err(|_| ResourceError::OutOfBounds)
}

/// Blits cannot use mipmap filters.
fn blit_filter(filter: FilterMode) -> u32 {
    match filter {
        FilterMode::Nearest => glow::NEAREST,
        FilterMode::Linear | FilterMode::LinearMipmapLinear => glow::LINEAR,
    }
}

impl GraphicsDevice for GlDevice {
    fn limits(&self) -> DeviceLimits {
        self.limits
    }

    fn adapter_info(&self) -> AdapterInfo {
        self.adapter_info.clone()
    }

    fn create_program(
        &mut self,
        source: &ProgramSource,
    ) -> Result<ProgramCompilation, ResourceError> {
        let program = unsafe { self.gl.create_program() }.map_err(ResourceError::BackendError)?;
        let (vertex, vertex_log) = self.compile_stage(glow::VERTEX_SHADER, &source.vertex)?;
        let (fragment, fragment_log) = self.compile_stage(glow::FRAGMENT_SHADER, &source.fragment)?;

        let link_log = unsafe {
            self.gl.attach_shader(program, vertex);
            self.gl.attach_shader(program, fragment);
            self.gl.link_program(program);
            let log = if self.gl.get_program_link_status(program) {
                None
            } else {
                Some(self.gl.get_program_info_log(program))
            };
            for shader in [vertex, fragment] {
                self.gl.detach_shader(program, shader);
                self.gl.delete_shader(shader);
            }
            log
        };

        let attributes = if link_log.is_none() {
            self.reflect_attributes(program)
        } else {
            Vec::new()
        };

        let id = ProgramId(self.allocate());
        self.programs.insert(
            id,
            GlProgramEntry {
                program,
                label: source.label.to_string(),
                uniform_locations: HashMap::new(),
            },
        );
        log::debug!(
            "GlDevice: Created program '{}' with ID: {:?}, {} vertex inputs",
            source.label,
            id,
            attributes.len()
        );

        Ok(ProgramCompilation {
            id,
            vertex_log,
            fragment_log,
            link_log,
            attributes,
        })
    }

    fn destroy_program(&mut self, id: ProgramId) -> Result<(), ResourceError> {
        let entry = self.programs.remove(&id).ok_or(ResourceError::InvalidHandle)?;
        unsafe { self.gl.delete_program(entry.program) };
        log::trace!("GlDevice: Destroyed program '{}' ({id:?})", entry.label);
        Ok(())
    }

    fn use_program(&mut self, id: Option<ProgramId>) -> Result<(), ResourceError> {
        let program = match id {
            Some(id) => Some(
                self.programs
                    .get(&id)
                    .ok_or(ResourceError::InvalidHandle)?
                    .program,
            ),
            None => None,
        };
        unsafe { self.gl.use_program(program) };
        Ok(())
    }

    fn set_uniform(
        &mut self,
        program: ProgramId,
        name: &str,
        value: UniformValue,
    ) -> Result<(), ResourceError> {
        let gl = &self.gl;
        let entry = self
            .programs
            .get_mut(&program)
            .ok_or(ResourceError::InvalidHandle)?;
        let handle = entry.program;
        let location = entry
            .uniform_locations
            .entry(name.to_string())
            .or_insert_with(|| unsafe { gl.get_uniform_location(handle, name) });
        let Some(location) = location.as_ref() else {
            return Ok(());
        };

        unsafe {
            match value {
                UniformValue::Int(v) => gl.uniform_1_i32(Some(location), v),
                UniformValue::Bool(v) => gl.uniform_1_i32(Some(location), v as i32),
                UniformValue::Vec3(v) => gl.uniform_3_f32(Some(location), v.x, v.y, v.z),
                UniformValue::Mat4(m) => {
                    gl.uniform_matrix_4_f32_slice(Some(location), false, &m.to_cols_array())
                }
            }
        }
        Ok(())
    }

    fn bind_uniform_block(
        &mut self,
        program: ProgramId,
        block: &str,
        binding: u32,
    ) -> Result<(), ResourceError> {
        let entry = self.programs.get(&program).ok_or(ResourceError::InvalidHandle)?;
        unsafe {
            match self.gl.get_uniform_block_index(entry.program, block) {
                Some(index) => self.gl.uniform_block_binding(entry.program, index, binding),
                None => log::trace!("GlDevice: '{}' has no active block '{block}'", entry.label),
            }
        }
        Ok(())
    }

    fn create_buffer(
        &mut self,
        descriptor: &BufferDescriptor,
        contents: Option<&[u8]>,
    ) -> Result<BufferId, ResourceError> {
        if contents.is_some_and(|bytes| bytes.len() as u64 != descriptor.size) {
            return Err(ResourceError::OutOfBounds);
        }
        let size = gl_i32(descriptor.size)?;
        let usage = descriptor.usage.into_gl();

        // Uploads go through COPY_WRITE_BUFFER so that creating an index
        // buffer never rewires whichever vertex array is bound.
        let buffer = unsafe {
            let buffer = self.gl.create_buffer().map_err(ResourceError::BackendError)?;
            self.gl.bind_buffer(glow::COPY_WRITE_BUFFER, Some(buffer));
            match contents {
                Some(bytes) => self.gl.buffer_data_u8_slice(glow::COPY_WRITE_BUFFER, bytes, usage),
                None => self.gl.buffer_data_size(glow::COPY_WRITE_BUFFER, size, usage),
            }
            self.gl.bind_buffer(glow::COPY_WRITE_BUFFER, None);
            buffer
        };

        let id = BufferId(self.allocate());
        self.buffers.insert(
            id,
            GlBufferEntry {
                buffer,
                size: descriptor.size,
                mapped: None,
            },
        );
        log::trace!(
            "GlDevice: Created {:?} buffer '{}' with ID: {:?}, size: {} bytes",
            descriptor.kind,
            descriptor.label.as_deref().unwrap_or_default(),
            id,
            descriptor.size
        );
        Ok(id)
    }

    fn destroy_buffer(&mut self, id: BufferId) -> Result<(), ResourceError> {
        let entry = self.buffers.remove(&id).ok_or(ResourceError::InvalidHandle)?;
        unsafe {
            if entry.mapped.is_some() {
                self.gl.bind_buffer(glow::COPY_WRITE_BUFFER, Some(entry.buffer));
                self.gl.unmap_buffer(glow::COPY_WRITE_BUFFER);
                self.gl.bind_buffer(glow::COPY_WRITE_BUFFER, None);
            }
            self.gl.delete_buffer(entry.buffer);
        }
        Ok(())
    }

    fn map_buffer(&mut self, id: BufferId) -> Result<(), ResourceError> {
        let entry = self.buffers.get_mut(&id).ok_or(ResourceError::InvalidHandle)?;
        if entry.mapped.is_some() {
            return Err(ResourceError::BackendError(format!("{id:?} is already mapped")));
        }
        let length = gl_i32(entry.size)?;
        let ptr = unsafe {
            self.gl.bind_buffer(glow::COPY_WRITE_BUFFER, Some(entry.buffer));
            let ptr = self.gl.map_buffer_range(
                glow::COPY_WRITE_BUFFER,
                0,
                length,
                glow::MAP_WRITE_BIT | glow::MAP_INVALIDATE_BUFFER_BIT,
            );
            self.gl.bind_buffer(glow::COPY_WRITE_BUFFER, None);
            ptr
        };
        let ptr = NonNull::new(ptr).ok_or_else(|| {
            ResourceError::BackendError(format!("glMapBufferRange returned null for {id:?}"))
        })?;
        entry.mapped = Some(MappedPtr(ptr));
        Ok(())
    }

    fn write_mapped(
        &mut self,
        id: BufferId,
        offset: u64,
        data: &[u8],
    ) -> Result<(), ResourceError> {
        let entry = self.buffers.get(&id).ok_or(ResourceError::InvalidHandle)?;
        let Some(MappedPtr(ptr)) = entry.mapped.as_ref() else {
            return Err(ResourceError::BackendError(format!("{id:?} is not mapped")));
        };
        let range = checked_range(offset, data.len(), entry.size)?;
        // SAFETY: `range` lies inside the mapping, which covers the whole buffer.
        unsafe {
            std::ptr::copy_nonoverlapping(data.as_ptr(), ptr.as_ptr().add(range.start), data.len());
        }
        Ok(())
    }

    fn unmap_buffer(&mut self, id: BufferId) -> Result<(), ResourceError> {
        let entry = self.buffers.get_mut(&id).ok_or(ResourceError::InvalidHandle)?;
        if entry.mapped.take().is_none() {
            return Err(ResourceError::BackendError(format!("{id:?} is not mapped")));
        }
        unsafe {
            self.gl.bind_buffer(glow::COPY_WRITE_BUFFER, Some(entry.buffer));
            self.gl.unmap_buffer(glow::COPY_WRITE_BUFFER);
            self.gl.bind_buffer(glow::COPY_WRITE_BUFFER, None);
        }
        Ok(())
    }

    fn bind_buffer_range(
        &mut self,
        binding: u32,
        id: BufferId,
        offset: u64,
        size: u64,
    ) -> Result<(), ResourceError> {
        let entry = self.buffers.get(&id).ok_or(ResourceError::InvalidHandle)?;
        unsafe {
            self.gl.bind_buffer_range(
                glow::UNIFORM_BUFFER,
                binding,
                Some(entry.buffer),
                gl_i32(offset)?,
                gl_i32(size)?,
            );
        }
        Ok(())
    }

    fn create_texture(
        &mut self,
        descriptor: &TextureDescriptor,
        pixels: Option<&[u8]>,
    ) -> Result<TextureId, ResourceError> {
        if pixels.is_some_and(|p| p.len() != descriptor.expected_upload_size()) {
            return Err(ResourceError::OutOfBounds);
        }
        let GlTextureFormat {
            internal_format,
            format,
            ty,
        } = descriptor.format.into_gl();
        let min_filter: u32 = descriptor.min_filter.into_gl();
        let mag_filter: u32 = descriptor.mag_filter.into_gl();
        let wrap: u32 = descriptor.wrap.into_gl();

        let texture = unsafe {
            let texture = self.gl.create_texture().map_err(ResourceError::BackendError)?;
            self.gl.bind_texture(glow::TEXTURE_2D, Some(texture));
            // RGB rows are not 4-byte aligned in general.
            self.gl.pixel_store_i32(glow::UNPACK_ALIGNMENT, 1);
            self.gl.tex_image_2d(
                glow::TEXTURE_2D,
                0,
                internal_format,
                descriptor.size.width as i32,
                descriptor.size.height as i32,
                0,
                format,
                ty,
                glow::PixelUnpackData::Slice(pixels),
            );
            self.gl
                .tex_parameter_i32(glow::TEXTURE_2D, glow::TEXTURE_MIN_FILTER, min_filter as i32);
            self.gl
                .tex_parameter_i32(glow::TEXTURE_2D, glow::TEXTURE_MAG_FILTER, mag_filter as i32);
            self.gl
                .tex_parameter_i32(glow::TEXTURE_2D, glow::TEXTURE_WRAP_S, wrap as i32);
            self.gl
                .tex_parameter_i32(glow::TEXTURE_2D, glow::TEXTURE_WRAP_T, wrap as i32);
            if descriptor.generate_mipmaps {
                self.gl.generate_mipmap(glow::TEXTURE_2D);
            }
            self.gl.bind_texture(glow::TEXTURE_2D, None);
            texture
        };

        let id = TextureId(self.allocate());
        self.textures.insert(
            id,
            GlTextureEntry {
                texture,
                format: descriptor.format,
            },
        );
        log::trace!(
            "GlDevice: Created {:?} texture '{}' with ID: {:?}, {}x{}",
            descriptor.format,
            descriptor.label.as_deref().unwrap_or_default(),
            id,
            descriptor.size.width,
            descriptor.size.height
        );
        Ok(id)
    }

    fn destroy_texture(&mut self, id: TextureId) -> Result<(), ResourceError> {
        let entry = self.textures.remove(&id).ok_or(ResourceError::InvalidHandle)?;
        unsafe { self.gl.delete_texture(entry.texture) };
        Ok(())
    }

    fn bind_texture(&mut self, unit: u32, texture: Option<TextureId>) -> Result<(), ResourceError> {
        let texture = match texture {
            Some(id) => Some(
                self.textures
                    .get(&id)
                    .ok_or(ResourceError::InvalidHandle)?
                    .texture,
            ),
            None => None,
        };
        unsafe {
            self.gl.active_texture(glow::TEXTURE0 + unit);
            self.gl.bind_texture(glow::TEXTURE_2D, texture);
        }
        Ok(())
    }

    fn create_vertex_array(
        &mut self,
        descriptor: &VertexArrayDescriptor,
    ) -> Result<VertexArrayId, ResourceError> {
        let vertex_buffer = self
            .buffers
            .get(&descriptor.vertex_buffer)
            .ok_or(ResourceError::InvalidHandle)?
            .buffer;
        let index_buffer = match descriptor.index_buffer {
            Some(id) => Some(self.buffers.get(&id).ok_or(ResourceError::InvalidHandle)?.buffer),
            None => None,
        };
        let offsets = descriptor
            .attributes
            .iter()
            .map(|a| gl_i32(a.offset))
            .collect::<Result<Vec<_>, _>>()?;

        let vertex_array = unsafe {
            let vao = self
                .gl
                .create_vertex_array()
                .map_err(ResourceError::BackendError)?;
            self.gl.bind_vertex_array(Some(vao));
            self.gl.bind_buffer(glow::ARRAY_BUFFER, Some(vertex_buffer));
            for (attribute, offset) in descriptor.attributes.iter().zip(offsets) {
                self.gl.enable_vertex_attrib_array(attribute.location);
                self.gl.vertex_attrib_pointer_f32(
                    attribute.location,
                    attribute.components as i32,
                    glow::FLOAT,
                    false,
                    descriptor.stride as i32,
                    offset,
                );
            }
            if let Some(index_buffer) = index_buffer {
                self.gl.bind_buffer(glow::ELEMENT_ARRAY_BUFFER, Some(index_buffer));
            }
            self.gl.bind_vertex_array(None);
            self.gl.bind_buffer(glow::ARRAY_BUFFER, None);
            vao
        };

        let id = VertexArrayId(self.allocate());
        self.vertex_arrays.insert(id, vertex_array);
        Ok(id)
    }

    fn destroy_vertex_array(&mut self, id: VertexArrayId) -> Result<(), ResourceError> {
        let vao = self.vertex_arrays.remove(&id).ok_or(ResourceError::InvalidHandle)?;
        unsafe { self.gl.delete_vertex_array(vao) };
        Ok(())
    }

    fn bind_vertex_array(&mut self, id: Option<VertexArrayId>) -> Result<(), ResourceError> {
        let vao = match id {
            Some(id) => Some(*self.vertex_arrays.get(&id).ok_or(ResourceError::InvalidHandle)?),
            None => None,
        };
        unsafe { self.gl.bind_vertex_array(vao) };
        Ok(())
    }

    fn create_framebuffer(
        &mut self,
        descriptor: &FramebufferDescriptor,
    ) -> Result<FramebufferId, ResourceError> {
        let mut colors = Vec::with_capacity(descriptor.color_attachments.len());
        for id in descriptor.color_attachments.iter() {
            colors.push(self.textures.get(id).ok_or(ResourceError::InvalidHandle)?.texture);
        }
        let depth = match descriptor.depth_attachment {
            Some(id) => {
                let entry = self.textures.get(&id).ok_or(ResourceError::InvalidHandle)?;
                if !entry.format.is_depth() {
                    log::warn!(
                        "GlDevice: depth attachment {id:?} has colour format {:?}",
                        entry.format
                    );
                }
                Some(entry.texture)
            }
            None => None,
        };

        let framebuffer = unsafe {
            let fbo = self
                .gl
                .create_framebuffer()
                .map_err(ResourceError::BackendError)?;
            self.gl.bind_framebuffer(glow::FRAMEBUFFER, Some(fbo));
            for (index, texture) in colors.iter().enumerate() {
                self.gl.framebuffer_texture_2d(
                    glow::FRAMEBUFFER,
                    conversions::color_attachment(index as u32),
                    glow::TEXTURE_2D,
                    Some(*texture),
                    0,
                );
            }
            if let Some(depth) = depth {
                self.gl.framebuffer_texture_2d(
                    glow::FRAMEBUFFER,
                    glow::DEPTH_ATTACHMENT,
                    glow::TEXTURE_2D,
                    Some(depth),
                    0,
                );
            }
            let draw_buffers: Vec<u32> = (0..colors.len() as u32)
                .map(conversions::color_attachment)
                .collect();
            self.gl.draw_buffers(&draw_buffers);
            self.gl.bind_framebuffer(glow::FRAMEBUFFER, self.default_framebuffer);
            fbo
        };

        let id = FramebufferId(self.allocate());
        self.framebuffers.insert(
            id,
            GlFramebufferEntry {
                framebuffer,
                color_count: colors.len() as u32,
            },
        );
        log::debug!(
            "GlDevice: Created framebuffer '{}' with ID: {:?}, {} colour attachments",
            descriptor.label.as_deref().unwrap_or_default(),
            id,
            colors.len()
        );
        Ok(id)
    }

    fn destroy_framebuffer(&mut self, id: FramebufferId) -> Result<(), ResourceError> {
        let entry = self.framebuffers.remove(&id).ok_or(ResourceError::InvalidHandle)?;
        unsafe { self.gl.delete_framebuffer(entry.framebuffer) };
        Ok(())
    }

    fn framebuffer_status(
        &mut self,
        id: FramebufferId,
    ) -> Result<FramebufferStatus, ResourceError> {
        let entry = self.framebuffers.get(&id).ok_or(ResourceError::InvalidHandle)?;
        let status = unsafe {
            self.gl.bind_framebuffer(glow::FRAMEBUFFER, Some(entry.framebuffer));
            let status = self.gl.check_framebuffer_status(glow::FRAMEBUFFER);
            self.gl.bind_framebuffer(glow::FRAMEBUFFER, self.default_framebuffer);
            status
        };
        Ok(conversions::framebuffer_status_from_gl(status))
    }

    fn bind_render_target(
        &mut self,
        target: RenderTarget,
        draw_attachments: &[u32],
    ) -> Result<(), ResourceError> {
        let framebuffer = self.resolve_target(target)?;
        unsafe {
            // Hosts may leave a scissor rect behind; it would clip clears and blits.
            self.gl.disable(glow::SCISSOR_TEST);
            self.gl.bind_framebuffer(glow::FRAMEBUFFER, framebuffer);
        }
        if let RenderTarget::Offscreen(id) = target {
            let color_count = self.framebuffers.get(&id).map_or(0, |e| e.color_count);
            if let Some(&bad) = draw_attachments.iter().find(|&&a| a >= color_count) {
                log::warn!("GlDevice: {id:?} has no colour attachment {bad}");
            }
            let buffers: Vec<u32> = draw_attachments
                .iter()
                .map(|&a| conversions::color_attachment(a))
                .collect();
            unsafe { self.gl.draw_buffers(&buffers) };
        }
        Ok(())
    }

    fn blit(&mut self, descriptor: &BlitDescriptor) -> Result<(), ResourceError> {
        let source = self.resolve_target(descriptor.source)?;
        let destination = self.resolve_target(descriptor.destination)?;
        let src = descriptor.source_extent;
        let dst = descriptor.destination_extent;
        unsafe {
            self.gl.disable(glow::SCISSOR_TEST);
            self.gl.bind_framebuffer(glow::READ_FRAMEBUFFER, source);
            if descriptor.mask == BlitMask::Color && source.is_some() {
                self.gl.read_buffer(conversions::color_attachment(0));
            }
            self.gl.bind_framebuffer(glow::DRAW_FRAMEBUFFER, destination);
            self.gl.blit_framebuffer(
                0,
                0,
                src.width as i32,
                src.height as i32,
                0,
                0,
                dst.width as i32,
                dst.height as i32,
                descriptor.mask.into_gl(),
                blit_filter(descriptor.filter),
            );
            self.gl.bind_framebuffer(glow::FRAMEBUFFER, self.default_framebuffer);
        }
        Ok(())
    }

    fn clear(&mut self, descriptor: &ClearDescriptor) {
        let mut mask = 0;
        unsafe {
            if let Some([r, g, b, a]) = descriptor.color {
                self.gl.clear_color(r, g, b, a);
                mask |= glow::COLOR_BUFFER_BIT;
            }
            if descriptor.depth {
                self.gl.depth_mask(true);
                self.gl.clear_depth_f32(1.0);
                mask |= glow::DEPTH_BUFFER_BIT;
            }
            if mask != 0 {
                self.gl.clear(mask);
            }
        }
    }

    fn set_viewport(&mut self, extent: Extent2D) {
        unsafe {
            self.gl
                .viewport(0, 0, extent.width as i32, extent.height as i32);
        }
    }

    fn set_render_state(&mut self, state: &RenderState) {
        unsafe {
            if state.depth_test {
                self.gl.enable(glow::DEPTH_TEST);
                self.gl.depth_func(glow::LESS);
                self.gl.depth_mask(true);
            } else {
                self.gl.disable(glow::DEPTH_TEST);
            }
            if state.alpha_blend {
                self.gl.enable(glow::BLEND);
                self.gl.blend_func(glow::SRC_ALPHA, glow::ONE_MINUS_SRC_ALPHA);
            } else {
                self.gl.disable(glow::BLEND);
            }
            self.gl.disable(glow::CULL_FACE);
        }
    }

    fn draw_indexed(
        &mut self,
        topology: Topology,
        format: IndexFormat,
        count: u32,
        byte_offset: u64,
    ) {
        unsafe {
            self.gl.draw_elements(
                topology.into_gl(),
                count as i32,
                format.into_gl(),
                byte_offset as i32,
            );
        }
    }

    fn draw_arrays(&mut self, topology: Topology, first: u32, count: u32) {
        unsafe {
            self.gl
                .draw_arrays(topology.into_gl(), first as i32, count as i32);
        }
    }

    fn take_errors(&mut self) -> Vec<u32> {
        let mut errors = Vec::new();
        while errors.len() < MAX_ERRORS_PER_DRAIN {
            let error = unsafe { self.gl.get_error() };
            if error == glow::NO_ERROR {
                break;
            }
            errors.push(error);
        }
        errors
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn context_must_be_desktop_gl_4_3() {
        assert!(check_version(4, 3, false).is_ok());
        assert!(check_version(4, 6, false).is_ok());
        let old = check_version(3, 3, false).unwrap_err();
        assert_eq!(old.to_string(), "OpenGL 3.3 is too old, 4.3 or newer is required");
        assert!(check_version(4, 2, false).is_err());
        assert!(check_version(3, 2, true).unwrap_err().to_string().contains("OpenGL ES"));
    }

    #[test]
    fn mapped_writes_must_fit_the_buffer() {
        assert_eq!(checked_range(0, 16, 16).ok(), Some(0..16));
        assert_eq!(checked_range(240, 16, 256).ok(), Some(240..256));
        assert!(matches!(checked_range(241, 16, 256), Err(ResourceError::OutOfBounds)));
        assert!(matches!(checked_range(u64::MAX, 1, 256), Err(ResourceError::OutOfBounds)));
    }

    #[test]
    fn sizes_beyond_i32_are_rejected() {
        assert_eq!(gl_i32(4096).ok(), Some(4096));
        assert!(gl_i32(u64::from(u32::MAX)).is_err());
    }

    #[test]
    fn blits_never_use_a_mip_filter() {
        assert_eq!(blit_filter(FilterMode::LinearMipmapLinear), glow::LINEAR);
        assert_eq!(blit_filter(FilterMode::Nearest), glow::NEAREST);
    }
}
