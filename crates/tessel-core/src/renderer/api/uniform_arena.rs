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

//! Per-frame linear allocator for uniform block data.
//!
//! The [`UniformArena`] owns one stream-draw uniform buffer sized to the device's
//! maximum uniform block size. Each frame is a single write cycle:
//!
//! ```text
//! begin_write ──► push / align_head / begin_block … end_block ──► end_write
//!   head = 0         head only moves forward                       bytes visible to draws
//! ```
//!
//! Every logical block records its own [`UniformRange`] right after it is
//! written. Because the head never moves backwards inside a cycle, ranges
//! recorded in the same cycle never overlap.
//!
//! Values are laid out with std140 rules: scalars align to 4 bytes, `vec3`,
//! `vec4` and `mat4` align to 16. Blocks that are bound on their own start at
//! the device's `uniform_buffer_offset_alignment`.

use crate::math::{Mat4, Vec3, Vec4};
use crate::renderer::{
    api::buffer::{BufferDescriptor, BufferId, BufferKind, BufferUsageHint},
    error::{ArenaError, ResourceError},
    traits::GraphicsDevice,
};
use bytemuck::Pod;
use std::borrow::Cow;

/// Alignment of an array-element struct inside a std140 block.
pub const STD140_STRUCT_ALIGNMENT: u32 = 16;

/// A value that can be pushed into a std140 uniform block.
pub trait Std140: Pod {
    /// The base alignment of the type under std140.
    const ALIGNMENT: u32;
}

impl Std140 for u32 {
    const ALIGNMENT: u32 = 4;
}

impl Std140 for i32 {
    const ALIGNMENT: u32 = 4;
}

impl Std140 for f32 {
    const ALIGNMENT: u32 = 4;
}

impl Std140 for Vec3 {
    const ALIGNMENT: u32 = 16;
}

impl Std140 for Vec4 {
    const ALIGNMENT: u32 = 16;
}

impl Std140 for Mat4 {
    const ALIGNMENT: u32 = 16;
}

/// Rounds `value` up to the next multiple of `alignment`. An alignment of 0 is treated as 1.
pub fn align_up(value: u32, alignment: u32) -> u32 {
    let alignment = alignment.max(1);
    value.div_ceil(alignment) * alignment
}

/// A byte range of the arena holding one logical uniform block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct UniformRange {
    /// Byte offset of the block's first byte.
    pub offset: u32,
    /// Size of the block in bytes.
    pub size: u32,
}

impl UniformRange {
    /// One past the last byte of the block.
    pub fn end(&self) -> u32 {
        self.offset + self.size
    }

    /// Returns `true` if the two ranges share at least one byte.
    pub fn overlaps(&self, other: &UniformRange) -> bool {
        self.offset < other.end() && other.offset < self.end()
    }
}

/// A per-frame linear allocator over a single mapped uniform buffer.
///
/// # Example
///
/// ```ignore
/// arena.begin_write(device)?;
/// let globals = arena.begin_block()?;
/// arena.push_vec3(camera_position)?;
/// arena.push_u32(light_count)?;
/// let globals = arena.end_block(globals);
/// arena.end_write(device)?;
/// device.bind_buffer_range(0, arena.buffer(), globals.offset as u64, globals.size as u64)?;
/// ```
#[derive(Debug)]
pub struct UniformArena {
    /// The backing GPU buffer.
    buffer: BufferId,
    /// Size of the backing buffer in bytes.
    capacity: u32,
    /// Alignment of ranges bound as separate uniform blocks.
    block_alignment: u32,
    /// The next free byte.
    head: u32,
    /// CPU mirror of the mapped range, flushed on `end_write`.
    staging: Vec<u8>,
    /// `true` between `begin_write` and `end_write`.
    mapped: bool,
}

impl UniformArena {
    /// Creates the arena and its backing buffer.
    ///
    /// # Arguments
    ///
    /// * `device` - The graphics device to allocate the buffer on.
    /// * `capacity` - Size of the buffer in bytes.
    /// * `block_alignment` - Minimum offset alignment for independently bound blocks.
    ///
    /// # Errors
    ///
    /// Returns a [`ResourceError`] if buffer creation fails.
    pub fn new(
        device: &mut dyn GraphicsDevice,
        capacity: u32,
        block_alignment: u32,
    ) -> Result<Self, ResourceError> {
        let buffer = device.create_buffer(
            &BufferDescriptor {
                label: Some(Cow::Borrowed("Uniform Arena")),
                kind: BufferKind::Uniform,
                size: capacity as u64,
                usage: BufferUsageHint::Stream,
            },
            None,
        )?;
        log::debug!(
            "Created uniform arena: {capacity} bytes, block alignment {block_alignment}"
        );

        Ok(Self {
            buffer,
            capacity,
            block_alignment: block_alignment.max(1),
            head: 0,
            staging: vec![0; capacity as usize],
            mapped: false,
        })
    }

    /// Creates an arena sized and aligned from the device's reported limits.
    ///
    /// # Errors
    ///
    /// Returns a [`ResourceError`] if buffer creation fails.
    pub fn from_device_limits(device: &mut dyn GraphicsDevice) -> Result<Self, ResourceError> {
        let limits = device.limits();
        Self::new(
            device,
            limits.max_uniform_block_size,
            limits.uniform_buffer_offset_alignment,
        )
    }

    /// Maps the backing buffer for writing and resets the head to 0.
    ///
    /// # Errors
    ///
    /// [`ArenaError::AlreadyMapped`] if the previous cycle was not ended, or
    /// [`ArenaError::Device`] if the device refuses to map.
    pub fn begin_write(&mut self, device: &mut dyn GraphicsDevice) -> Result<(), ArenaError> {
        if self.mapped {
            return Err(ArenaError::AlreadyMapped);
        }
        device
            .map_buffer(self.buffer)
            .map_err(|source| ArenaError::Device {
                buffer: self.buffer,
                source,
            })?;
        self.head = 0;
        self.mapped = true;
        Ok(())
    }

    /// Appends `value` at the next offset aligned for `T` and returns that offset.
    ///
    /// # Errors
    ///
    /// [`ArenaError::NotMapped`] outside a write cycle, [`ArenaError::Overflow`]
    /// if the value does not fit.
    pub fn push<T: Std140>(&mut self, value: &T) -> Result<u32, ArenaError> {
        let bytes = bytemuck::bytes_of(value);
        let offset = self.reserve_aligned(bytes.len() as u32, T::ALIGNMENT)?;
        let start = offset as usize;
        self.staging[start..start + bytes.len()].copy_from_slice(bytes);
        Ok(offset)
    }

    /// Pushes a `uint`.
    pub fn push_u32(&mut self, value: u32) -> Result<u32, ArenaError> {
        self.push(&value)
    }

    /// Pushes a `float`.
    pub fn push_f32(&mut self, value: f32) -> Result<u32, ArenaError> {
        self.push(&value)
    }

    /// Pushes a `vec3`. The head advances by 12 bytes, so a following scalar
    /// packs into the fourth slot as std140 requires.
    pub fn push_vec3(&mut self, value: Vec3) -> Result<u32, ArenaError> {
        self.push(&value)
    }

    /// Pushes a `vec4`.
    pub fn push_vec4(&mut self, value: Vec4) -> Result<u32, ArenaError> {
        self.push(&value)
    }

    /// Pushes a column-major `mat4`.
    pub fn push_mat4(&mut self, value: Mat4) -> Result<u32, ArenaError> {
        self.push(&value)
    }

    /// Advances the head to the next multiple of `alignment` without writing.
    ///
    /// Returns the new head.
    pub fn align_head(&mut self, alignment: u32) -> Result<u32, ArenaError> {
        self.reserve_aligned(0, alignment)
    }

    /// Advances the head by `size` zeroed bytes, e.g. to pad a block up to the
    /// size its shader declaration expects. Returns the offset of the padding.
    pub fn skip(&mut self, size: u32) -> Result<u32, ArenaError> {
        let offset = self.reserve_aligned(size, 1)?;
        let start = offset as usize;
        self.staging[start..start + size as usize].fill(0);
        Ok(offset)
    }

    /// Aligns the head for an independently bound block and returns the block's offset.
    pub fn begin_block(&mut self) -> Result<u32, ArenaError> {
        self.align_head(self.block_alignment)
    }

    /// Closes the block started at `offset`.
    pub fn end_block(&self, offset: u32) -> UniformRange {
        UniformRange {
            offset,
            size: self.head - offset,
        }
    }

    /// Uploads everything written this cycle and unmaps the buffer.
    ///
    /// Returns the number of bytes made visible to the GPU.
    ///
    /// # Errors
    ///
    /// [`ArenaError::NotMapped`] if no cycle is open, [`ArenaError::Device`]
    /// if the write or unmap fails. The arena is unmapped in either case.
    pub fn end_write(&mut self, device: &mut dyn GraphicsDevice) -> Result<u32, ArenaError> {
        if !self.mapped {
            return Err(ArenaError::NotMapped);
        }
        self.mapped = false;
        let written = self.head;
        let upload = device.write_mapped(self.buffer, 0, &self.staging[..written as usize]);
        let unmap = device.unmap_buffer(self.buffer);
        upload
            .and(unmap)
            .map_err(|source| ArenaError::Device {
                buffer: self.buffer,
                source,
            })?;
        Ok(written)
    }

    /// Releases the backing buffer.
    pub fn destroy(self, device: &mut dyn GraphicsDevice) -> Result<(), ResourceError> {
        device.destroy_buffer(self.buffer)
    }

    /// The backing GPU buffer.
    pub fn buffer(&self) -> BufferId {
        self.buffer
    }

    /// The next free byte.
    pub fn head(&self) -> u32 {
        self.head
    }

    /// Size of the backing buffer in bytes.
    pub fn capacity(&self) -> u32 {
        self.capacity
    }

    /// Alignment used by [`begin_block`](Self::begin_block).
    pub fn block_alignment(&self) -> u32 {
        self.block_alignment
    }

    /// Returns `true` inside a write cycle.
    pub fn is_mapped(&self) -> bool {
        self.mapped
    }

    /// The bytes written so far in the current (or last) cycle.
    pub fn bytes(&self) -> &[u8] {
        &self.staging[..self.head as usize]
    }

    fn reserve_aligned(&mut self, size: u32, alignment: u32) -> Result<u32, ArenaError> {
        if !self.mapped {
            return Err(ArenaError::NotMapped);
        }
        let offset = align_up(self.head, alignment);
        let end = offset.checked_add(size).filter(|end| *end <= self.capacity);
        match end {
            Some(end) => {
                self.head = end;
                Ok(offset)
            }
            None => Err(ArenaError::Overflow {
                offset,
                size,
                capacity: self.capacity,
            }),
        }
    }
}
