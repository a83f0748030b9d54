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

//! std140 packing of the global and local uniform blocks.
//!
//! ```glsl
//! struct Light {            // 64-byte stride
//!     uint type;            //  0
//!     vec3 color;           // 16
//!     vec3 direction;       // 32
//!     vec3 position;        // 48
//!     float intensity;      // 60, lighting pass only
//! };
//! layout(binding = 0, std140) uniform GlobalParams {
//!     vec3 uCameraPosition; //  0
//!     uint uLightCount;     // 12
//!     Light uLight[16];     // 16, omitted by the geometry pass
//! };
//! layout(binding = 1, std140) uniform LocalParams {
//!     mat4 uWorldMatrix;
//!     mat4 uViewProjectionMatrix;
//! };
//! ```

use tessel_core::math::{Mat4, Vec3};
use tessel_core::renderer::{
    bindings, ArenaError, GraphicsDevice, ResourceError, UniformArena, UniformRange,
    STD140_STRUCT_ALIGNMENT,
};
use tessel_data::scene::Light;

/// Size of the light array every `GlobalParams` declaration reserves.
pub const MAX_LIGHTS: usize = 16;

/// Stride of one `Light` in the array.
pub const LIGHT_STRIDE: u32 = 64;

/// Size of the camera position and light count header.
pub const GLOBAL_HEADER_SIZE: u32 = 16;

/// Full size of a `GlobalParams` block with its light array.
pub const GLOBAL_BLOCK_SIZE: u32 = GLOBAL_HEADER_SIZE + MAX_LIGHTS as u32 * LIGHT_STRIDE;

/// Size of a `LocalParams` block.
pub const LOCAL_BLOCK_SIZE: u32 = 128;

fn pack_globals(
    arena: &mut UniformArena,
    camera_position: Vec3,
    lights: &[Light],
    with_intensity: bool,
) -> Result<UniformRange, ArenaError> {
    let start = arena.begin_block()?;
    let count = lights.len().min(MAX_LIGHTS);
    arena.push_vec3(camera_position)?;
    arena.push_u32(count as u32)?;

    for light in &lights[..count] {
        arena.align_head(STD140_STRUCT_ALIGNMENT)?;
        arena.push_u32(light.kind.tag())?;
        arena.push_vec3(light.color)?;
        arena.push_vec3(light.direction)?;
        arena.push_vec3(light.position)?;
        if with_intensity {
            arena.push_f32(light.intensity)?;
        }
    }

    // The shader declares the whole array; the bound range must cover it.
    let head = arena.align_head(STD140_STRUCT_ALIGNMENT)?;
    let used = head - start;
    if used < GLOBAL_BLOCK_SIZE {
        arena.skip(GLOBAL_BLOCK_SIZE - used)?;
    }
    Ok(arena.end_block(start))
}

/// Global block of the forward pass: camera position, light count, then every
/// light's type, colour, direction and position.
pub fn pack_forward_globals(
    arena: &mut UniformArena,
    camera_position: Vec3,
    lights: &[Light],
) -> Result<UniformRange, ArenaError> {
    pack_globals(arena, camera_position, lights, false)
}

/// Global block of the deferred lighting pass: as the forward block, with each
/// light's intensity.
pub fn pack_lighting_globals(
    arena: &mut UniformArena,
    camera_position: Vec3,
    lights: &[Light],
) -> Result<UniformRange, ArenaError> {
    pack_globals(arena, camera_position, lights, true)
}

/// Global block of the deferred geometry pass: camera position and light count.
pub fn pack_geometry_globals(
    arena: &mut UniformArena,
    camera_position: Vec3,
    light_count: usize,
) -> Result<UniformRange, ArenaError> {
    let start = arena.begin_block()?;
    arena.push_vec3(camera_position)?;
    arena.push_u32(light_count.min(MAX_LIGHTS) as u32)?;
    Ok(arena.end_block(start))
}

/// Local block of one entity: its world matrix, then the camera's view-projection.
pub fn pack_entity_locals(
    arena: &mut UniformArena,
    world: Mat4,
    view_projection: Mat4,
) -> Result<UniformRange, ArenaError> {
    let start = arena.begin_block()?;
    arena.push_mat4(world)?;
    arena.push_mat4(view_projection)?;
    Ok(arena.end_block(start))
}

/// Runs `pack` inside one write cycle. The cycle is ended even when packing fails.
pub fn write_uniforms<R>(
    device: &mut dyn GraphicsDevice,
    arena: &mut UniformArena,
    pack: impl FnOnce(&mut UniformArena) -> Result<R, ArenaError>,
) -> Result<R, ArenaError> {
    arena.begin_write(device)?;
    let packed = pack(arena);
    let ended = arena.end_write(device);
    let packed = packed?;
    ended?;
    Ok(packed)
}

/// Binds a recorded range of the arena to a block binding point.
pub fn bind_block(
    device: &mut dyn GraphicsDevice,
    arena: &UniformArena,
    binding: u32,
    range: UniformRange,
) -> Result<(), ResourceError> {
    device.bind_buffer_range(binding, arena.buffer(), range.offset as u64, range.size as u64)
}

/// Binds a global block to binding point 0.
pub fn bind_globals(
    device: &mut dyn GraphicsDevice,
    arena: &UniformArena,
    range: UniformRange,
) -> Result<(), ResourceError> {
    bind_block(device, arena, bindings::GLOBAL_PARAMS, range)
}

/// Binds a local block to binding point 1.
pub fn bind_locals(
    device: &mut dyn GraphicsDevice,
    arena: &UniformArena,
    range: UniformRange,
) -> Result<(), ResourceError> {
    bind_block(device, arena, bindings::LOCAL_PARAMS, range)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tessel_core::renderer::testing::RecordingDevice;
    use tessel_core::renderer::DeviceLimits;

    fn arena(device: &mut RecordingDevice) -> UniformArena {
        UniformArena::new(device, 16 * 1024, 256).unwrap()
    }

    fn read_f32(bytes: &[u8], offset: u32) -> f32 {
        let at = offset as usize;
        f32::from_le_bytes(bytes[at..at + 4].try_into().unwrap())
    }

    fn read_u32(bytes: &[u8], offset: u32) -> u32 {
        let at = offset as usize;
        u32::from_le_bytes(bytes[at..at + 4].try_into().unwrap())
    }

    fn scene_lights() -> Vec<Light> {
        vec![
            Light::directional(Vec3::ONE, Vec3::new(0.0, -1.0, 1.0), 0.1),
            Light::point(Vec3::new(0.0, 0.8, 0.9), Vec3::new(2.0, -1.6, 2.0), 0.7),
        ]
    }

    #[test]
    fn lighting_block_follows_std140_light_stride() {
        let mut device = RecordingDevice::new();
        let mut arena = arena(&mut device);
        let lights = scene_lights();

        let range = write_uniforms(&mut device, &mut arena, |a| {
            pack_lighting_globals(a, Vec3::new(0.0, 1.0, 5.0), &lights)
        })
        .unwrap();

        let bytes = device.buffer_contents(arena.buffer()).unwrap();
        let base = range.offset;
        assert_eq!(range.size, GLOBAL_BLOCK_SIZE);
        assert_eq!(read_f32(bytes, base + 8), 5.0);
        assert_eq!(read_u32(bytes, base + 12), 2);

        let second = base + GLOBAL_HEADER_SIZE + LIGHT_STRIDE;
        assert_eq!(read_u32(bytes, second), 1);
        assert_eq!(read_f32(bytes, second + 20), 0.8);
        assert_eq!(read_f32(bytes, second + 48), 2.0);
        assert_eq!(read_f32(bytes, second + 52), -1.6);
        assert_eq!(read_f32(bytes, second + 60), 0.7);
    }

    #[test]
    fn entity_blocks_start_on_the_device_alignment() {
        let mut device = RecordingDevice::new();
        let mut arena = arena(&mut device);
        let view_projection = Mat4::perspective_rh_gl(1.0, 16.0 / 9.0, 0.1, 100.0);

        let ranges = write_uniforms(&mut device, &mut arena, |a| {
            let globals = pack_geometry_globals(a, Vec3::ZERO, 2)?;
            let first = pack_entity_locals(a, Mat4::IDENTITY, view_projection)?;
            let second = pack_entity_locals(a, Mat4::from_translation(Vec3::X), view_projection)?;
            Ok([globals, first, second])
        })
        .unwrap();

        assert_eq!(ranges[0].size, GLOBAL_HEADER_SIZE);
        for local in &ranges[1..] {
            assert_eq!(local.offset % 256, 0);
            assert_eq!(local.size, LOCAL_BLOCK_SIZE);
        }
        assert!(!ranges[1].overlaps(&ranges[2]));
        assert!(!arena.is_mapped());
    }

    #[test]
    fn lights_past_the_array_size_are_dropped() {
        let mut device = RecordingDevice::new();
        let mut arena = arena(&mut device);
        let lights = vec![Light::point(Vec3::ONE, Vec3::ZERO, 1.0); MAX_LIGHTS + 4];

        let range = write_uniforms(&mut device, &mut arena, |a| {
            pack_forward_globals(a, Vec3::ZERO, &lights)
        })
        .unwrap();

        assert_eq!(range.size, GLOBAL_BLOCK_SIZE);
        let bytes = device.buffer_contents(arena.buffer()).unwrap();
        assert_eq!(read_u32(bytes, range.offset + 12), MAX_LIGHTS as u32);
    }

    #[test]
    fn failed_packing_still_unmaps_the_arena() {
        let mut device = RecordingDevice::with_limits(DeviceLimits {
            uniform_buffer_offset_alignment: 256,
            max_uniform_block_size: 512,
        });
        let mut arena = UniformArena::from_device_limits(&mut device).unwrap();

        let result = write_uniforms(&mut device, &mut arena, |a| {
            pack_lighting_globals(a, Vec3::ZERO, &scene_lights())
        });

        assert!(matches!(result, Err(ArenaError::Overflow { .. })));
        assert!(!arena.is_mapped());
    }
}
