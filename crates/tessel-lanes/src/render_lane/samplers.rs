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

//! Binding named samplers to texture units.

use tessel_core::renderer::{GraphicsDevice, ProgramId, ResourceError, TextureId, UniformValue};

/// A texture bound to a unit and announced to a program's sampler uniform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SamplerBinding<'a> {
    /// The sampler uniform's name.
    pub name: &'a str,
    /// The texture unit.
    pub unit: u32,
    /// The texture, or `None` to leave the unit empty.
    pub texture: Option<TextureId>,
}

impl<'a> SamplerBinding<'a> {
    /// Creates a binding.
    pub const fn new(name: &'a str, unit: u32, texture: Option<TextureId>) -> Self {
        Self { name, unit, texture }
    }
}

/// Binds each texture to its unit and points the matching sampler uniform at
/// that same unit. `program` must be active.
pub fn bind_samplers(
    device: &mut dyn GraphicsDevice,
    program: ProgramId,
    samplers: &[SamplerBinding<'_>],
) -> Result<(), ResourceError> {
    for sampler in samplers {
        device.set_uniform(program, sampler.name, UniformValue::Int(sampler.unit as i32))?;
        device.bind_texture(sampler.unit, sampler.texture)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tessel_core::math::Extent2D;
    use tessel_core::renderer::testing::RecordingDevice;
    use tessel_core::renderer::{ProgramSource, TextureDescriptor, TextureFormat};

    #[test]
    fn sampler_uniform_always_matches_its_unit() {
        let mut device = RecordingDevice::new();
        let program = device
            .create_program(&ProgramSource {
                label: "light".into(),
                vertex: "".into(),
                fragment: "".into(),
            })
            .unwrap()
            .id;
        let mut textures = Vec::new();
        for _ in 0..3 {
            let desc =
                TextureDescriptor::render_target("t", Extent2D::new(2, 2), TextureFormat::Rgba8);
            textures.push(device.create_texture(&desc, None).unwrap());
        }
        device.use_program(Some(program)).unwrap();

        bind_samplers(
            &mut device,
            program,
            &[
                SamplerBinding::new("uPositionTexture", 0, Some(textures[0])),
                SamplerBinding::new("uNormalsTexture", 1, Some(textures[1])),
                SamplerBinding::new("uAlbedoTexture", 2, Some(textures[2])),
            ],
        )
        .unwrap();

        let names = ["uPositionTexture", "uNormalsTexture", "uAlbedoTexture"];
        for (unit, name) in names.iter().enumerate() {
            assert_eq!(device.uniform(program, name), Some(UniformValue::Int(unit as i32)));
        }
        assert!(device.take_errors().is_empty());
    }
}
