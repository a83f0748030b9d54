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

use serde::{Deserialize, Serialize};
use tessel_core::math::Vec3;

/// The kind of a light. The discriminant is the type tag packed into uniform blocks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LightKind {
    /// Parallel rays along `direction`; `position` is only used by the gizmo.
    Directional = 0,
    /// Radiates from `position`; `direction` is ignored.
    Point = 1,
}

impl LightKind {
    /// The tag the shaders switch on.
    pub fn tag(self) -> u32 {
        self as u32
    }
}

/// A scene light.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Light {
    /// Directional or point.
    pub kind: LightKind,
    /// Linear RGB colour.
    pub color: Vec3,
    /// Direction the light travels in.
    pub direction: Vec3,
    /// World-space position.
    pub position: Vec3,
    /// Scalar intensity, consumed by the lighting pass.
    pub intensity: f32,
}

impl Light {
    /// A directional light.
    pub fn directional(color: Vec3, direction: Vec3, intensity: f32) -> Self {
        Self {
            kind: LightKind::Directional,
            color,
            direction,
            position: Vec3::ZERO,
            intensity,
        }
    }

    /// A point light.
    pub fn point(color: Vec3, position: Vec3, intensity: f32) -> Self {
        Self {
            kind: LightKind::Point,
            color,
            direction: Vec3::new(0.0, -1.0, 1.0),
            position,
            intensity,
        }
    }
}
