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

//! The serializable description a [`Scene`](super::Scene) is built from.

use super::{Camera, Light};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use tessel_core::math::{EulerRot, Mat4, Quat, Vec3};

/// An error raised while reading a scene definition file.
#[derive(Debug)]
pub enum SceneDefinitionError {
    /// The file could not be read.
    Io(std::io::Error),
    /// The file is not a valid RON scene definition.
    Parse(ron::error::SpannedError),
}

impl fmt::Display for SceneDefinitionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SceneDefinitionError::Io(e) => write!(f, "Failed to read scene definition: {e}"),
            SceneDefinitionError::Parse(e) => write!(f, "Invalid scene definition: {e}"),
        }
    }
}

impl std::error::Error for SceneDefinitionError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SceneDefinitionError::Io(e) => Some(e),
            SceneDefinitionError::Parse(e) => Some(e),
        }
    }
}

/// Starting values for the camera.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraDefinition {
    /// World-space position.
    pub position: Vec3,
    /// Yaw in degrees.
    pub yaw: f32,
    /// Pitch in degrees.
    pub pitch: f32,
    /// Vertical field of view in degrees.
    pub fov: f32,
}

impl Default for CameraDefinition {
    fn default() -> Self {
        let camera = Camera::default();
        Self {
            position: camera.position,
            yaw: camera.yaw,
            pitch: camera.pitch,
            fov: camera.fov,
        }
    }
}

impl CameraDefinition {
    /// Builds a camera with these values and default clip planes.
    pub fn to_camera(&self) -> Camera {
        let mut camera = Camera {
            position: self.position,
            yaw: self.yaw,
            pitch: self.pitch.clamp(-89.0, 89.0),
            fov: self.fov,
            ..Camera::default()
        };
        camera.update_vectors();
        camera
    }
}

/// One model instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityDefinition {
    /// The model file.
    pub model: PathBuf,
    /// Translation.
    #[serde(default)]
    pub translation: Vec3,
    /// XYZ Euler angles in degrees.
    #[serde(default)]
    pub rotation: Vec3,
    /// Per-axis scale.
    #[serde(default = "unit_scale")]
    pub scale: Vec3,
}

fn unit_scale() -> Vec3 {
    Vec3::ONE
}

impl EntityDefinition {
    /// An untransformed instance of `model`.
    pub fn at_origin(model: impl Into<PathBuf>) -> Self {
        Self {
            model: model.into(),
            translation: Vec3::ZERO,
            rotation: Vec3::ZERO,
            scale: Vec3::ONE,
        }
    }

    /// The model-to-world matrix.
    pub fn transform(&self) -> Mat4 {
        let r = self.rotation;
        let rotation = Quat::from_euler(
            EulerRot::XYZ,
            r.x.to_radians(),
            r.y.to_radians(),
            r.z.to_radians(),
        );
        Mat4::from_scale_rotation_translation(self.scale, rotation, self.translation)
    }
}

/// Everything needed to populate a scene.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneDefinition {
    /// Camera start values.
    pub camera: CameraDefinition,
    /// The lights.
    pub lights: Vec<Light>,
    /// The model instances.
    pub entities: Vec<EntityDefinition>,
    /// The image shown by the textured-quad mode.
    pub quad_texture: PathBuf,
}

impl Default for SceneDefinition {
    /// One white directional light, one cyan point light and the plane model
    /// at the origin.
    fn default() -> Self {
        Self {
            camera: CameraDefinition::default(),
            lights: vec![
                Light {
                    position: Vec3::new(0.0, 4.0, 0.0),
                    ..Light::directional(Vec3::ONE, Vec3::new(0.0, -1.0, 1.0), 0.1)
                },
                Light::point(Vec3::new(0.0, 0.8, 0.9), Vec3::new(2.0, -1.6, 2.0), 0.7),
            ],
            entities: vec![EntityDefinition::at_origin("assets/models/Cube/Plane.obj")],
            quad_texture: PathBuf::from("assets/textures/dice.png"),
        }
    }
}

impl SceneDefinition {
    /// Parses a RON document.
    pub fn from_ron(text: &str) -> Result<Self, SceneDefinitionError> {
        ron::from_str(text).map_err(SceneDefinitionError::Parse)
    }

    /// Reads and parses a RON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SceneDefinitionError> {
        let text = std::fs::read_to_string(path).map_err(SceneDefinitionError::Io)?;
        Self::from_ron(&text)
    }

    /// Serializes to pretty RON.
    pub fn to_ron(&self) -> Result<String, ron::Error> {
        let config = ron::ser::PrettyConfig::default().indentor("  ".to_string());
        ron::ser::to_string_pretty(self, config)
    }
}
