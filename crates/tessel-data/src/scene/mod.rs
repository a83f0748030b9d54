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

//! The simple containers the passes read every frame: one camera, the lights
//! and the placed models.

mod camera;
mod definition;
mod entity;
mod light;

pub use camera::*;
pub use definition::*;
pub use entity::*;
pub use light::*;

use crate::assets::ModelHandle;
use std::path::Path;

/// The mutable scene state shared with the debug UI.
#[derive(Debug, Clone, Default)]
pub struct Scene {
    /// The viewer.
    pub camera: Camera,
    /// Lights, in upload order.
    pub lights: Vec<Light>,
    /// Model instances, in draw order.
    pub entities: Vec<Entity>,
}

impl Scene {
    /// Builds a scene, asking `load_model` for the handle of every entity's model.
    ///
    /// Entities whose model fails to load are dropped with an error log.
    pub fn from_definition(
        definition: &SceneDefinition,
        mut load_model: impl FnMut(&Path) -> ModelHandle,
    ) -> Self {
        let entities = definition
            .entities
            .iter()
            .filter_map(|def| {
                let model = load_model(&def.model);
                if !model.is_valid() {
                    log::error!("Skipping entity: model '{}' is unavailable", def.model.display());
                    return None;
                }
                Some(Entity::new(model, def.transform()))
            })
            .collect();
        Self {
            camera: definition.camera.to_camera(),
            lights: definition.lights.clone(),
            entities,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tessel_core::math::{Mat4, Vec3};

    #[test]
    fn entities_with_missing_models_are_skipped() {
        let mut definition = SceneDefinition::default();
        definition.entities.push(EntityDefinition {
            translation: Vec3::X,
            ..EntityDefinition::at_origin("missing.obj")
        });

        let scene = Scene::from_definition(&definition, |path| {
            if path.ends_with("Plane.obj") {
                ModelHandle(0)
            } else {
                ModelHandle::INVALID
            }
        });

        assert_eq!(scene.entities.len(), 1);
        assert_eq!(scene.entities[0].transform, Mat4::IDENTITY);
        assert_eq!(scene.lights.len(), 2);
        assert!(scene.entities[0].local_range.is_none());
    }
}
