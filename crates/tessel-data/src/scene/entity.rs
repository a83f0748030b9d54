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

use crate::assets::ModelHandle;
use tessel_core::math::Mat4;
use tessel_core::renderer::UniformRange;

/// A placed instance of a model.
#[derive(Debug, Clone, PartialEq)]
pub struct Entity {
    /// Model-to-world transform.
    pub transform: Mat4,
    /// The drawn model.
    pub model: ModelHandle,
    /// Where this frame's local block was packed. Rewritten every frame.
    pub local_range: Option<UniformRange>,
}

impl Entity {
    /// Creates an entity with no packed block yet.
    pub fn new(model: ModelHandle, transform: Mat4) -> Self {
        Self {
            transform,
            model,
            local_range: None,
        }
    }
}
