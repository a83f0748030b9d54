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

//! GPU-resident resources keyed by content identity.

mod handles;
mod material;
mod mesh;
mod program;
mod resource_cache;
mod texture;

pub use handles::*;
pub use material::*;
pub use mesh::*;
pub use program::*;
pub use resource_cache::*;
pub use texture::*;
