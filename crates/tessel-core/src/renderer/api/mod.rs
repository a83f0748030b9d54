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

//! Backend-agnostic rendering API.
//!
//! - **[`buffer`]**, **[`texture`]**, **[`vertex`]**, **[`framebuffer`]**: GPU
//!   handles and their descriptors.
//! - **[`program`]**: shader program sources, reflection and uniform values.
//! - **[`command`]**: per-draw state (clear, render state, topology).
//! - **[`adapter`]**: device limits and driver information.
//! - **[`settings`]**: user-facing renderer configuration.
//! - **[`uniform_arena`]**: the per-frame linear allocator for uniform blocks.

pub mod adapter;
pub mod buffer;
pub mod command;
pub mod framebuffer;
pub mod program;
pub mod settings;
pub mod texture;
pub mod uniform_arena;
pub mod vertex;

pub use self::adapter::*;
pub use self::buffer::*;
pub use self::command::*;
pub use self::framebuffer::*;
pub use self::program::*;
pub use self::settings::*;
pub use self::texture::*;
pub use self::uniform_arena::*;
pub use self::vertex::*;
