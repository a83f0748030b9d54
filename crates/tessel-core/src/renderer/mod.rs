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

//! Public contracts for the rendering subsystem.
//!
//! Everything a backend must implement lives in [`traits`]; the plain data
//! types that flow through those traits live in [`api`].

pub mod api;
pub mod error;
#[cfg(any(test, feature = "testing"))]
pub mod testing;
pub mod traits;

pub use self::api::*;
pub use self::error::{ArenaError, RenderError, ResourceError, ShaderError};
pub use self::traits::GraphicsDevice;
