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

//! Contracts for the external collaborators that turn files into CPU data.
//!
//! The renderer never parses files itself. It consumes decoded images through
//! [`ImageLoader`] and parsed models through [`ModelLoader`]; concrete decoders
//! live in `tessel-lanes`.

mod image;
mod model;

pub use self::image::*;
pub use self::model::*;

/// The error type returned by loader collaborators. Must be thread-safe.
pub type LoadError = Box<dyn std::error::Error + Send + Sync>;
