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

//! Acts as the **[A]gent** for the rendering subsystem.
//!
//! The agent is the explicit render context. It owns the resource cache, the
//! uniform arena, the G-buffer targets, the procedural geometry and the scene,
//! and hands borrowed views of them to exactly one render lane per frame. It
//! decides *which* lane runs; the lanes decide what the GPU is told.

mod agent;

pub use agent::*;
