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

//! Stable indices into the [`ResourceCache`](super::ResourceCache).
//!
//! Handles are plain indices. They stay valid for the lifetime of the cache
//! because nothing is ever evicted.

macro_rules! cache_handle {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(pub u32);

        impl $name {
            /// The sentinel returned when a resource could not be created.
            pub const INVALID: Self = Self(u32::MAX);

            /// Returns `false` for [`Self::INVALID`].
            pub fn is_valid(self) -> bool {
                self != Self::INVALID
            }

            pub(crate) fn index(self) -> usize {
                self.0 as usize
            }
        }
    };
}

cache_handle!(
    /// A compiled program variant.
    ProgramHandle
);
cache_handle!(
    /// A 2D texture loaded from a file or built in.
    TextureHandle
);
cache_handle!(
    /// Uploaded mesh geometry.
    MeshHandle
);
cache_handle!(
    /// A material.
    MaterialHandle
);
cache_handle!(
    /// A mesh plus one material per submesh.
    ModelHandle
);
