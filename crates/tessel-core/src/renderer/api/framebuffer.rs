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

//! Off-screen framebuffers, their completeness status and blits between targets.

use super::texture::{FilterMode, TextureId};
use crate::math::Extent2D;
use std::borrow::Cow;
use std::fmt;

/// An opaque handle to an off-screen framebuffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FramebufferId(pub usize);

/// Where draws and clears land.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum RenderTarget {
    /// The window's default framebuffer.
    #[default]
    Default,
    /// An off-screen framebuffer.
    Offscreen(FramebufferId),
}

/// A descriptor used to create a [`FramebufferId`].
#[derive(Debug, Clone)]
pub struct FramebufferDescriptor<'a> {
    /// An optional debug label.
    pub label: Option<Cow<'a, str>>,
    /// Colour attachments, attached to `COLOR0..COLORn` in order.
    pub color_attachments: Cow<'a, [TextureId]>,
    /// The depth attachment.
    pub depth_attachment: Option<TextureId>,
}

/// The result of a framebuffer completeness check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FramebufferStatus {
    /// The framebuffer can be rendered into.
    Complete,
    /// The target is the default framebuffer and it does not exist.
    Undefined,
    /// An attachment is not attachment-complete.
    IncompleteAttachment,
    /// No image is attached.
    MissingAttachment,
    /// A draw buffer names an attachment with no image.
    IncompleteDrawBuffer,
    /// The read buffer names an attachment with no image.
    IncompleteReadBuffer,
    /// The combination of internal formats is not supported.
    Unsupported,
    /// Attachments disagree on sample count.
    IncompleteMultisample,
    /// Attachments disagree on layering.
    IncompleteLayerTargets,
    /// Attachments disagree on width or height.
    IncompleteDimensions,
    /// A status code the backend does not know how to name.
    Unknown(u32),
}

impl FramebufferStatus {
    /// Returns `true` for [`FramebufferStatus::Complete`].
    pub fn is_complete(self) -> bool {
        self == FramebufferStatus::Complete
    }
}

impl fmt::Display for FramebufferStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FramebufferStatus::Complete => write!(f, "FRAMEBUFFER_COMPLETE"),
            FramebufferStatus::Undefined => write!(f, "FRAMEBUFFER_UNDEFINED"),
            FramebufferStatus::IncompleteAttachment => {
                write!(f, "FRAMEBUFFER_INCOMPLETE_ATTACHMENT")
            }
            FramebufferStatus::MissingAttachment => {
                write!(f, "FRAMEBUFFER_INCOMPLETE_MISSING_ATTACHMENT")
            }
            FramebufferStatus::IncompleteDrawBuffer => {
                write!(f, "FRAMEBUFFER_INCOMPLETE_DRAW_BUFFER")
            }
            FramebufferStatus::IncompleteReadBuffer => {
                write!(f, "FRAMEBUFFER_INCOMPLETE_READ_BUFFER")
            }
            FramebufferStatus::Unsupported => write!(f, "FRAMEBUFFER_UNSUPPORTED"),
            FramebufferStatus::IncompleteMultisample => {
                write!(f, "FRAMEBUFFER_INCOMPLETE_MULTISAMPLE")
            }
            FramebufferStatus::IncompleteLayerTargets => {
                write!(f, "FRAMEBUFFER_INCOMPLETE_LAYER_TARGETS")
            }
            FramebufferStatus::IncompleteDimensions => {
                write!(f, "FRAMEBUFFER_INCOMPLETE_DIMENSIONS")
            }
            FramebufferStatus::Unknown(code) => {
                write!(f, "Unknown framebuffer status error | {code}")
            }
        }
    }
}

/// Which planes a blit copies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlitMask {
    /// The read colour attachment.
    Color,
    /// The depth attachment.
    Depth,
}

/// A framebuffer-to-framebuffer copy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlitDescriptor {
    /// Where pixels are read from.
    pub source: RenderTarget,
    /// Where pixels are written to.
    pub destination: RenderTarget,
    /// The source rectangle, anchored at the origin.
    pub source_extent: Extent2D,
    /// The destination rectangle, anchored at the origin.
    pub destination_extent: Extent2D,
    /// The planes to copy.
    pub mask: BlitMask,
    /// Scaling filter; depth blits must use [`FilterMode::Nearest`].
    pub filter: FilterMode,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_names_follow_driver_constants() {
        assert_eq!(
            FramebufferStatus::IncompleteLayerTargets.to_string(),
            "FRAMEBUFFER_INCOMPLETE_LAYER_TARGETS"
        );
        assert_eq!(
            FramebufferStatus::Unknown(0x1234).to_string(),
            "Unknown framebuffer status error | 4660"
        );
        assert!(FramebufferStatus::Complete.is_complete());
        assert!(!FramebufferStatus::IncompleteDimensions.is_complete());
    }
}
