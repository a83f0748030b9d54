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

//! The off-screen G-buffer every mode renders into.

use tessel_core::math::Extent2D;
use tessel_core::renderer::{
    BlitDescriptor, BlitMask, DebugView, FilterMode, FramebufferDescriptor, FramebufferId,
    FramebufferStatus, GraphicsDevice, RenderTarget, ResourceError, TextureDescriptor,
    TextureFormat, TextureId,
};

/// Colour attachment indices of the G-buffer.
pub mod attachments {
    /// Final or forward-lit colour.
    pub const COLOR: u32 = 0;
    /// World-space normals.
    pub const NORMALS: u32 = 1;
    /// Surface albedo.
    pub const ALBEDO: u32 = 2;
    /// World-space position.
    pub const POSITION: u32 = 3;

    /// Draw buffers of passes that only produce colour.
    pub const COLOR_ONLY: [u32; 1] = [COLOR];
    /// Draw buffers of the geometry pass.
    pub const ALL: [u32; 4] = [COLOR, NORMALS, ALBEDO, POSITION];
}

const COLOR_FORMATS: [(&str, TextureFormat); 4] = [
    ("G-Buffer Color", TextureFormat::Rgba8),
    ("G-Buffer Normals", TextureFormat::Rgba16Float),
    ("G-Buffer Albedo", TextureFormat::Rgba8),
    ("G-Buffer Position", TextureFormat::Rgba16Float),
];

/// One framebuffer with four colour attachments and a depth attachment.
///
/// Completeness is checked once after the attachments are bound. An incomplete
/// framebuffer is logged with its reason and kept: rendering continues with
/// undefined output.
#[derive(Debug)]
pub struct RenderTargets {
    framebuffer: FramebufferId,
    colors: [TextureId; 4],
    depth: TextureId,
    size: Extent2D,
    status: FramebufferStatus,
}

impl RenderTargets {
    /// Creates every attachment at `size`.
    pub fn new(device: &mut dyn GraphicsDevice, size: Extent2D) -> Result<Self, ResourceError> {
        Self::with_attachment_sizes(device, [size; 4], size)
    }

    /// Creates the attachments with individual sizes. Anything but equal
    /// sizes yields an incomplete framebuffer; useful to exercise the
    /// completeness diagnostics.
    pub fn with_attachment_sizes(
        device: &mut dyn GraphicsDevice,
        color_sizes: [Extent2D; 4],
        depth_size: Extent2D,
    ) -> Result<Self, ResourceError> {
        let mut colors = Vec::with_capacity(4);
        for ((label, format), size) in COLOR_FORMATS.iter().zip(color_sizes) {
            let descriptor = TextureDescriptor::render_target(*label, size, *format);
            colors.push(device.create_texture(&descriptor, None)?);
        }
        let colors: [TextureId; 4] = [colors[0], colors[1], colors[2], colors[3]];
        let depth = device.create_texture(
            &TextureDescriptor::render_target("G-Buffer Depth", depth_size, TextureFormat::Depth24),
            None,
        )?;
        let framebuffer = device.create_framebuffer(&FramebufferDescriptor {
            label: Some("G-Buffer".into()),
            color_attachments: colors.as_slice().into(),
            depth_attachment: Some(depth),
        })?;

        let status = device.framebuffer_status(framebuffer)?;
        if status.is_complete() {
            log::debug!("G-buffer ready at {}x{}", color_sizes[0].width, color_sizes[0].height);
        } else {
            log::error!("G-buffer framebuffer is incomplete: {status}");
        }

        Ok(Self {
            framebuffer,
            colors,
            depth,
            size: color_sizes[0],
            status,
        })
    }

    /// Recreates every attachment at `size`.
    pub fn resize(
        &mut self,
        device: &mut dyn GraphicsDevice,
        size: Extent2D,
    ) -> Result<(), ResourceError> {
        if size == self.size && self.status.is_complete() {
            return Ok(());
        }
        let replacement = Self::new(device, size)?;
        let previous = std::mem::replace(self, replacement);
        previous.destroy(device);
        Ok(())
    }

    /// Releases the framebuffer and its attachments.
    pub fn destroy(self, device: &mut dyn GraphicsDevice) {
        let _ = device.destroy_framebuffer(self.framebuffer);
        for texture in self.colors.into_iter().chain([self.depth]) {
            let _ = device.destroy_texture(texture);
        }
    }

    /// The completeness status recorded at creation.
    pub fn status(&self) -> FramebufferStatus {
        self.status
    }

    /// Size of the colour attachments.
    pub fn size(&self) -> Extent2D {
        self.size
    }

    /// The off-screen render target.
    pub fn target(&self) -> RenderTarget {
        RenderTarget::Offscreen(self.framebuffer)
    }

    /// The texture behind colour attachment `index` (see [`attachments`]).
    pub fn color(&self, index: u32) -> Option<TextureId> {
        self.colors.get(index as usize).copied()
    }

    /// The depth texture.
    pub fn depth(&self) -> TextureId {
        self.depth
    }

    /// The texture a debug UI shows for `view`.
    pub fn debug_view_texture(&self, view: DebugView) -> TextureId {
        match view {
            DebugView::Albedo => self.colors[attachments::ALBEDO as usize],
            DebugView::Normals => self.colors[attachments::NORMALS as usize],
            DebugView::Position => self.colors[attachments::POSITION as usize],
            DebugView::Depth => self.depth,
        }
    }

    /// Copies one plane of the off-screen target into the default target.
    pub fn blit_to_default(
        &self,
        device: &mut dyn GraphicsDevice,
        display: Extent2D,
        mask: BlitMask,
    ) -> Result<(), ResourceError> {
        let filter = match mask {
            BlitMask::Color => FilterMode::Linear,
            BlitMask::Depth => FilterMode::Nearest,
        };
        device.blit(&BlitDescriptor {
            source: self.target(),
            destination: RenderTarget::Default,
            source_extent: display,
            destination_extent: display,
            mask,
            filter,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tessel_core::renderer::testing::RecordingDevice;

    #[test]
    fn matching_sizes_are_complete() {
        let mut device = RecordingDevice::new();
        let targets = RenderTargets::new(&mut device, Extent2D::new(1280, 720)).unwrap();

        assert!(targets.status().is_complete());
        assert_eq!(device.texture_count(), 5);
        let normals = device.texture(targets.color(attachments::NORMALS).unwrap()).unwrap();
        assert_eq!(normals.format, TextureFormat::Rgba16Float);
        assert!(!normals.mipmapped);
    }

    #[test]
    fn half_resolution_attachment_is_reported_as_dimension_mismatch() {
        let mut device = RecordingDevice::new();
        let full = Extent2D::new(1280, 720);
        let half = Extent2D::new(640, 360);

        let targets =
            RenderTargets::with_attachment_sizes(&mut device, [full, full, half, full], full)
                .unwrap();

        assert_eq!(targets.status(), FramebufferStatus::IncompleteDimensions);
    }

    #[test]
    fn resize_replaces_every_attachment() {
        let mut device = RecordingDevice::new();
        let mut targets = RenderTargets::new(&mut device, Extent2D::new(800, 600)).unwrap();
        let old_depth = targets.depth();

        targets.resize(&mut device, Extent2D::new(1024, 768)).unwrap();

        assert_ne!(targets.depth(), old_depth);
        assert_eq!(targets.size(), Extent2D::new(1024, 768));
        assert_eq!(device.texture_count(), 5);
        assert!(device.texture(old_depth).is_none());
    }
}
