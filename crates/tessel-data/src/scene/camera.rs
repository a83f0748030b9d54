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

//! A free-flying perspective camera.

use serde::{Deserialize, Serialize};
use tessel_core::math::{Extent2D, Mat4, Vec3};

/// A direction the camera can be moved in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CameraMove {
    /// Along `front`.
    Forward,
    /// Against `front`.
    Backward,
    /// Against `right`.
    Left,
    /// Along `right`.
    Right,
    /// Along the world up axis.
    Up,
    /// Against the world up axis.
    Down,
}

/// A yaw/pitch camera using a right-handed, OpenGL clip-space projection.
///
/// `front`, `right` and `up` are derived from the angles by
/// [`Camera::update_vectors`]; edit the angles, not the vectors.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Camera {
    /// World-space position.
    pub position: Vec3,
    /// Unit view direction.
    pub front: Vec3,
    /// Camera up vector.
    pub up: Vec3,
    /// Camera right vector.
    pub right: Vec3,
    /// The world's up axis.
    pub world_up: Vec3,
    /// Yaw in degrees. `-90` looks down `-Z`.
    pub yaw: f32,
    /// Pitch in degrees, clamped to `±89`.
    pub pitch: f32,
    /// Vertical field of view in degrees.
    pub fov: f32,
    /// Near clip plane.
    pub near: f32,
    /// Far clip plane.
    pub far: f32,
    /// Degrees of rotation per pixel of mouse motion per second.
    pub sensitivity: f32,
}

impl Default for Camera {
    fn default() -> Self {
        let mut camera = Self {
            position: Vec3::new(0.0, 0.0, 10.0),
            front: Vec3::NEG_Z,
            up: Vec3::Y,
            right: Vec3::X,
            world_up: Vec3::Y,
            yaw: -90.0,
            pitch: 0.0,
            fov: 60.0,
            near: 0.1,
            far: 100.0,
            sensitivity: 20.0,
        };
        camera.update_vectors();
        camera
    }
}

impl Camera {
    const MOVE_SPEED: f32 = 2.5;
    const LIFT_SPEED: f32 = 20.0;
    const PITCH_LIMIT: f32 = 89.0;

    /// The world-to-view matrix.
    pub fn view(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.position + self.front, self.up)
    }

    /// The view-to-clip matrix for the given aspect ratio.
    pub fn projection(&self, aspect: f32) -> Mat4 {
        Mat4::perspective_rh_gl(self.fov.to_radians(), aspect, self.near, self.far)
    }

    /// `projection * view` for a display of the given size.
    pub fn view_projection(&self, display: Extent2D) -> Mat4 {
        self.projection(display.aspect_ratio()) * self.view()
    }

    /// Recomputes `front`, `right` and `up` from yaw and pitch.
    pub fn update_vectors(&mut self) {
        let (yaw, pitch) = (self.yaw.to_radians(), self.pitch.to_radians());
        self.front = Vec3::new(yaw.cos() * pitch.cos(), pitch.sin(), yaw.sin() * pitch.cos())
            .normalize_or(Vec3::NEG_Z);
        self.right = self.front.cross(self.world_up).normalize_or(Vec3::X);
        self.up = self.right.cross(self.front).normalize_or(Vec3::Y);
    }

    /// Rotates by a mouse delta in pixels over `dt` seconds.
    pub fn rotate(&mut self, dx: f32, dy: f32, dt: f32) {
        self.yaw += dx * dt * self.sensitivity;
        self.pitch = (self.pitch - dy * dt * self.sensitivity)
            .clamp(-Self::PITCH_LIMIT, Self::PITCH_LIMIT);
        self.update_vectors();
    }

    /// Moves the camera for `dt` seconds.
    pub fn translate(&mut self, direction: CameraMove, dt: f32) {
        let step = Self::MOVE_SPEED * dt;
        let lift = Self::LIFT_SPEED * dt;
        self.position += match direction {
            CameraMove::Forward => self.front * step,
            CameraMove::Backward => -self.front * step,
            CameraMove::Left => -self.right * step,
            CameraMove::Right => self.right * step,
            CameraMove::Up => self.world_up * lift,
            CameraMove::Down => -self.world_up * lift,
        };
    }
}
