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

//! Keyboard and mouse camera controls.

use egui::{Key, PointerButton, Response};
use tessel_data::scene::{Camera, CameraMove};

const BINDINGS: [(Key, CameraMove); 6] = [
    (Key::W, CameraMove::Forward),
    (Key::S, CameraMove::Backward),
    (Key::A, CameraMove::Left),
    (Key::D, CameraMove::Right),
    (Key::R, CameraMove::Up),
    (Key::F, CameraMove::Down),
];

/// Applies W/A/S/D/R/F movement and left-drag rotation for this frame.
///
/// Keys are ignored while a text field has focus.
pub fn drive_camera(ctx: &egui::Context, viewport: &Response, camera: &mut Camera) {
    let dt = ctx.input(|i| i.stable_dt);

    if !ctx.wants_keyboard_input() {
        ctx.input(|i| {
            for (key, direction) in BINDINGS {
                if i.key_down(key) {
                    camera.translate(direction, dt);
                }
            }
        });
    }

    if viewport.dragged_by(PointerButton::Primary) {
        let delta = viewport.drag_delta();
        camera.rotate(delta.x, delta.y, dt);
    }
}
