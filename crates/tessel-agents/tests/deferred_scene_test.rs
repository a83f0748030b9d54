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

//! The reference scene, rendered in deferred mode and rasterized on the CPU
//! from the recorded vertex, index and uniform buffers.

mod common;

use approx::assert_relative_eq;
use common::{settings, ShaderFile, SolidImages, DISPLAY};
use tessel_agents::render_agent::RenderAgent;
use tessel_core::math::{Mat4, Vec3, Vec4};
use tessel_core::renderer::testing::{DrawCall, RecordingDevice};
use tessel_core::renderer::{bindings, locations, RenderMode, RenderTarget, Topology};
use tessel_data::scene::{EntityDefinition, LightKind, SceneDefinition};
use tessel_lanes::asset_lane::ObjLoaderLane;
use tessel_lanes::render_lane::targets::attachments;
use tessel_lanes::render_lane::PassKind;

const PLANE_OBJ: &str = "\
o Plane
v -1.0 -1.0 0.0
v 1.0 -1.0 0.0
v 1.0 1.0 0.0
v -1.0 1.0 0.0
vt 0.0 0.0
vt 1.0 0.0
vt 1.0 1.0
vt 0.0 1.0
vn 0.0 0.0 1.0
f 1/1/1 2/2/1 3/3/1
f 1/1/1 3/3/1 4/4/1
";

fn floats(bytes: &[u8]) -> Vec<f32> {
    bytes
        .chunks_exact(4)
        .map(|b| f32::from_le_bytes([b[0], b[1], b[2], b[3]]))
        .collect()
}

fn u32s(bytes: &[u8]) -> Vec<u32> {
    bytes
        .chunks_exact(4)
        .map(|b| u32::from_le_bytes([b[0], b[1], b[2], b[3]]))
        .collect()
}

/// Projects one recorded indexed draw to window coordinates, one triangle at a time.
fn screen_triangles(device: &RecordingDevice, draw: &DrawCall) -> Vec<[Vec3; 3]> {
    assert_eq!(draw.topology, Topology::Triangles);
    let vertex_array = device.vertex_array(draw.vertex_array.unwrap()).unwrap();
    let position = vertex_array
        .attributes
        .iter()
        .find(|a| a.location == locations::POSITION)
        .unwrap();
    let vertices = device.buffer_contents(vertex_array.vertex_buffer).unwrap();
    let indices = device
        .buffer_contents(vertex_array.index_buffer.unwrap())
        .unwrap();
    let start = draw.offset as usize;
    let indices = u32s(&indices[start..start + draw.count as usize * 4]);

    let (_, buffer, offset, size) = *draw
        .uniform_ranges
        .iter()
        .find(|(binding, ..)| *binding == bindings::LOCAL_PARAMS)
        .unwrap();
    let block = &device.buffer_contents(buffer).unwrap()[offset as usize..(offset + size) as usize];
    let block = floats(block);
    let world = Mat4::from_cols_slice(&block[0..16]);
    let view_projection = Mat4::from_cols_slice(&block[16..32]);

    let to_screen = |index: u32| {
        let at = position.offset as usize + index as usize * vertex_array.stride as usize;
        let p = floats(&vertices[at..at + 12]);
        let clip = view_projection * world * Vec4::new(p[0], p[1], p[2], 1.0);
        let ndc = clip.truncate() / clip.w;
        Vec3::new(
            (ndc.x * 0.5 + 0.5) * DISPLAY.width as f32,
            (ndc.y * 0.5 + 0.5) * DISPLAY.height as f32,
            ndc.z,
        )
    };
    indices
        .chunks_exact(3)
        .map(|t| [to_screen(t[0]), to_screen(t[1]), to_screen(t[2])])
        .collect()
}

fn edge(a: Vec3, b: Vec3, x: f32, y: f32) -> f32 {
    (b.x - a.x) * (y - a.y) - (b.y - a.y) * (x - a.x)
}

/// Marks every pixel whose centre lies inside a triangle.
fn rasterize(triangles: &[[Vec3; 3]]) -> Vec<bool> {
    let (w, h) = (DISPLAY.width as usize, DISPLAY.height as usize);
    let mut coverage = vec![false; w * h];
    for &[a, b, c] in triangles {
        let area = edge(a, b, c.x, c.y);
        if area == 0.0 {
            continue;
        }
        let min_x = a.x.min(b.x).min(c.x).floor().max(0.0) as usize;
        let max_x = (a.x.max(b.x).max(c.x).ceil() as usize).min(w);
        let min_y = a.y.min(b.y).min(c.y).floor().max(0.0) as usize;
        let max_y = (a.y.max(b.y).max(c.y).ceil() as usize).min(h);
        for y in min_y..max_y {
            for x in min_x..max_x {
                let (px, py) = (x as f32 + 0.5, y as f32 + 0.5);
                let w0 = edge(b, c, px, py) / area;
                let w1 = edge(c, a, px, py) / area;
                let w2 = edge(a, b, px, py) / area;
                if w0 >= 0.0 && w1 >= 0.0 && w2 >= 0.0 {
                    coverage[y * w + x] = true;
                }
            }
        }
    }
    coverage
}

#[test]
fn reference_scene_fills_the_g_buffer_and_lights_it() {
    let dir = tempfile::tempdir().unwrap();
    let model = dir.path().join("Plane.obj");
    std::fs::write(&model, PLANE_OBJ).unwrap();
    let definition = SceneDefinition {
        entities: vec![EntityDefinition::at_origin(model.clone())],
        ..SceneDefinition::default()
    };
    assert_eq!(definition.lights[0].kind, LightKind::Directional);
    assert_eq!(definition.lights[0].color, Vec3::ONE);
    assert_eq!(definition.lights[1].kind, LightKind::Point);
    assert_eq!(definition.lights[1].color, Vec3::new(0.0, 0.8, 0.9));

    let shader = ShaderFile::new();
    let mut device = RecordingDevice::new();
    let mut settings = settings(&shader, RenderMode::Deferred);
    settings.show_gizmo = false;
    let mut agent = RenderAgent::new(
        &mut device,
        DISPLAY,
        settings,
        &definition,
        &ObjLoaderLane,
        &SolidImages,
    )
    .unwrap();
    assert_eq!(agent.scene().entities.len(), 1);
    assert_eq!(agent.scene().entities[0].transform, Mat4::IDENTITY);

    let report = agent.render(&mut device, DISPLAY).unwrap();

    assert_eq!(report.passes, vec![PassKind::Geometry, PassKind::Lighting]);
    assert!(report.device_errors.is_empty(), "{:?}", report.device_errors);
    assert!(agent.target_status().is_complete());

    let targets = agent.targets();
    for index in [attachments::NORMALS, attachments::ALBEDO, attachments::POSITION] {
        assert!(device.was_written(targets.color(index).unwrap()));
    }

    let draws = device.draws();
    let geometry: Vec<&DrawCall> = draws
        .iter()
        .copied()
        .filter(|d| d.target == targets.target())
        .collect();
    assert_eq!(geometry.len(), 1);
    let triangles = screen_triangles(&device, geometry[0]);
    assert_eq!(triangles.len(), 2);

    let coverage = rasterize(&triangles);
    let covered = coverage.iter().filter(|c| **c).count();
    assert!(covered > 0);

    // The plane is square and faces the camera, so its screen bounds are
    // almost exactly filled.
    let corners = triangles.iter().flatten();
    let min_x = corners.clone().map(|p| p.x).fold(f32::MAX, f32::min);
    let max_x = corners.clone().map(|p| p.x).fold(f32::MIN, f32::max);
    let min_y = corners.clone().map(|p| p.y).fold(f32::MAX, f32::min);
    let max_y = corners.map(|p| p.y).fold(f32::MIN, f32::max);
    assert!(min_x > 0.0 && max_x < DISPLAY.width as f32);
    assert!(min_y > 0.0 && max_y < DISPLAY.height as f32);
    let bounds_area = (max_x - min_x) * (max_y - min_y);
    assert_relative_eq!(covered as f32 / bounds_area, 1.0, epsilon = 0.05);
    // The camera looks straight down -Z at a plane in z = 0.
    for corner in triangles.iter().flatten() {
        assert_relative_eq!(corner.z, triangles[0][0].z, epsilon = 1e-5);
    }
    for (i, _) in coverage.iter().enumerate().filter(|(_, c)| **c) {
        let (x, y) = ((i % DISPLAY.width as usize) as f32, (i / DISPLAY.width as usize) as f32);
        assert!(x + 1.0 >= min_x && x <= max_x && y + 1.0 >= min_y && y <= max_y);
    }

    // The lighting pass reads all three geometry attachments.
    let lighting = draws.last().unwrap();
    assert_eq!(lighting.target, RenderTarget::Default);
    let sampled: Vec<_> = lighting.textures.iter().map(|(_, t)| *t).collect();
    for index in [attachments::POSITION, attachments::NORMALS, attachments::ALBEDO] {
        assert!(sampled.contains(&targets.color(index).unwrap()));
    }
    assert!(device.default_target_written());
}
