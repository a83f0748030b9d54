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

//! Interactive viewer for the tessel renderer.
//!
//! Run from the workspace root so that `assets/` resolves:
//! `cargo run -p sandbox`. `RUST_LOG` overrides the default `info` filter.

mod app;
mod input;
mod ui;

use anyhow::Result;
use app::SandboxApp;
use std::path::Path;
use tessel_data::scene::SceneDefinition;
use tessel_infra::logging::init_logging;

const SCENE_PATH: &str = "assets/scenes/default.ron";

fn load_scene_definition(path: &Path) -> SceneDefinition {
    if !path.exists() {
        log::info!("No scene file at {}, using the built-in scene", path.display());
        return SceneDefinition::default();
    }
    match SceneDefinition::load(path) {
        Ok(definition) => {
            log::info!("Loaded scene definition from {}", path.display());
            definition
        }
        Err(err) => {
            log::error!("{err}; using the built-in scene");
            SceneDefinition::default()
        }
    }
}

fn main() -> Result<()> {
    init_logging("info");

    let definition = load_scene_definition(Path::new(SCENE_PATH));
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("tessel sandbox")
            .with_inner_size([1280.0, 720.0]),
        renderer: eframe::Renderer::Glow,
        // The deferred lane blits G-buffer depth into the window for the gizmos.
        depth_buffer: 24,
        ..Default::default()
    };

    eframe::run_native(
        "tessel sandbox",
        options,
        Box::new(move |cc| {
            let app = SandboxApp::new(cc, &definition)?;
            Ok(Box::new(app))
        }),
    )
    .map_err(|err| anyhow::anyhow!("eframe exited with an error: {err}"))
}
