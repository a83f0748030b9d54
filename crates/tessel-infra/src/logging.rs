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

//! Process-wide logger setup.

use env_logger::{Builder, Env};
use log::LevelFilter;
use std::sync::Once;

/// Crates whose info-level chatter drowns the renderer's own logs.
const NOISY_MODULES: &[&str] = &["eframe", "egui_glow", "egui_winit", "winit", "glutin"];

static INIT: Once = Once::new();

/// Installs `env_logger` as the global logger.
///
/// `RUST_LOG` wins when set; otherwise `default_filter` applies (e.g. `"info"`
/// or `"tessel_lanes=debug,info"`). Windowing and context crates are capped at
/// `warn` unless `RUST_LOG` names them. Subsequent calls are ignored.
pub fn init_logging(default_filter: &str) {
    INIT.call_once(|| {
        let env = Env::default().default_filter_or(default_filter);
        let mut builder = Builder::from_env(env);
        let explicit = std::env::var("RUST_LOG").unwrap_or_default();
        for module in NOISY_MODULES {
            if !explicit.contains(module) {
                builder.filter_module(module, LevelFilter::Warn);
            }
        }
        if let Err(err) = builder.try_init() {
            // Another logger (e.g. a test harness) got there first.
            eprintln!("tessel: logger already installed: {err}");
            return;
        }
        log::debug!("logging initialized");
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repeated_initialisation_is_harmless() {
        init_logging("debug");
        init_logging("trace");
        assert!(INIT.is_completed());
    }
}
