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

//! The cache of GPU resources keyed by content identity.

use super::program::{check_reflection, compile_variant, modified_time, read_source};
use super::{
    BuiltinTexture, Material, MaterialHandle, Mesh, MeshHandle, Model, ModelHandle, ProgramHandle,
    ProgramKey, ShaderProgram, Texture, TextureHandle,
};
use ahash::{AHashMap, AHashSet};
use std::path::{Path, PathBuf};
use tessel_core::asset::{ImageLoader, MaterialData, ModelLoader};
use tessel_core::math::{Extent2D, Vec3};
use tessel_core::renderer::{
    GraphicsDevice, ProgramId, ResourceError, ShaderError, TextureDescriptor, TextureFormat,
    TextureId, Topology, VertexArrayId, VertexInputLayout,
};

/// Owns every program, texture, mesh, material and model the renderer created.
///
/// Each resource is created on first request and returned from the cache on
/// every later request with the same key. Nothing is evicted; handles are
/// indices that stay valid until [`ResourceCache::destroy_all`].
#[derive(Debug)]
pub struct ResourceCache {
    programs: Vec<ShaderProgram>,
    program_index: AHashMap<ProgramKey, ProgramHandle>,
    textures: Vec<Texture>,
    texture_index: AHashMap<PathBuf, TextureHandle>,
    failed_textures: AHashSet<PathBuf>,
    meshes: Vec<Mesh>,
    materials: Vec<Material>,
    models: Vec<Model>,
    model_index: AHashMap<PathBuf, ModelHandle>,
    failed_models: AHashSet<PathBuf>,
    builtins: AHashMap<BuiltinTexture, TextureHandle>,
    default_material: MaterialHandle,
}

impl ResourceCache {
    /// Creates the cache and its built-in 1×1 textures.
    pub fn new(device: &mut dyn GraphicsDevice) -> Result<Self, ResourceError> {
        let mut cache = Self {
            programs: Vec::new(),
            program_index: AHashMap::new(),
            textures: Vec::new(),
            texture_index: AHashMap::new(),
            failed_textures: AHashSet::new(),
            meshes: Vec::new(),
            materials: Vec::new(),
            models: Vec::new(),
            model_index: AHashMap::new(),
            failed_models: AHashSet::new(),
            builtins: AHashMap::new(),
            default_material: MaterialHandle(0),
        };

        for builtin in BuiltinTexture::ALL {
            let size = Extent2D::new(1, 1);
            let id = device.create_texture(
                &TextureDescriptor::sampled_image(builtin.path(), size, TextureFormat::Rgba8),
                Some(&builtin.texel()),
            )?;
            let handle = cache.insert_texture(Texture {
                path: PathBuf::from(builtin.path()),
                id,
                channels: 4,
                size,
            });
            cache.builtins.insert(builtin, handle);
        }
        cache.default_material = cache.insert_material(Material::default());
        Ok(cache)
    }

    // --- Programs ---

    /// Returns the program for `(path, variant)`, compiling it on first request.
    ///
    /// A missing source file or a failed compile is logged and still yields a
    /// handle, so a broken shader shows up on screen instead of stopping the frame.
    ///
    /// # Arguments
    /// * `path` - The shader family file.
    /// * `variant` - The `#define` that selects the variant.
    /// * `layout` - The vertex inputs the variant consumes.
    ///
    /// # Errors
    /// Only if the device cannot allocate a program object.
    pub fn load_program(
        &mut self,
        device: &mut dyn GraphicsDevice,
        path: impl AsRef<Path>,
        variant: &str,
        layout: VertexInputLayout,
    ) -> Result<ProgramHandle, ResourceError> {
        let key = ProgramKey::new(path.as_ref(), variant);
        if let Some(&handle) = self.program_index.get(&key) {
            return Ok(handle);
        }

        let body = read_source(&key.path).unwrap_or_else(|err| {
            log::error!("{err}");
            String::new()
        });
        let last_modified = modified_time(&key.path);
        let compilation = compile_variant(device, &key, &body)?;
        check_reflection(&key.label(), &layout, &compilation.attributes);
        log::debug!("Created program {} as {:?}", key.label(), compilation.id);

        let handle = ProgramHandle(self.programs.len() as u32);
        self.programs.push(ShaderProgram {
            key: key.clone(),
            id: compilation.id,
            input_layout: layout,
            reflected: compilation.attributes.clone(),
            last_modified,
            compile_log: compilation.error_summary(),
        });
        self.program_index.insert(key, handle);
        Ok(handle)
    }

    /// Recompiles every program whose source file changed on disk since it
    /// was last compiled.
    ///
    /// A failed reload is logged and the previous program stays in use.
    ///
    /// Returns the retired program ids, so owners of meshes outside the cache
    /// can drop their bindings too.
    pub fn reload_changed_programs(&mut self, device: &mut dyn GraphicsDevice) -> Vec<ProgramId> {
        let mut retired = Vec::new();
        for index in 0..self.programs.len() {
            let program = &mut self.programs[index];
            let current = modified_time(&program.key.path);
            let changed = match (current, program.last_modified) {
                (Some(now), Some(before)) => now > before,
                (Some(_), None) => true,
                _ => false,
            };
            if !changed {
                continue;
            }
            program.last_modified = current;
            let label = program.key.label();

            match self.reload_program(device, ProgramHandle(index as u32)) {
                Ok(old_id) => {
                    log::info!("Reloaded {label}");
                    retired.push(old_id);
                }
                Err(err) => {
                    log::error!("Hot reload of {label} failed, keeping the previous program: {err}")
                }
            }
        }
        retired
    }

    /// Recompiles one program from its source file under the same handle.
    ///
    /// On success the old GPU program is destroyed, every cached vertex binding
    /// to it is dropped, and its id is returned.
    ///
    /// # Errors
    /// [`ResourceError::Shader`] if the source cannot be read or the new program
    /// fails to compile or link. The previous program is left untouched.
    pub fn reload_program(
        &mut self,
        device: &mut dyn GraphicsDevice,
        handle: ProgramHandle,
    ) -> Result<ProgramId, ResourceError> {
        let key = self
            .programs
            .get(handle.index())
            .map(|p| p.key.clone())
            .ok_or(ResourceError::InvalidHandle)?;

        let body = read_source(&key.path)?;
        let compilation = compile_variant(device, &key, &body)?;
        if !compilation.succeeded() {
            let _ = device.destroy_program(compilation.id);
            let error = match (&compilation.vertex_log, &compilation.fragment_log) {
                (None, None) => ShaderError::LinkError {
                    label: key.label(),
                    details: compilation.link_log.clone().unwrap_or_default(),
                },
                _ => ShaderError::CompilationError {
                    label: key.label(),
                    details: compilation.error_summary().unwrap_or_default(),
                },
            };
            return Err(error.into());
        }

        let program = &mut self.programs[handle.index()];
        check_reflection(&key.label(), &program.input_layout, &compilation.attributes);
        let old_id = program.id;
        program.id = compilation.id;
        program.reflected = compilation.attributes;
        program.compile_log = None;
        if let Err(err) = device.destroy_program(old_id) {
            log::warn!("Failed to destroy {old_id:?}: {err}");
        }
        for mesh in &mut self.meshes {
            mesh.forget_program(device, old_id);
        }
        Ok(old_id)
    }

    /// The program behind `handle`.
    pub fn program(&self, handle: ProgramHandle) -> Option<&ShaderProgram> {
        self.programs.get(handle.index())
    }

    /// Every cached program.
    pub fn programs(&self) -> &[ShaderProgram] {
        &self.programs
    }

    // --- Textures ---

    /// Returns the texture for `path`, decoding and uploading it on first request.
    ///
    /// Returns [`TextureHandle::INVALID`] when the image cannot be loaded or has
    /// a channel count other than 3 or 4. Failures are remembered, so the
    /// loader is asked at most once per path.
    pub fn load_texture(
        &mut self,
        device: &mut dyn GraphicsDevice,
        loader: &dyn ImageLoader,
        path: impl AsRef<Path>,
    ) -> TextureHandle {
        let path = path.as_ref();
        if let Some(&handle) = self.texture_index.get(path) {
            return handle;
        }
        if self.failed_textures.contains(path) {
            log::warn!("Texture '{}' failed to load earlier", path.display());
            return TextureHandle::INVALID;
        }

        let handle = self.upload_texture(device, loader, path);
        if !handle.is_valid() {
            self.failed_textures.insert(path.to_path_buf());
        }
        handle
    }

    fn upload_texture(
        &mut self,
        device: &mut dyn GraphicsDevice,
        loader: &dyn ImageLoader,
        path: &Path,
    ) -> TextureHandle {
        let image = match loader.load(path) {
            Ok(image) => image,
            Err(err) => {
                log::error!("Failed to load texture '{}': {err}", path.display());
                return TextureHandle::INVALID;
            }
        };
        let Some(format) = TextureFormat::from_channel_count(image.channels) else {
            log::error!(
                "Unsupported number of channels ({}) in '{}'",
                image.channels,
                path.display()
            );
            return TextureHandle::INVALID;
        };

        let label = path.display().to_string();
        let descriptor = TextureDescriptor::sampled_image(label.as_str(), image.size, format);
        match device.create_texture(&descriptor, Some(&image.pixels)) {
            Ok(id) => {
                log::debug!(
                    "Uploaded texture '{label}' ({}x{})",
                    image.size.width,
                    image.size.height
                );
                self.insert_texture(Texture {
                    path: path.to_path_buf(),
                    id,
                    channels: image.channels,
                    size: image.size,
                })
            }
            Err(err) => {
                log::error!("Failed to create texture '{label}': {err}");
                TextureHandle::INVALID
            }
        }
    }

    fn insert_texture(&mut self, texture: Texture) -> TextureHandle {
        let handle = TextureHandle(self.textures.len() as u32);
        self.texture_index.insert(texture.path.clone(), handle);
        self.textures.push(texture);
        handle
    }

    /// The texture behind `handle`. `None` for [`TextureHandle::INVALID`].
    pub fn texture(&self, handle: TextureHandle) -> Option<&Texture> {
        self.textures.get(handle.index())
    }

    /// Every cached texture, built-ins first.
    pub fn textures(&self) -> &[Texture] {
        &self.textures
    }

    /// The handle of a built-in texture.
    pub fn builtin(&self, builtin: BuiltinTexture) -> TextureHandle {
        self.builtins
            .get(&builtin)
            .copied()
            .unwrap_or(TextureHandle::INVALID)
    }

    /// The GPU texture for `handle`, or for `fallback` when the slot is empty.
    pub fn resolve_texture(
        &self,
        handle: TextureHandle,
        fallback: BuiltinTexture,
    ) -> Option<TextureId> {
        self.texture(handle)
            .or_else(|| self.texture(self.builtin(fallback)))
            .map(|t| t.id)
    }

    // --- Meshes, materials and models ---

    /// Takes ownership of an uploaded mesh.
    pub fn insert_mesh(&mut self, mesh: Mesh) -> MeshHandle {
        let handle = MeshHandle(self.meshes.len() as u32);
        self.meshes.push(mesh);
        handle
    }

    /// The mesh behind `handle`.
    pub fn mesh(&self, handle: MeshHandle) -> Option<&Mesh> {
        self.meshes.get(handle.index())
    }

    /// Returns the vertex binding of one submesh for one program, creating it
    /// on first use.
    pub fn submesh_binding(
        &mut self,
        device: &mut dyn GraphicsDevice,
        mesh: MeshHandle,
        submesh: usize,
        program: ProgramHandle,
    ) -> Result<VertexArrayId, ResourceError> {
        let program = self
            .programs
            .get(program.index())
            .ok_or(ResourceError::InvalidHandle)?;
        let mesh = self
            .meshes
            .get_mut(mesh.index())
            .ok_or(ResourceError::InvalidHandle)?;
        mesh.binding_for(device, submesh, program)
    }

    /// Stores a material.
    pub fn insert_material(&mut self, material: Material) -> MaterialHandle {
        let handle = MaterialHandle(self.materials.len() as u32);
        self.materials.push(material);
        handle
    }

    /// The material behind `handle`.
    pub fn material(&self, handle: MaterialHandle) -> Option<&Material> {
        self.materials.get(handle.index())
    }

    /// The material given to submeshes that reference none.
    pub fn default_material(&self) -> MaterialHandle {
        self.default_material
    }

    /// Returns the model at `path`, parsing and uploading it on first request.
    ///
    /// Material textures are loaded through [`Self::load_texture`], so maps
    /// shared between models are decoded once. Returns [`ModelHandle::INVALID`]
    /// if the file cannot be parsed or has no geometry.
    pub fn load_model(
        &mut self,
        device: &mut dyn GraphicsDevice,
        models: &dyn ModelLoader,
        images: &dyn ImageLoader,
        path: impl AsRef<Path>,
    ) -> ModelHandle {
        let path = path.as_ref();
        if let Some(&handle) = self.model_index.get(path) {
            return handle;
        }
        if self.failed_models.contains(path) {
            return ModelHandle::INVALID;
        }

        let data = match models.load(path) {
            Ok(data) => data,
            Err(err) => {
                log::error!("Failed to load model '{}': {err}", path.display());
                self.failed_models.insert(path.to_path_buf());
                return ModelHandle::INVALID;
            }
        };
        let mesh = match Mesh::upload(
            device,
            &path.display().to_string(),
            &data.submeshes,
            Topology::Triangles,
        ) {
            Ok(mesh) => mesh,
            Err(err) => {
                log::error!("Failed to upload model '{}': {err}", path.display());
                self.failed_models.insert(path.to_path_buf());
                return ModelHandle::INVALID;
            }
        };

        let material_handles: Vec<MaterialHandle> = data
            .materials
            .iter()
            .map(|m| {
                let material = self.create_material(device, images, m);
                self.insert_material(material)
            })
            .collect();
        let materials = data
            .submeshes
            .iter()
            .map(|s| {
                s.material
                    .and_then(|i| material_handles.get(i).copied())
                    .unwrap_or(self.default_material)
            })
            .collect();

        let mesh = self.insert_mesh(mesh);
        let handle = ModelHandle(self.models.len() as u32);
        self.models.push(Model {
            path: path.to_path_buf(),
            mesh,
            materials,
        });
        self.model_index.insert(path.to_path_buf(), handle);
        log::info!(
            "Loaded model '{}' ({} submeshes, {} materials)",
            path.display(),
            data.submeshes.len(),
            data.materials.len()
        );
        handle
    }

    fn create_material(
        &mut self,
        device: &mut dyn GraphicsDevice,
        images: &dyn ImageLoader,
        data: &MaterialData,
    ) -> Material {
        let mut slot = |path: &Option<PathBuf>| match path {
            Some(path) => self.load_texture(device, images, path),
            None => TextureHandle::INVALID,
        };
        Material {
            name: data.name.clone(),
            albedo: Vec3::from(data.albedo),
            emissive: Vec3::from(data.emissive),
            smoothness: data.smoothness,
            albedo_texture: slot(&data.albedo_texture),
            emissive_texture: slot(&data.emissive_texture),
            normal_texture: slot(&data.normal_texture),
            bump_texture: slot(&data.bump_texture),
        }
    }

    /// The model behind `handle`.
    pub fn model(&self, handle: ModelHandle) -> Option<&Model> {
        self.models.get(handle.index())
    }

    /// Releases every GPU object the cache owns. Handles are invalid afterwards.
    pub fn destroy_all(&mut self, device: &mut dyn GraphicsDevice) {
        for program in self.programs.drain(..) {
            let _ = device.destroy_program(program.id);
        }
        for texture in self.textures.drain(..) {
            let _ = device.destroy_texture(texture.id);
        }
        for mut mesh in self.meshes.drain(..) {
            mesh.destroy(device);
        }
        self.program_index.clear();
        self.texture_index.clear();
        self.failed_textures.clear();
        self.materials.clear();
        self.models.clear();
        self.model_index.clear();
        self.failed_models.clear();
        self.builtins.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::io::Write;
    use std::time::{Duration, SystemTime};
    use tessel_core::asset::{Image, LoadError, ModelData, SubmeshData};
    use tessel_core::renderer::testing::RecordingDevice;
    use tessel_core::renderer::{bindings, VertexBufferLayout};

    /// Produces a 2×2 image with a fixed channel count and counts decodes.
    struct CountingLoader {
        channels: u8,
        decodes: Cell<usize>,
    }

    impl CountingLoader {
        fn new(channels: u8) -> Self {
            Self {
                channels,
                decodes: Cell::new(0),
            }
        }
    }

    impl ImageLoader for CountingLoader {
        fn load(&self, path: &Path) -> Result<Image, LoadError> {
            self.decodes.set(self.decodes.get() + 1);
            if path.to_string_lossy().contains("missing") {
                return Err("no such file".into());
            }
            Ok(Image {
                pixels: vec![200; 4 * self.channels as usize],
                size: Extent2D::new(2, 2),
                channels: self.channels,
            })
        }
    }

    struct OneQuadModel;

    impl ModelLoader for OneQuadModel {
        fn load(&self, path: &Path) -> Result<ModelData, LoadError> {
            let dir = path.parent().unwrap_or(Path::new(""));
            let layout = VertexBufferLayout::packed(&[(0, 3), (1, 3), (2, 2)]);
            let submesh = |material| SubmeshData {
                name: "quad".into(),
                vertices: vec![0.0; layout.floats_per_vertex() * 4],
                layout: layout.clone(),
                indices: vec![0, 1, 2, 2, 3, 0],
                material,
            };
            Ok(ModelData {
                submeshes: vec![submesh(Some(0)), submesh(None)],
                materials: vec![MaterialData {
                    name: "painted".into(),
                    albedo_texture: Some(dir.join("albedo.png")),
                    bump_texture: Some(dir.join("missing.png")),
                    ..MaterialData::default()
                }],
            })
        }
    }

    #[test]
    fn builtins_are_created_up_front() {
        let mut device = RecordingDevice::new();
        let cache = ResourceCache::new(&mut device).unwrap();

        assert_eq!(device.texture_count(), 3);
        let flat = cache.texture(cache.builtin(BuiltinTexture::FlatNormal)).unwrap();
        assert_eq!(
            device.texture(flat.id).and_then(|t| t.pixels.clone()),
            Some(vec![128, 128, 255, 255])
        );
        assert_eq!(
            cache.resolve_texture(TextureHandle::INVALID, BuiltinTexture::White),
            cache.texture(cache.builtin(BuiltinTexture::White)).map(|t| t.id)
        );
    }

    #[test]
    fn texture_is_decoded_once_per_path() {
        let mut device = RecordingDevice::new();
        let mut cache = ResourceCache::new(&mut device).unwrap();
        let loader = CountingLoader::new(4);

        let first = cache.load_texture(&mut device, &loader, "assets/textures/dice.png");
        let second = cache.load_texture(&mut device, &loader, "assets/textures/dice.png");
        let other = cache.load_texture(&mut device, &loader, "assets/textures/wood.png");

        assert!(first.is_valid());
        assert_eq!(first, second);
        assert_ne!(first, other);
        assert_eq!(loader.decodes.get(), 2);
        assert_eq!(device.texture_count(), 3 + 2);

        let record = device.texture(cache.texture(first).unwrap().id).unwrap();
        assert!(record.mipmapped);
        assert_eq!(record.format, TextureFormat::Rgba8);
        assert!(device.take_errors().is_empty());
    }

    #[test]
    fn failed_load_returns_invalid_and_is_not_retried() {
        let mut device = RecordingDevice::new();
        let mut cache = ResourceCache::new(&mut device).unwrap();
        let loader = CountingLoader::new(3);

        let first = cache.load_texture(&mut device, &loader, "missing.png");
        let second = cache.load_texture(&mut device, &loader, "missing.png");

        assert_eq!(first, TextureHandle::INVALID);
        assert_eq!(second, TextureHandle::INVALID);
        assert!(cache.texture(first).is_none());
        assert_eq!(loader.decodes.get(), 1);
    }

    #[test]
    fn unsupported_channel_count_creates_nothing() {
        let mut device = RecordingDevice::new();
        let mut cache = ResourceCache::new(&mut device).unwrap();
        let loader = CountingLoader::new(2);

        let handle = cache.load_texture(&mut device, &loader, "gray_alpha.png");

        assert!(!handle.is_valid());
        assert_eq!(device.texture_count(), 3);
    }

    #[test]
    fn program_is_compiled_once_per_variant() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("shaders.glsl");
        std::fs::write(&path, "void main() {}\n").unwrap();
        let mut device = RecordingDevice::new();
        let mut cache = ResourceCache::new(&mut device).unwrap();
        let layout = VertexInputLayout::new(&[(0, 3)]);

        let a = cache.load_program(&mut device, &path, "DRAW_LIGHT", layout.clone()).unwrap();
        let b = cache.load_program(&mut device, &path, "DRAW_LIGHT", layout.clone()).unwrap();
        let c = cache.load_program(&mut device, &path, "SHOW_LIGHT", layout).unwrap();

        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(device.program_count(), 2);
        let id = cache.program(a).unwrap().id;
        assert_eq!(device.program_label(id), Some("shaders.glsl[DRAW_LIGHT]"));
        assert_eq!(
            device.block_binding(id, bindings::LOCAL_PARAMS_BLOCK),
            Some(bindings::LOCAL_PARAMS)
        );
    }

    #[test]
    fn failed_compile_still_yields_a_handle() {
        let mut device = RecordingDevice::new();
        device.fail_programs_containing("SHOW_GEOMETRY");
        let mut cache = ResourceCache::new(&mut device).unwrap();

        let handle = cache
            .load_program(
                &mut device,
                "does/not/exist.glsl",
                "SHOW_GEOMETRY",
                VertexInputLayout::default(),
            )
            .unwrap();

        let program = cache.program(handle).unwrap();
        assert!(!program.is_healthy());
        assert!(program.compile_log.as_deref().is_some_and(|l| l.contains("fragment")));
    }

    #[test]
    fn hot_reload_swaps_the_program_and_drops_its_bindings() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("shaders.glsl");
        std::fs::write(&path, "// v1\n").unwrap();
        let mut device = RecordingDevice::new();
        let mut cache = ResourceCache::new(&mut device).unwrap();
        let program = cache
            .load_program(
                &mut device,
                &path,
                "SHOW_TEXTURED_MESH",
                VertexInputLayout::new(&[(0, 3), (1, 3), (2, 2)]),
            )
            .unwrap();
        let images = CountingLoader::new(4);
        let model_path = dir.path().join("quad.obj");
        let model = cache.load_model(&mut device, &OneQuadModel, &images, model_path);
        let mesh = cache.model(model).unwrap().mesh;
        cache.submesh_binding(&mut device, mesh, 0, program).unwrap();
        let old_id = cache.program(program).unwrap().id;

        assert!(cache.reload_changed_programs(&mut device).is_empty());

        let mut file = std::fs::OpenOptions::new().append(true).open(&path).unwrap();
        file.write_all(b"// v2\n").unwrap();
        file.set_modified(SystemTime::now() + Duration::from_secs(5)).unwrap();
        drop(file);

        let retired = cache.reload_changed_programs(&mut device);

        assert_eq!(retired, vec![old_id]);
        assert_ne!(cache.program(program).unwrap().id, old_id);
        assert!(cache.mesh(mesh).unwrap().submeshes[0].bindings().is_empty());
        assert_eq!(device.program_count(), 1);
    }

    #[test]
    fn reload_of_a_missing_source_reports_a_shader_load_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("shaders.glsl");
        std::fs::write(&path, "// v1\n").unwrap();
        let mut device = RecordingDevice::new();
        let mut cache = ResourceCache::new(&mut device).unwrap();
        let handle = cache
            .load_program(&mut device, &path, "DRAW_LIGHT", VertexInputLayout::new(&[(0, 3)]))
            .unwrap();
        let old_id = cache.program(handle).unwrap().id;
        std::fs::remove_file(&path).unwrap();

        let err = cache.reload_program(&mut device, handle).unwrap_err();

        assert!(matches!(err, ResourceError::Shader(ShaderError::LoadError { .. })));
        assert!(std::error::Error::source(&err).is_some());
        assert_eq!(cache.program(handle).unwrap().id, old_id);
        assert_eq!(device.program_count(), 1);
    }

    #[test]
    fn failed_reload_keeps_the_previous_program() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("shaders.glsl");
        std::fs::write(&path, "// v1\n").unwrap();
        let mut device = RecordingDevice::new();
        let mut cache = ResourceCache::new(&mut device).unwrap();
        let handle = cache
            .load_program(
                &mut device,
                &path,
                "SHOW_LIGHT",
                VertexInputLayout::new(&[(0, 3), (1, 2)]),
            )
            .unwrap();
        let old_id = cache.program(handle).unwrap().id;
        device.fail_programs_containing("SHOW_LIGHT");

        let err = cache.reload_program(&mut device, handle).unwrap_err();

        match err {
            ResourceError::Shader(ShaderError::CompilationError { label, details }) => {
                assert_eq!(label, "shaders.glsl[SHOW_LIGHT]");
                assert!(details.contains("fragment"));
            }
            other => panic!("unexpected error: {other}"),
        }
        let program = cache.program(handle).unwrap();
        assert_eq!(program.id, old_id);
        assert!(program.is_healthy());
        assert_eq!(device.program_count(), 1);
        assert!(matches!(
            cache.reload_program(&mut device, ProgramHandle(99)),
            Err(ResourceError::InvalidHandle)
        ));
    }

    #[test]
    fn model_loads_materials_through_the_texture_cache() {
        let dir = tempfile::tempdir().unwrap();
        let mut device = RecordingDevice::new();
        let mut cache = ResourceCache::new(&mut device).unwrap();
        let images = CountingLoader::new(3);
        let path = dir.path().join("plane.obj");

        let handle = cache.load_model(&mut device, &OneQuadModel, &images, &path);
        let again = cache.load_model(&mut device, &OneQuadModel, &images, &path);

        assert_eq!(handle, again);
        let model = cache.model(handle).unwrap();
        assert_eq!(model.materials.len(), 2);
        assert_eq!(model.materials[1], cache.default_material());

        let painted = cache.material(model.materials[0]).unwrap();
        assert!(painted.albedo_texture.is_valid());
        assert!(!painted.bump_texture.is_valid());
        assert!(!painted.normal_texture.is_valid());
        assert_eq!(images.decodes.get(), 2);
        assert_eq!(cache.mesh(model.mesh).unwrap().submeshes.len(), 2);
    }

    #[test]
    fn destroy_all_releases_gpu_objects() {
        let mut device = RecordingDevice::new();
        let mut cache = ResourceCache::new(&mut device).unwrap();
        cache.load_texture(&mut device, &CountingLoader::new(4), "a.png");

        cache.destroy_all(&mut device);

        assert_eq!(device.texture_count(), 0);
        assert!(cache.textures().is_empty());
    }
}
