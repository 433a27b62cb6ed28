//! Headless backend that records every call it receives
//!
//! Resources live in slot maps so handles behave like real GPU handles:
//! stale or foreign handles are rejected instead of aliasing. State and draw
//! calls are appended to a command log that tests and the headless demo can
//! inspect after a frame.
//!
//! Uniform resolution mimics a linked scene/post-process program pair. A
//! program loaded from a registered post-process source resolves the
//! post-process samplers to their texture units; any other program resolves
//! the `light_source[i]` array for `i` below the configured capacity.
//! Everything else is reported as absent, like an uniform optimized out by
//! the shader compiler.

use std::collections::{BTreeMap, HashMap};

use log::{debug, trace, warn};
use slotmap::SlotMap;

use crate::assets::ImageData;
use crate::core::config::{ShaderConfig, ShaderSource};
use crate::render::api::{
    uniforms, ClearFlags, MeshHandle, ProgramHandle, RenderBackend, RenderTargetDesc,
    RenderTargetHandle, TargetStatus, TextureDesc, TextureFilter, TextureFormat, TextureHandle,
    TextureWrap, UniformLocation, UniformValue,
};
use crate::render::primitives::{Mesh, ScreenVertex};
use crate::render::{RenderError, RenderResult};

/// First location of the `light_source` uniform array
const LIGHT_ARRAY_BASE: i32 = 16;

/// Default number of simultaneous color outputs a target may declare
const DEFAULT_MAX_COLOR_ATTACHMENTS: usize = 8;

/// One recorded backend call on the per-frame path
#[derive(Debug, Clone, PartialEq)]
pub enum RenderCommand {
    /// `set_viewport`
    Viewport { width: u32, height: u32 },
    /// `bind_render_target`
    BindTarget(Option<RenderTargetHandle>),
    /// `clear`
    Clear { flags: ClearFlags, color: [f32; 4] },
    /// `set_depth_test`
    DepthTest(bool),
    /// `use_program`
    UseProgram(ProgramHandle),
    /// `set_uniform` against the program current at the time
    SetUniform {
        program: Option<ProgramHandle>,
        location: UniformLocation,
        value: UniformValue,
    },
    /// `bind_texture`
    BindTexture { unit: u32, texture: TextureHandle },
    /// `draw_indexed`
    DrawIndexed { mesh: MeshHandle, index_count: u32 },
    /// `draw_arrays`
    DrawArrays { mesh: MeshHandle, vertex_count: u32 },
}

/// Snapshot of the pipeline state at the moment of a draw
#[derive(Debug, Clone, PartialEq)]
pub struct DrawCall {
    /// Mesh drawn
    pub mesh: MeshHandle,
    /// Indices (indexed draws) or vertices (array draws) submitted
    pub count: u32,
    /// Whether the draw used the index buffer
    pub indexed: bool,
    /// Render target bound, `None` for the default target
    pub target: Option<RenderTargetHandle>,
    /// Program current at the time
    pub program: Option<ProgramHandle>,
    /// Whether depth testing was enabled
    pub depth_test: bool,
    /// Uniform values of the current program
    pub uniforms: BTreeMap<UniformLocation, UniformValue>,
    /// Textures bound per unit
    pub textures: BTreeMap<u32, TextureHandle>,
}

impl DrawCall {
    /// Value of a uniform when the draw was issued
    pub fn uniform(&self, location: UniformLocation) -> Option<UniformValue> {
        self.uniforms.get(&location).copied()
    }
}

/// Uniform interface a loaded program exposes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgramRole {
    /// Lit scene program with the `light_source` array
    Scene,
    /// Full-screen program sampling the scene pass outputs
    PostProcess,
}

#[derive(Debug, Clone)]
struct ProgramRecord {
    source: ShaderSource,
    role: ProgramRole,
}

#[derive(Debug, Clone, Copy)]
struct MeshRecord {
    vertex_count: u32,
    index_count: u32,
}

/// Backend that stores resources in memory and records draws
#[derive(Debug)]
pub struct RecordingBackend {
    meshes: SlotMap<MeshHandle, MeshRecord>,
    textures: SlotMap<TextureHandle, TextureDesc>,
    targets: SlotMap<RenderTargetHandle, RenderTargetDesc>,
    programs: SlotMap<ProgramHandle, ProgramRecord>,
    post_process_sources: Vec<ShaderSource>,
    program_uniforms: HashMap<ProgramHandle, BTreeMap<UniformLocation, UniformValue>>,

    current_program: Option<ProgramHandle>,
    current_target: Option<RenderTargetHandle>,
    bound_textures: BTreeMap<u32, TextureHandle>,
    depth_test: bool,
    viewport: (u32, u32),

    light_capacity: u32,
    max_color_attachments: usize,

    commands: Vec<RenderCommand>,
    draws: Vec<DrawCall>,
}

impl Default for RecordingBackend {
    fn default() -> Self {
        Self {
            meshes: SlotMap::with_key(),
            textures: SlotMap::with_key(),
            targets: SlotMap::with_key(),
            programs: SlotMap::with_key(),
            post_process_sources: vec![ShaderConfig::default().post_process],
            program_uniforms: HashMap::new(),
            current_program: None,
            current_target: None,
            bound_textures: BTreeMap::new(),
            depth_test: false,
            viewport: (0, 0),
            light_capacity: 8,
            max_color_attachments: DEFAULT_MAX_COLOR_ATTACHMENTS,
            commands: Vec::new(),
            draws: Vec::new(),
        }
    }
}

impl RecordingBackend {
    /// Create a backend with an 8-entry light array
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the size of the `light_source` array programs expose
    pub fn with_light_capacity(mut self, capacity: u32) -> Self {
        self.light_capacity = capacity;
        self
    }

    /// Treat programs loaded from `source` as post-process programs
    ///
    /// The default post-process shader pair is always registered.
    pub fn with_post_process_program(mut self, source: ShaderSource) -> Self {
        self.post_process_sources.push(source);
        self
    }

    /// Limit the number of color outputs a complete target may declare
    pub fn with_max_color_attachments(mut self, max: usize) -> Self {
        self.max_color_attachments = max;
        self
    }

    /// Every per-frame call recorded since the last [`clear_log`](Self::clear_log)
    pub fn commands(&self) -> &[RenderCommand] {
        &self.commands
    }

    /// Every draw recorded since the last [`clear_log`](Self::clear_log)
    pub fn draw_calls(&self) -> &[DrawCall] {
        &self.draws
    }

    /// Forget recorded commands and draws, keeping resources and state
    pub fn clear_log(&mut self) {
        self.commands.clear();
        self.draws.clear();
    }

    /// Last value set for a uniform of a program
    pub fn uniform(&self, program: ProgramHandle, location: UniformLocation) -> Option<UniformValue> {
        self.program_uniforms
            .get(&program)
            .and_then(|values| values.get(&location))
            .copied()
    }

    /// Description of a texture
    pub fn texture_desc(&self, texture: TextureHandle) -> Option<&TextureDesc> {
        self.textures.get(texture)
    }

    /// Description of a render target
    pub fn render_target_desc(&self, target: RenderTargetHandle) -> Option<&RenderTargetDesc> {
        self.targets.get(target)
    }

    /// Sources a program was loaded from
    pub fn program_source(&self, program: ProgramHandle) -> Option<&ShaderSource> {
        self.programs.get(program).map(|record| &record.source)
    }

    /// Uniform interface of a program
    pub fn program_role(&self, program: ProgramHandle) -> Option<ProgramRole> {
        self.programs.get(program).map(|record| record.role)
    }

    /// Vertex count of a registered mesh
    pub fn mesh_vertex_count(&self, mesh: MeshHandle) -> Option<u32> {
        self.meshes.get(mesh).map(|record| record.vertex_count)
    }

    /// Index count of a registered mesh (zero for non-indexed meshes)
    pub fn mesh_index_count(&self, mesh: MeshHandle) -> Option<u32> {
        self.meshes.get(mesh).map(|record| record.index_count)
    }

    /// Number of registered meshes
    pub fn mesh_count(&self) -> usize {
        self.meshes.len()
    }

    /// Number of allocated textures
    pub fn texture_count(&self) -> usize {
        self.textures.len()
    }

    /// Current viewport size
    pub fn viewport(&self) -> (u32, u32) {
        self.viewport
    }

    /// Program made current last
    pub fn current_program(&self) -> Option<ProgramHandle> {
        self.current_program
    }

    fn record_draw(&mut self, mesh: MeshHandle, count: u32, indexed: bool) {
        let uniforms = self
            .current_program
            .and_then(|program| self.program_uniforms.get(&program))
            .cloned()
            .unwrap_or_default();

        self.draws.push(DrawCall {
            mesh,
            count,
            indexed,
            target: self.current_target,
            program: self.current_program,
            depth_test: self.depth_test,
            uniforms,
            textures: self.bound_textures.clone(),
        });
    }

    fn resolve_light_uniform(&self, name: &str) -> Option<UniformLocation> {
        let rest = name.strip_prefix("light_source[")?;
        let (index, field) = rest.split_once(']')?;
        let index: u32 = index.parse().ok()?;
        if index >= self.light_capacity {
            return None;
        }

        let slot = LIGHT_ARRAY_BASE + 2 * i32::try_from(index).ok()?;
        match field {
            ".position" => Some(UniformLocation(slot)),
            ".color" => Some(UniformLocation(slot + 1)),
            _ => None,
        }
    }

    fn check_target(&self, desc: &RenderTargetDesc) -> TargetStatus {
        if desc.color_attachments.is_empty() {
            return TargetStatus::Incomplete("no color attachments".to_string());
        }

        if desc.color_attachments.len() > self.max_color_attachments {
            return TargetStatus::Incomplete(format!(
                "{} color attachments exceed the limit of {}",
                desc.color_attachments.len(),
                self.max_color_attachments
            ));
        }

        let mut size = None;
        for (i, handle) in desc.color_attachments.iter().enumerate() {
            let Some(texture) = self.textures.get(*handle) else {
                return TargetStatus::Incomplete(format!("color attachment {i} is not a texture"));
            };

            let dimensions = (texture.width, texture.height);
            match size {
                None => size = Some(dimensions),
                Some(expected) if expected != dimensions => {
                    return TargetStatus::Incomplete(format!(
                        "color attachment {i} is {}x{}, expected {}x{}",
                        dimensions.0, dimensions.1, expected.0, expected.1
                    ));
                }
                Some(_) => {}
            }
        }

        if let (Some(depth), Some((width, height))) = (desc.depth_stencil, size) {
            if (depth.width, depth.height) != (width, height) {
                return TargetStatus::Incomplete(format!(
                    "depth-stencil is {}x{}, color attachments are {width}x{height}",
                    depth.width, depth.height
                ));
            }
        }

        TargetStatus::Complete
    }
}

impl RenderBackend for RecordingBackend {
    fn register_mesh(&mut self, mesh: &Mesh) -> RenderResult<MeshHandle> {
        mesh.validate()?;
        let record = MeshRecord {
            vertex_count: u32::try_from(mesh.vertex_count())
                .map_err(|_| RenderError::ResourceCreationFailed("too many vertices".to_string()))?,
            index_count: u32::try_from(mesh.index_count())
                .map_err(|_| RenderError::ResourceCreationFailed("too many indices".to_string()))?,
        };
        let handle = self.meshes.insert(record);
        debug!(
            "Registered mesh {:?}: {} vertices, {} indices",
            handle, record.vertex_count, record.index_count
        );
        Ok(handle)
    }

    fn register_screen_quad(&mut self, vertices: &[ScreenVertex]) -> RenderResult<MeshHandle> {
        if vertices.is_empty() || vertices.len() % 3 != 0 {
            return Err(RenderError::ResourceCreationFailed(format!(
                "screen quad needs whole triangles, got {} vertices",
                vertices.len()
            )));
        }

        let vertex_count = u32::try_from(vertices.len())
            .map_err(|_| RenderError::ResourceCreationFailed("too many vertices".to_string()))?;
        let handle = self.meshes.insert(MeshRecord { vertex_count, index_count: 0 });
        debug!("Registered screen quad {:?}: {} vertices", handle, vertex_count);
        Ok(handle)
    }

    fn upload_texture(&mut self, image: &ImageData) -> RenderResult<TextureHandle> {
        image
            .validate()
            .map_err(|e| RenderError::ResourceCreationFailed(format!("texture upload: {e}")))?;

        let format = if image.channels == 3 { TextureFormat::Rgb8 } else { TextureFormat::Rgba8 };
        let handle = self.textures.insert(TextureDesc {
            width: image.width,
            height: image.height,
            format,
            filter: TextureFilter::Linear,
            wrap: TextureWrap::Repeat,
        });
        debug!("Uploaded texture {:?}: {}x{} {:?}", handle, image.width, image.height, format);
        Ok(handle)
    }

    fn create_texture(&mut self, desc: &TextureDesc) -> RenderResult<TextureHandle> {
        if desc.width == 0 || desc.height == 0 {
            return Err(RenderError::ResourceCreationFailed(format!(
                "texture has zero size {}x{}",
                desc.width, desc.height
            )));
        }

        let handle = self.textures.insert(*desc);
        debug!("Created texture {:?}: {:?}", handle, desc);
        Ok(handle)
    }

    fn create_render_target(&mut self, desc: &RenderTargetDesc) -> RenderResult<RenderTargetHandle> {
        let handle = self.targets.insert(desc.clone());
        debug!(
            "Created render target {:?} with {} color attachments",
            handle,
            desc.color_attachments.len()
        );
        Ok(handle)
    }

    fn render_target_status(&self, target: RenderTargetHandle) -> TargetStatus {
        match self.targets.get(target) {
            Some(desc) => self.check_target(desc),
            None => TargetStatus::Incomplete("unknown render target".to_string()),
        }
    }

    fn load_program(&mut self, source: &ShaderSource) -> RenderResult<ProgramHandle> {
        if source.vertex.is_empty() || source.fragment.is_empty() {
            return Err(RenderError::ResourceCreationFailed(format!(
                "program needs both stages, got vertex={:?} fragment={:?}",
                source.vertex, source.fragment
            )));
        }

        let role = if self.post_process_sources.contains(source) {
            ProgramRole::PostProcess
        } else {
            ProgramRole::Scene
        };
        let handle = self.programs.insert(ProgramRecord { source: source.clone(), role });
        self.program_uniforms.insert(handle, BTreeMap::new());
        debug!(
            "Loaded {:?} program {:?} from {} + {}",
            role, handle, source.vertex, source.fragment
        );
        Ok(handle)
    }

    fn use_program(&mut self, program: ProgramHandle) {
        if !self.programs.contains_key(program) {
            warn!("Ignoring use of unknown program {:?}", program);
            return;
        }
        self.current_program = Some(program);
        self.commands.push(RenderCommand::UseProgram(program));
    }

    fn uniform_location(&self, program: ProgramHandle, name: &str) -> Option<UniformLocation> {
        match self.programs.get(program)?.role {
            ProgramRole::PostProcess => uniforms::POST_PROCESS_SAMPLERS
                .iter()
                .find(|(sampler, _)| *sampler == name)
                .and_then(|(_, unit)| i32::try_from(*unit).ok().map(UniformLocation)),
            ProgramRole::Scene => self.resolve_light_uniform(name),
        }
    }

    fn set_uniform(&mut self, location: UniformLocation, value: UniformValue) {
        self.commands.push(RenderCommand::SetUniform {
            program: self.current_program,
            location,
            value,
        });

        match self.current_program {
            Some(program) => {
                self.program_uniforms.entry(program).or_default().insert(location, value);
            }
            None => trace!("Uniform {:?} set with no current program", location),
        }
    }

    fn set_viewport(&mut self, width: u32, height: u32) {
        self.viewport = (width, height);
        self.commands.push(RenderCommand::Viewport { width, height });
    }

    fn bind_render_target(&mut self, target: Option<RenderTargetHandle>) {
        self.current_target = target;
        self.commands.push(RenderCommand::BindTarget(target));
    }

    fn clear(&mut self, flags: ClearFlags, color: [f32; 4]) {
        self.commands.push(RenderCommand::Clear { flags, color });
    }

    fn set_depth_test(&mut self, enabled: bool) {
        self.depth_test = enabled;
        self.commands.push(RenderCommand::DepthTest(enabled));
    }

    fn bind_texture(&mut self, unit: u32, texture: TextureHandle) {
        if !self.textures.contains_key(texture) {
            warn!("Ignoring bind of unknown texture {:?} to unit {}", texture, unit);
            return;
        }
        self.bound_textures.insert(unit, texture);
        self.commands.push(RenderCommand::BindTexture { unit, texture });
    }

    fn draw_indexed(&mut self, mesh: MeshHandle, index_count: u32) {
        if !self.meshes.contains_key(mesh) {
            warn!("Ignoring draw of unknown mesh {:?}", mesh);
            return;
        }
        self.commands.push(RenderCommand::DrawIndexed { mesh, index_count });
        self.record_draw(mesh, index_count, true);
    }

    fn draw_arrays(&mut self, mesh: MeshHandle, vertex_count: u32) {
        if !self.meshes.contains_key(mesh) {
            warn!("Ignoring draw of unknown mesh {:?}", mesh);
            return;
        }
        self.commands.push(RenderCommand::DrawArrays { mesh, vertex_count });
        self.record_draw(mesh, vertex_count, false);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::api::{DepthStencilDesc, DepthStencilFormat};
    use crate::render::primitives::{cube, FULL_SCREEN_QUAD};
    use crate::foundation::math::{Vec2, Vec3};

    fn program(backend: &mut RecordingBackend) -> ProgramHandle {
        backend
            .load_program(&ShaderSource::new("scene.vert", "scene.frag"))
            .unwrap()
    }

    fn color_texture(backend: &mut RecordingBackend, width: u32, height: u32) -> TextureHandle {
        backend
            .create_texture(&TextureDesc {
                width,
                height,
                format: TextureFormat::Rgb8,
                filter: TextureFilter::Nearest,
                wrap: TextureWrap::ClampToEdge,
            })
            .unwrap()
    }

    #[test]
    fn test_light_uniforms_resolve_below_capacity() {
        let mut backend = RecordingBackend::new().with_light_capacity(2);
        let program = program(&mut backend);

        assert_eq!(
            backend.uniform_location(program, "light_source[0].position"),
            Some(UniformLocation(16))
        );
        assert_eq!(
            backend.uniform_location(program, "light_source[1].color"),
            Some(UniformLocation(19))
        );
        assert_eq!(backend.uniform_location(program, "light_source[2].position"), None);
        assert_eq!(backend.uniform_location(program, "light_source[0].intensity"), None);
        assert_eq!(backend.uniform_location(program, "missing"), None);
    }

    #[test]
    fn test_uniforms_resolve_by_program_role() {
        let mut backend = RecordingBackend::new();
        let scene = program(&mut backend);
        let post = backend.load_program(&ShaderConfig::default().post_process).unwrap();

        assert_eq!(backend.program_role(scene), Some(ProgramRole::Scene));
        assert_eq!(backend.program_role(post), Some(ProgramRole::PostProcess));
        assert_eq!(backend.program_source(post), Some(&ShaderConfig::default().post_process));

        assert_eq!(backend.uniform_location(scene, "screenTexture"), None);
        assert_eq!(backend.uniform_location(post, "screenTexture"), Some(UniformLocation(0)));
        assert_eq!(backend.uniform_location(post, "depthTexture"), Some(UniformLocation(2)));
        assert_eq!(backend.uniform_location(post, "light_source[0].position"), None);
        assert!(backend.uniform_location(scene, "light_source[0].position").is_some());
    }

    #[test]
    fn test_registered_post_process_source() {
        let blur = ShaderSource::new("blur.vert", "blur.frag");
        let mut backend = RecordingBackend::new().with_post_process_program(blur.clone());
        let post = backend.load_program(&blur).unwrap();

        assert_eq!(backend.program_role(post), Some(ProgramRole::PostProcess));
        assert_eq!(backend.uniform_location(post, "normalTexture"), Some(UniformLocation(1)));
    }

    #[test]
    fn test_uniforms_are_tracked_per_program() {
        let mut backend = RecordingBackend::new();
        let scene = program(&mut backend);
        let post = program(&mut backend);

        backend.use_program(scene);
        backend.set_uniform(UniformLocation(9), UniformValue::Bool(true));
        backend.use_program(post);
        backend.set_uniform(UniformLocation(9), UniformValue::Int(2));

        assert_eq!(backend.uniform(scene, UniformLocation(9)), Some(UniformValue::Bool(true)));
        assert_eq!(backend.uniform(post, UniformLocation(9)), Some(UniformValue::Int(2)));
    }

    #[test]
    fn test_draw_snapshots_state() {
        let mut backend = RecordingBackend::new();
        let program = program(&mut backend);
        let mesh = backend
            .register_mesh(&cube(Vec3::new(1.0, 1.0, 1.0), Vec2::new(1.0, 1.0), false, false, Vec3::new(1.0, 1.0, 1.0)))
            .unwrap();
        assert_eq!(backend.mesh_vertex_count(mesh), Some(36));
        assert_eq!(backend.mesh_index_count(mesh), Some(36));

        backend.use_program(program);
        backend.set_depth_test(true);
        backend.set_uniform(UniformLocation(3), UniformValue::Float(1.5));
        backend.draw_indexed(mesh, 36);

        let draw = &backend.draw_calls()[0];
        assert!(draw.indexed);
        assert!(draw.depth_test);
        assert_eq!(draw.count, 36);
        assert_eq!(draw.program, Some(program));
        assert_eq!(draw.uniform(UniformLocation(3)), Some(UniformValue::Float(1.5)));
    }

    #[test]
    fn test_unknown_mesh_draw_is_ignored() {
        let mut backend = RecordingBackend::new();
        let mesh = backend.register_screen_quad(&FULL_SCREEN_QUAD).unwrap();

        // default keys are null and never issued by a slot map
        backend.draw_arrays(MeshHandle::default(), 6);
        assert!(backend.draw_calls().is_empty());

        backend.draw_arrays(mesh, 6);
        assert_eq!(backend.draw_calls().len(), 1);
        assert_eq!(backend.mesh_vertex_count(mesh), Some(6));
        assert_eq!(backend.mesh_index_count(mesh), Some(0));
    }

    #[test]
    fn test_complete_target() {
        let mut backend = RecordingBackend::new();
        let color = color_texture(&mut backend, 64, 32);
        let normal = color_texture(&mut backend, 64, 32);
        let target = backend
            .create_render_target(&RenderTargetDesc {
                color_attachments: vec![color, normal],
                depth_stencil: Some(DepthStencilDesc {
                    width: 64,
                    height: 32,
                    format: DepthStencilFormat::Depth24Stencil8,
                }),
            })
            .unwrap();

        assert_eq!(backend.render_target_status(target), TargetStatus::Complete);
    }

    #[test]
    fn test_mismatched_attachments_are_incomplete() {
        let mut backend = RecordingBackend::new();
        let color = color_texture(&mut backend, 64, 32);
        let normal = color_texture(&mut backend, 32, 32);
        let target = backend
            .create_render_target(&RenderTargetDesc {
                color_attachments: vec![color, normal],
                depth_stencil: None,
            })
            .unwrap();

        assert!(matches!(backend.render_target_status(target), TargetStatus::Incomplete(_)));
    }

    #[test]
    fn test_attachment_limit_makes_target_incomplete() {
        let mut backend = RecordingBackend::new().with_max_color_attachments(1);
        let color = color_texture(&mut backend, 8, 8);
        let normal = color_texture(&mut backend, 8, 8);
        let target = backend
            .create_render_target(&RenderTargetDesc {
                color_attachments: vec![color, normal],
                depth_stencil: None,
            })
            .unwrap();

        assert!(matches!(backend.render_target_status(target), TargetStatus::Incomplete(_)));
    }

    #[test]
    fn test_upload_rejects_bad_image() {
        let mut backend = RecordingBackend::new();
        let image = ImageData { data: vec![0; 3], width: 2, height: 2, channels: 4 };
        assert!(matches!(
            backend.upload_texture(&image),
            Err(RenderError::ResourceCreationFailed(_))
        ));
        assert_eq!(backend.texture_count(), 0);
    }
}
