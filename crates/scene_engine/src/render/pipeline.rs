//! Two-pass frame pipeline
//!
//! Pass 1 renders the scene into an off-screen target with three color
//! outputs (color, view-space normal, depth) and a depth-stencil buffer.
//! Pass 2 draws a full-screen quad on the default target with a
//! post-process program sampling those outputs.
//!
//! Targets are sized once from the initial window size. Later window
//! resizes only change the viewport.

use log::{debug, error, info, warn};

use super::api::{
    uniforms, ClearFlags, DepthStencilDesc, DepthStencilFormat, MeshHandle, ProgramHandle,
    RenderBackend, RenderTargetDesc, RenderTargetHandle, TargetStatus, TextureDesc, TextureFilter,
    TextureFormat, TextureHandle, TextureWrap, UniformValue,
};
use super::dispatcher::{FrameUniforms, RenderDispatcher};
use super::primitives::FULL_SCREEN_QUAD;
use super::{RenderError, RenderResult};
use crate::core::config::EngineConfig;
use crate::scene::SceneGraph;

/// Off-screen target of the scene pass and its attachments
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderTargets {
    /// The render target
    pub target: RenderTargetHandle,
    /// Shaded color, output 0
    pub color: TextureHandle,
    /// View-space normals, output 1
    pub normal: TextureHandle,
    /// Depth and auxiliary data, output 2
    pub depth: TextureHandle,
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
}

impl RenderTargets {
    /// Allocate the attachments and assemble the target
    ///
    /// Fails with [`RenderError::IncompleteRenderTarget`] when the backend
    /// cannot render into the result.
    pub fn create(backend: &mut dyn RenderBackend, width: u32, height: u32) -> RenderResult<Self> {
        let attachment = |format, wrap| TextureDesc {
            width,
            height,
            format,
            filter: TextureFilter::Nearest,
            wrap,
        };

        let color = backend.create_texture(&attachment(TextureFormat::Rgb8, TextureWrap::ClampToEdge))?;
        let normal = backend.create_texture(&attachment(TextureFormat::Rgb16F, TextureWrap::Repeat))?;
        let depth = backend.create_texture(&attachment(TextureFormat::Rgb16F, TextureWrap::Repeat))?;

        let target = backend.create_render_target(&RenderTargetDesc {
            color_attachments: vec![color, normal, depth],
            depth_stencil: Some(DepthStencilDesc {
                width,
                height,
                format: DepthStencilFormat::Depth24Stencil8,
            }),
        })?;

        if let TargetStatus::Incomplete(reason) = backend.render_target_status(target) {
            error!("Framebuffer is not complete: {}", reason);
            return Err(RenderError::IncompleteRenderTarget(reason));
        }

        debug!("Created {}x{} scene render target {:?}", width, height, target);
        Ok(Self { target, color, normal, depth, width, height })
    }

    /// Color outputs in attachment order
    pub fn outputs(&self) -> [TextureHandle; 3] {
        [self.color, self.normal, self.depth]
    }
}

/// Counters for one rendered frame
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameStats {
    /// Scene draws issued in the first pass
    pub draw_calls: u32,
    /// Indices submitted in the first pass
    pub indices_submitted: u64,
    /// Point lights bound in the first pass
    pub lights_bound: u32,
    /// Point lights left unbound in the first pass
    pub lights_skipped: u32,
}

/// Programs, targets and the screen quad of the two-pass pipeline
#[derive(Debug)]
pub struct FramePipeline {
    scene_program: ProgramHandle,
    post_program: ProgramHandle,
    targets: RenderTargets,
    screen_quad: MeshHandle,
    clear_color: [f32; 4],
}

impl FramePipeline {
    /// Load both programs, allocate the scene target and upload the quad
    pub fn new(backend: &mut dyn RenderBackend, config: &EngineConfig) -> RenderResult<Self> {
        let scene_program = backend.load_program(&config.shaders.scene)?;
        let post_program = backend.load_program(&config.shaders.post_process)?;

        backend.use_program(post_program);
        for (name, unit) in uniforms::POST_PROCESS_SAMPLERS {
            match backend.uniform_location(post_program, name) {
                Some(location) => backend.set_uniform(location, UniformValue::Int(unit as i32)),
                None => warn!("Post-process program has no sampler '{}'", name),
            }
        }

        let targets = RenderTargets::create(backend, config.window.width, config.window.height)?;
        let screen_quad = backend.register_screen_quad(&FULL_SCREEN_QUAD)?;

        info!(
            "Frame pipeline ready: {}x{} scene target, {} outputs",
            targets.width,
            targets.height,
            targets.outputs().len()
        );

        Ok(Self {
            scene_program,
            post_program,
            targets,
            screen_quad,
            clear_color: config.render.clear_color,
        })
    }

    /// Program of the scene pass
    pub fn scene_program(&self) -> ProgramHandle {
        self.scene_program
    }

    /// Program of the post-process pass
    pub fn post_program(&self) -> ProgramHandle {
        self.post_program
    }

    /// The scene pass target
    pub fn targets(&self) -> &RenderTargets {
        &self.targets
    }

    /// The full-screen quad
    pub fn screen_quad(&self) -> MeshHandle {
        self.screen_quad
    }

    /// Render one frame of an already propagated graph
    pub fn render_frame(
        &self,
        backend: &mut dyn RenderBackend,
        dispatcher: &mut RenderDispatcher,
        graph: &SceneGraph,
        frame: &FrameUniforms,
        window_size: (u32, u32),
    ) -> FrameStats {
        backend.set_viewport(window_size.0, window_size.1);

        // scene pass
        backend.bind_render_target(Some(self.targets.target));
        backend.clear(ClearFlags::COLOR | ClearFlags::DEPTH, self.clear_color);
        backend.set_depth_test(true);
        backend.use_program(self.scene_program);
        let stats = dispatcher.render_scene(backend, self.scene_program, graph, frame);

        // post-process pass
        backend.bind_render_target(None);
        backend.clear(ClearFlags::COLOR, self.clear_color);
        backend.set_depth_test(false);
        backend.use_program(self.post_program);
        for ((_, unit), texture) in uniforms::POST_PROCESS_SAMPLERS.iter().zip(self.targets.outputs()) {
            backend.bind_texture(*unit, texture);
        }
        backend.draw_arrays(self.screen_quad, FULL_SCREEN_QUAD.len() as u32);

        FrameStats {
            draw_calls: stats.draw_calls,
            indices_submitted: stats.indices_submitted,
            lights_bound: stats.lights_bound,
            lights_skipped: stats.lights_skipped,
        }
    }
}
