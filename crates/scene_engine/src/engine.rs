//! Core engine implementation

use log::{error, info, trace};
use thiserror::Error;

use crate::animation::{AnimationDriver, FrameState, StateTransition};
use crate::assets::AssetProvider;
use crate::config::ConfigError;
use crate::core::config::EngineConfig;
use crate::foundation::math::Vec3;
use crate::foundation::time::FrameTimer;
use crate::input::InputManager;
use crate::platform::Platform;
use crate::render::api::RenderBackend;
use crate::render::{FramePipeline, FrameStats, FrameUniforms, RenderDispatcher, RenderError};
use crate::scene::{propagate_scene, Scene, SceneBuilder, SceneDescription, SceneError};

/// Engine-level errors
#[derive(Error, Debug)]
pub enum EngineError {
    /// The configuration is unusable
    #[error("Engine configuration error: {0}")]
    Config(#[from] ConfigError),

    /// The scene could not be built
    #[error("Scene error: {0}")]
    Scene(#[from] SceneError),

    /// GPU resources could not be created
    #[error("Rendering error: {0}")]
    Render(#[from] RenderError),
}

/// Result type for engine operations
pub type EngineResult<T> = Result<T, EngineError>;

/// Totals of a finished [`Engine::run`]
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RunSummary {
    /// Frames rendered
    pub frames: u64,
    /// Wall-clock seconds between the first and last frame
    pub total_time: f64,
    /// Counters of the last rendered frame
    pub last_frame: FrameStats,
}

/// Main engine struct
///
/// Owns the scene and every per-frame subsystem. A frame is
/// [`update_frame`](Self::update_frame) followed by
/// [`render_frame`](Self::render_frame); [`run`](Self::run) repeats that
/// until the platform asks to quit.
pub struct Engine<B: RenderBackend> {
    config: EngineConfig,
    backend: B,
    scene: Scene,
    pipeline: FramePipeline,
    dispatcher: RenderDispatcher,
    driver: AnimationDriver,
    input: InputManager,
    timer: FrameTimer,
    frame: FrameUniforms,
}

impl<B: RenderBackend> Engine<B> {
    /// Validate the configuration, build the frame pipeline and the scene
    ///
    /// All GPU resources are created here. Any failure is fatal.
    pub fn initialize(
        config: EngineConfig,
        mut backend: B,
        assets: &mut dyn AssetProvider,
        description: &SceneDescription,
    ) -> EngineResult<Self> {
        info!("Initializing engine...");

        config.validate().map_err(|e| {
            error!("Invalid engine configuration: {}", e);
            e
        })?;

        let pipeline = FramePipeline::new(&mut backend, &config)?;
        let scene = SceneBuilder::new(&mut backend, assets).build(description)?;
        let driver = AnimationDriver::new(&config);
        let dispatcher = RenderDispatcher::with_max_point_lights(config.render.max_point_lights);

        info!(
            "Engine initialized: '{}' at {}x{}",
            config.window.title, config.window.width, config.window.height
        );

        Ok(Self {
            config,
            backend,
            scene,
            pipeline,
            dispatcher,
            driver,
            input: InputManager::new(),
            timer: FrameTimer::new(),
            frame: FrameUniforms {
                camera_position: Vec3::zeros(),
                occluder: None,
            },
        })
    }

    /// Advance time and animation, then propagate transforms
    ///
    /// Samples the platform's mouse buttons, runs the animation driver and
    /// recomputes every world and view-projected matrix. The occluder
    /// uniforms are captured from the freshly propagated graph.
    pub fn update_frame(&mut self, delta_time: f64, platform: &dyn Platform) -> FrameState {
        self.input.update(|button| platform.mouse_button_down(button));

        let state = self.driver.update(
            delta_time,
            &self.input,
            &mut self.scene,
            platform.window_size(),
        );

        propagate_scene(&mut self.scene.graph, &state.view_projection);

        self.frame = FrameUniforms {
            camera_position: state.camera_position,
            occluder: self.scene.occluder_uniform(),
        };
        state
    }

    /// Render the propagated scene through both passes
    pub fn render_frame(&mut self, window_size: (u32, u32)) -> FrameStats {
        self.pipeline.render_frame(
            &mut self.backend,
            &mut self.dispatcher,
            &self.scene.graph,
            &self.frame,
            window_size,
        )
    }

    /// Run frames until the platform asks to quit
    pub fn run(&mut self, platform: &mut dyn Platform) -> RunSummary {
        info!("Starting main loop...");

        let mut last_frame = FrameStats::default();
        while !platform.should_close() {
            platform.poll_events();
            let delta_time = self.timer.tick();

            self.update_frame(delta_time, platform);
            last_frame = self.render_frame(platform.window_size());
            platform.present();

            trace!(
                "Frame {}: {} draws, {} indices",
                self.timer.frame_count(),
                last_frame.draw_calls,
                last_frame.indices_submitted
            );
        }

        info!(
            "Main loop finished after {} frames ({:.1} fps average)",
            self.timer.frame_count(),
            self.timer.average_fps()
        );

        RunSummary {
            frames: self.timer.frame_count(),
            total_time: self.timer.total_time(),
            last_frame,
        }
    }

    /// End the running game
    pub fn lose(&mut self) -> Option<StateTransition> {
        self.driver.lose()
    }

    /// Engine configuration
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// The render backend
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Mutable access to the render backend
    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    /// The scene
    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    /// Mutable access to the scene
    pub fn scene_mut(&mut self) -> &mut Scene {
        &mut self.scene
    }

    /// The frame pipeline
    pub fn pipeline(&self) -> &FramePipeline {
        &self.pipeline
    }

    /// The input manager
    pub fn input(&self) -> &InputManager {
        &self.input
    }

    /// Uniforms captured by the last [`update_frame`](Self::update_frame)
    pub fn frame_uniforms(&self) -> &FrameUniforms {
        &self.frame
    }
}
