//! # Scene Engine
//!
//! A scene-graph engine that propagates hierarchical transforms and renders
//! the tree through a two-pass (scene then post-process) pipeline.
//!
//! ## Features
//!
//! - **Scene Graph**: arena tree of typed nodes with pivot-aware transforms
//! - **Render Dispatch**: pre-order traversal binding per-node uniforms and lights
//! - **Frame Pipeline**: off-screen multi-target pass plus a full-screen quad pass
//! - **Animation**: game clock state machine, keyframe schedules, node motions
//! - **Headless Core**: GPU and windowing sit behind [`render::RenderBackend`]
//!   and [`platform::Platform`]
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use scene_engine::prelude::*;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     scene_engine::foundation::logging::init();
//!
//!     let config = EngineConfig::default();
//!     let description = SceneDescription::load("scenes/box_room.ron")?;
//!     let mut assets = InMemoryAssets::new();
//!
//!     let mut engine = Engine::initialize(config, RecordingBackend::new(), &mut assets, &description)?;
//!     let mut platform = HeadlessPlatform::new(1366, 768, 60);
//!     engine.run(&mut platform);
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names, clippy::too_many_arguments)]

// Core engine modules
pub mod core;

pub mod foundation;
pub mod config;
pub mod assets;
pub mod render;
pub mod scene;
pub mod input;
pub mod animation;
pub mod platform;

mod engine;

pub use engine::{Engine, EngineError, EngineResult, RunSummary};

/// Common imports for engine users
pub mod prelude {
    pub use crate::{
        Engine, EngineError, EngineResult, RunSummary,
        animation::{AnimationDriver, CameraRig, FrameState, GameState, Keyframe, KeyframeAction, Motion},
        assets::{AssetError, AssetProvider, ImageData, InMemoryAssets},
        core::config::{Config, EngineConfig, ShaderSource},
        foundation::math::{Mat4, Vec2, Vec3},
        input::{InputManager, MouseButton},
        platform::{HeadlessPlatform, Platform},
        render::{FrameStats, Mesh, RecordingBackend, RenderBackend, RenderDispatcher, Vertex},
        scene::{
            propagate_scene, MeshSource, NodeDescription, NodeId, NodeKind, NodeKindSpec, Scene,
            SceneDescription, SceneGraph, SceneNode, Transform,
        },
    };
}
