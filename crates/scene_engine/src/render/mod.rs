//! # Rendering System
//!
//! Everything between a propagated scene graph and the GPU.
//!
//! ## Architecture
//!
//! - **api**: the [`RenderBackend`] trait the core talks to, plus uniform slots
//! - **primitives**: vertex/mesh data and procedural generators
//! - **backends**: the headless [`RecordingBackend`]
//! - **dispatcher**: per-node uniform binding and draw submission
//! - **pipeline**: two-pass frame rendering through an off-screen target

pub mod api;
pub mod primitives;

/// Graphics backend implementations
pub mod backends;

pub mod dispatcher;
pub mod pipeline;

pub use api::{
    ClearFlags, MeshHandle, ProgramHandle, RenderBackend, RenderTargetHandle, TextureHandle,
    UniformLocation, UniformValue,
};
pub use backends::RecordingBackend;
pub use dispatcher::{DispatchStats, FrameUniforms, RenderDispatcher};
pub use pipeline::{FramePipeline, FrameStats, RenderTargets};
pub use primitives::{Mesh, ScreenVertex, Vertex};

use thiserror::Error;

/// Errors that can occur in the rendering system
#[derive(Debug, Error)]
pub enum RenderError {
    /// The off-screen render target cannot be drawn into
    ///
    /// Fatal during initialization: the frame pipeline has nowhere to render
    /// the scene pass.
    #[error("Render target incomplete: {0}")]
    IncompleteRenderTarget(String),

    /// Resource creation or management failed
    ///
    /// Occurs when GPU resources (buffers, textures, shaders) cannot be created,
    /// typically because of invalid data.
    #[error("Resource creation failed: {0}")]
    ResourceCreationFailed(String),

    /// Failure reported by a windowed backend's graphics API
    #[error("Backend error: {0}")]
    BackendError(String),
}

/// Result type for rendering operations
pub type RenderResult<T> = Result<T, RenderError>;
