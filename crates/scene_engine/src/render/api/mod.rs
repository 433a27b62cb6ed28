//! Public rendering API
//!
//! The backend trait and the handle/value types that cross it.

pub mod render_backend;
pub mod uniforms;

pub use render_backend::{
    ClearFlags, DepthStencilDesc, DepthStencilFormat, MeshHandle, ProgramHandle, RenderBackend,
    RenderTargetDesc, RenderTargetHandle, TargetStatus, TextureDesc, TextureFilter, TextureFormat,
    TextureHandle, TextureWrap, UniformLocation, UniformValue,
};
