//! Backend abstraction traits for the rendering system
//!
//! The core never talks to a graphics API directly. Everything it needs from
//! the GPU side (buffer registry, shader provider, fixed-function state and
//! draw submission) goes through [`RenderBackend`].

use bitflags::bitflags;

use crate::assets::ImageData;
use crate::core::config::ShaderSource;
use crate::foundation::math::{Mat3, Mat4, Vec3};
use crate::render::primitives::{Mesh, ScreenVertex};
use crate::render::RenderResult;

slotmap::new_key_type! {
    /// Handle to an uploaded vertex/index buffer pair
    pub struct MeshHandle;

    /// Handle to a GPU texture
    pub struct TextureHandle;

    /// Handle to an off-screen render target
    pub struct RenderTargetHandle;

    /// Handle to a linked shader program
    pub struct ProgramHandle;
}

/// Uniform slot inside a shader program
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct UniformLocation(pub i32);

/// Value bound to a uniform slot
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UniformValue {
    /// Integer (also used for sampler units)
    Int(i32),
    /// Boolean flag
    Bool(bool),
    /// Scalar
    Float(f32),
    /// 3-component vector
    Vec3(Vec3),
    /// 3x3 matrix
    Mat3(Mat3),
    /// 4x4 matrix
    Mat4(Mat4),
}

bitflags! {
    /// Buffers cleared by [`RenderBackend::clear`]
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ClearFlags: u32 {
        /// Color attachments
        const COLOR = 0b001;
        /// Depth buffer
        const DEPTH = 0b010;
        /// Stencil buffer
        const STENCIL = 0b100;
    }
}

/// Texel format of a texture
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextureFormat {
    /// 8-bit RGB
    Rgb8,
    /// 8-bit RGBA
    Rgba8,
    /// 16-bit float RGB
    Rgb16F,
}

/// Sampling filter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextureFilter {
    /// Nearest texel
    Nearest,
    /// Bilinear
    Linear,
}

/// Addressing mode outside [0, 1]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextureWrap {
    /// Tile the texture
    Repeat,
    /// Clamp to the edge texel
    ClampToEdge,
}

/// Description of an empty texture allocation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureDesc {
    /// Width in texels
    pub width: u32,
    /// Height in texels
    pub height: u32,
    /// Texel format
    pub format: TextureFormat,
    /// Min/mag filter
    pub filter: TextureFilter,
    /// Wrap mode on both axes
    pub wrap: TextureWrap,
}

/// Format of a combined depth-stencil buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DepthStencilFormat {
    /// 24-bit depth, 8-bit stencil
    Depth24Stencil8,
}

/// Depth-stencil attachment owned by a render target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DepthStencilDesc {
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
    /// Storage format
    pub format: DepthStencilFormat,
}

/// Off-screen render target layout
///
/// Every color attachment is a simultaneous draw target, in order: output
/// `i` of the fragment shader writes `color_attachments[i]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderTargetDesc {
    /// Color outputs
    pub color_attachments: Vec<TextureHandle>,
    /// Combined depth-stencil buffer
    pub depth_stencil: Option<DepthStencilDesc>,
}

/// Result of a render target completeness check
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TargetStatus {
    /// Target can be rendered to
    Complete,
    /// Target cannot be rendered to, with the backend's reason
    Incomplete(String),
}

/// Main rendering backend trait
///
/// Resource creation happens during initialization and may fail. State and
/// draw methods are used on the per-frame path and are infallible; invalid
/// handles there are ignored by the backend.
pub trait RenderBackend {
    // === GPU buffer registry ===

    /// Upload mesh data and return an opaque handle
    fn register_mesh(&mut self, mesh: &Mesh) -> RenderResult<MeshHandle>;

    /// Upload a non-indexed 2D quad used by the post-process pass
    fn register_screen_quad(&mut self, vertices: &[ScreenVertex]) -> RenderResult<MeshHandle>;

    /// Upload decoded image data as a sampled texture
    fn upload_texture(&mut self, image: &ImageData) -> RenderResult<TextureHandle>;

    /// Allocate an uninitialized texture
    fn create_texture(&mut self, desc: &TextureDesc) -> RenderResult<TextureHandle>;

    /// Assemble an off-screen render target
    fn create_render_target(&mut self, desc: &RenderTargetDesc) -> RenderResult<RenderTargetHandle>;

    /// Check whether a render target can be drawn into
    fn render_target_status(&self, target: RenderTargetHandle) -> TargetStatus;

    // === Shader provider ===

    /// Compile and link a program
    fn load_program(&mut self, source: &ShaderSource) -> RenderResult<ProgramHandle>;

    /// Make a program current
    fn use_program(&mut self, program: ProgramHandle);

    /// Look up a uniform by name; `None` when the program has no such uniform
    fn uniform_location(&self, program: ProgramHandle, name: &str) -> Option<UniformLocation>;

    /// Set a uniform of the current program
    fn set_uniform(&mut self, location: UniformLocation, value: UniformValue);

    // === State and draws ===

    /// Set the viewport rectangle, anchored at the origin
    fn set_viewport(&mut self, width: u32, height: u32);

    /// Bind an off-screen target, or the default on-screen target with `None`
    fn bind_render_target(&mut self, target: Option<RenderTargetHandle>);

    /// Clear buffers of the bound target
    fn clear(&mut self, flags: ClearFlags, color: [f32; 4]);

    /// Enable or disable depth testing
    fn set_depth_test(&mut self, enabled: bool);

    /// Bind a texture to a texture unit
    fn bind_texture(&mut self, unit: u32, texture: TextureHandle);

    /// Draw `index_count` indices of a mesh as triangles
    fn draw_indexed(&mut self, mesh: MeshHandle, index_count: u32);

    /// Draw `vertex_count` vertices of a mesh as triangles without indices
    fn draw_arrays(&mut self, mesh: MeshHandle, vertex_count: u32);
}
