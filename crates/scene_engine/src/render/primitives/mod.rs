//! Core primitive types for rendering
//!
//! Mesh data handed to the GPU buffer registry and the procedural generators
//! that produce it.

pub mod mesh;
pub mod shapes;

// Re-export commonly used types
pub use mesh::{Mesh, ScreenVertex, Vertex, FULL_SCREEN_QUAD};
pub use shapes::{compute_tangent_basis, cube, sphere, text_geometry, GLYPH_ATLAS_SIZE};
