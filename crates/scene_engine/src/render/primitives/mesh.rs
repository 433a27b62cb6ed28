//! Mesh representation for 3D models
//!
//! Pure data structures handed to the GPU buffer registry. Vertex types are
//! `#[repr(C)]` and `Pod` so a backend can upload them with
//! `bytemuck::cast_slice` without reshuffling.

use crate::render::{RenderError, RenderResult};

/// Vertex data structure for 3D rendering
///
/// Position, normal, texture coordinate and the tangent frame used by
/// normal-mapped geometry. Meshes without a tangent frame leave it zeroed.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Vertex {
    /// Position in 3D space
    pub position: [f32; 3],

    /// Normal vector
    pub normal: [f32; 3],

    /// Texture coordinates
    pub tex_coord: [f32; 2],

    /// Tangent vector for normal mapping
    pub tangent: [f32; 3],

    /// Bitangent vector for normal mapping
    pub bitangent: [f32; 3],
}

// Safe to implement Pod and Zeroable for Vertex since it only contains f32 arrays
unsafe impl bytemuck::Pod for Vertex {}
unsafe impl bytemuck::Zeroable for Vertex {}

impl Vertex {
    /// Create a vertex with an empty tangent frame
    pub fn new(position: [f32; 3], normal: [f32; 3], tex_coord: [f32; 2]) -> Self {
        Self {
            position,
            normal,
            tex_coord,
            ..Default::default()
        }
    }
}

/// Vertex of the full-screen quad: clip-space position and UV
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ScreenVertex {
    /// Clip-space XY
    pub position: [f32; 2],
    /// Texture coordinates
    pub tex_coord: [f32; 2],
}

unsafe impl bytemuck::Pod for ScreenVertex {}
unsafe impl bytemuck::Zeroable for ScreenVertex {}

/// Two triangles covering clip space, drawn without an index buffer
pub const FULL_SCREEN_QUAD: [ScreenVertex; 6] = [
    ScreenVertex { position: [-1.0, -1.0], tex_coord: [0.0, 0.0] },
    ScreenVertex { position: [1.0, -1.0], tex_coord: [1.0, 0.0] },
    ScreenVertex { position: [-1.0, 1.0], tex_coord: [0.0, 1.0] },
    ScreenVertex { position: [1.0, -1.0], tex_coord: [1.0, 0.0] },
    ScreenVertex { position: [1.0, 1.0], tex_coord: [1.0, 1.0] },
    ScreenVertex { position: [-1.0, 1.0], tex_coord: [0.0, 1.0] },
];

/// Indexed triangle mesh
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Mesh {
    /// Vertex data
    pub vertices: Vec<Vertex>,

    /// Triangle list indices into `vertices`
    pub indices: Vec<u32>,
}

impl Mesh {
    /// Create a new mesh
    pub fn new(vertices: Vec<Vertex>, indices: Vec<u32>) -> Self {
        Self { vertices, indices }
    }

    /// Number of vertices
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Number of indices
    pub fn index_count(&self) -> usize {
        self.indices.len()
    }

    /// Whether the mesh has nothing to draw
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Raw vertex bytes, ready for upload
    pub fn vertex_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.vertices)
    }

    /// Check that the mesh is a valid triangle list
    pub fn validate(&self) -> RenderResult<()> {
        if self.indices.len() % 3 != 0 {
            return Err(RenderError::ResourceCreationFailed(format!(
                "index count {} is not a multiple of 3",
                self.indices.len()
            )));
        }

        let vertex_count = self.vertices.len();
        if let Some(bad) = self.indices.iter().find(|&&index| index as usize >= vertex_count) {
            return Err(RenderError::ResourceCreationFailed(format!(
                "index {bad} out of range for {vertex_count} vertices"
            )));
        }

        Ok(())
    }
}
