//! Scene nodes
//!
//! A node is a local transform, a closed [`NodeKind`] payload and the matrices
//! the propagator derives for it each frame. Payload fields live inside the
//! variant they belong to, so a light never carries a mesh and a mesh never
//! carries a light id.

use crate::animation::Motion;
use crate::foundation::math::{Mat4, Mat4Ext, Vec3};
use crate::render::api::{MeshHandle, TextureHandle};

/// Index of a node inside its [`SceneGraph`](super::SceneGraph)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub usize);

impl NodeId {
    /// The root of every graph
    pub const ROOT: NodeId = NodeId(0);

    /// Position in the node arena
    pub fn index(self) -> usize {
        self.0
    }
}

/// Uploaded mesh and the number of indices to draw from it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GeometryRef {
    /// Buffer registry handle
    pub mesh: MeshHandle,
    /// Indices submitted per draw
    pub index_count: u32,
}

/// What a node contributes to the frame
#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    /// Plain mesh, or a pure grouping node without geometry
    Geometry {
        /// Mesh to draw; `None` draws nothing
        geometry: Option<GeometryRef>,
    },
    /// Point light bound into the shader's light array
    PointLight {
        /// Slot in `light_source[]`
        light_id: u32,
        /// RGB color
        color: Vec3,
    },
    /// Reserved; has no effect when rendered
    SpotLight,
    /// Textured mesh
    Ui {
        /// Mesh to draw
        geometry: Option<GeometryRef>,
        /// Base texture
        texture: TextureHandle,
    },
    /// Textured mesh with an optional tangent-space normal map
    NormalMapped {
        /// Mesh to draw
        geometry: Option<GeometryRef>,
        /// Base texture
        texture: TextureHandle,
        /// Normal map
        normal_map: Option<TextureHandle>,
    },
}

impl NodeKind {
    /// Empty grouping node
    pub fn group() -> Self {
        NodeKind::Geometry { geometry: None }
    }

    /// Geometry drawn by this node, if any
    pub fn geometry(&self) -> Option<GeometryRef> {
        match self {
            NodeKind::Geometry { geometry }
            | NodeKind::Ui { geometry, .. }
            | NodeKind::NormalMapped { geometry, .. } => *geometry,
            NodeKind::PointLight { .. } | NodeKind::SpotLight => None,
        }
    }

    /// Short name for diagnostics
    pub fn label(&self) -> &'static str {
        match self {
            NodeKind::Geometry { .. } => "geometry",
            NodeKind::PointLight { .. } => "point light",
            NodeKind::SpotLight => "spot light",
            NodeKind::Ui { .. } => "ui",
            NodeKind::NormalMapped { .. } => "normal mapped",
        }
    }
}

/// Local transform relative to the parent node
///
/// Rotation and scale pivot around `reference_point`. Rotation is Euler
/// angles in radians, applied Y first, then X, then Z.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    /// Translation
    pub position: Vec3,
    /// Euler angles in radians
    pub rotation: Vec3,
    /// Per-axis scale
    pub scale: Vec3,
    /// Pivot for rotation and scale
    pub reference_point: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec3::zeros(),
            rotation: Vec3::zeros(),
            scale: Vec3::new(1.0, 1.0, 1.0),
            reference_point: Vec3::zeros(),
        }
    }
}

impl Transform {
    /// Transform at `position` with no rotation and unit scale
    pub fn from_position(position: Vec3) -> Self {
        Self { position, ..Default::default() }
    }

    /// `T(position) * T(ref) * Ry * Rx * Rz * S * T(-ref)`
    pub fn local_matrix(&self) -> Mat4 {
        Mat4::new_translation(&self.position)
            * Mat4::new_translation(&self.reference_point)
            * Mat4::rotation_y(self.rotation.y)
            * Mat4::rotation_x(self.rotation.x)
            * Mat4::rotation_z(self.rotation.z)
            * Mat4::new_nonuniform_scaling(&self.scale)
            * Mat4::new_translation(&-self.reference_point)
    }
}

/// One entry of the scene tree
#[derive(Debug, Clone)]
pub struct SceneNode {
    /// Lookup name
    pub name: Option<String>,
    /// Local transform, rewritten by motions each frame
    pub transform: Transform,
    /// Optional time-driven motion
    pub motion: Option<Motion>,
    kind: NodeKind,
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,
    pub(crate) world_matrix: Mat4,
    pub(crate) view_projected_matrix: Mat4,
}

impl SceneNode {
    /// Create a detached node with an identity transform
    pub fn new(kind: NodeKind) -> Self {
        Self {
            name: None,
            transform: Transform::default(),
            motion: None,
            kind,
            parent: None,
            children: Vec::new(),
            world_matrix: Mat4::identity(),
            view_projected_matrix: Mat4::identity(),
        }
    }

    /// Set the lookup name
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Set the local transform
    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.transform = transform;
        self
    }

    /// Set the local position
    pub fn with_position(mut self, position: Vec3) -> Self {
        self.transform.position = position;
        self
    }

    /// Attach a motion
    pub fn with_motion(mut self, motion: Motion) -> Self {
        self.motion = Some(motion);
        self
    }

    /// Node payload, fixed at creation
    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    /// Parent node; `None` for the root and detached nodes
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Children in draw order
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    /// Model matrix from the last propagation
    pub fn world_matrix(&self) -> &Mat4 {
        &self.world_matrix
    }

    /// Model-view-projection matrix from the last propagation
    pub fn view_projected_matrix(&self) -> &Mat4 {
        &self.view_projected_matrix
    }

    /// Local matrix of the current transform
    pub fn local_matrix(&self) -> Mat4 {
        self.transform.local_matrix()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use crate::foundation::math::{constants, Vec4};

    #[test]
    fn test_default_transform_is_identity() {
        assert_eq!(Transform::default().local_matrix(), Mat4::identity());
    }

    #[test]
    fn test_rotation_pivots_around_reference_point() {
        let transform = Transform {
            rotation: Vec3::new(0.0, constants::PI, 0.0),
            reference_point: Vec3::new(1.0, 0.0, 0.0),
            ..Default::default()
        };

        // the pivot itself stays put, the origin swings to the far side
        let pivot = transform.local_matrix() * Vec4::new(1.0, 0.0, 0.0, 1.0);
        assert_relative_eq!(pivot, Vec4::new(1.0, 0.0, 0.0, 1.0), epsilon = 1e-6);
        let origin = transform.local_matrix() * Vec4::new(0.0, 0.0, 0.0, 1.0);
        assert_relative_eq!(origin, Vec4::new(2.0, 0.0, 0.0, 1.0), epsilon = 1e-6);
    }

    #[test]
    fn test_scale_applies_before_translation() {
        let transform = Transform {
            position: Vec3::new(0.0, 5.0, 0.0),
            scale: Vec3::new(2.0, 2.0, 2.0),
            ..Default::default()
        };
        let corner = transform.local_matrix() * Vec4::new(1.0, 1.0, 1.0, 1.0);
        assert_relative_eq!(corner, Vec4::new(2.0, 7.0, 2.0, 1.0));
    }

    #[test]
    fn test_geometry_accessor() {
        assert_eq!(NodeKind::group().geometry(), None);
        assert_eq!(NodeKind::SpotLight.geometry(), None);
        let light = NodeKind::PointLight { light_id: 0, color: Vec3::new(1.0, 1.0, 1.0) };
        assert_eq!(light.geometry(), None);
        assert_eq!(light.label(), "point light");
    }
}
