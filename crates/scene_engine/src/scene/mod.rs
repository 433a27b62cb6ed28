//! # Scene Management
//!
//! The scene is a tree of [`SceneNode`]s stored in an arena. Each frame the
//! animation driver rewrites local transforms, [`propagate_scene`] derives
//! world and view-projected matrices, and the render dispatcher walks the
//! tree in the same order to submit draws.

pub mod builder;
pub mod description;
pub mod graph;
pub mod node;
pub mod propagation;

pub use builder::SceneBuilder;
pub use description::{MeshSource, NodeDescription, NodeKindSpec, OccluderDescription, SceneDescription};
pub use graph::{SceneGraph, ROOT_NAME};
pub use node::{GeometryRef, NodeId, NodeKind, SceneNode, Transform};
pub use propagation::{propagate, propagate_scene};

use thiserror::Error;

use crate::animation::{AnimationError, CameraRig, KeyframeSchedule};
use crate::assets::AssetError;
use crate::config::ConfigError;
use crate::foundation::math::{Mat4Ext, Vec3};
use crate::render::RenderError;

/// Scene construction errors
#[derive(Debug, Error)]
pub enum SceneError {
    /// A node id does not exist in the graph
    #[error("Scene node {0:?} does not exist")]
    MissingNode(NodeId),

    /// A node can only be attached once
    #[error("Scene node {child:?} already has parent {parent:?}")]
    AlreadyAttached {
        /// Node being attached
        child: NodeId,
        /// Its existing parent
        parent: NodeId,
    },

    /// The root cannot be given a parent
    #[error("Scene root cannot be attached under {parent:?}")]
    RootAttach {
        /// Requested parent
        parent: NodeId,
    },

    /// Attaching would make a node its own ancestor
    #[error("Attaching {child:?} under {parent:?} would create a cycle")]
    Cycle {
        /// Requested parent
        parent: NodeId,
        /// Node being attached
        child: NodeId,
    },

    /// Two described nodes share a name
    #[error("Duplicate scene node name '{0}'")]
    DuplicateName(String),

    /// A described node names a parent not described before it
    #[error("Scene node '{node}' names unknown parent '{parent}'")]
    UnknownParent {
        /// Node being built
        node: String,
        /// Missing parent name
        parent: String,
    },

    /// A reference to a node name that does not exist
    #[error("Unknown scene node '{0}'")]
    UnknownNode(String),

    /// The description parsed but cannot be built
    #[error("Invalid scene description: {0}")]
    InvalidDescription(String),

    /// The description could not be read or parsed
    #[error("Scene description error: {0}")]
    Description(#[from] ConfigError),

    /// A model or texture could not be loaded
    #[error("Scene asset error: {0}")]
    Asset(#[from] AssetError),

    /// A mesh or texture could not be uploaded
    #[error("Scene resource error: {0}")]
    Render(#[from] RenderError),

    /// Animation data is malformed
    #[error("Scene animation error: {0}")]
    Animation(#[from] AnimationError),
}

/// Result type for scene operations
pub type SceneResult<T> = Result<T, SceneError>;

/// Node whose position feeds the shadow uniforms
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Occluder {
    /// Occluding node
    pub node: NodeId,
    /// Occluder radius
    pub radius: f32,
}

/// A built scene: the graph plus the data driving it over time
#[derive(Debug, Clone)]
pub struct Scene {
    /// Node tree
    pub graph: SceneGraph,
    /// Camera placement
    pub camera: CameraRig,
    /// Keyframe schedule for keyframed motions
    pub keyframes: KeyframeSchedule,
    /// Shadow occluder
    pub occluder: Option<Occluder>,
}

impl Scene {
    /// Scene with an empty graph
    pub fn new(camera: CameraRig, keyframes: KeyframeSchedule) -> Self {
        Self {
            graph: SceneGraph::new(),
            camera,
            keyframes,
            occluder: None,
        }
    }

    /// World position and radius of the occluder, from the last propagation
    pub fn occluder_uniform(&self) -> Option<(Vec3, f32)> {
        let occluder = self.occluder?;
        let node = self.graph.get(occluder.node)?;
        Some((node.world_matrix().transform_origin(), occluder.radius))
    }
}

impl Default for Scene {
    fn default() -> Self {
        Self::new(CameraRig::default(), KeyframeSchedule::default())
    }
}
