//! Declarative scene description
//!
//! Scenes are data: a RON (or TOML) file listing nodes, their parents,
//! transforms, payloads and motions, plus the camera rig, keyframe schedule
//! and shadow occluder. [`SceneBuilder`](super::SceneBuilder) turns a
//! description into a live [`Scene`](super::Scene).
//!
//! ```ron
//! SceneDescription(
//!     nodes: [
//!         (
//!             name: "ball",
//!             position: (0.0, 0.0, -80.0),
//!             kind: Geometry(mesh: Sphere(radius: 3.0, slices: 40, layers: 40)),
//!             motion: Some(Spin(rates: (0.0, 2.0, 0.0))),
//!         ),
//!     ],
//! )
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use super::SceneResult;
use crate::animation::{CameraRig, Keyframe, Motion};
use crate::config::{Config, ConfigFormat};
use crate::foundation::math::{serde_vec2, serde_vec3, Vec2, Vec3};

fn unit_vec3() -> Vec3 {
    Vec3::new(1.0, 1.0, 1.0)
}

fn unit_vec2() -> Vec2 {
    Vec2::new(1.0, 1.0)
}

/// Where a node's mesh comes from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum MeshSource {
    /// Procedural box
    Cube {
        /// Edge lengths
        #[serde(with = "serde_vec3")]
        dimensions: Vec3,
        /// World units per texture repeat when tiling
        #[serde(default = "unit_vec2", with = "serde_vec2")]
        texture_scale: Vec2,
        /// Repeat the texture across faces
        #[serde(default)]
        tiling: bool,
        /// Face inward
        #[serde(default)]
        inverted: bool,
        /// Per-axis multiplier applied to face extents before tiling
        #[serde(default = "unit_vec3", with = "serde_vec3")]
        texture_scale_3d: Vec3,
    },
    /// Procedural UV sphere
    Sphere {
        /// Radius
        radius: f32,
        /// Segments around the axis
        slices: u32,
        /// Segments from pole to pole
        layers: u32,
    },
    /// Strip of glyph quads
    Text {
        /// Characters to lay out
        text: String,
        /// Glyph aspect ratio
        height_over_width: f32,
        /// Width of the whole strip
        total_width: f32,
    },
    /// Model file loaded through the asset provider
    Model {
        /// Path handed to the asset provider
        path: String,
    },
}

/// Payload of a described node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum NodeKindSpec {
    /// Transform-only node
    Group,
    /// Untextured mesh
    Geometry {
        /// Mesh source
        mesh: MeshSource,
    },
    /// Point light
    PointLight {
        /// Slot in the shader's light array
        light_id: u32,
        /// RGB color
        #[serde(with = "serde_vec3")]
        color: Vec3,
    },
    /// Reserved spot light
    SpotLight,
    /// Textured mesh
    Ui {
        /// Mesh source
        mesh: MeshSource,
        /// Texture path
        texture: String,
    },
    /// Textured mesh with optional normal map
    NormalMapped {
        /// Mesh source
        mesh: MeshSource,
        /// Base texture path
        texture: String,
        /// Normal map path
        #[serde(default)]
        normal_map: Option<String>,
    },
}

/// One node of a description
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeDescription {
    /// Unique name
    pub name: String,
    /// Name of a node described earlier; the root when absent
    #[serde(default)]
    pub parent: Option<String>,
    /// Local translation
    #[serde(default, with = "serde_vec3")]
    pub position: Vec3,
    /// Euler angles in radians
    #[serde(default, with = "serde_vec3")]
    pub rotation: Vec3,
    /// Per-axis scale
    #[serde(default = "unit_vec3", with = "serde_vec3")]
    pub scale: Vec3,
    /// Pivot for rotation and scale
    #[serde(default, with = "serde_vec3")]
    pub reference_point: Vec3,
    /// Payload
    pub kind: NodeKindSpec,
    /// Time-driven motion
    #[serde(default)]
    pub motion: Option<Motion>,
}

impl NodeDescription {
    /// Describe a node under the root with an identity transform
    pub fn new(name: impl Into<String>, kind: NodeKindSpec) -> Self {
        Self {
            name: name.into(),
            parent: None,
            position: Vec3::zeros(),
            rotation: Vec3::zeros(),
            scale: unit_vec3(),
            reference_point: Vec3::zeros(),
            kind,
            motion: None,
        }
    }

    /// Set the parent by name
    pub fn with_parent(mut self, parent: impl Into<String>) -> Self {
        self.parent = Some(parent.into());
        self
    }

    /// Set the local translation
    pub fn with_position(mut self, position: Vec3) -> Self {
        self.position = position;
        self
    }

    /// Set the local scale
    pub fn with_scale(mut self, scale: Vec3) -> Self {
        self.scale = scale;
        self
    }

    /// Attach a motion
    pub fn with_motion(mut self, motion: Motion) -> Self {
        self.motion = Some(motion);
        self
    }
}

/// Node whose position and radius feed the shadow uniforms
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OccluderDescription {
    /// Name of the occluding node
    pub node: String,
    /// Occluder radius
    pub radius: f32,
}

/// Complete scene description
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneDescription {
    /// Camera placement
    pub camera: CameraRig,
    /// Keyframe schedule for keyframed motions
    pub keyframes: Vec<Keyframe>,
    /// Shadow occluder
    pub occluder: Option<OccluderDescription>,
    /// Nodes, parents before children
    pub nodes: Vec<NodeDescription>,
}

impl Config for SceneDescription {}

impl SceneDescription {
    /// Parse a RON description
    pub fn from_ron(text: &str) -> SceneResult<Self> {
        Ok(Self::parse(text, ConfigFormat::Ron)?)
    }

    /// Read a description file; the format follows the extension
    pub fn load(path: impl AsRef<Path>) -> SceneResult<Self> {
        let path = path.as_ref();
        let description = Self::load_from_file(path)?;
        log::info!("Loaded scene description {} ({} nodes)", path.display(), description.nodes.len());
        Ok(description)
    }
}
