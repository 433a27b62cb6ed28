//! Scene construction
//!
//! Resolves a [`SceneDescription`] into uploaded meshes, textures and an arena
//! graph. Every resource is created here, once; nothing is uploaded per frame.

use std::collections::HashMap;

use log::{debug, error, info, warn};

use super::description::{MeshSource, NodeDescription, NodeKindSpec, SceneDescription};
use super::graph::ROOT_NAME;
use super::node::{GeometryRef, NodeId, NodeKind, SceneNode, Transform};
use super::{Occluder, Scene, SceneError, SceneResult};
use crate::animation::{KeyframeSchedule, Motion};
use crate::assets::AssetProvider;
use crate::render::api::{RenderBackend, TextureHandle};
use crate::render::primitives::{cube, sphere, text_geometry, Mesh};
use crate::render::RenderError;

/// Builds a [`Scene`] through a render backend and an asset provider
pub struct SceneBuilder<'a> {
    backend: &'a mut dyn RenderBackend,
    assets: &'a mut dyn AssetProvider,
    textures: HashMap<String, TextureHandle>,
}

impl<'a> SceneBuilder<'a> {
    /// Create a builder
    pub fn new(backend: &'a mut dyn RenderBackend, assets: &'a mut dyn AssetProvider) -> Self {
        Self {
            backend,
            assets,
            textures: HashMap::new(),
        }
    }

    /// Build the scene
    ///
    /// Nodes are attached in description order, so a parent must be described
    /// before its children. Textures referenced by several nodes are uploaded
    /// once.
    pub fn build(mut self, description: &SceneDescription) -> SceneResult<Scene> {
        let keyframes = KeyframeSchedule::new(description.keyframes.clone()).map_err(|e| {
            error!("Invalid keyframe schedule: {}", e);
            e
        })?;

        let mut scene = Scene::new(description.camera.clone(), keyframes);
        let mut names: HashMap<&str, NodeId> = HashMap::new();
        names.insert(ROOT_NAME, NodeId::ROOT);

        for node in &description.nodes {
            if names.contains_key(node.name.as_str()) {
                error!("Scene node name '{}' is used twice", node.name);
                return Err(SceneError::DuplicateName(node.name.clone()));
            }

            let parent = match node.parent.as_deref() {
                None => NodeId::ROOT,
                Some(parent) => *names.get(parent).ok_or_else(|| {
                    error!("Scene node '{}' names unknown parent '{}'", node.name, parent);
                    SceneError::UnknownParent {
                        node: node.name.clone(),
                        parent: parent.to_string(),
                    }
                })?,
            };

            if matches!(node.motion, Some(Motion::Keyframed { .. })) && scene.keyframes.is_empty() {
                error!("Scene node '{}' is keyframed but the scene has no keyframes", node.name);
                return Err(SceneError::InvalidDescription(format!(
                    "node '{}' uses a keyframed motion without keyframes",
                    node.name
                )));
            }

            let scene_node = self.build_node(node)?;
            let id = scene.graph.add_child(parent, scene_node)?;
            names.insert(node.name.as_str(), id);
        }

        if let Some(occluder) = &description.occluder {
            let node = *names.get(occluder.node.as_str()).ok_or_else(|| {
                error!("Occluder names unknown node '{}'", occluder.node);
                SceneError::UnknownNode(occluder.node.clone())
            })?;
            scene.occluder = Some(Occluder { node, radius: occluder.radius });
        }

        info!(
            "Initialized scene with {} nodes",
            scene.graph.total_children(scene.graph.root())
        );
        Ok(scene)
    }

    fn build_node(&mut self, node: &NodeDescription) -> SceneResult<SceneNode> {
        let kind = self.build_kind(&node.name, &node.kind)?;
        debug!("Scene node '{}' is a {}", node.name, kind.label());

        let mut scene_node = SceneNode::new(kind)
            .with_name(node.name.clone())
            .with_transform(Transform {
                position: node.position,
                rotation: node.rotation,
                scale: node.scale,
                reference_point: node.reference_point,
            });
        scene_node.motion = node.motion.clone();
        Ok(scene_node)
    }

    fn build_kind(&mut self, name: &str, spec: &NodeKindSpec) -> SceneResult<NodeKind> {
        let kind = match spec {
            NodeKindSpec::Group => NodeKind::group(),
            NodeKindSpec::Geometry { mesh } => NodeKind::Geometry {
                geometry: self.geometry(name, mesh)?,
            },
            NodeKindSpec::PointLight { light_id, color } => NodeKind::PointLight {
                light_id: *light_id,
                color: *color,
            },
            NodeKindSpec::SpotLight => NodeKind::SpotLight,
            NodeKindSpec::Ui { mesh, texture } => NodeKind::Ui {
                geometry: self.geometry(name, mesh)?,
                texture: self.texture(texture)?,
            },
            NodeKindSpec::NormalMapped { mesh, texture, normal_map } => NodeKind::NormalMapped {
                geometry: self.geometry(name, mesh)?,
                texture: self.texture(texture)?,
                normal_map: normal_map.as_deref().map(|path| self.texture(path)).transpose()?,
            },
        };
        Ok(kind)
    }

    fn geometry(&mut self, name: &str, source: &MeshSource) -> SceneResult<Option<GeometryRef>> {
        let mesh = match source {
            MeshSource::Cube {
                dimensions,
                texture_scale,
                tiling,
                inverted,
                texture_scale_3d,
            } => cube(*dimensions, *texture_scale, *tiling, *inverted, *texture_scale_3d),
            MeshSource::Sphere { radius, slices, layers } => sphere(*radius, *slices, *layers),
            MeshSource::Text {
                text,
                height_over_width,
                total_width,
            } => text_geometry(text, *height_over_width, *total_width),
            MeshSource::Model { path } => self.assets.load_model(path).map_err(|e| {
                error!("Failed to load model '{}' for node '{}': {}", path, name, e);
                e
            })?,
        };

        self.upload(name, &mesh)
    }

    fn upload(&mut self, name: &str, mesh: &Mesh) -> SceneResult<Option<GeometryRef>> {
        if mesh.is_empty() {
            warn!("Scene node '{}' has an empty mesh and will not be drawn", name);
            return Ok(None);
        }

        let index_count = u32::try_from(mesh.index_count())
            .map_err(|_| RenderError::ResourceCreationFailed(format!("mesh of '{name}' has too many indices")))?;
        let handle = self.backend.register_mesh(mesh).map_err(|e| {
            error!("Failed to upload mesh for node '{}': {}", name, e);
            e
        })?;

        Ok(Some(GeometryRef { mesh: handle, index_count }))
    }

    fn texture(&mut self, path: &str) -> SceneResult<TextureHandle> {
        if let Some(handle) = self.textures.get(path) {
            return Ok(*handle);
        }

        let image = self.assets.load_texture(path).map_err(|e| {
            error!("Failed to load texture '{}': {}", path, e);
            e
        })?;
        let handle = self.backend.upload_texture(&image)?;
        debug!("Texture '{}' uploaded as {:?}", path, handle);
        self.textures.insert(path.to_string(), handle);
        Ok(handle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animation::{Keyframe, KeyframeAction};
    use crate::assets::{ImageData, InMemoryAssets};
    use crate::scene::description::OccluderDescription;
    use crate::foundation::math::Vec3;
    use crate::render::backends::RecordingBackend;
    use crate::render::primitives::Vertex;

    fn triangle() -> Mesh {
        Mesh::new(vec![Vertex::default(); 3], vec![0, 1, 2])
    }

    fn sphere_node(name: &str) -> NodeDescription {
        NodeDescription::new(
            name,
            NodeKindSpec::Geometry {
                mesh: MeshSource::Sphere { radius: 1.0, slices: 4, layers: 4 },
            },
        )
    }

    #[test]
    fn test_builds_hierarchy_in_order() {
        let mut backend = RecordingBackend::new();
        let mut assets = InMemoryAssets::new();
        let description = SceneDescription {
            nodes: vec![
                NodeDescription::new("group", NodeKindSpec::Group),
                sphere_node("ball").with_parent("group"),
                NodeDescription::new(
                    "light",
                    NodeKindSpec::PointLight { light_id: 0, color: Vec3::new(1.0, 1.0, 1.0) },
                ),
            ],
            ..Default::default()
        };

        let scene = SceneBuilder::new(&mut backend, &mut assets).build(&description).unwrap();

        let group = scene.graph.find("group").unwrap();
        let ball = scene.graph.find("ball").unwrap();
        assert_eq!(scene.graph.children(NodeId::ROOT), &[group, scene.graph.find("light").unwrap()]);
        assert_eq!(scene.graph.children(group), &[ball]);
        assert_eq!(scene.graph.total_children(NodeId::ROOT), 3);

        let geometry = scene.graph.get(ball).unwrap().kind().geometry().unwrap();
        assert_eq!(geometry.index_count, 4 * 4 * 6);
        assert_eq!(backend.mesh_count(), 1);
    }

    #[test]
    fn test_unknown_parent_is_rejected() {
        let mut backend = RecordingBackend::new();
        let mut assets = InMemoryAssets::new();
        let description = SceneDescription {
            nodes: vec![sphere_node("ball").with_parent("later"), NodeDescription::new("later", NodeKindSpec::Group)],
            ..Default::default()
        };

        let result = SceneBuilder::new(&mut backend, &mut assets).build(&description);
        assert!(matches!(result, Err(SceneError::UnknownParent { .. })));
    }

    #[test]
    fn test_duplicate_and_reserved_names_are_rejected() {
        let mut backend = RecordingBackend::new();
        let mut assets = InMemoryAssets::new();

        let description = SceneDescription {
            nodes: vec![sphere_node("a"), sphere_node("a")],
            ..Default::default()
        };
        let result = SceneBuilder::new(&mut backend, &mut assets).build(&description);
        assert!(matches!(result, Err(SceneError::DuplicateName(name)) if name == "a"));

        let description = SceneDescription {
            nodes: vec![sphere_node(ROOT_NAME)],
            ..Default::default()
        };
        let result = SceneBuilder::new(&mut backend, &mut assets).build(&description);
        assert!(matches!(result, Err(SceneError::DuplicateName(_))));
    }

    #[test]
    fn test_textures_are_uploaded_once() {
        let mut backend = RecordingBackend::new();
        let mut assets = InMemoryAssets::new()
            .with_model("teapot.obj", triangle())
            .with_texture("brick.png", ImageData::solid_color(2, 2, [200, 80, 40, 255]))
            .with_texture("brick_normal.png", ImageData::solid_color(2, 2, [128, 128, 255, 255]));

        let model = MeshSource::Model { path: "teapot.obj".to_string() };
        let description = SceneDescription {
            nodes: vec![
                NodeDescription::new(
                    "wall",
                    NodeKindSpec::NormalMapped {
                        mesh: model.clone(),
                        texture: "brick.png".to_string(),
                        normal_map: Some("brick_normal.png".to_string()),
                    },
                ),
                NodeDescription::new(
                    "sign",
                    NodeKindSpec::Ui { mesh: model, texture: "brick.png".to_string() },
                ),
            ],
            ..Default::default()
        };

        let scene = SceneBuilder::new(&mut backend, &mut assets).build(&description).unwrap();
        assert_eq!(backend.texture_count(), 2);

        let wall = scene.graph.get(scene.graph.find("wall").unwrap()).unwrap();
        let sign = scene.graph.get(scene.graph.find("sign").unwrap()).unwrap();
        let (NodeKind::NormalMapped { texture: wall_texture, normal_map, .. }, NodeKind::Ui { texture: sign_texture, .. }) =
            (wall.kind(), sign.kind())
        else {
            panic!("unexpected node kinds");
        };
        assert_eq!(wall_texture, sign_texture);
        assert!(normal_map.is_some());
    }

    #[test]
    fn test_missing_asset_fails_the_build() {
        let mut backend = RecordingBackend::new();
        let mut assets = InMemoryAssets::new();
        let description = SceneDescription {
            nodes: vec![NodeDescription::new(
                "teapot",
                NodeKindSpec::Geometry { mesh: MeshSource::Model { path: "teapot.obj".to_string() } },
            )],
            ..Default::default()
        };

        let result = SceneBuilder::new(&mut backend, &mut assets).build(&description);
        assert!(matches!(result, Err(SceneError::Asset(_))));
    }

    #[test]
    fn test_empty_text_has_no_geometry() {
        let mut backend = RecordingBackend::new();
        let mut assets = InMemoryAssets::new();
        let description = SceneDescription {
            nodes: vec![NodeDescription::new(
                "label",
                NodeKindSpec::Geometry {
                    mesh: MeshSource::Text { text: String::new(), height_over_width: 2.0, total_width: 4.0 },
                },
            )],
            ..Default::default()
        };

        let scene = SceneBuilder::new(&mut backend, &mut assets).build(&description).unwrap();
        let label = scene.graph.get(scene.graph.find("label").unwrap()).unwrap();
        assert_eq!(label.kind().geometry(), None);
        assert_eq!(backend.mesh_count(), 0);
    }

    #[test]
    fn test_occluder_and_keyframes() {
        let mut backend = RecordingBackend::new();
        let mut assets = InMemoryAssets::new();

        let description = SceneDescription {
            nodes: vec![sphere_node("ball").with_motion(Motion::Keyframed { bottom: 0.0, top: 5.0 })],
            ..Default::default()
        };
        let result = SceneBuilder::new(&mut backend, &mut assets).build(&description);
        assert!(matches!(result, Err(SceneError::InvalidDescription(_))));

        let description = SceneDescription {
            keyframes: vec![
                Keyframe::new(0.0, KeyframeAction::Bottom),
                Keyframe::new(1.0, KeyframeAction::Top),
            ],
            occluder: Some(OccluderDescription { node: "ball".to_string(), radius: 3.0 }),
            nodes: vec![sphere_node("ball").with_motion(Motion::Keyframed { bottom: 0.0, top: 5.0 })],
            ..Default::default()
        };
        let scene = SceneBuilder::new(&mut backend, &mut assets).build(&description).unwrap();
        assert_eq!(scene.keyframes.len(), 2);
        assert_eq!(scene.occluder, Some(Occluder { node: scene.graph.find("ball").unwrap(), radius: 3.0 }));
    }
}
