//! Render dispatcher
//!
//! Walks a propagated scene graph depth-first, parents before children, and
//! turns every node into uniform updates and at most one draw. Draw order is
//! tree order. Nothing on this path can fail: nodes without geometry are
//! skipped, and lights past the configured limit or outside the shader's
//! array are ignored.

use std::collections::HashMap;

use log::trace;

use crate::foundation::math::{Mat4Ext, Vec3};
use crate::render::api::{
    uniforms, ProgramHandle, RenderBackend, UniformLocation, UniformValue,
};
use crate::scene::{GeometryRef, NodeId, NodeKind, SceneGraph};

/// Uniforms shared by every node of a frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameUniforms {
    /// Camera position in world space
    pub camera_position: Vec3,
    /// Shadow occluder world position and radius
    pub occluder: Option<(Vec3, f32)>,
}

/// Counters for one dispatch
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchStats {
    /// Nodes visited
    pub nodes_visited: u32,
    /// Indexed draws issued
    pub draw_calls: u32,
    /// Indices submitted across all draws
    pub indices_submitted: u64,
    /// Point lights bound into the light array
    pub lights_bound: u32,
    /// Point lights past the light limit or undeclared by the shader
    pub lights_skipped: u32,
}

#[derive(Debug, Clone, Copy)]
struct LightSlots {
    position: Option<UniformLocation>,
    color: Option<UniformLocation>,
}

/// Submits a scene graph to a render backend
///
/// Light uniform locations are resolved by name once per program and light
/// id, then cached. Lights with an id at or above `max_point_lights` are
/// never looked up.
#[derive(Debug, Default)]
pub struct RenderDispatcher {
    light_slots: HashMap<(ProgramHandle, u32), LightSlots>,
    max_point_lights: Option<u32>,
}

impl RenderDispatcher {
    /// Create a dispatcher with an empty location cache and no light limit
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a dispatcher binding only light ids below `max_point_lights`
    pub fn with_max_point_lights(max_point_lights: u32) -> Self {
        Self {
            max_point_lights: Some(max_point_lights),
            ..Self::default()
        }
    }

    /// Light limit, `None` when only the shader bounds the light array
    pub fn max_point_lights(&self) -> Option<u32> {
        self.max_point_lights
    }

    /// Render the whole graph from its root with `program` current
    pub fn render_scene(
        &mut self,
        backend: &mut dyn RenderBackend,
        program: ProgramHandle,
        graph: &SceneGraph,
        frame: &FrameUniforms,
    ) -> DispatchStats {
        self.render(backend, program, graph, graph.root(), frame)
    }

    /// Render `node` and its subtree
    pub fn render(
        &mut self,
        backend: &mut dyn RenderBackend,
        program: ProgramHandle,
        graph: &SceneGraph,
        node: NodeId,
        frame: &FrameUniforms,
    ) -> DispatchStats {
        let mut stats = DispatchStats::default();
        self.visit(backend, program, graph, node, frame, &mut stats);
        trace!(
            "Dispatched {} nodes: {} draws, {} lights",
            stats.nodes_visited,
            stats.draw_calls,
            stats.lights_bound
        );
        stats
    }

    fn visit(
        &mut self,
        backend: &mut dyn RenderBackend,
        program: ProgramHandle,
        graph: &SceneGraph,
        id: NodeId,
        frame: &FrameUniforms,
        stats: &mut DispatchStats,
    ) {
        let Some(node) = graph.get(id) else {
            return;
        };
        stats.nodes_visited += 1;

        let world = node.world_matrix();
        backend.set_uniform(uniforms::MVP, UniformValue::Mat4(*node.view_projected_matrix()));
        backend.set_uniform(uniforms::MODEL, UniformValue::Mat4(*world));
        backend.set_uniform(uniforms::NORMAL_MATRIX, UniformValue::Mat3(world.normal_matrix()));
        backend.set_uniform(uniforms::CAMERA_POSITION, UniformValue::Vec3(frame.camera_position));
        if let Some((position, radius)) = frame.occluder {
            backend.set_uniform(uniforms::OCCLUDER_POSITION, UniformValue::Vec3(position));
            backend.set_uniform(uniforms::OCCLUDER_RADIUS, UniformValue::Float(radius));
        }
        backend.set_uniform(uniforms::USE_TEXTURE, UniformValue::Bool(false));
        backend.set_uniform(uniforms::USE_NORMAL_MAP, UniformValue::Bool(false));

        match node.kind() {
            NodeKind::Geometry { geometry } => draw(backend, *geometry, stats),
            NodeKind::PointLight { light_id, color } => {
                if self.max_point_lights.is_some_and(|max| *light_id >= max) {
                    trace!("Light {} is past the light limit", light_id);
                    stats.lights_skipped += 1;
                } else {
                    self.bind_light(backend, program, *light_id, world.transform_origin(), *color, stats);
                }
            }
            NodeKind::SpotLight => {}
            NodeKind::Ui { geometry, texture } => {
                backend.set_uniform(uniforms::USE_TEXTURE, UniformValue::Bool(true));
                backend.bind_texture(uniforms::BASE_TEXTURE_UNIT, *texture);
                draw(backend, *geometry, stats);
            }
            NodeKind::NormalMapped { geometry, texture, normal_map } => {
                backend.set_uniform(uniforms::USE_NORMAL_MAP, UniformValue::Bool(true));
                backend.bind_texture(uniforms::BASE_TEXTURE_UNIT, *texture);
                if let Some(normal_map) = normal_map {
                    backend.bind_texture(uniforms::NORMAL_MAP_UNIT, *normal_map);
                }
                draw(backend, *geometry, stats);
            }
        }

        for &child in node.children() {
            self.visit(backend, program, graph, child, frame, stats);
        }
    }

    fn bind_light(
        &mut self,
        backend: &mut dyn RenderBackend,
        program: ProgramHandle,
        light_id: u32,
        position: Vec3,
        color: Vec3,
        stats: &mut DispatchStats,
    ) {
        let slots = self.resolve_lights(backend, program, light_id);
        if slots.position.is_none() && slots.color.is_none() {
            stats.lights_skipped += 1;
            return;
        }
        if let Some(location) = slots.position {
            backend.set_uniform(location, UniformValue::Vec3(position));
        }
        if let Some(location) = slots.color {
            backend.set_uniform(location, UniformValue::Vec3(color));
        }
        stats.lights_bound += 1;
    }

    fn resolve_lights(&mut self, backend: &dyn RenderBackend, program: ProgramHandle, light_id: u32) -> LightSlots {
        *self.light_slots.entry((program, light_id)).or_insert_with(|| {
            let slots = LightSlots {
                position: backend.uniform_location(program, &uniforms::light_position_name(light_id)),
                color: backend.uniform_location(program, &uniforms::light_color_name(light_id)),
            };
            if slots.position.is_none() {
                trace!("Program {:?} has no light slot {}", program, light_id);
            }
            slots
        })
    }
}

fn draw(backend: &mut dyn RenderBackend, geometry: Option<GeometryRef>, stats: &mut DispatchStats) {
    let Some(GeometryRef { mesh, index_count }) = geometry else {
        return;
    };
    backend.draw_indexed(mesh, index_count);
    stats.draw_calls += 1;
    stats.indices_submitted += u64::from(index_count);
}
