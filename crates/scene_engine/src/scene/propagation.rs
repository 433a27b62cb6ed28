//! Transform propagation
//!
//! Walks the tree depth-first, parents before children, composing each
//! node's local matrix onto its parent's world matrix.

use log::trace;

use super::graph::SceneGraph;
use super::node::NodeId;
use crate::foundation::math::Mat4;

/// Recompute derived matrices for `node` and everything below it
///
/// ```text
/// world_matrix          = accumulated * local
/// view_projected_matrix = view_projection * accumulated * local
/// ```
///
/// Children receive the node's world matrix as their accumulated transform.
/// Unknown ids are ignored.
pub fn propagate(graph: &mut SceneGraph, node: NodeId, accumulated: &Mat4, view_projection: &Mat4) {
    let Some(scene_node) = graph.get_mut(node) else {
        return;
    };

    let local = scene_node.local_matrix();
    let world = accumulated * local;
    scene_node.world_matrix = world;
    scene_node.view_projected_matrix = view_projection * accumulated * local;

    let child_count = graph.children(node).len();
    for i in 0..child_count {
        let child = graph.children(node)[i];
        propagate(graph, child, &world, view_projection);
    }
}

/// Propagate the whole tree from the root with an identity parent
pub fn propagate_scene(graph: &mut SceneGraph, view_projection: &Mat4) {
    trace!("Propagating transforms through {} nodes", graph.len());
    propagate(graph, graph.root(), &Mat4::identity(), view_projection);
}
