//! Arena scene graph
//!
//! Nodes live in one `Vec` and refer to each other by [`NodeId`]. The root is
//! always `NodeId(0)`. Topology is static: nodes are appended and attached
//! once, never removed or moved to another parent.

use super::node::{NodeId, NodeKind, SceneNode};
use super::{SceneError, SceneResult};

/// Name given to the root node
pub const ROOT_NAME: &str = "root";

/// Tree of [`SceneNode`]s stored in an arena
#[derive(Debug, Clone)]
pub struct SceneGraph {
    nodes: Vec<SceneNode>,
}

impl Default for SceneGraph {
    fn default() -> Self {
        Self::new()
    }
}

impl SceneGraph {
    /// Create a graph holding only an empty root group
    pub fn new() -> Self {
        Self::with_root(SceneNode::new(NodeKind::group()).with_name(ROOT_NAME))
    }

    /// Create a graph around a caller supplied root
    pub fn with_root(mut root: SceneNode) -> Self {
        root.parent = None;
        root.children.clear();
        Self { nodes: vec![root] }
    }

    /// The root node id
    pub fn root(&self) -> NodeId {
        NodeId::ROOT
    }

    /// Number of nodes, detached ones included
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Always false; a graph has at least its root
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Append a detached node
    pub fn add_node(&mut self, mut node: SceneNode) -> NodeId {
        node.parent = None;
        node.children.clear();
        self.nodes.push(node);
        NodeId(self.nodes.len() - 1)
    }

    /// Append a node and attach it under `parent`
    pub fn add_child(&mut self, parent: NodeId, node: SceneNode) -> SceneResult<NodeId> {
        if self.get(parent).is_none() {
            return Err(SceneError::MissingNode(parent));
        }
        let child = self.add_node(node);
        self.attach(parent, child)?;
        Ok(child)
    }

    /// Make `child` the last child of `parent`
    ///
    /// Rejected when either node is missing, when `child` already has a
    /// parent or is the root, or when the link would close a cycle.
    pub fn attach(&mut self, parent: NodeId, child: NodeId) -> SceneResult<()> {
        if self.get(parent).is_none() {
            return Err(SceneError::MissingNode(parent));
        }
        let Some(child_node) = self.get(child) else {
            return Err(SceneError::MissingNode(child));
        };

        if child == NodeId::ROOT {
            return Err(SceneError::RootAttach { parent });
        }
        if let Some(existing) = child_node.parent {
            return Err(SceneError::AlreadyAttached { child, parent: existing });
        }

        let mut ancestor = Some(parent);
        while let Some(id) = ancestor {
            if id == child {
                return Err(SceneError::Cycle { parent, child });
            }
            ancestor = self.nodes[id.index()].parent;
        }

        self.nodes[child.index()].parent = Some(parent);
        self.nodes[parent.index()].children.push(child);
        Ok(())
    }

    /// Borrow a node
    pub fn get(&self, id: NodeId) -> Option<&SceneNode> {
        self.nodes.get(id.index())
    }

    /// Borrow a node mutably
    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut SceneNode> {
        self.nodes.get_mut(id.index())
    }

    /// Children of a node in draw order; empty for unknown ids
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        match self.get(id) {
            Some(node) => node.children(),
            None => &[],
        }
    }

    /// First node with the given name
    pub fn find(&self, name: &str) -> Option<NodeId> {
        self.nodes
            .iter()
            .position(|node| node.name.as_deref() == Some(name))
            .map(NodeId)
    }

    /// Number of nodes below `id`, at any depth
    pub fn total_children(&self, id: NodeId) -> usize {
        self.children(id)
            .iter()
            .map(|&child| 1 + self.total_children(child))
            .sum()
    }

    /// Node ids reachable from the root, parents before children
    pub fn pre_order(&self) -> Vec<NodeId> {
        let mut order = Vec::with_capacity(self.nodes.len());
        let mut stack = vec![NodeId::ROOT];
        while let Some(id) = stack.pop() {
            order.push(id);
            stack.extend(self.children(id).iter().rev());
        }
        order
    }

    /// Every node with its id, in arena order
    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &SceneNode)> {
        self.nodes.iter().enumerate().map(|(i, node)| (NodeId(i), node))
    }

    /// Every node mutably, in arena order
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (NodeId, &mut SceneNode)> {
        self.nodes.iter_mut().enumerate().map(|(i, node)| (NodeId(i), node))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn group(name: &str) -> SceneNode {
        SceneNode::new(NodeKind::group()).with_name(name)
    }

    #[test]
    fn test_new_graph_has_named_root() {
        let graph = SceneGraph::new();
        assert_eq!(graph.len(), 1);
        assert_eq!(graph.find(ROOT_NAME), Some(NodeId::ROOT));
        assert_eq!(graph.total_children(graph.root()), 0);
    }

    #[test]
    fn test_children_keep_insertion_order() {
        let mut graph = SceneGraph::new();
        let a = graph.add_child(NodeId::ROOT, group("a")).unwrap();
        let b = graph.add_child(NodeId::ROOT, group("b")).unwrap();
        let c = graph.add_child(a, group("c")).unwrap();

        assert_eq!(graph.children(NodeId::ROOT), &[a, b]);
        assert_eq!(graph.get(c).unwrap().parent(), Some(a));
        assert_eq!(graph.total_children(NodeId::ROOT), 3);
        assert_eq!(graph.pre_order(), vec![NodeId::ROOT, a, c, b]);
    }

    #[test]
    fn test_attach_rejects_second_parent() {
        let mut graph = SceneGraph::new();
        let a = graph.add_child(NodeId::ROOT, group("a")).unwrap();
        let b = graph.add_child(NodeId::ROOT, group("b")).unwrap();

        let result = graph.attach(a, b);
        assert!(matches!(result, Err(SceneError::AlreadyAttached { child, parent }) if child == b && parent == NodeId::ROOT));
        assert!(graph.children(a).is_empty());
    }

    #[test]
    fn test_attach_rejects_missing_nodes() {
        let mut graph = SceneGraph::new();
        let detached = graph.add_node(group("x"));
        assert!(matches!(graph.attach(NodeId(42), detached), Err(SceneError::MissingNode(NodeId(42)))));
        assert!(matches!(graph.attach(NodeId::ROOT, NodeId(42)), Err(SceneError::MissingNode(_))));
        assert!(graph.add_child(NodeId(42), group("y")).is_err());
    }

    #[test]
    fn test_attach_rejects_cycles_and_root() {
        let mut graph = SceneGraph::new();
        let a = graph.add_node(group("a"));
        let b = graph.add_node(group("b"));
        graph.attach(a, b).unwrap();

        assert!(matches!(graph.attach(b, a), Err(SceneError::Cycle { .. })));
        assert!(matches!(graph.attach(a, a), Err(SceneError::Cycle { .. })));
        assert!(matches!(graph.attach(a, NodeId::ROOT), Err(SceneError::RootAttach { parent }) if parent == a));
        assert!(graph.get(NodeId::ROOT).unwrap().parent().is_none());
    }

    #[test]
    fn test_detached_nodes_are_not_traversed() {
        let mut graph = SceneGraph::new();
        graph.add_node(group("loose"));
        assert_eq!(graph.pre_order(), vec![NodeId::ROOT]);
        assert_eq!(graph.len(), 2);
    }
}
