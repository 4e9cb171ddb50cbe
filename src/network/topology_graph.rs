use std::collections::HashMap;

use petgraph::{
    graph::{DiGraph, NodeIndex},
    visit::EdgeRef,
};

use crate::network::{
    autonomous_system::{AsId, AsNode, NodeType},
    edge::AdjacencyEdge,
};

/// AS-level topology seen from one router.
///
/// Wraps a petgraph digraph; `node_id_to_index_map` keeps exactly one node per AS id.
#[derive(Debug, Clone)]
pub struct TopologyGraph {
    graph: DiGraph<AsNode, AdjacencyEdge>,
    node_id_to_index_map: HashMap<AsId, NodeIndex>,
    #[allow(dead_code)]
    local_as: AsId,
}

impl TopologyGraph {
    /// Creates a graph containing only the local AS.
    pub fn with_local_as(local_as: AsId) -> Self {
        let mut graph = DiGraph::new();
        let mut node_id_to_index_map = HashMap::new();
        let index = graph.add_node(AsNode::new(local_as.clone(), NodeType::Local));
        node_id_to_index_map.insert(local_as.clone(), index);
        Self {
            graph,
            node_id_to_index_map,
            local_as,
        }
    }

    /// Returns the index of `id`, inserting an inferred node the first time it is seen.
    pub(crate) fn ensure_node(&mut self, id: &AsId) -> NodeIndex {
        if let Some(&index) = self.node_id_to_index_map.get(id) {
            return index;
        }
        let index = self
            .graph
            .add_node(AsNode::new(id.clone(), NodeType::Inferred));
        self.node_id_to_index_map.insert(id.clone(), index);
        index
    }

    /// Adds `source -> destination`. Adding the same ordered pair again is a no-op.
    pub(crate) fn add_adjacency(&mut self, source: &AsId, destination: &AsId) {
        let src_index = self.ensure_node(source);
        let dest_index = self.ensure_node(destination);
        let edge = AdjacencyEdge::new(source.clone(), destination.clone());
        self.graph.update_edge(src_index, dest_index, edge);
    }

    pub(crate) fn attribute_prefix(&mut self, origin: &AsId, prefix: &str) {
        let index = self.ensure_node(origin);
        self.graph[index].prefixes.push(prefix.to_string());
    }

    #[allow(dead_code)]
    pub fn local_as(&self) -> &AsId {
        &self.local_as
    }

    #[allow(dead_code)]
    pub fn node(&self, id: &AsId) -> Option<&AsNode> {
        self.node_id_to_index_map
            .get(id)
            .map(|&index| &self.graph[index])
    }

    /// Nodes in insertion order, local AS first.
    pub fn nodes(&self) -> impl Iterator<Item = &AsNode> {
        self.graph.node_weights()
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn edges(&self) -> impl Iterator<Item = &AdjacencyEdge> {
        self.graph.edge_weights()
    }

    #[allow(dead_code)]
    pub fn has_edge(&self, source: &AsId, destination: &AsId) -> bool {
        match (
            self.node_id_to_index_map.get(source),
            self.node_id_to_index_map.get(destination),
        ) {
            (Some(&a), Some(&b)) => self.graph.contains_edge(a, b),
            _ => false,
        }
    }

    #[allow(dead_code)]
    pub fn prefixes(&self, id: &AsId) -> &[String] {
        self.node(id).map(|n| n.prefixes.as_slice()).unwrap_or(&[])
    }

    /// Index pairs of every edge, for layout algorithms that work on dense indices.
    pub fn index_edges(&self) -> Vec<(usize, usize)> {
        self.graph
            .edge_references()
            .map(|e| (e.source().index(), e.target().index()))
            .collect()
    }
}
