//! The road network.

use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;

use super::edge::Edge;
use super::graph::{AdjacencyGraph, Graph, MutableGraph};
use super::id::{IdSpaceExhausted, UniqueIdGenerator};
use super::node::HasId;

/// A graph of road nodes that can be looked up by id.
///
/// Loaders obtain fresh ids from [`RoadGraph::generate_unique_node_id`] and
/// [`RoadGraph::generate_unique_edge_id`].
#[derive(Debug, Clone)]
pub struct RoadGraph<N, E> {
    graph: AdjacencyGraph<N, E>,
    by_id: HashMap<u32, N>,
    node_ids: UniqueIdGenerator,
    edge_ids: UniqueIdGenerator,
}

impl<N, E> Default for RoadGraph<N, E> {
    fn default() -> Self {
        Self {
            graph: AdjacencyGraph::default(),
            by_id: HashMap::new(),
            node_ids: UniqueIdGenerator::new(),
            edge_ids: UniqueIdGenerator::new(),
        }
    }
}

impl<N, E> RoadGraph<N, E>
where
    N: Copy + Eq + Hash + fmt::Debug + HasId,
    E: Edge<Node = N>,
{
    pub fn new() -> Self {
        Self::default()
    }

    pub fn generate_unique_node_id(&mut self) -> Result<u32, IdSpaceExhausted> {
        self.node_ids.generate()
    }

    pub fn generate_unique_edge_id(&mut self) -> Result<u32, IdSpaceExhausted> {
        self.edge_ids.generate()
    }

    pub fn node_by_id(&self, id: u32) -> Option<N> {
        self.by_id.get(&id).copied()
    }

    pub fn contains_node_with_id(&self, id: u32) -> bool {
        self.by_id.contains_key(&id)
    }
}

impl<N, E> Graph for RoadGraph<N, E>
where
    N: Copy + Eq + Hash + fmt::Debug + HasId,
    E: Edge<Node = N>,
{
    type Node = N;
    type Edge = E;

    fn nodes(&self) -> impl Iterator<Item = N> + '_ {
        self.graph.nodes()
    }

    fn edges(&self) -> impl Iterator<Item = E> + '_ {
        self.graph.edges()
    }

    fn contains_node(&self, node: N) -> bool {
        self.graph.contains_node(node)
    }

    fn outgoing_edges(&self, node: N) -> impl Iterator<Item = E> + '_ {
        self.graph.outgoing_edges(node)
    }

    fn incoming_edges(&self, node: N) -> impl Iterator<Item = E> + '_ {
        self.graph.incoming_edges(node)
    }

    fn size(&self) -> usize {
        self.graph.size()
    }

    fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    fn is_reversed(&self) -> bool {
        self.graph.is_reversed()
    }

    fn contains_edge(&self, edge: &E) -> bool {
        self.graph.contains_edge(edge)
    }
}

impl<N, E> MutableGraph for RoadGraph<N, E>
where
    N: Copy + Eq + Hash + fmt::Debug + HasId,
    E: Edge<Node = N>,
{
    fn add_node(&mut self, node: N) -> bool {
        let added = self.graph.add_node(node);
        if added {
            self.by_id.insert(node.id(), node);
        }
        added
    }

    fn add_edge(&mut self, edge: E) -> bool {
        self.add_node(edge.source());
        self.add_node(edge.destination());
        self.graph.add_edge(edge)
    }

    fn remove_node(&mut self, node: N) -> bool {
        let removed = self.graph.remove_node(node);
        if removed {
            self.by_id.remove(&node.id());
        }
        removed
    }

    fn remove_edge(&mut self, edge: &E) -> bool {
        self.graph.remove_edge(edge)
    }

    fn reverse(&mut self) {
        self.graph.reverse();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ModeSet, RoadEdge, RoadNode};

    fn sample() -> RoadGraph<RoadNode, RoadEdge> {
        let mut graph = RoadGraph::new();
        let a = RoadNode::new(graph.generate_unique_node_id().unwrap(), 48.0, 7.80);
        let b = RoadNode::new(graph.generate_unique_node_id().unwrap(), 48.0, 7.81);
        let id = graph.generate_unique_edge_id().unwrap();
        graph.add_edge(RoadEdge::new(id, a, b, 750.0, 50.0, ModeSet::all()));
        graph
    }

    #[test]
    fn nodes_from_edges_are_indexed() {
        let graph = sample();
        assert_eq!(graph.size(), 2);
        assert!(graph.contains_node_with_id(0));
        assert_eq!(graph.node_by_id(1).map(|n| n.id), Some(1));
        assert!(graph.node_by_id(2).is_none());
    }

    #[test]
    fn removing_a_node_drops_the_index_entry() {
        let mut graph = sample();
        let node = graph.node_by_id(0).unwrap();
        assert!(graph.remove_node(node));
        assert!(!graph.contains_node_with_id(0));
        assert_eq!(graph.edge_count(), 0);
    }

    #[test]
    fn ids_are_unique() {
        let mut graph = sample();
        assert_eq!(graph.generate_unique_node_id(), Ok(2));
        assert_eq!(graph.generate_unique_edge_id(), Ok(1));
    }
}
