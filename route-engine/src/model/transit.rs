//! The time-expanded transit network.
//!
//! Every arrival and departure event is its own [`TransitNode`]. Events
//! at the same place are grouped into a [`TransitStop`], whose arrival
//! nodes are where road hubs get linked in.
//!
//! [`TransitNode`]: super::TransitNode

use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;

use super::edge::Edge;
use super::geo::Coordinates;
use super::graph::{AdjacencyGraph, Graph, MutableGraph};
use super::id::{IdSpaceExhausted, UniqueIdGenerator};
use super::node::HasId;

/// A node together with the time of its event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodeTime<N> {
    pub node: N,
    /// Seconds since midnight.
    pub time: u32,
}

impl<N> NodeTime<N> {
    pub fn new(node: N, time: u32) -> Self {
        Self { node, time }
    }
}

/// All arrival events at one physical stop, ordered by time.
#[derive(Debug, Clone)]
pub struct TransitStop<N> {
    pub coordinates: Coordinates,
    arrival_nodes: Vec<NodeTime<N>>,
}

impl<N> TransitStop<N> {
    pub fn new(coordinates: Coordinates, mut arrival_nodes: Vec<NodeTime<N>>) -> Self {
        arrival_nodes.sort_by_key(|entry| entry.time);
        Self {
            coordinates,
            arrival_nodes,
        }
    }

    pub fn arrival_nodes(&self) -> &[NodeTime<N>] {
        &self.arrival_nodes
    }
}

/// A graph of transit events plus the stops they belong to.
#[derive(Debug, Clone)]
pub struct TransitGraph<N, E> {
    graph: AdjacencyGraph<N, E>,
    by_id: HashMap<u32, N>,
    stops: Vec<TransitStop<N>>,
    node_ids: UniqueIdGenerator,
    edge_ids: UniqueIdGenerator,
}

impl<N, E> Default for TransitGraph<N, E> {
    fn default() -> Self {
        Self {
            graph: AdjacencyGraph::default(),
            by_id: HashMap::new(),
            stops: Vec::new(),
            node_ids: UniqueIdGenerator::new(),
            edge_ids: UniqueIdGenerator::new(),
        }
    }
}

impl<N, E> TransitGraph<N, E>
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

    pub fn add_stop(&mut self, stop: TransitStop<N>) {
        self.stops.push(stop);
    }

    pub fn stops(&self) -> &[TransitStop<N>] {
        &self.stops
    }
}

impl<N, E> Graph for TransitGraph<N, E>
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

    fn size_information(&self) -> String {
        format!(
            "#nodes: {}, #edges: {}, #stops: {}",
            self.size(),
            self.edge_count(),
            self.stops.len()
        )
    }
}

impl<N, E> MutableGraph for TransitGraph<N, E>
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
