//! Graph abstractions and the adjacency storage shared by all concrete
//! graphs.
//!
//! Reversal comes in two forms. [`MutableGraph::reverse`] flips a graph in
//! place in O(1); edges are stored in their original orientation and
//! flipped on the way out. [`Reversed`] is a read-only view with the
//! opposite orientation, which can be shared between threads while the
//! underlying graph is read concurrently.

use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;

use super::edge::Edge;

/// Read access to a directed graph.
pub trait Graph {
    type Node: Copy + Eq + Hash + fmt::Debug;
    type Edge: Edge<Node = Self::Node>;

    /// All nodes, in a stable order.
    fn nodes(&self) -> impl Iterator<Item = Self::Node> + '_;

    /// All edges, in the current orientation.
    fn edges(&self) -> impl Iterator<Item = Self::Edge> + '_;

    fn contains_node(&self, node: Self::Node) -> bool;

    /// Edges leaving `node`. Empty for unknown nodes.
    fn outgoing_edges(&self, node: Self::Node) -> impl Iterator<Item = Self::Edge> + '_;

    /// Edges entering `node`. Empty for unknown nodes.
    fn incoming_edges(&self, node: Self::Node) -> impl Iterator<Item = Self::Edge> + '_;

    /// Number of nodes.
    fn size(&self) -> usize;

    fn edge_count(&self) -> usize;

    fn is_reversed(&self) -> bool;

    fn contains_edge(&self, edge: &Self::Edge) -> bool {
        self.outgoing_edges(edge.source()).any(|candidate| candidate == *edge)
    }

    /// A one-line human readable summary.
    fn size_information(&self) -> String {
        format!("#nodes: {}, #edges: {}", self.size(), self.edge_count())
    }
}

/// Population and orientation changes.
///
/// Edges passed in and out are always in the graph's current orientation.
pub trait MutableGraph: Graph {
    /// Returns false if the node was already present.
    fn add_node(&mut self, node: Self::Node) -> bool;

    /// Adds the edge and, if missing, its endpoints. Returns false if the
    /// edge was already present.
    fn add_edge(&mut self, edge: Self::Edge) -> bool;

    /// Removes the node together with every edge touching it.
    fn remove_node(&mut self, node: Self::Node) -> bool;

    fn remove_edge(&mut self, edge: &Self::Edge) -> bool;

    /// Flips source and destination of every edge. Its own inverse.
    ///
    /// Must not be called while other threads read the graph; use
    /// [`Reversed`] for that.
    fn reverse(&mut self);

    /// Add many nodes, returning how many were new.
    fn add_nodes(&mut self, nodes: impl IntoIterator<Item = Self::Node>) -> usize {
        nodes.into_iter().filter(|node| self.add_node(*node)).count()
    }

    /// Add many edges, returning how many were new.
    fn add_edges(&mut self, edges: impl IntoIterator<Item = Self::Edge>) -> usize {
        edges
            .into_iter()
            .map(|edge| self.add_edge(edge))
            .filter(|added| *added)
            .count()
    }
}

/// Node list plus incoming and outgoing edge lists per node.
#[derive(Debug, Clone)]
pub struct AdjacencyGraph<N, E> {
    nodes: Vec<N>,
    positions: HashMap<N, usize>,
    /// Edges in their original orientation, keyed by original source.
    outgoing: HashMap<N, Vec<E>>,
    /// Edges in their original orientation, keyed by original destination.
    incoming: HashMap<N, Vec<E>>,
    edge_count: usize,
    reversed: bool,
}

impl<N, E> Default for AdjacencyGraph<N, E> {
    fn default() -> Self {
        Self {
            nodes: Vec::new(),
            positions: HashMap::new(),
            outgoing: HashMap::new(),
            incoming: HashMap::new(),
            edge_count: 0,
            reversed: false,
        }
    }
}

impl<N, E> AdjacencyGraph<N, E>
where
    N: Copy + Eq + Hash + fmt::Debug,
    E: Edge<Node = N>,
{
    pub fn new() -> Self {
        Self::default()
    }

    /// Translate between the current orientation and the stored one.
    /// The translation is its own inverse.
    fn oriented(&self, edge: &E) -> E {
        if self.reversed {
            edge.reversed()
        } else {
            edge.clone()
        }
    }

    fn stored_lists(&self, node: N, outgoing: bool) -> impl Iterator<Item = E> + '_ {
        let lists = if outgoing != self.reversed {
            &self.outgoing
        } else {
            &self.incoming
        };
        lists
            .get(&node)
            .into_iter()
            .flatten()
            .map(move |edge| self.oriented(edge))
    }
}

/// Remove one occurrence of `edge` from the list stored under `key`,
/// dropping the list once it is empty.
pub(super) fn detach<N: Eq + Hash, E: PartialEq>(
    lists: &mut HashMap<N, Vec<E>>,
    key: N,
    edge: &E,
) -> bool {
    let Some(list) = lists.get_mut(&key) else {
        return false;
    };
    let Some(position) = list.iter().position(|candidate| candidate == edge) else {
        return false;
    };
    list.swap_remove(position);
    if list.is_empty() {
        lists.remove(&key);
    }
    true
}

impl<N, E> Graph for AdjacencyGraph<N, E>
where
    N: Copy + Eq + Hash + fmt::Debug,
    E: Edge<Node = N>,
{
    type Node = N;
    type Edge = E;

    fn nodes(&self) -> impl Iterator<Item = N> + '_ {
        self.nodes.iter().copied()
    }

    fn edges(&self) -> impl Iterator<Item = E> + '_ {
        self.nodes
            .iter()
            .flat_map(move |node| self.outgoing_edges(*node))
    }

    fn contains_node(&self, node: N) -> bool {
        self.positions.contains_key(&node)
    }

    fn outgoing_edges(&self, node: N) -> impl Iterator<Item = E> + '_ {
        self.stored_lists(node, true)
    }

    fn incoming_edges(&self, node: N) -> impl Iterator<Item = E> + '_ {
        self.stored_lists(node, false)
    }

    fn size(&self) -> usize {
        self.nodes.len()
    }

    fn edge_count(&self) -> usize {
        self.edge_count
    }

    fn is_reversed(&self) -> bool {
        self.reversed
    }

    fn contains_edge(&self, edge: &E) -> bool {
        let stored = self.oriented(edge);
        self.outgoing
            .get(&stored.source())
            .is_some_and(|list| list.contains(&stored))
    }
}

impl<N, E> MutableGraph for AdjacencyGraph<N, E>
where
    N: Copy + Eq + Hash + fmt::Debug,
    E: Edge<Node = N>,
{
    fn add_node(&mut self, node: N) -> bool {
        if self.positions.contains_key(&node) {
            return false;
        }
        self.positions.insert(node, self.nodes.len());
        self.nodes.push(node);
        true
    }

    fn add_edge(&mut self, edge: E) -> bool {
        let stored = self.oriented(&edge);
        let (source, destination) = (stored.source(), stored.destination());
        if self
            .outgoing
            .get(&source)
            .is_some_and(|list| list.contains(&stored))
        {
            return false;
        }
        self.add_node(source);
        self.add_node(destination);
        self.incoming
            .entry(destination)
            .or_default()
            .push(stored.clone());
        self.outgoing.entry(source).or_default().push(stored);
        self.edge_count += 1;
        true
    }

    fn remove_node(&mut self, node: N) -> bool {
        let Some(position) = self.positions.remove(&node) else {
            return false;
        };
        self.nodes.swap_remove(position);
        if let Some(moved) = self.nodes.get(position) {
            self.positions.insert(*moved, position);
        }

        // Self-loops are detached from `incoming` in the first pass, so
        // every edge is counted exactly once.
        for edge in self.outgoing.remove(&node).unwrap_or_default() {
            detach(&mut self.incoming, edge.destination(), &edge);
            self.edge_count -= 1;
        }
        for edge in self.incoming.remove(&node).unwrap_or_default() {
            detach(&mut self.outgoing, edge.source(), &edge);
            self.edge_count -= 1;
        }
        true
    }

    fn remove_edge(&mut self, edge: &E) -> bool {
        let stored = self.oriented(edge);
        if !detach(&mut self.outgoing, stored.source(), &stored) {
            return false;
        }
        detach(&mut self.incoming, stored.destination(), &stored);
        self.edge_count -= 1;
        true
    }

    fn reverse(&mut self) {
        self.reversed = !self.reversed;
    }
}

/// Read-only view of a graph with every edge flipped.
///
/// # Examples
///
/// ```
/// use route_engine::model::{AdjacencyGraph, BasicEdge, BasicNode, Graph, MutableGraph, Reversed};
///
/// let mut graph: AdjacencyGraph<BasicNode, BasicEdge<BasicNode>> = AdjacencyGraph::new();
/// graph.add_edge(BasicEdge::new(BasicNode(1), BasicNode(2), 4.0));
///
/// let reversed = Reversed::new(&graph);
/// assert_eq!(reversed.outgoing_edges(BasicNode(2)).count(), 1);
/// assert_eq!(reversed.outgoing_edges(BasicNode(1)).count(), 0);
/// ```
#[derive(Debug)]
pub struct Reversed<'a, G> {
    graph: &'a G,
}

impl<'a, G> Reversed<'a, G> {
    pub fn new(graph: &'a G) -> Self {
        Self { graph }
    }
}

impl<G> Clone for Reversed<'_, G> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<G> Copy for Reversed<'_, G> {}

impl<G: Graph> Graph for Reversed<'_, G> {
    type Node = G::Node;
    type Edge = G::Edge;

    fn nodes(&self) -> impl Iterator<Item = G::Node> + '_ {
        self.graph.nodes()
    }

    fn edges(&self) -> impl Iterator<Item = G::Edge> + '_ {
        self.graph.edges().map(|edge| edge.reversed())
    }

    fn contains_node(&self, node: G::Node) -> bool {
        self.graph.contains_node(node)
    }

    fn outgoing_edges(&self, node: G::Node) -> impl Iterator<Item = G::Edge> + '_ {
        self.graph.incoming_edges(node).map(|edge| edge.reversed())
    }

    fn incoming_edges(&self, node: G::Node) -> impl Iterator<Item = G::Edge> + '_ {
        self.graph.outgoing_edges(node).map(|edge| edge.reversed())
    }

    fn size(&self) -> usize {
        self.graph.size()
    }

    fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    fn is_reversed(&self) -> bool {
        !self.graph.is_reversed()
    }

    fn contains_edge(&self, edge: &G::Edge) -> bool {
        self.graph.contains_edge(&edge.reversed())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{BasicEdge, BasicNode};

    type TestGraph = AdjacencyGraph<BasicNode, BasicEdge<BasicNode>>;

    fn edge(source: u32, destination: u32, cost: f64) -> BasicEdge<BasicNode> {
        BasicEdge::new(BasicNode(source), BasicNode(destination), cost)
    }

    fn triangle() -> TestGraph {
        let mut graph = TestGraph::new();
        graph.add_edge(edge(1, 2, 1.0));
        graph.add_edge(edge(2, 3, 2.0));
        graph.add_edge(edge(3, 1, 3.0));
        graph
    }

    fn sorted_targets(graph: &impl Graph<Node = BasicNode>, node: u32) -> Vec<u32> {
        let mut targets: Vec<u32> = graph
            .outgoing_edges(BasicNode(node))
            .map(|e| e.destination().0)
            .collect();
        targets.sort();
        targets
    }

    #[test]
    fn add_edge_adds_endpoints() {
        let graph = triangle();
        assert_eq!(graph.size(), 3);
        assert_eq!(graph.edge_count(), 3);
        assert!(graph.contains_node(BasicNode(3)));
        assert_eq!(graph.size_information(), "#nodes: 3, #edges: 3");
    }

    #[test]
    fn add_edge_is_idempotent() {
        let mut graph = triangle();
        assert!(!graph.add_edge(edge(1, 2, 1.0)));
        assert!(!graph.add_node(BasicNode(1)));
        assert_eq!(graph.edge_count(), 3);
        assert_eq!(graph.outgoing_edges(BasicNode(1)).count(), 1);
    }

    #[test]
    fn unknown_node_has_no_edges() {
        let graph = triangle();
        assert_eq!(graph.outgoing_edges(BasicNode(42)).count(), 0);
        assert_eq!(graph.incoming_edges(BasicNode(42)).count(), 0);
    }

    #[test]
    fn remove_edge_updates_both_sides() {
        let mut graph = triangle();
        assert!(graph.remove_edge(&edge(1, 2, 1.0)));
        assert!(!graph.remove_edge(&edge(1, 2, 1.0)));

        assert_eq!(graph.edge_count(), 2);
        assert_eq!(graph.outgoing_edges(BasicNode(1)).count(), 0);
        assert_eq!(graph.incoming_edges(BasicNode(2)).count(), 0);
        assert!(!graph.contains_edge(&edge(1, 2, 1.0)));
    }

    #[test]
    fn remove_node_removes_incident_edges() {
        let mut graph = triangle();
        graph.add_edge(edge(2, 2, 0.5));
        assert_eq!(graph.edge_count(), 4);

        assert!(graph.remove_node(BasicNode(2)));
        assert!(!graph.remove_node(BasicNode(2)));

        assert_eq!(graph.size(), 2);
        assert_eq!(graph.edge_count(), 1);
        assert_eq!(graph.incoming_edges(BasicNode(3)).count(), 0);
        assert_eq!(graph.outgoing_edges(BasicNode(1)).count(), 0);
        assert!(graph.contains_edge(&edge(3, 1, 3.0)));
        assert_eq!(graph.nodes().count(), 2);
    }

    #[test]
    fn reverse_flips_edges() {
        let mut graph = triangle();
        graph.reverse();

        assert!(graph.is_reversed());
        assert_eq!(sorted_targets(&graph, 2), vec![1]);
        assert!(graph.contains_edge(&edge(2, 1, 1.0)));
        assert!(!graph.contains_edge(&edge(1, 2, 1.0)));

        // Mutations while reversed use the reversed orientation
        graph.add_edge(edge(1, 3, 7.0));
        graph.reverse();
        assert!(graph.contains_edge(&edge(3, 1, 7.0)));
    }

    #[test]
    fn reversed_view_matches_in_place_reversal() {
        let graph = triangle();
        let mut flipped = graph.clone();
        flipped.reverse();
        let view = Reversed::new(&graph);

        for node in 1..=3 {
            assert_eq!(sorted_targets(&view, node), sorted_targets(&flipped, node));
        }
        assert!(view.is_reversed());
        assert!(view.contains_edge(&edge(2, 1, 1.0)));
        assert_eq!(view.edges().count(), 3);
    }

    #[test]
    fn edges_follow_orientation() {
        let mut graph = triangle();
        graph.reverse();
        let mut edges: Vec<(u32, u32)> = graph
            .edges()
            .map(|e| (e.source().0, e.destination().0))
            .collect();
        edges.sort();
        assert_eq!(edges, vec![(1, 3), (2, 1), (3, 2)]);
    }
}
