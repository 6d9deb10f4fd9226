//! Paths as sequences of edges with their incremental cost.

use crate::model::Edge;

/// An edge of a path together with what it cost to travel it.
///
/// The cost may differ from the edge's base cost when search modules
/// priced the edge for a specific query.
#[derive(Debug, Clone, PartialEq)]
pub struct EdgeCost<E> {
    pub edge: E,
    pub cost: f64,
}

impl<E> EdgeCost<E> {
    pub fn new(edge: E, cost: f64) -> Self {
        Self { edge, cost }
    }
}

/// A path made of edges, built up one edge at a time.
///
/// A path built reversely receives its edges starting at the destination,
/// which is the order in which parent pointers are walked after a search.
/// Iteration always yields edges from source to destination.
///
/// # Examples
///
/// ```
/// use route_engine::model::{BasicEdge, BasicNode};
/// use route_engine::path::EdgePath;
///
/// let mut path = EdgePath::built_reversely();
/// path.add_edge(BasicEdge::new(BasicNode(2), BasicNode(3), 4.0), 4.0);
/// path.add_edge(BasicEdge::new(BasicNode(1), BasicNode(2), 1.5), 1.5);
///
/// assert_eq!(path.source(), Some(BasicNode(1)));
/// assert_eq!(path.destination(), Some(BasicNode(3)));
/// assert_eq!(path.total_cost(), 5.5);
/// assert_eq!(path.len(), 2);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct EdgePath<E> {
    /// In insertion order.
    edges: Vec<EdgeCost<E>>,
    build_reversely: bool,
    total_cost: f64,
}

impl<E> Default for EdgePath<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> EdgePath<E> {
    /// A path whose first added edge starts at the source.
    pub fn new() -> Self {
        Self {
            edges: Vec::new(),
            build_reversely: false,
            total_cost: 0.0,
        }
    }

    /// A path whose first added edge ends at the destination.
    pub fn built_reversely() -> Self {
        Self {
            build_reversely: true,
            ..Self::new()
        }
    }

    pub fn is_built_reversely(&self) -> bool {
        self.build_reversely
    }

    /// Append an edge at the open end of the path.
    pub fn add_edge(&mut self, edge: E, cost: f64) {
        self.total_cost += cost;
        self.edges.push(EdgeCost::new(edge, cost));
    }

    /// Number of edges.
    pub fn len(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    pub fn total_cost(&self) -> f64 {
        self.total_cost
    }

    /// Edges from source to destination.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &EdgeCost<E>> + ExactSizeIterator + '_ {
        let len = self.edges.len();
        let reversely = self.build_reversely;
        (0..len).map(move |index| {
            if reversely {
                &self.edges[len - 1 - index]
            } else {
                &self.edges[index]
            }
        })
    }
}

impl<E: Edge> EdgePath<E> {
    pub fn source(&self) -> Option<E::Node> {
        self.iter().next().map(|entry| entry.edge.source())
    }

    pub fn destination(&self) -> Option<E::Node> {
        self.iter().next_back().map(|entry| entry.edge.destination())
    }
}

impl<E> Extend<EdgeCost<E>> for EdgePath<E> {
    fn extend<I: IntoIterator<Item = EdgeCost<E>>>(&mut self, iter: I) {
        for entry in iter {
            self.add_edge(entry.edge, entry.cost);
        }
    }
}

/// Result of a successful shortest path query.
#[derive(Debug, Clone, PartialEq)]
pub enum Path<E: Edge> {
    /// Source and destination coincide.
    Empty(E::Node),
    /// At least one edge.
    Edges(EdgePath<E>),
}

impl<E: Edge> Path<E> {
    /// Wrap a built edge path; an empty one becomes the empty path at
    /// `node`.
    pub fn from_edges(edges: EdgePath<E>, node: E::Node) -> Self {
        if edges.is_empty() {
            Path::Empty(node)
        } else {
            Path::Edges(edges)
        }
    }

    pub fn source(&self) -> Option<E::Node> {
        match self {
            Path::Empty(node) => Some(*node),
            Path::Edges(edges) => edges.source(),
        }
    }

    pub fn destination(&self) -> Option<E::Node> {
        match self {
            Path::Empty(node) => Some(*node),
            Path::Edges(edges) => edges.destination(),
        }
    }

    pub fn total_cost(&self) -> f64 {
        match self {
            Path::Empty(_) => 0.0,
            Path::Edges(edges) => edges.total_cost(),
        }
    }

    /// Number of edges.
    pub fn len(&self) -> usize {
        match self {
            Path::Empty(_) => 0,
            Path::Edges(edges) => edges.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Edges from source to destination.
    pub fn edges(&self) -> impl Iterator<Item = &EdgeCost<E>> + '_ {
        let edges = match self {
            Path::Empty(_) => None,
            Path::Edges(edges) => Some(edges.iter()),
        };
        edges.into_iter().flatten()
    }

    /// The nodes visited, starting at the source.
    pub fn nodes(&self) -> Vec<E::Node> {
        let mut nodes: Vec<E::Node> = self.source().into_iter().collect();
        nodes.extend(self.edges().map(|entry| entry.edge.destination()));
        nodes
    }
}
