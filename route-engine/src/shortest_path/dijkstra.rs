//! Dijkstra's algorithm, generalized by search modules.

use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap, HashSet};

use tracing::trace;

use super::ShortestPathComputation;
use super::module::{Module, ModuleSet};
use crate::model::{Edge, Graph};
use crate::path::{EdgePath, Path, TentativeDistance};

/// Outcome of one search run.
struct Search<N, E> {
    tentatives: HashMap<N, TentativeDistance<N, E>>,
    settled: HashSet<N>,
    /// Nodes in the order they were settled.
    order: Vec<N>,
}

impl<N: Copy + Eq + std::hash::Hash, E> Search<N, E> {
    fn settled(&self, node: N) -> Option<&TentativeDistance<N, E>> {
        if self.settled.contains(&node) {
            self.tentatives.get(&node)
        } else {
            None
        }
    }
}

/// Multi-source Dijkstra with an optional destination.
///
/// Without modules this is the textbook algorithm. Modules can restrict
/// which edges are relaxed, price edges per query, provide an A*
/// estimate and abort the search early; see [`Module`] for how their
/// answers are combined.
///
/// The graph is only read. A `Dijkstra` keeps no state between queries,
/// so one instance can answer any number of them.
///
/// # Examples
///
/// ```
/// use route_engine::model::{AdjacencyGraph, BasicEdge, BasicNode, MutableGraph};
/// use route_engine::shortest_path::{Dijkstra, ShortestPathComputation};
///
/// let mut graph: AdjacencyGraph<BasicNode, BasicEdge<BasicNode>> = AdjacencyGraph::new();
/// graph.add_edge(BasicEdge::new(BasicNode(1), BasicNode(2), 1.0));
/// graph.add_edge(BasicEdge::new(BasicNode(2), BasicNode(3), 1.0));
/// graph.add_edge(BasicEdge::new(BasicNode(1), BasicNode(3), 5.0));
///
/// let dijkstra = Dijkstra::new(&graph);
/// let path = dijkstra.compute_shortest_path_from(BasicNode(1), BasicNode(3)).unwrap();
/// assert_eq!(path.total_cost(), 2.0);
/// assert_eq!(path.len(), 2);
/// ```
pub struct Dijkstra<'g, G: Graph> {
    graph: &'g G,
    modules: ModuleSet<'g, G::Edge>,
}

impl<'g, G: Graph> Dijkstra<'g, G> {
    /// Plain Dijkstra without modules.
    pub fn new(graph: &'g G) -> Self {
        Self {
            graph,
            modules: ModuleSet::new(),
        }
    }

    pub fn with_modules(graph: &'g G, modules: ModuleSet<'g, G::Edge>) -> Self {
        Self { graph, modules }
    }

    /// Builder style variant of [`Dijkstra::add_module`].
    pub fn with_module(mut self, module: impl Module<G::Edge> + 'g) -> Self {
        self.modules.push(module);
        self
    }

    pub fn add_module(&mut self, module: impl Module<G::Edge> + 'g) {
        self.modules.push(module);
    }

    pub fn graph(&self) -> &'g G {
        self.graph
    }

    fn estimate(&self, node: G::Node, destination: Option<G::Node>) -> f64 {
        match destination {
            Some(destination) => self.modules.estimate(node, destination),
            None => 0.0,
        }
    }

    /// # Panics
    ///
    /// If a source or the destination is not part of the graph.
    fn search(
        &self,
        sources: &[G::Node],
        destination: Option<G::Node>,
    ) -> Search<G::Node, G::Edge> {
        for source in sources {
            assert!(
                self.graph.contains_node(*source),
                "source {source:?} is not part of the graph"
            );
        }
        if let Some(destination) = destination {
            assert!(
                self.graph.contains_node(destination),
                "destination {destination:?} is not part of the graph"
            );
        }

        let mut tentatives: HashMap<G::Node, TentativeDistance<G::Node, G::Edge>> = HashMap::new();
        let mut settled = HashSet::new();
        let mut order = Vec::new();
        let mut queue = BinaryHeap::new();

        for &source in sources {
            let entry = TentativeDistance::new(source, None, 0.0, self.estimate(source, destination));
            tentatives.insert(source, entry.clone());
            queue.push(Reverse(entry));
        }

        while let Some(Reverse(current)) = queue.pop() {
            // Stale entries are skipped instead of being removed eagerly
            if settled.contains(&current.node) {
                continue;
            }
            if self.modules.should_abort(&current) {
                trace!(node = ?current.node, "search aborted by module");
                break;
            }

            let node = current.node;
            settled.insert(node);
            order.push(node);
            if destination == Some(node) {
                break;
            }

            for edge in self.graph.outgoing_edges(node) {
                if !self.modules.should_consider_edge(&edge) {
                    continue;
                }
                let target = edge.destination();
                if settled.contains(&target) {
                    continue;
                }

                let distance = current.tentative_distance + self.modules.edge_cost(&edge, &current);
                let estimate = match tentatives.get(&target) {
                    Some(existing) if existing.tentative_distance <= distance => continue,
                    Some(existing) => existing.estimate,
                    None => self.estimate(target, destination),
                };

                let entry = TentativeDistance::new(target, Some(edge), distance, estimate);
                tentatives.insert(target, entry.clone());
                queue.push(Reverse(entry));
            }
        }

        trace!(
            sources = sources.len(),
            settled = order.len(),
            discovered = tentatives.len(),
            "dijkstra finished"
        );

        Search {
            tentatives,
            settled,
            order,
        }
    }
}

impl<G: Graph> ShortestPathComputation<G::Edge> for Dijkstra<'_, G> {
    fn compute_shortest_path(
        &self,
        sources: &[G::Node],
        destination: G::Node,
    ) -> Option<Path<G::Edge>> {
        let search = self.search(sources, Some(destination));
        let mut current = search.settled(destination)?;

        let mut path = EdgePath::built_reversely();
        while let Some(edge) = &current.parent_edge {
            let previous = search.settled(edge.source())?;
            path.add_edge(
                edge.clone(),
                current.tentative_distance - previous.tentative_distance,
            );
            current = previous;
        }
        Some(Path::from_edges(path, destination))
    }

    fn compute_shortest_path_cost(&self, sources: &[G::Node], destination: G::Node) -> Option<f64> {
        self.search(sources, Some(destination))
            .settled(destination)
            .map(|entry| entry.tentative_distance)
    }

    fn compute_shortest_path_costs_reachable(&self, sources: &[G::Node]) -> HashMap<G::Node, f64> {
        let search = self.search(sources, None);
        search
            .order
            .iter()
            .filter_map(|node| {
                search
                    .tentatives
                    .get(node)
                    .map(|entry| (*node, entry.tentative_distance))
            })
            .collect()
    }

    fn compute_search_space(
        &self,
        sources: &[G::Node],
        destination: Option<G::Node>,
    ) -> Vec<G::Node> {
        self.search(sources, destination).order
    }
}
