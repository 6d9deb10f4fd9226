//! Landmark based lower bounds (ALT).
//!
//! For a landmark `L` and nodes `u`, `v` the triangle inequality gives
//! `d(u, v) >= d(u, L) - d(v, L)` and `d(u, v) >= d(L, v) - d(L, u)`.
//! The metric precomputes `d(L, x)` and `d(x, L)` for every landmark and
//! node and reports the best such bound.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::hash::Hash;

use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::index;
use rand::Rng;
use rayon::prelude::*;
use tracing::{debug, trace};

use super::Metric;
use crate::model::{Graph, Reversed};
use crate::shortest_path::{Dijkstra, ShortestPathComputation};

/// Strategy choosing the nodes that become landmarks.
pub trait LandmarkProvider<N> {
    /// Up to `amount` distinct nodes. Fewer are returned only if the graph
    /// has fewer nodes.
    fn landmarks(&mut self, amount: usize) -> Vec<N>;
}

fn seeded_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    }
}

/// Picks landmarks uniformly at random.
pub struct RandomLandmarks<'g, G> {
    graph: &'g G,
    rng: StdRng,
}

impl<'g, G: Graph> RandomLandmarks<'g, G> {
    /// With a seed the selection is reproducible.
    pub fn new(graph: &'g G, seed: Option<u64>) -> Self {
        Self {
            graph,
            rng: seeded_rng(seed),
        }
    }
}

impl<G: Graph> LandmarkProvider<G::Node> for RandomLandmarks<'_, G> {
    fn landmarks(&mut self, amount: usize) -> Vec<G::Node> {
        let nodes: Vec<G::Node> = self.graph.nodes().collect();
        let amount = amount.min(nodes.len());
        let landmarks: Vec<G::Node> = index::sample(&mut self.rng, nodes.len(), amount)
            .into_iter()
            .map(|position| nodes[position])
            .collect();
        debug!(amount = landmarks.len(), "selected random landmarks");
        landmarks
    }
}

/// Picks the first landmark at random, then repeatedly the node farthest
/// away from all landmarks chosen so far.
///
/// Nodes the current landmarks cannot reach count as infinitely far away,
/// so every component of a disconnected graph gets a landmark before any
/// component gets a second one. Each step costs one full search.
pub struct GreedyFarthestLandmarks<'g, G> {
    graph: &'g G,
    rng: StdRng,
}

impl<'g, G: Graph> GreedyFarthestLandmarks<'g, G> {
    pub fn new(graph: &'g G, seed: Option<u64>) -> Self {
        Self {
            graph,
            rng: seeded_rng(seed),
        }
    }
}

impl<G: Graph> LandmarkProvider<G::Node> for GreedyFarthestLandmarks<'_, G> {
    fn landmarks(&mut self, amount: usize) -> Vec<G::Node> {
        let nodes: Vec<G::Node> = self.graph.nodes().collect();
        if nodes.is_empty() || amount == 0 {
            return Vec::new();
        }

        let first = nodes[self.rng.random_range(0..nodes.len())];
        let mut landmarks = vec![first];
        let mut chosen: HashSet<G::Node> = HashSet::from([first]);

        while landmarks.len() < amount {
            let distances =
                Dijkstra::new(self.graph).compute_shortest_path_costs_reachable(&landmarks);

            let mut farthest: Option<(G::Node, f64)> = None;
            for node in nodes.iter().filter(|node| !chosen.contains(*node)) {
                let distance = distances.get(node).copied().unwrap_or(f64::INFINITY);
                if farthest.is_none_or(|(_, best)| distance > best) {
                    farthest = Some((*node, distance));
                }
            }

            let Some((node, distance)) = farthest else {
                break;
            };
            trace!(?node, distance, "next landmark");
            chosen.insert(node);
            landmarks.push(node);
        }

        debug!(amount = landmarks.len(), "selected greedy farthest landmarks");
        landmarks
    }
}

/// The ALT lower bound.
///
/// Both distance tables are read-only once built. A missing entry means
/// the node cannot reach, or cannot be reached from, the landmark; such
/// landmarks do not contribute to bounds involving that node.
///
/// # Examples
///
/// ```
/// use route_engine::metric::{LandmarkMetric, Metric};
/// use route_engine::model::{AdjacencyGraph, BasicEdge, BasicNode, MutableGraph};
///
/// let mut graph: AdjacencyGraph<BasicNode, BasicEdge<BasicNode>> = AdjacencyGraph::new();
/// for (a, b, cost) in [(1, 2, 2.0), (2, 3, 3.0)] {
///     graph.add_edge(BasicEdge::new(BasicNode(a), BasicNode(b), cost));
///     graph.add_edge(BasicEdge::new(BasicNode(b), BasicNode(a), cost));
/// }
///
/// let metric = LandmarkMetric::new(&graph, vec![BasicNode(3)]);
/// assert_eq!(metric.distance(BasicNode(1), BasicNode(2)), 2.0);
/// assert_eq!(metric.distance(BasicNode(1), BasicNode(3)), 5.0);
/// ```
#[derive(Debug, Clone)]
pub struct LandmarkMetric<N> {
    landmarks: Vec<N>,
    /// landmark -> node -> d(landmark, node)
    from_landmark: HashMap<N, HashMap<N, f64>>,
    /// landmark -> node -> d(node, landmark)
    to_landmark: HashMap<N, HashMap<N, f64>>,
}

impl<N> LandmarkMetric<N>
where
    N: Copy + Eq + Hash + fmt::Debug + Send + Sync,
{
    /// Precompute the distance tables of the given landmarks.
    ///
    /// Forward sweeps run on `graph`, backward sweeps on a reversed view of
    /// it; both in parallel across landmarks. The graph is never mutated.
    pub fn new<G>(graph: &G, landmarks: Vec<N>) -> Self
    where
        G: Graph<Node = N> + Sync,
    {
        let from_landmark: HashMap<N, HashMap<N, f64>> = landmarks
            .par_iter()
            .map(|&landmark| {
                let distances =
                    Dijkstra::new(graph).compute_shortest_path_costs_reachable(&[landmark]);
                (landmark, distances)
            })
            .collect();

        let reversed = Reversed::new(graph);
        let to_landmark: HashMap<N, HashMap<N, f64>> = landmarks
            .par_iter()
            .map(|&landmark| {
                let distances =
                    Dijkstra::new(&reversed).compute_shortest_path_costs_reachable(&[landmark]);
                (landmark, distances)
            })
            .collect();

        for landmark in &landmarks {
            trace!(
                ?landmark,
                reached = from_landmark.get(landmark).map_or(0, HashMap::len),
                reaching = to_landmark.get(landmark).map_or(0, HashMap::len),
                "landmark precomputed"
            );
        }
        debug!(landmarks = landmarks.len(), nodes = graph.size(), "landmark metric ready");

        Self {
            landmarks,
            from_landmark,
            to_landmark,
        }
    }

    /// Select `amount` landmarks with `provider` and precompute them.
    pub fn with_provider<G, P>(graph: &G, amount: usize, provider: &mut P) -> Self
    where
        G: Graph<Node = N> + Sync,
        P: LandmarkProvider<N>,
    {
        Self::new(graph, provider.landmarks(amount))
    }

    pub fn landmarks(&self) -> &[N] {
        &self.landmarks
    }
}

impl<N> Metric<N> for LandmarkMetric<N>
where
    N: Copy + Eq + Hash + Send + Sync,
{
    fn distance(&self, first: N, second: N) -> f64 {
        let mut best = 0.0_f64;
        for landmark in &self.landmarks {
            let (Some(from), Some(to)) = (
                self.from_landmark.get(landmark),
                self.to_landmark.get(landmark),
            ) else {
                continue;
            };
            let (Some(first_to), Some(second_to), Some(from_first), Some(from_second)) = (
                to.get(&first),
                to.get(&second),
                from.get(&first),
                from.get(&second),
            ) else {
                continue;
            };
            best = best
                .max(first_to - second_to)
                .max(from_second - from_first);
        }
        best
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use crate::model::{AdjacencyGraph, BasicEdge, BasicNode, Edge, MutableGraph};
    use proptest::prelude::*;

    type TestGraph = AdjacencyGraph<BasicNode, BasicEdge<BasicNode>>;

    fn graph_strategy() -> impl Strategy<Value = TestGraph> {
        prop::collection::vec((0u32..15, 0u32..15, 0u32..50), 1..70).prop_map(|raw| {
            let mut graph = TestGraph::new();
            for (source, destination, cost) in raw {
                graph.add_edge(BasicEdge::new(
                    BasicNode(source),
                    BasicNode(destination),
                    f64::from(cost),
                ));
            }
            graph
        })
    }

    proptest! {
        #[test]
        fn landmark_bound_is_admissible(graph in graph_strategy(), seed in any::<u64>()) {
            let metric = LandmarkMetric::with_provider(
                &graph,
                3,
                &mut RandomLandmarks::new(&graph, Some(seed)),
            );
            let nodes: Vec<BasicNode> = graph.nodes().collect();
            for &source in &nodes {
                let exact = Dijkstra::new(&graph).compute_shortest_path_costs_reachable(&[source]);
                for (&target, &distance) in &exact {
                    let estimate = metric.distance(source, target);
                    prop_assert!(
                        estimate <= distance + 1e-9,
                        "estimate {} exceeds distance {} from {:?} to {:?}",
                        estimate, distance, source, target
                    );
                }
            }
        }

        #[test]
        fn landmark_bound_is_monotone(graph in graph_strategy(), seed in any::<u64>()) {
            let metric = LandmarkMetric::with_provider(
                &graph,
                3,
                &mut GreedyFarthestLandmarks::new(&graph, Some(seed)),
            );
            let reachable: HashMap<BasicNode, HashMap<BasicNode, f64>> = graph
                .nodes()
                .map(|node| {
                    let costs = Dijkstra::new(&graph).compute_shortest_path_costs_reachable(&[node]);
                    (node, costs)
                })
                .collect();
            for edge in graph.edges() {
                // Only targets the search could still reach through the edge matter
                for &target in reachable[&edge.destination()].keys() {
                    let here = metric.distance(edge.source(), target);
                    let there = metric.distance(edge.destination(), target);
                    prop_assert!(
                        here <= edge.cost() + there + 1e-9,
                        "estimate drops by more than {} along {:?}",
                        edge.cost(), edge
                    );
                }
            }
        }
    }
}
