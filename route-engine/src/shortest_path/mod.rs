//! Shortest path computations: module based Dijkstra, the Connection Scan
//! Algorithm, their road/timetable hybrid and the factory wiring them up.
//!
//! Every computation answers the same four queries. "No path" is a `None`
//! or an empty result, never an error. Passing a node that is not part of
//! the graph (or a stop not part of the timetable) is a caller bug and
//! panics.

mod connection_scan;
mod dijkstra;
mod factory;
mod hybrid;
mod module;


use std::collections::HashMap;

pub use connection_scan::{ConnectionScan, JourneyPointer, ScanResult};
pub use dijkstra::Dijkstra;
pub use factory::ShortestPathComputationFactory;
pub use hybrid::{HybridRoadTimetable, NearestStopAccess, TransitAccess};
pub use module::{
    AStarModule, AbortAfterModule, Module, ModuleSet, MultiModalModule, TransitModule,
};

use crate::model::Edge;
use crate::path::Path;

/// Queries every shortest path algorithm answers.
///
/// All queries accept a set of sources; the search starts from all of
/// them at once with distance zero.
pub trait ShortestPathComputation<E: Edge> {
    /// The cheapest path from any source to `destination`.
    fn compute_shortest_path(&self, sources: &[E::Node], destination: E::Node) -> Option<Path<E>>;

    /// The cost of the cheapest path from any source to `destination`.
    fn compute_shortest_path_cost(&self, sources: &[E::Node], destination: E::Node) -> Option<f64> {
        self.compute_shortest_path(sources, destination)
            .map(|path| path.total_cost())
    }

    /// The cost of reaching every reachable node.
    fn compute_shortest_path_costs_reachable(&self, sources: &[E::Node]) -> HashMap<E::Node, f64>;

    /// The nodes the search settles, in settling order, when looking for
    /// `destination` (or for everything when `None`).
    fn compute_search_space(
        &self,
        sources: &[E::Node],
        destination: Option<E::Node>,
    ) -> Vec<E::Node>;

    fn compute_shortest_path_from(&self, source: E::Node, destination: E::Node) -> Option<Path<E>> {
        self.compute_shortest_path(&[source], destination)
    }

    fn compute_shortest_path_cost_from(&self, source: E::Node, destination: E::Node) -> Option<f64> {
        self.compute_shortest_path_cost(&[source], destination)
    }

    fn compute_shortest_path_costs_reachable_from(&self, source: E::Node) -> HashMap<E::Node, f64> {
        self.compute_shortest_path_costs_reachable(&[source])
    }
}
