//! Search modules: small strategies that customise the generalized
//! Dijkstra.
//!
//! A module may take part in four decisions. The results of all modules
//! are combined by fixed reducers, independent of module order:
//!
//! | decision | reducer | without any answer |
//! |---|---|---|
//! | consider edge | logical AND | edge is considered |
//! | edge cost | maximum | base cost of the edge |
//! | estimate | maximum | 0 |
//! | abort | logical OR | keep searching |
//!
//! The maximum of admissible estimates is still admissible, so combining
//! heuristics never breaks correctness. Taking the maximum of costs lets a
//! module turn a zero-cost link into a real waiting time.

use std::sync::Arc;

use chrono::{NaiveDateTime, Timelike};

use crate::metric::Metric;
use crate::model::{Edge, ModeSet, SECONDS_OF_DAY};
use crate::path::TentativeDistance;

/// A strategy plugged into [`Dijkstra`](super::Dijkstra).
pub trait Module<E: Edge>: Send + Sync {
    /// Whether the search may relax `edge` at all.
    fn should_consider_edge(&self, _edge: &E) -> bool {
        true
    }

    /// Cost of `edge` when leaving the node described by `tentative`.
    fn provide_edge_cost(&self, _edge: &E, _tentative: &TentativeDistance<E::Node, E>) -> Option<f64> {
        None
    }

    /// Lower bound on the distance from `node` to `destination`.
    fn provide_estimate(&self, _node: E::Node, _destination: E::Node) -> Option<f64> {
        None
    }

    /// Checked for every node right before it would be settled.
    fn should_abort(&self, _tentative: &TentativeDistance<E::Node, E>) -> bool {
        false
    }
}

/// The modules of one search and the reducers combining them.
pub struct ModuleSet<'a, E: Edge> {
    modules: Vec<Box<dyn Module<E> + 'a>>,
}

impl<E: Edge> Default for ModuleSet<'_, E> {
    fn default() -> Self {
        Self {
            modules: Vec::new(),
        }
    }
}

impl<'a, E: Edge> ModuleSet<'a, E> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, module: impl Module<E> + 'a) {
        self.modules.push(Box::new(module));
    }

    pub fn push_boxed(&mut self, module: Box<dyn Module<E> + 'a>) {
        self.modules.push(module);
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    pub fn should_consider_edge(&self, edge: &E) -> bool {
        self.modules
            .iter()
            .all(|module| module.should_consider_edge(edge))
    }

    pub fn edge_cost(&self, edge: &E, tentative: &TentativeDistance<E::Node, E>) -> f64 {
        self.modules
            .iter()
            .filter_map(|module| module.provide_edge_cost(edge, tentative))
            .reduce(f64::max)
            .unwrap_or_else(|| edge.cost())
    }

    pub fn estimate(&self, node: E::Node, destination: E::Node) -> f64 {
        self.modules
            .iter()
            .filter_map(|module| module.provide_estimate(node, destination))
            .fold(0.0, f64::max)
    }

    pub fn should_abort(&self, tentative: &TentativeDistance<E::Node, E>) -> bool {
        self.modules
            .iter()
            .any(|module| module.should_abort(tentative))
    }
}

/// Turns the search into A* guided by a metric.
pub struct AStarModule<N> {
    metric: Arc<dyn Metric<N>>,
}

impl<N> AStarModule<N> {
    pub fn new(metric: Arc<dyn Metric<N>>) -> Self {
        Self { metric }
    }
}

impl<E: Edge> Module<E> for AStarModule<E::Node> {
    fn provide_estimate(&self, node: E::Node, destination: E::Node) -> Option<f64> {
        Some(self.metric.distance(node, destination))
    }
}

/// Stops the search once the next node to settle is farther than a
/// fixed range.
#[derive(Debug, Clone, Copy)]
pub struct AbortAfterModule {
    range: f64,
}

impl AbortAfterModule {
    pub fn new(range: f64) -> Self {
        Self { range }
    }
}

impl<E: Edge> Module<E> for AbortAfterModule {
    fn should_abort(&self, tentative: &TentativeDistance<E::Node, E>) -> bool {
        tentative.tentative_distance > self.range
    }
}

/// Restricts the search to a set of transportation modes.
///
/// Edges that carry mode information but share no mode with the allowed
/// set are skipped. Edges supporting several modes are priced for the
/// fastest mode that is still allowed. Edges without mode information
/// are left alone.
#[derive(Debug, Clone, Copy)]
pub struct MultiModalModule {
    modes: ModeSet,
}

impl MultiModalModule {
    pub fn new(modes: ModeSet) -> Self {
        Self { modes }
    }
}

impl<E: Edge> Module<E> for MultiModalModule {
    fn should_consider_edge(&self, edge: &E) -> bool {
        edge.as_multi_modal()
            .is_none_or(|edge| edge.transportation_modes().intersects(self.modes))
    }

    fn provide_edge_cost(&self, edge: &E, _tentative: &TentativeDistance<E::Node, E>) -> Option<f64> {
        let edge = edge.as_multi_modal()?;
        let modes = edge.transportation_modes();
        if modes.len() <= 1 {
            return None;
        }
        let fastest = modes.intersection(self.modes).fastest()?;
        Some(edge.cost_for_mode(fastest))
    }
}

/// Prices edges entering the transit network with the time to wait for
/// the departure they lead to.
///
/// The clock at a node is the query's departure plus the node's tentative
/// distance in seconds. A departure earlier in the day than the clock is
/// taken on the next day.
#[derive(Debug, Clone, Copy)]
pub struct TransitModule {
    departure_secs: u32,
}

impl TransitModule {
    pub fn new(departure: NaiveDateTime) -> Self {
        Self {
            departure_secs: departure.time().num_seconds_from_midnight(),
        }
    }

    /// Seconds to wait at `clock` (seconds since midnight, may exceed a
    /// day) for an event at `event_time` (seconds since midnight).
    pub fn wait_time(clock: f64, event_time: u32) -> f64 {
        let day = f64::from(SECONDS_OF_DAY);
        (f64::from(event_time) - clock).rem_euclid(day)
    }
}

impl<E: Edge> Module<E> for TransitModule {
    fn provide_edge_cost(&self, edge: &E, tentative: &TentativeDistance<E::Node, E>) -> Option<f64> {
        let event_time = edge.transit_entry_time()?;
        let clock = f64::from(self.departure_secs) + tentative.tentative_distance;
        Some(Self::wait_time(clock, event_time))
    }
}
