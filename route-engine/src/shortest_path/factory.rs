//! Ready-made shortest path computations for the routing model in use.

use std::sync::Arc;

use chrono::NaiveDateTime;
use tracing::{debug, info};

use super::connection_scan::ConnectionScan;
use super::dijkstra::Dijkstra;
use super::hybrid::{HybridRoadTimetable, NearestStopAccess};
use super::module::{AStarModule, MultiModalModule, TransitModule};
use super::ShortestPathComputation;
use crate::config::{ConfigError, LandmarkStrategy, RoutingConfig, RoutingModelMode};
use crate::metric::{
    AsTheCrowFliesMetric, GreedyFarthestLandmarks, LandmarkMetric, LandmarkProvider, Metric,
    RandomLandmarks,
};
use crate::model::{CoreEdge, CoreNode, Graph, ModeSet};
use crate::timetable::Timetable;

/// Where transit data lives.
#[derive(Debug, Clone, Copy)]
enum Model<'a> {
    /// Transit nodes are part of the graph.
    Linked,
    WithTimetable(&'a Timetable),
}

/// Builds shortest path computations over one graph.
///
/// Initialization selects landmarks and precomputes the landmark metric,
/// which is expensive. Afterwards every `create_*` call is cheap and
/// returns a fresh computation that only borrows the shared data.
pub struct ShortestPathComputationFactory<'a, G> {
    graph: &'a G,
    model: Model<'a>,
    metric: Arc<dyn Metric<CoreNode>>,
    config: RoutingConfig,
}

impl<'a, G> ShortestPathComputationFactory<'a, G>
where
    G: Graph<Node = CoreNode, Edge = CoreEdge> + Sync,
{
    /// Select landmarks and precompute the metric.
    ///
    /// A timetable is required for [`RoutingModelMode::GraphWithTimetable`]
    /// and ignored for [`RoutingModelMode::LinkGraph`].
    pub fn initialize(
        graph: &'a G,
        timetable: Option<&'a Timetable>,
        config: RoutingConfig,
    ) -> Result<Self, ConfigError> {
        let model = match (config.routing_model_mode, timetable) {
            (RoutingModelMode::LinkGraph, _) => Model::Linked,
            (RoutingModelMode::GraphWithTimetable, Some(timetable)) => {
                Model::WithTimetable(timetable)
            }
            (mode @ RoutingModelMode::GraphWithTimetable, None) => {
                return Err(ConfigError::MissingTimetable(mode));
            }
        };

        let amount = config.amount_of_landmarks;
        let landmarks = match config.landmark_strategy {
            LandmarkStrategy::Random => {
                RandomLandmarks::new(graph, config.landmark_seed).landmarks(amount)
            }
            LandmarkStrategy::GreedyFarthest => {
                GreedyFarthestLandmarks::new(graph, config.landmark_seed).landmarks(amount)
            }
        };
        if landmarks.is_empty() {
            return Err(ConfigError::NoLandmarks);
        }

        info!(
            graph = %graph.size_information(),
            mode = ?config.routing_model_mode,
            strategy = ?config.landmark_strategy,
            landmarks = landmarks.len(),
            "initializing shortest path computations"
        );
        let metric = LandmarkMetric::new(graph, landmarks);
        if let Model::WithTimetable(timetable) = model {
            debug!(timetable = %timetable.size_information(), "using separate timetable");
        }

        Ok(Self {
            graph,
            model,
            metric: Arc::new(metric),
            config,
        })
    }

    pub fn graph(&self) -> &'a G {
        self.graph
    }

    pub fn config(&self) -> &RoutingConfig {
        &self.config
    }

    /// The landmark metric shared by all computations.
    pub fn metric(&self) -> Arc<dyn Metric<CoreNode>> {
        Arc::clone(&self.metric)
    }

    /// The computation for a journey leaving at `departure` using only
    /// `modes`.
    ///
    /// On a link graph this is A* over landmarks with mode restriction and
    /// transit waiting times. With a separate timetable it is the same
    /// road search combined with connection scans.
    pub fn create_algorithm(
        &self,
        departure: NaiveDateTime,
        modes: ModeSet,
    ) -> Box<dyn ShortestPathComputation<CoreEdge> + 'a> {
        match self.model {
            Model::Linked => Box::new(self.create_algorithm_time_dependent_alt(departure, modes)),
            Model::WithTimetable(timetable) => Box::new(HybridRoadTimetable::new(
                self.create_algorithm_alt(modes),
                timetable,
                NearestStopAccess::new(timetable, self.config.abort_travel_time_to_access_nodes_secs),
                departure,
                modes,
            )),
        }
    }

    /// A* over landmarks, without mode restriction or schedule.
    pub fn create_default_algorithm(&self) -> Dijkstra<'a, G> {
        Dijkstra::new(self.graph).with_module(AStarModule::new(self.metric()))
    }

    pub fn create_algorithm_dijkstra(&self) -> Dijkstra<'a, G> {
        Dijkstra::new(self.graph)
    }

    /// A* with the straight-line metric. Only a lower bound on graphs
    /// whose edges cost at least their length at maximal road speed.
    pub fn create_algorithm_a_star_as_the_crow_flies(&self) -> Dijkstra<'a, G> {
        Dijkstra::new(self.graph).with_module(AStarModule::new(Arc::new(AsTheCrowFliesMetric)))
    }

    pub fn create_algorithm_alt(&self, modes: ModeSet) -> Dijkstra<'a, G> {
        self.create_default_algorithm()
            .with_module(MultiModalModule::new(modes))
    }

    pub fn create_algorithm_time_dependent_alt(
        &self,
        departure: NaiveDateTime,
        modes: ModeSet,
    ) -> Dijkstra<'a, G> {
        self.create_algorithm_alt(modes)
            .with_module(TransitModule::new(departure))
    }

    /// Connection scans over the timetable.
    pub fn create_algorithm_csa(&self) -> Result<ConnectionScan<'a>, ConfigError> {
        match self.model {
            Model::WithTimetable(timetable) => Ok(ConnectionScan::new(timetable)),
            Model::Linked => Err(ConfigError::MissingTimetable(RoutingModelMode::LinkGraph)),
        }
    }
}
