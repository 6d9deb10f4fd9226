//! Lower bounds on the distance between two nodes, used as A* heuristics.

mod landmark;

pub use landmark::{GreedyFarthestLandmarks, LandmarkMetric, LandmarkProvider, RandomLandmarks};

use crate::model::{MAXIMAL_ROAD_SPEED_KMH, Spatial, distance_equirect, travel_time_secs};

/// A distance estimate between two nodes.
///
/// Used only as a lower bound: `distance(a, b)` must never exceed the cost
/// of the cheapest path from `a` to `b`.
pub trait Metric<N>: Send + Sync {
    fn distance(&self, first: N, second: N) -> f64;
}

/// Straight-line distance, expressed as the time it takes to cover it at
/// the highest speed possible on the road network.
///
/// # Examples
///
/// ```
/// use route_engine::metric::{AsTheCrowFliesMetric, Metric};
/// use route_engine::model::RoadNode;
///
/// let a = RoadNode::new(0, 48.0, 7.80);
/// let b = RoadNode::new(1, 48.0, 7.85);
/// let seconds = AsTheCrowFliesMetric.distance(a, b);
/// // about 3.7 km at 200 km/h
/// assert!(seconds > 60.0 && seconds < 70.0);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct AsTheCrowFliesMetric;

impl<N: Spatial> Metric<N> for AsTheCrowFliesMetric {
    fn distance(&self, first: N, second: N) -> f64 {
        let meters = distance_equirect(first.coordinates(), second.coordinates());
        travel_time_secs(meters, MAXIMAL_ROAD_SPEED_KMH)
    }
}
