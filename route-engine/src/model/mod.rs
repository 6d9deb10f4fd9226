//! Graph model: nodes, edges, transportation modes and the concrete
//! road, transit and link graphs.

mod edge;
mod geo;
mod graph;
mod id;
mod link;
mod mode;
mod node;
mod road;
mod transit;

pub use edge::{
    BasicEdge, CoreEdge, Edge, HasTransportationModes, LinkEdge, RoadEdge, TransitEdge,
};
pub use geo::{
    Coordinates, EARTH_RADIUS_MEAN_M, MAXIMAL_ROAD_SPEED_KMH, Spatial, WALKING_SPEED_KMH,
    distance_equirect, kmh_to_ms, travel_time_secs,
};
pub use graph::{AdjacencyGraph, Graph, MutableGraph, Reversed};
pub use id::{IdSpaceExhausted, UniqueIdGenerator};
pub use link::LinkGraph;
pub use mode::{ModeSet, TransportationMode};
pub use node::{BasicNode, CoreNode, HasId, HasTime, RoadNode, SECONDS_OF_DAY, TransitNode};
pub use road::RoadGraph;
pub use transit::{NodeTime, TransitGraph, TransitStop};
