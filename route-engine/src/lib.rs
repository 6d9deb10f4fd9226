//! Multi-modal route planning core.
//!
//! Road networks and transit schedules are modelled as graphs (see
//! [`model`]) or as a [`timetable`]. Shortest paths are computed by a
//! Dijkstra that search modules turn into A*, ALT, mode restricted or
//! schedule aware searches, and by the Connection Scan Algorithm.
//! [`shortest_path::ShortestPathComputationFactory`] wires them up
//! according to a [`config::RoutingConfig`].

pub mod config;
pub mod metric;
pub mod model;
pub mod path;
pub mod shortest_path;
pub mod timetable;
