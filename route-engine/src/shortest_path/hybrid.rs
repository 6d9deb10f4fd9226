//! Routing on a road graph with a separate timetable.
//!
//! The road graph knows nothing about transit. A journey that uses transit
//! walks from the source to an access stop, rides according to the
//! timetable and walks from an egress stop to the destination.

use std::collections::HashMap;

use chrono::{NaiveDateTime, Timelike};
use tracing::trace;

use super::ShortestPathComputation;
use super::connection_scan::ConnectionScan;
use super::dijkstra::Dijkstra;
use crate::model::{
    Coordinates, CoreEdge, CoreNode, Graph, LinkEdge, ModeSet, SECONDS_OF_DAY, Spatial,
    TransportationMode, WALKING_SPEED_KMH, distance_equirect, travel_time_secs,
};
use crate::path::{EdgePath, Path};
use crate::timetable::Timetable;

/// Translates a position on the road network into a stop of the
/// timetable.
pub trait TransitAccess: Send + Sync {
    /// The stop to use from `coordinates` and the seconds it takes to
    /// walk there, or `None` if no stop is close enough.
    fn access_stop(&self, coordinates: Coordinates) -> Option<(u32, u32)>;
}

/// Picks the stop with the shortest straight-line walk.
#[derive(Debug, Clone, Copy)]
pub struct NearestStopAccess<'t> {
    timetable: &'t Timetable,
    max_walk_secs: u32,
}

impl<'t> NearestStopAccess<'t> {
    pub fn new(timetable: &'t Timetable, max_walk_secs: u32) -> Self {
        Self {
            timetable,
            max_walk_secs,
        }
    }
}

impl TransitAccess for NearestStopAccess<'_> {
    fn access_stop(&self, coordinates: Coordinates) -> Option<(u32, u32)> {
        self.timetable
            .stops()
            .map(|stop| {
                let distance = distance_equirect(coordinates, stop.coordinates);
                let walk = travel_time_secs(distance, WALKING_SPEED_KMH).ceil() as u32;
                (walk, stop.id)
            })
            .filter(|(walk, _)| *walk <= self.max_walk_secs)
            .min()
            .map(|(walk, stop)| (stop, walk))
    }
}

/// Road routing combined with connection scans over a timetable.
///
/// Answers a path query with the cheaper of the road-only path and the
/// walk, ride, walk journey. Walks to and from stops appear in the path as
/// link edges that cost the walking time. If the allowed modes exclude
/// trams, only the road graph is used. Reachability and search space
/// queries cover the road graph only.
pub struct HybridRoadTimetable<'a, G: Graph<Node = CoreNode, Edge = CoreEdge>> {
    road: Dijkstra<'a, G>,
    csa: ConnectionScan<'a>,
    access: Box<dyn TransitAccess + 'a>,
    departure_secs: u32,
    modes: ModeSet,
}

impl<'a, G: Graph<Node = CoreNode, Edge = CoreEdge>> HybridRoadTimetable<'a, G> {
    pub fn new(
        road: Dijkstra<'a, G>,
        timetable: &'a Timetable,
        access: impl TransitAccess + 'a,
        departure: NaiveDateTime,
        modes: ModeSet,
    ) -> Self {
        Self {
            road,
            csa: ConnectionScan::new(timetable),
            access: Box::new(access),
            departure_secs: departure.time().num_seconds_from_midnight(),
            modes,
        }
    }

    fn transit_path(&self, sources: &[CoreNode], destination: CoreNode) -> Option<Path<CoreEdge>> {
        // Cheapest walk into every access stop
        let mut entries: HashMap<u32, (CoreNode, u32)> = HashMap::new();
        for &source in sources {
            let Some((stop, walk)) = self.access.access_stop(source.coordinates()) else {
                continue;
            };
            entries
                .entry(stop)
                .and_modify(|entry| {
                    if walk < entry.1 {
                        *entry = (source, walk);
                    }
                })
                .or_insert((source, walk));
        }
        let (egress, egress_walk) = self.access.access_stop(destination.coordinates())?;
        if entries.is_empty() {
            return None;
        }

        let mut stops: Vec<(u32, u32)> = entries
            .iter()
            .map(|(&stop, &(_, walk))| (stop, (self.departure_secs + walk) % SECONDS_OF_DAY))
            .collect();
        stops.sort_unstable();
        let result = self.csa.scan_since(self.departure_secs, &stops, Some(egress));
        let journey = self.csa.journey(&result, egress)?;
        // Access and egress at the same stop would be a walk neither
        // network knows about
        if journey.is_empty() {
            return None;
        }

        let first_stop = journey.source()?.as_transit()?;
        let &(source, access_walk) = entries.get(&first_stop.id)?;
        let last_stop = journey.destination()?.as_transit()?;

        let mut path = EdgePath::new();
        path.add_edge(
            CoreEdge::Link(LinkEdge::new(source, CoreNode::Transit(first_stop))),
            f64::from(access_walk),
        );
        if let Path::Edges(rides) = journey {
            path.extend(rides.iter().cloned());
        }
        path.add_edge(
            CoreEdge::Link(LinkEdge::new(CoreNode::Transit(last_stop), destination)),
            f64::from(egress_walk),
        );

        trace!(
            access_stops = stops.len(),
            egress,
            scanned = result.scanned(),
            cost = path.total_cost(),
            "transit journey found"
        );
        Some(Path::Edges(path))
    }
}

impl<G: Graph<Node = CoreNode, Edge = CoreEdge>> ShortestPathComputation<CoreEdge>
    for HybridRoadTimetable<'_, G>
{
    fn compute_shortest_path(&self, sources: &[CoreNode], destination: CoreNode) -> Option<Path<CoreEdge>> {
        let road = self.road.compute_shortest_path(sources, destination);
        if !self.modes.contains(TransportationMode::Tram) {
            return road;
        }
        let transit = self.transit_path(sources, destination);
        match (road, transit) {
            (Some(road), Some(transit)) if transit.total_cost() < road.total_cost() => Some(transit),
            (Some(road), _) => Some(road),
            (None, transit) => transit,
        }
    }

    fn compute_shortest_path_costs_reachable(&self, sources: &[CoreNode]) -> HashMap<CoreNode, f64> {
        self.road.compute_shortest_path_costs_reachable(sources)
    }

    fn compute_search_space(&self, sources: &[CoreNode], destination: Option<CoreNode>) -> Vec<CoreNode> {
        self.road.compute_search_space(sources, destination)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{AdjacencyGraph, MutableGraph, RoadEdge, RoadNode};
    use crate::shortest_path::MultiModalModule;
    use crate::timetable::{Connection, Stop, Trip};
    use chrono::NaiveDate;

    fn at(hour: u32, minute: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 5, 6)
            .unwrap()
            .and_hms_opt(hour, minute, 0)
            .unwrap()
    }

    fn road(id: u32, longitude: f32) -> RoadNode {
        RoadNode::new(id, 48.0, longitude)
    }

    /// Two road nodes about 7.4 km apart, connected by a footway only,
    /// and a tram between stops right next to them.
    fn network() -> (AdjacencyGraph<CoreNode, CoreEdge>, Timetable) {
        let mut graph = AdjacencyGraph::new();
        let walk = ModeSet::single(TransportationMode::Foot);
        graph.add_edge(CoreEdge::Road(RoadEdge::new(
            0,
            road(0, 7.8),
            road(1, 7.9),
            7_440.0,
            50.0,
            walk,
        )));

        let mut timetable = Timetable::new();
        timetable.add_stop(Stop::new(10, 48.0, 7.8)).unwrap();
        timetable.add_stop(Stop::new(11, 48.0, 7.9)).unwrap();
        timetable.add_trip(Trip::new(0)).unwrap();
        timetable
            .add_connections(vec![Connection::new(0, 0, 10, 11, 3_660, 4_200)])
            .unwrap();
        (graph, timetable)
    }

    /// Two road nodes next to stop 10, joined only by a long detour.
    fn detour() -> AdjacencyGraph<CoreNode, CoreEdge> {
        let mut graph = AdjacencyGraph::new();
        let walk = ModeSet::single(TransportationMode::Foot);
        graph.add_edge(CoreEdge::Road(RoadEdge::new(
            0,
            road(2, 7.8005),
            road(3, 7.7995),
            20_000.0,
            50.0,
            walk,
        )));
        graph
    }

    fn hybrid<'a>(
        graph: &'a AdjacencyGraph<CoreNode, CoreEdge>,
        timetable: &'a Timetable,
        departure: NaiveDateTime,
        modes: ModeSet,
    ) -> HybridRoadTimetable<'a, AdjacencyGraph<CoreNode, CoreEdge>> {
        let road = Dijkstra::new(graph).with_module(MultiModalModule::new(modes));
        HybridRoadTimetable::new(
            road,
            timetable,
            NearestStopAccess::new(timetable, 900),
            departure,
            modes,
        )
    }

    #[test]
    fn nearest_stop_within_reach() {
        let (_, timetable) = network();
        let access = NearestStopAccess::new(&timetable, 900);
        assert_eq!(access.access_stop(Coordinates::new(48.0, 7.8)), Some((10, 0)));
        assert_eq!(access.access_stop(Coordinates::new(48.0, 7.85)), None);

        let (stop, walk) = NearestStopAccess::new(&timetable, 5_000)
            .access_stop(Coordinates::new(48.0, 7.86))
            .unwrap();
        assert_eq!(stop, 11);
        assert!(walk > 2_000, "got {walk}");
    }

    #[test]
    fn takes_the_tram_when_faster() {
        let (graph, timetable) = network();
        let algorithm = hybrid(&graph, &timetable, at(1, 0), ModeSet::all());

        let path = algorithm
            .compute_shortest_path_from(road(0, 7.8).into(), road(1, 7.9).into())
            .unwrap();
        assert_eq!(path.total_cost(), 600.0);
        assert_eq!(path.len(), 3);
        assert!(matches!(
            path.edges().nth(1).map(|entry| &entry.edge),
            Some(CoreEdge::Transit(_))
        ));
        assert_eq!(path.source(), Some(road(0, 7.8).into()));
        assert_eq!(path.destination(), Some(road(1, 7.9).into()));
    }

    #[test]
    fn walks_without_trams() {
        let (graph, timetable) = network();
        let modes = ModeSet::single(TransportationMode::Foot);
        let algorithm = hybrid(&graph, &timetable, at(1, 0), modes);

        let cost = algorithm
            .compute_shortest_path_cost_from(road(0, 7.8).into(), road(1, 7.9).into())
            .unwrap();
        assert!((cost - 5_356.8).abs() < 1.0, "got {cost}");
    }

    #[test]
    fn walks_when_the_tram_is_gone() {
        let (graph, timetable) = network();
        let algorithm = hybrid(&graph, &timetable, at(1, 30), ModeSet::all());

        let path = algorithm
            .compute_shortest_path_from(road(0, 7.8).into(), road(1, 7.9).into())
            .unwrap();
        assert_eq!(path.len(), 1);
        assert!(matches!(
            path.edges().next().map(|entry| &entry.edge),
            Some(CoreEdge::Road(_))
        ));
    }

    #[test]
    fn one_stop_is_no_transit_journey() {
        let graph = detour();
        let (_, timetable) = network();
        let source = CoreNode::from(road(2, 7.8005));
        let destination = CoreNode::from(road(3, 7.7995));

        let algorithm = hybrid(&graph, &timetable, at(1, 0), ModeSet::all());
        let path = algorithm
            .compute_shortest_path_from(source, destination)
            .unwrap();
        assert_eq!(path.len(), 1);
        assert!(matches!(
            path.edges().next().map(|entry| &entry.edge),
            Some(CoreEdge::Road(_))
        ));
        assert!((path.total_cost() - 14_400.0).abs() < 1e-6, "got {}", path.total_cost());

        let trams = ModeSet::single(TransportationMode::Tram);
        let trams = hybrid(&graph, &timetable, at(1, 0), trams);
        assert_eq!(trams.compute_shortest_path_from(source, destination), None);
    }

    #[test]
    fn road_only_queries() {
        let (graph, timetable) = network();
        let algorithm = hybrid(&graph, &timetable, at(1, 0), ModeSet::all());

        let reachable = algorithm.compute_shortest_path_costs_reachable_from(road(0, 7.8).into());
        assert_eq!(reachable.len(), 2);
        assert_eq!(
            algorithm.compute_search_space(&[road(1, 7.9).into()], None),
            vec![CoreNode::from(road(1, 7.9))]
        );
    }
}
