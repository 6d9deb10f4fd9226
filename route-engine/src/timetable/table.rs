//! The timetable: stops, trips, the globally sorted connection list and
//! footpaths.

use std::collections::{HashMap, HashSet};

use tracing::debug;

use super::error::TimetableError;
use super::types::{Connection, Footpath, Stop, Trip};
use crate::model::{
    AdjacencyGraph, BasicEdge, BasicNode, MutableGraph, SECONDS_OF_DAY, UniqueIdGenerator,
    WALKING_SPEED_KMH, distance_equirect, travel_time_secs,
};
use crate::shortest_path::{Dijkstra, ShortestPathComputation};

/// Counts of footpaths added by [`Timetable::correct_footpaths`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FootpathCorrection {
    pub self_loops: usize,
    pub close_stops: usize,
    pub transitive: usize,
}

/// Stops, trips and footpaths of a transit network.
///
/// Connections are kept sorted by departure time (see the field order of
/// [`Connection`]) after every insert, so a scan can start anywhere with
/// a binary search.
///
/// # Examples
///
/// ```
/// use route_engine::timetable::{Connection, Stop, Timetable, Trip};
///
/// let mut timetable = Timetable::new();
/// timetable.add_stop(Stop::new(0, 48.0, 7.8)).unwrap();
/// timetable.add_stop(Stop::new(1, 48.1, 7.8)).unwrap();
/// timetable.add_trip(Trip::new(0)).unwrap();
/// timetable
///     .add_connections(vec![Connection::new(0, 0, 0, 1, 3_600, 4_200)])
///     .unwrap();
///
/// assert_eq!(timetable.connections().len(), 1);
/// assert_eq!(timetable.trip(0).unwrap().len(), 1);
/// ```
#[derive(Debug, Clone, Default)]
pub struct Timetable {
    stops: HashMap<u32, Stop>,
    trips: HashMap<u32, Trip>,
    connections: Vec<Connection>,
    footpaths: HashMap<u32, Vec<Footpath>>,
    footpath_count: usize,
    stop_ids: UniqueIdGenerator,
    trip_ids: UniqueIdGenerator,
    greatest_stop_id: Option<u32>,
    greatest_trip_id: Option<u32>,
}

impl Timetable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_stop(&mut self, stop: Stop) -> Result<(), TimetableError> {
        if self.stops.contains_key(&stop.id) {
            return Err(TimetableError::DuplicateStop(stop.id));
        }
        self.stop_ids.reserve(stop.id);
        self.greatest_stop_id = self.greatest_stop_id.max(Some(stop.id));
        self.stops.insert(stop.id, stop);
        Ok(())
    }

    /// Add a trip. Connections already in the trip are added to the
    /// timetable as well.
    pub fn add_trip(&mut self, trip: Trip) -> Result<(), TimetableError> {
        if self.trips.contains_key(&trip.id) {
            return Err(TimetableError::DuplicateTrip(trip.id));
        }
        for connection in trip.connections() {
            self.require_stop(connection.departure_stop_id)?;
            self.require_stop(connection.arrival_stop_id)?;
        }

        self.trip_ids.reserve(trip.id);
        self.greatest_trip_id = self.greatest_trip_id.max(Some(trip.id));
        if !trip.is_empty() {
            self.connections.extend_from_slice(trip.connections());
            self.connections.sort_unstable();
        }
        self.trips.insert(trip.id, trip);
        Ok(())
    }

    /// Append connections to their trips.
    ///
    /// The batch may arrive in any order but, per trip, must continue the
    /// trip's sequence without gaps. Nothing is added if any connection is
    /// rejected.
    pub fn add_connections(
        &mut self,
        connections: impl IntoIterator<Item = Connection>,
    ) -> Result<(), TimetableError> {
        let mut batch: Vec<Connection> = connections.into_iter().collect();
        if batch.is_empty() {
            return Ok(());
        }
        batch.sort_unstable_by_key(|connection| (connection.trip_id, connection.sequence_index));

        let mut expected: HashMap<u32, u32> = HashMap::new();
        for connection in &batch {
            let trip = self
                .trips
                .get(&connection.trip_id)
                .ok_or(TimetableError::UnknownTrip(connection.trip_id))?;
            self.require_stop(connection.departure_stop_id)?;
            self.require_stop(connection.arrival_stop_id)?;

            let next = expected
                .entry(connection.trip_id)
                .or_insert(trip.len() as u32);
            if connection.sequence_index != *next {
                return Err(TimetableError::OutOfSequence {
                    trip: connection.trip_id,
                    expected: *next,
                    found: connection.sequence_index,
                });
            }
            *next += 1;
        }

        for connection in &batch {
            if let Some(trip) = self.trips.get_mut(&connection.trip_id) {
                trip.push_connection(*connection)?;
            }
        }
        self.connections.extend(batch);
        self.connections.sort_unstable();
        Ok(())
    }

    /// Add a footpath. Returns `false` if one between the same stops
    /// already exists.
    pub fn add_footpath(&mut self, footpath: Footpath) -> Result<bool, TimetableError> {
        self.require_stop(footpath.departure_stop_id)?;
        self.require_stop(footpath.arrival_stop_id)?;

        let outgoing = self.footpaths.entry(footpath.departure_stop_id).or_default();
        if outgoing
            .iter()
            .any(|existing| existing.arrival_stop_id == footpath.arrival_stop_id)
        {
            return Ok(false);
        }
        outgoing.push(footpath);
        self.footpath_count += 1;
        Ok(true)
    }

    pub fn generate_unique_stop_id(&mut self) -> Result<u32, TimetableError> {
        let id = self.stop_ids.generate()?;
        self.greatest_stop_id = self.greatest_stop_id.max(Some(id));
        Ok(id)
    }

    pub fn generate_unique_trip_id(&mut self) -> Result<u32, TimetableError> {
        let id = self.trip_ids.generate()?;
        self.greatest_trip_id = self.greatest_trip_id.max(Some(id));
        Ok(id)
    }

    /// Greatest stop id ever added or generated.
    pub fn greatest_stop_id(&self) -> Option<u32> {
        self.greatest_stop_id
    }

    pub fn greatest_trip_id(&self) -> Option<u32> {
        self.greatest_trip_id
    }

    pub fn stop(&self, id: u32) -> Option<&Stop> {
        self.stops.get(&id)
    }

    pub fn trip(&self, id: u32) -> Option<&Trip> {
        self.trips.get(&id)
    }

    pub fn stops(&self) -> impl Iterator<Item = &Stop> + '_ {
        self.stops.values()
    }

    pub fn stop_count(&self) -> usize {
        self.stops.len()
    }

    pub fn trips(&self) -> impl Iterator<Item = &Trip> + '_ {
        self.trips.values()
    }

    /// All connections in scan order.
    pub fn connections(&self) -> &[Connection] {
        &self.connections
    }

    pub fn outgoing_footpaths(&self, stop_id: u32) -> &[Footpath] {
        self.footpaths
            .get(&stop_id)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn footpath_count(&self) -> usize {
        self.footpath_count
    }

    /// Every connection exactly once, starting with the first one that
    /// departs at or after `time` (seconds, taken modulo one day) and
    /// wrapping around to the early connections of the day.
    pub fn connections_starting_since(&self, time: u32) -> impl Iterator<Item = &Connection> + '_ {
        let time = time % SECONDS_OF_DAY;
        let start = self
            .connections
            .partition_point(|connection| connection.departure_time < time);
        self.connections[start..]
            .iter()
            .chain(self.connections[..start].iter())
    }

    /// Complete the footpaths so that the scan can rely on them.
    ///
    /// 1. Every stop gets a self-loop with `transfer_delay_secs`, unless it
    ///    already has one.
    /// 2. Stops closer than `reachability_m` are connected by a walk.
    /// 3. If stop `c` can be walked to from `a` via other stops, `a` gets a
    ///    direct footpath to `c` with the shortest walking time.
    pub fn correct_footpaths(
        &mut self,
        transfer_delay_secs: u32,
        reachability_m: f64,
    ) -> FootpathCorrection {
        let mut correction = FootpathCorrection::default();
        let mut stops: Vec<Stop> = self.stops.values().copied().collect();
        stops.sort_unstable_by_key(|stop| stop.id);

        for stop in &stops {
            let loop_path = Footpath::new(stop.id, stop.id, transfer_delay_secs);
            if self.insert_footpath(loop_path) {
                correction.self_loops += 1;
            }
        }

        for (index, first) in stops.iter().enumerate() {
            for second in &stops[index + 1..] {
                let distance = distance_equirect(first.coordinates, second.coordinates);
                if distance > reachability_m {
                    continue;
                }
                let duration = travel_time_secs(distance, WALKING_SPEED_KMH).ceil() as u32;
                if self.insert_footpath(Footpath::new(first.id, second.id, duration)) {
                    correction.close_stops += 1;
                }
                if self.insert_footpath(Footpath::new(second.id, first.id, duration)) {
                    correction.close_stops += 1;
                }
            }
        }

        let mut walks: AdjacencyGraph<BasicNode, BasicEdge<BasicNode>> = AdjacencyGraph::new();
        walks.add_nodes(stops.iter().map(|stop| BasicNode(stop.id)));
        walks.add_edges(
            self.footpaths
                .values()
                .flatten()
                .filter(|footpath| !footpath.is_self_loop())
                .map(|footpath| {
                    BasicEdge::new(
                        BasicNode(footpath.departure_stop_id),
                        BasicNode(footpath.arrival_stop_id),
                        f64::from(footpath.duration),
                    )
                }),
        );

        let mut closure = Vec::new();
        {
            let dijkstra = Dijkstra::new(&walks);
            for stop in &stops {
                let known: HashSet<u32> = self
                    .outgoing_footpaths(stop.id)
                    .iter()
                    .map(|footpath| footpath.arrival_stop_id)
                    .collect();
                let mut reachable: Vec<(BasicNode, f64)> = dijkstra
                    .compute_shortest_path_costs_reachable_from(BasicNode(stop.id))
                    .into_iter()
                    .filter(|(node, _)| node.0 != stop.id && !known.contains(&node.0))
                    .collect();
                reachable.sort_unstable_by_key(|(node, _)| *node);
                closure.extend(reachable.into_iter().map(|(node, cost)| {
                    Footpath::new(stop.id, node.0, cost.ceil() as u32)
                }));
            }
        }
        for footpath in closure {
            if self.insert_footpath(footpath) {
                correction.transitive += 1;
            }
        }

        debug!(
            self_loops = correction.self_loops,
            close_stops = correction.close_stops,
            transitive = correction.transitive,
            "corrected footpaths"
        );
        correction
    }

    pub fn size_information(&self) -> String {
        format!(
            "#stops: {}, #trips: {}, #connections: {}, #footpaths: {}",
            self.stops.len(),
            self.trips.len(),
            self.connections.len(),
            self.footpath_count
        )
    }

    fn require_stop(&self, id: u32) -> Result<(), TimetableError> {
        if self.stops.contains_key(&id) {
            Ok(())
        } else {
            Err(TimetableError::UnknownStop(id))
        }
    }

    /// Footpath insertion for stops known to exist.
    fn insert_footpath(&mut self, footpath: Footpath) -> bool {
        self.add_footpath(footpath).unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn timetable_with_stops(ids: &[u32]) -> Timetable {
        let mut timetable = Timetable::new();
        for &id in ids {
            timetable
                .add_stop(Stop::new(id, 48.0 + id as f32 * 0.1, 7.8))
                .unwrap();
        }
        timetable
    }

    #[test]
    fn connections_stay_sorted() {
        let mut timetable = timetable_with_stops(&[0, 1, 2]);
        timetable.add_trip(Trip::new(0)).unwrap();
        timetable.add_trip(Trip::new(1)).unwrap();

        timetable
            .add_connections(vec![
                Connection::new(0, 1, 1, 2, 500, 600),
                Connection::new(1, 0, 0, 1, 200, 300),
                Connection::new(0, 0, 0, 1, 400, 500),
            ])
            .unwrap();
        timetable
            .add_connections(vec![Connection::new(1, 1, 1, 2, 300, 450)])
            .unwrap();

        let departures: Vec<u32> = timetable
            .connections()
            .iter()
            .map(|c| c.departure_time)
            .collect();
        assert_eq!(departures, vec![200, 300, 400, 500]);
        assert_eq!(timetable.trip(0).unwrap().len(), 2);
        assert_eq!(timetable.trip(1).unwrap().len(), 2);
    }

    #[test]
    fn rejected_batch_adds_nothing() {
        let mut timetable = timetable_with_stops(&[0, 1]);
        timetable.add_trip(Trip::new(0)).unwrap();

        let result = timetable.add_connections(vec![
            Connection::new(0, 0, 0, 1, 100, 200),
            Connection::new(0, 2, 1, 0, 200, 300),
        ]);
        assert_eq!(
            result,
            Err(TimetableError::OutOfSequence {
                trip: 0,
                expected: 1,
                found: 2
            })
        );
        assert!(timetable.connections().is_empty());
        assert!(timetable.trip(0).unwrap().is_empty());

        assert_eq!(
            timetable.add_connections(vec![Connection::new(5, 0, 0, 1, 0, 1)]),
            Err(TimetableError::UnknownTrip(5))
        );
        assert_eq!(
            timetable.add_connections(vec![Connection::new(0, 0, 0, 9, 0, 1)]),
            Err(TimetableError::UnknownStop(9))
        );
    }

    #[test]
    fn duplicates_are_rejected() {
        let mut timetable = timetable_with_stops(&[0]);
        assert_eq!(
            timetable.add_stop(Stop::new(0, 1.0, 1.0)),
            Err(TimetableError::DuplicateStop(0))
        );
        timetable.add_trip(Trip::new(3)).unwrap();
        assert_eq!(
            timetable.add_trip(Trip::new(3)),
            Err(TimetableError::DuplicateTrip(3))
        );
    }

    #[test]
    fn footpaths_are_unique_per_stop_pair() {
        let mut timetable = timetable_with_stops(&[0, 1]);
        assert_eq!(timetable.add_footpath(Footpath::new(0, 1, 60)), Ok(true));
        assert_eq!(timetable.add_footpath(Footpath::new(0, 1, 30)), Ok(false));
        assert_eq!(timetable.add_footpath(Footpath::new(1, 0, 60)), Ok(true));
        assert_eq!(
            timetable.add_footpath(Footpath::new(0, 7, 60)),
            Err(TimetableError::UnknownStop(7))
        );
        assert_eq!(timetable.footpath_count(), 2);
        assert_eq!(timetable.outgoing_footpaths(0)[0].duration, 60);
        assert!(timetable.outgoing_footpaths(5).is_empty());
    }

    #[test]
    fn generated_ids_skip_added_ones() {
        let mut timetable = timetable_with_stops(&[0, 4]);
        assert_eq!(timetable.generate_unique_stop_id(), Ok(5));
        assert_eq!(timetable.greatest_stop_id(), Some(5));

        assert_eq!(timetable.greatest_trip_id(), None);
        assert_eq!(timetable.generate_unique_trip_id(), Ok(0));
        timetable.add_trip(Trip::new(10)).unwrap();
        assert_eq!(timetable.generate_unique_trip_id(), Ok(11));
        assert_eq!(timetable.greatest_trip_id(), Some(11));
    }

    #[test]
    fn scan_order_wraps_around() {
        let mut timetable = timetable_with_stops(&[0, 1]);
        timetable.add_trip(Trip::new(0)).unwrap();
        timetable.add_trip(Trip::new(1)).unwrap();
        timetable.add_trip(Trip::new(2)).unwrap();
        timetable
            .add_connections(vec![
                Connection::new(0, 0, 0, 1, 100, 200),
                Connection::new(1, 0, 0, 1, 500, 600),
                Connection::new(2, 0, 0, 1, 900, 1_000),
            ])
            .unwrap();

        let order = |time| -> Vec<u32> {
            timetable
                .connections_starting_since(time)
                .map(|c| c.departure_time)
                .collect()
        };
        assert_eq!(order(0), vec![100, 500, 900]);
        assert_eq!(order(500), vec![500, 900, 100]);
        assert_eq!(order(501), vec![900, 100, 500]);
        assert_eq!(order(5_000), vec![100, 500, 900]);
        assert_eq!(order(SECONDS_OF_DAY + 500), vec![500, 900, 100]);
    }

    #[test]
    fn footpath_correction() {
        let mut timetable = Timetable::new();
        // 0 and 1 are about 55 m apart, 2 is far away
        timetable.add_stop(Stop::new(0, 48.0, 7.8)).unwrap();
        timetable.add_stop(Stop::new(1, 48.0005, 7.8)).unwrap();
        timetable.add_stop(Stop::new(2, 48.5, 7.8)).unwrap();
        timetable.add_stop(Stop::new(3, 48.6, 7.8)).unwrap();
        timetable.add_footpath(Footpath::new(1, 2, 600)).unwrap();
        timetable.add_footpath(Footpath::new(2, 3, 300)).unwrap();
        timetable.add_footpath(Footpath::new(2, 2, 60)).unwrap();

        let correction = timetable.correct_footpaths(120, 100.0);
        assert_eq!(correction.self_loops, 3);
        assert_eq!(correction.close_stops, 2);
        // 0 -> 2, 0 -> 3, 1 -> 3
        assert_eq!(correction.transitive, 3);

        let duration = |from: u32, to: u32| {
            timetable
                .outgoing_footpaths(from)
                .iter()
                .find(|footpath| footpath.arrival_stop_id == to)
                .map(|footpath| footpath.duration)
        };
        assert_eq!(duration(2, 2), Some(60));
        assert_eq!(duration(3, 3), Some(120));
        let walk = duration(0, 1).unwrap();
        assert!((39..=41).contains(&walk), "got {walk}");
        assert_eq!(duration(1, 0), Some(walk));
        assert_eq!(duration(1, 3), Some(900));
        assert_eq!(duration(0, 3), Some(walk + 900));
        assert_eq!(duration(3, 0), None);

        let again = timetable.correct_footpaths(120, 100.0);
        assert_eq!(again, FootpathCorrection::default());
    }

    #[test]
    fn size_information() {
        let mut timetable = timetable_with_stops(&[0, 1]);
        timetable.add_trip(Trip::new(0)).unwrap();
        assert_eq!(
            timetable.size_information(),
            "#stops: 2, #trips: 1, #connections: 0, #footpaths: 0"
        );
    }
}
