//! The Connection Scan Algorithm over a [`Timetable`].

use std::collections::HashMap;
use std::collections::hash_map::Entry;

use tracing::trace;

use super::ShortestPathComputation;
use crate::model::{CoreEdge, CoreNode, SECONDS_OF_DAY, TransitEdge, TransitNode};
use crate::path::{EdgePath, Path};
use crate::timetable::{Connection, Footpath, Timetable};

const UNREACHED: u32 = u32::MAX;

/// How a stop was reached, for rebuilding the journey.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JourneyPointer {
    /// The stop is a source of the query.
    Source,
    /// Walked to from a source before taking any vehicle.
    InitialWalk(Footpath),
    /// Rode a trip from `enter` to `exit`, then optionally walked.
    Ride {
        enter: Connection,
        exit: Connection,
        footpath: Option<Footpath>,
    },
}

/// The earliest a vehicle can be boarded at a stop and how the stop was
/// reached for that.
///
/// This differs from the earliest arrival when the arrival was a ride and
/// a later walk beats the ride's transfer time.
#[derive(Debug, Clone, Copy)]
struct Boarding {
    reached: u32,
    ready: u32,
    pointer: JourneyPointer,
}

/// Earliest arrival times of one scan.
///
/// Arrival times are seconds since midnight of the day the scan started
/// on, so they exceed [`SECONDS_OF_DAY`] for stops reached after midnight.
#[derive(Debug, Clone)]
pub struct ScanResult {
    start: u32,
    arrival: Vec<u32>,
    pointers: Vec<Option<JourneyPointer>>,
    boarding: Vec<Option<Boarding>>,
    scanned: usize,
}

impl ScanResult {
    fn unreached(start: u32, stops: usize) -> Self {
        Self {
            start,
            arrival: vec![UNREACHED; stops],
            pointers: vec![None; stops],
            boarding: vec![None; stops],
            scanned: 0,
        }
    }

    /// Time of day the scan started at, the earliest source departure.
    pub fn start(&self) -> u32 {
        self.start
    }

    pub fn arrival_at(&self, stop: u32) -> Option<u32> {
        self.arrival
            .get(stop as usize)
            .copied()
            .filter(|&time| time != UNREACHED)
    }

    /// Seconds from the start of the scan until `stop` is reached.
    pub fn travel_time_to(&self, stop: u32) -> Option<u32> {
        self.arrival_at(stop).map(|time| time - self.start)
    }

    pub fn pointer(&self, stop: u32) -> Option<&JourneyPointer> {
        self.pointers.get(stop as usize).and_then(Option::as_ref)
    }

    /// Number of connections looked at.
    pub fn scanned(&self) -> usize {
        self.scanned
    }

    /// Every reached stop, earliest arrival first.
    pub fn reached_stops(&self) -> Vec<u32> {
        let mut reached: Vec<(u32, u32)> = self
            .arrival
            .iter()
            .enumerate()
            .filter(|(_, time)| **time != UNREACHED)
            .map(|(stop, time)| (*time, stop as u32))
            .collect();
        reached.sort_unstable();
        reached.into_iter().map(|(_, stop)| stop).collect()
    }

    fn ready_at(&self, stop: usize) -> u32 {
        self.boarding[stop].map_or(UNREACHED, |boarding| boarding.ready)
    }

    fn offer_boarding(&mut self, stop: usize, reached: u32, ready: u32, pointer: JourneyPointer) {
        if ready < self.ready_at(stop) {
            self.boarding[stop] = Some(Boarding {
                reached,
                ready,
                pointer,
            });
        }
    }

    fn offer_arrival(&mut self, stop: usize, arrival: u32, pointer: JourneyPointer) -> bool {
        if arrival < self.arrival[stop] {
            self.arrival[stop] = arrival;
            self.pointers[stop] = Some(pointer);
            true
        } else {
            false
        }
    }

    /// Map a time of day onto the timeline of this scan.
    fn normalize(&self, time: u32) -> u32 {
        let time = time % SECONDS_OF_DAY;
        if time < self.start {
            time + SECONDS_OF_DAY
        } else {
            time
        }
    }
}

/// Earliest arrival queries on a timetable, without any road graph.
///
/// Connections are swept once in departure order, starting at the query
/// time and wrapping past midnight. There is no priority queue; the sort
/// order of [`Timetable::connections`] is what makes the sweep correct.
///
/// Changing vehicles at a stop takes as long as the stop's self-loop
/// footpath. Staying on the same trip never does. Walking from a source
/// or after alighting is free of the transfer time, so a walk that
/// arrives after a ride may still be the earliest way to board there.
///
/// As a [`ShortestPathComputation`], nodes are [`CoreNode::Transit`]
/// values whose id is the stop id and whose time is the departure time
/// for sources. Costs are seconds of travel, waiting included.
///
/// # Examples
///
/// ```
/// use route_engine::shortest_path::ConnectionScan;
/// use route_engine::timetable::{Connection, Stop, Timetable, Trip};
///
/// let mut timetable = Timetable::new();
/// for id in 0..3 {
///     timetable.add_stop(Stop::new(id, 48.0, 7.8 + id as f32 * 0.01)).unwrap();
/// }
/// timetable.add_trip(Trip::new(0)).unwrap();
/// timetable
///     .add_connections(vec![
///         Connection::new(0, 0, 0, 1, 100, 120),
///         Connection::new(0, 1, 1, 2, 120, 140),
///     ])
///     .unwrap();
///
/// let csa = ConnectionScan::new(&timetable);
/// assert_eq!(csa.earliest_arrival(0, 100, 2), Some(140));
/// ```
#[derive(Debug, Clone, Copy)]
pub struct ConnectionScan<'t> {
    timetable: &'t Timetable,
}

impl<'t> ConnectionScan<'t> {
    pub fn new(timetable: &'t Timetable) -> Self {
        Self { timetable }
    }

    pub fn timetable(&self) -> &'t Timetable {
        self.timetable
    }

    /// Earliest arrival at `target` when leaving `source` at `departure`.
    pub fn earliest_arrival(&self, source: u32, departure: u32, target: u32) -> Option<u32> {
        self.scan(&[(source, departure)], Some(target))
            .arrival_at(target)
    }

    /// Scan from `(stop, departure)` pairs. With a target, the scan stops
    /// as soon as no later connection can improve on the target.
    ///
    /// # Panics
    ///
    /// If a source or the target is not a stop of the timetable.
    pub fn scan(&self, sources: &[(u32, u32)], target: Option<u32>) -> ScanResult {
        let start = sources
            .iter()
            .map(|(_, departure)| departure % SECONDS_OF_DAY)
            .min()
            .unwrap_or(0);
        self.run(sources, start, target, None)
    }

    /// Like [`ConnectionScan::scan`], but the timeline starts at `start`.
    /// Source departures earlier in the day than `start` are taken to be
    /// on the next day.
    ///
    /// # Panics
    ///
    /// If a source or the target is not a stop of the timetable.
    pub fn scan_since(&self, start: u32, sources: &[(u32, u32)], target: Option<u32>) -> ScanResult {
        self.run(sources, start % SECONDS_OF_DAY, target, None)
    }

    fn run(
        &self,
        sources: &[(u32, u32)],
        start: u32,
        target: Option<u32>,
        limit: Option<usize>,
    ) -> ScanResult {
        for (stop, _) in sources {
            assert!(
                self.timetable.stop(*stop).is_some(),
                "source stop {stop} is not part of the timetable"
            );
        }
        if let Some(target) = target {
            assert!(
                self.timetable.stop(target).is_some(),
                "target stop {target} is not part of the timetable"
            );
        }

        let stops = self
            .timetable
            .greatest_stop_id()
            .map_or(0, |greatest| greatest as usize + 1);
        let mut result = ScanResult::unreached(start, stops);
        if sources.is_empty() {
            return result;
        }

        for &(stop, departure) in sources {
            let departure = result.normalize(departure);
            let index = stop as usize;
            result.offer_arrival(index, departure, JourneyPointer::Source);
            result.offer_boarding(index, departure, departure, JourneyPointer::Source);
        }
        for &(stop, _) in sources {
            let departure = result.arrival[stop as usize];
            for footpath in self.walks_from(stop) {
                let walked = departure.saturating_add(footpath.duration);
                let index = footpath.arrival_stop_id as usize;
                let pointer = JourneyPointer::InitialWalk(*footpath);
                result.offer_arrival(index, walked, pointer);
                result.offer_boarding(index, walked, walked, pointer);
            }
        }

        let mut boarded: HashMap<u32, Connection> = HashMap::new();
        for connection in self.timetable.connections_starting_since(start) {
            if limit.is_some_and(|limit| result.scanned >= limit) {
                break;
            }
            let departure = result.normalize(connection.departure_time);
            if target.is_some_and(|target| result.arrival[target as usize] <= departure) {
                break;
            }
            result.scanned += 1;

            let enter = match boarded.entry(connection.trip_id) {
                Entry::Occupied(entry) => *entry.get(),
                Entry::Vacant(entry) => {
                    if result.ready_at(connection.departure_stop_id as usize) > departure {
                        continue;
                    }
                    *entry.insert(*connection)
                }
            };

            let arrival = departure + connection.duration();
            let index = connection.arrival_stop_id as usize;
            let ride = JourneyPointer::Ride {
                enter,
                exit: *connection,
                footpath: None,
            };
            if !result.offer_arrival(index, arrival, ride) {
                continue;
            }
            let transfer = self.transfer_time(connection.arrival_stop_id);
            result.offer_boarding(index, arrival, arrival.saturating_add(transfer), ride);

            for footpath in self.walks_from(connection.arrival_stop_id) {
                let walked = arrival.saturating_add(footpath.duration);
                let index = footpath.arrival_stop_id as usize;
                let pointer = JourneyPointer::Ride {
                    enter,
                    exit: *connection,
                    footpath: Some(*footpath),
                };
                // A walk can beat the transfer time without beating the ride
                result.offer_arrival(index, walked, pointer);
                result.offer_boarding(index, walked, walked, pointer);
            }
        }

        trace!(
            sources = sources.len(),
            scanned = result.scanned,
            boarded = boarded.len(),
            "connection scan finished"
        );
        result
    }

    /// Rebuild the journey to `stop` as a path of transit edges.
    ///
    /// Every edge costs the arrival time at its destination minus the
    /// arrival time at its source stop, so waiting is charged to the edge
    /// that ends it and the costs add up to the travel time.
    pub fn journey(&self, result: &ScanResult, stop: u32) -> Option<Path<CoreEdge>> {
        let mut here = result.arrival_at(stop)?;
        let destination = self.transit_node(stop, here)?;
        let mut pointer = *result.pointer(stop)?;
        let mut path = EdgePath::built_reversely();

        // Rides continue from the stop's boarding entry, walks from its
        // earliest arrival. Every step goes back in time, so a longer
        // chain means corrupted pointers.
        let steps = result.arrival.len() + self.timetable.connections().len();
        for _ in 0..=steps {
            match pointer {
                JourneyPointer::Source => {
                    return Some(Path::from_edges(path, CoreNode::Transit(destination)));
                }
                JourneyPointer::InitialWalk(footpath) => {
                    let from = footpath.departure_stop_id;
                    let departed = result.arrival_at(from)?;
                    self.add_walk(&mut path, footpath, departed, here)?;
                    here = departed;
                    pointer = *result.pointer(from)?;
                }
                JourneyPointer::Ride {
                    enter,
                    exit,
                    footpath,
                } => {
                    let alighted = result.normalize(exit.departure_time) + exit.duration();
                    if let Some(footpath) = footpath {
                        self.add_walk(&mut path, footpath, alighted, here)?;
                    }

                    let trip = self.timetable.trip(enter.trip_id)?;
                    let rides = trip
                        .connections()
                        .get(enter.sequence_index as usize..=exit.sequence_index as usize)?;
                    let boarding = result
                        .boarding
                        .get(enter.departure_stop_id as usize)
                        .copied()
                        .flatten()?;
                    let boarded_after = boarding.reached;
                    for (position, ride) in rides.iter().enumerate().rev() {
                        let arrived = result.normalize(ride.departure_time) + ride.duration();
                        let departed = match position.checked_sub(1) {
                            Some(previous) => {
                                let previous = &rides[previous];
                                result.normalize(previous.departure_time) + previous.duration()
                            }
                            None => boarded_after,
                        };
                        let edge = TransitEdge::ride(
                            ride.trip_id,
                            self.transit_node(ride.departure_stop_id, departed)?,
                            self.transit_node(ride.arrival_stop_id, arrived)?,
                        );
                        path.add_edge(
                            CoreEdge::Transit(edge),
                            f64::from(arrived.saturating_sub(departed)),
                        );
                    }
                    here = boarded_after;
                    pointer = boarding.pointer;
                }
            }
        }
        None
    }

    fn add_walk(
        &self,
        path: &mut EdgePath<CoreEdge>,
        footpath: Footpath,
        departed: u32,
        arrived: u32,
    ) -> Option<()> {
        let edge = TransitEdge::footpath(
            footpath.arrival_stop_id,
            self.transit_node(footpath.departure_stop_id, departed)?,
            self.transit_node(footpath.arrival_stop_id, arrived)?,
        );
        path.add_edge(
            CoreEdge::Transit(edge),
            f64::from(arrived.saturating_sub(departed)),
        );
        Some(())
    }

    fn transit_node(&self, stop: u32, time: u32) -> Option<TransitNode> {
        let stop = self.timetable.stop(stop)?;
        Some(TransitNode::new(
            stop.id,
            stop.coordinates.latitude,
            stop.coordinates.longitude,
            time % SECONDS_OF_DAY,
        ))
    }

    fn walks_from(&self, stop: u32) -> impl Iterator<Item = &'t Footpath> + 't {
        self.timetable
            .outgoing_footpaths(stop)
            .iter()
            .filter(|footpath| !footpath.is_self_loop())
    }

    fn transfer_time(&self, stop: u32) -> u32 {
        self.timetable
            .outgoing_footpaths(stop)
            .iter()
            .find(|footpath| footpath.is_self_loop())
            .map_or(0, |footpath| footpath.duration)
    }

    fn stop_sources(sources: &[CoreNode]) -> Vec<(u32, u32)> {
        sources
            .iter()
            .map(|node| match node {
                CoreNode::Transit(node) => (node.id, node.time),
                CoreNode::Road(node) => {
                    panic!("connection scan sources must be transit nodes, got {node:?}")
                }
            })
            .collect()
    }

    fn target_stop(destination: CoreNode) -> u32 {
        match destination {
            CoreNode::Transit(node) => node.id,
            CoreNode::Road(node) => {
                panic!("connection scan targets must be transit nodes, got {node:?}")
            }
        }
    }

    fn reached_node(&self, result: &ScanResult, stop: u32) -> Option<CoreNode> {
        self.transit_node(stop, result.arrival_at(stop)?)
            .map(CoreNode::Transit)
    }
}

impl ShortestPathComputation<CoreEdge> for ConnectionScan<'_> {
    fn compute_shortest_path(&self, sources: &[CoreNode], destination: CoreNode) -> Option<Path<CoreEdge>> {
        let target = Self::target_stop(destination);
        let result = self.scan(&Self::stop_sources(sources), Some(target));
        self.journey(&result, target)
    }

    /// Seconds from the earliest source departure until arrival. With a
    /// single source this is the cost of the rebuilt journey.
    fn compute_shortest_path_cost(&self, sources: &[CoreNode], destination: CoreNode) -> Option<f64> {
        let target = Self::target_stop(destination);
        self.scan(&Self::stop_sources(sources), Some(target))
            .travel_time_to(target)
            .map(f64::from)
    }

    fn compute_shortest_path_costs_reachable(&self, sources: &[CoreNode]) -> HashMap<CoreNode, f64> {
        let result = self.scan(&Self::stop_sources(sources), None);
        result
            .reached_stops()
            .into_iter()
            .filter_map(|stop| {
                let node = self.reached_node(&result, stop)?;
                let cost = result.travel_time_to(stop)?;
                Some((node, f64::from(cost)))
            })
            .collect()
    }

    fn compute_search_space(&self, sources: &[CoreNode], destination: Option<CoreNode>) -> Vec<CoreNode> {
        let target = destination.map(Self::target_stop);
        let result = self.scan(&Self::stop_sources(sources), target);
        result
            .reached_stops()
            .into_iter()
            .filter_map(|stop| self.reached_node(&result, stop))
            .collect()
    }
}
