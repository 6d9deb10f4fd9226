//! Edge types and the capabilities edges may expose to the search.

use std::fmt;
use std::hash::Hash;

use super::geo::travel_time_secs;
use super::mode::{ModeSet, TransportationMode};
use super::node::{CoreNode, HasId, RoadNode, TransitNode, SECONDS_OF_DAY};

/// A directed, weighted connection between two nodes.
///
/// `cost` must be non-negative and cheap to obtain. Anything that depends
/// on the query (time of day, allowed modes) is layered on top by the
/// search modules.
pub trait Edge: Clone + PartialEq + fmt::Debug {
    type Node: Copy + Eq + Hash + fmt::Debug;

    fn source(&self) -> Self::Node;

    fn destination(&self) -> Self::Node;

    fn cost(&self) -> f64;

    /// The same edge with source and destination swapped.
    fn reversed(&self) -> Self;

    /// Mode information, for edges that carry it.
    fn as_multi_modal(&self) -> Option<&dyn HasTransportationModes> {
        None
    }

    /// For edges that enter the transit network: the time of day of the
    /// transit event they lead to.
    fn transit_entry_time(&self) -> Option<u32> {
        None
    }
}

/// Capability of edges that can be travelled by a restricted set of modes.
pub trait HasTransportationModes {
    fn transportation_modes(&self) -> ModeSet;

    /// Cost of travelling the edge with `mode`.
    fn cost_for_mode(&self, mode: TransportationMode) -> f64;
}

/// An edge with a fixed cost and nothing else.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BasicEdge<N> {
    pub source: N,
    pub destination: N,
    pub cost: f64,
}

impl<N> BasicEdge<N> {
    pub fn new(source: N, destination: N, cost: f64) -> Self {
        Self {
            source,
            destination,
            cost,
        }
    }
}

impl<N: Copy + Eq + Hash + fmt::Debug> Edge for BasicEdge<N> {
    type Node = N;

    fn source(&self) -> N {
        self.source
    }

    fn destination(&self) -> N {
        self.destination
    }

    fn cost(&self) -> f64 {
        self.cost
    }

    fn reversed(&self) -> Self {
        Self::new(self.destination, self.source, self.cost)
    }
}

/// A road segment.
///
/// The base cost is the travel time in seconds for the fastest mode the
/// segment allows, capped by its maximal speed.
#[derive(Debug, Clone, Copy)]
pub struct RoadEdge {
    pub id: u32,
    pub source: RoadNode,
    pub destination: RoadNode,
    pub length_m: f64,
    pub max_speed_kmh: f64,
    pub modes: ModeSet,
    cost: f64,
}

impl RoadEdge {
    pub fn new(
        id: u32,
        source: RoadNode,
        destination: RoadNode,
        length_m: f64,
        max_speed_kmh: f64,
        modes: ModeSet,
    ) -> Self {
        let mut edge = Self {
            id,
            source,
            destination,
            length_m,
            max_speed_kmh,
            modes,
            cost: 0.0,
        };
        edge.cost = match modes.fastest() {
            Some(mode) => edge.cost_for_mode(mode),
            None => travel_time_secs(length_m, max_speed_kmh),
        };
        edge
    }
}

impl PartialEq for RoadEdge {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id && self.source == other.source && self.destination == other.destination
    }
}

impl HasId for RoadEdge {
    fn id(&self) -> u32 {
        self.id
    }
}

impl HasTransportationModes for RoadEdge {
    fn transportation_modes(&self) -> ModeSet {
        self.modes
    }

    fn cost_for_mode(&self, mode: TransportationMode) -> f64 {
        let speed = mode.average_speed_kmh().min(self.max_speed_kmh);
        travel_time_secs(self.length_m, speed)
    }
}

impl Edge for RoadEdge {
    type Node = RoadNode;

    fn source(&self) -> RoadNode {
        self.source
    }

    fn destination(&self) -> RoadNode {
        self.destination
    }

    fn cost(&self) -> f64 {
        self.cost
    }

    fn reversed(&self) -> Self {
        Self {
            source: self.destination,
            destination: self.source,
            ..*self
        }
    }

    fn as_multi_modal(&self) -> Option<&dyn HasTransportationModes> {
        Some(self)
    }
}

/// A ride or a walk between two transit events.
///
/// The cost is the time between the two events, wrapping past midnight.
#[derive(Debug, Clone, Copy)]
pub struct TransitEdge {
    pub id: u32,
    pub source: TransitNode,
    pub destination: TransitNode,
    pub mode: TransportationMode,
    cost: f64,
}

impl TransitEdge {
    /// A ride with a tram from `source` to `destination`.
    pub fn ride(id: u32, source: TransitNode, destination: TransitNode) -> Self {
        Self::with_mode(id, source, destination, TransportationMode::Tram)
    }

    /// A walk between two stops.
    pub fn footpath(id: u32, source: TransitNode, destination: TransitNode) -> Self {
        Self::with_mode(id, source, destination, TransportationMode::Foot)
    }

    fn with_mode(
        id: u32,
        source: TransitNode,
        destination: TransitNode,
        mode: TransportationMode,
    ) -> Self {
        let elapsed = (destination.time % SECONDS_OF_DAY + SECONDS_OF_DAY
            - source.time % SECONDS_OF_DAY)
            % SECONDS_OF_DAY;
        Self {
            id,
            source,
            destination,
            mode,
            cost: f64::from(elapsed),
        }
    }
}

impl PartialEq for TransitEdge {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id && self.source == other.source && self.destination == other.destination
    }
}

impl HasId for TransitEdge {
    fn id(&self) -> u32 {
        self.id
    }
}

impl HasTransportationModes for TransitEdge {
    fn transportation_modes(&self) -> ModeSet {
        ModeSet::single(self.mode)
    }

    fn cost_for_mode(&self, _mode: TransportationMode) -> f64 {
        self.cost
    }
}

impl Edge for TransitEdge {
    type Node = TransitNode;

    fn source(&self) -> TransitNode {
        self.source
    }

    fn destination(&self) -> TransitNode {
        self.destination
    }

    fn cost(&self) -> f64 {
        self.cost
    }

    fn reversed(&self) -> Self {
        Self {
            source: self.destination,
            destination: self.source,
            ..*self
        }
    }

    fn as_multi_modal(&self) -> Option<&dyn HasTransportationModes> {
        Some(self)
    }
}

/// A zero-cost edge joining the road network and the transit network.
///
/// The real price of using a link, waiting for the next departure, is
/// supplied per query by the transit module.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LinkEdge {
    pub source: CoreNode,
    pub destination: CoreNode,
}

impl LinkEdge {
    pub fn new(source: CoreNode, destination: CoreNode) -> Self {
        Self {
            source,
            destination,
        }
    }
}

impl Edge for LinkEdge {
    type Node = CoreNode;

    fn source(&self) -> CoreNode {
        self.source
    }

    fn destination(&self) -> CoreNode {
        self.destination
    }

    fn cost(&self) -> f64 {
        0.0
    }

    fn reversed(&self) -> Self {
        Self::new(self.destination, self.source)
    }

    fn transit_entry_time(&self) -> Option<u32> {
        self.destination.time()
    }
}

/// An edge of the combined road and transit network.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CoreEdge {
    Road(RoadEdge),
    Transit(TransitEdge),
    Link(LinkEdge),
}

impl From<RoadEdge> for CoreEdge {
    fn from(edge: RoadEdge) -> Self {
        CoreEdge::Road(edge)
    }
}

impl From<TransitEdge> for CoreEdge {
    fn from(edge: TransitEdge) -> Self {
        CoreEdge::Transit(edge)
    }
}

impl From<LinkEdge> for CoreEdge {
    fn from(edge: LinkEdge) -> Self {
        CoreEdge::Link(edge)
    }
}

impl Edge for CoreEdge {
    type Node = CoreNode;

    fn source(&self) -> CoreNode {
        match self {
            CoreEdge::Road(edge) => CoreNode::Road(edge.source),
            CoreEdge::Transit(edge) => CoreNode::Transit(edge.source),
            CoreEdge::Link(edge) => edge.source,
        }
    }

    fn destination(&self) -> CoreNode {
        match self {
            CoreEdge::Road(edge) => CoreNode::Road(edge.destination),
            CoreEdge::Transit(edge) => CoreNode::Transit(edge.destination),
            CoreEdge::Link(edge) => edge.destination,
        }
    }

    fn cost(&self) -> f64 {
        match self {
            CoreEdge::Road(edge) => edge.cost(),
            CoreEdge::Transit(edge) => edge.cost(),
            CoreEdge::Link(edge) => edge.cost(),
        }
    }

    fn reversed(&self) -> Self {
        match self {
            CoreEdge::Road(edge) => CoreEdge::Road(edge.reversed()),
            CoreEdge::Transit(edge) => CoreEdge::Transit(edge.reversed()),
            CoreEdge::Link(edge) => CoreEdge::Link(edge.reversed()),
        }
    }

    fn as_multi_modal(&self) -> Option<&dyn HasTransportationModes> {
        match self {
            CoreEdge::Road(edge) => Some(edge),
            CoreEdge::Transit(edge) => Some(edge),
            CoreEdge::Link(_) => None,
        }
    }

    fn transit_entry_time(&self) -> Option<u32> {
        match self {
            CoreEdge::Link(edge) => edge.transit_entry_time(),
            CoreEdge::Road(_) | CoreEdge::Transit(_) => None,
        }
    }
}
