//! Node types.
//!
//! Nodes are small `Copy` values. Identity is the numeric id: two road
//! nodes with the same id are the same node even if their coordinates
//! were rounded differently.

use std::hash::{Hash, Hasher};

use super::geo::{Coordinates, Spatial};

/// Length of a service day in seconds.
pub const SECONDS_OF_DAY: u32 = 86_400;

/// Something with a numeric id.
pub trait HasId {
    fn id(&self) -> u32;
}

/// Something bound to a time of day, in seconds since midnight.
pub trait HasTime {
    fn time(&self) -> u32;
}

/// A node that is nothing but an id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BasicNode(pub u32);

impl HasId for BasicNode {
    fn id(&self) -> u32 {
        self.0
    }
}

/// A crossing or dead end of the road network.
#[derive(Debug, Clone, Copy)]
pub struct RoadNode {
    pub id: u32,
    pub coordinates: Coordinates,
}

impl RoadNode {
    pub fn new(id: u32, latitude: f32, longitude: f32) -> Self {
        Self {
            id,
            coordinates: Coordinates::new(latitude, longitude),
        }
    }
}

impl PartialEq for RoadNode {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for RoadNode {}

impl Hash for RoadNode {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl HasId for RoadNode {
    fn id(&self) -> u32 {
        self.id
    }
}

impl Spatial for RoadNode {
    fn coordinates(&self) -> Coordinates {
        self.coordinates
    }
}

/// An arrival or departure event at a transit stop.
#[derive(Debug, Clone, Copy)]
pub struct TransitNode {
    pub id: u32,
    pub coordinates: Coordinates,
    /// Seconds since midnight.
    pub time: u32,
}

impl TransitNode {
    pub fn new(id: u32, latitude: f32, longitude: f32, time: u32) -> Self {
        Self {
            id,
            coordinates: Coordinates::new(latitude, longitude),
            time,
        }
    }
}

impl PartialEq for TransitNode {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for TransitNode {}

impl Hash for TransitNode {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl HasId for TransitNode {
    fn id(&self) -> u32 {
        self.id
    }
}

impl HasTime for TransitNode {
    fn time(&self) -> u32 {
        self.time
    }
}

impl Spatial for TransitNode {
    fn coordinates(&self) -> Coordinates {
        self.coordinates
    }
}

/// A node of the combined road and transit network.
///
/// Road and transit nodes live in separate id spaces, so a road node and a
/// transit node with the same id are still distinct.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CoreNode {
    Road(RoadNode),
    Transit(TransitNode),
}

impl CoreNode {
    pub fn as_road(&self) -> Option<RoadNode> {
        match self {
            CoreNode::Road(node) => Some(*node),
            CoreNode::Transit(_) => None,
        }
    }

    pub fn as_transit(&self) -> Option<TransitNode> {
        match self {
            CoreNode::Transit(node) => Some(*node),
            CoreNode::Road(_) => None,
        }
    }

    /// The time of day of transit nodes; road nodes have none.
    pub fn time(&self) -> Option<u32> {
        self.as_transit().map(|node| node.time)
    }
}

impl From<RoadNode> for CoreNode {
    fn from(node: RoadNode) -> Self {
        CoreNode::Road(node)
    }
}

impl From<TransitNode> for CoreNode {
    fn from(node: TransitNode) -> Self {
        CoreNode::Transit(node)
    }
}

impl HasId for CoreNode {
    fn id(&self) -> u32 {
        match self {
            CoreNode::Road(node) => node.id,
            CoreNode::Transit(node) => node.id,
        }
    }
}

impl Spatial for CoreNode {
    fn coordinates(&self) -> Coordinates {
        match self {
            CoreNode::Road(node) => node.coordinates,
            CoreNode::Transit(node) => node.coordinates,
        }
    }
}
