//! Transportation modes and sets of them.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A way of moving through the network.
///
/// The declaration order is the speed order used when an edge supports
/// several modes: `Foot < Bike < Tram < Car`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransportationMode {
    Foot,
    Bike,
    Tram,
    Car,
}

impl TransportationMode {
    /// All modes, slowest first.
    pub const ALL: [TransportationMode; 4] = [
        TransportationMode::Foot,
        TransportationMode::Bike,
        TransportationMode::Tram,
        TransportationMode::Car,
    ];

    /// Average travel speed of this mode in km/h.
    pub fn average_speed_kmh(self) -> f64 {
        match self {
            TransportationMode::Foot => 5.0,
            TransportationMode::Bike => 15.0,
            TransportationMode::Tram => 30.0,
            TransportationMode::Car => 130.0,
        }
    }

    fn bit(self) -> u8 {
        1 << (self as u8)
    }
}

impl fmt::Display for TransportationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TransportationMode::Foot => "foot",
            TransportationMode::Bike => "bike",
            TransportationMode::Tram => "tram",
            TransportationMode::Car => "car",
        };
        f.write_str(name)
    }
}

/// A small copyable set of [`TransportationMode`]s.
///
/// # Examples
///
/// ```
/// use route_engine::model::{ModeSet, TransportationMode};
///
/// let modes = ModeSet::of(&[TransportationMode::Car, TransportationMode::Foot]);
/// assert!(modes.contains(TransportationMode::Car));
/// assert!(!modes.contains(TransportationMode::Tram));
/// assert_eq!(modes.fastest(), Some(TransportationMode::Car));
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ModeSet(u8);

impl ModeSet {
    /// The empty set.
    pub const fn empty() -> Self {
        ModeSet(0)
    }

    /// The set containing every mode.
    pub fn all() -> Self {
        Self::of(&TransportationMode::ALL)
    }

    /// A set with exactly one mode.
    pub fn single(mode: TransportationMode) -> Self {
        ModeSet(mode.bit())
    }

    /// Build a set from a slice of modes. Duplicates are ignored.
    pub fn of(modes: &[TransportationMode]) -> Self {
        modes.iter().copied().collect()
    }

    pub fn insert(&mut self, mode: TransportationMode) {
        self.0 |= mode.bit();
    }

    pub fn contains(self, mode: TransportationMode) -> bool {
        self.0 & mode.bit() != 0
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn len(self) -> usize {
        self.0.count_ones() as usize
    }

    /// Modes present in both sets.
    pub fn intersection(self, other: ModeSet) -> ModeSet {
        ModeSet(self.0 & other.0)
    }

    /// Returns true if both sets share at least one mode.
    pub fn intersects(self, other: ModeSet) -> bool {
        !self.intersection(other).is_empty()
    }

    /// The fastest mode of the set, if any.
    pub fn fastest(self) -> Option<TransportationMode> {
        self.iter().next_back()
    }

    /// Iterate the modes, slowest first.
    pub fn iter(self) -> impl DoubleEndedIterator<Item = TransportationMode> {
        TransportationMode::ALL
            .into_iter()
            .filter(move |mode| self.contains(*mode))
    }
}

impl FromIterator<TransportationMode> for ModeSet {
    fn from_iter<I: IntoIterator<Item = TransportationMode>>(iter: I) -> Self {
        let mut set = ModeSet::empty();
        for mode in iter {
            set.insert(mode);
        }
        set
    }
}

impl fmt::Debug for ModeSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn speed_order() {
        let mut modes = vec![
            TransportationMode::Car,
            TransportationMode::Foot,
            TransportationMode::Tram,
            TransportationMode::Bike,
        ];
        modes.sort();
        assert_eq!(modes, TransportationMode::ALL.to_vec());
    }

    #[test]
    fn empty_set() {
        let set = ModeSet::empty();
        assert!(set.is_empty());
        assert_eq!(set.len(), 0);
        assert_eq!(set.fastest(), None);
    }

    #[test]
    fn insert_and_contains() {
        let mut set = ModeSet::empty();
        set.insert(TransportationMode::Bike);
        set.insert(TransportationMode::Bike);

        assert_eq!(set.len(), 1);
        assert!(set.contains(TransportationMode::Bike));
        assert!(!set.contains(TransportationMode::Car));
    }

    #[test]
    fn intersection_and_fastest() {
        let road = ModeSet::of(&[
            TransportationMode::Car,
            TransportationMode::Bike,
            TransportationMode::Foot,
        ]);
        let allowed = ModeSet::of(&[TransportationMode::Foot, TransportationMode::Bike]);

        let available = road.intersection(allowed);
        assert_eq!(available.fastest(), Some(TransportationMode::Bike));
        assert!(road.intersects(allowed));
        assert!(!road.intersects(ModeSet::single(TransportationMode::Tram)));
    }

    #[test]
    fn all_contains_every_mode() {
        let all = ModeSet::all();
        for mode in TransportationMode::ALL {
            assert!(all.contains(mode));
        }
        assert_eq!(all.len(), 4);
    }

    #[test]
    fn debug_lists_modes() {
        let set = ModeSet::of(&[TransportationMode::Tram, TransportationMode::Foot]);
        assert_eq!(format!("{:?}", set), "{Foot, Tram}");
    }

    #[test]
    fn deserialize_lowercase() {
        let mode: TransportationMode = serde_json::from_str("\"tram\"").unwrap();
        assert_eq!(mode, TransportationMode::Tram);
    }
}
