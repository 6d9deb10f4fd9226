//! Stops, trips, connections and footpaths.

use crate::model::{Coordinates, SECONDS_OF_DAY, Spatial};

use super::error::TimetableError;

/// A place where vehicles stop.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Stop {
    pub id: u32,
    pub coordinates: Coordinates,
}

impl Stop {
    pub fn new(id: u32, latitude: f32, longitude: f32) -> Self {
        Self {
            id,
            coordinates: Coordinates::new(latitude, longitude),
        }
    }
}

impl Spatial for Stop {
    fn coordinates(&self) -> Coordinates {
        self.coordinates
    }
}

/// A vehicle ride between two consecutive stops of a trip.
///
/// The field order is the scan order: by departure time, then trip, then
/// arrival time and stops. Times are seconds since midnight; an arrival
/// earlier than the departure happens on the next day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Connection {
    pub departure_time: u32,
    pub trip_id: u32,
    pub arrival_time: u32,
    pub departure_stop_id: u32,
    pub arrival_stop_id: u32,
    /// Position of the connection within its trip, starting at 0.
    pub sequence_index: u32,
}

impl Connection {
    pub fn new(
        trip_id: u32,
        sequence_index: u32,
        departure_stop_id: u32,
        arrival_stop_id: u32,
        departure_time: u32,
        arrival_time: u32,
    ) -> Self {
        Self {
            departure_time,
            trip_id,
            arrival_time,
            departure_stop_id,
            arrival_stop_id,
            sequence_index,
        }
    }

    /// Travel time in seconds, wrapping past midnight.
    pub fn duration(&self) -> u32 {
        (self.arrival_time % SECONDS_OF_DAY + SECONDS_OF_DAY - self.departure_time % SECONDS_OF_DAY)
            % SECONDS_OF_DAY
    }
}

/// One run of a vehicle along its connections.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Trip {
    pub id: u32,
    connections: Vec<Connection>,
}

impl Trip {
    pub fn new(id: u32) -> Self {
        Self {
            id,
            connections: Vec::new(),
        }
    }

    /// Append the next connection of the trip.
    pub fn push_connection(&mut self, connection: Connection) -> Result<(), TimetableError> {
        if connection.trip_id != self.id {
            return Err(TimetableError::UnknownTrip(connection.trip_id));
        }
        let expected = self.connections.len() as u32;
        if connection.sequence_index != expected {
            return Err(TimetableError::OutOfSequence {
                trip: self.id,
                expected,
                found: connection.sequence_index,
            });
        }
        self.connections.push(connection);
        Ok(())
    }

    /// Connections in sequence order.
    pub fn connections(&self) -> &[Connection] {
        &self.connections
    }

    pub fn len(&self) -> usize {
        self.connections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.connections.is_empty()
    }
}

/// A walk between two stops. A footpath from a stop to itself models the
/// time needed to change vehicles there.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Footpath {
    pub departure_stop_id: u32,
    pub arrival_stop_id: u32,
    /// Seconds.
    pub duration: u32,
}

impl Footpath {
    pub fn new(departure_stop_id: u32, arrival_stop_id: u32, duration: u32) -> Self {
        Self {
            departure_stop_id,
            arrival_stop_id,
            duration,
        }
    }

    pub fn is_self_loop(&self) -> bool {
        self.departure_stop_id == self.arrival_stop_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn connections_sort_by_departure_then_trip() {
        let mut connections = vec![
            Connection::new(2, 0, 1, 2, 100, 150),
            Connection::new(1, 1, 3, 4, 100, 160),
            Connection::new(1, 0, 5, 3, 50, 100),
            Connection::new(1, 2, 4, 6, 100, 120),
        ];
        connections.sort();

        let keys: Vec<(u32, u32, u32)> = connections
            .iter()
            .map(|c| (c.departure_time, c.trip_id, c.arrival_time))
            .collect();
        assert_eq!(
            keys,
            vec![(50, 1, 100), (100, 1, 120), (100, 1, 160), (100, 2, 150)]
        );
    }

    #[test]
    fn duration_wraps_past_midnight() {
        assert_eq!(Connection::new(0, 0, 1, 2, 100, 160).duration(), 60);
        assert_eq!(Connection::new(0, 0, 1, 2, 86_300, 200).duration(), 300);
    }

    #[test]
    fn trip_requires_sequence_order() {
        let mut trip = Trip::new(7);
        assert!(trip.push_connection(Connection::new(7, 0, 1, 2, 0, 60)).is_ok());
        assert_eq!(
            trip.push_connection(Connection::new(7, 2, 2, 3, 60, 120)),
            Err(TimetableError::OutOfSequence {
                trip: 7,
                expected: 1,
                found: 2
            })
        );
        assert_eq!(
            trip.push_connection(Connection::new(8, 1, 2, 3, 60, 120)),
            Err(TimetableError::UnknownTrip(8))
        );
        assert_eq!(trip.len(), 1);
    }

    #[test]
    fn self_loop() {
        assert!(Footpath::new(3, 3, 300).is_self_loop());
        assert!(!Footpath::new(3, 4, 30).is_self_loop());
    }
}
