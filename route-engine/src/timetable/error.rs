//! Timetable error types.

use crate::model::IdSpaceExhausted;

/// Errors while populating a timetable.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TimetableError {
    /// A connection refers to a trip that was never added
    #[error("unknown trip {0}")]
    UnknownTrip(u32),

    /// A connection or footpath refers to a stop that was never added
    #[error("unknown stop {0}")]
    UnknownStop(u32),

    #[error("stop {0} already exists")]
    DuplicateStop(u32),

    #[error("trip {0} already exists")]
    DuplicateTrip(u32),

    /// Connections of a trip must be appended in sequence order
    #[error("trip {trip} expects connection {expected} next, got {found}")]
    OutOfSequence { trip: u32, expected: u32, found: u32 },

    #[error(transparent)]
    IdSpaceExhausted(#[from] IdSpaceExhausted),
}
