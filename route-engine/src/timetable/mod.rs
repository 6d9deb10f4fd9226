//! Schedule data for the Connection Scan Algorithm.
//!
//! Times are seconds since midnight of the service day. A connection or
//! footpath time that lies before the reference time of a query is taken
//! to be on the following day.

mod error;
mod table;
mod types;

pub use error::TimetableError;
pub use table::{FootpathCorrection, Timetable};
pub use types::{Connection, Footpath, Stop, Trip};
