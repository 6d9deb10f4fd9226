//! Geodesic helpers shared by metrics, timetable correction and access
//! node translation.

/// Mean earth radius in meters.
pub const EARTH_RADIUS_MEAN_M: f64 = 6_371_000.0;

/// Upper bound on the speed of any vehicle on the road network, in km/h.
pub const MAXIMAL_ROAD_SPEED_KMH: f64 = 200.0;

/// Speed assumed for walking, in km/h.
pub const WALKING_SPEED_KMH: f64 = 5.0;

/// Latitude/longitude in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Coordinates {
    pub latitude: f32,
    pub longitude: f32,
}

impl Coordinates {
    pub fn new(latitude: f32, longitude: f32) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

/// Anything that has a position on the globe.
pub trait Spatial {
    fn coordinates(&self) -> Coordinates;
}

impl Spatial for Coordinates {
    fn coordinates(&self) -> Coordinates {
        *self
    }
}

/// Distance in meters using the equirectangular approximation.
///
/// Accurate for the short distances that occur inside a city and much
/// cheaper than haversine.
pub fn distance_equirect(first: Coordinates, second: Coordinates) -> f64 {
    let first_lat = f64::from(first.latitude).to_radians();
    let first_lon = f64::from(first.longitude).to_radians();
    let second_lat = f64::from(second.latitude).to_radians();
    let second_lon = f64::from(second.longitude).to_radians();

    let x = (second_lon - first_lon) * ((first_lat + second_lat) / 2.0).cos();
    let y = second_lat - first_lat;
    (x * x + y * y).sqrt() * EARTH_RADIUS_MEAN_M
}

pub fn kmh_to_ms(kmh: f64) -> f64 {
    kmh / 3.6
}

/// Seconds needed to cover `distance_m` meters at `speed_kmh`.
pub fn travel_time_secs(distance_m: f64, speed_kmh: f64) -> f64 {
    distance_m / kmh_to_ms(speed_kmh)
}
