pub mod gazetteer;
pub mod gedcom;
pub mod resolve;

use serde::{Deserialize, Serialize};

pub use gazetteer::GazetteerResolver;
pub use gedcom::GedcomPlaceResolver;
pub use resolve::{CoordinateResolver, PlaceResolver, ResolveError};

/// WGS84 position in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoPoint {
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Exactly (0, 0). Record stores use this value for "no coordinate".
    pub fn is_origin(&self) -> bool {
        self.latitude == 0.0 && self.longitude == 0.0
    }

    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && (-90.0..=90.0).contains(&self.latitude)
            && (-180.0..=180.0).contains(&self.longitude)
    }

    /// `[latitude, longitude]`, the order used for polyline points.
    pub const fn lat_lon(&self) -> [f64; 2] {
        [self.latitude, self.longitude]
    }

    /// `[longitude, latitude]`, the order used for GeoJSON positions.
    pub const fn lon_lat(&self) -> [f64; 2] {
        [self.longitude, self.latitude]
    }
}
