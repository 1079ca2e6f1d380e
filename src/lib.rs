pub mod ancestry;
pub mod config;
pub mod geo;
pub mod map;
pub mod provider;
pub mod store;

pub use ancestry::AncestorNumber;
pub use geo::GeoPoint;
pub use map::{MapResponse, MapStatus, PedigreeMapBuilder};
pub use provider::{AncestorFact, FactProvider};
