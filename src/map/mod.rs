pub mod builder;
pub mod color;
pub mod feature;
pub mod markup;

pub use builder::{
    DEFAULT_ICON, DEFAULT_ZOOM, MapError, MapResponse, MapStatus, PedigreeMapBuilder,
};
pub use color::{ColorTable, LINE_COLORS};
pub use feature::{Feature, FeatureCollection, FeatureProperties, Icon, Polyline};
