use serde::{Deserialize, Serialize};

use crate::ancestry::AncestorNumber;
use crate::geo::GeoPoint;
use crate::provider::SummaryPayload;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureCollection {
    #[serde(rename = "type")]
    pub kind: String,
    pub features: Vec<Feature>,
}

impl FeatureCollection {
    pub fn new(features: Vec<Feature>) -> Self {
        Self {
            kind: "FeatureCollection".to_string(),
            features,
        }
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Feature {
    #[serde(rename = "type")]
    pub kind: String,
    /// Ancestor number.
    pub id: u64,
    pub valid: bool,
    pub geometry: PointGeometry,
    pub properties: FeatureProperties,
}

impl Feature {
    pub fn new(number: AncestorNumber, point: GeoPoint, properties: FeatureProperties) -> Self {
        Self {
            kind: "Feature".to_string(),
            id: number.get(),
            valid: true,
            geometry: PointGeometry::new(point),
            properties,
        }
    }
}

/// GeoJSON point; `coordinates` is `[longitude, latitude]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PointGeometry {
    #[serde(rename = "type")]
    pub kind: String,
    pub coordinates: [f64; 2],
}

impl PointGeometry {
    pub fn new(point: GeoPoint) -> Self {
        Self {
            kind: "Point".to_string(),
            coordinates: point.lon_lat(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureProperties {
    /// Line to the descendant's point; serialized as `null` when absent.
    pub polyline: Option<Polyline>,
    pub icon: Icon,
    pub tooltip: String,
    pub summary: SummaryPayload,
    pub zoom: u8,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Icon {
    pub color: String,
    pub name: String,
}

/// Two-point segment, descendant first. Points are `[latitude, longitude]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Polyline {
    pub points: [[f64; 2]; 2],
    pub options: PolylineOptions,
}

impl Polyline {
    pub fn between(from: GeoPoint, to: GeoPoint, color: &str) -> Self {
        Self {
            points: [from.lat_lon(), to.lat_lon()],
            options: PolylineOptions {
                color: color.to_string(),
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolylineOptions {
    pub color: String,
}
