use std::collections::{BTreeMap, HashMap};
use std::fmt;

use sha2::{Digest, Sha256};

use crate::ancestry::{AncestorNumber, InvalidAncestorNumber};
use crate::geo::{CoordinateResolver, GeoPoint};
use crate::map::color::ColorTable;
use crate::map::feature::{Feature, FeatureCollection, FeatureProperties, Icon, Polyline};
use crate::provider::{AncestorFact, FactProvider, ProviderError, SummaryPayload};

/// Zoom emitted on every feature until places carry their own.
pub const DEFAULT_ZOOM: u8 = 2;
pub const DEFAULT_ICON: &str = "bullseye";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MapStatus {
    Ok,
    /// The fact list was empty. Distinct from facts that produced no feature.
    NoContent,
}

impl MapStatus {
    pub const fn http_code(self) -> u16 {
        match self {
            Self::Ok => 200,
            Self::NoContent => 204,
        }
    }
}

#[derive(Debug)]
pub enum MapError {
    InvalidAncestorNumber(InvalidAncestorNumber),
    OutOfOrder {
        previous: AncestorNumber,
        current: AncestorNumber,
    },
    Provider(ProviderError),
    Json(serde_json::Error),
}

impl fmt::Display for MapError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidAncestorNumber(err) => write!(f, "{err}"),
            Self::OutOfOrder { previous, current } => write!(
                f,
                "ancestor numbers must be strictly ascending, got {current} after {previous}"
            ),
            Self::Provider(err) => write!(f, "{err}"),
            Self::Json(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for MapError {}

impl From<InvalidAncestorNumber> for MapError {
    fn from(value: InvalidAncestorNumber) -> Self {
        Self::InvalidAncestorNumber(value)
    }
}

impl From<ProviderError> for MapError {
    fn from(value: ProviderError) -> Self {
        Self::Provider(value)
    }
}

impl From<serde_json::Error> for MapError {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MapResponse {
    pub status: MapStatus,
    pub collection: FeatureCollection,
    pub facts_considered: usize,
}

impl MapResponse {
    pub fn to_json(&self) -> Result<String, MapError> {
        Ok(serde_json::to_string(&self.collection)?)
    }

    /// Strong validator for the JSON body, quoted for use as an HTTP `ETag`.
    pub fn etag(&self) -> Result<String, MapError> {
        let body = self.to_json()?;
        let digest = Sha256::digest(body.as_bytes());
        let mut out = String::with_capacity(digest.len() * 2 + 2);
        out.push('"');
        for byte in digest {
            use std::fmt::Write as _;
            let _ = write!(&mut out, "{byte:02x}");
        }
        out.push('"');
        Ok(out)
    }
}

/// Turns ancestor facts into map features: one point per ancestor whose
/// coordinate resolves, linked to the point of its child when that resolved
/// too.
#[derive(Debug)]
pub struct PedigreeMapBuilder {
    resolver: CoordinateResolver,
    colors: ColorTable,
    zoom: u8,
    icon: String,
}

impl Default for PedigreeMapBuilder {
    fn default() -> Self {
        Self::new(CoordinateResolver::default())
    }
}

impl PedigreeMapBuilder {
    pub fn new(resolver: CoordinateResolver) -> Self {
        Self {
            resolver,
            colors: ColorTable::default(),
            zoom: DEFAULT_ZOOM,
            icon: DEFAULT_ICON.to_string(),
        }
    }

    pub fn with_colors(mut self, colors: ColorTable) -> Self {
        self.colors = colors;
        self
    }

    pub fn with_zoom(mut self, zoom: u8) -> Self {
        self.zoom = zoom;
        self
    }

    pub fn with_icon(mut self, icon: impl Into<String>) -> Self {
        self.icon = icon.into();
        self
    }

    pub fn colors(&self) -> &ColorTable {
        &self.colors
    }

    pub fn resolver(&self) -> &CoordinateResolver {
        &self.resolver
    }

    /// Builds from caller-numbered facts. Numbers must be positive and
    /// strictly ascending; anything else rejects the whole input before a
    /// single fact is resolved.
    pub fn build<'a, I>(&self, facts: I) -> Result<MapResponse, MapError>
    where
        I: IntoIterator<Item = (i64, &'a AncestorFact)>,
    {
        let mut ordered: Vec<(AncestorNumber, &AncestorFact)> = Vec::new();
        for (raw, fact) in facts {
            let current = AncestorNumber::try_from(raw)?;
            if let Some(&(previous, _)) = ordered.last() {
                if current <= previous {
                    return Err(MapError::OutOfOrder { previous, current });
                }
            }
            ordered.push((current, fact));
        }
        Ok(self.assemble(&ordered))
    }

    pub fn build_ordered(&self, facts: &BTreeMap<AncestorNumber, AncestorFact>) -> MapResponse {
        let ordered: Vec<(AncestorNumber, &AncestorFact)> =
            facts.iter().map(|(number, fact)| (*number, fact)).collect();
        self.assemble(&ordered)
    }

    /// Fetches the subject's ancestor facts and summaries from the provider
    /// and builds the map.
    pub fn build_for_subject(
        &self,
        provider: &dyn FactProvider,
        subject: &str,
        generations: u32,
    ) -> Result<MapResponse, MapError> {
        let facts = provider.facts_for(subject, generations)?;
        let mut annotated = BTreeMap::new();
        for (number, mut fact) in facts {
            fact.summary = Some(provider.summary_for(subject, &fact, number));
            annotated.insert(number, fact);
        }
        Ok(self.build_ordered(&annotated))
    }

    fn assemble(&self, facts: &[(AncestorNumber, &AncestorFact)]) -> MapResponse {
        let mut resolved: HashMap<AncestorNumber, GeoPoint> = HashMap::with_capacity(facts.len());
        let mut features = Vec::with_capacity(facts.len());

        for &(number, fact) in facts {
            let Some(point) = self.resolver.resolve(number, fact) else {
                tracing::debug!(ancestor = number.get(), "no coordinate for `{}`", fact.place);
                continue;
            };
            let color = self.colors.color_for(number);
            resolved.insert(number, point);

            let polyline = number
                .descendant()
                .and_then(|descendant| resolved.get(&descendant))
                .map(|from| Polyline::between(*from, point, color));
            let summary = fact
                .summary
                .clone()
                .unwrap_or_else(|| SummaryPayload::from_fact(fact, number, &fact.record));

            features.push(Feature::new(
                number,
                point,
                FeatureProperties {
                    polyline,
                    icon: Icon {
                        color: color.to_string(),
                        name: self.icon.clone(),
                    },
                    tooltip: fact.plain_place(),
                    summary,
                    zoom: self.zoom,
                },
            ));
        }

        let status = if facts.is_empty() {
            MapStatus::NoContent
        } else {
            MapStatus::Ok
        };
        tracing::debug!(
            facts = facts.len(),
            features = features.len(),
            status = status.http_code(),
            "assembled pedigree map"
        );

        MapResponse {
            status,
            collection: FeatureCollection::new(features),
            facts_considered: facts.len(),
        }
    }
}
