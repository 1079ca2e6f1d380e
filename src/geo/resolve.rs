use std::fmt;

use crate::ancestry::AncestorNumber;
use crate::geo::GeoPoint;
use crate::provider::AncestorFact;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolveError {
    Malformed { field: &'static str, value: String },
    Unavailable(String),
}

impl fmt::Display for ResolveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Malformed { field, value } => write!(f, "malformed {field} `{value}`"),
            Self::Unavailable(reason) => write!(f, "resolver unavailable: {reason}"),
        }
    }
}

impl std::error::Error for ResolveError {}

/// A source of best-guess coordinates for a fact whose record carries none.
///
/// `Ok(None)` means the source has nothing for this place. Timeouts and
/// transport failures belong in `Err` and are enforced by the implementation.
pub trait PlaceResolver: Send + Sync {
    fn name(&self) -> &str;

    fn resolve(&self, fact: &AncestorFact) -> Result<Option<GeoPoint>, ResolveError>;
}

/// Stored coordinate first, then each fallback resolver in order.
pub struct CoordinateResolver {
    chain: Vec<Box<dyn PlaceResolver>>,
    treat_origin_as_unset: bool,
}

impl Default for CoordinateResolver {
    fn default() -> Self {
        Self {
            chain: Vec::new(),
            treat_origin_as_unset: true,
        }
    }
}

impl fmt::Debug for CoordinateResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CoordinateResolver")
            .field(
                "chain",
                &self.chain.iter().map(|r| r.name()).collect::<Vec<_>>(),
            )
            .field("treat_origin_as_unset", &self.treat_origin_as_unset)
            .finish()
    }
}

impl CoordinateResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, resolver: impl PlaceResolver + 'static) -> Self {
        self.chain.push(Box::new(resolver));
        self
    }

    pub fn push(&mut self, resolver: Box<dyn PlaceResolver>) {
        self.chain.push(resolver);
    }

    pub fn treat_origin_as_unset(mut self, value: bool) -> Self {
        self.treat_origin_as_unset = value;
        self
    }

    pub fn chain_names(&self) -> Vec<&str> {
        self.chain.iter().map(|r| r.name()).collect()
    }

    /// The coordinate recorded on the fact itself, if it is usable.
    pub fn stored(&self, fact: &AncestorFact) -> Option<GeoPoint> {
        let point = fact.coordinate?;
        if self.treat_origin_as_unset && point.is_origin() {
            return None;
        }
        if !point.is_valid() {
            tracing::debug!(
                latitude = point.latitude,
                longitude = point.longitude,
                "ignoring out-of-range stored coordinate"
            );
            return None;
        }
        Some(point)
    }

    pub fn resolve(&self, number: AncestorNumber, fact: &AncestorFact) -> Option<GeoPoint> {
        if let Some(point) = self.stored(fact) {
            return Some(point);
        }

        for resolver in &self.chain {
            match resolver.resolve(fact) {
                Ok(Some(point)) if point.is_valid() => return Some(point),
                Ok(Some(point)) => {
                    tracing::debug!(
                        ancestor = number.get(),
                        resolver = resolver.name(),
                        "discarding out-of-range point ({}, {})",
                        point.latitude,
                        point.longitude
                    );
                }
                Ok(None) => {}
                Err(err) => {
                    tracing::warn!(
                        ancestor = number.get(),
                        resolver = resolver.name(),
                        "place resolution failed: {err}"
                    );
                }
            }
        }
        None
    }
}
