use std::collections::HashMap;

use crate::geo::{GeoPoint, PlaceResolver, ResolveError};
use crate::provider::AncestorFact;

/// Configured table of place names. A miss on the full name retries with the
/// leading component dropped, so a town falls back to its county or country.
#[derive(Debug, Clone)]
pub struct GazetteerResolver {
    places: HashMap<String, GeoPoint>,
    walk_parents: bool,
}

impl Default for GazetteerResolver {
    fn default() -> Self {
        Self {
            places: HashMap::new(),
            walk_parents: true,
        }
    }
}

impl GazetteerResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn walk_parents(mut self, value: bool) -> Self {
        self.walk_parents = value;
        self
    }

    pub fn insert(&mut self, name: &str, point: GeoPoint) {
        self.places.insert(name.trim().to_string(), point);
    }

    pub fn len(&self) -> usize {
        self.places.len()
    }

    pub fn is_empty(&self) -> bool {
        self.places.is_empty()
    }

    pub fn lookup(&self, place: &str) -> Option<GeoPoint> {
        let mut current = place.trim();
        while !current.is_empty() {
            if let Some(point) = self.places.get(current) {
                return Some(*point);
            }
            if !self.walk_parents {
                return None;
            }
            current = match current.split_once(',') {
                Some((_, parent)) => parent.trim(),
                None => "",
            };
        }
        None
    }
}

impl FromIterator<(String, GeoPoint)> for GazetteerResolver {
    fn from_iter<I: IntoIterator<Item = (String, GeoPoint)>>(iter: I) -> Self {
        let mut resolver = Self::new();
        for (name, point) in iter {
            resolver.insert(&name, point);
        }
        resolver
    }
}

impl PlaceResolver for GazetteerResolver {
    fn name(&self) -> &str {
        "gazetteer"
    }

    fn resolve(&self, fact: &AncestorFact) -> Result<Option<GeoPoint>, ResolveError> {
        Ok(self.lookup(&fact.plain_place()))
    }
}
