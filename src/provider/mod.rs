pub mod memory;

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::ancestry::AncestorNumber;
use crate::geo::GeoPoint;
use crate::map::markup::strip_tags;

pub use memory::{FamilyTree, TreeError};

/// GEDCOM tags that count as a birth for mapping purposes, in preference order.
pub const BIRTH_EVENTS: &[&str] = &["BIRT", "CHR", "BAPM", "ADOP"];

/// One event record for the individual at some ancestor number.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AncestorFact {
    /// Identifier of the individual the fact belongs to.
    pub record: String,
    pub tag: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    /// Full place name; may carry markup from the record store.
    pub place: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coordinate: Option<GeoPoint>,
    /// Raw GEDCOM text of the fact, including sub-records.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gedcom: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<SummaryPayload>,
}

impl AncestorFact {
    pub fn new(record: impl Into<String>, tag: impl Into<String>, place: impl Into<String>) -> Self {
        Self {
            record: record.into(),
            tag: tag.into(),
            date: None,
            place: place.into(),
            coordinate: None,
            gedcom: None,
            summary: None,
        }
    }

    pub fn plain_place(&self) -> String {
        strip_tags(&self.place)
    }
}

/// Popup content for one mapped ancestor, rendered by the view layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct SummaryPayload {
    pub name: String,
    pub relationship: String,
    pub event: String,
    #[serde(default)]
    pub date: Option<String>,
    pub place: String,
    pub sosa: u64,
}

impl SummaryPayload {
    pub fn from_fact(fact: &AncestorFact, number: AncestorNumber, name: &str) -> Self {
        Self {
            name: name.to_string(),
            relationship: number.relationship(),
            event: event_label(&fact.tag).to_string(),
            date: fact.date.clone(),
            place: fact.plain_place(),
            sosa: number.get(),
        }
    }
}

pub fn event_label(tag: &str) -> &str {
    match tag {
        "BIRT" => "Birth",
        "CHR" => "Christening",
        "BAPM" => "Baptism",
        "ADOP" => "Adoption",
        other => other,
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderError {
    UnknownIndividual(String),
    AccessDenied(String),
}

impl fmt::Display for ProviderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownIndividual(id) => write!(f, "individual `{id}` not found"),
            Self::AccessDenied(id) => write!(f, "individual `{id}` is not visible"),
        }
    }
}

impl std::error::Error for ProviderError {}

/// Whatever owns the genealogical store.
pub trait FactProvider {
    /// Mappable facts for the subject's ancestors, up to `generations` deep
    /// (the subject alone is one generation).
    fn facts_for(
        &self,
        subject: &str,
        generations: u32,
    ) -> Result<BTreeMap<AncestorNumber, AncestorFact>, ProviderError>;

    fn summary_for(
        &self,
        subject: &str,
        fact: &AncestorFact,
        number: AncestorNumber,
    ) -> SummaryPayload;
}
