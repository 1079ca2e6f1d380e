use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::Path;

use serde::Deserialize;

use super::{AncestorFact, BIRTH_EVENTS, FactProvider, ProviderError, SummaryPayload};
use crate::ancestry::AncestorNumber;
use crate::geo::GeoPoint;

#[derive(Debug)]
pub enum TreeError {
    Io(std::io::Error),
    Yaml(serde_yaml::Error),
    DuplicateIndividual(String),
}

impl std::fmt::Display for TreeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(err) => write!(f, "{err}"),
            Self::Yaml(err) => write!(f, "{err}"),
            Self::DuplicateIndividual(id) => write!(f, "individual `{id}` is defined twice"),
        }
    }
}

impl std::error::Error for TreeError {}

impl From<std::io::Error> for TreeError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<serde_yaml::Error> for TreeError {
    fn from(value: serde_yaml::Error) -> Self {
        Self::Yaml(value)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Individual {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub father: Option<String>,
    #[serde(default)]
    pub mother: Option<String>,
    #[serde(default)]
    pub private: bool,
    #[serde(default)]
    pub events: Vec<Event>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Event {
    pub tag: String,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub place: String,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
    #[serde(default)]
    pub gedcom: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawTree {
    #[serde(default)]
    individuals: Vec<Individual>,
}

/// Family tree held in memory, loaded from a YAML or JSON document.
#[derive(Debug, Clone, Default)]
pub struct FamilyTree {
    individuals: HashMap<String, Individual>,
}

impl FamilyTree {
    pub fn load(path: &Path) -> Result<Self, TreeError> {
        let content = fs::read_to_string(path)?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self, TreeError> {
        let raw: RawTree = serde_yaml::from_str(content)?;
        Self::from_individuals(raw.individuals)
    }

    pub fn from_individuals(list: Vec<Individual>) -> Result<Self, TreeError> {
        let mut individuals = HashMap::with_capacity(list.len());
        for individual in list {
            if individuals.contains_key(&individual.id) {
                return Err(TreeError::DuplicateIndividual(individual.id));
            }
            individuals.insert(individual.id.clone(), individual);
        }
        Ok(Self { individuals })
    }

    pub fn individual(&self, id: &str) -> Option<&Individual> {
        self.individuals.get(id)
    }

    pub fn len(&self) -> usize {
        self.individuals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.individuals.is_empty()
    }
}

impl Individual {
    /// First birth-class event that names a place.
    pub fn birth_fact(&self) -> Option<AncestorFact> {
        let event = self.events.iter().find(|event| {
            BIRTH_EVENTS.contains(&event.tag.as_str()) && !event.place.trim().is_empty()
        })?;
        let coordinate = match (event.latitude, event.longitude) {
            (Some(latitude), Some(longitude)) => Some(GeoPoint::new(latitude, longitude)),
            _ => None,
        };
        Some(AncestorFact {
            record: self.id.clone(),
            tag: event.tag.clone(),
            date: event.date.clone(),
            place: event.place.clone(),
            coordinate,
            gedcom: event.gedcom.clone(),
            summary: None,
        })
    }
}

impl FactProvider for FamilyTree {
    fn facts_for(
        &self,
        subject: &str,
        generations: u32,
    ) -> Result<BTreeMap<AncestorNumber, AncestorFact>, ProviderError> {
        let root = self
            .individuals
            .get(subject)
            .ok_or_else(|| ProviderError::UnknownIndividual(subject.to_string()))?;
        if root.private {
            return Err(ProviderError::AccessDenied(subject.to_string()));
        }

        let mut facts = BTreeMap::new();
        let mut pending = vec![(AncestorNumber::SUBJECT, root)];
        while let Some((number, individual)) = pending.pop() {
            if individual.private {
                continue;
            }
            if let Some(fact) = individual.birth_fact() {
                facts.insert(number, fact);
            }
            if number.generation() + 1 >= generations {
                continue;
            }

            let parents = [
                (individual.father.as_deref(), number.father()),
                (individual.mother.as_deref(), number.mother()),
            ];
            for (parent_id, parent_number) in parents {
                let (Some(parent_id), Some(parent_number)) = (parent_id, parent_number) else {
                    continue;
                };
                match self.individuals.get(parent_id) {
                    Some(parent) => pending.push((parent_number, parent)),
                    None => tracing::debug!(
                        ancestor = parent_number.get(),
                        "parent `{parent_id}` of `{}` is not in the tree",
                        individual.id
                    ),
                }
            }
        }
        Ok(facts)
    }

    fn summary_for(
        &self,
        _subject: &str,
        fact: &AncestorFact,
        number: AncestorNumber,
    ) -> SummaryPayload {
        let name = self
            .individuals
            .get(&fact.record)
            .map_or(fact.record.as_str(), |individual| individual.name.as_str());
        SummaryPayload::from_fact(fact, number, name)
    }
}
