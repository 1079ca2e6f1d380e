use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::geo::{CoordinateResolver, GazetteerResolver, GedcomPlaceResolver, GeoPoint};
use crate::map::{ColorTable, DEFAULT_ICON, DEFAULT_ZOOM, PedigreeMapBuilder};

pub const PROJECT_CONFIG_FILE: &str = ".pedigree-map.yml";
pub const MAX_ZOOM: u8 = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolverChoice {
    Gedcom,
    Gazetteer,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PlaceEntry {
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MapConfig {
    pub zoom: u8,
    pub icon: String,
    pub colors: ColorTable,
    pub treat_origin_as_unset: bool,
    pub default_generations: u32,
    pub max_generations: u32,
    pub resolvers: Vec<ResolverChoice>,
    pub places: Vec<PlaceEntry>,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            zoom: DEFAULT_ZOOM,
            icon: DEFAULT_ICON.to_string(),
            colors: ColorTable::default(),
            treat_origin_as_unset: true,
            default_generations: 4,
            max_generations: 10,
            resolvers: vec![ResolverChoice::Gedcom, ResolverChoice::Gazetteer],
            places: Vec::new(),
        }
    }
}

impl MapConfig {
    pub fn coordinate_resolver(&self) -> CoordinateResolver {
        let mut resolver =
            CoordinateResolver::new().treat_origin_as_unset(self.treat_origin_as_unset);
        for choice in &self.resolvers {
            match choice {
                ResolverChoice::Gedcom => resolver.push(Box::new(GedcomPlaceResolver)),
                ResolverChoice::Gazetteer => {
                    let gazetteer: GazetteerResolver = self
                        .places
                        .iter()
                        .map(|place| (place.name.clone(), GeoPoint::new(place.latitude, place.longitude)))
                        .collect();
                    resolver.push(Box::new(gazetteer));
                }
            }
        }
        resolver
    }

    pub fn builder(&self) -> PedigreeMapBuilder {
        PedigreeMapBuilder::new(self.coordinate_resolver())
            .with_colors(self.colors.clone())
            .with_zoom(self.zoom)
            .with_icon(self.icon.clone())
    }

    /// The requested depth, or the default, bounded to `1..=max_generations`.
    pub fn generations(&self, requested: Option<u32>) -> u32 {
        requested
            .unwrap_or(self.default_generations)
            .clamp(1, self.max_generations.max(1))
    }
}

#[derive(Debug, Deserialize)]
struct RawConfig {
    #[serde(default)]
    zoom: Option<u8>,
    #[serde(default)]
    icon: Option<String>,
    #[serde(default)]
    colors: Option<Vec<String>>,
    #[serde(default)]
    treat_origin_as_unset: Option<bool>,
    #[serde(default)]
    default_generations: Option<u32>,
    #[serde(default)]
    max_generations: Option<u32>,
    #[serde(default)]
    resolvers: Option<Vec<String>>,
    #[serde(default)]
    places: Option<Vec<PlaceEntry>>,
}

#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Yaml(serde_yaml::Error),
    InvalidResolver(String),
    EmptyPalette,
    InvalidZoom(u8),
    InvalidPlace(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(err) => write!(f, "{err}"),
            Self::Yaml(err) => write!(f, "{err}"),
            Self::InvalidResolver(value) => write!(f, "unknown resolver `{value}`"),
            Self::EmptyPalette => write!(f, "`colors` must list at least one color"),
            Self::InvalidZoom(value) => write!(f, "zoom {value} is outside 1..={MAX_ZOOM}"),
            Self::InvalidPlace(name) => write!(f, "place `{name}` has out-of-range coordinates"),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<std::io::Error> for ConfigError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<serde_yaml::Error> for ConfigError {
    fn from(value: serde_yaml::Error) -> Self {
        Self::Yaml(value)
    }
}

#[derive(Debug, Default)]
struct ConfigLayer {
    zoom: Option<u8>,
    icon: Option<String>,
    colors: Option<ColorTable>,
    treat_origin_as_unset: Option<bool>,
    default_generations: Option<u32>,
    max_generations: Option<u32>,
    resolvers: Option<Vec<ResolverChoice>>,
    places: Vec<PlaceEntry>,
}

/// Merges, in increasing precedence: the user config, the nearest project
/// config above `cwd`, and an explicitly named config file.
pub fn load_effective_config(
    cwd: &Path,
    explicit: Option<&Path>,
    user_config: Option<&Path>,
) -> Result<MapConfig, ConfigError> {
    let mut merged = MapConfig::default();

    if let Some(path) = user_config.filter(|path| path.exists()) {
        let layer = load_config_layer(path)?;
        merge_layer(&mut merged, layer);
    }

    if let Some(path) = find_nearest_project_config(cwd) {
        let layer = load_config_layer(&path)?;
        merge_layer(&mut merged, layer);
    }

    if let Some(path) = explicit {
        let layer = load_config_layer(path)?;
        merge_layer(&mut merged, layer);
    }

    Ok(merged)
}

pub fn find_nearest_project_config(start: &Path) -> Option<PathBuf> {
    for dir in start.ancestors() {
        let candidate = dir.join(PROJECT_CONFIG_FILE);
        if candidate.is_file() {
            return Some(candidate);
        }
    }
    None
}

fn merge_layer(merged: &mut MapConfig, layer: ConfigLayer) {
    if let Some(zoom) = layer.zoom {
        merged.zoom = zoom;
    }
    if let Some(icon) = layer.icon {
        merged.icon = icon;
    }
    if let Some(colors) = layer.colors {
        merged.colors = colors;
    }
    if let Some(value) = layer.treat_origin_as_unset {
        merged.treat_origin_as_unset = value;
    }
    if let Some(value) = layer.default_generations {
        merged.default_generations = value;
    }
    if let Some(value) = layer.max_generations {
        merged.max_generations = value;
    }
    if let Some(resolvers) = layer.resolvers {
        merged.resolvers = resolvers;
    }
    merge_places_dedup(&mut merged.places, layer.places);
}

fn merge_places_dedup(existing: &mut Vec<PlaceEntry>, incoming: Vec<PlaceEntry>) {
    let mut indices = HashMap::new();
    for (idx, place) in existing.iter().enumerate() {
        indices.insert(place.name.clone(), idx);
    }

    for place in incoming {
        if let Some(idx) = indices.get(&place.name).copied() {
            existing[idx] = place;
        } else {
            let idx = existing.len();
            indices.insert(place.name.clone(), idx);
            existing.push(place);
        }
    }
}

fn load_config_layer(path: &Path) -> Result<ConfigLayer, ConfigError> {
    let content = fs::read_to_string(path)?;
    parse_config_layer(&content)
}

fn parse_config_layer(content: &str) -> Result<ConfigLayer, ConfigError> {
    if content.trim().is_empty() {
        return Ok(ConfigLayer::default());
    }
    let raw: Option<RawConfig> = serde_yaml::from_str(content)?;
    let Some(raw) = raw else {
        return Ok(ConfigLayer::default());
    };

    if let Some(zoom) = raw.zoom {
        if zoom == 0 || zoom > MAX_ZOOM {
            return Err(ConfigError::InvalidZoom(zoom));
        }
    }
    let colors = match raw.colors {
        Some(colors) => Some(ColorTable::new(colors).ok_or(ConfigError::EmptyPalette)?),
        None => None,
    };
    let resolvers = match raw.resolvers {
        Some(names) => Some(
            names
                .iter()
                .map(|name| parse_resolver_choice(name))
                .collect::<Result<Vec<_>, _>>()?,
        ),
        None => None,
    };
    let places = raw.places.unwrap_or_default();
    for place in &places {
        if !GeoPoint::new(place.latitude, place.longitude).is_valid() {
            return Err(ConfigError::InvalidPlace(place.name.clone()));
        }
    }

    Ok(ConfigLayer {
        zoom: raw.zoom,
        icon: raw.icon,
        colors,
        treat_origin_as_unset: raw.treat_origin_as_unset,
        default_generations: raw.default_generations,
        max_generations: raw.max_generations,
        resolvers,
        places,
    })
}

pub fn load_config_file(path: &Path) -> Result<MapConfig, ConfigError> {
    let layer = load_config_layer(path)?;
    let mut config = MapConfig::default();
    merge_layer(&mut config, layer);
    Ok(config)
}

pub fn default_config_yaml() -> String {
    r#"zoom: 2
icon: bullseye
treat_origin_as_unset: true
default_generations: 4
max_generations: 10
resolvers:
  - gedcom
  - gazetteer
places: []
"#
    .to_string()
}

fn parse_resolver_choice(raw: &str) -> Result<ResolverChoice, ConfigError> {
    let normalized = raw.trim().to_ascii_lowercase();
    match normalized.as_str() {
        "gedcom" => Ok(ResolverChoice::Gedcom),
        "gazetteer" => Ok(ResolverChoice::Gazetteer),
        _ => Err(ConfigError::InvalidResolver(raw.to_string())),
    }
}
