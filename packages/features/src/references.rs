//! Selects qualifying roads and transit stations from raw reference
//! objects.
//!
//! The spatial analyzer trusts its reference sets as given; this filter is
//! how callers decide what counts as an arterial road or a transit station.
//! The default rules are embedded from `config/references.toml` and can be
//! replaced with a file via [`ReferenceConfig::load`].

use std::collections::BTreeMap;
use std::path::Path;

use commerce_map_geo_models::GeoObject;
use serde::Deserialize;

use crate::FeatureError;

/// Environment variable naming an alternative reference config file.
pub const REFERENCES_ENV: &str = "COMMERCE_MAP_REFERENCES";

const EMBEDDED_CONFIG: &str = include_str!("../config/references.toml");

/// Rules for which reference objects qualify.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ReferenceConfig {
    pub roads: RoadFilter,
    pub transit: TransitFilter,
}

/// A road qualifies when its `tag` holds one of `classes`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RoadFilter {
    /// Tag holding the road class (e.g. `highway`).
    pub tag: String,
    /// Accepted classes (e.g. `primary`, `trunk`).
    pub classes: Vec<String>,
}

/// A station qualifies when it carries every one of `required_tags`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TransitFilter {
    pub required_tags: BTreeMap<String, String>,
}

impl ReferenceConfig {
    /// Parses a config from TOML.
    ///
    /// # Errors
    ///
    /// Returns [`FeatureError::Config`] if the TOML is malformed or missing
    /// a section.
    pub fn from_toml(toml_str: &str) -> Result<Self, FeatureError> {
        toml::de::from_str(toml_str).map_err(|e| FeatureError::Config {
            message: e.to_string(),
        })
    }

    /// The rules shipped with the crate.
    ///
    /// # Panics
    ///
    /// Panics if the embedded config is malformed (this is a compile-time
    /// guarantee since the config is embedded and covered by tests).
    #[must_use]
    pub fn embedded() -> Self {
        Self::from_toml(EMBEDDED_CONFIG)
            .unwrap_or_else(|e| panic!("Failed to parse embedded references.toml: {e}"))
    }

    /// Loads the config from `path`, falling back to the file named by
    /// [`REFERENCES_ENV`], and finally to [`Self::embedded`].
    ///
    /// # Errors
    ///
    /// Returns [`FeatureError`] if the chosen file cannot be read or parsed.
    pub fn load(path: Option<&Path>) -> Result<Self, FeatureError> {
        let from_env = std::env::var(REFERENCES_ENV).ok();
        let path = path.or_else(|| from_env.as_deref().map(Path::new));

        let Some(path) = path else {
            return Ok(Self::embedded());
        };

        log::info!("Loading reference filter from {}", path.display());
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml(&contents)
    }

    #[must_use]
    pub fn is_qualifying_road(&self, object: &GeoObject) -> bool {
        object
            .tag(&self.roads.tag)
            .is_some_and(|class| self.roads.classes.iter().any(|c| c == class))
    }

    #[must_use]
    pub fn is_transit_station(&self, object: &GeoObject) -> bool {
        !self.transit.required_tags.is_empty()
            && self
                .transit
                .required_tags
                .iter()
                .all(|(key, value)| object.tag(key) == Some(value.as_str()))
    }

    /// Keeps only the qualifying roads.
    #[must_use]
    pub fn qualifying_roads(&self, objects: Vec<GeoObject>) -> Vec<GeoObject> {
        let before = objects.len();
        let roads: Vec<GeoObject> = objects
            .into_iter()
            .filter(|o| self.is_qualifying_road(o))
            .collect();
        log::debug!("{} of {before} road objects qualify", roads.len());
        roads
    }

    /// Keeps only the transit stations.
    #[must_use]
    pub fn transit_stations(&self, objects: Vec<GeoObject>) -> Vec<GeoObject> {
        let before = objects.len();
        let stations: Vec<GeoObject> = objects
            .into_iter()
            .filter(|o| self.is_transit_station(o))
            .collect();
        log::debug!("{} of {before} transit objects are stations", stations.len());
        stations
    }
}

impl Default for ReferenceConfig {
    fn default() -> Self {
        Self::embedded()
    }
}
