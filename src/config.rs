//! Configuration for building a [`PolygonIndex`](crate::PolygonIndex).
use serde::de::Error;

use crate::compute::spatial::rtree::{DEFAULT_MAX_ENTRIES, MIN_MAX_ENTRIES};
use crate::error::{LocateError, Result};

/// Which record `query` returns when several polygons contain the point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverlapPolicy {
    /// First confirmed candidate in tree traversal order.
    FirstMatch,
    /// Candidate whose record came first in input order.
    #[default]
    InputOrder,
    /// Candidate with the smallest polygon area; ties by input order.
    SmallestArea,
}

/// Index configuration
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Maximum children per tree node
    #[serde(default = "Config::default_max_entries")]
    pub max_entries: usize,

    #[serde(default)]
    pub overlap_policy: OverlapPolicy,

    /// Property key that receives the 1-based feature position when loading GeoJSON
    #[serde(default = "Config::default_feature_index_key")]
    pub feature_index_key: Option<String>,

    /// Skip malformed records during bulk loads instead of failing
    #[serde(default = "Config::default_skip_invalid")]
    pub skip_invalid: bool,
}

impl Config {
    const fn default_max_entries() -> usize {
        DEFAULT_MAX_ENTRIES
    }

    fn default_feature_index_key() -> Option<String> {
        Some("_index".to_string())
    }

    const fn default_skip_invalid() -> bool {
        true
    }

    pub fn with_max_entries(mut self, max_entries: usize) -> Self {
        if max_entries > 256 {
            log::warn!(
                "max_entries of {} is very large; node splits and leaf scans will be slow",
                max_entries
            );
        }
        self.max_entries = max_entries;
        self
    }

    pub fn with_overlap_policy(mut self, policy: OverlapPolicy) -> Self {
        self.overlap_policy = policy;
        self
    }

    /// Set the property key for feature positions; `None` disables tagging.
    pub fn with_feature_index_key<S: Into<String>>(mut self, key: Option<S>) -> Self {
        self.feature_index_key = key.map(Into::into);
        self
    }

    pub fn with_skip_invalid(mut self, skip: bool) -> Self {
        self.skip_invalid = skip;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_entries < MIN_MAX_ENTRIES {
            return Err(LocateError::InvalidConfig(format!(
                "max_entries must be at least {}, got {}",
                MIN_MAX_ENTRIES, self.max_entries
            )));
        }

        if let Some(key) = &self.feature_index_key
            && key.is_empty()
        {
            return Err(LocateError::InvalidConfig(
                "feature_index_key must not be empty".to_string(),
            ));
        }

        Ok(())
    }

    pub fn from_json(json: &str) -> std::result::Result<Self, serde_json::Error> {
        let config: Config = serde_json::from_str(json)?;
        if let Err(e) = config.validate() {
            return Err(serde_json::Error::custom(e));
        }
        Ok(config)
    }

    pub fn to_json(&self) -> std::result::Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    #[cfg(feature = "toml")]
    pub fn from_toml(toml_str: &str) -> std::result::Result<Self, toml::de::Error> {
        let config: Config = toml::from_str(toml_str)?;
        if let Err(e) = config.validate() {
            return Err(toml::de::Error::custom(e));
        }
        Ok(config)
    }

    #[cfg(feature = "toml")]
    pub fn to_toml(&self) -> std::result::Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_entries: Self::default_max_entries(),
            overlap_policy: OverlapPolicy::default(),
            feature_index_key: Self::default_feature_index_key(),
            skip_invalid: Self::default_skip_invalid(),
        }
    }
}
