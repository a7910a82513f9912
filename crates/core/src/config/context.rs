use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::config::app_config::split_list;
use crate::config::{
    AppConfigTrait, ConfigError, ConfigSource, ConfigValidator, EntryListValidator,
    NonBlankValidator,
};
use crate::container::{GenericApplicationContext, ContextFactory, PropertySource};

pub const CONTEXT_CLASS_VAR: &str = "BEDROCK_CONTEXT_CLASS";
pub const CONFIG_LOCATIONS_VAR: &str = "BEDROCK_CONFIG_LOCATIONS";
pub const PROFILES_VAR: &str = "BEDROCK_PROFILES";

/// Declares which application context to create and how to seed it.
///
/// Typically embedded in a service's own YAML configuration:
///
/// ```yaml
/// context_class: module
/// config_locations: [billing/core]
/// profiles: [production]
/// property_sources:
///   - name: defaults
///     properties:
///       billing.currency: EUR
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContextConfiguration {
    /// Registered name of the context implementation
    pub context_class: String,
    /// Passed through to the context unexamined
    pub config_locations: Vec<String>,
    pub profiles: Vec<String>,
    /// Seeded in order, after any sources the context already has
    pub property_sources: Vec<PropertySource>,
    #[serde(skip)]
    sources: HashMap<String, ConfigSource>,
}

impl Default for ContextConfiguration {
    fn default() -> Self {
        let sources = ["context_class", "config_locations", "profiles"]
            .into_iter()
            .map(|field| (field.to_string(), ConfigSource::Default))
            .collect();
        Self {
            context_class: GenericApplicationContext::NAME.to_string(),
            config_locations: Vec::new(),
            profiles: Vec::new(),
            property_sources: Vec::new(),
            sources,
        }
    }
}

impl ContextConfiguration {
    /// Create a configuration for the named context implementation
    pub fn new(context_class: impl Into<String>) -> Self {
        let mut config = Self::default();
        config.context_class = context_class.into();
        config.mark("context_class", ConfigSource::Programmatic);
        config
    }

    pub fn with_config_location(mut self, location: impl Into<String>) -> Self {
        self.config_locations.push(location.into());
        self.mark("config_locations", ConfigSource::Programmatic);
        self
    }

    pub fn with_profile(mut self, profile: impl Into<String>) -> Self {
        self.profiles.push(profile.into());
        self.mark("profiles", ConfigSource::Programmatic);
        self
    }

    pub fn with_property_source(mut self, source: PropertySource) -> Self {
        self.property_sources.push(source);
        self
    }

    /// Parse a YAML document
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        let mut config: Self = serde_yaml::from_str(yaml)?;
        config.mark_document();
        Ok(config)
    }

    /// Parse a JSON document
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let mut config: Self = serde_json::from_str(json)?;
        config.mark_document();
        Ok(config)
    }

    /// Read a YAML file
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let yaml = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&yaml)
    }

    /// Override fields from `BEDROCK_*` environment variables
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides_from(|key| std::env::var(key).ok())
    }

    /// Override fields from any variable lookup
    pub fn with_overrides_from<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(context_class) = lookup(CONTEXT_CLASS_VAR) {
            self.context_class = context_class.trim().to_string();
            self.mark("context_class", ConfigSource::EnvVar(CONTEXT_CLASS_VAR.to_string()));
        }
        if let Some(locations) = lookup(CONFIG_LOCATIONS_VAR) {
            self.config_locations = split_list(&locations);
            self.mark(
                "config_locations",
                ConfigSource::EnvVar(CONFIG_LOCATIONS_VAR.to_string()),
            );
        }
        if let Some(profiles) = lookup(PROFILES_VAR) {
            self.profiles = split_list(&profiles);
            self.mark("profiles", ConfigSource::EnvVar(PROFILES_VAR.to_string()));
        }
        self
    }

    fn mark(&mut self, field: &str, source: ConfigSource) {
        self.sources.insert(field.to_string(), source);
    }

    fn mark_document(&mut self) {
        for field in ["context_class", "config_locations", "profiles"] {
            self.mark(field, ConfigSource::Document);
        }
    }
}

impl AppConfigTrait for ContextConfiguration {
    fn from_env() -> Result<Self, ConfigError> {
        let config = Self::default().with_env_overrides();
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        NonBlankValidator {
            field: "context_class",
        }
        .validate(self.context_class.as_str())?;
        EntryListValidator {
            field: "config_locations",
        }
        .validate(self.config_locations.as_slice())?;
        EntryListValidator { field: "profiles" }.validate(self.profiles.as_slice())?;

        let names: Vec<String> = self
            .property_sources
            .iter()
            .map(|source| source.name.clone())
            .collect();
        EntryListValidator {
            field: "property_sources",
        }
        .validate(names.as_slice())
        .map_err(|_| ConfigError::validation_failed("property source names must be non-empty and unique"))?;

        Ok(())
    }

    fn config_sources(&self) -> HashMap<String, ConfigSource> {
        self.sources.clone()
    }
}
