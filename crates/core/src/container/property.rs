use std::collections::BTreeMap;
use std::sync::RwLock;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::CoreError;

/// A named set of properties consulted when resolving placeholders
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertySource {
    pub name: String,
    #[serde(default)]
    pub properties: BTreeMap<String, Value>,
}

impl PropertySource {
    /// Create an empty property source
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            properties: BTreeMap::new(),
        }
    }

    /// Add a property
    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }

    /// Build a source from any serializable value, flattening nested
    /// objects into dotted keys and arrays into `key[index]` keys.
    pub fn from_serializable<T: Serialize + ?Sized>(
        name: impl Into<String>,
        value: &T,
    ) -> Result<Self, CoreError> {
        let mut properties = BTreeMap::new();
        flatten_into(&mut properties, None, serde_json::to_value(value)?);
        Ok(Self {
            name: name.into(),
            properties,
        })
    }

    /// Get a property value
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.properties.get(key)
    }

    /// Check if the source defines a key
    pub fn contains(&self, key: &str) -> bool {
        self.properties.contains_key(key)
    }
}

fn flatten_into(target: &mut BTreeMap<String, Value>, prefix: Option<String>, value: Value) {
    match value {
        Value::Object(map) => {
            for (key, nested) in map {
                let key = match &prefix {
                    Some(prefix) => format!("{}.{}", prefix, key),
                    None => key,
                };
                flatten_into(target, Some(key), nested);
            }
        }
        Value::Array(items) => {
            let prefix = prefix.unwrap_or_default();
            for (index, nested) in items.into_iter().enumerate() {
                flatten_into(target, Some(format!("{}[{}]", prefix, index)), nested);
            }
        }
        scalar => {
            if let Some(key) = prefix {
                target.insert(key, scalar);
            }
        }
    }
}

/// Ordered chain of property sources; earlier sources take precedence
#[derive(Debug, Default)]
pub struct PropertySources {
    sources: RwLock<Vec<PropertySource>>,
}

impl PropertySources {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a source with highest precedence, replacing any source with the same name
    pub fn add_first(&self, source: PropertySource) -> Result<(), CoreError> {
        let mut sources = self.write()?;
        sources.retain(|existing| existing.name != source.name);
        sources.insert(0, source);
        Ok(())
    }

    /// Insert a source with lowest precedence, replacing any source with the same name
    pub fn add_last(&self, source: PropertySource) -> Result<(), CoreError> {
        let mut sources = self.write()?;
        sources.retain(|existing| existing.name != source.name);
        sources.push(source);
        Ok(())
    }

    /// Get a source by name
    pub fn get(&self, name: &str) -> Option<PropertySource> {
        self.sources
            .read()
            .ok()?
            .iter()
            .find(|source| source.name == name)
            .cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Source names in precedence order
    pub fn names(&self) -> Vec<String> {
        self.sources
            .read()
            .map(|sources| sources.iter().map(|source| source.name.clone()).collect())
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.sources.read().map(|sources| sources.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Look a property up through the chain
    pub fn property(&self, key: &str) -> Option<Value> {
        self.sources
            .read()
            .ok()?
            .iter()
            .find_map(|source| source.get(key).cloned())
    }

    /// Look a property up and render it as text
    pub fn property_as_string(&self, key: &str) -> Option<String> {
        self.property(key).map(|value| match value {
            Value::String(text) => text,
            other => other.to_string(),
        })
    }

    /// Replace every `${key}` or `${key:default}` in `text`
    pub fn resolve_placeholders(&self, text: &str) -> Result<String, CoreError> {
        let mut resolved = String::with_capacity(text.len());
        let mut rest = text;

        while let Some(start) = rest.find("${") {
            resolved.push_str(&rest[..start]);
            let after = &rest[start + 2..];
            let end = after
                .find('}')
                .ok_or_else(|| CoreError::UnresolvablePlaceholder {
                    placeholder: rest[start..].to_string(),
                })?;
            let expression = &after[..end];
            let (key, default) = match expression.split_once(':') {
                Some((key, default)) => (key, Some(default)),
                None => (expression, None),
            };

            match self.property_as_string(key) {
                Some(value) => resolved.push_str(&value),
                None => match default {
                    Some(default) => resolved.push_str(default),
                    None => {
                        return Err(CoreError::UnresolvablePlaceholder {
                            placeholder: key.to_string(),
                        })
                    }
                },
            }
            rest = &after[end + 1..];
        }

        resolved.push_str(rest);
        Ok(resolved)
    }

    fn write(&self) -> Result<std::sync::RwLockWriteGuard<'_, Vec<PropertySource>>, CoreError> {
        self.sources
            .write()
            .map_err(|_| CoreError::lock("property_sources"))
    }
}
