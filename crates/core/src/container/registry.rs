use std::sync::Arc;

use serde_json::Value;

use crate::container::component::Component;
use crate::container::state::ContextCore;
use crate::errors::CoreError;

/// Factory invoked once per definition while the owning context refreshes
pub type ComponentFactory =
    Arc<dyn Fn(&ComponentResolver<'_>) -> Result<Component, CoreError> + Send + Sync>;

/// A named recipe for a component, instantiated at refresh
#[derive(Clone)]
pub struct ComponentDefinition {
    pub name: String,
    pub factory: ComponentFactory,
}

impl std::fmt::Debug for ComponentDefinition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ComponentDefinition")
            .field("name", &self.name)
            .field("factory", &"<factory>")
            .finish()
    }
}

/// Ordered list of component definitions
#[derive(Debug, Default, Clone)]
pub struct DefinitionRegistry {
    definitions: Vec<ComponentDefinition>,
}

impl DefinitionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Define a component produced by `factory`
    pub fn define<F>(&mut self, name: impl Into<String>, factory: F) -> &mut Self
    where
        F: Fn(&ComponentResolver<'_>) -> Result<Component, CoreError> + Send + Sync + 'static,
    {
        self.definitions.push(ComponentDefinition {
            name: name.into(),
            factory: Arc::new(factory),
        });
        self
    }

    /// Define a component from an already-built instance
    pub fn define_component(&mut self, name: impl Into<String>, component: Component) -> &mut Self {
        self.define(name, move |_| Ok(component.clone()))
    }

    pub fn names(&self) -> Vec<String> {
        self.definitions.iter().map(|d| d.name.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    pub(crate) fn extend(&mut self, other: DefinitionRegistry) {
        self.definitions.extend(other.definitions);
    }

    pub(crate) fn into_definitions(self) -> Vec<ComponentDefinition> {
        self.definitions
    }
}

/// What a component factory can see of its context while it runs.
///
/// Only components created earlier in the refresh, registered singletons
/// and components of the parent context are visible.
pub struct ComponentResolver<'a> {
    core: &'a ContextCore,
}

impl<'a> ComponentResolver<'a> {
    pub(crate) fn new(core: &'a ContextCore) -> Self {
        Self { core }
    }

    /// Look a component up by name
    pub fn get(&self, name: &str) -> Result<Component, CoreError> {
        self.core.lookup(name)
    }

    /// Look a component up and recover its concrete type
    pub fn get_as<T: Send + Sync + 'static>(&self, name: &str) -> Result<Arc<T>, CoreError> {
        self.get(name)?
            .downcast::<T>()
            .ok_or_else(|| CoreError::not_of_required_type(name, std::any::type_name::<T>()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.core.lookup(name).is_ok()
    }

    pub fn property(&self, key: &str) -> Option<Value> {
        self.core.property_sources().property(key)
    }

    pub fn resolve_placeholders(&self, text: &str) -> Result<String, CoreError> {
        self.core.property_sources().resolve_placeholders(text)
    }

    pub fn active_profiles(&self) -> Vec<String> {
        self.core.active_profiles()
    }
}
