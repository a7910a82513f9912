use std::sync::Arc;

use crate::container::component::Component;
use crate::container::context::{ApplicationContext, ContextEntry, ContextFactory, APPLICATION_CONTEXTS};
use crate::container::registry::{ComponentResolver, DefinitionRegistry};
use crate::container::state::{delegate_to_core, ContextCore, LocationPolicy};
use crate::errors::CoreError;

/// Context whose components are defined programmatically.
///
/// Configuration locations are treated as scan prefixes: at refresh every
/// component module whose location starts with one of them is loaded.
#[derive(Debug)]
pub struct GenericApplicationContext {
    core: ContextCore,
}

impl GenericApplicationContext {
    pub fn new() -> Self {
        Self {
            core: ContextCore::new(Self::NAME),
        }
    }

    /// Define a component produced by `factory` at refresh
    pub fn define<F>(&self, name: impl Into<String>, factory: F) -> Result<(), CoreError>
    where
        F: Fn(&ComponentResolver<'_>) -> Result<Component, CoreError> + Send + Sync + 'static,
    {
        let mut registry = DefinitionRegistry::new();
        registry.define(name, factory);
        self.core.add_definitions(registry)
    }

    /// Define a component from an already-built instance
    pub fn define_component(
        &self,
        name: impl Into<String>,
        component: impl Into<Component>,
    ) -> Result<(), CoreError> {
        let mut registry = DefinitionRegistry::new();
        registry.define_component(name, component.into());
        self.core.add_definitions(registry)
    }

    /// Names of components that will be created at refresh, in order
    pub fn definition_names(&self) -> Vec<String> {
        self.core.definition_names()
    }
}

impl Default for GenericApplicationContext {
    fn default() -> Self {
        Self::new()
    }
}

impl ContextFactory for GenericApplicationContext {
    const NAME: &'static str = "generic";

    fn instantiate() -> Self {
        Self::new()
    }
}

delegate_to_core!(GenericApplicationContext, LocationPolicy::Prefix);

fn new_generic_context() -> Arc<dyn ApplicationContext> {
    Arc::new(GenericApplicationContext::new())
}

#[linkme::distributed_slice(APPLICATION_CONTEXTS)]
static GENERIC_CONTEXT: ContextEntry = ContextEntry {
    name: GenericApplicationContext::NAME,
    description: "Programmatic definitions; locations scan module prefixes",
    factory: new_generic_context,
};
