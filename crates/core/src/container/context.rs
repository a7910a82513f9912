use std::any::Any;
use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::container::component::{Capability, Component, DiscoveryMarker};
use crate::container::property::PropertySources;
use crate::errors::CoreError;

/// The dependency-injection container driven by the configurer.
///
/// A context starts out *building*: singletons, property sources, profiles,
/// configuration locations and a parent may still be set. `refresh` makes
/// it *active*, after which its component graph is fixed and queryable.
/// Methods take `&self` so a context can be shared with the caller as an
/// `Arc` while the configurer drives it.
pub trait ApplicationContext: Send + Sync + 'static {
    /// Unique id assigned at creation
    fn id(&self) -> &str;

    fn display_name(&self) -> &str;

    /// Access to the concrete context type
    fn as_any(&self) -> &dyn Any;

    fn is_active(&self) -> bool;

    /// When the context was refreshed, if it has been
    fn started_at(&self) -> Option<DateTime<Utc>>;

    fn parent(&self) -> Option<Arc<dyn ApplicationContext>>;

    fn set_parent(&self, parent: Arc<dyn ApplicationContext>) -> Result<(), CoreError>;

    fn set_config_locations(&self, locations: &[String]) -> Result<(), CoreError>;

    fn config_locations(&self) -> Vec<String>;

    fn set_active_profiles(&self, profiles: &[String]) -> Result<(), CoreError>;

    fn active_profiles(&self) -> Vec<String>;

    /// The property-source chain placeholders resolve against
    fn property_sources(&self) -> &PropertySources;

    /// Register a ready-made instance under `name`; only legal while building
    fn register_singleton(&self, name: &str, component: Component) -> Result<(), CoreError>;

    /// Activate the context
    fn refresh(&self) -> Result<(), CoreError>;

    /// All components of this context (not its ancestors) matching `marker`
    fn components_with(
        &self,
        marker: DiscoveryMarker,
    ) -> Result<HashMap<String, Component>, CoreError>;

    /// Look a component up by name, falling back to the parent context
    fn get_component(&self, name: &str) -> Result<Component, CoreError>;

    fn contains_component(&self, name: &str) -> bool;

    /// Look a component up by name and require a capability
    fn get_component_with(
        &self,
        name: &str,
        capability: Capability,
    ) -> Result<Component, CoreError> {
        let component = self.get_component(name)?;
        if component.has(capability) {
            Ok(component)
        } else {
            Err(CoreError::not_of_required_type(name, capability.to_string()))
        }
    }
}

impl std::fmt::Debug for dyn ApplicationContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApplicationContext")
            .field("id", &self.id())
            .field("display_name", &self.display_name())
            .field("active", &self.is_active())
            .finish()
    }
}

/// A context implementation the configurer can instantiate by type
pub trait ContextFactory: ApplicationContext + Sized {
    /// Name under which the implementation is registered
    const NAME: &'static str;

    fn instantiate() -> Self;
}

/// Registry entry for context implementations
///
/// Implementations register themselves with
/// `#[linkme::distributed_slice(APPLICATION_CONTEXTS)]` so a
/// `ContextConfiguration` can name them.
pub struct ContextEntry {
    /// Unique implementation name (e.g., "generic", "module")
    pub name: &'static str,
    /// Human-readable description
    pub description: &'static str,
    /// Creates a fresh, building context
    pub factory: fn() -> Arc<dyn ApplicationContext>,
}

#[linkme::distributed_slice]
pub static APPLICATION_CONTEXTS: [ContextEntry] = [..];

/// Instantiate the context implementation registered under `name`
pub fn resolve_context(name: &str) -> Result<Arc<dyn ApplicationContext>, CoreError> {
    for entry in APPLICATION_CONTEXTS {
        if entry.name == name {
            return Ok((entry.factory)());
        }
    }

    let available: Vec<&str> = APPLICATION_CONTEXTS.iter().map(|e| e.name).collect();

    Err(CoreError::instantiation(
        name,
        format!(
            "no context implementation registered under this name. Available: {:?}",
            available
        ),
    ))
}

/// List all registered context implementations as (name, description)
pub fn list_contexts() -> Vec<(&'static str, &'static str)> {
    APPLICATION_CONTEXTS
        .iter()
        .map(|e| (e.name, e.description))
        .collect()
}
