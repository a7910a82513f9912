use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};

use chrono::{DateTime, Utc};
use tracing::{debug, info};
use uuid::Uuid;

use crate::container::component::{Component, DiscoveryMarker};
use crate::container::context::ApplicationContext;
use crate::container::modules::{find_module, scan_modules};
use crate::container::property::PropertySources;
use crate::container::registry::{ComponentDefinition, ComponentResolver, DefinitionRegistry};
use crate::errors::CoreError;

/// How configuration locations are matched against component modules
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum LocationPolicy {
    /// Every location names exactly one module
    Exact,
    /// Every location is a prefix; all modules under it load
    Prefix,
}

/// State shared by the bundled context implementations
pub(crate) struct ContextCore {
    id: String,
    display_name: String,
    active: AtomicBool,
    started_at: RwLock<Option<DateTime<Utc>>>,
    parent: RwLock<Option<Arc<dyn ApplicationContext>>>,
    config_locations: RwLock<Vec<String>>,
    profiles: RwLock<Vec<String>>,
    property_sources: PropertySources,
    definitions: RwLock<DefinitionRegistry>,
    singletons: RwLock<HashMap<String, Component>>,
}

impl ContextCore {
    pub(crate) fn new(kind: &str) -> Self {
        let id = Uuid::new_v4().to_string();
        let display_name = format!("{}-context-{}", kind, &id[..8]);
        Self {
            id,
            display_name,
            active: AtomicBool::new(false),
            started_at: RwLock::new(None),
            parent: RwLock::new(None),
            config_locations: RwLock::new(Vec::new()),
            profiles: RwLock::new(Vec::new()),
            property_sources: PropertySources::new(),
            definitions: RwLock::new(DefinitionRegistry::new()),
            singletons: RwLock::new(HashMap::new()),
        }
    }

    pub(crate) fn id(&self) -> &str {
        &self.id
    }

    pub(crate) fn display_name(&self) -> &str {
        &self.display_name
    }

    pub(crate) fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }

    pub(crate) fn started_at(&self) -> Option<DateTime<Utc>> {
        self.started_at.read().ok().and_then(|started| *started)
    }

    pub(crate) fn parent(&self) -> Option<Arc<dyn ApplicationContext>> {
        self.parent.read().ok().and_then(|parent| parent.clone())
    }

    pub(crate) fn set_parent(&self, parent: Arc<dyn ApplicationContext>) -> Result<(), CoreError> {
        self.ensure_building("set the parent of")?;
        *self.parent.write().map_err(|_| CoreError::lock("parent"))? = Some(parent);
        Ok(())
    }

    pub(crate) fn set_config_locations(&self, locations: &[String]) -> Result<(), CoreError> {
        self.ensure_building("set configuration locations on")?;
        *self
            .config_locations
            .write()
            .map_err(|_| CoreError::lock("config_locations"))? = locations.to_vec();
        Ok(())
    }

    pub(crate) fn config_locations(&self) -> Vec<String> {
        self.config_locations
            .read()
            .map(|locations| locations.clone())
            .unwrap_or_default()
    }

    pub(crate) fn set_active_profiles(&self, profiles: &[String]) -> Result<(), CoreError> {
        self.ensure_building("set active profiles on")?;
        *self.profiles.write().map_err(|_| CoreError::lock("profiles"))? = profiles.to_vec();
        Ok(())
    }

    pub(crate) fn active_profiles(&self) -> Vec<String> {
        self.profiles
            .read()
            .map(|profiles| profiles.clone())
            .unwrap_or_default()
    }

    pub(crate) fn property_sources(&self) -> &PropertySources {
        &self.property_sources
    }

    pub(crate) fn register_singleton(&self, name: &str, component: Component) -> Result<(), CoreError> {
        self.ensure_building("register a singleton into")?;
        let mut singletons = self.write_singletons()?;
        if singletons.contains_key(name) {
            return Err(CoreError::registration_conflict(
                name,
                "a component with this name is already registered",
            ));
        }
        singletons.insert(name.to_string(), component);
        debug!(context = %self.display_name, name, "Registered singleton");
        Ok(())
    }

    pub(crate) fn add_definitions(&self, registry: DefinitionRegistry) -> Result<(), CoreError> {
        self.ensure_building("define components in")?;
        self.definitions
            .write()
            .map_err(|_| CoreError::lock("definitions"))?
            .extend(registry);
        Ok(())
    }

    pub(crate) fn definition_names(&self) -> Vec<String> {
        self.definitions
            .read()
            .map(|definitions| definitions.names())
            .unwrap_or_default()
    }

    pub(crate) fn components_with(
        &self,
        marker: DiscoveryMarker,
    ) -> Result<HashMap<String, Component>, CoreError> {
        let singletons = self
            .singletons
            .read()
            .map_err(|_| CoreError::lock("singletons"))?;
        Ok(singletons
            .iter()
            .filter(|(_, component)| component.matches(marker))
            .map(|(name, component)| (name.clone(), component.clone()))
            .collect())
    }

    pub(crate) fn lookup(&self, name: &str) -> Result<Component, CoreError> {
        if let Some(component) = self.local(name) {
            return Ok(component);
        }
        match self.parent() {
            Some(parent) => parent.get_component(name),
            None => Err(CoreError::component_not_found(name)),
        }
    }

    pub(crate) fn contains(&self, name: &str) -> bool {
        self.local(name).is_some()
            || self
                .parent()
                .map(|parent| parent.contains_component(name))
                .unwrap_or(false)
    }

    /// Load module definitions, instantiate every definition in order and activate.
    ///
    /// A failing definition discards the components created by this refresh
    /// and leaves the context building.
    pub(crate) fn refresh(&self, policy: LocationPolicy) -> Result<(), CoreError> {
        if self.is_active() {
            return Err(CoreError::invalid_state(format!(
                "context '{}' has already been refreshed",
                self.display_name
            )));
        }

        let mut registry = self
            .definitions
            .read()
            .map_err(|_| CoreError::lock("definitions"))?
            .clone();
        registry.extend(self.load_modules(policy)?);

        let mut created: Vec<String> = Vec::new();
        for definition in registry.into_definitions() {
            if let Err(error) = self.instantiate(&definition) {
                self.discard(&created);
                return Err(error);
            }
            created.push(definition.name);
        }

        self.active.store(true, Ordering::SeqCst);
        *self
            .started_at
            .write()
            .map_err(|_| CoreError::lock("started_at"))? = Some(Utc::now());

        info!(
            context = %self.display_name,
            id = %self.id,
            created = created.len(),
            "Application context refreshed"
        );
        Ok(())
    }

    fn load_modules(&self, policy: LocationPolicy) -> Result<DefinitionRegistry, CoreError> {
        let profiles = self.active_profiles();
        let mut loaded = DefinitionRegistry::new();

        for location in self.config_locations() {
            let modules = match policy {
                LocationPolicy::Exact => vec![find_module(&location).ok_or_else(|| {
                    CoreError::ModuleNotFound {
                        location: location.clone(),
                    }
                })?],
                LocationPolicy::Prefix => scan_modules(&location),
            };

            for module in modules {
                if !module.is_enabled_for(&profiles) {
                    debug!(location = module.location, "Skipping module for inactive profiles");
                    continue;
                }
                let mut definitions = DefinitionRegistry::new();
                (module.register)(&mut definitions);
                debug!(
                    location = module.location,
                    definitions = definitions.len(),
                    "Loaded component module"
                );
                loaded.extend(definitions);
            }
        }

        Ok(loaded)
    }

    fn instantiate(&self, definition: &ComponentDefinition) -> Result<(), CoreError> {
        if self.local(&definition.name).is_some() {
            return Err(CoreError::registration_conflict(
                &definition.name,
                "a component with this name is already registered",
            ));
        }

        let resolver = ComponentResolver::new(self);
        let component = (definition.factory)(&resolver)
            .map_err(|error| CoreError::component_creation(&definition.name, Box::new(error)))?;

        self.write_singletons()?
            .insert(definition.name.clone(), component);
        debug!(context = %self.display_name, name = %definition.name, "Created component");
        Ok(())
    }

    fn discard(&self, names: &[String]) {
        if let Ok(mut singletons) = self.singletons.write() {
            for name in names {
                singletons.remove(name);
            }
        }
    }

    fn local(&self, name: &str) -> Option<Component> {
        self.singletons.read().ok()?.get(name).cloned()
    }

    fn ensure_building(&self, action: &str) -> Result<(), CoreError> {
        if self.is_active() {
            return Err(CoreError::invalid_state(format!(
                "cannot {} context '{}' after it has been refreshed",
                action, self.display_name
            )));
        }
        Ok(())
    }

    fn write_singletons(
        &self,
    ) -> Result<std::sync::RwLockWriteGuard<'_, HashMap<String, Component>>, CoreError> {
        self.singletons
            .write()
            .map_err(|_| CoreError::lock("singletons"))
    }
}

impl std::fmt::Debug for ContextCore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContextCore")
            .field("id", &self.id)
            .field("display_name", &self.display_name)
            .field("active", &self.is_active())
            .field("config_locations", &self.config_locations())
            .field("profiles", &self.active_profiles())
            .field("has_parent", &self.parent().is_some())
            .finish()
    }
}

/// Implements `ApplicationContext` for a type holding a `core: ContextCore` field
macro_rules! delegate_to_core {
    ($context:ty, $policy:expr) => {
        impl $crate::container::context::ApplicationContext for $context {
            fn id(&self) -> &str {
                self.core.id()
            }

            fn display_name(&self) -> &str {
                self.core.display_name()
            }

            fn as_any(&self) -> &dyn ::std::any::Any {
                self
            }

            fn is_active(&self) -> bool {
                self.core.is_active()
            }

            fn started_at(&self) -> Option<::chrono::DateTime<::chrono::Utc>> {
                self.core.started_at()
            }

            fn parent(
                &self,
            ) -> Option<::std::sync::Arc<dyn $crate::container::context::ApplicationContext>> {
                self.core.parent()
            }

            fn set_parent(
                &self,
                parent: ::std::sync::Arc<dyn $crate::container::context::ApplicationContext>,
            ) -> Result<(), $crate::errors::CoreError> {
                self.core.set_parent(parent)
            }

            fn set_config_locations(
                &self,
                locations: &[String],
            ) -> Result<(), $crate::errors::CoreError> {
                self.core.set_config_locations(locations)
            }

            fn config_locations(&self) -> Vec<String> {
                self.core.config_locations()
            }

            fn set_active_profiles(
                &self,
                profiles: &[String],
            ) -> Result<(), $crate::errors::CoreError> {
                self.core.set_active_profiles(profiles)
            }

            fn active_profiles(&self) -> Vec<String> {
                self.core.active_profiles()
            }

            fn property_sources(&self) -> &$crate::container::property::PropertySources {
                self.core.property_sources()
            }

            fn register_singleton(
                &self,
                name: &str,
                component: $crate::container::component::Component,
            ) -> Result<(), $crate::errors::CoreError> {
                self.core.register_singleton(name, component)
            }

            fn refresh(&self) -> Result<(), $crate::errors::CoreError> {
                self.core.refresh($policy)
            }

            fn components_with(
                &self,
                marker: $crate::container::component::DiscoveryMarker,
            ) -> Result<
                ::std::collections::HashMap<String, $crate::container::component::Component>,
                $crate::errors::CoreError,
            > {
                self.core.components_with(marker)
            }

            fn get_component(
                &self,
                name: &str,
            ) -> Result<$crate::container::component::Component, $crate::errors::CoreError> {
                self.core.lookup(name)
            }

            fn contains_component(&self, name: &str) -> bool {
                self.core.contains(name)
            }
        }
    };
}

pub(crate) use delegate_to_core;
