//! Discovery of context-managed components into a runtime environment.
//!
//! A [`ServiceConfigurer`] binds one application context, lets the caller
//! expose runtime values to it while it is still building, and then sweeps
//! it for components by [`DiscoveryMarker`], handing each match to the
//! matching [`RuntimeEnvironment`] registration call.
//!
//! ```ignore
//! let environment = Arc::new(ServiceEnvironment::new("billing"));
//! let mut configurer = ServiceConfigurer::for_environment(environment);
//! configurer
//!     .with_context_configuration(&service_config.context)?
//!     .register_environment("environment")?
//!     .register_configuration_property_source("service", &service_config)?
//!     .register_health_checks()?
//!     .register_resources()?
//!     .register_managed()?;
//! ```

use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info};

use crate::config::ContextConfiguration;
use crate::container::{
    resolve_context, ApplicationContext, Capability, Component, ContextFactory, DiscoveryMarker,
    GenericApplicationContext, PropertySource,
};
use crate::environment::RuntimeEnvironment;
use crate::errors::CoreError;
use crate::foundation::ManagedObject;

/// Name of the filter component installed by `register_security_filter`
pub const SECURITY_FILTER_CHAIN: &str = "securityFilterChain";

/// Where the configurer's context is in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContextState {
    /// No context bound yet
    Unbound,
    /// Bound; named values and property sources may still be registered
    Building,
    /// Refreshed; the component graph is fixed
    Active,
}

/// Binds an application context to a runtime environment.
///
/// Mutating calls return `Result<&mut Self, CoreError>` so they chain with `?`.
/// A configurer that is never bound explicitly creates a
/// [`GenericApplicationContext`] on first use.
pub struct ServiceConfigurer<E: RuntimeEnvironment> {
    environment: Arc<E>,
    context: Option<Arc<dyn ApplicationContext>>,
}

impl<E: RuntimeEnvironment> ServiceConfigurer<E> {
    /// Create a configurer registering into `environment`
    pub fn for_environment(environment: Arc<E>) -> Self {
        Self {
            environment,
            context: None,
        }
    }

    /// The environment sweeps register into
    pub fn environment(&self) -> &Arc<E> {
        &self.environment
    }

    /// Lifecycle state of the bound context, derived from its activeness
    pub fn state(&self) -> ContextState {
        match &self.context {
            None => ContextState::Unbound,
            Some(context) if context.is_active() => ContextState::Active,
            Some(_) => ContextState::Building,
        }
    }

    /// The bound context, as-is; never refreshes it
    pub fn application_context(&self) -> Option<Arc<dyn ApplicationContext>> {
        self.context.clone()
    }

    /// Bind a freshly instantiated context of type `C`
    pub fn with_context_type<C: ContextFactory>(&mut self) -> Result<&mut Self, CoreError> {
        self.ensure_unbound()?;
        self.bind(Arc::new(C::instantiate()))
    }

    /// Bind a freshly instantiated context of type `C` reading `locations`
    pub fn with_context_type_at<C, S>(&mut self, locations: &[S]) -> Result<&mut Self, CoreError>
    where
        C: ContextFactory,
        S: AsRef<str>,
    {
        self.ensure_unbound()?;
        let context = C::instantiate();
        let locations: Vec<String> = locations.iter().map(|l| l.as_ref().to_string()).collect();
        context.set_config_locations(&locations)?;
        self.bind(Arc::new(context))
    }

    /// Bind a context the caller built
    pub fn with_context(
        &mut self,
        context: Arc<dyn ApplicationContext>,
    ) -> Result<&mut Self, CoreError> {
        self.ensure_unbound()?;
        self.bind(context)
    }

    /// Instantiate and seed the context a configuration declares.
    ///
    /// The implementation name is resolved first; an unregistered name fails
    /// with `CoreError::Instantiation` and nothing else is applied. Locations
    /// and profiles reach the context exactly as written.
    pub fn with_context_configuration(
        &mut self,
        configuration: &ContextConfiguration,
    ) -> Result<&mut Self, CoreError> {
        self.ensure_unbound()?;
        let context = resolve_context(&configuration.context_class)?;

        if !configuration.config_locations.is_empty() {
            context.set_config_locations(&configuration.config_locations)?;
        }
        if !configuration.profiles.is_empty() {
            context.set_active_profiles(&configuration.profiles)?;
        }
        for source in &configuration.property_sources {
            context.property_sources().add_last(source.clone())?;
        }

        self.bind(context)
    }

    /// Expose the runtime environment itself to the context under `name`
    pub fn register_environment(&mut self, name: &str) -> Result<&mut Self, CoreError> {
        let component = Component::from_arc(Arc::clone(&self.environment)).build();
        self.register_named_value(name, component)
    }

    /// Expose an arbitrary value to the context under `name`
    pub fn register_named_value(
        &mut self,
        name: &str,
        value: Component,
    ) -> Result<&mut Self, CoreError> {
        let context = self.building_context("register a named value")?;
        context.register_singleton(name, value)?;
        debug!(name, "Registered named value");
        Ok(self)
    }

    /// Flatten `configuration` into a property source ahead of every other source
    pub fn register_configuration_property_source<C>(
        &mut self,
        name: &str,
        configuration: &C,
    ) -> Result<&mut Self, CoreError>
    where
        C: Serialize + ?Sized,
    {
        let context = self.building_context("register a property source")?;
        let source = PropertySource::from_serializable(name, configuration)?;
        context.property_sources().add_first(source)?;
        debug!(name, "Registered configuration property source");
        Ok(self)
    }

    /// Expose a configuration object under `name` through a parent context,
    /// so it is resolvable while the bound context refreshes.
    ///
    /// Fails with `RegistrationConflict` if the context already has a parent.
    pub fn register_configuration_bean<C>(
        &mut self,
        name: &str,
        configuration: Arc<C>,
    ) -> Result<&mut Self, CoreError>
    where
        C: Send + Sync + 'static,
    {
        let context = self.building_context("register a configuration object")?;
        if context.parent().is_some() {
            return Err(CoreError::registration_conflict(
                name,
                "the application context already has a parent; configuration objects \
                 can only be registered into contexts created through the configurer",
            ));
        }

        let parent = GenericApplicationContext::new();
        parent.register_singleton(name, Component::from_arc(configuration).build())?;
        parent.refresh()?;
        context.set_parent(Arc::new(parent))?;
        debug!(name, "Registered configuration object");
        Ok(self)
    }

    /// Refresh the context unless it is already active
    pub fn activate(&mut self) -> Result<&mut Self, CoreError> {
        let context = self.bound_context();
        if !context.is_active() {
            context.refresh()?;
        }
        Ok(self)
    }

    /// Add every health-check component to the environment
    pub fn register_health_checks(&mut self) -> Result<&mut Self, CoreError> {
        let context = self.bound_context();
        if !context.is_active() {
            context.refresh()?;
        }

        for (name, component) in context.components_with(DiscoveryMarker::HealthCheck)? {
            let health_check = component.health_check().ok_or_else(|| {
                CoreError::not_of_required_type(&name, Capability::HealthCheck.to_string())
            })?;
            debug!(component = %name, "Adding health check");
            self.environment.add_health_check(health_check);
        }
        Ok(self)
    }

    /// Add every component annotated as an HTTP resource
    pub fn register_resources(&mut self) -> Result<&mut Self, CoreError> {
        let context = self.bound_context();
        if !context.is_active() {
            context.refresh()?;
        }

        for (name, component) in context.components_with(DiscoveryMarker::Resource)? {
            debug!(component = %name, "Adding resource");
            self.environment.add_resource(component.instance());
        }
        Ok(self)
    }

    /// Add every component annotated as a provider
    pub fn register_providers(&mut self) -> Result<&mut Self, CoreError> {
        let context = self.bound_context();
        if !context.is_active() {
            context.refresh()?;
        }

        for (name, component) in context.components_with(DiscoveryMarker::Provider)? {
            debug!(component = %name, "Adding provider");
            self.environment.add_provider(component.instance());
        }
        Ok(self)
    }

    /// Add every injectable-provider component as a provider
    pub fn register_injectable_providers(&mut self) -> Result<&mut Self, CoreError> {
        let context = self.bound_context();
        if !context.is_active() {
            context.refresh()?;
        }

        for (name, component) in context.components_with(DiscoveryMarker::InjectableProvider)? {
            let provider = component.injectable_provider().ok_or_else(|| {
                CoreError::not_of_required_type(&name, Capability::InjectableProvider.to_string())
            })?;
            debug!(
                component = %name,
                provides = provider.provided_type(),
                "Adding injectable provider"
            );
            self.environment.add_provider(component.instance());
        }
        Ok(self)
    }

    /// Add every task component
    pub fn register_tasks(&mut self) -> Result<&mut Self, CoreError> {
        let context = self.bound_context();
        if !context.is_active() {
            context.refresh()?;
        }

        for (name, component) in context.components_with(DiscoveryMarker::Task)? {
            let task = component.task().ok_or_else(|| {
                CoreError::not_of_required_type(&name, Capability::Task.to_string())
            })?;
            debug!(component = %name, "Adding task");
            self.environment.add_task(task);
        }
        Ok(self)
    }

    /// Hand every managed component to the environment's lifecycle
    pub fn register_managed(&mut self) -> Result<&mut Self, CoreError> {
        let context = self.bound_context();
        if !context.is_active() {
            context.refresh()?;
        }

        for (name, component) in context.components_with(DiscoveryMarker::Managed)? {
            let managed = component.managed().ok_or_else(|| {
                CoreError::not_of_required_type(&name, Capability::Managed.to_string())
            })?;
            debug!(component = %name, "Managing component");
            self.environment.manage(ManagedObject::Managed(managed));
        }
        Ok(self)
    }

    /// Hand every life-cycle component to the environment's lifecycle
    pub fn register_life_cycles(&mut self) -> Result<&mut Self, CoreError> {
        let context = self.bound_context();
        if !context.is_active() {
            context.refresh()?;
        }

        for (name, component) in context.components_with(DiscoveryMarker::LifeCycle)? {
            let life_cycle = component.life_cycle().ok_or_else(|| {
                CoreError::not_of_required_type(&name, Capability::LifeCycle.to_string())
            })?;
            debug!(component = %name, "Managing life cycle");
            self.environment.manage(ManagedObject::LifeCycle(life_cycle));
        }
        Ok(self)
    }

    /// Run every sweep
    pub fn register_all(&mut self) -> Result<&mut Self, CoreError> {
        self.register_health_checks()?
            .register_resources()?
            .register_providers()?
            .register_injectable_providers()?
            .register_tasks()?
            .register_managed()?
            .register_life_cycles()
    }

    /// Install the `securityFilterChain` component at `url_pattern`
    pub fn register_security_filter(
        &mut self,
        url_pattern: &str,
    ) -> Result<&mut Self, CoreError> {
        self.register_filter(SECURITY_FILTER_CHAIN, url_pattern)
    }

    /// Install the filter component named `name` at `url_pattern`.
    ///
    /// A missing component fails with the context's `ComponentNotFound`.
    pub fn register_filter(
        &mut self,
        name: &str,
        url_pattern: &str,
    ) -> Result<&mut Self, CoreError> {
        let context = self.bound_context();
        if !context.is_active() {
            context.refresh()?;
        }

        let filter = context
            .get_component_with(name, Capability::Filter)?
            .filter()
            .ok_or_else(|| CoreError::not_of_required_type(name, Capability::Filter.to_string()))?;
        debug!(component = name, url_pattern, "Adding filter");
        self.environment.add_filter(filter, url_pattern);
        Ok(self)
    }

    fn ensure_unbound(&self) -> Result<(), CoreError> {
        match &self.context {
            Some(context) => Err(CoreError::invalid_state(format!(
                "application context '{}' is already bound to this configurer",
                context.display_name()
            ))),
            None => Ok(()),
        }
    }

    fn bind(&mut self, context: Arc<dyn ApplicationContext>) -> Result<&mut Self, CoreError> {
        info!(
            context = context.display_name(),
            id = context.id(),
            "Bound application context"
        );
        self.context = Some(context);
        Ok(self)
    }

    /// The bound context, creating the default one if none is bound
    fn bound_context(&mut self) -> Arc<dyn ApplicationContext> {
        match &self.context {
            Some(context) => Arc::clone(context),
            None => {
                let context: Arc<dyn ApplicationContext> =
                    Arc::new(GenericApplicationContext::new());
                info!(
                    context = context.display_name(),
                    "No application context bound; created the default"
                );
                self.context = Some(Arc::clone(&context));
                context
            }
        }
    }

    fn building_context(
        &mut self,
        action: &str,
    ) -> Result<Arc<dyn ApplicationContext>, CoreError> {
        let context = self.bound_context();
        if context.is_active() {
            return Err(CoreError::invalid_state(format!(
                "cannot {} after application context '{}' has been refreshed",
                action,
                context.display_name()
            )));
        }
        Ok(context)
    }
}

impl<E: RuntimeEnvironment> std::fmt::Debug for ServiceConfigurer<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceConfigurer")
            .field("state", &self.state())
            .field("context", &self.context)
            .finish()
    }
}
