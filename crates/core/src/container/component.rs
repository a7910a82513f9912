use std::any::Any;
use std::fmt;
use std::sync::Arc;

use crate::foundation::traits::{Filter, HealthCheck, InjectableProvider, LifeCycle, Managed, Task};

/// Declarative markers a component can carry besides its capabilities
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Annotation {
    /// The component is an HTTP resource
    Path,
    /// The component is a provider for the HTTP layer
    Provider,
}

/// Trait-backed capabilities a component can be declared with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    HealthCheck,
    Task,
    Managed,
    LifeCycle,
    InjectableProvider,
    Filter,
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Capability::HealthCheck => "HealthCheck",
            Capability::Task => "Task",
            Capability::Managed => "Managed",
            Capability::LifeCycle => "LifeCycle",
            Capability::InjectableProvider => "InjectableProvider",
            Capability::Filter => "Filter",
        };
        f.write_str(name)
    }
}

/// What a discovery sweep looks for in the application context
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiscoveryMarker {
    HealthCheck,
    Resource,
    Provider,
    InjectableProvider,
    Task,
    Managed,
    LifeCycle,
}

impl DiscoveryMarker {
    pub const ALL: [DiscoveryMarker; 7] = [
        DiscoveryMarker::HealthCheck,
        DiscoveryMarker::Resource,
        DiscoveryMarker::Provider,
        DiscoveryMarker::InjectableProvider,
        DiscoveryMarker::Task,
        DiscoveryMarker::Managed,
        DiscoveryMarker::LifeCycle,
    ];
}

impl fmt::Display for DiscoveryMarker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DiscoveryMarker::HealthCheck => "health check",
            DiscoveryMarker::Resource => "resource",
            DiscoveryMarker::Provider => "provider",
            DiscoveryMarker::InjectableProvider => "injectable provider",
            DiscoveryMarker::Task => "task",
            DiscoveryMarker::Managed => "managed",
            DiscoveryMarker::LifeCycle => "life cycle",
        };
        f.write_str(name)
    }
}

/// A context-managed instance together with the capabilities it was declared with
#[derive(Clone)]
pub struct Component {
    type_name: &'static str,
    instance: Arc<dyn Any + Send + Sync>,
    annotations: Vec<Annotation>,
    health_check: Option<Arc<dyn HealthCheck>>,
    task: Option<Arc<dyn Task>>,
    managed: Option<Arc<dyn Managed>>,
    life_cycle: Option<Arc<dyn LifeCycle>>,
    injectable_provider: Option<Arc<dyn InjectableProvider>>,
    filter: Option<Arc<dyn Filter>>,
}

impl Component {
    /// Wrap a plain value with no capabilities
    pub fn of<T: Send + Sync + 'static>(instance: T) -> Self {
        Self::builder(instance).build()
    }

    /// Start declaring a component that takes ownership of `instance`
    pub fn builder<T: Send + Sync + 'static>(instance: T) -> ComponentBuilder<T> {
        Self::from_arc(Arc::new(instance))
    }

    /// Start declaring a component around an instance shared with the caller
    pub fn from_arc<T: Send + Sync + 'static>(instance: Arc<T>) -> ComponentBuilder<T> {
        let component = Component {
            type_name: std::any::type_name::<T>(),
            instance: instance.clone(),
            annotations: Vec::new(),
            health_check: None,
            task: None,
            managed: None,
            life_cycle: None,
            injectable_provider: None,
            filter: None,
        };
        ComponentBuilder {
            instance,
            component,
        }
    }

    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// The raw instance, as handed to annotation-driven registrations
    pub fn instance(&self) -> Arc<dyn Any + Send + Sync> {
        Arc::clone(&self.instance)
    }

    /// Recover the concrete instance
    pub fn downcast<T: Send + Sync + 'static>(&self) -> Option<Arc<T>> {
        Arc::clone(&self.instance).downcast::<T>().ok()
    }

    /// Check whether two components wrap the very same instance
    pub fn is_same_instance(&self, other: &Component) -> bool {
        std::ptr::eq(
            Arc::as_ptr(&self.instance) as *const (),
            Arc::as_ptr(&other.instance) as *const (),
        )
    }

    pub fn annotations(&self) -> &[Annotation] {
        &self.annotations
    }

    pub fn is_annotated(&self, annotation: Annotation) -> bool {
        self.annotations.contains(&annotation)
    }

    pub fn health_check(&self) -> Option<Arc<dyn HealthCheck>> {
        self.health_check.clone()
    }

    pub fn task(&self) -> Option<Arc<dyn Task>> {
        self.task.clone()
    }

    pub fn managed(&self) -> Option<Arc<dyn Managed>> {
        self.managed.clone()
    }

    pub fn life_cycle(&self) -> Option<Arc<dyn LifeCycle>> {
        self.life_cycle.clone()
    }

    pub fn injectable_provider(&self) -> Option<Arc<dyn InjectableProvider>> {
        self.injectable_provider.clone()
    }

    pub fn filter(&self) -> Option<Arc<dyn Filter>> {
        self.filter.clone()
    }

    /// Check whether the component was declared with a capability
    pub fn has(&self, capability: Capability) -> bool {
        match capability {
            Capability::HealthCheck => self.health_check.is_some(),
            Capability::Task => self.task.is_some(),
            Capability::Managed => self.managed.is_some(),
            Capability::LifeCycle => self.life_cycle.is_some(),
            Capability::InjectableProvider => self.injectable_provider.is_some(),
            Capability::Filter => self.filter.is_some(),
        }
    }

    /// Check whether a discovery sweep for `marker` should pick this component up
    pub fn matches(&self, marker: DiscoveryMarker) -> bool {
        match marker {
            DiscoveryMarker::HealthCheck => self.has(Capability::HealthCheck),
            DiscoveryMarker::Resource => self.is_annotated(Annotation::Path),
            DiscoveryMarker::Provider => self.is_annotated(Annotation::Provider),
            DiscoveryMarker::InjectableProvider => self.has(Capability::InjectableProvider),
            DiscoveryMarker::Task => self.has(Capability::Task),
            DiscoveryMarker::Managed => self.has(Capability::Managed),
            DiscoveryMarker::LifeCycle => self.has(Capability::LifeCycle),
        }
    }

    fn capabilities(&self) -> Vec<Capability> {
        [
            Capability::HealthCheck,
            Capability::Task,
            Capability::Managed,
            Capability::LifeCycle,
            Capability::InjectableProvider,
            Capability::Filter,
        ]
        .into_iter()
        .filter(|capability| self.has(*capability))
        .collect()
    }
}

impl fmt::Debug for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Component")
            .field("type_name", &self.type_name)
            .field("annotations", &self.annotations)
            .field("capabilities", &self.capabilities())
            .finish()
    }
}

/// Typed builder; capability methods only exist when `T` implements the trait
pub struct ComponentBuilder<T> {
    instance: Arc<T>,
    component: Component,
}

impl<T: Send + Sync + 'static> ComponentBuilder<T> {
    pub fn health_check(mut self) -> Self
    where
        T: HealthCheck,
    {
        self.component.health_check = Some(self.instance.clone() as Arc<dyn HealthCheck>);
        self
    }

    pub fn task(mut self) -> Self
    where
        T: Task,
    {
        self.component.task = Some(self.instance.clone() as Arc<dyn Task>);
        self
    }

    pub fn managed(mut self) -> Self
    where
        T: Managed,
    {
        self.component.managed = Some(self.instance.clone() as Arc<dyn Managed>);
        self
    }

    pub fn life_cycle(mut self) -> Self
    where
        T: LifeCycle,
    {
        self.component.life_cycle = Some(self.instance.clone() as Arc<dyn LifeCycle>);
        self
    }

    pub fn injectable_provider(mut self) -> Self
    where
        T: InjectableProvider,
    {
        self.component.injectable_provider =
            Some(self.instance.clone() as Arc<dyn InjectableProvider>);
        self
    }

    pub fn filter(mut self) -> Self
    where
        T: Filter,
    {
        self.component.filter = Some(self.instance.clone() as Arc<dyn Filter>);
        self
    }

    pub fn annotated(mut self, annotation: Annotation) -> Self {
        if !self.component.annotations.contains(&annotation) {
            self.component.annotations.push(annotation);
        }
        self
    }

    pub fn build(self) -> Component {
        self.component
    }
}

impl<T: Send + Sync + 'static> From<ComponentBuilder<T>> for Component {
    fn from(builder: ComponentBuilder<T>) -> Self {
        builder.build()
    }
}
