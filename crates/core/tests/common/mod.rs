//! Shared fixtures for the integration tests: a scriptable application
//! context and one component type per capability.

#![allow(dead_code)]

use std::any::Any;
use std::collections::HashMap;
use std::io::Write;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use bedrock_core::{
    ApplicationContext, Component, CoreError, DiscoveryMarker, Filter, FilterDecision,
    FilterRequest, HealthCheck, HealthCheckResult, InjectableProvider, LifeCycle, Managed,
    PropertySources, Task,
};
use chrono::{DateTime, Utc};

/// Context double that records refreshes and answers queries from a fixed map
pub struct MockContext {
    active: AtomicBool,
    refresh_calls: AtomicUsize,
    parent: Mutex<Option<Arc<dyn ApplicationContext>>>,
    components: Mutex<HashMap<String, Component>>,
    singletons: Mutex<HashMap<String, Component>>,
    property_sources: PropertySources,
    ignore_markers: bool,
}

impl MockContext {
    pub fn new() -> Self {
        Self {
            active: AtomicBool::new(false),
            refresh_calls: AtomicUsize::new(0),
            parent: Mutex::new(None),
            components: Mutex::new(HashMap::new()),
            singletons: Mutex::new(HashMap::new()),
            property_sources: PropertySources::new(),
            ignore_markers: false,
        }
    }

    /// A context that already reports itself active
    pub fn active() -> Self {
        let context = Self::new();
        context.active.store(true, Ordering::SeqCst);
        context
    }

    /// A context that returns every component for every marker
    pub fn ignoring_markers() -> Self {
        Self {
            ignore_markers: true,
            ..Self::new()
        }
    }

    pub fn with_component(self, name: &str, component: Component) -> Self {
        self.components
            .lock()
            .unwrap()
            .insert(name.to_string(), component);
        self
    }

    pub fn with_parent(self, parent: Arc<dyn ApplicationContext>) -> Self {
        *self.parent.lock().unwrap() = Some(parent);
        self
    }

    pub fn refresh_count(&self) -> usize {
        self.refresh_calls.load(Ordering::SeqCst)
    }

    pub fn singleton(&self, name: &str) -> Option<Component> {
        self.singletons.lock().unwrap().get(name).cloned()
    }
}

impl ApplicationContext for MockContext {
    fn id(&self) -> &str {
        "mock"
    }

    fn display_name(&self) -> &str {
        "mock-context"
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }

    fn started_at(&self) -> Option<DateTime<Utc>> {
        None
    }

    fn parent(&self) -> Option<Arc<dyn ApplicationContext>> {
        self.parent.lock().unwrap().clone()
    }

    fn set_parent(&self, parent: Arc<dyn ApplicationContext>) -> Result<(), CoreError> {
        *self.parent.lock().unwrap() = Some(parent);
        Ok(())
    }

    fn set_config_locations(&self, _locations: &[String]) -> Result<(), CoreError> {
        Ok(())
    }

    fn config_locations(&self) -> Vec<String> {
        Vec::new()
    }

    fn set_active_profiles(&self, _profiles: &[String]) -> Result<(), CoreError> {
        Ok(())
    }

    fn active_profiles(&self) -> Vec<String> {
        Vec::new()
    }

    fn property_sources(&self) -> &PropertySources {
        &self.property_sources
    }

    fn register_singleton(&self, name: &str, component: Component) -> Result<(), CoreError> {
        self.singletons
            .lock()
            .unwrap()
            .insert(name.to_string(), component);
        Ok(())
    }

    fn refresh(&self) -> Result<(), CoreError> {
        self.refresh_calls.fetch_add(1, Ordering::SeqCst);
        self.active.store(true, Ordering::SeqCst);
        Ok(())
    }

    fn components_with(
        &self,
        marker: DiscoveryMarker,
    ) -> Result<HashMap<String, Component>, CoreError> {
        Ok(self
            .components
            .lock()
            .unwrap()
            .iter()
            .filter(|(_, component)| self.ignore_markers || component.matches(marker))
            .map(|(name, component)| (name.clone(), component.clone()))
            .collect())
    }

    fn get_component(&self, name: &str) -> Result<Component, CoreError> {
        self.components
            .lock()
            .unwrap()
            .get(name)
            .cloned()
            .ok_or_else(|| CoreError::component_not_found(name))
    }

    fn contains_component(&self, name: &str) -> bool {
        self.components.lock().unwrap().contains_key(name)
    }
}

/// Check whether two handles point at the same allocation
pub fn same_object<A: ?Sized, B: ?Sized>(a: &Arc<A>, b: &Arc<B>) -> bool {
    std::ptr::eq(Arc::as_ptr(a) as *const (), Arc::as_ptr(b) as *const ())
}

pub struct DatabaseCheck;

impl HealthCheck for DatabaseCheck {
    fn name(&self) -> &str {
        "database"
    }

    fn check(&self) -> HealthCheckResult {
        HealthCheckResult::healthy()
    }
}

pub struct UserResource;

pub struct JsonProvider;

pub struct SessionProvider;

impl InjectableProvider for SessionProvider {
    fn provided_type(&self) -> &str {
        "Session"
    }
}

pub struct GarbageCollectionTask;

impl Task for GarbageCollectionTask {
    fn name(&self) -> &str {
        "gc"
    }

    fn execute(
        &self,
        _parameters: &HashMap<String, Vec<String>>,
        output: &mut dyn Write,
    ) -> Result<(), CoreError> {
        writeln!(output, "Running GC...")
            .map_err(|error| CoreError::lifecycle("gc", "execute", error.to_string()))
    }
}

#[derive(Default)]
pub struct ConnectionPool {
    pub started: AtomicBool,
}

impl Managed for ConnectionPool {
    fn start(&self) -> Result<(), CoreError> {
        self.started.store(true, Ordering::SeqCst);
        Ok(())
    }

    fn stop(&self) -> Result<(), CoreError> {
        self.started.store(false, Ordering::SeqCst);
        Ok(())
    }
}

#[derive(Default)]
pub struct Connector {
    pub running: AtomicBool,
}

impl LifeCycle for Connector {
    fn start(&self) -> Result<(), CoreError> {
        self.running.store(true, Ordering::SeqCst);
        Ok(())
    }

    fn stop(&self) -> Result<(), CoreError> {
        self.running.store(false, Ordering::SeqCst);
        Ok(())
    }

    fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }
}

pub struct SecurityFilter;

impl Filter for SecurityFilter {
    fn filter(&self, request: &FilterRequest) -> FilterDecision {
        if request.path.starts_with("/admin") {
            FilterDecision::Reject {
                status: 401,
                reason: "authentication required".to_string(),
            }
        } else {
            FilterDecision::Continue
        }
    }
}
