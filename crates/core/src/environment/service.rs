use std::any::Any;
use std::collections::{BTreeMap, HashMap};
use std::io::Write;
use std::sync::{Arc, PoisonError, RwLock};

use tracing::{debug, info, warn};

use crate::environment::RuntimeEnvironment;
use crate::errors::CoreError;
use crate::foundation::{
    Filter, FilterDecision, FilterRequest, HealthCheck, HealthCheckResult, ManagedObject, Task,
};

/// A filter installed for a URL pattern
#[derive(Clone)]
pub struct FilterMapping {
    pub filter: Arc<dyn Filter>,
    pub url_pattern: String,
}

impl FilterMapping {
    /// `/*`-suffixed patterns match by prefix, anything else exactly
    pub fn matches(&self, path: &str) -> bool {
        match self.url_pattern.strip_suffix("/*") {
            Some(prefix) => path == prefix || path.starts_with(&format!("{}/", prefix)),
            None => path == self.url_pattern,
        }
    }
}

impl std::fmt::Debug for FilterMapping {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FilterMapping")
            .field("url_pattern", &self.url_pattern)
            .finish()
    }
}

/// In-process runtime environment that keeps every registration.
///
/// Health checks run on demand and managed objects are started in
/// registration order and stopped in reverse.
pub struct ServiceEnvironment {
    name: String,
    health_checks: RwLock<Vec<Arc<dyn HealthCheck>>>,
    resources: RwLock<Vec<Arc<dyn Any + Send + Sync>>>,
    providers: RwLock<Vec<Arc<dyn Any + Send + Sync>>>,
    tasks: RwLock<BTreeMap<String, Arc<dyn Task>>>,
    managed: RwLock<Vec<ManagedObject>>,
    filters: RwLock<Vec<FilterMapping>>,
}

impl ServiceEnvironment {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            health_checks: RwLock::new(Vec::new()),
            resources: RwLock::new(Vec::new()),
            providers: RwLock::new(Vec::new()),
            tasks: RwLock::new(BTreeMap::new()),
            managed: RwLock::new(Vec::new()),
            filters: RwLock::new(Vec::new()),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn health_checks(&self) -> Vec<Arc<dyn HealthCheck>> {
        read(&self.health_checks).clone()
    }

    pub fn resources(&self) -> Vec<Arc<dyn Any + Send + Sync>> {
        read(&self.resources).clone()
    }

    pub fn providers(&self) -> Vec<Arc<dyn Any + Send + Sync>> {
        read(&self.providers).clone()
    }

    /// Registered task names, sorted
    pub fn task_names(&self) -> Vec<String> {
        read(&self.tasks).keys().cloned().collect()
    }

    pub fn task(&self, name: &str) -> Option<Arc<dyn Task>> {
        read(&self.tasks).get(name).cloned()
    }

    pub fn managed_objects(&self) -> Vec<ManagedObject> {
        read(&self.managed).clone()
    }

    pub fn filters(&self) -> Vec<FilterMapping> {
        read(&self.filters).clone()
    }

    /// Run every registered health check, keyed by check name
    pub fn run_health_checks(&self) -> BTreeMap<String, HealthCheckResult> {
        self.health_checks()
            .iter()
            .map(|check| (check.name().to_string(), check.check()))
            .collect()
    }

    /// Start managed objects in registration order, stopping at the first failure
    pub fn start_managed(&self) -> Result<(), CoreError> {
        for object in self.managed_objects() {
            object.start()?;
        }
        info!(environment = %self.name, "Started managed objects");
        Ok(())
    }

    /// Stop managed objects in reverse order; every object is attempted and
    /// the first failure is returned
    pub fn stop_managed(&self) -> Result<(), CoreError> {
        let mut first_error = None;
        for object in self.managed_objects().iter().rev() {
            if let Err(error) = object.stop() {
                warn!(environment = %self.name, error = %error, "Failed to stop managed object");
                first_error.get_or_insert(error);
            }
        }
        match first_error {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }

    /// Run a registered task by name
    pub fn execute_task(
        &self,
        name: &str,
        parameters: &HashMap<String, Vec<String>>,
        output: &mut dyn Write,
    ) -> Result<(), CoreError> {
        let task = self
            .task(name)
            .ok_or_else(|| CoreError::component_not_found(name))?;
        task.execute(parameters, output)
    }

    /// Pass a request through every filter whose pattern matches, in order
    pub fn apply_filters(&self, request: &FilterRequest) -> FilterDecision {
        for mapping in self.filters() {
            if !mapping.matches(&request.path) {
                continue;
            }
            let decision = mapping.filter.filter(request);
            if decision != FilterDecision::Continue {
                return decision;
            }
        }
        FilterDecision::Continue
    }
}

impl Default for ServiceEnvironment {
    fn default() -> Self {
        Self::new("service")
    }
}

impl std::fmt::Debug for ServiceEnvironment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceEnvironment")
            .field("name", &self.name)
            .field("health_checks", &read(&self.health_checks).len())
            .field("resources", &read(&self.resources).len())
            .field("providers", &read(&self.providers).len())
            .field("tasks", &self.task_names())
            .field("managed", &read(&self.managed).len())
            .field("filters", &read(&self.filters))
            .finish()
    }
}

impl RuntimeEnvironment for ServiceEnvironment {
    fn add_health_check(&self, health_check: Arc<dyn HealthCheck>) {
        debug!(environment = %self.name, check = health_check.name(), "Added health check");
        write(&self.health_checks).push(health_check);
    }

    fn add_resource(&self, resource: Arc<dyn Any + Send + Sync>) {
        write(&self.resources).push(resource);
    }

    fn add_provider(&self, provider: Arc<dyn Any + Send + Sync>) {
        write(&self.providers).push(provider);
    }

    fn add_task(&self, task: Arc<dyn Task>) {
        let name = task.name().to_string();
        if write(&self.tasks).insert(name.clone(), task).is_some() {
            warn!(environment = %self.name, task = %name, "Replaced task registered under the same name");
        }
    }

    fn manage(&self, object: ManagedObject) {
        write(&self.managed).push(object);
    }

    fn add_filter(&self, filter: Arc<dyn Filter>, url_pattern: &str) {
        debug!(environment = %self.name, url_pattern, "Added filter");
        write(&self.filters).push(FilterMapping {
            filter,
            url_pattern: url_pattern.to_string(),
        });
    }
}

fn read<T>(lock: &RwLock<T>) -> std::sync::RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(PoisonError::into_inner)
}

fn write<T>(lock: &RwLock<T>) -> std::sync::RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(PoisonError::into_inner)
}
