use std::any::Any;
use std::sync::Arc;

use crate::foundation::{Filter, HealthCheck, ManagedObject, Task};

/// The service runtime's registries, as seen by the configurer.
///
/// Registration is synchronous and infallible from the caller's side;
/// deduplication, if any, is up to the implementation.
pub trait RuntimeEnvironment: Send + Sync + 'static {
    fn add_health_check(&self, health_check: Arc<dyn HealthCheck>);

    /// Register an HTTP resource instance
    fn add_resource(&self, resource: Arc<dyn Any + Send + Sync>);

    /// Register a provider for the HTTP layer
    fn add_provider(&self, provider: Arc<dyn Any + Send + Sync>);

    fn add_task(&self, task: Arc<dyn Task>);

    /// Hand an object to the runtime's lifecycle manager
    fn manage(&self, object: ManagedObject);

    /// Install a filter into the request chain for `url_pattern`
    fn add_filter(&self, filter: Arc<dyn Filter>, url_pattern: &str);
}
