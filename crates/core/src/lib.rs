pub mod bootstrap;
pub mod config;
pub mod container;
pub mod environment;
pub mod errors;
pub mod foundation;

// Re-export key types for convenience
pub use bootstrap::{ContextState, ServiceConfigurer, SECURITY_FILTER_CHAIN};
pub use config::{AppConfigTrait, ConfigError, ConfigSource, ContextConfiguration};
pub use container::{
    Annotation, ApplicationContext, Capability, Component, ComponentModuleEntry,
    ComponentResolver, ContextFactory, DefinitionRegistry, DiscoveryMarker,
    GenericApplicationContext, ModuleApplicationContext, PropertySource, PropertySources,
};
pub use environment::{RuntimeEnvironment, ServiceEnvironment};
pub use errors::CoreError;
pub use foundation::{
    Filter, FilterDecision, FilterRequest, HealthCheck, HealthCheckResult, InjectableProvider,
    LifeCycle, Managed, ManagedObject, Task,
};

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Get library version
pub fn version() -> &'static str {
    VERSION
}
