pub mod component;
pub mod context;
pub mod generic;
pub mod module;
pub mod modules;
pub mod property;
pub mod registry;
mod state;

pub use component::{Annotation, Capability, Component, ComponentBuilder, DiscoveryMarker};
pub use context::{
    list_contexts, resolve_context, ApplicationContext, ContextEntry, ContextFactory,
    APPLICATION_CONTEXTS,
};
pub use generic::GenericApplicationContext;
pub use module::ModuleApplicationContext;
pub use modules::{find_module, list_modules, scan_modules, ComponentModuleEntry, COMPONENT_MODULES};
pub use property::{PropertySource, PropertySources};
pub use registry::{ComponentDefinition, ComponentFactory, ComponentResolver, DefinitionRegistry};
