use std::sync::Arc;

use crate::container::context::{ApplicationContext, ContextEntry, ContextFactory, APPLICATION_CONTEXTS};
use crate::container::state::{delegate_to_core, ContextCore, LocationPolicy};
use crate::errors::CoreError;

/// Context built entirely from component modules.
///
/// Every configuration location must name a registered module exactly;
/// refresh fails with `ModuleNotFound` otherwise.
#[derive(Debug)]
pub struct ModuleApplicationContext {
    core: ContextCore,
}

impl ModuleApplicationContext {
    pub fn new() -> Self {
        Self {
            core: ContextCore::new(Self::NAME),
        }
    }

    /// Create a context loading the given module locations
    pub fn with_locations<S: AsRef<str>>(locations: &[S]) -> Result<Self, CoreError> {
        let context = Self::new();
        let locations: Vec<String> = locations.iter().map(|l| l.as_ref().to_string()).collect();
        context.set_config_locations(&locations)?;
        Ok(context)
    }
}

impl Default for ModuleApplicationContext {
    fn default() -> Self {
        Self::new()
    }
}

impl ContextFactory for ModuleApplicationContext {
    const NAME: &'static str = "module";

    fn instantiate() -> Self {
        Self::new()
    }
}

delegate_to_core!(ModuleApplicationContext, LocationPolicy::Exact);

fn new_module_context() -> Arc<dyn ApplicationContext> {
    Arc::new(ModuleApplicationContext::new())
}

#[linkme::distributed_slice(APPLICATION_CONTEXTS)]
static MODULE_CONTEXT: ContextEntry = ContextEntry {
    name: ModuleApplicationContext::NAME,
    description: "Definitions loaded from exactly named component modules",
    factory: new_module_context,
};
