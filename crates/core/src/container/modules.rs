//! Auto-registration of component modules using linkme distributed slices.
//!
//! A module is the unit a configuration location points at: a named bundle of
//! component definitions, contributed at compile time.
//!
//! ```ignore
//! #[linkme::distributed_slice(COMPONENT_MODULES)]
//! static BILLING: ComponentModuleEntry = ComponentModuleEntry {
//!     location: "billing/core",
//!     description: "Billing services",
//!     profiles: &[],
//!     register: register_billing,
//! };
//! ```

use crate::container::registry::DefinitionRegistry;

/// Registry entry for a component module
pub struct ComponentModuleEntry {
    /// Location string configuration refers to (e.g., "billing/core")
    pub location: &'static str,
    /// Human-readable description
    pub description: &'static str,
    /// Load only when one of these profiles is active; empty means always
    pub profiles: &'static [&'static str],
    /// Adds the module's definitions
    pub register: fn(&mut DefinitionRegistry),
}

impl ComponentModuleEntry {
    /// Check whether the module applies under the given active profiles
    pub fn is_enabled_for(&self, active_profiles: &[String]) -> bool {
        self.profiles.is_empty()
            || self
                .profiles
                .iter()
                .any(|profile| active_profiles.iter().any(|active| active == profile))
    }
}

#[linkme::distributed_slice]
pub static COMPONENT_MODULES: [ComponentModuleEntry] = [..];

/// Find the module registered at exactly `location`
pub fn find_module(location: &str) -> Option<&'static ComponentModuleEntry> {
    COMPONENT_MODULES.iter().find(|entry| entry.location == location)
}

/// All modules whose location starts with `prefix`, in location order
pub fn scan_modules(prefix: &str) -> Vec<&'static ComponentModuleEntry> {
    let mut found: Vec<&'static ComponentModuleEntry> = COMPONENT_MODULES
        .iter()
        .filter(|entry| entry.location.starts_with(prefix))
        .collect();
    found.sort_by_key(|entry| entry.location);
    found
}

/// List all registered modules as (location, description)
pub fn list_modules() -> Vec<(&'static str, &'static str)> {
    COMPONENT_MODULES
        .iter()
        .map(|e| (e.location, e.description))
        .collect()
}
