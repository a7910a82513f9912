//! Bootstrap of a runtime environment from an application context.

pub mod configurer;

pub use configurer::{ContextState, ServiceConfigurer, SECURITY_FILTER_CHAIN};
