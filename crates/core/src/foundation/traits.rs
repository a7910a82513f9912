//! Capability traits recognized by discovery.
//!
//! The bridge never interprets these beyond routing: a component declared
//! with a capability is handed to the runtime registration call for it.

use crate::errors::CoreError;
use std::collections::HashMap;
use std::io::Write;

/// Outcome of a single health check run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthCheckResult {
    Healthy { message: Option<String> },
    Unhealthy { message: String },
}

impl HealthCheckResult {
    pub fn healthy() -> Self {
        Self::Healthy { message: None }
    }

    pub fn healthy_with(message: impl Into<String>) -> Self {
        Self::Healthy {
            message: Some(message.into()),
        }
    }

    pub fn unhealthy(message: impl Into<String>) -> Self {
        Self::Unhealthy {
            message: message.into(),
        }
    }

    pub fn is_healthy(&self) -> bool {
        matches!(self, Self::Healthy { .. })
    }
}

/// A named check reported by the runtime's health-check registry
pub trait HealthCheck: Send + Sync {
    fn name(&self) -> &str;

    fn check(&self) -> HealthCheckResult;
}

/// An object whose start and stop are driven by the runtime
pub trait Managed: Send + Sync {
    fn start(&self) -> Result<(), CoreError>;

    fn stop(&self) -> Result<(), CoreError>;
}

/// A server-level lifecycle participant that also reports whether it runs
pub trait LifeCycle: Send + Sync {
    fn start(&self) -> Result<(), CoreError>;

    fn stop(&self) -> Result<(), CoreError>;

    fn is_running(&self) -> bool;
}

/// An administrative task invoked by name
pub trait Task: Send + Sync {
    fn name(&self) -> &str;

    /// Run the task, writing any report to `output`
    fn execute(
        &self,
        parameters: &HashMap<String, Vec<String>>,
        output: &mut dyn Write,
    ) -> Result<(), CoreError>;
}

/// Supplies injectable values of one type to HTTP resources
pub trait InjectableProvider: Send + Sync {
    /// Name of the type this provider can inject
    fn provided_type(&self) -> &str;
}

/// Request seen by a filter
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterRequest {
    pub method: String,
    pub path: String,
}

impl FilterRequest {
    pub fn new(method: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            path: path.into(),
        }
    }
}

/// Whether a request may continue down the filter chain
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterDecision {
    Continue,
    Reject { status: u16, reason: String },
}

/// A request filter installed into the runtime's filter chain
pub trait Filter: Send + Sync {
    fn filter(&self, request: &FilterRequest) -> FilterDecision;
}
