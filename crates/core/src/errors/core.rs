use crate::config::ConfigError;
use thiserror::Error;

/// Core error type for the bedrock bridge
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("Invalid state: {message}")]
    InvalidState { message: String },

    #[error("Cannot instantiate application context '{context_class}': {message}")]
    Instantiation {
        context_class: String,
        message: String,
    },

    #[error("Registration conflict for '{name}': {message}")]
    RegistrationConflict { name: String, message: String },

    #[error("No component named '{name}' is defined")]
    ComponentNotFound { name: String },

    #[error("Component '{name}' is not of required type: {required}")]
    ComponentNotOfRequiredType { name: String, required: String },

    #[error("No component module registered at location '{location}'")]
    ModuleNotFound { location: String },

    #[error("Creation of component '{name}' failed: {source}")]
    ComponentCreation {
        name: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("Could not resolve placeholder '{placeholder}'")]
    UnresolvablePlaceholder { placeholder: String },

    #[error("Lifecycle error in component '{component}' during '{operation}': {message}")]
    Lifecycle {
        component: String,
        operation: String,
        message: String,
    },

    #[error("Lock error on resource: {resource}")]
    Lock { resource: String },

    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl CoreError {
    /// Create a new invalid state error
    pub fn invalid_state(message: impl Into<String>) -> Self {
        Self::InvalidState {
            message: message.into(),
        }
    }

    /// Create a new instantiation error
    pub fn instantiation(context_class: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Instantiation {
            context_class: context_class.into(),
            message: message.into(),
        }
    }

    /// Create a new registration conflict error
    pub fn registration_conflict(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::RegistrationConflict {
            name: name.into(),
            message: message.into(),
        }
    }

    /// Create a new component not found error
    pub fn component_not_found(name: impl Into<String>) -> Self {
        Self::ComponentNotFound { name: name.into() }
    }

    /// Create a new type mismatch error
    pub fn not_of_required_type(name: impl Into<String>, required: impl Into<String>) -> Self {
        Self::ComponentNotOfRequiredType {
            name: name.into(),
            required: required.into(),
        }
    }

    /// Wrap a failure raised while a component factory ran
    pub fn component_creation(
        name: impl Into<String>,
        source: Box<dyn std::error::Error + Send + Sync>,
    ) -> Self {
        Self::ComponentCreation {
            name: name.into(),
            source,
        }
    }

    /// Create a new lifecycle error
    pub fn lifecycle(
        component: impl Into<String>,
        operation: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::Lifecycle {
            component: component.into(),
            operation: operation.into(),
            message: message.into(),
        }
    }

    /// Create a new lock error
    pub fn lock(resource: impl Into<String>) -> Self {
        Self::Lock {
            resource: resource.into(),
        }
    }

    /// Check if the error reports a call made in the wrong context state
    pub fn is_invalid_state(&self) -> bool {
        matches!(self, Self::InvalidState { .. })
    }

    /// Check if the error is an instantiation error
    pub fn is_instantiation(&self) -> bool {
        matches!(self, Self::Instantiation { .. })
    }

    /// Check if the error is a registration conflict
    pub fn is_registration_conflict(&self) -> bool {
        matches!(self, Self::RegistrationConflict { .. })
    }

    /// Check if the error is a failed named lookup
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::ComponentNotFound { .. })
    }
}
