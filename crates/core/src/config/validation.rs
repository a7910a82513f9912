use thiserror::Error;

/// Configuration error type
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required field: {field}. {hint}")]
    MissingRequired { field: String, hint: String },

    #[error("Invalid value for field '{field}': '{value}'. Expected: {expected}")]
    InvalidValue {
        field: String,
        value: String,
        expected: String,
    },

    #[error("Configuration validation failed: {message}")]
    ValidationFailed { message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ConfigError {
    /// Create a missing required field error
    pub fn missing_required(field: impl Into<String>, hint: impl Into<String>) -> Self {
        Self::MissingRequired {
            field: field.into(),
            hint: hint.into(),
        }
    }

    /// Create an invalid value error
    pub fn invalid_value(
        field: impl Into<String>,
        value: impl Into<String>,
        expected: impl Into<String>,
    ) -> Self {
        Self::InvalidValue {
            field: field.into(),
            value: value.into(),
            expected: expected.into(),
        }
    }

    /// Create a validation failed error
    pub fn validation_failed(message: impl Into<String>) -> Self {
        Self::ValidationFailed {
            message: message.into(),
        }
    }
}

/// Trait for validating configuration values
pub trait ConfigValidator<T: ?Sized> {
    /// Validate a configuration value
    fn validate(&self, value: &T) -> Result<(), ConfigError>;
}

/// Rejects empty or whitespace-only names
pub struct NonBlankValidator {
    pub field: &'static str,
}

impl ConfigValidator<str> for NonBlankValidator {
    fn validate(&self, value: &str) -> Result<(), ConfigError> {
        if value.trim().is_empty() {
            return Err(ConfigError::missing_required(
                self.field,
                "A non-empty value is required",
            ));
        }
        Ok(())
    }
}

/// Rejects lists containing blank entries or duplicates
pub struct EntryListValidator {
    pub field: &'static str,
}

impl ConfigValidator<[String]> for EntryListValidator {
    fn validate(&self, value: &[String]) -> Result<(), ConfigError> {
        let mut seen = std::collections::HashSet::new();
        for entry in value {
            if entry.trim().is_empty() {
                return Err(ConfigError::invalid_value(
                    self.field,
                    entry.clone(),
                    "non-empty entries",
                ));
            }
            if !seen.insert(entry.as_str()) {
                return Err(ConfigError::invalid_value(
                    self.field,
                    entry.clone(),
                    "unique entries",
                ));
            }
        }
        Ok(())
    }
}
