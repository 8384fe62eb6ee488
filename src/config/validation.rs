//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Check the endpoint can be dialed
//! - Validate value ranges (timeouts > 0, limits > 0)
//!
//! Returns every error found, not just the first.

use std::fmt;

use crate::config::schema::ConnectorConfig;

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Dotted path of the offending field.
    pub field: String,
    pub message: String,
}

impl ValidationError {
    fn new(field: &str, message: impl Into<String>) -> Self {
        Self {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Validate a parsed configuration.
pub fn validate_config(config: &ConnectorConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if let Err(e) = config.endpoint.to_endpoint().validate() {
        errors.push(ValidationError::new("endpoint", e.to_string()));
    }
    if !config.endpoint.port.is_empty() && config.endpoint.port.parse::<u16>().is_err() {
        errors.push(ValidationError::new("endpoint.port", "must be a port number"));
    }

    if config.client.rpc_timeout_secs == 0 {
        errors.push(ValidationError::new("client.rpc_timeout_secs", "must be greater than 0"));
    }
    if config.client.receipt_poll_interval_ms == 0 {
        errors.push(ValidationError::new(
            "client.receipt_poll_interval_ms",
            "must be greater than 0",
        ));
    }
    if config.client.receipt_timeout_secs == 0 {
        errors.push(ValidationError::new(
            "client.receipt_timeout_secs",
            "must be greater than 0",
        ));
    }

    if config.gas.limit == 0 {
        errors.push(ValidationError::new("gas.limit", "must be greater than 0"));
    }
    for (name, limit) in &config.gas.function_limits {
        if *limit == 0 {
            errors.push(ValidationError::new(
                &format!("gas.function_limits.{}", name),
                "must be greater than 0",
            ));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate_config(&ConnectorConfig::default()).is_ok());
    }

    #[test]
    fn test_collects_all_errors() {
        let mut config = ConnectorConfig::default();
        config.endpoint.host = String::new();
        config.client.rpc_timeout_secs = 0;
        config.gas.limit = 0;

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 3);
        assert_eq!(errors[0].field, "endpoint");
        assert!(errors[1].to_string().starts_with("client.rpc_timeout_secs"));
    }

    #[test]
    fn test_rejects_non_numeric_port() {
        let mut config = ConnectorConfig::default();
        config.endpoint.port = "http".to_string();
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors[0].field, "endpoint.port");
    }
}
