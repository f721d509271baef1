//! Unified error types for Autopress

use thiserror::Error;

/// Unified error type for all Autopress operations
#[derive(Error, Debug)]
pub enum AutopressError {
    // Browser errors
    #[error("Browser error: {0}")]
    Browser(String),

    #[error("No locator resolved for role '{role}'")]
    ElementNotFound { role: String },

    // Authentication errors
    #[error("Authentication failed: {0}")]
    Auth(String),

    // Generation errors (text or image)
    #[error("Generation failed: {0}")]
    Generation(String),

    // Publish-flow errors
    #[error("Publish failed: {0}")]
    Publish(String),

    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    // I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    // Generic
    #[error("{0}")]
    Other(String),
}

impl AutopressError {
    /// Construct the element-location failure for a role key
    pub fn element_not_found(role: impl Into<String>) -> Self {
        Self::ElementNotFound { role: role.into() }
    }
}

/// Result type alias using AutopressError
pub type Result<T> = std::result::Result<T, AutopressError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_element_not_found_names_role() {
        let err = AutopressError::element_not_found("confirm_publish_btn");
        assert!(err.to_string().contains("confirm_publish_btn"));
    }

    #[test]
    fn test_io_error_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err: AutopressError = io.into();
        assert!(matches!(err, AutopressError::Io(_)));
    }
}
