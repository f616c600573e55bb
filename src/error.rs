//! # Directive Error Types
//!
//! Structured error handling for description compilation using thiserror.
//! Every error is raised synchronously at the point of detection; none are
//! transient, so callers fix the description rather than retry.

use thiserror::Error;

/// Errors produced while compiling a query description
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DirectiveError {
    #[error("Unsupported capability: {capability} is not available on this builder, use a relation-aware builder")]
    UnsupportedCapability { capability: String },

    #[error("Invalid argument for '{directive}': {message}")]
    InvalidArgument { directive: String, message: String },

    #[error("Operator '{operator}' on '{field}' expects {expected} values, got {actual}")]
    InvalidOperatorArity {
        field: String,
        operator: String,
        expected: usize,
        actual: usize,
    },

    #[error("Unknown scope: '{name}' is not on the builder's allow-list")]
    UnknownScope { name: String },

    #[error("Configuration error: {message}")]
    Configuration { message: String },
}

impl DirectiveError {
    pub fn unsupported_capability(capability: impl Into<String>) -> Self {
        Self::UnsupportedCapability {
            capability: capability.into(),
        }
    }

    pub fn invalid_argument(directive: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            directive: directive.into(),
            message: message.into(),
        }
    }

    pub fn unknown_scope(name: impl Into<String>) -> Self {
        Self::UnknownScope { name: name.into() }
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// True for malformed-shape errors, arity mismatches included
    pub fn is_invalid_argument(&self) -> bool {
        matches!(
            self,
            Self::InvalidArgument { .. } | Self::InvalidOperatorArity { .. }
        )
    }
}

impl From<config::ConfigError> for DirectiveError {
    fn from(error: config::ConfigError) -> Self {
        Self::configuration(error.to_string())
    }
}

pub type Result<T> = std::result::Result<T, DirectiveError>;
