// src/error.rs

use serde_json::json;
use std::fmt;

use crate::models::{literal::LiteralKind, value::ValueShape};

/// Errors raised by the `HTML` scalar's conversion entry points.
/// Both kinds are terminal for the conversion that raised them: no fallback
/// value, no coercion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScalarError {
    // serialize / parseValue got something other than a string
    TypeMismatch { found: ValueShape },

    // parseLiteral got a non-string literal node
    Validation { kind: LiteralKind },
}

impl ScalarError {
    /// Stable code for the `extensions.code` field of a GraphQL error.
    pub fn code(&self) -> &'static str {
        match self {
            ScalarError::TypeMismatch { .. } => "HTML_TYPE_MISMATCH",
            ScalarError::Validation { .. } => "GRAPHQL_VALIDATION_FAILED",
        }
    }

    /// Renders the error as a GraphQL error object.
    /// Hosts place it in the `errors` array of the response.
    pub fn to_graphql_error(&self) -> serde_json::Value {
        json!({
            "message": self.to_string(),
            "extensions": {
                "code": self.code(),
            },
        })
    }
}

impl fmt::Display for ScalarError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScalarError::TypeMismatch { found } => {
                write!(f, "HTML cannot represent a non string value: {}", found)
            }
            ScalarError::Validation { kind } => {
                write!(f, "Can only sanitize HTML strings, but got: {}", kind)
            }
        }
    }
}

impl std::error::Error for ScalarError {}

/// Errors raised while loading a policy from the environment.
#[derive(Debug)]
pub enum ConfigError {
    // HTML_POLICY is not valid PolicyOptions JSON
    InvalidJson(serde_json::Error),

    // HTML_BASE_URL is not an absolute URL
    InvalidBaseUrl(url::ParseError),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidJson(err) => write!(f, "invalid HTML_POLICY: {}", err),
            ConfigError::InvalidBaseUrl(err) => write!(f, "invalid HTML_BASE_URL: {}", err),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidJson(err) => Some(err),
            ConfigError::InvalidBaseUrl(err) => Some(err),
        }
    }
}

/// Allows using `?` on `serde_json::from_str` while loading config.
impl From<serde_json::Error> for ConfigError {
    fn from(err: serde_json::Error) -> Self {
        ConfigError::InvalidJson(err)
    }
}

impl From<url::ParseError> for ConfigError {
    fn from(err: url::ParseError) -> Self {
        ConfigError::InvalidBaseUrl(err)
    }
}
