//! Error taxonomy for the pairing engine.

use thiserror::Error;

use crate::component::ComponentType;

/// Result type for engine operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Everything a request (or a registry load) can fail with.
///
/// None of these are retried: the engine performs no I/O, so the same input
/// always fails the same way.
#[derive(Error, Debug)]
pub enum Error {
    /// The lookup collaborator has no resolved record under this name.
    #[error("{kind} not found: {name}")]
    ComponentNotFound { name: String, kind: ComponentType },

    /// Unknown game category id.
    #[error("Invalid category: {0}")]
    InvalidCategory(String),

    /// A record is missing a usable numeric field (zero PassMark score, out of range normalized score).
    #[error("Malformed component '{name}': {reason}")]
    MalformedComponent { name: String, reason: String },

    /// A category table broke one of its load-time invariants.
    #[error("Configuration invariant violated: {0}")]
    ConfigurationInvariantViolation(String),

    /// The settings document could not be parsed at all.
    #[error("Configuration error: {0}")]
    Config(#[from] toml::de::Error),

    /// Invalid request parameter.
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl Error {
    pub(crate) fn malformed(name: &str, reason: impl Into<String>) -> Self {
        Self::MalformedComponent {
            name: name.to_string(),
            reason: reason.into(),
        }
    }

    pub(crate) fn invariant(message: impl Into<String>) -> Self {
        Self::ConfigurationInvariantViolation(message.into())
    }
}
