//! Error types for the vacation engine.
//!
//! This module provides strongly-typed errors using the `thiserror` crate
//! for every failure the services can surface. The period engine itself
//! never produces one of these: it clamps out-of-range inputs instead.

use thiserror::Error;

use crate::services::RecordFailure;
use crate::store::RepositoryError;

/// The main error type for the vacation engine.
///
/// # Example
///
/// ```
/// use vacation_engine::error::EngineError;
///
/// let error = EngineError::ConfigNotFound {
///     path: "/missing/policy.yaml".to_string(),
/// };
/// assert_eq!(error.to_string(), "Configuration file not found: /missing/policy.yaml");
/// ```
#[derive(Debug, Error)]
pub enum EngineError {
    /// Configuration file was not found at the specified path.
    #[error("Configuration file not found: {path}")]
    ConfigNotFound {
        /// The path that was not found.
        path: String,
    },

    /// Configuration file could not be parsed.
    #[error("Failed to parse configuration file '{path}': {message}")]
    ConfigParseError {
        /// The path to the file that failed to parse.
        path: String,
        /// A description of the parse error.
        message: String,
    },

    /// Configuration parsed but describes an impossible policy.
    #[error("Invalid configuration: {message}")]
    InvalidConfig {
        /// What is wrong with the policy.
        message: String,
    },

    /// A required field was missing or malformed.
    #[error("Invalid field '{field}': {message}")]
    Validation {
        /// The offending field.
        field: String,
        /// A description of the problem.
        message: String,
    },

    /// An entity id did not resolve.
    #[error("{entity} not found: {id}")]
    NotFound {
        /// The entity kind (e.g. "collaborator").
        entity: &'static str,
        /// The id that was looked up.
        id: String,
        /// The original store error, kept as context.
        detail: String,
    },

    /// A natural key is already taken.
    #[error("{entity} already exists: {key}")]
    Conflict {
        /// The entity kind.
        entity: &'static str,
        /// The conflicting key.
        key: String,
    },

    /// Some records of a batch failed while the rest went through.
    #[error("{} record(s) failed, {inserted} inserted", failures.len())]
    PartialBatchFailure {
        /// Number of records inserted successfully.
        inserted: usize,
        /// The per-record failures.
        failures: Vec<RecordFailure>,
    },

    /// The store failed for a reason unrelated to the request.
    #[error("Store error: {message}")]
    Store {
        /// A description of the store failure.
        message: String,
    },

    /// Binding or serving the HTTP listener failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl EngineError {
    /// Shorthand for a [`EngineError::Validation`] error.
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl From<RepositoryError> for EngineError {
    fn from(error: RepositoryError) -> Self {
        let detail = error.to_string();
        match error {
            RepositoryError::NotFound { entity, id } => EngineError::NotFound {
                entity,
                id: id.to_string(),
                detail,
            },
            RepositoryError::Conflict { entity, key } => EngineError::Conflict { entity, key },
            RepositoryError::Unavailable(message) => EngineError::Store { message },
        }
    }
}

/// A type alias for Results that return EngineError.
pub type EngineResult<T> = Result<T, EngineError>;
