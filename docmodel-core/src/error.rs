//! Error types and result types for adapter operations.
//!
//! Every adapter operation resolves with a [`DocumentStoreResult<T>`]. Errors are never retried
//! internally: a failed backend call, a record that fails validation, or a request the adapter
//! cannot serve is surfaced to the caller as one of the [`DocumentStoreError`] variants.

use std::{collections::BTreeMap, fmt};

use bson::error::Error as BsonError;
use serde::Serialize;
use thiserror::Error;

/// Represents all possible errors that can occur when running an adapter operation.
#[derive(Error, Debug)]
pub enum DocumentStoreError {
    /// Any failure surfaced by the underlying store (connectivity, write conflicts,
    /// a missing update target, an existing collection, ...).
    #[error("Backend error: {0}")]
    Backend(String),
    /// The record handed to an update failed model validation.
    #[error("Validation error: {0}")]
    Validation(ValidationErrors),
    /// The adapter does not support the requested operation (e.g. bulk updates).
    #[error("Unsupported operation: {0}")]
    UnsupportedOperation(String),
    /// The query contains a comparison kind the backend translator does not know.
    #[error("Unsupported comparison: {0}")]
    UnsupportedComparison(String),
    /// A comparison cannot be expressed with the value it carries.
    #[error("Invalid comparison: {0}")]
    InvalidComparison(String),
    /// Serialization/deserialization error when converting between models and records.
    #[error("Serialization error: {0}")]
    Serialization(String),
    /// Error during driver initialization or connection setup.
    #[error("Initialization error: {0}")]
    Initialization(String),
}

/// A specialized `Result` type for adapter operations.
pub type DocumentStoreResult<T> = Result<T, DocumentStoreError>;

impl From<BsonError> for DocumentStoreError {
    fn from(err: BsonError) -> Self {
        DocumentStoreError::Serialization(err.to_string())
    }
}

impl From<ValidationErrors> for DocumentStoreError {
    fn from(errors: ValidationErrors) -> Self {
        DocumentStoreError::Validation(errors)
    }
}

/// The error set produced by a failed model validation, keyed by field name.
///
/// # Example
///
/// ```ignore
/// let mut errors = ValidationErrors::new();
/// errors.add("name", "Field \"name\" is required");
/// assert!(!errors.is_empty());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors {
    errors: BTreeMap<String, String>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records an error message for `field`, replacing any previous message for it.
    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) -> &mut Self {
        self.errors.insert(field.into(), message.into());
        self
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.errors.get(field).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.errors
            .iter()
            .map(|(field, message)| (field.as_str(), message.as_str()))
    }

    /// Returns `Ok(())` when no errors were recorded, otherwise the error set itself.
    pub fn into_result(self) -> Result<(), ValidationErrors> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;

        for (field, message) in self.iter() {
            if !first {
                f.write_str("; ")?;
            }
            write!(f, "{field}: {message}")?;
            first = false;
        }

        Ok(())
    }
}
