// Copyright (c) 2025 - Cowboy AI, Inc.
//! Error types for store operations

use thiserror::Error;

use crate::domain::{NetworkError, ResourceKind};
use crate::references::Target;

/// Errors that can occur while mutating or loading a configuration document
///
/// User-correctable problems are reported by the validation layer and never
/// reach the store in the intended flow. Anything surfacing here is either a
/// locator or reference that does not resolve (a caller bug) or a document
/// that cannot be loaded.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Record could not be located
    #[error("{kind} \"{name}\" not found")]
    NotFound { kind: ResourceKind, name: String },

    /// Parent record named by a locator does not exist
    #[error("parent {kind} \"{parent}\" not found")]
    ParentNotFound { kind: ResourceKind, parent: String },

    /// Name collides with a sibling record
    #[error("Name \"{name}\" already in use for {kind}")]
    DuplicateName { kind: ResourceKind, name: String },

    /// Record has no name
    #[error("{0} name cannot be empty")]
    EmptyName(ResourceKind),

    /// Operation is not allowed for the current record shape
    #[error("Invalid operation: {0}")]
    InvalidOperation(String),

    /// A committed document would hold a reference to a missing record
    #[error("{path} names a missing {target}")]
    DanglingReference { path: &'static str, target: Target },

    /// Imported document violates an invariant that cannot be repaired
    #[error("Import error: {0}")]
    Import(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Address value object rejected a value
    #[error(transparent)]
    Network(#[from] NetworkError),
}

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        StoreError::Serialization(err.to_string())
    }
}

impl StoreError {
    pub(crate) fn not_found(kind: ResourceKind, name: impl Into<String>) -> Self {
        StoreError::NotFound {
            kind,
            name: name.into(),
        }
    }

    pub(crate) fn parent_not_found(kind: ResourceKind, parent: impl Into<String>) -> Self {
        StoreError::ParentNotFound {
            kind,
            parent: parent.into(),
        }
    }
}
