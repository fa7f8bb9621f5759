//! Error types for Shipyard core.

use std::{error::Error, fmt};

use crate::domain::ShipId;

/// Error type for Shipyard catalog operations.
#[derive(Debug, Clone, PartialEq)]
pub enum ShipyardError {
    /// The external identifier is not a positive integer.
    InvalidIdentifier(String),
    /// A field required to create a ship is missing.
    IncompleteInput(String),
    /// A supplied field violates its range or length constraint.
    Validation {
        /// Name of the offending field as it appears on the wire.
        field: &'static str,
        /// Human-readable description of the violation.
        message: String,
    },
    /// No ship exists with the requested identifier.
    NotFound(ShipId),
    /// The persistence collaborator failed.
    Storage(String),
}

impl ShipyardError {
    /// Build a validation error for `field`.
    pub fn validation(field: &'static str, message: impl Into<String>) -> Self {
        Self::Validation {
            field,
            message: message.into(),
        }
    }

    /// Build a storage error from anything printable.
    pub fn storage(err: impl fmt::Display) -> Self {
        Self::Storage(err.to_string())
    }

    /// Whether the error is the caller's fault (HTTP 400 family).
    pub fn is_client_fault(&self) -> bool {
        matches!(
            self,
            Self::InvalidIdentifier(_) | Self::IncompleteInput(_) | Self::Validation { .. }
        )
    }
}

impl fmt::Display for ShipyardError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidIdentifier(message) => write!(f, "invalid id: {message}"),
            Self::IncompleteInput(message) => write!(f, "{message}"),
            Self::Validation { field, message } => write!(f, "{field}: {message}"),
            Self::NotFound(id) => write!(f, "ship {id} not found"),
            Self::Storage(message) => write!(f, "storage error: {message}"),
        }
    }
}

impl Error for ShipyardError {}

/// Convenience result type for Shipyard core.
pub type Result<T> = std::result::Result<T, ShipyardError>;
