//! Error types for dronelog.
//!
//! This module defines all error types used throughout the dronelog crate,
//! providing detailed context for debugging and user-friendly error messages.

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// A host capability consumed by the journal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    /// Photo capture.
    Camera,
    /// Current geographic position.
    Location,
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Camera => write!(f, "camera"),
            Self::Location => write!(f, "location"),
        }
    }
}

/// The main error type for dronelog operations.
#[derive(Error, Debug)]
pub enum Error {
    // === Log Store Errors ===
    /// The stored blob is not a JSON array of observation records.
    #[error("stored observations under '{key}' are corrupt: {source}")]
    CorruptData {
        /// Storage key holding the blob.
        key: String,
        /// The parse failure.
        #[source]
        source: serde_json::Error,
    },

    /// The persistence layer failed to read a key.
    #[error("failed to read '{key}' from storage: {message}")]
    PersistenceRead {
        /// Storage key being read.
        key: String,
        /// Description of what went wrong.
        message: String,
    },

    /// The persistence layer rejected a write or delete.
    #[error("failed to write '{key}' to storage: {message}")]
    PersistenceWrite {
        /// Storage key being written.
        key: String,
        /// Description of what went wrong.
        message: String,
    },

    // === Storage Errors ===
    /// Failed to open or create the database.
    #[error("failed to open database at {path}: {source}")]
    DatabaseOpen {
        /// Path to the database file.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: rusqlite::Error,
    },

    /// A database statement failed outside of a keyed operation.
    #[error("database query failed: {0}")]
    DatabaseQuery(#[from] rusqlite::Error),

    // === Capability Errors ===
    /// The user refused access to a capability.
    #[error("{capability} permission denied")]
    CapabilityDenied {
        /// The refused capability.
        capability: Capability,
    },

    /// The capability is granted but cannot deliver right now.
    #[error("{capability} unavailable: {message}")]
    CapabilityUnavailable {
        /// The failing capability.
        capability: Capability,
        /// Description of what went wrong.
        message: String,
    },

    // === Observation Errors ===
    /// An observation needs a description, a photo or a location.
    #[error("an observation needs at least a description, a photo or a location")]
    EmptyObservation,

    /// A record carries coordinates that cannot be stored.
    #[error("invalid location: latitude {latitude}, longitude {longitude}")]
    InvalidLocation {
        /// The rejected latitude.
        latitude: f64,
        /// The rejected longitude.
        longitude: f64,
    },

    // === Configuration Errors ===
    /// Failed to load configuration.
    #[error("failed to load configuration: {0}")]
    ConfigLoad(Box<figment::Error>),

    /// Configuration validation failed.
    #[error("invalid configuration: {message}")]
    ConfigValidation {
        /// Description of the validation failure.
        message: String,
    },

    // === I/O Errors ===
    /// File system operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to create a required directory.
    #[error("failed to create directory {path}: {source}")]
    DirectoryCreate {
        /// Path that couldn't be created.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    // === Serialization Errors ===
    /// JSON serialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // === Generic Errors ===
    /// An internal error occurred (bug).
    #[error("internal error: {0}")]
    Internal(String),
}

/// A specialized Result type for dronelog operations.
pub type Result<T> = std::result::Result<T, Error>;

impl From<figment::Error> for Error {
    fn from(err: figment::Error) -> Self {
        Self::ConfigLoad(Box::new(err))
    }
}

impl Error {
    /// Create a new internal error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Create a persistence read error for `key`.
    #[must_use]
    pub fn persistence_read(key: impl Into<String>, message: impl Into<String>) -> Self {
        Self::PersistenceRead {
            key: key.into(),
            message: message.into(),
        }
    }

    /// Create a persistence write error for `key`.
    #[must_use]
    pub fn persistence_write(key: impl Into<String>, message: impl Into<String>) -> Self {
        Self::PersistenceWrite {
            key: key.into(),
            message: message.into(),
        }
    }

    /// Create a capability unavailable error.
    #[must_use]
    pub fn unavailable(capability: Capability, message: impl Into<String>) -> Self {
        Self::CapabilityUnavailable {
            capability,
            message: message.into(),
        }
    }

    /// Check if this error means stored data could not be parsed.
    #[must_use]
    pub fn is_corrupt_data(&self) -> bool {
        matches!(self, Self::CorruptData { .. })
    }

    /// Check if this error came from a host capability.
    ///
    /// Capability failures never block saving an otherwise valid observation.
    #[must_use]
    pub fn is_capability_error(&self) -> bool {
        matches!(
            self,
            Self::CapabilityDenied { .. } | Self::CapabilityUnavailable { .. }
        )
    }
}
