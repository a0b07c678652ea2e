//! Error types for roster.
//!
//! This module defines all error types used throughout the roster crate,
//! providing detailed context for debugging and user-friendly error messages.

use std::path::PathBuf;
use thiserror::Error;

/// The main error type for roster operations.
#[derive(Error, Debug)]
pub enum Error {
    // === Record Errors ===
    /// No person with the given id exists.
    #[error("person with id {id} was not found")]
    NotFound {
        /// The id that was looked up.
        id: i64,
    },

    /// The store holds no records, so there is no id to continue from.
    #[error("store is empty, cannot compute next id")]
    EmptyStore,

    /// A replace request did not say which record to replace.
    #[error("person id is required to replace a record")]
    MissingId,

    /// A replace request named two different ids.
    #[error("person id in body ({body_id}) does not match requested id ({path_id})")]
    IdMismatch {
        /// Id taken from the request path.
        path_id: i64,
        /// Id found in the request body.
        body_id: i64,
    },

    /// The request could not be decoded (bad path, query string or body).
    #[error("{message}")]
    InvalidRequest {
        /// What the extractor rejected.
        message: String,
    },

    // === Backing File Errors ===
    /// The backing file could not be read.
    #[error("failed to read people file at {path}: {source}")]
    StoreRead {
        /// Path to the backing file.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    /// The backing file is not a well-formed array of people.
    #[error("malformed people file at {path}: {source}")]
    StoreParse {
        /// Path to the backing file.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: serde_json::Error,
    },

    /// The backing file could not be rewritten.
    #[error("failed to write people file at {path}: {source}")]
    StoreWrite {
        /// Path to the backing file.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to create a required directory.
    #[error("failed to create directory {path}: {source}")]
    DirectoryCreate {
        /// Path that couldn't be created.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
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
    /// File system or socket operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    // === Serialization Errors ===
    /// JSON serialization/deserialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // === Generic Errors ===
    /// An internal error occurred (bug).
    #[error("internal error: {0}")]
    Internal(String),
}

/// A specialized Result type for roster operations.
pub type Result<T> = std::result::Result<T, Error>;

impl From<figment::Error> for Error {
    fn from(err: figment::Error) -> Self {
        Self::ConfigLoad(Box::new(err))
    }
}

impl Error {
    /// Create a not-found error for the given id.
    #[must_use]
    pub fn not_found(id: i64) -> Self {
        Self::NotFound { id }
    }

    /// Create a new internal error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Check if this error means the requested person does not exist.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Check if this error was caused by the caller rather than the service.
    #[must_use]
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::NotFound { .. }
                | Self::EmptyStore
                | Self::MissingId
                | Self::IdMismatch { .. }
                | Self::InvalidRequest { .. }
        )
    }

    /// HTTP status code this error maps to.
    #[must_use]
    pub fn status_code(&self) -> u16 {
        match self {
            Self::NotFound { .. } => 404,
            Self::MissingId | Self::IdMismatch { .. } => 400,
            Self::EmptyStore => 409,
            Self::InvalidRequest { .. } => 422,
            _ => 500,
        }
    }
}
