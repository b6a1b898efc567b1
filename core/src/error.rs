//! Error types for the search API client.
//!
//! # Design
//! `ValidationError` covers everything rejected on the client before any
//! network call. `ApiError` wraps it together with the failures that can
//! happen once a request is built: server errors (carried with their status
//! code), malformed bodies and transport failures. The server's status code is
//! surfaced as-is; no variant tries to classify it further.

use thiserror::Error;

/// A search request rejected before it was sent.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("API key is missing")]
    MissingApiKey,

    #[error("minimum_probability must be between 0 and 1, got {0}")]
    ProbabilityOutOfRange(f64),

    #[error("minimum_match must be between 0 and 1, got {0}")]
    MatchOutOfRange(f64),

    /// No searchable name, email, phone, username, user id, url or address,
    /// and no search pointer.
    #[error("no valid name/username/user_id/phone/email/address or search pointer in request")]
    InsufficientCriteria,

    /// Strict validation only: fields that the server cannot search by.
    #[error("some fields are unsearchable: {}", .0.join(", "))]
    UnsearchableFields(Vec<String>),
}

/// Errors returned by `SearchClient` operations.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("invalid search request: {0}")]
    Validation(#[from] ValidationError),

    /// The server answered with a non-200 status.
    #[error("HTTP {status}: {message}")]
    Search {
        status: u16,
        message: String,
        warnings: Vec<String>,
    },

    /// The response body could not be deserialized into the expected type.
    #[error("deserialization failed: {0}")]
    DeserializationError(String),

    /// The request payload could not be serialized.
    #[error("serialization failed: {0}")]
    SerializationError(String),

    /// The HTTP round-trip itself failed (DNS, TLS, connection reset, ...).
    #[error("transport failed: {0}")]
    Transport(String),
}

impl ApiError {
    /// HTTP status of a server-side failure, if this is one.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Search { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, ApiError::Validation(_))
    }
}

/// Errors raised while reading configuration from the environment.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("invalid {key}: {message}")]
    Invalid { key: String, message: String },
}
