//! Unified application error types for Keyward.
//!
//! Every crate maps its internal failures into [`AppError`] so that the
//! `?` operator carries a tagged [`ErrorKind`] all the way to the HTTP
//! boundary, where the kind decides the status code.

use std::fmt;
use thiserror::Error;

/// Error kind categorization used across the entire application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum ErrorKind {
    /// No key pair exists for the requested key id.
    KeyNotFound,
    /// Ciphertext is corrupt, has the wrong shape, or belongs to another key.
    CryptoFailure,
    /// A bearer token failed signature or expiry checks.
    ExpiredOrInvalidToken,
    /// A decrypt policy cannot be applied (e.g. the key id field is missing).
    MisconfiguredPolicy,
    /// The requested resource was not found.
    NotFound,
    /// Authentication failed (invalid credentials).
    Authentication,
    /// The caller is authenticated but lacks the required role.
    Forbidden,
    /// Input validation failed.
    Validation,
    /// A conflict occurred (e.g. purging the active key).
    Conflict,
    /// A session-related error occurred.
    Session,
    /// An internal server error occurred.
    Internal,
    /// A configuration error occurred.
    Configuration,
    /// A serialization/deserialization error occurred.
    Serialization,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::KeyNotFound => write!(f, "KEY_NOT_FOUND"),
            Self::CryptoFailure => write!(f, "CRYPTO_FAILURE"),
            Self::ExpiredOrInvalidToken => write!(f, "EXPIRED_OR_INVALID_TOKEN"),
            Self::MisconfiguredPolicy => write!(f, "MISCONFIGURED_POLICY"),
            Self::NotFound => write!(f, "NOT_FOUND"),
            Self::Authentication => write!(f, "AUTHENTICATION"),
            Self::Forbidden => write!(f, "FORBIDDEN"),
            Self::Validation => write!(f, "VALIDATION"),
            Self::Conflict => write!(f, "CONFLICT"),
            Self::Session => write!(f, "SESSION"),
            Self::Internal => write!(f, "INTERNAL"),
            Self::Configuration => write!(f, "CONFIGURATION"),
            Self::Serialization => write!(f, "SERIALIZATION"),
        }
    }
}

/// The unified application error used throughout Keyward.
#[derive(Debug, Error)]
#[error("{kind}: {message}")]
pub struct AppError {
    /// The category of error.
    pub kind: ErrorKind,
    /// A human-readable error message.
    pub message: String,
    /// Optional underlying cause.
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl AppError {
    /// Create a new application error.
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            source: None,
        }
    }

    /// Create a new application error with an underlying cause.
    pub fn with_source(
        kind: ErrorKind,
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            kind,
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a key-not-found error.
    pub fn key_not_found(key_id: &str) -> Self {
        Self::new(ErrorKind::KeyNotFound, format!("Key pair '{key_id}' not found"))
    }

    /// Create a crypto failure.
    pub fn crypto(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::CryptoFailure, message)
    }

    /// Create an expired-or-invalid token error.
    pub fn invalid_token(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::ExpiredOrInvalidToken, message)
    }

    /// Create a misconfigured decrypt policy error.
    pub fn misconfigured_policy(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::MisconfiguredPolicy, message)
    }

    /// Create a not-found error.
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotFound, message)
    }

    /// Create an authentication error.
    pub fn authentication(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Authentication, message)
    }

    /// Create a forbidden error.
    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Forbidden, message)
    }

    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Validation, message)
    }

    /// Create a conflict error.
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Conflict, message)
    }

    /// Create a session error.
    pub fn session(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Session, message)
    }

    /// Create an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Internal, message)
    }

    /// Create a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Configuration, message)
    }

    /// Returns `true` for errors caused by key material or ciphertext.
    pub fn is_crypto(&self) -> bool {
        matches!(self.kind, ErrorKind::KeyNotFound | ErrorKind::CryptoFailure)
    }
}

impl Clone for AppError {
    fn clone(&self) -> Self {
        Self {
            kind: self.kind,
            message: self.message.clone(),
            source: None,
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        Self::with_source(
            ErrorKind::Serialization,
            format!("JSON serialization error: {err}"),
            err,
        )
    }
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        Self::with_source(
            ErrorKind::Configuration,
            format!("Configuration error: {err}"),
            err,
        )
    }
}
