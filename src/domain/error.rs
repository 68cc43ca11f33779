//! Error types for the Pokédex explorer.
//!
//! Two error types live here. [`RemoteError`] describes a failed remote query
//! and is surfaced as view state; it is `Clone` so one in-flight result can be
//! handed to every waiter. [`DexError`] is the crate-level error for storage,
//! configuration and I/O failures, with [`Result`] as the usual alias.

use std::fmt;
use thiserror::Error;

/// Classification of a failed remote call.
///
/// Every remote failure is mapped to exactly one of these kinds at the point
/// where the call fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The request exceeded the fixed per-request time limit.
    Timeout,
    /// The API answered 404 for the requested resource.
    NotFound,
    /// The API could not be reached.
    Network,
    /// Anything else (bad status, undecodable body, ...).
    Unknown,
}

impl ErrorKind {
    /// Returns the stable lowercase name of the kind.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Timeout => "timeout",
            Self::NotFound => "not-found",
            Self::Network => "network",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A failed remote query, carrying a short user-facing message.
///
/// # Examples
///
/// ```
/// use pokedex::domain::{ErrorKind, RemoteError};
///
/// let err = RemoteError::new(ErrorKind::NotFound, "Pokémon \"missingno\" not found");
/// assert_eq!(err.kind, ErrorKind::NotFound);
/// assert!(err.to_string().contains("missingno"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct RemoteError {
    /// Failure classification.
    pub kind: ErrorKind,
    /// Message suitable for showing to the user as-is.
    pub message: String,
}

impl RemoteError {
    /// Creates a remote error of the given kind.
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// Whether this error is a 404 for the requested resource.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        self.kind == ErrorKind::NotFound
    }
}

/// The main error type for non-remote operations.
#[derive(Debug, Error)]
pub enum DexError {
    /// Persisted key-value state could not be read or written.
    #[error("Storage error: {0}")]
    Storage(String),

    /// Filesystem or I/O operation failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Theme palette could not be loaded.
    #[error("Theme error: {0}")]
    Theme(String),

    /// Configuration is invalid or missing.
    #[error("Configuration error: {0}")]
    Config(String),

    /// A remote query failed and the caller chose to propagate it.
    #[error(transparent)]
    Remote(#[from] RemoteError),
}

/// A specialized `Result` type for explorer operations.
pub type Result<T> = std::result::Result<T, DexError>;
