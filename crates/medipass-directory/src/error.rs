//! Error types shared by all store implementations.

use std::fmt::{Display, Formatter};
use thiserror::Error;

/// Which of the three stores an error originated from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreKind {
    Identity,
    Binding,
    Profile,
}

impl Display for StoreKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            StoreKind::Identity => "identity",
            StoreKind::Binding => "role-binding",
            StoreKind::Profile => "profile",
        };
        f.write_str(name)
    }
}

/// Error type for directory store operations.
#[derive(Debug, Clone, Error)]
pub enum DirectoryError {
    /// A lookup target does not exist.
    #[error("{resource} not found{}", id.as_ref().map(|i| format!(": {i}")).unwrap_or_default())]
    NotFound {
        /// The kind of record (e.g. "Identity", "Profile").
        resource: &'static str,
        /// Optional identifier of the missing record.
        id: Option<String>,
    },

    /// An identity with this address already exists.
    #[error("Address already in use: {address}")]
    AddressInUse {
        /// The conflicting address.
        address: String,
    },

    /// A bearer token could not be resolved to an identity.
    #[error("Invalid or expired bearer token")]
    InvalidToken,

    /// The underlying store failed (network, database, remote 5xx).
    ///
    /// The message is passed through verbatim; callers surface it as a
    /// generic server error and rely on idempotent re-invocation rather
    /// than rollback.
    #[error("{store} store error: {message}")]
    Backend {
        /// Which store failed.
        store: StoreKind,
        /// The underlying error message.
        message: String,
    },
}

impl DirectoryError {
    /// Shorthand for a backend failure in the given store.
    #[must_use]
    pub fn backend(store: StoreKind, message: impl Into<String>) -> Self {
        DirectoryError::Backend {
            store,
            message: message.into(),
        }
    }

    /// Shorthand for a not-found error.
    #[must_use]
    pub fn not_found(resource: &'static str, id: Option<String>) -> Self {
        DirectoryError::NotFound { resource, id }
    }
}

/// Type alias for Results using [`DirectoryError`].
pub type DirectoryResult<T> = std::result::Result<T, DirectoryError>;
