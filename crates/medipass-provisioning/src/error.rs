//! Error types for the provisioning services.

use medipass_directory::DirectoryError;
use thiserror::Error;

/// Error type for provisioning, deprovisioning, and reset operations.
#[derive(Debug, Error)]
pub enum ProvisioningError {
    /// Input failed validation; no store was contacted.
    #[error("Validation error on field '{field}': {message}")]
    Validation {
        /// The offending field.
        field: &'static str,
        /// Description of the failure.
        message: String,
    },

    /// A caller tried to deprovision its own identity.
    #[error("Cannot delete the account you are signed in with")]
    SelfDeletion,

    /// The address is outside the organizational allow-list. Raised
    /// before any identity lookup so out-of-domain probes learn nothing
    /// about the identity store's contents.
    #[error("Address is outside the permitted domain")]
    DomainNotAllowed,

    /// The operation's target does not exist.
    #[error("{resource} not found")]
    NotFound {
        /// The kind of record that was missing.
        resource: &'static str,
    },

    /// A store round trip failed mid-pipeline. Earlier steps are not
    /// rolled back; the caller retries by re-invoking with the same
    /// arguments.
    #[error(transparent)]
    Directory(#[from] DirectoryError),
}

impl ProvisioningError {
    /// Shorthand for a validation failure.
    #[must_use]
    pub fn validation(field: &'static str, message: impl Into<String>) -> Self {
        ProvisioningError::Validation {
            field,
            message: message.into(),
        }
    }
}

/// Type alias for Results using [`ProvisioningError`].
pub type ProvisioningResult<T> = std::result::Result<T, ProvisioningError>;

#[cfg(test)]
mod tests {
    use super::*;
    use medipass_directory::StoreKind;

    #[test]
    fn test_validation_display() {
        let err = ProvisioningError::validation("secret", "must be at least 8 characters");
        assert_eq!(
            err.to_string(),
            "Validation error on field 'secret': must be at least 8 characters"
        );
    }

    #[test]
    fn test_directory_error_message_passes_through() {
        let err: ProvisioningError =
            DirectoryError::backend(StoreKind::Identity, "503 from upstream").into();
        assert_eq!(err.to_string(), "identity store error: 503 from upstream");
    }
}
