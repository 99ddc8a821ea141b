//! Directory-wide settings.
//!
//! The organizational domain, the bootstrap address, and the default
//! doctor specialty are configuration, not inline constants, so they
//! can be overridden per deployment and in tests.

/// Settings shared by the provisioning, reset, and bootstrap paths.
#[derive(Debug, Clone)]
pub struct DirectorySettings {
    /// Domain suffix for derived login addresses (no leading `@`).
    pub account_domain: String,
    /// The single address the bootstrap endpoint will ever provision.
    /// Must be an address within `account_domain`.
    pub bootstrap_address: String,
    /// Specialty assigned to auto-created doctor profiles when the
    /// request carries none.
    pub default_specialty: String,
}

impl DirectorySettings {
    /// Build settings, normalizing the domain and bootstrap address to
    /// lowercase.
    #[must_use]
    pub fn new(
        account_domain: impl Into<String>,
        bootstrap_address: impl Into<String>,
        default_specialty: impl Into<String>,
    ) -> Self {
        Self {
            account_domain: account_domain.into().trim().to_lowercase(),
            bootstrap_address: bootstrap_address.into().trim().to_lowercase(),
            default_specialty: default_specialty.into(),
        }
    }

    /// Whether an address is inside the organizational allow-list:
    /// a non-empty local part without whitespace, at the configured
    /// domain. Local part comparison is case-insensitive by virtue of
    /// callers normalizing to lowercase first.
    #[must_use]
    pub fn allows_address(&self, address: &str) -> bool {
        match address.rsplit_once('@') {
            Some((local, domain)) => {
                !local.is_empty()
                    && !local.contains(char::is_whitespace)
                    && domain.eq_ignore_ascii_case(&self.account_domain)
            }
            None => false,
        }
    }
}
