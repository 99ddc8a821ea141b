//! Password Reset Issuance and the Shadow Password Channel.
//!
//! Reset issuance asks the identity store to mint a recovery artifact
//! for an allow-listed address. The allow-list check runs strictly
//! before the identity lookup so out-of-domain probes cannot
//! differentiate "bad domain" from "no such identity".
//!
//! The shadow password channel is a second, weaker credential surface:
//! a plaintext secret stored on the profile record for manual handover
//! to role holders without self-service recovery. It is deliberately
//! decoupled from the identity store's real secret and may go stale
//! relative to it; callers that also want the real secret changed must
//! invoke the provisioning secret-rotation path separately.

use std::sync::Arc;

use medipass_core::{ProfileId, ProfileKind};
use medipass_directory::{IdentityStore, ProfileStore, RecoveryArtifact};

use crate::error::{ProvisioningError, ProvisioningResult};
use crate::settings::DirectorySettings;

/// Issues recovery artifacts and maintains shadow passwords.
pub struct ResetService {
    identities: Arc<dyn IdentityStore>,
    profiles: Arc<dyn ProfileStore>,
    settings: DirectorySettings,
}

impl ResetService {
    /// Create the service over the identity and profile store ports.
    pub fn new(
        identities: Arc<dyn IdentityStore>,
        profiles: Arc<dyn ProfileStore>,
        settings: DirectorySettings,
    ) -> Self {
        Self {
            identities,
            profiles,
            settings,
        }
    }

    /// Mint a recovery artifact for `address`, bound to the supplied
    /// redirect target.
    ///
    /// # Errors
    ///
    /// - [`ProvisioningError::DomainNotAllowed`] for any address outside
    ///   the organizational domain; no lookup is performed.
    /// - [`ProvisioningError::NotFound`] when the address is in-domain
    ///   but no identity exists for it.
    pub async fn issue_reset(
        &self,
        address: &str,
        redirect_to: &str,
    ) -> ProvisioningResult<RecoveryArtifact> {
        let normalized = address.trim().to_lowercase();
        if !self.settings.allows_address(&normalized) {
            tracing::warn!(address = %normalized, "Reset refused for out-of-domain address");
            return Err(ProvisioningError::DomainNotAllowed);
        }

        let identity = self
            .identities
            .find_by_address(&normalized)
            .await?
            .ok_or(ProvisioningError::NotFound {
                resource: "Identity",
            })?;

        let artifact = self
            .identities
            .mint_recovery(identity.id, redirect_to)
            .await?;
        tracing::info!(
            identity_id = %identity.id,
            "Recovery artifact minted"
        );
        Ok(artifact)
    }

    /// Write a new shadow password on a profile record.
    ///
    /// Never touches the identity store.
    pub async fn set_shadow_password(
        &self,
        kind: ProfileKind,
        profile_id: ProfileId,
        plaintext: &str,
    ) -> ProvisioningResult<()> {
        if plaintext.is_empty() {
            return Err(ProvisioningError::validation(
                "shadow_password",
                "must not be empty",
            ));
        }
        self.profiles
            .set_shadow_password(kind, profile_id, plaintext)
            .await?;
        tracing::info!(profile_id = %profile_id, kind = %kind, "Shadow password set");
        Ok(())
    }

    /// Rewrite the shadow password back to a known original, after a
    /// manual handover went wrong.
    pub async fn reset_shadow_password(
        &self,
        kind: ProfileKind,
        profile_id: ProfileId,
        original_plaintext: &str,
    ) -> ProvisioningResult<()> {
        if original_plaintext.is_empty() {
            return Err(ProvisioningError::validation(
                "shadow_password",
                "must not be empty",
            ));
        }
        self.profiles
            .set_shadow_password(kind, profile_id, original_plaintext)
            .await?;
        tracing::info!(profile_id = %profile_id, kind = %kind, "Shadow password restored");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use medipass_directory::memory::{InMemoryIdentityStore, InMemoryProfileStore};

    fn settings() -> DirectorySettings {
        DirectorySettings::new(
            "hospital.example.org",
            "admin@hospital.example.org",
            "General Medicine",
        )
    }

    fn service(
        identities: Arc<InMemoryIdentityStore>,
        profiles: Arc<InMemoryProfileStore>,
    ) -> ResetService {
        ResetService::new(identities, profiles, settings())
    }

    #[tokio::test]
    async fn test_out_of_domain_address_never_performs_lookup() {
        let identities = Arc::new(InMemoryIdentityStore::new());
        let profiles = Arc::new(InMemoryProfileStore::new());
        let reset = service(identities.clone(), profiles);

        let err = reset
            .issue_reset("someone@elsewhere.example.com", "https://portal/reset")
            .await
            .unwrap_err();
        assert!(matches!(err, ProvisioningError::DomainNotAllowed));
        assert_eq!(identities.lookup_count(), 0);
        assert_eq!(identities.mint_count(), 0);
    }

    #[tokio::test]
    async fn test_in_domain_unknown_address_is_not_found() {
        let identities = Arc::new(InMemoryIdentityStore::new());
        let profiles = Arc::new(InMemoryProfileStore::new());
        let reset = service(identities.clone(), profiles);

        let err = reset
            .issue_reset("ghost@hospital.example.org", "https://portal/reset")
            .await
            .unwrap_err();
        assert!(matches!(err, ProvisioningError::NotFound { .. }));
        assert_eq!(identities.lookup_count(), 1);
        assert_eq!(identities.mint_count(), 0);
    }

    #[tokio::test]
    async fn test_issue_reset_mints_artifact_for_known_identity() {
        let identities = Arc::new(InMemoryIdentityStore::new());
        let profiles = Arc::new(InMemoryProfileStore::new());
        let known = identities.seed("med001@hospital.example.org", "secret-1", None);
        let reset = service(identities.clone(), profiles);

        // Mixed case local part still resolves.
        let artifact = reset
            .issue_reset("MED001@hospital.example.org", "https://portal/reset")
            .await
            .unwrap();
        assert_eq!(artifact.identity_id, known.id);
        assert_eq!(identities.mint_count(), 1);
    }

    #[tokio::test]
    async fn test_shadow_password_is_independent_of_identity_secret() {
        let identities = Arc::new(InMemoryIdentityStore::new());
        let profiles = Arc::new(InMemoryProfileStore::new());
        let identity = identities.seed("mt007@hospital.example.org", "real-secret", None);
        let record = profiles.seed_unlinked(ProfileKind::MedTech, "Len Reyes", "MT007");
        let reset = service(identities.clone(), profiles.clone());

        reset
            .set_shadow_password(ProfileKind::MedTech, record.id, "handover-pass")
            .await
            .unwrap();

        // Real secret untouched.
        assert_eq!(identities.secret_of(identity.id).as_deref(), Some("real-secret"));
        let stored = profiles
            .get(ProfileKind::MedTech, record.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.shadow_password.as_deref(), Some("handover-pass"));
    }

    #[tokio::test]
    async fn test_reset_shadow_password_restores_original() {
        let identities = Arc::new(InMemoryIdentityStore::new());
        let profiles = Arc::new(InMemoryProfileStore::new());
        let record = profiles.seed_unlinked(ProfileKind::RadTech, "Rey Cruz", "RT003");
        let reset = service(identities, profiles.clone());

        reset
            .set_shadow_password(ProfileKind::RadTech, record.id, "first")
            .await
            .unwrap();
        reset
            .reset_shadow_password(ProfileKind::RadTech, record.id, "original")
            .await
            .unwrap();

        let stored = profiles
            .get(ProfileKind::RadTech, record.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.shadow_password.as_deref(), Some("original"));
    }

    #[tokio::test]
    async fn test_empty_shadow_password_rejected() {
        let identities = Arc::new(InMemoryIdentityStore::new());
        let profiles = Arc::new(InMemoryProfileStore::new());
        let record = profiles.seed_unlinked(ProfileKind::Patient, "Ana Cruz", "P0007");
        let reset = service(identities, profiles);

        let err = reset
            .set_shadow_password(ProfileKind::Patient, record.id, "")
            .await
            .unwrap_err();
        assert!(matches!(err, ProvisioningError::Validation { .. }));
    }
}
