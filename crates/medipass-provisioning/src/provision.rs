//! Account Provisioning Service.
//!
//! Orchestrates create-or-update of an identity, upsert of its role
//! binding, and linking or creation of the role-specific profile
//! record. Each step is a separate round trip against a distinct
//! store; there is no cross-store transaction. A failed step aborts
//! the rest and completed steps stay applied — the resulting partial
//! state is recoverable by re-invoking with the same arguments, which
//! converges on the same identity.

use std::sync::Arc;

use medipass_core::{IdentityId, ProfileId, ProfileKind, Role};
use medipass_directory::{
    IdentityStore, NewIdentity, NewProfile, ProfileLinkUpdate, ProfileStore, RoleBinding,
    RoleBindingStore, ACCOUNT_NUMBER_KEY,
};
use serde::Serialize;

use crate::codec::{derive_address, normalize_account_number};
use crate::error::{ProvisioningError, ProvisioningResult};
use crate::settings::DirectorySettings;

/// Minimum accepted secret length.
pub const MIN_SECRET_LEN: usize = 8;

/// Input to [`ProvisioningService::provision`].
#[derive(Debug, Clone)]
pub struct ProvisionRequest {
    /// Role to bind the identity to.
    pub role: Role,
    /// Display name for an auto-created profile.
    pub name: String,
    /// Human-assigned account number; the login address derives from it.
    pub account_number: String,
    /// Authentication secret to set or rotate to.
    pub secret: String,
    /// Existing profile to link instead of creating one.
    pub linked_profile_id: Option<ProfileId>,
    /// Doctor specialty; defaults from settings when absent.
    pub specialty: Option<String>,
}

/// Result of a provisioning run.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct ProvisionOutcome {
    /// The identity the account converged on.
    pub identity_id: IdentityId,
    /// `true` when the identity was created by this run, `false` when
    /// an existing identity's secret was rotated instead.
    pub created: bool,
}

/// Orchestrates the provisioning saga.
pub struct ProvisioningService {
    identities: Arc<dyn IdentityStore>,
    bindings: Arc<dyn RoleBindingStore>,
    profiles: Arc<dyn ProfileStore>,
    settings: DirectorySettings,
}

impl ProvisioningService {
    /// Create the service over the three store ports.
    pub fn new(
        identities: Arc<dyn IdentityStore>,
        bindings: Arc<dyn RoleBindingStore>,
        profiles: Arc<dyn ProfileStore>,
        settings: DirectorySettings,
    ) -> Self {
        Self {
            identities,
            bindings,
            profiles,
            settings,
        }
    }

    /// Provision an account: find-or-create the identity, upsert the
    /// role binding, then link or create the profile record.
    ///
    /// Validation happens before any store is touched. Re-invoking with
    /// the same `account_number` and role is safe: the lookup converges
    /// on the same identity (its secret rotates to the latest value),
    /// the binding upsert overwrites, and re-linking the same profile
    /// is a no-op update.
    ///
    /// # Errors
    ///
    /// - [`ProvisioningError::Validation`] for a short secret or empty
    ///   name/account number (no store contacted).
    /// - [`ProvisioningError::Directory`] when a store round trip fails
    ///   mid-pipeline; earlier steps are not rolled back.
    pub async fn provision(
        &self,
        request: ProvisionRequest,
    ) -> ProvisioningResult<ProvisionOutcome> {
        validate(&request)?;

        // Step 1: derive the login address (pure).
        let address = derive_address(&request.account_number, &self.settings.account_domain);
        let account_number = normalize_account_number(&request.account_number);

        // Step 2-3: find-or-create against the identity store.
        let (identity_id, created) =
            match self.identities.find_by_address(&address).await? {
                Some(identity) => {
                    self.identities
                        .rotate_secret(identity.id, &request.secret)
                        .await?;
                    tracing::info!(
                        identity_id = %identity.id,
                        address = %address,
                        "Rotated secret on existing identity"
                    );
                    (identity.id, false)
                }
                None => {
                    let mut metadata = serde_json::Map::new();
                    metadata.insert(
                        ACCOUNT_NUMBER_KEY.to_string(),
                        serde_json::Value::String(account_number.clone()),
                    );
                    let identity = self
                        .identities
                        .create(NewIdentity {
                            address: address.clone(),
                            secret: request.secret.clone(),
                            metadata,
                        })
                        .await?;
                    tracing::info!(
                        identity_id = %identity.id,
                        address = %address,
                        "Created identity"
                    );
                    (identity.id, true)
                }
            };

        // Step 4: upsert the role binding (last-writer-wins).
        self.bindings
            .upsert(RoleBinding::for_role(
                identity_id,
                request.role,
                account_number.clone(),
            ))
            .await?;

        // Step 5: link the supplied profile, or create one.
        self.link_or_create_profile(&request, identity_id, &account_number)
            .await?;

        Ok(ProvisionOutcome {
            identity_id,
            created,
        })
    }

    /// Bootstrap the first administrative account.
    ///
    /// Only ever provisions the single configured bootstrap address;
    /// any other address is rejected with
    /// [`ProvisioningError::DomainNotAllowed`] before any store call.
    pub async fn bootstrap(
        &self,
        address: &str,
        secret: &str,
    ) -> ProvisioningResult<ProvisionOutcome> {
        let normalized = address.trim().to_lowercase();
        if normalized != self.settings.bootstrap_address {
            tracing::warn!(address = %normalized, "Bootstrap attempted for a non-bootstrap address");
            return Err(ProvisioningError::DomainNotAllowed);
        }
        let local_part = normalized
            .split('@')
            .next()
            .unwrap_or(normalized.as_str())
            .to_uppercase();
        self.provision(ProvisionRequest {
            role: Role::Staff,
            name: "Administrator".to_string(),
            account_number: local_part,
            secret: secret.to_string(),
            linked_profile_id: None,
            specialty: None,
        })
        .await
    }

    async fn link_or_create_profile(
        &self,
        request: &ProvisionRequest,
        identity_id: IdentityId,
        account_number: &str,
    ) -> ProvisioningResult<()> {
        match (request.role.profile_kind(), request.linked_profile_id) {
            // Staff holds no profile relation.
            (None, _) => Ok(()),

            (Some(kind), Some(profile_id)) => {
                let update = if kind == ProfileKind::Doctor {
                    ProfileLinkUpdate {
                        identity_id,
                        account_number: Some(account_number.to_string()),
                        specialty: request.specialty.clone(),
                    }
                } else {
                    ProfileLinkUpdate::link_only(identity_id)
                };
                self.profiles.link_identity(kind, profile_id, update).await?;
                tracing::info!(
                    identity_id = %identity_id,
                    profile_id = %profile_id,
                    kind = %kind,
                    "Linked existing profile to identity"
                );
                Ok(())
            }

            // Patients are never auto-created: identity and binding only,
            // profile linkage is established separately (relink pass or a
            // later provision call with linked_profile_id).
            (Some(ProfileKind::Patient), None) => {
                tracing::info!(
                    identity_id = %identity_id,
                    "Patient provisioned without profile link"
                );
                Ok(())
            }

            (Some(kind), None) => {
                let specialty = (kind == ProfileKind::Doctor).then(|| {
                    request
                        .specialty
                        .clone()
                        .unwrap_or_else(|| self.settings.default_specialty.clone())
                });
                let profile = self
                    .profiles
                    .create(NewProfile {
                        kind,
                        name: request.name.clone(),
                        account_number: account_number.to_string(),
                        identity_id: Some(identity_id),
                        shadow_password: None,
                        specialty,
                    })
                    .await?;
                tracing::info!(
                    identity_id = %identity_id,
                    profile_id = %profile.id,
                    kind = %kind,
                    "Created profile for new account"
                );
                Ok(())
            }
        }
    }
}

fn validate(request: &ProvisionRequest) -> ProvisioningResult<()> {
    if request.secret.len() < MIN_SECRET_LEN {
        return Err(ProvisioningError::validation(
            "secret",
            format!("must be at least {MIN_SECRET_LEN} characters"),
        ));
    }
    if request.name.trim().is_empty() {
        return Err(ProvisioningError::validation("name", "must not be empty"));
    }
    if request.account_number.trim().is_empty() {
        return Err(ProvisioningError::validation(
            "account_number",
            "must not be empty",
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(role: Role) -> ProvisionRequest {
        ProvisionRequest {
            role,
            name: "Maria Clara".to_string(),
            account_number: "MED001".to_string(),
            secret: "long-enough-secret".to_string(),
            linked_profile_id: None,
            specialty: None,
        }
    }

    #[test]
    fn test_validate_rejects_short_secret() {
        let mut req = request(Role::Doctor);
        req.secret = "short".to_string();
        let err = validate(&req).unwrap_err();
        assert!(matches!(
            err,
            ProvisioningError::Validation { field: "secret", .. }
        ));
    }

    #[test]
    fn test_validate_rejects_blank_fields() {
        let mut req = request(Role::Doctor);
        req.name = "   ".to_string();
        assert!(validate(&req).is_err());

        let mut req = request(Role::Doctor);
        req.account_number = String::new();
        assert!(validate(&req).is_err());
    }

    #[test]
    fn test_validate_accepts_eight_char_secret() {
        let mut req = request(Role::Patient);
        req.secret = "12345678".to_string();
        assert!(validate(&req).is_ok());
    }
}
