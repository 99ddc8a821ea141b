//! Deprovisioning Service.
//!
//! Removes an identity while leaving its profile record untouched:
//! clinical data must survive credential revocation. The role binding
//! is identity-scoped and removed by the identity store's own delete
//! cascade, which this service does not verify.

use std::sync::Arc;

use medipass_core::IdentityId;
use medipass_directory::IdentityStore;

use crate::error::{ProvisioningError, ProvisioningResult};

/// Deletes identities with a self-deletion guard.
pub struct DeprovisioningService {
    identities: Arc<dyn IdentityStore>,
}

impl DeprovisioningService {
    /// Create the service over the identity store port.
    pub fn new(identities: Arc<dyn IdentityStore>) -> Self {
        Self { identities }
    }

    /// Delete `target`'s identity.
    ///
    /// # Errors
    ///
    /// - [`ProvisioningError::SelfDeletion`] when the caller targets
    ///   itself; checked before any store call.
    /// - [`ProvisioningError::Directory`] when the delete fails.
    pub async fn deprovision(
        &self,
        caller: IdentityId,
        target: IdentityId,
    ) -> ProvisioningResult<()> {
        if caller == target {
            return Err(ProvisioningError::SelfDeletion);
        }
        self.identities.delete(target).await?;
        tracing::info!(
            caller = %caller,
            identity_id = %target,
            "Deprovisioned identity; profile record retained"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use medipass_core::Role;
    use medipass_directory::memory::{InMemoryIdentityStore, InMemoryRoleBindingStore};
    use medipass_directory::RoleBinding;

    #[tokio::test]
    async fn test_self_deletion_rejected_without_store_mutation() {
        let identities = Arc::new(InMemoryIdentityStore::new());
        let me = identities.seed("staff@hospital.example.org", "secret-1", None);
        let service = DeprovisioningService::new(identities.clone());

        let err = service.deprovision(me.id, me.id).await.unwrap_err();
        assert!(matches!(err, ProvisioningError::SelfDeletion));
        assert!(identities.contains(me.id));
    }

    #[tokio::test]
    async fn test_deprovision_removes_identity_and_cascades_binding() {
        let bindings = Arc::new(InMemoryRoleBindingStore::new());
        let identities =
            Arc::new(InMemoryIdentityStore::new().with_cascade(bindings.clone()));
        let caller = identities.seed("staff@hospital.example.org", "secret-1", None);
        let target = identities.seed("doc001@hospital.example.org", "secret-2", None);
        bindings.seed(RoleBinding::for_role(
            target.id,
            Role::Doctor,
            "DOC001".to_string(),
        ));

        let service = DeprovisioningService::new(identities.clone());
        service.deprovision(caller.id, target.id).await.unwrap();

        assert!(!identities.contains(target.id));
        assert!(bindings.is_empty());
    }

    #[tokio::test]
    async fn test_deprovision_missing_identity_is_not_found() {
        let identities = Arc::new(InMemoryIdentityStore::new());
        let caller = identities.seed("staff@hospital.example.org", "secret-1", None);
        let service = DeprovisioningService::new(identities);

        let err = service
            .deprovision(caller.id, IdentityId::new())
            .await
            .unwrap_err();
        assert!(matches!(err, ProvisioningError::Directory(_)));
    }
}
