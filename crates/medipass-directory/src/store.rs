//! Store ports.
//!
//! Capability traits for the three directory stores. Every method is a
//! single network round trip against one store; there is no cross-store
//! transaction, and callers (the provisioning saga in particular) are
//! written against that reality.

use async_trait::async_trait;
use medipass_core::{IdentityId, ProfileId, ProfileKind, Role};

use crate::error::DirectoryResult;
use crate::model::{
    Identity, NewIdentity, NewProfile, ProfileLinkUpdate, ProfileRecord, RecoveryArtifact,
    RoleBinding,
};

/// The system of record for login credentials and issued bearer tokens.
#[async_trait]
pub trait IdentityStore: Send + Sync {
    /// Look up an identity by its unique address.
    async fn find_by_address(&self, address: &str) -> DirectoryResult<Option<Identity>>;

    /// List all identities (reconciliation candidate gathering).
    async fn list(&self) -> DirectoryResult<Vec<Identity>>;

    /// Create a new identity with the given address and secret.
    ///
    /// Fails with [`crate::DirectoryError::AddressInUse`] when the
    /// address is taken.
    async fn create(&self, new: NewIdentity) -> DirectoryResult<Identity>;

    /// Rotate the authentication secret of an existing identity.
    async fn rotate_secret(&self, id: IdentityId, secret: &str) -> DirectoryResult<()>;

    /// Delete an identity.
    ///
    /// The store cascades removal of the role binding; callers do not
    /// verify the cascade.
    async fn delete(&self, id: IdentityId) -> DirectoryResult<()>;

    /// Resolve a bearer token to the identity it was issued for.
    async fn resolve_bearer(&self, token: &str) -> DirectoryResult<Identity>;

    /// Mint a credential-recovery artifact bound to an identity and a
    /// redirect target.
    async fn mint_recovery(
        &self,
        identity_id: IdentityId,
        redirect_to: &str,
    ) -> DirectoryResult<RecoveryArtifact>;
}

/// The role-binding relation: one binding per identity.
#[async_trait]
pub trait RoleBindingStore: Send + Sync {
    /// Fetch the binding for an identity, if one exists.
    async fn find_by_identity(&self, identity_id: IdentityId)
        -> DirectoryResult<Option<RoleBinding>>;

    /// List bindings, optionally filtered by role.
    async fn list(&self, role: Option<Role>) -> DirectoryResult<Vec<RoleBinding>>;

    /// Insert or overwrite the binding keyed on `identity_id`.
    ///
    /// Last-writer-wins; concurrent provisioning races are accepted
    /// (administrator-driven, low-frequency traffic).
    async fn upsert(&self, binding: RoleBinding) -> DirectoryResult<()>;
}

/// The profile relations, one per [`ProfileKind`].
#[async_trait]
pub trait ProfileStore: Send + Sync {
    /// Fetch a profile by id within a kind.
    async fn get(&self, kind: ProfileKind, id: ProfileId)
        -> DirectoryResult<Option<ProfileRecord>>;

    /// Fetch the profile of a kind linked to the given identity.
    async fn find_by_identity(
        &self,
        kind: ProfileKind,
        identity_id: IdentityId,
    ) -> DirectoryResult<Option<ProfileRecord>>;

    /// List profiles of a kind with no stored identity link.
    async fn list_unlinked(&self, kind: ProfileKind) -> DirectoryResult<Vec<ProfileRecord>>;

    /// Create a new profile record.
    async fn create(&self, new: NewProfile) -> DirectoryResult<ProfileRecord>;

    /// Point an existing profile at an identity, optionally updating
    /// the account number and specialty (doctors).
    async fn link_identity(
        &self,
        kind: ProfileKind,
        id: ProfileId,
        update: ProfileLinkUpdate,
    ) -> DirectoryResult<()>;

    /// Write the plaintext shadow password on a profile record.
    ///
    /// Intentionally independent of the identity store's credential
    /// mechanism; never a substitute for rotating the real secret.
    async fn set_shadow_password(
        &self,
        kind: ProfileKind,
        id: ProfileId,
        plaintext: &str,
    ) -> DirectoryResult<()>;
}
