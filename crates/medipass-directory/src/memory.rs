//! In-memory store implementations.
//!
//! Reference implementations of the three store ports backed by
//! `HashMap`s. Used by service- and router-level tests, which also rely
//! on the call counters to assert that validation short-circuits before
//! any store round trip.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{Duration, Utc};
use medipass_core::{IdentityId, ProfileId, ProfileKind, Role};

use crate::error::{DirectoryError, DirectoryResult, StoreKind};
use crate::model::{
    Identity, NewIdentity, NewProfile, ProfileLinkUpdate, ProfileRecord, RecoveryArtifact,
    RoleBinding, ACCOUNT_NUMBER_KEY,
};
use crate::store::{IdentityStore, ProfileStore, RoleBindingStore};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    // No awaits happen while a guard is held; a poisoned lock only
    // occurs after a panicking test and is not worth recovering from.
    mutex.lock().expect("store mutex poisoned")
}

#[derive(Default)]
struct IdentityState {
    identities: HashMap<IdentityId, Identity>,
    secrets: HashMap<IdentityId, String>,
    tokens: HashMap<String, IdentityId>,
}

/// In-memory [`IdentityStore`] with lookup/mint call counters.
#[derive(Default)]
pub struct InMemoryIdentityStore {
    state: Mutex<IdentityState>,
    lookups: AtomicUsize,
    mints: AtomicUsize,
    cascade: Option<Arc<InMemoryRoleBindingStore>>,
}

impl InMemoryIdentityStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Wire up the binding store this identity store cascades deletes
    /// into, mirroring the production store's behavior.
    #[must_use]
    pub fn with_cascade(mut self, bindings: Arc<InMemoryRoleBindingStore>) -> Self {
        self.cascade = Some(bindings);
        self
    }

    /// Seed an identity directly, bypassing the create path.
    pub fn seed(
        &self,
        address: &str,
        secret: &str,
        account_number: Option<&str>,
    ) -> Identity {
        let mut metadata = serde_json::Map::new();
        if let Some(number) = account_number {
            metadata.insert(
                ACCOUNT_NUMBER_KEY.to_string(),
                serde_json::Value::String(number.to_string()),
            );
        }
        let identity = Identity {
            id: IdentityId::new(),
            address: address.to_string(),
            metadata,
            created_at: Utc::now(),
        };
        let mut state = lock(&self.state);
        state.secrets.insert(identity.id, secret.to_string());
        state.identities.insert(identity.id, identity.clone());
        identity
    }

    /// Associate a bearer token with an identity.
    pub fn register_token(&self, token: &str, identity_id: IdentityId) {
        lock(&self.state).tokens.insert(token.to_string(), identity_id);
    }

    /// Number of `find_by_address` calls performed.
    #[must_use]
    pub fn lookup_count(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }

    /// Number of recovery artifacts minted.
    #[must_use]
    pub fn mint_count(&self) -> usize {
        self.mints.load(Ordering::SeqCst)
    }

    /// Current secret of an identity, if it exists.
    #[must_use]
    pub fn secret_of(&self, id: IdentityId) -> Option<String> {
        lock(&self.state).secrets.get(&id).cloned()
    }

    /// Whether the identity still exists.
    #[must_use]
    pub fn contains(&self, id: IdentityId) -> bool {
        lock(&self.state).identities.contains_key(&id)
    }

    /// Number of stored identities.
    #[must_use]
    pub fn len(&self) -> usize {
        lock(&self.state).identities.len()
    }

    /// Whether the store is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl IdentityStore for InMemoryIdentityStore {
    async fn find_by_address(&self, address: &str) -> DirectoryResult<Option<Identity>> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        let state = lock(&self.state);
        Ok(state
            .identities
            .values()
            .find(|i| i.address == address)
            .cloned())
    }

    async fn list(&self) -> DirectoryResult<Vec<Identity>> {
        Ok(lock(&self.state).identities.values().cloned().collect())
    }

    async fn create(&self, new: NewIdentity) -> DirectoryResult<Identity> {
        let mut state = lock(&self.state);
        if state.identities.values().any(|i| i.address == new.address) {
            return Err(DirectoryError::AddressInUse {
                address: new.address,
            });
        }
        let identity = Identity {
            id: IdentityId::new(),
            address: new.address,
            metadata: new.metadata,
            created_at: Utc::now(),
        };
        state.secrets.insert(identity.id, new.secret);
        state.identities.insert(identity.id, identity.clone());
        Ok(identity)
    }

    async fn rotate_secret(&self, id: IdentityId, secret: &str) -> DirectoryResult<()> {
        let mut state = lock(&self.state);
        if !state.identities.contains_key(&id) {
            return Err(DirectoryError::not_found("Identity", Some(id.to_string())));
        }
        state.secrets.insert(id, secret.to_string());
        Ok(())
    }

    async fn delete(&self, id: IdentityId) -> DirectoryResult<()> {
        {
            let mut state = lock(&self.state);
            if state.identities.remove(&id).is_none() {
                return Err(DirectoryError::not_found("Identity", Some(id.to_string())));
            }
            state.secrets.remove(&id);
            state.tokens.retain(|_, bound| *bound != id);
        }
        if let Some(bindings) = &self.cascade {
            bindings.remove(id);
        }
        Ok(())
    }

    async fn resolve_bearer(&self, token: &str) -> DirectoryResult<Identity> {
        let state = lock(&self.state);
        let id = state
            .tokens
            .get(token)
            .copied()
            .ok_or(DirectoryError::InvalidToken)?;
        state
            .identities
            .get(&id)
            .cloned()
            .ok_or(DirectoryError::InvalidToken)
    }

    async fn mint_recovery(
        &self,
        identity_id: IdentityId,
        redirect_to: &str,
    ) -> DirectoryResult<RecoveryArtifact> {
        let state = lock(&self.state);
        if !state.identities.contains_key(&identity_id) {
            return Err(DirectoryError::not_found(
                "Identity",
                Some(identity_id.to_string()),
            ));
        }
        self.mints.fetch_add(1, Ordering::SeqCst);
        Ok(RecoveryArtifact {
            identity_id,
            action_link: format!(
                "memory://recover/{identity_id}?redirect_to={redirect_to}"
            ),
            expires_at: Utc::now() + Duration::hours(1),
        })
    }
}

/// In-memory [`RoleBindingStore`] with one-shot failure injection.
#[derive(Default)]
pub struct InMemoryRoleBindingStore {
    bindings: Mutex<HashMap<IdentityId, RoleBinding>>,
    fail_next_upsert: AtomicBool,
}

impl InMemoryRoleBindingStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next `upsert` fail with a backend error, for
    /// partial-failure tests.
    pub fn fail_next_upsert(&self) {
        self.fail_next_upsert.store(true, Ordering::SeqCst);
    }

    /// Remove a binding (the identity store's delete cascade).
    pub fn remove(&self, identity_id: IdentityId) {
        lock(&self.bindings).remove(&identity_id);
    }

    /// Seed a binding directly.
    pub fn seed(&self, binding: RoleBinding) {
        lock(&self.bindings).insert(binding.identity_id, binding);
    }

    /// Number of stored bindings.
    #[must_use]
    pub fn len(&self) -> usize {
        lock(&self.bindings).len()
    }

    /// Whether the store is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl RoleBindingStore for InMemoryRoleBindingStore {
    async fn find_by_identity(
        &self,
        identity_id: IdentityId,
    ) -> DirectoryResult<Option<RoleBinding>> {
        Ok(lock(&self.bindings).get(&identity_id).cloned())
    }

    async fn list(&self, role: Option<Role>) -> DirectoryResult<Vec<RoleBinding>> {
        Ok(lock(&self.bindings)
            .values()
            .filter(|b| role.map_or(true, |r| b.role == r))
            .cloned()
            .collect())
    }

    async fn upsert(&self, binding: RoleBinding) -> DirectoryResult<()> {
        if self.fail_next_upsert.swap(false, Ordering::SeqCst) {
            return Err(DirectoryError::backend(
                StoreKind::Binding,
                "injected upsert failure",
            ));
        }
        lock(&self.bindings).insert(binding.identity_id, binding);
        Ok(())
    }
}

/// In-memory [`ProfileStore`].
#[derive(Default)]
pub struct InMemoryProfileStore {
    profiles: Mutex<HashMap<(ProfileKind, ProfileId), ProfileRecord>>,
}

impl InMemoryProfileStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a profile record directly.
    pub fn seed(&self, record: ProfileRecord) {
        lock(&self.profiles).insert((record.kind, record.id), record);
    }

    /// Build and seed an unlinked profile.
    pub fn seed_unlinked(&self, kind: ProfileKind, name: &str, account_number: &str) -> ProfileRecord {
        let record = ProfileRecord {
            id: ProfileId::new(),
            kind,
            name: name.to_string(),
            account_number: account_number.to_string(),
            identity_id: None,
            shadow_password: None,
            specialty: None,
            created_at: Utc::now(),
        };
        self.seed(record.clone());
        record
    }

    /// Number of stored profiles across all kinds.
    #[must_use]
    pub fn len(&self) -> usize {
        lock(&self.profiles).len()
    }

    /// Whether the store is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl ProfileStore for InMemoryProfileStore {
    async fn get(
        &self,
        kind: ProfileKind,
        id: ProfileId,
    ) -> DirectoryResult<Option<ProfileRecord>> {
        Ok(lock(&self.profiles).get(&(kind, id)).cloned())
    }

    async fn find_by_identity(
        &self,
        kind: ProfileKind,
        identity_id: IdentityId,
    ) -> DirectoryResult<Option<ProfileRecord>> {
        Ok(lock(&self.profiles)
            .values()
            .find(|p| p.kind == kind && p.identity_id == Some(identity_id))
            .cloned())
    }

    async fn list_unlinked(&self, kind: ProfileKind) -> DirectoryResult<Vec<ProfileRecord>> {
        Ok(lock(&self.profiles)
            .values()
            .filter(|p| p.kind == kind && p.identity_id.is_none())
            .cloned()
            .collect())
    }

    async fn create(&self, new: NewProfile) -> DirectoryResult<ProfileRecord> {
        let record = ProfileRecord {
            id: ProfileId::new(),
            kind: new.kind,
            name: new.name,
            account_number: new.account_number,
            identity_id: new.identity_id,
            shadow_password: new.shadow_password,
            specialty: new.specialty,
            created_at: Utc::now(),
        };
        lock(&self.profiles).insert((record.kind, record.id), record.clone());
        Ok(record)
    }

    async fn link_identity(
        &self,
        kind: ProfileKind,
        id: ProfileId,
        update: ProfileLinkUpdate,
    ) -> DirectoryResult<()> {
        let mut profiles = lock(&self.profiles);
        let record = profiles
            .get_mut(&(kind, id))
            .ok_or_else(|| DirectoryError::not_found("Profile", Some(id.to_string())))?;
        record.identity_id = Some(update.identity_id);
        if let Some(account_number) = update.account_number {
            record.account_number = account_number;
        }
        if let Some(specialty) = update.specialty {
            record.specialty = Some(specialty);
        }
        Ok(())
    }

    async fn set_shadow_password(
        &self,
        kind: ProfileKind,
        id: ProfileId,
        plaintext: &str,
    ) -> DirectoryResult<()> {
        let mut profiles = lock(&self.profiles);
        let record = profiles
            .get_mut(&(kind, id))
            .ok_or_else(|| DirectoryError::not_found("Profile", Some(id.to_string())))?;
        record.shadow_password = Some(plaintext.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_create_rejects_duplicate_address() {
        let store = InMemoryIdentityStore::new();
        store.seed("a@hospital.example.org", "secret-1", None);

        let err = store
            .create(NewIdentity {
                address: "a@hospital.example.org".to_string(),
                secret: "secret-2".to_string(),
                metadata: serde_json::Map::new(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, DirectoryError::AddressInUse { .. }));
    }

    #[tokio::test]
    async fn test_delete_cascades_binding() {
        let bindings = Arc::new(InMemoryRoleBindingStore::new());
        let identities = InMemoryIdentityStore::new().with_cascade(bindings.clone());

        let identity = identities.seed("d@hospital.example.org", "secret-1", None);
        bindings.seed(RoleBinding::for_role(
            identity.id,
            Role::Doctor,
            "DOC001".to_string(),
        ));

        identities.delete(identity.id).await.unwrap();
        assert!(bindings.is_empty());
        assert!(!identities.contains(identity.id));
    }

    #[tokio::test]
    async fn test_lookup_counter() {
        let store = InMemoryIdentityStore::new();
        assert_eq!(store.lookup_count(), 0);
        let _ = store.find_by_address("x@hospital.example.org").await;
        assert_eq!(store.lookup_count(), 1);
    }

    #[tokio::test]
    async fn test_resolve_bearer() {
        let store = InMemoryIdentityStore::new();
        let identity = store.seed("s@hospital.example.org", "secret-1", None);
        store.register_token("tok-1", identity.id);

        let resolved = store.resolve_bearer("tok-1").await.unwrap();
        assert_eq!(resolved.id, identity.id);
        assert!(matches!(
            store.resolve_bearer("tok-2").await.unwrap_err(),
            DirectoryError::InvalidToken
        ));
    }

    #[tokio::test]
    async fn test_injected_upsert_failure_fires_once() {
        let store = InMemoryRoleBindingStore::new();
        store.fail_next_upsert();

        let binding = RoleBinding::for_role(IdentityId::new(), Role::MedTech, "MT1".to_string());
        assert!(store.upsert(binding.clone()).await.is_err());
        assert!(store.upsert(binding).await.is_ok());
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn test_shadow_password_write() {
        let profiles = InMemoryProfileStore::new();
        let record = profiles.seed_unlinked(ProfileKind::Patient, "Ana Cruz", "P0007");

        profiles
            .set_shadow_password(ProfileKind::Patient, record.id, "temp-pass-123")
            .await
            .unwrap();
        let stored = profiles
            .get(ProfileKind::Patient, record.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.shadow_password.as_deref(), Some("temp-pass-123"));
    }
}
