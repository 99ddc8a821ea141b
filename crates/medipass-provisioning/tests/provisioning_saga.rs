//! End-to-end tests of the provisioning saga over in-memory stores.

use std::sync::Arc;

use medipass_core::{ProfileKind, Role};
use medipass_directory::memory::{
    InMemoryIdentityStore, InMemoryProfileStore, InMemoryRoleBindingStore,
};
use medipass_directory::{ProfileStore, RoleBindingStore};
use medipass_provisioning::{
    DirectorySettings, ProvisionRequest, ProvisioningError, ProvisioningService,
};

struct Harness {
    identities: Arc<InMemoryIdentityStore>,
    bindings: Arc<InMemoryRoleBindingStore>,
    profiles: Arc<InMemoryProfileStore>,
    service: ProvisioningService,
}

fn harness() -> Harness {
    let bindings = Arc::new(InMemoryRoleBindingStore::new());
    let identities = Arc::new(InMemoryIdentityStore::new().with_cascade(bindings.clone()));
    let profiles = Arc::new(InMemoryProfileStore::new());
    let service = ProvisioningService::new(
        identities.clone(),
        bindings.clone(),
        profiles.clone(),
        DirectorySettings::new(
            "hospital.example.org",
            "admin@hospital.example.org",
            "General Medicine",
        ),
    );
    Harness {
        identities,
        bindings,
        profiles,
        service,
    }
}

fn request(role: Role, account_number: &str, secret: &str) -> ProvisionRequest {
    ProvisionRequest {
        role,
        name: "Maria Clara".to_string(),
        account_number: account_number.to_string(),
        secret: secret.to_string(),
        linked_profile_id: None,
        specialty: None,
    }
}

#[tokio::test]
async fn provision_twice_converges_on_the_same_identity() {
    let h = harness();

    let first = h
        .service
        .provision(request(Role::Doctor, "DOC001", "first-secret"))
        .await
        .unwrap();
    assert!(first.created);

    let second = h
        .service
        .provision(request(Role::Doctor, "DOC001", "second-secret"))
        .await
        .unwrap();
    assert!(!second.created);
    assert_eq!(first.identity_id, second.identity_id);

    // Secret rotated to the latest value.
    assert_eq!(
        h.identities.secret_of(first.identity_id).as_deref(),
        Some("second-secret")
    );
    // One identity, one binding.
    assert_eq!(h.identities.len(), 1);
    assert_eq!(h.bindings.len(), 1);
}

#[tokio::test]
async fn short_secret_fails_before_any_store_round_trip() {
    let h = harness();

    let err = h
        .service
        .provision(request(Role::Doctor, "DOC001", "short"))
        .await
        .unwrap_err();

    assert!(matches!(err, ProvisioningError::Validation { .. }));
    assert_eq!(h.identities.lookup_count(), 0);
    assert!(h.identities.is_empty());
    assert!(h.bindings.is_empty());
    assert!(h.profiles.is_empty());
}

#[tokio::test]
async fn account_number_is_normalized_into_binding_and_address() {
    let h = harness();

    let outcome = h
        .service
        .provision(request(Role::MedTech, " mt007 ", "mt-secret-1"))
        .await
        .unwrap();

    let binding = h
        .bindings
        .find_by_identity(outcome.identity_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(binding.account_number, "MT007");
    assert_eq!(binding.patient_number, None);

    // Re-provisioning with different casing hits the same identity.
    let again = h
        .service
        .provision(request(Role::MedTech, "MT007", "mt-secret-2"))
        .await
        .unwrap();
    assert_eq!(again.identity_id, outcome.identity_id);
    assert!(!again.created);
}

#[tokio::test]
async fn doctor_without_linked_profile_gets_default_specialty() {
    let h = harness();

    let outcome = h
        .service
        .provision(request(Role::Doctor, "DOC002", "doc-secret-1"))
        .await
        .unwrap();

    let profile = h
        .profiles
        .find_by_identity(ProfileKind::Doctor, outcome.identity_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(profile.specialty.as_deref(), Some("General Medicine"));
    assert_eq!(profile.account_number, "DOC002");
    assert_eq!(profile.name, "Maria Clara");
}

#[tokio::test]
async fn patient_without_linked_profile_provisions_identity_and_binding_only() {
    let h = harness();

    let outcome = h
        .service
        .provision(request(Role::Patient, "P0042", "pt-secret-1"))
        .await
        .unwrap();

    let binding = h
        .bindings
        .find_by_identity(outcome.identity_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(binding.patient_number.as_deref(), Some("P0042"));

    // No profile auto-created for patients.
    assert!(h.profiles.is_empty());
}

#[tokio::test]
async fn linked_doctor_profile_is_updated_not_duplicated() {
    let h = harness();
    let existing = h
        .profiles
        .seed_unlinked(ProfileKind::Doctor, "Jose Rizal", "OLD-123");

    let mut req = request(Role::Doctor, "DOC003", "doc-secret-9");
    req.linked_profile_id = Some(existing.id);
    req.specialty = Some("Ophthalmology".to_string());
    let outcome = h.service.provision(req).await.unwrap();

    assert_eq!(h.profiles.len(), 1);
    let linked = h
        .profiles
        .get(ProfileKind::Doctor, existing.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(linked.identity_id, Some(outcome.identity_id));
    assert_eq!(linked.account_number, "DOC003");
    assert_eq!(linked.specialty.as_deref(), Some("Ophthalmology"));
}

#[tokio::test]
async fn binding_failure_leaves_identity_and_is_recoverable_by_retry() {
    let h = harness();
    h.bindings.fail_next_upsert();

    let err = h
        .service
        .provision(request(Role::RadTech, "RT003", "rt-secret-1"))
        .await
        .unwrap_err();
    assert!(matches!(err, ProvisioningError::Directory(_)));

    // Identity was created (step 3) and stays: no rollback.
    assert_eq!(h.identities.len(), 1);
    assert!(h.bindings.is_empty());
    assert!(h.profiles.is_empty());

    // Re-invocation converges on the partially provisioned identity.
    let outcome = h
        .service
        .provision(request(Role::RadTech, "RT003", "rt-secret-1"))
        .await
        .unwrap();
    assert!(!outcome.created);
    assert_eq!(h.bindings.len(), 1);
    assert_eq!(h.profiles.len(), 1);
}

#[tokio::test]
async fn bootstrap_accepts_only_the_configured_address() {
    let h = harness();

    let err = h
        .service
        .bootstrap("intruder@hospital.example.org", "a-long-secret")
        .await
        .unwrap_err();
    assert!(matches!(err, ProvisioningError::DomainNotAllowed));
    assert!(h.identities.is_empty());

    let outcome = h
        .service
        .bootstrap("Admin@Hospital.Example.Org", "a-long-secret")
        .await
        .unwrap();
    assert!(outcome.created);

    let binding = h
        .bindings
        .find_by_identity(outcome.identity_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(binding.role, Role::Staff);
    assert_eq!(binding.account_number, "ADMIN");
    // Staff carries no profile relation.
    assert!(h.profiles.is_empty());
}
