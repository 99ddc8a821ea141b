//! Directory record types.

use chrono::{DateTime, Utc};
use medipass_core::{IdentityId, ProfileId, ProfileKind, Role};
use serde::{Deserialize, Serialize};

/// Metadata key under which an identity carries its account number.
pub const ACCOUNT_NUMBER_KEY: &str = "account_number";

/// A login identity owned by the identity store.
///
/// The identity store is the sole source of truth for authentication
/// secrets; they are write-only through [`crate::IdentityStore`] and
/// never appear on this type.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Identity {
    /// Store-assigned identifier.
    pub id: IdentityId,
    /// Login address, unique across all identities.
    pub address: String,
    /// Free-form metadata attached at creation.
    #[serde(default)]
    pub metadata: serde_json::Map<String, serde_json::Value>,
    /// When the identity was created.
    pub created_at: DateTime<Utc>,
}

impl Identity {
    /// The address local part (everything before the `@` separator).
    ///
    /// Addresses without a separator yield the whole address.
    #[must_use]
    pub fn local_part(&self) -> &str {
        self.address.split('@').next().unwrap_or(&self.address)
    }

    /// The account number recorded in metadata, if any.
    #[must_use]
    pub fn metadata_account_number(&self) -> Option<&str> {
        self.metadata.get(ACCOUNT_NUMBER_KEY).and_then(|v| v.as_str())
    }
}

/// Input for creating a new identity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewIdentity {
    /// Login address; must be unique.
    pub address: String,
    /// Initial authentication secret.
    pub secret: String,
    /// Metadata to attach (typically the account number).
    #[serde(default)]
    pub metadata: serde_json::Map<String, serde_json::Value>,
}

/// The authorization record associating one identity with exactly one
/// role and account number.
///
/// Lifecycle is tied to the identity by convention (the identity
/// store's delete cascade), not by enforced referential integrity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleBinding {
    /// The bound identity; unique per binding.
    pub identity_id: IdentityId,
    /// The granted role.
    pub role: Role,
    /// Human-assigned account number, stored upper-cased.
    pub account_number: String,
    /// Mirrors `account_number` iff `role = patient`, else `None`.
    pub patient_number: Option<String>,
}

impl RoleBinding {
    /// Builds a binding, populating `patient_number` iff the role is
    /// `patient`.
    #[must_use]
    pub fn for_role(identity_id: IdentityId, role: Role, account_number: String) -> Self {
        let patient_number = (role == Role::Patient).then(|| account_number.clone());
        Self {
            identity_id,
            role,
            account_number,
            patient_number,
        }
    }
}

/// Role-specific domain data, independently owned from login
/// credentials.
///
/// `identity_id` is a weak back-reference: relation only, not
/// ownership. A profile may exist long before any login account does
/// and survives deprovisioning of its identity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileRecord {
    pub id: ProfileId,
    /// Which profile relation this record lives in.
    pub kind: ProfileKind,
    /// Display name.
    pub name: String,
    /// Account number, unique within the kind (not across kinds).
    pub account_number: String,
    /// Weak back-reference to a login identity, if linked.
    pub identity_id: Option<IdentityId>,
    /// Plaintext secret for manual distribution; decoupled from the
    /// identity store's real credential and allowed to go stale.
    pub shadow_password: Option<String>,
    /// Doctor-specific field; `None` for other kinds.
    pub specialty: Option<String>,
    /// When the profile was created.
    pub created_at: DateTime<Utc>,
}

/// Input for creating a new profile record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewProfile {
    pub kind: ProfileKind,
    pub name: String,
    pub account_number: String,
    pub identity_id: Option<IdentityId>,
    pub shadow_password: Option<String>,
    pub specialty: Option<String>,
}

/// Fields updated when linking an existing profile to an identity.
#[derive(Debug, Clone)]
pub struct ProfileLinkUpdate {
    /// The identity to point the profile at.
    pub identity_id: IdentityId,
    /// New account number, if the link should also rename (doctors).
    pub account_number: Option<String>,
    /// New specialty, if supplied (doctors).
    pub specialty: Option<String>,
}

impl ProfileLinkUpdate {
    /// A link that only sets the identity back-reference.
    #[must_use]
    pub fn link_only(identity_id: IdentityId) -> Self {
        Self {
            identity_id,
            account_number: None,
            specialty: None,
        }
    }
}

/// A credential-recovery artifact minted by the identity store.
///
/// Delivered out of band; request boundaries must never echo
/// `action_link` to the caller.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecoveryArtifact {
    /// The identity the artifact is bound to.
    pub identity_id: IdentityId,
    /// One-time recovery link including the redirect target.
    pub action_link: String,
    /// Expiry of the artifact.
    pub expires_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_patient_binding_mirrors_account_number() {
        let binding =
            RoleBinding::for_role(IdentityId::new(), Role::Patient, "P00123".to_string());
        assert_eq!(binding.patient_number.as_deref(), Some("P00123"));
    }

    #[test]
    fn test_non_patient_binding_has_no_patient_number() {
        for role in [Role::Staff, Role::Doctor, Role::MedTech, Role::RadTech] {
            let binding = RoleBinding::for_role(IdentityId::new(), role, "A1".to_string());
            assert_eq!(binding.patient_number, None, "role {role}");
        }
    }

    #[test]
    fn test_local_part() {
        let identity = Identity {
            id: IdentityId::new(),
            address: "med001@hospital.example.org".to_string(),
            metadata: serde_json::Map::new(),
            created_at: Utc::now(),
        };
        assert_eq!(identity.local_part(), "med001");
    }

    #[test]
    fn test_metadata_account_number() {
        let mut metadata = serde_json::Map::new();
        metadata.insert(
            ACCOUNT_NUMBER_KEY.to_string(),
            serde_json::Value::String("MED001".to_string()),
        );
        let identity = Identity {
            id: IdentityId::new(),
            address: "med001@hospital.example.org".to_string(),
            metadata,
            created_at: Utc::now(),
        };
        assert_eq!(identity.metadata_account_number(), Some("MED001"));
    }
}
