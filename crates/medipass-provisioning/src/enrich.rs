//! Listing enrichment and the batch relink pass.
//!
//! Listing joins every role binding with a display name resolved from
//! the linked profile of that kind, falling back to the account number
//! when no profile is found — a missing related profile is never a
//! hard failure.
//!
//! The relink pass applies the reconciliation engine to profiles with
//! no stored identity link (legacy data, migrations): candidates are
//! gathered once, each profile is matched independently, and matches
//! are persisted.

use std::sync::Arc;

use medipass_core::{IdentityId, ProfileKind, Role};
use medipass_directory::{IdentityStore, ProfileLinkUpdate, ProfileStore, RoleBindingStore};
use serde::Serialize;

use crate::error::ProvisioningResult;
use crate::reconcile::{reconcile, MatchSource, ReconcileProfile};

/// One row of the enriched account listing.
#[derive(Debug, Clone, Serialize)]
pub struct AccountRow {
    /// The bound identity.
    pub identity_id: IdentityId,
    /// The granted role.
    pub role: Role,
    /// The binding's account number.
    pub account_number: String,
    /// Profile name when a linked profile exists, otherwise the
    /// account number.
    pub display_name: String,
}

/// Outcome of a relink pass, per match source.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RelinkReport {
    /// Profiles examined.
    pub examined: usize,
    /// Linked through the direct tier.
    pub linked_direct: usize,
    /// Linked through the numeric-suffix tier.
    pub linked_suffix: usize,
    /// Linked through the low-confidence name tier.
    pub linked_name: usize,
    /// Left unlinked.
    pub unmatched: usize,
}

/// Read-side service joining bindings with profiles.
pub struct EnrichmentService {
    identities: Arc<dyn IdentityStore>,
    bindings: Arc<dyn RoleBindingStore>,
    profiles: Arc<dyn ProfileStore>,
}

impl EnrichmentService {
    /// Create the service over the three store ports.
    pub fn new(
        identities: Arc<dyn IdentityStore>,
        bindings: Arc<dyn RoleBindingStore>,
        profiles: Arc<dyn ProfileStore>,
    ) -> Self {
        Self {
            identities,
            bindings,
            profiles,
        }
    }

    /// List bindings (optionally filtered by role), each enriched with
    /// a display name.
    ///
    /// Profile lookups are independent and read-only; a failed or empty
    /// lookup degrades to the account number instead of failing the
    /// listing.
    pub async fn list_accounts(&self, role: Option<Role>) -> ProvisioningResult<Vec<AccountRow>> {
        let bindings = self.bindings.list(role).await?;
        let mut rows = Vec::with_capacity(bindings.len());

        for binding in bindings {
            let display_name = match binding.role.profile_kind() {
                None => None,
                Some(kind) => match self
                    .profiles
                    .find_by_identity(kind, binding.identity_id)
                    .await
                {
                    Ok(profile) => profile.map(|p| p.name),
                    Err(error) => {
                        tracing::warn!(
                            identity_id = %binding.identity_id,
                            kind = %kind,
                            error = %error,
                            "Profile lookup failed during enrichment; falling back to account number"
                        );
                        None
                    }
                },
            };
            rows.push(AccountRow {
                identity_id: binding.identity_id,
                role: binding.role,
                display_name: display_name.unwrap_or_else(|| binding.account_number.clone()),
                account_number: binding.account_number,
            });
        }

        Ok(rows)
    }

    /// Reconcile and link every unlinked profile of a kind.
    ///
    /// Candidate identities and bindings are fetched once; each profile
    /// is matched independently. Name-tier matches are linked but
    /// logged at `warn` — they are the low-confidence fallback.
    pub async fn relink_profiles(&self, kind: ProfileKind) -> ProvisioningResult<RelinkReport> {
        let unlinked = self.profiles.list_unlinked(kind).await?;
        let mut report = RelinkReport {
            examined: unlinked.len(),
            ..RelinkReport::default()
        };
        if unlinked.is_empty() {
            return Ok(report);
        }

        let identities = self.identities.list().await?;
        let bindings = self.bindings.list(None).await?;

        for profile in unlinked {
            let probe = ReconcileProfile {
                account_number: &profile.account_number,
                name: &profile.name,
            };
            match reconcile(probe, &identities, &bindings) {
                Some(matched) => {
                    match matched.source {
                        MatchSource::Direct => report.linked_direct += 1,
                        MatchSource::Suffix => report.linked_suffix += 1,
                        MatchSource::Name => {
                            report.linked_name += 1;
                            tracing::warn!(
                                profile_id = %profile.id,
                                identity_id = %matched.identity_id,
                                "Low-confidence name-tier relink"
                            );
                        }
                    }
                    self.profiles
                        .link_identity(
                            kind,
                            profile.id,
                            ProfileLinkUpdate::link_only(matched.identity_id),
                        )
                        .await?;
                }
                None => report.unmatched += 1,
            }
        }

        tracing::info!(
            kind = %kind,
            examined = report.examined,
            direct = report.linked_direct,
            suffix = report.linked_suffix,
            name = report.linked_name,
            unmatched = report.unmatched,
            "Relink pass complete"
        );
        Ok(report)
    }
}
