//! Identity Reconciliation Engine.
//!
//! Matches a profile record that lacks a stored identity link to the
//! most likely identity or role binding. Three tiers apply in strict
//! priority order, first match wins; there is no scoring and no
//! ambiguity resolution beyond the fixed order. Pure over the supplied
//! candidate slices: no I/O, no mutation, re-entrant.

use medipass_core::IdentityId;
use medipass_directory::{Identity, RoleBinding};
use serde::Serialize;

use crate::codec::{digit_suffix, normalize_account_number};

/// The fields of a profile the engine matches on.
#[derive(Debug, Clone, Copy)]
pub struct ReconcileProfile<'a> {
    /// The profile's account number.
    pub account_number: &'a str,
    /// The profile's display name (used only by the last-resort tier).
    pub name: &'a str,
}

/// Which tier produced a match.
///
/// Callers that branch on confidence should treat [`MatchSource::Name`]
/// as low-confidence: it exists only for data entered inconsistently.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchSource {
    /// Identity metadata carries the account number verbatim, or the
    /// derived address local part equals it.
    Direct,
    /// Digit-stripped account numbers are equal.
    Suffix,
    /// A binding's account or patient number literally equals the
    /// profile's name.
    Name,
}

/// A reconciliation hit.
#[derive(Debug, Clone)]
pub struct Match {
    /// The tier that matched.
    pub source: MatchSource,
    /// The matched identity.
    pub identity_id: IdentityId,
    /// The binding that carried the match, when one was involved.
    pub binding: Option<RoleBinding>,
}

/// Find the most likely identity for an unlinked profile.
///
/// Returns `None` when no tier matches. Candidate ordering within a
/// slice does not affect which tier wins; within a tier the first
/// candidate in slice order is taken.
#[must_use]
pub fn reconcile(
    profile: ReconcileProfile<'_>,
    candidate_identities: &[Identity],
    candidate_bindings: &[RoleBinding],
) -> Option<Match> {
    let normalized = normalize_account_number(profile.account_number);

    // Tier 1: direct — metadata account number verbatim, or the
    // upper-cased address local part equals the normalized number.
    if let Some(identity) = candidate_identities.iter().find(|identity| {
        identity.metadata_account_number() == Some(profile.account_number)
            || identity.local_part().to_uppercase() == normalized
    }) {
        return Some(Match {
            source: MatchSource::Direct,
            identity_id: identity.id,
            binding: None,
        });
    }

    // Tier 2: numeric suffix — exact digit-tail identity, tolerating
    // alphabetic prefix drift. Skipped entirely for digitless numbers.
    let digits = digit_suffix(profile.account_number);
    if !digits.is_empty() {
        if let Some(binding) = candidate_bindings
            .iter()
            .find(|binding| digit_suffix(&binding.account_number) == digits)
        {
            return Some(Match {
                source: MatchSource::Suffix,
                identity_id: binding.identity_id,
                binding: Some(binding.clone()),
            });
        }
    }

    // Tier 3: name — last resort for inconsistently entered data.
    if let Some(binding) = candidate_bindings.iter().find(|binding| {
        binding.account_number == profile.name
            || binding.patient_number.as_deref() == Some(profile.name)
    }) {
        return Some(Match {
            source: MatchSource::Name,
            identity_id: binding.identity_id,
            binding: Some(binding.clone()),
        });
    }

    None
}
