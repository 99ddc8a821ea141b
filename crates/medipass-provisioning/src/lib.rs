//! medipass Provisioning
//!
//! Identity reconciliation and account provisioning across the three
//! directory stores. The stores share no transaction boundary, so the
//! provisioning workflow is an explicit saga: an ordered list of store
//! round trips where a failure aborts the remaining steps and already
//! applied steps are *not* rolled back — re-invocation with the same
//! arguments converges instead.
//!
//! # Modules
//!
//! - [`codec`] - derivation of login addresses from account numbers
//! - [`reconcile`] - the tiered profile-to-identity matching engine
//! - [`provision`] - create-or-update of identity, binding, profile
//! - [`deprovision`] - identity removal with the self-deletion guard
//! - [`reset`] - recovery-artifact issuance and the shadow password
//!   channel
//! - [`enrich`] - binding/profile joins for listings and the batch
//!   relink pass

pub mod codec;
pub mod deprovision;
pub mod enrich;
pub mod error;
pub mod provision;
pub mod reconcile;
pub mod reset;
pub mod settings;

pub use deprovision::DeprovisioningService;
pub use enrich::{AccountRow, EnrichmentService, RelinkReport};
pub use error::{ProvisioningError, ProvisioningResult};
pub use provision::{ProvisionOutcome, ProvisionRequest, ProvisioningService};
pub use reconcile::{reconcile, Match, MatchSource, ReconcileProfile};
pub use reset::ResetService;
pub use settings::DirectorySettings;
