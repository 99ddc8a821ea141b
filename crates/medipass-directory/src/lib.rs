//! medipass Directory
//!
//! The account directory is split across three loosely coupled stores
//! with no shared transaction boundary:
//!
//! - the **identity store** owns credentials and bearer tokens,
//! - the **role-binding relation** maps an identity to one role and a
//!   human-readable account number,
//! - the **profile relations** (one per role kind) hold clinical domain
//!   data that predates or outlives any linked identity.
//!
//! This crate defines the data model, the capability traits each store
//! implements ([`IdentityStore`], [`RoleBindingStore`], [`ProfileStore`]),
//! and an in-memory reference implementation used by tests.

pub mod error;
pub mod memory;
pub mod model;
pub mod store;

pub use error::{DirectoryError, DirectoryResult, StoreKind};
pub use model::{
    Identity, NewIdentity, NewProfile, ProfileLinkUpdate, ProfileRecord, RecoveryArtifact,
    RoleBinding, ACCOUNT_NUMBER_KEY,
};
pub use store::{IdentityStore, ProfileStore, RoleBindingStore};
