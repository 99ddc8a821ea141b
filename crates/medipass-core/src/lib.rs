//! medipass Core Library
//!
//! Shared types for the medipass hospital account directory.
//!
//! # Modules
//!
//! - [`ids`] - Strongly typed identifiers (`IdentityId`, `ProfileId`)
//! - [`role`] - Authorization roles and profile kinds

pub mod ids;
pub mod role;

pub use ids::{IdentityId, ParseIdError, ProfileId};
pub use role::{ParseRoleError, ProfileKind, Role};
