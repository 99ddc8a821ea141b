//! medipass Postgres stores
//!
//! `sqlx`-backed implementations of the role-binding and profile store
//! ports. Each [`medipass_core::ProfileKind`] maps to its own table
//! through a single dispatch function; no string-keyed branching at
//! call sites.

pub mod bindings;
pub mod profiles;

pub use bindings::PgRoleBindingStore;
pub use profiles::PgProfileStore;

/// Embedded schema migrations for the binding and profile relations.
pub static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("./migrations");
