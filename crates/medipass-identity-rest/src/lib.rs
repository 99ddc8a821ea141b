//! medipass Identity Store client
//!
//! `reqwest`-backed implementation of the
//! [`IdentityStore`](medipass_directory::IdentityStore) port against the
//! identity provider's HTTP API. Admin operations authenticate with a
//! service token; bearer resolution forwards the end user's token.
//!
//! The provider's delete endpoint cascades removal of the role binding;
//! this client relies on that contract and never verifies it.

pub mod client;
pub mod config;

pub use client::RestIdentityStore;
pub use config::RestIdentityConfig;
