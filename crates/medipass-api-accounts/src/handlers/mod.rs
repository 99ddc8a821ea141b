//! HTTP handlers.

pub mod bootstrap;
pub mod deprovision;
pub mod list;
pub mod provision;
pub mod relink;
pub mod reset;
