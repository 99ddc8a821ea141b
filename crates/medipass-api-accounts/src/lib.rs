//! medipass Accounts API
//!
//! Administrative request boundary over the provisioning subsystem.
//! Every endpoint except bootstrap sits behind the staff guard: the
//! bearer token is resolved through the identity store and the caller's
//! role binding must grant `staff`.

pub mod error;
pub mod extract;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod openapi;
pub mod router;

pub use error::ApiAccountsError;
pub use extract::ApiJson;
pub use middleware::{staff_guard, StaffContext};
pub use openapi::{openapi_routes, ApiDoc};
pub use router::{accounts_router, AccountsState};
