//! Request and response models.

pub mod requests;
pub mod responses;

pub use requests::{
    BootstrapRequest, DeprovisionRequest, ListAccountsQuery, ProvisionAccountRequest,
    RelinkRequest, ResetRequest,
};
pub use responses::{AccountRowResponse, AckResponse, ProvisionAccountResponse, RelinkResponse};
