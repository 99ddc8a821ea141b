//! Request payloads.

use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

/// Body for `POST /accounts`.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct ProvisionAccountRequest {
    /// One of `staff`, `doctor`, `medtech`, `radtech`, `patient`.
    #[validate(length(min = 1, message = "Role is required"))]
    pub role: String,

    /// Display name, also the tier-3 reconciliation key.
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,

    /// Account number; normalized to trimmed uppercase before use.
    #[validate(length(min = 1, message = "Account number is required"))]
    pub account_number: String,

    /// Initial password, rotated in place when the identity exists.
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,

    /// Existing profile to link instead of creating one.
    pub linked_id: Option<Uuid>,

    /// Doctor specialty; defaults when absent.
    pub specialty: Option<String>,
}

/// Body for `DELETE /accounts`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct DeprovisionRequest {
    pub user_id: Uuid,
}

/// Body for `POST /accounts/bootstrap`.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct BootstrapRequest {
    #[validate(length(min = 1, message = "Email is required"))]
    pub email: String,

    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,
}

/// Body for `POST /accounts/reset`.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct ResetRequest {
    #[validate(length(min = 1, message = "Email is required"))]
    pub email: String,

    /// Where the recovery link sends the user after completion.
    #[validate(length(min = 1, message = "Redirect target is required"))]
    pub redirect_to: String,
}

/// Body for `POST /accounts/relink`.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct RelinkRequest {
    /// Profile role to sweep: `doctor`, `medtech`, `radtech` or `patient`.
    #[validate(length(min = 1, message = "Role is required"))]
    pub role: String,
}

/// Query string for `GET /accounts`.
#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct ListAccountsQuery {
    /// Role filter; absent or `all` lists every account.
    pub role: Option<String>,
}

impl ListAccountsQuery {
    /// The effective filter, with `all` collapsed to no filter.
    #[must_use]
    pub fn role_filter(&self) -> Option<&str> {
        match self.role.as_deref() {
            None | Some("all") | Some("") => None,
            Some(role) => Some(role),
        }
    }
}
