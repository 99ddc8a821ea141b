//! Bootstrap handler.
//!
//! The one unauthenticated endpoint: provisions the single configured
//! administrative address so a fresh deployment can obtain its first
//! staff login. Any other address is refused.

use axum::{extract::State, Json};
use validator::Validate;

use crate::error::ApiAccountsError;
use crate::extract::ApiJson;
use crate::models::{BootstrapRequest, ProvisionAccountResponse};
use crate::router::AccountsState;

/// Provision the configured bootstrap administrator.
#[utoipa::path(
    post,
    path = "/accounts/bootstrap",
    request_body = BootstrapRequest,
    responses(
        (status = 200, description = "Administrator provisioned", body = ProvisionAccountResponse),
        (status = 400, description = "Validation error"),
        (status = 403, description = "Address is not the bootstrap address"),
    ),
    tag = "accounts"
)]
pub async fn bootstrap_account(
    State(state): State<AccountsState>,
    ApiJson(body): ApiJson<BootstrapRequest>,
) -> Result<Json<ProvisionAccountResponse>, ApiAccountsError> {
    body.validate()
        .map_err(|e| ApiAccountsError::Validation(e.to_string()))?;

    let outcome = state
        .provisioning
        .bootstrap(&body.email, &body.password)
        .await?;

    let message = if outcome.created {
        "Administrator account created"
    } else {
        "Administrator password rotated"
    };
    Ok(Json(ProvisionAccountResponse::new(
        message,
        Some(*outcome.identity_id.as_uuid()),
    )))
}
