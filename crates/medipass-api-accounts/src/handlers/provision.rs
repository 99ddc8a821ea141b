//! Provision account handler.

use axum::{extract::State, Json};
use medipass_core::{ProfileId, Role};
use medipass_provisioning::ProvisionRequest;
use validator::Validate;

use crate::error::ApiAccountsError;
use crate::extract::ApiJson;
use crate::models::{ProvisionAccountRequest, ProvisionAccountResponse};
use crate::router::AccountsState;

/// Provision an account for a role holder.
///
/// Re-invoking with the same account number is safe: the run converges
/// on the existing identity and rotates its password.
#[utoipa::path(
    post,
    path = "/accounts",
    request_body = ProvisionAccountRequest,
    responses(
        (status = 200, description = "Account provisioned", body = ProvisionAccountResponse),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Missing or invalid bearer token"),
        (status = 403, description = "Caller is not staff"),
    ),
    security(("bearer" = [])),
    tag = "accounts"
)]
pub async fn provision_account(
    State(state): State<AccountsState>,
    ApiJson(body): ApiJson<ProvisionAccountRequest>,
) -> Result<Json<ProvisionAccountResponse>, ApiAccountsError> {
    body.validate()
        .map_err(|e| ApiAccountsError::Validation(e.to_string()))?;
    let role: Role = body
        .role
        .parse()
        .map_err(|_| ApiAccountsError::Validation(format!("Unknown role: {}", body.role)))?;

    let outcome = state
        .provisioning
        .provision(ProvisionRequest {
            role,
            name: body.name,
            account_number: body.account_number,
            secret: body.password,
            linked_profile_id: body.linked_id.map(ProfileId::from_uuid),
            specialty: body.specialty,
        })
        .await?;

    let message = if outcome.created {
        "Account created"
    } else {
        "Existing account updated"
    };
    Ok(Json(ProvisionAccountResponse::new(
        message,
        Some(*outcome.identity_id.as_uuid()),
    )))
}
