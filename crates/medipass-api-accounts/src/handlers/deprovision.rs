//! Deprovision account handler.

use axum::{extract::State, Extension, Json};
use medipass_core::IdentityId;

use crate::error::ApiAccountsError;
use crate::extract::ApiJson;
use crate::middleware::StaffContext;
use crate::models::{AckResponse, DeprovisionRequest};
use crate::router::AccountsState;

/// Delete an account's identity. The profile record survives.
#[utoipa::path(
    delete,
    path = "/accounts",
    request_body = DeprovisionRequest,
    responses(
        (status = 200, description = "Identity deleted", body = AckResponse),
        (status = 400, description = "Malformed request body or caller targeted itself"),
        (status = 401, description = "Missing or invalid bearer token"),
        (status = 403, description = "Caller is not staff"),
        (status = 404, description = "No such identity"),
    ),
    security(("bearer" = [])),
    tag = "accounts"
)]
pub async fn deprovision_account(
    State(state): State<AccountsState>,
    Extension(caller): Extension<StaffContext>,
    ApiJson(body): ApiJson<DeprovisionRequest>,
) -> Result<Json<AckResponse>, ApiAccountsError> {
    let target = IdentityId::from_uuid(body.user_id);
    state
        .deprovisioning
        .deprovision(caller.identity_id, target)
        .await?;
    Ok(Json(AckResponse::new("Account deprovisioned")))
}
