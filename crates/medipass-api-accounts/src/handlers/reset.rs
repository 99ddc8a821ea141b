//! Password reset issuance handler.

use axum::{extract::State, Json};
use medipass_provisioning::ProvisioningError;
use validator::Validate;

use crate::error::ApiAccountsError;
use crate::extract::ApiJson;
use crate::models::{AckResponse, ResetRequest};
use crate::router::AccountsState;

/// Issue a recovery artifact for an in-domain address.
///
/// The response is a plain acknowledgement: the action link travels
/// through the identity store's delivery channel and is never echoed
/// back to the caller.
#[utoipa::path(
    post,
    path = "/accounts/reset",
    request_body = ResetRequest,
    responses(
        (status = 200, description = "Recovery issued", body = AckResponse),
        (status = 400, description = "Out-of-domain or malformed address"),
        (status = 401, description = "Missing or invalid bearer token"),
        (status = 403, description = "Caller is not staff"),
        (status = 404, description = "No identity for the address"),
    ),
    security(("bearer" = [])),
    tag = "accounts"
)]
pub async fn issue_reset(
    State(state): State<AccountsState>,
    ApiJson(body): ApiJson<ResetRequest>,
) -> Result<Json<AckResponse>, ApiAccountsError> {
    body.validate()
        .map_err(|e| ApiAccountsError::Validation(e.to_string()))?;

    state
        .reset
        .issue_reset(&body.email, &body.redirect_to)
        .await
        .map_err(|err| match err {
            // An out-of-domain address is a caller mistake here, not a
            // permission problem.
            ProvisioningError::DomainNotAllowed => ApiAccountsError::Validation(
                "Address is outside the organizational domain".to_string(),
            ),
            other => other.into(),
        })?;

    Ok(Json(AckResponse::new("Password reset issued")))
}
