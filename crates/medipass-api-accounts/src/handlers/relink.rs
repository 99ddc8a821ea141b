//! Batch relink handler.

use axum::{extract::State, Json};
use medipass_core::Role;
use validator::Validate;

use crate::error::ApiAccountsError;
use crate::extract::ApiJson;
use crate::models::{RelinkRequest, RelinkResponse};
use crate::router::AccountsState;

/// Reconcile and link every unlinked profile of a role's kind.
#[utoipa::path(
    post,
    path = "/accounts/relink",
    request_body = RelinkRequest,
    responses(
        (status = 200, description = "Relink report", body = RelinkResponse),
        (status = 400, description = "Unknown role or role without profiles"),
        (status = 401, description = "Missing or invalid bearer token"),
        (status = 403, description = "Caller is not staff"),
    ),
    security(("bearer" = [])),
    tag = "accounts"
)]
pub async fn relink_profiles(
    State(state): State<AccountsState>,
    ApiJson(body): ApiJson<RelinkRequest>,
) -> Result<Json<RelinkResponse>, ApiAccountsError> {
    body.validate()
        .map_err(|e| ApiAccountsError::Validation(e.to_string()))?;
    let role: Role = body
        .role
        .parse()
        .map_err(|_| ApiAccountsError::Validation(format!("Unknown role: {}", body.role)))?;
    let kind = role.profile_kind().ok_or_else(|| {
        ApiAccountsError::Validation(format!("Role {role} holds no profile records"))
    })?;

    let report = state.enrichment.relink_profiles(kind).await?;
    Ok(Json(RelinkResponse::from(report)))
}
