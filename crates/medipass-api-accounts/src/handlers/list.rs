//! List accounts handler.

use axum::{
    extract::{Query, State},
    Json,
};
use medipass_core::Role;

use crate::error::ApiAccountsError;
use crate::models::{AccountRowResponse, ListAccountsQuery};
use crate::router::AccountsState;

/// List accounts, optionally filtered by role.
#[utoipa::path(
    get,
    path = "/accounts",
    params(ListAccountsQuery),
    responses(
        (status = 200, description = "Enriched account listing", body = Vec<AccountRowResponse>),
        (status = 400, description = "Unknown role filter"),
        (status = 401, description = "Missing or invalid bearer token"),
        (status = 403, description = "Caller is not staff"),
    ),
    security(("bearer" = [])),
    tag = "accounts"
)]
pub async fn list_accounts(
    State(state): State<AccountsState>,
    Query(query): Query<ListAccountsQuery>,
) -> Result<Json<Vec<AccountRowResponse>>, ApiAccountsError> {
    let role = match query.role_filter() {
        None => None,
        Some(raw) => Some(raw.parse::<Role>().map_err(|_| {
            ApiAccountsError::Validation(format!("Unknown role filter: {raw}"))
        })?),
    };

    let rows = state.enrichment.list_accounts(role).await?;
    Ok(Json(rows.into_iter().map(AccountRowResponse::from).collect()))
}
