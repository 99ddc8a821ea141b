//! Staff authorization guard.
//!
//! Resolves the bearer token against the identity store, then checks
//! the caller's role binding. Only `staff` passes; every other role
//! (and every unbound identity) gets 403.

use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
};
use medipass_core::{IdentityId, Role};
use medipass_directory::DirectoryError;

use crate::error::ApiAccountsError;
use crate::router::AccountsState;

/// The authenticated staff caller, inserted into request extensions.
#[derive(Debug, Clone)]
pub struct StaffContext {
    pub identity_id: IdentityId,
    pub address: String,
}

/// Axum middleware that admits staff callers only.
pub async fn staff_guard(
    State(state): State<AccountsState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiAccountsError> {
    let token = bearer_token(&request).ok_or(ApiAccountsError::Unauthorized)?;

    let identity = state
        .identities
        .resolve_bearer(&token)
        .await
        .map_err(|err| match err {
            DirectoryError::InvalidToken => ApiAccountsError::Unauthorized,
            other => ApiAccountsError::Internal(other.to_string()),
        })?;

    let binding = state
        .bindings
        .find_by_identity(identity.id)
        .await
        .map_err(|err| ApiAccountsError::Internal(err.to_string()))?;

    match binding {
        Some(binding) if binding.role == Role::Staff => {
            request.extensions_mut().insert(StaffContext {
                identity_id: identity.id,
                address: identity.address,
            });
            Ok(next.run(request).await)
        }
        _ => {
            tracing::warn!(
                identity_id = %identity.id,
                "Non-staff caller rejected from accounts API"
            );
            Err(ApiAccountsError::Forbidden)
        }
    }
}

fn bearer_token(request: &Request) -> Option<String> {
    let header = request.headers().get(AUTHORIZATION)?.to_str().ok()?;
    let token = header.strip_prefix("Bearer ")?;
    if token.is_empty() {
        None
    } else {
        Some(token.to_string())
    }
}
