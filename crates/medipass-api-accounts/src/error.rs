//! Error types for the Accounts API.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use medipass_directory::DirectoryError;
use medipass_provisioning::ProvisioningError;
use serde::Serialize;
use utoipa::ToSchema;

/// Error type for the Accounts API.
#[derive(Debug, thiserror::Error)]
pub enum ApiAccountsError {
    /// Authentication required or bearer token invalid.
    #[error("Authentication required")]
    Unauthorized,

    /// Staff role required.
    #[error("Staff role required")]
    Forbidden,

    /// Validation error (missing field, short password, bad role, ...).
    #[error("Validation error: {0}")]
    Validation(String),

    /// Target identity or profile absent.
    #[error("Not found")]
    NotFound,

    /// A downstream store operation failed mid-pipeline. Side effects
    /// of completed steps stay applied; the caller retries by
    /// re-invoking with the same arguments.
    #[error("Internal server error: {0}")]
    Internal(String),
}

impl From<ProvisioningError> for ApiAccountsError {
    fn from(err: ProvisioningError) -> Self {
        match err {
            ProvisioningError::Validation { .. } | ProvisioningError::SelfDeletion => {
                ApiAccountsError::Validation(err.to_string())
            }
            ProvisioningError::DomainNotAllowed => ApiAccountsError::Forbidden,
            ProvisioningError::NotFound { .. } => ApiAccountsError::NotFound,
            ProvisioningError::Directory(inner) => match inner {
                DirectoryError::NotFound { .. } => ApiAccountsError::NotFound,
                DirectoryError::InvalidToken => ApiAccountsError::Unauthorized,
                other => ApiAccountsError::Internal(other.to_string()),
            },
        }
    }
}

/// RFC 7807 Problem Details response format.
#[derive(Debug, Serialize, ToSchema)]
pub struct ProblemDetails {
    #[serde(rename = "type")]
    pub problem_type: String,
    pub title: String,
    pub status: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

fn problem(problem_type: &str, title: &str, status: u16, detail: Option<String>) -> ProblemDetails {
    ProblemDetails {
        problem_type: format!("https://medipass.health/problems/{problem_type}"),
        title: title.to_string(),
        status,
        detail,
    }
}

impl IntoResponse for ApiAccountsError {
    fn into_response(self) -> Response {
        let (status, body) = match &self {
            ApiAccountsError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                problem(
                    "unauthorized",
                    "Unauthorized",
                    401,
                    Some("Missing or invalid bearer token".to_string()),
                ),
            ),
            ApiAccountsError::Forbidden => (
                StatusCode::FORBIDDEN,
                problem(
                    "forbidden",
                    "Forbidden",
                    403,
                    Some("Staff role required for this operation".to_string()),
                ),
            ),
            ApiAccountsError::Validation(message) => (
                StatusCode::BAD_REQUEST,
                problem("validation-error", "Validation Error", 400, Some(message.clone())),
            ),
            ApiAccountsError::NotFound => (
                StatusCode::NOT_FOUND,
                problem("not-found", "Not Found", 404, None),
            ),
            ApiAccountsError::Internal(message) => {
                tracing::error!("Store failure surfaced to caller: {message}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    problem(
                        "internal-error",
                        "Internal Server Error",
                        500,
                        Some(message.clone()),
                    ),
                )
            }
        };
        (status, Json(body)).into_response()
    }
}
