//! `OpenAPI` documentation assembly.

use axum::{routing::get, Json, Router};
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::error::ProblemDetails;
use crate::handlers;
use crate::models::{
    AccountRowResponse, AckResponse, BootstrapRequest, DeprovisionRequest,
    ProvisionAccountRequest, ProvisionAccountResponse, RelinkRequest, RelinkResponse,
    ResetRequest,
};

/// Security scheme modifier for bearer authentication.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer",
                SecurityScheme::Http(
                    HttpBuilder::new().scheme(HttpAuthScheme::Bearer).build(),
                ),
            );
        }
    }
}

/// `OpenAPI` documentation for the accounts API.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "medipass Accounts API",
        description = "Account provisioning for the hospital directory"
    ),
    paths(
        handlers::list::list_accounts,
        handlers::provision::provision_account,
        handlers::deprovision::deprovision_account,
        handlers::bootstrap::bootstrap_account,
        handlers::reset::issue_reset,
        handlers::relink::relink_profiles,
    ),
    components(schemas(
        ProvisionAccountRequest,
        DeprovisionRequest,
        BootstrapRequest,
        ResetRequest,
        RelinkRequest,
        ProvisionAccountResponse,
        AccountRowResponse,
        AckResponse,
        RelinkResponse,
        ProblemDetails,
    )),
    modifiers(&SecurityAddon),
    tags(
        (name = "accounts", description = "Account provisioning and reconciliation")
    )
)]
pub struct ApiDoc;

/// Routes serving the generated specification.
pub fn openapi_routes() -> Router {
    Router::new().route(
        "/openapi.json",
        get(|| async { Json(ApiDoc::openapi()) }),
    )
}
