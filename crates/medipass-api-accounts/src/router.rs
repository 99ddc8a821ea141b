//! Router assembly and shared state.

use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use medipass_directory::{IdentityStore, ProfileStore, RoleBindingStore};
use medipass_provisioning::{
    DeprovisioningService, DirectorySettings, EnrichmentService, ProvisioningService, ResetService,
};

use crate::handlers;
use crate::middleware::staff_guard;

/// Shared state for the accounts API.
#[derive(Clone)]
pub struct AccountsState {
    pub identities: Arc<dyn IdentityStore>,
    pub bindings: Arc<dyn RoleBindingStore>,
    pub profiles: Arc<dyn ProfileStore>,
    pub provisioning: Arc<ProvisioningService>,
    pub deprovisioning: Arc<DeprovisioningService>,
    pub reset: Arc<ResetService>,
    pub enrichment: Arc<EnrichmentService>,
}

impl AccountsState {
    /// Wire the services over the three store ports.
    pub fn new(
        identities: Arc<dyn IdentityStore>,
        bindings: Arc<dyn RoleBindingStore>,
        profiles: Arc<dyn ProfileStore>,
        settings: DirectorySettings,
    ) -> Self {
        let provisioning = Arc::new(ProvisioningService::new(
            identities.clone(),
            bindings.clone(),
            profiles.clone(),
            settings.clone(),
        ));
        let deprovisioning = Arc::new(DeprovisioningService::new(identities.clone()));
        let reset = Arc::new(ResetService::new(
            identities.clone(),
            profiles.clone(),
            settings,
        ));
        let enrichment = Arc::new(EnrichmentService::new(
            identities.clone(),
            bindings.clone(),
            profiles.clone(),
        ));
        Self {
            identities,
            bindings,
            profiles,
            provisioning,
            deprovisioning,
            reset,
            enrichment,
        }
    }
}

/// Build the accounts router.
///
/// Everything except bootstrap sits behind [`staff_guard`].
pub fn accounts_router(state: AccountsState) -> Router {
    let guarded = Router::new()
        .route(
            "/accounts",
            get(handlers::list::list_accounts)
                .post(handlers::provision::provision_account)
                .delete(handlers::deprovision::deprovision_account),
        )
        .route("/accounts/reset", post(handlers::reset::issue_reset))
        .route("/accounts/relink", post(handlers::relink::relink_profiles))
        .layer(middleware::from_fn_with_state(state.clone(), staff_guard));

    Router::new()
        .merge(guarded)
        .route(
            "/accounts/bootstrap",
            post(handlers::bootstrap::bootstrap_account),
        )
        .with_state(state)
}
