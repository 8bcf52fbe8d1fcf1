use crate::{AppState, handlers::account};
use axum::{Router, routing::get};

/// Authenticated Router Module
///
/// Routes for any caller holding a valid session. The `auth_middleware`
/// layer in `create_router` rejects anonymous requests before these run.
pub fn authenticated_routes() -> Router<AppState> {
    Router::<AppState>::new()
        // GET /me
        .route("/me", get(account::get_me))
        // GET /menu
        // Menu tree built from the permissions granted by the caller's roles.
        .route("/menu", get(account::get_menu))
        // GET /perm-codes
        // Button-level permission codes the front-end uses to toggle actions.
        .route("/perm-codes", get(account::get_perm_codes))
}
