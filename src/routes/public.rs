use crate::{AppState, handlers::account};
use axum::{
    Router,
    routing::{get, post},
};

/// Public Router Module
///
/// Endpoints reachable without a token: the health probe and the login
/// gateway that issues one.
pub fn public_routes() -> Router<AppState> {
    Router::new()
        // GET /health
        // Liveness probe for load balancers; never touches the store.
        .route("/health", get(|| async { "ok" }))
        // POST /login
        // Username + password in, bearer token out.
        .route("/login", post(account::login))
}
