use axum::{
    Router,
    extract::{FromRef, Request},
    http::HeaderName,
    middleware::{self, Next},
    response::Response,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::{DefaultOnResponse, TraceLayer},
};
use tracing::{Level, Span};

// --- Module Structure ---

pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod menu;
pub mod models;
pub mod password;
pub mod repository;
pub mod services;
pub mod tree;

// Routing segregation (Public, Authenticated, Admin).
pub mod routes;
use auth::AuthUser;
use routes::{admin, authenticated, public};

// --- Public Re-exports ---

pub use config::AppConfig;
pub use error::{AppError, AppResult};
pub use menu::{PermissionMenuBuilder, PermissionStore};
pub use repository::{MemoryRepository, PostgresRepository, Repository, RepositoryState};

/// ApiDoc
///
/// OpenAPI document for every annotated handler, served at
/// `/api-docs/openapi.json` and browsable under `/swagger-ui`.
#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::account::login, handlers::account::get_me, handlers::account::get_menu,
        handlers::account::get_perm_codes,
        handlers::nav_types::add_nav_type, handlers::nav_types::update_nav_type,
        handlers::nav_types::delete_nav_type, handlers::nav_types::get_nav_type,
        handlers::nav_types::list_nav_types, handlers::nav_types::nav_type_tree,
        handlers::departments::save_department, handlers::departments::update_department,
        handlers::departments::delete_department, handlers::departments::get_department,
        handlers::departments::list_departments, handlers::departments::is_department_enabled,
        handlers::departments::list_enabled_departments, handlers::departments::department_tree,
        handlers::users::list_users, handlers::users::get_user, handlers::users::add_user,
        handlers::users::update_user, handlers::users::delete_user, handlers::users::assign_roles,
        handlers::users::reset_user,
        handlers::auth_content::save_auth_content, handlers::auth_content::update_auth_content,
    ),
    components(
        schemas(
            models::RouteItem, models::RouteMeta, models::UserInfo, models::RoleInfo,
            models::LoginRequest, models::LoginResponse, models::SysUserView,
            models::UserRequest, models::AssignRolesRequest, models::ResetUserRequest,
            models::SysDepartment, models::DepartmentRequest, models::DepartmentTreeNode,
            models::NavType, models::NavTypeRequest, models::NavTypeTreeNode,
            models::AuthContent, models::AuthContentRequest,
        )
    ),
    tags(
        (name = "dice-admin", description = "Dice back-office API")
    )
)]
struct ApiDoc;

/// AppState
///
/// The single shared container handed to every handler. Cloning is cheap:
/// the repository sits behind an `Arc` and the config is small.
#[derive(Clone)]
pub struct AppState {
    pub repo: RepositoryState,
    pub config: AppConfig,
}

// --- Axum FromRef Extractor Implementations ---

impl FromRef<AppState> for RepositoryState {
    fn from_ref(app_state: &AppState) -> RepositoryState {
        app_state.repo.clone()
    }
}

impl FromRef<AppState> for AppConfig {
    fn from_ref(app_state: &AppState) -> AppConfig {
        app_state.config.clone()
    }
}

/// auth_middleware
///
/// Gatekeeper for `authenticated_routes`. Extracting `AuthUser` is the whole
/// check: a failed extraction rejects with 401 before the handler runs.
async fn auth_middleware(_auth_user: AuthUser, request: Request, next: Next) -> Response {
    next.run(request).await
}

/// create_router
///
/// Assembles public, authenticated and admin routes, the Swagger UI, and the
/// request-id / tracing / CORS layers.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_methods(Any)
        .allow_origin(Any)
        .allow_headers(Any);

    let x_request_id = HeaderName::from_static("x-request-id");

    let base_router = Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .merge(public::public_routes())
        .merge(
            authenticated::authenticated_routes().route_layer(middleware::from_fn_with_state(
                state.clone(),
                auth_middleware,
            )),
        )
        // Admin handlers extract `AuthUser` themselves and check permission codes.
        .nest("/admin", admin::admin_routes())
        .with_state(state);

    base_router
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::new(x_request_id.clone(), MakeRequestUuid))
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(trace_span_logger)
                        .on_response(
                            DefaultOnResponse::new()
                                .level(Level::INFO)
                                .latency_unit(tower_http::LatencyUnit::Millis),
                        ),
                )
                .layer(PropagateRequestIdLayer::new(x_request_id)),
        )
        .layer(cors)
}

/// trace_span_logger
///
/// Opens the per-request span with method, uri and the `x-request-id` set by
/// `SetRequestIdLayer`, so every log line of a request can be correlated.
fn trace_span_logger(request: &axum::http::Request<axum::body::Body>) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|value| value.to_str().ok())
        .unwrap_or("unknown");

    tracing::info_span!(
        "http_request",
        method = ?request.method(),
        uri = ?request.uri(),
        req_id = %request_id,
    )
}
