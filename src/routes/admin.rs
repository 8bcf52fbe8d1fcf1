use crate::{
    AppState,
    handlers::{auth_content, departments, nav_types, users},
};
use axum::{
    Router,
    routing::{get, post, put},
};

/// Admin Router Module
///
/// Back-office management, nested under `/admin`. Every handler extracts
/// `AuthUser`; mutating handlers additionally check a permission code
/// (`nav:type:add`, `sys:user:update`, ...) which the admin role bypasses.
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        // --- Navigation categories ---
        .route(
            "/nav-types",
            get(nav_types::list_nav_types).post(nav_types::add_nav_type),
        )
        .route("/nav-types/tree", get(nav_types::nav_type_tree))
        .route(
            "/nav-types/{id}",
            get(nav_types::get_nav_type)
                .put(nav_types::update_nav_type)
                .delete(nav_types::delete_nav_type),
        )
        // --- Departments ---
        .route(
            "/departments",
            get(departments::list_departments).post(departments::save_department),
        )
        // Static segments take priority over `{id}`.
        .route("/departments/tree", get(departments::department_tree))
        .route(
            "/departments/enabled",
            get(departments::list_enabled_departments),
        )
        .route(
            "/departments/{id}",
            get(departments::get_department)
                .put(departments::update_department)
                .delete(departments::delete_department),
        )
        .route(
            "/departments/{id}/enabled",
            get(departments::is_department_enabled),
        )
        // --- Users ---
        .route("/users", get(users::list_users).post(users::add_user))
        .route("/users/rename", put(users::reset_user))
        .route(
            "/users/{id}",
            get(users::get_user)
                .put(users::update_user)
                .delete(users::delete_user),
        )
        .route("/users/{id}/roles", put(users::assign_roles))
        // --- Auth content ---
        .route("/auth-contents", post(auth_content::save_auth_content))
        .route(
            "/auth-contents/{id}",
            put(auth_content::update_auth_content),
        )
}
