use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};

use super::op_log;
use crate::{
    AppState,
    auth::AuthUser,
    error::AppResult,
    models::{AssignRolesRequest, PageParam, Paging, ResetUserRequest, SysUserView, UserRequest},
    services::users::{self, PERM_ADD, PERM_ASSIGN_ROLE, PERM_DELETE, PERM_UPDATE},
};

/// list_users
///
/// [Admin Route] Paginated user listing. Phone numbers are masked and each
/// record carries its role ids; password hashes are never selected.
#[utoipa::path(
    get,
    path = "/admin/users",
    params(PageParam),
    responses((status = 200, description = "Page of users", body = Paging<SysUserView>))
)]
pub async fn list_users(
    _caller: AuthUser,
    State(state): State<AppState>,
    Query(param): Query<PageParam>,
) -> AppResult<Json<Paging<SysUserView>>> {
    Ok(Json(users::page(&*state.repo, &param).await?))
}

#[utoipa::path(
    get,
    path = "/admin/users/{id}",
    params(("id" = i64, Path, description = "User ID")),
    responses(
        (status = 200, description = "Found", body = SysUserView),
        (status = 404, description = "Not Found")
    )
)]
pub async fn get_user(
    _caller: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<Json<SysUserView>> {
    Ok(Json(users::get(&*state.repo, id).await?))
}

/// add_user
///
/// [Admin Route] Creates a user. Missing password and avatar fall back to
/// the configured initial values.
#[utoipa::path(
    post,
    path = "/admin/users",
    request_body = UserRequest,
    responses(
        (status = 201, description = "Created", body = SysUserView),
        (status = 409, description = "Username or email taken")
    )
)]
pub async fn add_user(
    caller: AuthUser,
    State(state): State<AppState>,
    Json(payload): Json<UserRequest>,
) -> AppResult<(StatusCode, Json<SysUserView>)> {
    caller.ensure_permission(&*state.repo, PERM_ADD).await?;

    let user = users::add(&*state.repo, &state.config, &payload).await?;
    op_log!("add user", "ADD", caller.id, user.id);
    Ok((StatusCode::CREATED, Json(user)))
}

#[utoipa::path(
    put,
    path = "/admin/users/{id}",
    params(("id" = i64, Path, description = "User ID")),
    request_body = UserRequest,
    responses(
        (status = 200, description = "Updated", body = SysUserView),
        (status = 404, description = "Not Found")
    )
)]
pub async fn update_user(
    caller: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<UserRequest>,
) -> AppResult<Json<SysUserView>> {
    caller.ensure_permission(&*state.repo, PERM_UPDATE).await?;

    let user = users::update(&*state.repo, id, &payload).await?;
    op_log!("update user", "UPDATE", caller.id, id);
    Ok(Json(user))
}

#[utoipa::path(
    delete,
    path = "/admin/users/{id}",
    params(("id" = i64, Path, description = "User ID")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 404, description = "Not Found")
    )
)]
pub async fn delete_user(
    caller: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<StatusCode> {
    caller.ensure_permission(&*state.repo, PERM_DELETE).await?;

    users::delete(&*state.repo, id).await?;
    op_log!("delete user", "DELETE", caller.id, id);
    Ok(StatusCode::NO_CONTENT)
}

/// assign_roles
///
/// [Admin Route] Replaces the role links of a user with the given ids.
#[utoipa::path(
    put,
    path = "/admin/users/{id}/roles",
    params(("id" = i64, Path, description = "User ID")),
    request_body = AssignRolesRequest,
    responses(
        (status = 204, description = "Roles replaced"),
        (status = 404, description = "Not Found")
    )
)]
pub async fn assign_roles(
    caller: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<AssignRolesRequest>,
) -> AppResult<StatusCode> {
    caller.ensure_permission(&*state.repo, PERM_ASSIGN_ROLE).await?;

    users::assign_roles(&*state.repo, id, &payload.role_ids).await?;
    op_log!("assign roles", "GRANT", caller.id, id);
    Ok(StatusCode::NO_CONTENT)
}

/// reset_user
///
/// [Admin Route] Renames the account found by `oldUsername` and sets its email.
#[utoipa::path(
    put,
    path = "/admin/users/rename",
    request_body = ResetUserRequest,
    responses(
        (status = 204, description = "Renamed"),
        (status = 404, description = "Not Found")
    )
)]
pub async fn reset_user(
    caller: AuthUser,
    State(state): State<AppState>,
    Json(payload): Json<ResetUserRequest>,
) -> AppResult<StatusCode> {
    caller.ensure_permission(&*state.repo, PERM_UPDATE).await?;

    users::reset(&*state.repo, &payload).await?;
    op_log!("reset user", "UPDATE", caller.id, payload.old_username.as_str());
    Ok(StatusCode::NO_CONTENT)
}
