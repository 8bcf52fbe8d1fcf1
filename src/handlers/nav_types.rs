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
    models::{NavType, NavTypeRequest, NavTypeTreeNode, PageParam, Paging},
    services::nav_types::{self, PERM_ADD, PERM_DELETE, PERM_UPDATE},
};

/// add_nav_type
///
/// [Admin Route] Creates a navigation category; the caller is recorded as creator.
#[utoipa::path(
    post,
    path = "/admin/nav-types",
    request_body = NavTypeRequest,
    responses(
        (status = 201, description = "Created", body = NavType),
        (status = 403, description = "Missing nav:type:add")
    )
)]
pub async fn add_nav_type(
    caller: AuthUser,
    State(state): State<AppState>,
    Json(payload): Json<NavTypeRequest>,
) -> AppResult<(StatusCode, Json<NavType>)> {
    caller.ensure_permission(&*state.repo, PERM_ADD).await?;

    let nav = nav_types::add(&*state.repo, &payload, caller.id).await?;
    op_log!("add nav type", "ADD", caller.id, nav.id);
    Ok((StatusCode::CREATED, Json(nav)))
}

/// update_nav_type
///
/// [Admin Route] Replaces a category's fields; the caller is recorded as modifier.
#[utoipa::path(
    put,
    path = "/admin/nav-types/{id}",
    params(("id" = i64, Path, description = "Nav type ID")),
    request_body = NavTypeRequest,
    responses(
        (status = 200, description = "Updated", body = NavType),
        (status = 404, description = "Not Found")
    )
)]
pub async fn update_nav_type(
    caller: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<NavTypeRequest>,
) -> AppResult<Json<NavType>> {
    caller.ensure_permission(&*state.repo, PERM_UPDATE).await?;

    let nav = nav_types::update(&*state.repo, id, &payload, caller.id).await?;
    op_log!("update nav type", "UPDATE", caller.id, id);
    Ok(Json(nav))
}

#[utoipa::path(
    delete,
    path = "/admin/nav-types/{id}",
    params(("id" = i64, Path, description = "Nav type ID")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 404, description = "Not Found")
    )
)]
pub async fn delete_nav_type(
    caller: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<StatusCode> {
    caller.ensure_permission(&*state.repo, PERM_DELETE).await?;

    nav_types::delete(&*state.repo, id).await?;
    op_log!("delete nav type", "DELETE", caller.id, id);
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    get,
    path = "/admin/nav-types/{id}",
    params(("id" = i64, Path, description = "Nav type ID")),
    responses(
        (status = 200, description = "Found", body = NavType),
        (status = 404, description = "Not Found")
    )
)]
pub async fn get_nav_type(
    _caller: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<Json<NavType>> {
    Ok(Json(nav_types::info(&*state.repo, id).await?))
}

/// list_nav_types
///
/// [Admin Route] Paginated listing, newest first, optional `keyword` on name.
#[utoipa::path(
    get,
    path = "/admin/nav-types",
    params(PageParam),
    responses((status = 200, description = "Page of nav types", body = Paging<NavType>))
)]
pub async fn list_nav_types(
    _caller: AuthUser,
    State(state): State<AppState>,
    Query(param): Query<PageParam>,
) -> AppResult<Json<Paging<NavType>>> {
    Ok(Json(nav_types::page(&*state.repo, &param).await?))
}

#[utoipa::path(
    get,
    path = "/admin/nav-types/tree",
    responses((status = 200, description = "Nav type hierarchy", body = [NavTypeTreeNode]))
)]
pub async fn nav_type_tree(
    _caller: AuthUser,
    State(state): State<AppState>,
) -> AppResult<Json<Vec<NavTypeTreeNode>>> {
    Ok(Json(nav_types::tree(&*state.repo).await?))
}
