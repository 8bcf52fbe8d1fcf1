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
    models::{DepartmentRequest, DepartmentTreeNode, PageParam, Paging, SysDepartment},
    services::departments::{self, PERM_ADD, PERM_DELETE, PERM_UPDATE},
};

/// save_department
///
/// [Admin Route] Creates a department. Ids are always assigned by the store.
#[utoipa::path(
    post,
    path = "/admin/departments",
    request_body = DepartmentRequest,
    responses((status = 201, description = "Created", body = SysDepartment))
)]
pub async fn save_department(
    caller: AuthUser,
    State(state): State<AppState>,
    Json(payload): Json<DepartmentRequest>,
) -> AppResult<(StatusCode, Json<SysDepartment>)> {
    caller.ensure_permission(&*state.repo, PERM_ADD).await?;

    let dept = departments::save(&*state.repo, &payload).await?;
    op_log!("add department", "ADD", caller.id, dept.id);
    Ok((StatusCode::CREATED, Json(dept)))
}

#[utoipa::path(
    put,
    path = "/admin/departments/{id}",
    params(("id" = i64, Path, description = "Department ID")),
    request_body = DepartmentRequest,
    responses(
        (status = 200, description = "Updated", body = SysDepartment),
        (status = 404, description = "Not Found")
    )
)]
pub async fn update_department(
    caller: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<DepartmentRequest>,
) -> AppResult<Json<SysDepartment>> {
    caller.ensure_permission(&*state.repo, PERM_UPDATE).await?;

    let dept = departments::update(&*state.repo, id, &payload).await?;
    op_log!("update department", "UPDATE", caller.id, id);
    Ok(Json(dept))
}

#[utoipa::path(
    delete,
    path = "/admin/departments/{id}",
    params(("id" = i64, Path, description = "Department ID")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 404, description = "Not Found")
    )
)]
pub async fn delete_department(
    caller: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<StatusCode> {
    caller.ensure_permission(&*state.repo, PERM_DELETE).await?;

    departments::delete(&*state.repo, id).await?;
    op_log!("delete department", "DELETE", caller.id, id);
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    get,
    path = "/admin/departments/{id}",
    params(("id" = i64, Path, description = "Department ID")),
    responses(
        (status = 200, description = "Found", body = SysDepartment),
        (status = 404, description = "Not Found")
    )
)]
pub async fn get_department(
    _caller: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<Json<SysDepartment>> {
    Ok(Json(departments::get(&*state.repo, id).await?))
}

#[utoipa::path(
    get,
    path = "/admin/departments",
    params(PageParam),
    responses((status = 200, description = "Page of departments", body = Paging<SysDepartment>))
)]
pub async fn list_departments(
    _caller: AuthUser,
    State(state): State<AppState>,
    Query(param): Query<PageParam>,
) -> AppResult<Json<Paging<SysDepartment>>> {
    Ok(Json(departments::page(&*state.repo, &param).await?))
}

/// is_department_enabled
///
/// [Admin Route] `true` only when the department exists with status enabled.
#[utoipa::path(
    get,
    path = "/admin/departments/{id}/enabled",
    params(("id" = i64, Path, description = "Department ID")),
    responses((status = 200, description = "Enabled flag", body = bool))
)]
pub async fn is_department_enabled(
    _caller: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<Json<bool>> {
    Ok(Json(departments::is_enabled(&*state.repo, id).await?))
}

#[utoipa::path(
    get,
    path = "/admin/departments/enabled",
    responses((status = 200, description = "Enabled departments", body = [SysDepartment]))
)]
pub async fn list_enabled_departments(
    _caller: AuthUser,
    State(state): State<AppState>,
) -> AppResult<Json<Vec<SysDepartment>>> {
    Ok(Json(departments::list_enabled(&*state.repo).await?))
}

#[utoipa::path(
    get,
    path = "/admin/departments/tree",
    responses((status = 200, description = "Enabled department hierarchy", body = [DepartmentTreeNode]))
)]
pub async fn department_tree(
    _caller: AuthUser,
    State(state): State<AppState>,
) -> AppResult<Json<Vec<DepartmentTreeNode>>> {
    Ok(Json(departments::tree(&*state.repo).await?))
}
