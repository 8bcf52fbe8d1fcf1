use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};

use super::op_log;
use crate::{
    AppState,
    auth::AuthUser,
    error::AppResult,
    models::{AuthContent, AuthContentRequest},
    services::auth_content::{self, PERM_ADD, PERM_UPDATE},
};

/// save_auth_content
///
/// [Admin Route] Stores a content entry keyed by
/// (projectType, contentType, contentName).
#[utoipa::path(
    post,
    path = "/admin/auth-contents",
    request_body = AuthContentRequest,
    responses(
        (status = 201, description = "Created", body = AuthContent),
        (status = 400, description = "Missing parameters"),
        (status = 409, description = "Duplicate content")
    )
)]
pub async fn save_auth_content(
    caller: AuthUser,
    State(state): State<AppState>,
    Json(payload): Json<AuthContentRequest>,
) -> AppResult<(StatusCode, Json<AuthContent>)> {
    caller.ensure_permission(&*state.repo, PERM_ADD).await?;

    let content = auth_content::save(&*state.repo, &payload).await?;
    op_log!("add auth content", "ADD", caller.id, content.id);
    Ok((StatusCode::CREATED, Json(content)))
}

#[utoipa::path(
    put,
    path = "/admin/auth-contents/{id}",
    params(("id" = i64, Path, description = "Auth content ID")),
    request_body = AuthContentRequest,
    responses(
        (status = 200, description = "Updated", body = AuthContent),
        (status = 400, description = "Missing parameters"),
        (status = 404, description = "Not Found"),
        (status = 409, description = "Duplicate content")
    )
)]
pub async fn update_auth_content(
    caller: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<AuthContentRequest>,
) -> AppResult<Json<AuthContent>> {
    caller.ensure_permission(&*state.repo, PERM_UPDATE).await?;

    let content = auth_content::update(&*state.repo, id, &payload).await?;
    op_log!("update auth content", "UPDATE", caller.id, id);
    Ok(Json(content))
}
