use axum::{Json, extract::State};

use crate::{
    AppState,
    auth::AuthUser,
    error::AppResult,
    models::{LoginRequest, LoginResponse, RouteItem, UserInfo},
    services::users,
};

/// login
///
/// [Public Route] Exchanges a username and password for a bearer token.
#[utoipa::path(
    post,
    path = "/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Token issued", body = LoginResponse),
        (status = 401, description = "Bad credentials or disabled account")
    )
)]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> AppResult<Json<LoginResponse>> {
    let response = users::login(&*state.repo, &state.config, &payload).await?;
    Ok(Json(response))
}

/// get_me
///
/// [Authenticated Route] Profile of the caller with its enabled roles.
#[utoipa::path(
    get,
    path = "/me",
    responses((status = 200, description = "Profile", body = UserInfo))
)]
pub async fn get_me(caller: AuthUser, State(state): State<AppState>) -> AppResult<Json<UserInfo>> {
    Ok(Json(users::user_info(&*state.repo, &caller).await?))
}

/// get_menu
///
/// [Authenticated Route] The navigation menu of the caller, assembled from
/// the permissions its roles grant. Admins see every menu entry.
#[utoipa::path(
    get,
    path = "/menu",
    responses(
        (status = 200, description = "Menu tree", body = [RouteItem]),
        (status = 503, description = "Permission lookup unavailable")
    )
)]
pub async fn get_menu(
    AuthUser { roles, .. }: AuthUser,
    State(state): State<AppState>,
) -> AppResult<Json<Vec<RouteItem>>> {
    Ok(Json(users::menu(&*state.repo, &roles).await?))
}

/// get_perm_codes
///
/// [Authenticated Route] Button-level permission codes granted to the caller.
#[utoipa::path(
    get,
    path = "/perm-codes",
    responses((status = 200, description = "Permission codes", body = [String]))
)]
pub async fn get_perm_codes(
    AuthUser { id, .. }: AuthUser,
    State(state): State<AppState>,
) -> AppResult<Json<Vec<String>>> {
    Ok(Json(users::perm_codes(&*state.repo, id).await?))
}
