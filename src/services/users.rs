use crate::{
    auth::{AuthUser, issue_token},
    config::AppConfig,
    error::{AppError, AppResult},
    menu::PermissionMenuBuilder,
    models::{
        LoginRequest, LoginResponse, NewUser, PageParam, Paging, ResetUserRequest, RoleInfo,
        RouteItem, STATUS_ENABLED, SysUserView, UserInfo, UserRequest,
    },
    password,
    repository::Repository,
    services::require_text,
};

pub const PERM_ADD: &str = "sys:user:add";
pub const PERM_UPDATE: &str = "sys:user:update";
pub const PERM_DELETE: &str = "sys:user:delete";
pub const PERM_ASSIGN_ROLE: &str = "sys:user:assign";

/// mask_phone
///
/// Keeps the first three and last four characters and stars out everything
/// between them: `13812345678` becomes `138****5678`. The length never
/// changes. Values shorter than eight characters are returned unchanged.
pub fn mask_phone(phone: &str) -> String {
    let len = phone.chars().count();
    if len < 8 {
        return phone.to_string();
    }

    phone
        .chars()
        .enumerate()
        .map(|(i, c)| if i < 3 || i >= len - 4 { c } else { '*' })
        .collect()
}

fn user_not_found(id: i64) -> AppError {
    AppError::NotFound(format!("user {id} not found"))
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// login
///
/// Unknown user, disabled user and wrong password all answer `401` with no
/// hint of which one failed.
pub async fn login(
    repo: &dyn Repository,
    config: &AppConfig,
    req: &LoginRequest,
) -> AppResult<LoginResponse> {
    let Some(user) = repo.get_user_by_username(req.username.trim()).await? else {
        tracing::info!(username = %req.username, "login rejected: unknown user");
        return Err(AppError::Unauthorized);
    };

    if !user.is_enabled() || !password::verify_password(&req.password, &user.pwd) {
        tracing::info!(user_id = user.id, "login rejected");
        return Err(AppError::Unauthorized);
    }

    let roles = repo.get_user_roles(user.id).await?;
    let token = issue_token(user.id, config)?;

    tracing::info!(user_id = user.id, "login succeeded");
    Ok(LoginResponse {
        token,
        user_id: user.id,
        username: user.username,
        roles,
    })
}

pub async fn user_info(repo: &dyn Repository, caller: &AuthUser) -> AppResult<UserInfo> {
    let user = repo
        .get_user(caller.id)
        .await?
        .ok_or_else(|| user_not_found(caller.id))?;

    Ok(UserInfo {
        id: user.id,
        username: user.username,
        nickname: user.nickname,
        email: user.email,
        avatar: user.avatar,
        roles: caller.roles.clone(),
    })
}

/// The navigation menu visible to `roles`.
pub async fn menu(repo: &dyn Repository, roles: &[RoleInfo]) -> AppResult<Vec<RouteItem>> {
    Ok(PermissionMenuBuilder::new(repo).menu_for(roles).await?)
}

pub async fn perm_codes(repo: &dyn Repository, user_id: i64) -> AppResult<Vec<String>> {
    Ok(repo.permission_codes_for_user(user_id).await?)
}

pub async fn page(repo: &dyn Repository, param: &PageParam) -> AppResult<Paging<SysUserView>> {
    let paging = repo.page_users(param).await?;

    let mut records = Vec::with_capacity(paging.records.len());
    for mut user in paging.records.iter().cloned() {
        user.phone = user.phone.as_deref().map(mask_phone);
        user.role_ids = repo.get_user_role_ids(user.id).await?;
        records.push(user);
    }

    Ok(Paging { records, ..paging })
}

pub async fn get(repo: &dyn Repository, id: i64) -> AppResult<SysUserView> {
    let user = repo.get_user(id).await?.ok_or_else(|| user_not_found(id))?;
    let mut view = SysUserView::from(&user);
    view.role_ids = repo.get_user_role_ids(id).await?;
    Ok(view)
}

/// check_department_and_role
///
/// The department must be given, exist and be enabled. The role must exist
/// and be enabled.
pub async fn check_department_and_role(
    repo: &dyn Repository,
    dept_id: Option<i64>,
    role_id: i64,
) -> AppResult<()> {
    let Some(dept_id) = dept_id else {
        return Err(AppError::BadRequest("department is missing".to_string()));
    };
    if !repo.is_department_enabled(dept_id).await? {
        return Err(AppError::BadRequest(format!(
            "department {dept_id} is missing or disabled"
        )));
    }
    if !repo.is_role_enabled(role_id).await? {
        return Err(AppError::BadRequest(format!(
            "role {role_id} is missing or disabled"
        )));
    }
    Ok(())
}

/// add
///
/// Creates a user. Blank password and avatar fall back to the configured
/// initial values; the password is stored as an argon2 hash. A failed
/// department/role check is logged and does not abort the creation.
pub async fn add(
    repo: &dyn Repository,
    config: &AppConfig,
    req: &UserRequest,
) -> AppResult<SysUserView> {
    require_text(&req.username, "username")?;
    require_text(&req.email, "email")?;

    if repo.user_exists(&req.username, &req.email).await? {
        return Err(AppError::Conflict(
            "username or email already exists".to_string(),
        ));
    }

    let raw_password = non_blank(req.password.as_deref()).unwrap_or(&config.login_init_password);
    let avatar = non_blank(req.avatar.as_deref()).unwrap_or(&config.login_init_avatar);

    let user = repo
        .create_user(NewUser {
            username: req.username.trim().to_string(),
            nickname: req.nickname.clone(),
            pwd: password::hash_password(raw_password)?,
            email: req.email.trim().to_string(),
            phone: req.phone.clone(),
            avatar: Some(avatar.to_string()),
            dept_id: req.dept_id,
            status: req.status.unwrap_or(STATUS_ENABLED),
        })
        .await?;

    let role_ids = req.role_ids.clone().unwrap_or_default();
    repo.replace_user_roles(user.id, &role_ids).await?;

    for role_id in &role_ids {
        if let Err(e) = check_department_and_role(repo, user.dept_id, *role_id).await {
            tracing::warn!(user_id = user.id, error = %e, "department/role check failed");
        }
    }

    let mut view = SysUserView::from(&user);
    view.role_ids = repo.get_user_role_ids(user.id).await?;
    Ok(view)
}

/// update
///
/// Role links are always rebuilt: a request without `role_ids` leaves the
/// user with no roles.
pub async fn update(repo: &dyn Repository, id: i64, req: &UserRequest) -> AppResult<SysUserView> {
    require_text(&req.username, "username")?;
    require_text(&req.email, "email")?;

    if repo.get_user(id).await?.is_none() {
        return Err(user_not_found(id));
    }
    if !repo.update_user(id, req).await? {
        return Err(user_not_found(id));
    }
    let role_ids = req.role_ids.as_deref().unwrap_or_default();
    repo.replace_user_roles(id, role_ids).await?;

    get(repo, id).await
}

pub async fn delete(repo: &dyn Repository, id: i64) -> AppResult<()> {
    if repo.delete_user(id).await? {
        Ok(())
    } else {
        Err(user_not_found(id))
    }
}

/// Replaces every role link of the user with `role_ids`.
pub async fn assign_roles(repo: &dyn Repository, id: i64, role_ids: &[i64]) -> AppResult<()> {
    if repo.get_user(id).await?.is_none() {
        return Err(user_not_found(id));
    }
    repo.replace_user_roles(id, role_ids).await?;
    Ok(())
}

pub async fn reset(repo: &dyn Repository, req: &ResetUserRequest) -> AppResult<()> {
    require_text(&req.new_username, "newUsername")?;
    require_text(&req.email, "email")?;

    if repo
        .rename_user(&req.old_username, &req.new_username, &req.email)
        .await?
    {
        Ok(())
    } else {
        Err(AppError::NotFound(format!(
            "user {} not found",
            req.old_username
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mask_phone() {
        assert_eq!(mask_phone("13812345678"), "138****5678");
        assert_eq!(mask_phone("12345678"), "123*5678");
        assert_eq!(mask_phone("0123456789"), "012***6789");
        assert_eq!(mask_phone("1234567"), "1234567");
        assert_eq!(mask_phone(""), "");
    }
}
