use crate::{
    error::{AppError, AppResult},
    models::{AuthContent, AuthContentRequest, NewAuthContent},
    repository::Repository,
};

pub const PERM_ADD: &str = "sys:content:add";
pub const PERM_UPDATE: &str = "sys:content:update";

pub const MISSING_PARAMS: &str = "missing parameters";
pub const DUPLICATE_CONTENT: &str = "duplicate content";

/// Checks the three required fields. A blank `project_type` is stored as absent.
pub fn validate(req: &AuthContentRequest) -> AppResult<NewAuthContent> {
    fn required(value: &Option<String>) -> AppResult<String> {
        value
            .as_deref()
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(str::to_string)
            .ok_or_else(|| AppError::BadRequest(MISSING_PARAMS.to_string()))
    }

    Ok(NewAuthContent {
        project_type: req
            .project_type
            .as_deref()
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(str::to_string),
        content_type: required(&req.content_type)?,
        content_name: required(&req.content_name)?,
        content_value: required(&req.content_value)?,
    })
}

async fn duplicates(repo: &dyn Repository, content: &NewAuthContent) -> AppResult<Vec<AuthContent>> {
    Ok(repo
        .find_auth_content(
            content.project_type.as_deref(),
            &content.content_type,
            &content.content_name,
        )
        .await?)
}

pub async fn save(repo: &dyn Repository, req: &AuthContentRequest) -> AppResult<AuthContent> {
    let content = validate(req)?;
    if !duplicates(repo, &content).await?.is_empty() {
        return Err(AppError::Conflict(DUPLICATE_CONTENT.to_string()));
    }
    Ok(repo.create_auth_content(&content).await?)
}

/// Updating a row to its own key is not a duplicate.
pub async fn update(
    repo: &dyn Repository,
    id: i64,
    req: &AuthContentRequest,
) -> AppResult<AuthContent> {
    let content = validate(req)?;
    if duplicates(repo, &content)
        .await?
        .iter()
        .any(|existing| existing.id != id)
    {
        return Err(AppError::Conflict(DUPLICATE_CONTENT.to_string()));
    }

    repo.update_auth_content(id, &content)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("auth content {id} not found")))
}
