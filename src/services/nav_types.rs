use crate::{
    error::{AppError, AppResult},
    models::{NavType, NavTypeRequest, NavTypeTreeNode, PageParam, Paging},
    repository::Repository,
    services::require_text,
    tree,
};

/// Permission codes guarding the mutating nav-type operations.
pub const PERM_ADD: &str = "nav:type:add";
pub const PERM_UPDATE: &str = "nav:type:update";
pub const PERM_DELETE: &str = "nav:type:delete";

pub async fn add(repo: &dyn Repository, req: &NavTypeRequest, creator: i64) -> AppResult<NavType> {
    require_text(&req.name, "name")?;
    Ok(repo.create_nav_type(req, creator).await?)
}

pub async fn update(
    repo: &dyn Repository,
    id: i64,
    req: &NavTypeRequest,
    modifier: i64,
) -> AppResult<NavType> {
    require_text(&req.name, "name")?;
    if req.parent_id == Some(id) {
        return Err(AppError::BadRequest(
            "a nav type cannot be its own parent".to_string(),
        ));
    }

    repo.update_nav_type(id, req, modifier)
        .await?
        .ok_or_else(|| not_found(id))
}

pub async fn delete(repo: &dyn Repository, id: i64) -> AppResult<()> {
    if repo.delete_nav_type(id).await? {
        Ok(())
    } else {
        Err(not_found(id))
    }
}

pub async fn info(repo: &dyn Repository, id: i64) -> AppResult<NavType> {
    repo.get_nav_type(id).await?.ok_or_else(|| not_found(id))
}

pub async fn page(repo: &dyn Repository, param: &PageParam) -> AppResult<Paging<NavType>> {
    Ok(repo.page_nav_types(param).await?)
}

/// All nav types nested by `parent_id`, siblings ordered by `sort`.
pub async fn tree(repo: &dyn Repository) -> AppResult<Vec<NavTypeTreeNode>> {
    let mut navs = repo.list_nav_types().await?;
    navs.sort_by_key(|nav| nav.sort);

    let forest = tree::build_forest(navs.into_iter().map(NavTypeTreeNode::from).collect());
    if !forest.detached.is_empty() {
        tracing::warn!(detached = ?forest.detached, "nav types without a reachable parent");
    }
    Ok(forest.roots)
}

fn not_found(id: i64) -> AppError {
    AppError::NotFound(format!("nav type {id} not found"))
}
