use crate::{
    error::{AppError, AppResult},
    models::{DepartmentRequest, DepartmentTreeNode, PageParam, Paging, SysDepartment},
    repository::Repository,
    services::require_text,
    tree,
};

pub const PERM_ADD: &str = "sys:dept:add";
pub const PERM_UPDATE: &str = "sys:dept:update";
pub const PERM_DELETE: &str = "sys:dept:delete";

pub async fn save(repo: &dyn Repository, req: &DepartmentRequest) -> AppResult<SysDepartment> {
    require_text(&req.name, "name")?;
    Ok(repo.create_department(req).await?)
}

pub async fn update(
    repo: &dyn Repository,
    id: i64,
    req: &DepartmentRequest,
) -> AppResult<SysDepartment> {
    require_text(&req.name, "name")?;
    if req.parent_id == Some(id) {
        return Err(AppError::BadRequest(
            "a department cannot be its own parent".to_string(),
        ));
    }

    repo.update_department(id, req)
        .await?
        .ok_or_else(|| not_found(id))
}

pub async fn delete(repo: &dyn Repository, id: i64) -> AppResult<()> {
    if repo.delete_department(id).await? {
        Ok(())
    } else {
        Err(not_found(id))
    }
}

pub async fn get(repo: &dyn Repository, id: i64) -> AppResult<SysDepartment> {
    repo.get_department(id).await?.ok_or_else(|| not_found(id))
}

pub async fn page(repo: &dyn Repository, param: &PageParam) -> AppResult<Paging<SysDepartment>> {
    Ok(repo.page_departments(param).await?)
}

pub async fn is_enabled(repo: &dyn Repository, id: i64) -> AppResult<bool> {
    Ok(repo.is_department_enabled(id).await?)
}

pub async fn list_enabled(repo: &dyn Repository) -> AppResult<Vec<SysDepartment>> {
    Ok(repo.list_enabled_departments().await?)
}

/// tree
///
/// Hierarchy of the enabled departments. Departments whose parent is
/// disabled or missing are left out; no enabled departments yields `[]`.
pub async fn tree(repo: &dyn Repository) -> AppResult<Vec<DepartmentTreeNode>> {
    let nodes = repo
        .list_enabled_departments()
        .await?
        .into_iter()
        .map(DepartmentTreeNode::from)
        .collect();

    let forest = tree::build_forest(nodes);
    if !forest.detached.is_empty() {
        tracing::debug!(detached = ?forest.detached, "departments outside the enabled tree");
    }
    Ok(forest.roots)
}

fn not_found(id: i64) -> AppError {
    AppError::NotFound(format!("department {id} not found"))
}
