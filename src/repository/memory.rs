use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use super::Repository;
use crate::{
    error::RepoError,
    menu::{PermissionRecord, PermissionStore},
    models::{
        AuthContent, DepartmentRequest, NavType, NavTypeRequest, NewAuthContent, NewUser,
        PageParam, Paging, RoleInfo, STATUS_ENABLED, SysDepartment, SysRole, SysUser,
        SysUserView, UserRequest,
    },
};

#[derive(Default)]
struct MemoryState {
    users: Vec<SysUser>,
    roles: Vec<SysRole>,
    // (user_id, role_id)
    user_roles: Vec<(i64, i64)>,
    permissions: Vec<PermissionRecord>,
    permission_codes: HashMap<i64, String>,
    // (role_id, permission_id)
    role_permissions: Vec<(i64, i64)>,
    departments: Vec<SysDepartment>,
    nav_types: Vec<NavType>,
    auth_contents: Vec<AuthContent>,
    fail_permission_lookup: bool,
}

impl MemoryState {
    fn enabled_role_ids_of(&self, user_id: i64) -> HashSet<i64> {
        self.user_roles
            .iter()
            .filter(|(uid, _)| *uid == user_id)
            .map(|(_, rid)| *rid)
            .filter(|rid| {
                self.roles
                    .iter()
                    .any(|r| r.id == *rid && r.status == STATUS_ENABLED)
            })
            .collect()
    }
}

/// MemoryRepository
///
/// A `Repository` held entirely in process memory. Used by the test suites
/// and for running the router without a database. Seed it with the `with_*`
/// builders before sharing it.
#[derive(Default)]
pub struct MemoryRepository {
    state: RwLock<MemoryState>,
}

fn next_id<T>(rows: &[T], id: impl Fn(&T) -> i64) -> i64 {
    rows.iter().map(id).max().unwrap_or(0) + 1
}

fn matches_keyword(keyword: Option<&str>, fields: &[Option<&str>]) -> bool {
    let Some(keyword) = keyword else {
        return true;
    };
    let needle = keyword.to_lowercase();
    fields
        .iter()
        .flatten()
        .any(|field| field.to_lowercase().contains(&needle))
}

/// Slices one page out of an already filtered listing, newest first.
fn page_of<T>(
    mut rows: Vec<T>,
    param: &PageParam,
    order_key: impl Fn(&T) -> (chrono::DateTime<Utc>, i64),
) -> Paging<T> {
    rows.sort_by_key(|row| std::cmp::Reverse(order_key(row)));
    let total = rows.len() as i64;
    let records = rows
        .into_iter()
        .skip(param.offset() as usize)
        .take(param.page_size() as usize)
        .collect();
    Paging::new(param, total, records)
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_user(mut self, user: SysUser, role_ids: &[i64]) -> Self {
        let state = self.state.get_mut();
        state
            .user_roles
            .extend(role_ids.iter().map(|rid| (user.id, *rid)));
        state.users.push(user);
        self
    }

    pub fn with_role(mut self, role: SysRole) -> Self {
        self.state.get_mut().roles.push(role);
        self
    }

    pub fn with_permission(mut self, record: PermissionRecord, code: Option<&str>) -> Self {
        let state = self.state.get_mut();
        if let Some(code) = code {
            state.permission_codes.insert(record.id, code.to_string());
        }
        state.permissions.push(record);
        self
    }

    pub fn with_role_permission(mut self, role_id: i64, permission_id: i64) -> Self {
        self.state
            .get_mut()
            .role_permissions
            .push((role_id, permission_id));
        self
    }

    pub fn with_department(mut self, dept: SysDepartment) -> Self {
        self.state.get_mut().departments.push(dept);
        self
    }

    pub fn with_nav_type(mut self, nav: NavType) -> Self {
        self.state.get_mut().nav_types.push(nav);
        self
    }

    pub fn with_auth_content(mut self, content: AuthContent) -> Self {
        self.state.get_mut().auth_contents.push(content);
        self
    }

    /// Makes every role -> permission lookup fail with `RepoError::Unavailable`.
    pub fn failing_permission_lookup(mut self) -> Self {
        self.state.get_mut().fail_permission_lookup = true;
        self
    }
}

#[async_trait]
impl PermissionStore for MemoryRepository {
    async fn list_permissions(&self) -> Result<Vec<PermissionRecord>, RepoError> {
        Ok(self.state.read().await.permissions.clone())
    }

    async fn list_permission_ids_for_roles(
        &self,
        role_ids: &[i64],
    ) -> Result<HashSet<i64>, RepoError> {
        let state = self.state.read().await;
        if state.fail_permission_lookup {
            return Err(RepoError::Unavailable(
                "role permission lookup failed".to_string(),
            ));
        }

        Ok(state
            .role_permissions
            .iter()
            .filter(|(rid, _)| role_ids.contains(rid))
            .map(|(_, pid)| *pid)
            .collect())
    }
}

#[async_trait]
impl Repository for MemoryRepository {
    async fn get_user(&self, id: i64) -> Result<Option<SysUser>, RepoError> {
        let state = self.state.read().await;
        Ok(state.users.iter().find(|u| u.id == id).cloned())
    }

    async fn get_user_by_username(&self, username: &str) -> Result<Option<SysUser>, RepoError> {
        let state = self.state.read().await;
        Ok(state.users.iter().find(|u| u.username == username).cloned())
    }

    async fn user_exists(&self, username: &str, email: &str) -> Result<bool, RepoError> {
        let state = self.state.read().await;
        Ok(state
            .users
            .iter()
            .any(|u| u.username == username || u.email == email))
    }

    async fn create_user(&self, user: NewUser) -> Result<SysUser, RepoError> {
        let mut state = self.state.write().await;
        let now = Utc::now();
        let created = SysUser {
            id: next_id(&state.users, |u| u.id),
            username: user.username,
            nickname: user.nickname,
            pwd: user.pwd,
            email: user.email,
            phone: user.phone,
            avatar: user.avatar,
            dept_id: user.dept_id,
            status: user.status,
            create_time: now,
            update_time: now,
        };
        state.users.push(created.clone());
        Ok(created)
    }

    async fn update_user(&self, id: i64, req: &UserRequest) -> Result<bool, RepoError> {
        let mut state = self.state.write().await;
        let Some(user) = state.users.iter_mut().find(|u| u.id == id) else {
            return Ok(false);
        };

        user.username = req.username.clone();
        user.email = req.email.clone();
        if let Some(nickname) = &req.nickname {
            user.nickname = Some(nickname.clone());
        }
        if let Some(phone) = &req.phone {
            user.phone = Some(phone.clone());
        }
        if let Some(avatar) = &req.avatar {
            user.avatar = Some(avatar.clone());
        }
        if let Some(dept_id) = req.dept_id {
            user.dept_id = Some(dept_id);
        }
        if let Some(status) = req.status {
            user.status = status;
        }
        user.update_time = Utc::now();
        Ok(true)
    }

    async fn delete_user(&self, id: i64) -> Result<bool, RepoError> {
        let mut state = self.state.write().await;
        let before = state.users.len();
        state.users.retain(|u| u.id != id);
        let deleted = state.users.len() != before;
        if deleted {
            state.user_roles.retain(|(uid, _)| *uid != id);
        }
        Ok(deleted)
    }

    async fn page_users(&self, param: &PageParam) -> Result<Paging<SysUserView>, RepoError> {
        let state = self.state.read().await;
        let rows: Vec<SysUserView> = state
            .users
            .iter()
            .filter(|u| {
                matches_keyword(
                    param.keyword(),
                    &[Some(u.username.as_str()), u.nickname.as_deref()],
                )
            })
            .map(SysUserView::from)
            .collect();
        Ok(page_of(rows, param, |u| (u.create_time, u.id)))
    }

    async fn rename_user(
        &self,
        old_username: &str,
        new_username: &str,
        email: &str,
    ) -> Result<bool, RepoError> {
        let mut state = self.state.write().await;
        let Some(user) = state.users.iter_mut().find(|u| u.username == old_username) else {
            return Ok(false);
        };
        user.username = new_username.to_string();
        user.email = email.to_string();
        user.update_time = Utc::now();
        Ok(true)
    }

    async fn get_user_roles(&self, user_id: i64) -> Result<Vec<RoleInfo>, RepoError> {
        let state = self.state.read().await;
        let enabled = state.enabled_role_ids_of(user_id);
        let mut roles: Vec<RoleInfo> = state
            .roles
            .iter()
            .filter(|r| enabled.contains(&r.id))
            .map(|r| RoleInfo {
                id: r.id,
                name: r.name.clone(),
                value: r.value.clone(),
            })
            .collect();
        roles.sort_by_key(|r| r.id);
        Ok(roles)
    }

    async fn get_user_role_ids(&self, user_id: i64) -> Result<Vec<i64>, RepoError> {
        let state = self.state.read().await;
        let mut ids: Vec<i64> = state
            .user_roles
            .iter()
            .filter(|(uid, _)| *uid == user_id)
            .map(|(_, rid)| *rid)
            .collect();
        ids.sort_unstable();
        ids.dedup();
        Ok(ids)
    }

    async fn replace_user_roles(&self, user_id: i64, role_ids: &[i64]) -> Result<(), RepoError> {
        let mut state = self.state.write().await;
        state.user_roles.retain(|(uid, _)| *uid != user_id);
        let mut seen = HashSet::new();
        for rid in role_ids {
            if seen.insert(*rid) {
                state.user_roles.push((user_id, *rid));
            }
        }
        Ok(())
    }

    async fn is_role_enabled(&self, role_id: i64) -> Result<bool, RepoError> {
        let state = self.state.read().await;
        Ok(state
            .roles
            .iter()
            .any(|r| r.id == role_id && r.status == STATUS_ENABLED))
    }

    async fn permission_codes_for_user(&self, user_id: i64) -> Result<Vec<String>, RepoError> {
        let state = self.state.read().await;
        let role_ids = state.enabled_role_ids_of(user_id);

        let mut codes: Vec<String> = state
            .role_permissions
            .iter()
            .filter(|(rid, _)| role_ids.contains(rid))
            .filter_map(|(_, pid)| state.permission_codes.get(pid))
            .filter(|code| !code.is_empty())
            .cloned()
            .collect();
        codes.sort();
        codes.dedup();
        Ok(codes)
    }

    async fn create_department(&self, req: &DepartmentRequest) -> Result<SysDepartment, RepoError> {
        let mut state = self.state.write().await;
        let now = Utc::now();
        let dept = SysDepartment {
            id: next_id(&state.departments, |d| d.id),
            parent_id: req.parent_id,
            name: req.name.clone(),
            sort: req.sort,
            status: req.status.unwrap_or(STATUS_ENABLED),
            remark: req.remark.clone(),
            create_time: now,
            update_time: now,
        };
        state.departments.push(dept.clone());
        Ok(dept)
    }

    async fn update_department(
        &self,
        id: i64,
        req: &DepartmentRequest,
    ) -> Result<Option<SysDepartment>, RepoError> {
        let mut state = self.state.write().await;
        let Some(dept) = state.departments.iter_mut().find(|d| d.id == id) else {
            return Ok(None);
        };
        if req.parent_id.is_some() {
            dept.parent_id = req.parent_id;
        }
        dept.name = req.name.clone();
        dept.sort = req.sort;
        if let Some(status) = req.status {
            dept.status = status;
        }
        if req.remark.is_some() {
            dept.remark = req.remark.clone();
        }
        dept.update_time = Utc::now();
        Ok(Some(dept.clone()))
    }

    async fn delete_department(&self, id: i64) -> Result<bool, RepoError> {
        let mut state = self.state.write().await;
        let before = state.departments.len();
        state.departments.retain(|d| d.id != id);
        Ok(state.departments.len() != before)
    }

    async fn get_department(&self, id: i64) -> Result<Option<SysDepartment>, RepoError> {
        let state = self.state.read().await;
        Ok(state.departments.iter().find(|d| d.id == id).cloned())
    }

    async fn page_departments(
        &self,
        param: &PageParam,
    ) -> Result<Paging<SysDepartment>, RepoError> {
        let state = self.state.read().await;
        let rows: Vec<SysDepartment> = state
            .departments
            .iter()
            .filter(|d| matches_keyword(param.keyword(), &[Some(d.name.as_str())]))
            .cloned()
            .collect();
        Ok(page_of(rows, param, |d| (d.create_time, d.id)))
    }

    async fn is_department_enabled(&self, id: i64) -> Result<bool, RepoError> {
        let state = self.state.read().await;
        Ok(state
            .departments
            .iter()
            .any(|d| d.id == id && d.status == STATUS_ENABLED))
    }

    async fn list_enabled_departments(&self) -> Result<Vec<SysDepartment>, RepoError> {
        let state = self.state.read().await;
        let mut depts: Vec<SysDepartment> = state
            .departments
            .iter()
            .filter(|d| d.status == STATUS_ENABLED)
            .cloned()
            .collect();
        depts.sort_by_key(|d| (d.sort, d.id));
        Ok(depts)
    }

    async fn create_nav_type(
        &self,
        req: &NavTypeRequest,
        creator: i64,
    ) -> Result<NavType, RepoError> {
        let mut state = self.state.write().await;
        let now = Utc::now();
        let nav = NavType {
            id: next_id(&state.nav_types, |n| n.id),
            parent_id: req.parent_id,
            name: req.name.clone(),
            sort: req.sort,
            description: req.description.clone(),
            creator: Some(creator),
            modifier: None,
            create_time: now,
            update_time: now,
        };
        state.nav_types.push(nav.clone());
        Ok(nav)
    }

    async fn update_nav_type(
        &self,
        id: i64,
        req: &NavTypeRequest,
        modifier: i64,
    ) -> Result<Option<NavType>, RepoError> {
        let mut state = self.state.write().await;
        let Some(nav) = state.nav_types.iter_mut().find(|n| n.id == id) else {
            return Ok(None);
        };
        if req.parent_id.is_some() {
            nav.parent_id = req.parent_id;
        }
        nav.name = req.name.clone();
        nav.sort = req.sort;
        if req.description.is_some() {
            nav.description = req.description.clone();
        }
        nav.modifier = Some(modifier);
        nav.update_time = Utc::now();
        Ok(Some(nav.clone()))
    }

    async fn delete_nav_type(&self, id: i64) -> Result<bool, RepoError> {
        let mut state = self.state.write().await;
        let before = state.nav_types.len();
        state.nav_types.retain(|n| n.id != id);
        Ok(state.nav_types.len() != before)
    }

    async fn get_nav_type(&self, id: i64) -> Result<Option<NavType>, RepoError> {
        let state = self.state.read().await;
        Ok(state.nav_types.iter().find(|n| n.id == id).cloned())
    }

    async fn page_nav_types(&self, param: &PageParam) -> Result<Paging<NavType>, RepoError> {
        let state = self.state.read().await;
        let rows: Vec<NavType> = state
            .nav_types
            .iter()
            .filter(|n| matches_keyword(param.keyword(), &[Some(n.name.as_str())]))
            .cloned()
            .collect();
        Ok(page_of(rows, param, |n| (n.create_time, n.id)))
    }

    async fn list_nav_types(&self) -> Result<Vec<NavType>, RepoError> {
        let state = self.state.read().await;
        let mut navs = state.nav_types.clone();
        navs.sort_by_key(|n| (n.sort, n.id));
        Ok(navs)
    }

    async fn find_auth_content(
        &self,
        project_type: Option<&str>,
        content_type: &str,
        content_name: &str,
    ) -> Result<Vec<AuthContent>, RepoError> {
        let state = self.state.read().await;
        Ok(state
            .auth_contents
            .iter()
            .filter(|c| {
                c.project_type.as_deref() == project_type
                    && c.content_type == content_type
                    && c.content_name == content_name
            })
            .cloned()
            .collect())
    }

    async fn create_auth_content(
        &self,
        content: &NewAuthContent,
    ) -> Result<AuthContent, RepoError> {
        let mut state = self.state.write().await;
        let row = AuthContent {
            id: next_id(&state.auth_contents, |c| c.id),
            project_type: content.project_type.clone(),
            content_type: content.content_type.clone(),
            content_name: content.content_name.clone(),
            content_value: content.content_value.clone(),
        };
        state.auth_contents.push(row.clone());
        Ok(row)
    }

    async fn update_auth_content(
        &self,
        id: i64,
        content: &NewAuthContent,
    ) -> Result<Option<AuthContent>, RepoError> {
        let mut state = self.state.write().await;
        let Some(row) = state.auth_contents.iter_mut().find(|c| c.id == id) else {
            return Ok(None);
        };
        row.project_type = content.project_type.clone();
        row.content_type = content.content_type.clone();
        row.content_name = content.content_name.clone();
        row.content_value = content.content_value.clone();
        Ok(Some(row.clone()))
    }
}
