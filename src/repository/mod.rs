use crate::{
    error::RepoError,
    menu::PermissionStore,
    models::{
        AuthContent, DepartmentRequest, NavType, NavTypeRequest, NewAuthContent, NewUser,
        PageParam, Paging, RoleInfo, SysDepartment, SysUser, SysUserView, UserRequest,
    },
};
use async_trait::async_trait;
use std::sync::Arc;

mod memory;
mod postgres;

pub use memory::MemoryRepository;
pub use postgres::PostgresRepository;

/// Repository Trait
///
/// Abstract contract for all persistence operations. Handlers and services
/// only see this trait, so the Postgres store and the in-memory store are
/// interchangeable. The `PermissionStore` supertrait is the read side the
/// menu builder consumes.
///
/// **Send + Sync + async_trait** keep `Arc<dyn Repository>` usable across
/// Axum's task boundaries.
#[async_trait]
pub trait Repository: PermissionStore + Send + Sync {
    // --- Users ---
    async fn get_user(&self, id: i64) -> Result<Option<SysUser>, RepoError>;
    async fn get_user_by_username(&self, username: &str) -> Result<Option<SysUser>, RepoError>;
    // True when a user already holds either the username or the email.
    async fn user_exists(&self, username: &str, email: &str) -> Result<bool, RepoError>;
    async fn create_user(&self, user: NewUser) -> Result<SysUser, RepoError>;
    // Username and email are always written; optional fields only when `Some`.
    async fn update_user(&self, id: i64, req: &UserRequest) -> Result<bool, RepoError>;
    async fn delete_user(&self, id: i64) -> Result<bool, RepoError>;
    async fn page_users(&self, param: &PageParam) -> Result<Paging<SysUserView>, RepoError>;
    async fn rename_user(
        &self,
        old_username: &str,
        new_username: &str,
        email: &str,
    ) -> Result<bool, RepoError>;

    // --- Roles & Permissions ---
    // Enabled roles linked to the user.
    async fn get_user_roles(&self, user_id: i64) -> Result<Vec<RoleInfo>, RepoError>;
    async fn get_user_role_ids(&self, user_id: i64) -> Result<Vec<i64>, RepoError>;
    // Deletes every link of the user, then inserts the given ones.
    async fn replace_user_roles(&self, user_id: i64, role_ids: &[i64]) -> Result<(), RepoError>;
    async fn is_role_enabled(&self, role_id: i64) -> Result<bool, RepoError>;
    // Distinct non-empty permission codes reachable through the user's enabled roles.
    async fn permission_codes_for_user(&self, user_id: i64) -> Result<Vec<String>, RepoError>;

    // --- Departments ---
    async fn create_department(&self, req: &DepartmentRequest) -> Result<SysDepartment, RepoError>;
    async fn update_department(
        &self,
        id: i64,
        req: &DepartmentRequest,
    ) -> Result<Option<SysDepartment>, RepoError>;
    async fn delete_department(&self, id: i64) -> Result<bool, RepoError>;
    async fn get_department(&self, id: i64) -> Result<Option<SysDepartment>, RepoError>;
    async fn page_departments(&self, param: &PageParam)
    -> Result<Paging<SysDepartment>, RepoError>;
    async fn is_department_enabled(&self, id: i64) -> Result<bool, RepoError>;
    // Enabled departments ordered by `sort`.
    async fn list_enabled_departments(&self) -> Result<Vec<SysDepartment>, RepoError>;

    // --- Navigation categories ---
    async fn create_nav_type(&self, req: &NavTypeRequest, creator: i64)
    -> Result<NavType, RepoError>;
    async fn update_nav_type(
        &self,
        id: i64,
        req: &NavTypeRequest,
        modifier: i64,
    ) -> Result<Option<NavType>, RepoError>;
    async fn delete_nav_type(&self, id: i64) -> Result<bool, RepoError>;
    async fn get_nav_type(&self, id: i64) -> Result<Option<NavType>, RepoError>;
    async fn page_nav_types(&self, param: &PageParam) -> Result<Paging<NavType>, RepoError>;
    // Every category ordered by `sort`.
    async fn list_nav_types(&self) -> Result<Vec<NavType>, RepoError>;

    // --- Auth content ---
    // Rows matching the (project_type, content_type, content_name) triple; a
    // `None` project type only matches rows without one.
    async fn find_auth_content(
        &self,
        project_type: Option<&str>,
        content_type: &str,
        content_name: &str,
    ) -> Result<Vec<AuthContent>, RepoError>;
    async fn create_auth_content(&self, content: &NewAuthContent)
    -> Result<AuthContent, RepoError>;
    async fn update_auth_content(
        &self,
        id: i64,
        content: &NewAuthContent,
    ) -> Result<Option<AuthContent>, RepoError>;
}

/// RepositoryState
///
/// The shared handle to the persistence layer held by `AppState`.
pub type RepositoryState = Arc<dyn Repository>;
