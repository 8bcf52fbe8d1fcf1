use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use ts_rs::TS;
use utoipa::{IntoParams, ToSchema};

/// Status code shared by users, roles and departments for an enabled row.
pub const STATUS_ENABLED: i32 = 1;
/// Status code for a disabled row.
pub const STATUS_DISABLED: i32 = 0;

// --- Identity (sys_user / sys_role) ---

/// SysUser
///
/// Canonical row of the `sys_user` table. Carries the password hash, so it is
/// never serialized as-is; handlers answer with `SysUserView` or `UserInfo`.
#[derive(Debug, Clone, FromRow, Default)]
pub struct SysUser {
    pub id: i64,
    pub username: String,
    pub nickname: Option<String>,
    pub pwd: String,
    pub email: String,
    pub phone: Option<String>,
    pub avatar: Option<String>,
    pub dept_id: Option<i64>,
    pub status: i32,
    pub create_time: DateTime<Utc>,
    pub update_time: DateTime<Utc>,
}

impl SysUser {
    pub fn is_enabled(&self) -> bool {
        self.status == STATUS_ENABLED
    }
}

/// SysUserView
///
/// Listing/detail projection of a user. The password column is not selected
/// and `role_ids` is filled from `sys_user_role` after the row is loaded.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct SysUserView {
    pub id: i64,
    pub username: String,
    pub nickname: Option<String>,
    pub email: String,
    pub phone: Option<String>,
    pub avatar: Option<String>,
    pub dept_id: Option<i64>,
    pub status: i32,
    #[ts(type = "string")]
    pub create_time: DateTime<Utc>,
    #[sqlx(skip)]
    pub role_ids: Vec<i64>,
}

impl From<&SysUser> for SysUserView {
    fn from(user: &SysUser) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            nickname: user.nickname.clone(),
            email: user.email.clone(),
            phone: user.phone.clone(),
            avatar: user.avatar.clone(),
            dept_id: user.dept_id,
            status: user.status,
            create_time: user.create_time,
            role_ids: Vec::new(),
        }
    }
}

/// SysRole
///
/// Row of the `sys_role` table. `value` is the machine name; the value
/// `"admin"` is the sentinel that bypasses permission filtering.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct SysRole {
    pub id: i64,
    pub name: String,
    pub value: String,
    pub status: i32,
}

/// RoleInfo
///
/// The slice of a role carried by an authenticated principal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct RoleInfo {
    pub id: i64,
    pub name: String,
    pub value: String,
}

/// UserInfo
///
/// Output of `GET /me`: the caller's profile plus resolved roles.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct UserInfo {
    pub id: i64,
    pub username: String,
    pub nickname: Option<String>,
    pub email: String,
    pub avatar: Option<String>,
    pub roles: Vec<RoleInfo>,
}

// --- Request Payloads ---

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct LoginResponse {
    pub token: String,
    pub user_id: i64,
    pub username: String,
    pub roles: Vec<RoleInfo>,
}

/// UserRequest
///
/// Payload for both creating and updating a user. On create a blank
/// `password` falls back to the configured initial password; on update the
/// password is left untouched. `role_ids: None` keeps the existing links on
/// update, `Some(vec![])` clears them.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct UserRequest {
    pub username: String,
    #[serde(default)]
    pub nickname: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub avatar: Option<String>,
    #[serde(default)]
    pub dept_id: Option<i64>,
    #[serde(default)]
    pub status: Option<i32>,
    #[serde(default)]
    pub role_ids: Option<Vec<i64>>,
}

/// NewUser
///
/// Fully resolved insert for `sys_user`: defaults applied, password hashed.
#[derive(Debug, Clone, Default)]
pub struct NewUser {
    pub username: String,
    pub nickname: Option<String>,
    pub pwd: String,
    pub email: String,
    pub phone: Option<String>,
    pub avatar: Option<String>,
    pub dept_id: Option<i64>,
    pub status: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct AssignRolesRequest {
    pub role_ids: Vec<i64>,
}

/// ResetUserRequest
///
/// Renames the account identified by `old_username` and sets its email.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct ResetUserRequest {
    pub old_username: String,
    pub new_username: String,
    pub email: String,
}

// --- Departments ---

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct SysDepartment {
    pub id: i64,
    pub parent_id: Option<i64>,
    pub name: String,
    pub sort: i32,
    pub status: i32,
    pub remark: Option<String>,
    #[ts(type = "string")]
    pub create_time: DateTime<Utc>,
    #[ts(type = "string")]
    pub update_time: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct DepartmentRequest {
    #[serde(default)]
    pub parent_id: Option<i64>,
    pub name: String,
    #[serde(default)]
    pub sort: i32,
    #[serde(default)]
    pub status: Option<i32>,
    #[serde(default)]
    pub remark: Option<String>,
}

/// DepartmentTreeNode
///
/// One node of the enabled-department hierarchy (`GET /admin/departments/tree`).
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct DepartmentTreeNode {
    pub id: i64,
    pub parent_id: Option<i64>,
    pub name: String,
    pub sort: i32,
    pub status: i32,
    #[schema(no_recursion)]
    pub children: Vec<DepartmentTreeNode>,
}

impl From<SysDepartment> for DepartmentTreeNode {
    fn from(dept: SysDepartment) -> Self {
        Self {
            id: dept.id,
            parent_id: dept.parent_id,
            name: dept.name,
            sort: dept.sort,
            status: dept.status,
            children: Vec::new(),
        }
    }
}

// --- Navigation categories ---

/// NavType
///
/// A category of navigation links (`nav_type`). Categories nest through
/// `parent_id`; `creator`/`modifier` record the acting user ids.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct NavType {
    pub id: i64,
    pub parent_id: Option<i64>,
    pub name: String,
    pub sort: i32,
    pub description: Option<String>,
    pub creator: Option<i64>,
    pub modifier: Option<i64>,
    #[ts(type = "string")]
    pub create_time: DateTime<Utc>,
    #[ts(type = "string")]
    pub update_time: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct NavTypeRequest {
    #[serde(default)]
    pub parent_id: Option<i64>,
    pub name: String,
    #[serde(default)]
    pub sort: i32,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct NavTypeTreeNode {
    pub id: i64,
    pub parent_id: Option<i64>,
    pub name: String,
    pub sort: i32,
    pub description: Option<String>,
    #[schema(no_recursion)]
    pub children: Vec<NavTypeTreeNode>,
}

impl From<NavType> for NavTypeTreeNode {
    fn from(nav: NavType) -> Self {
        Self {
            id: nav.id,
            parent_id: nav.parent_id,
            name: nav.name,
            sort: nav.sort,
            description: nav.description,
            children: Vec::new(),
        }
    }
}

// --- Auth content ---

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct AuthContent {
    pub id: i64,
    pub project_type: Option<String>,
    pub content_type: String,
    pub content_name: String,
    pub content_value: String,
}

/// AuthContentRequest
///
/// All content fields are optional on the wire so that a missing one can be
/// reported as a domain error rather than a deserialization failure.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct AuthContentRequest {
    #[serde(default)]
    pub project_type: Option<String>,
    #[serde(default)]
    pub content_type: Option<String>,
    #[serde(default)]
    pub content_name: Option<String>,
    #[serde(default)]
    pub content_value: Option<String>,
}

/// NewAuthContent
///
/// An `AuthContentRequest` whose required fields have been checked.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct NewAuthContent {
    pub project_type: Option<String>,
    pub content_type: String,
    pub content_name: String,
    pub content_value: String,
}

// --- Menu (router) output ---

/// RouteMeta
///
/// Display metadata of a menu node. Optional flags are omitted from the JSON
/// entirely when they do not apply to the node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct RouteMeta {
    pub title: String,
    pub icon: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frame_src: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ignore_keep_alive: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hide_menu: Option<bool>,
}

/// RouteItem
///
/// One node of the caller's navigation menu (`GET /menu`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct RouteItem {
    pub path: String,
    pub component: Option<String>,
    pub name: String,
    pub meta: RouteMeta,
    #[schema(no_recursion)]
    pub children: Vec<RouteItem>,
}

// --- Pagination ---

const DEFAULT_PAGE_SIZE: i64 = 10;
const MAX_PAGE_SIZE: i64 = 100;

fn default_page_index() -> i64 {
    1
}

fn default_page_size() -> i64 {
    DEFAULT_PAGE_SIZE
}

/// PageParam
///
/// Query parameters accepted by every paginated listing.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
#[ts(export)]
pub struct PageParam {
    /// 1-based page number.
    #[serde(default = "default_page_index")]
    pub page_index: i64,
    #[serde(default = "default_page_size")]
    pub page_size: i64,
    /// Optional case-insensitive filter on the listing's name column.
    #[serde(default)]
    pub keyword: Option<String>,
}

impl Default for PageParam {
    fn default() -> Self {
        Self {
            page_index: default_page_index(),
            page_size: default_page_size(),
            keyword: None,
        }
    }
}

impl PageParam {
    pub fn page_index(&self) -> i64 {
        self.page_index.max(1)
    }

    pub fn page_size(&self) -> i64 {
        self.page_size.clamp(1, MAX_PAGE_SIZE)
    }

    pub fn offset(&self) -> i64 {
        (self.page_index() - 1).saturating_mul(self.page_size())
    }

    /// The keyword trimmed, or `None` when it is blank.
    pub fn keyword(&self) -> Option<&str> {
        self.keyword
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
    }
}

/// Paging
///
/// One page of a listing plus the total number of matching rows.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Paging<T> {
    pub total: i64,
    pub page_index: i64,
    pub page_size: i64,
    pub records: Vec<T>,
}

impl<T> Paging<T> {
    pub fn new(param: &PageParam, total: i64, records: Vec<T>) -> Self {
        Self {
            total,
            page_index: param.page_index(),
            page_size: param.page_size(),
            records,
        }
    }
}
