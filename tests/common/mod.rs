#![allow(dead_code)]

use chrono::{TimeZone, Utc};
use dice_admin::{
    AppState,
    auth::AuthUser,
    config::{AppConfig, Env},
    menu::{MenuLevel, PermissionRecord},
    models::{RoleInfo, STATUS_ENABLED, SysDepartment, SysRole, SysUser},
    password,
    repository::{MemoryRepository, RepositoryState},
};
use std::sync::Arc;

pub const ADMIN_ID: i64 = 1;
pub const EDITOR_ID: i64 = 2;
pub const GUEST_ID: i64 = 3;

pub const ADMIN_ROLE_ID: i64 = 10;
pub const EDITOR_ROLE_ID: i64 = 20;

pub const TEST_PASSWORD: &str = "correct-horse";

pub fn perm(id: i64, parent_id: Option<i64>, level: MenuLevel, sort: i32, route_path: &str) -> PermissionRecord {
    PermissionRecord {
        id,
        parent_id,
        level,
        sort,
        name: format!("menu-{id}"),
        icon: None,
        route_path: route_path.to_string(),
        component: Some(format!("/{route_path}/index")),
        is_ext: false,
        frame: false,
        keep_alive: false,
        is_show: true,
    }
}

pub fn role(id: i64, value: &str) -> SysRole {
    SysRole {
        id,
        name: value.to_string(),
        value: value.to_string(),
        status: STATUS_ENABLED,
    }
}

pub fn role_info(id: i64, value: &str) -> RoleInfo {
    RoleInfo {
        id,
        name: value.to_string(),
        value: value.to_string(),
    }
}

/// An enabled user whose password is `TEST_PASSWORD`.
pub fn user(id: i64, username: &str) -> SysUser {
    let stamp = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap() + chrono::Duration::minutes(id);
    SysUser {
        id,
        username: username.to_string(),
        nickname: Some(username.to_uppercase()),
        pwd: password::hash_password(TEST_PASSWORD).unwrap(),
        email: format!("{username}@dice.test"),
        phone: Some("13812345678".to_string()),
        avatar: None,
        dept_id: None,
        status: STATUS_ENABLED,
        create_time: stamp,
        update_time: stamp,
    }
}

pub fn department(id: i64, parent_id: Option<i64>, sort: i32, status: i32) -> SysDepartment {
    let stamp = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap() + chrono::Duration::minutes(id);
    SysDepartment {
        id,
        parent_id,
        name: format!("dept-{id}"),
        sort,
        status,
        remark: None,
        create_time: stamp,
        update_time: stamp,
    }
}

/// Admin, an editor holding `nav:type:add` through role 20, and a guest
/// without roles. The menu has a dashboard section with one page.
pub fn seeded_repo() -> MemoryRepository {
    MemoryRepository::new()
        .with_role(role(ADMIN_ROLE_ID, "admin"))
        .with_role(role(EDITOR_ROLE_ID, "editor"))
        .with_user(user(ADMIN_ID, "root"), &[ADMIN_ROLE_ID])
        .with_user(user(EDITOR_ID, "editor"), &[EDITOR_ROLE_ID])
        .with_user(user(GUEST_ID, "guest"), &[])
        .with_permission(perm(100, None, MenuLevel::One, 1, "dashboard"), None)
        .with_permission(perm(101, Some(100), MenuLevel::Two, 1, "overview"), None)
        .with_permission(
            perm(102, Some(101), MenuLevel::Three, 1, ""),
            Some("nav:type:add"),
        )
        .with_role_permission(EDITOR_ROLE_ID, 100)
        .with_role_permission(EDITOR_ROLE_ID, 102)
}

pub fn test_config() -> AppConfig {
    AppConfig::default()
}

pub fn state_with(repo: MemoryRepository, env: Env) -> AppState {
    AppState {
        repo: Arc::new(repo) as RepositoryState,
        config: AppConfig {
            env,
            ..test_config()
        },
    }
}

pub fn caller(id: i64, roles: Vec<RoleInfo>) -> AuthUser {
    AuthUser {
        id,
        username: format!("user-{id}"),
        roles,
    }
}

pub fn admin() -> AuthUser {
    caller(ADMIN_ID, vec![role_info(ADMIN_ROLE_ID, "admin")])
}

pub fn editor() -> AuthUser {
    caller(EDITOR_ID, vec![role_info(EDITOR_ROLE_ID, "editor")])
}

pub fn guest() -> AuthUser {
    caller(GUEST_ID, vec![])
}
