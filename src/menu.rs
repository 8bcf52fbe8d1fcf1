use std::collections::HashSet;

use async_trait::async_trait;
use sqlx::FromRow;
use thiserror::Error;

use crate::{
    error::RepoError,
    models::{RoleInfo, RouteItem, RouteMeta},
    tree::{self, Node},
};

/// Role value that bypasses permission filtering entirely.
pub const ADMIN_ROLE: &str = "admin";

/// Component placeholder the front-end resolves to its layout shell.
pub const LAYOUT_COMPONENT: &str = "LAYOUT";

/// MenuLevel
///
/// Depth class of a permission row. `One` is a top-level section, `Two` a
/// page inside it; `Three` rows are button-level permission codes and never
/// appear in a menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[repr(i32)]
pub enum MenuLevel {
    One = 1,
    Two = 2,
    Three = 3,
}

impl MenuLevel {
    pub fn is_menu(self) -> bool {
        matches!(self, MenuLevel::One | MenuLevel::Two)
    }
}

/// PermissionRecord
///
/// One row of `sys_permission` as loaded for a single menu build.
#[derive(Debug, Clone, FromRow)]
pub struct PermissionRecord {
    pub id: i64,
    pub parent_id: Option<i64>,
    pub level: MenuLevel,
    pub sort: i32,
    pub name: String,
    pub icon: Option<String>,
    pub route_path: String,
    pub component: Option<String>,
    pub is_ext: bool,
    pub frame: bool,
    pub keep_alive: bool,
    pub is_show: bool,
}

#[derive(Debug, Error)]
pub enum MenuError {
    #[error("permission lookup unavailable: {0}")]
    DependencyUnavailable(#[source] RepoError),
}

/// PermissionStore
///
/// Read-only source of permission rows and role -> permission links.
#[async_trait]
pub trait PermissionStore: Send + Sync {
    async fn list_permissions(&self) -> Result<Vec<PermissionRecord>, RepoError>;

    async fn list_permission_ids_for_roles(
        &self,
        role_ids: &[i64],
    ) -> Result<HashSet<i64>, RepoError>;
}

/// Visibility
///
/// Which permission rows a caller may see. Resolved once per build so the
/// assembly below never looks at roles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Visibility {
    AdminBypass,
    RoleFiltered(HashSet<i64>),
}

impl Visibility {
    /// Admin callers skip the lookup. A caller without role ids, or whose roles
    /// map to no permissions, gets an empty set.
    pub async fn resolve<S>(roles: &[RoleInfo], store: &S) -> Result<Self, MenuError>
    where
        S: PermissionStore + ?Sized,
    {
        if roles.iter().any(|role| role.value == ADMIN_ROLE) {
            return Ok(Visibility::AdminBypass);
        }

        let role_ids: Vec<i64> = roles.iter().map(|role| role.id).collect();
        if role_ids.is_empty() {
            return Ok(Visibility::RoleFiltered(HashSet::new()));
        }

        store
            .list_permission_ids_for_roles(&role_ids)
            .await
            .map(Visibility::RoleFiltered)
            .map_err(MenuError::DependencyUnavailable)
    }

    pub fn admits(&self, record: &PermissionRecord) -> bool {
        record.level.is_menu()
            && match self {
                Visibility::AdminBypass => true,
                Visibility::RoleFiltered(ids) => ids.contains(&record.id),
            }
    }
}

/// MenuBuild
///
/// Output of `assemble`. `detached` lists visible record ids that could not
/// be hung under any root (missing parent or parent cycle).
#[derive(Debug)]
pub struct MenuBuild {
    pub routes: Vec<RouteItem>,
    pub detached: Vec<i64>,
}

/// assemble
///
/// Pure menu assembly: filter by visibility, stable-sort by `sort`, index by
/// parent once, then map roots and children recursively.
pub fn assemble(records: &[PermissionRecord], visibility: &Visibility) -> MenuBuild {
    let mut visible: Vec<&PermissionRecord> = records
        .iter()
        .filter(|record| visibility.admits(record))
        .collect();
    visible.sort_by_key(|record| record.sort);

    let forest = tree::build_forest(visible.into_iter().map(Branch::new).collect());

    MenuBuild {
        routes: forest
            .roots
            .iter()
            .map(|branch| route_item(branch, Position::Root))
            .collect(),
        detached: forest.detached,
    }
}

/// PermissionMenuBuilder
///
/// Builds the navigation menu of a caller against an injected permission
/// store. Stateless apart from the borrowed store; one instance may serve
/// any number of concurrent builds.
pub struct PermissionMenuBuilder<'a, S: ?Sized> {
    store: &'a S,
}

impl<'a, S> PermissionMenuBuilder<'a, S>
where
    S: PermissionStore + ?Sized,
{
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// Builds the menu visible to `roles` from an already loaded permission set.
    pub async fn build_menu(
        &self,
        all_permissions: &[PermissionRecord],
        roles: &[RoleInfo],
    ) -> Result<Vec<RouteItem>, MenuError> {
        let visibility = Visibility::resolve(roles, self.store).await?;
        let build = assemble(all_permissions, &visibility);

        if !build.detached.is_empty() {
            tracing::warn!(
                detached = ?build.detached,
                "dropped menu records that are not attached to any root"
            );
        }

        Ok(build.routes)
    }

    /// Loads every permission from the store, then builds the menu for `roles`.
    pub async fn menu_for(&self, roles: &[RoleInfo]) -> Result<Vec<RouteItem>, MenuError> {
        let all_permissions = self
            .store
            .list_permissions()
            .await
            .map_err(MenuError::DependencyUnavailable)?;
        self.build_menu(&all_permissions, roles).await
    }
}

// --- Field mapping ---

struct Branch<'a> {
    record: &'a PermissionRecord,
    children: Vec<Branch<'a>>,
}

impl<'a> Branch<'a> {
    fn new(record: &'a PermissionRecord) -> Self {
        Self {
            record,
            children: Vec::new(),
        }
    }
}

impl Node for Branch<'_> {
    fn id(&self) -> i64 {
        self.record.id
    }

    fn parent_id(&self) -> Option<i64> {
        self.record.parent_id
    }

    fn attach(&mut self, children: Vec<Self>) {
        self.children = children;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Position {
    Root,
    Child,
}

// Roots and children differ on two flags: roots report `ignoreKeepAlive`
// with the stored polarity and no `hideMenu`; children invert
// `ignoreKeepAlive` and always carry `hideMenu`.
fn route_item(branch: &Branch<'_>, position: Position) -> RouteItem {
    let record = branch.record;

    let mut path = match record.level {
        MenuLevel::One => format!("/{}", record.route_path),
        _ => record.route_path.clone(),
    };

    let component = if record.level == MenuLevel::One && record.parent_id.is_none() {
        Some(LAYOUT_COMPONENT.to_string())
    } else {
        record.component.clone()
    };

    let mut meta = RouteMeta {
        title: record.name.clone(),
        icon: record.icon.clone(),
        ..RouteMeta::default()
    };

    if position == Position::Child {
        meta.hide_menu = Some(!record.is_show);
    }

    if record.level == MenuLevel::Two {
        meta.ignore_keep_alive = Some(match position {
            Position::Root => record.keep_alive,
            Position::Child => !record.keep_alive,
        });

        if record.is_ext {
            if record.frame {
                meta.frame_src = record.component.clone();
            } else if let Some(target) = &record.component {
                path = target.clone();
            }
        }
    }

    RouteItem {
        path,
        component,
        name: upper_first(&record.route_path),
        meta,
        children: branch
            .children
            .iter()
            .map(|child| route_item(child, Position::Child))
            .collect(),
    }
}

fn upper_first(value: &str) -> String {
    let mut chars = value.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
