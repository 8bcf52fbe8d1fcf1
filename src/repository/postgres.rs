use std::collections::HashSet;

use async_trait::async_trait;
use sqlx::{FromRow, PgPool, Postgres, postgres::PgRow, query_builder::QueryBuilder};

use super::Repository;
use crate::{
    error::RepoError,
    menu::{PermissionRecord, PermissionStore},
    models::{
        AuthContent, DepartmentRequest, NavType, NavTypeRequest, NewAuthContent, NewUser,
        PageParam, Paging, RoleInfo, STATUS_ENABLED, SysDepartment, SysUser, SysUserView,
        UserRequest,
    },
};

/// PostgresRepository
///
/// The `Repository` implementation backed by PostgreSQL. All queries are
/// runtime-checked and parameterized; dynamic filters go through
/// `QueryBuilder::push_bind`.
pub struct PostgresRepository {
    pool: PgPool,
}

impl PostgresRepository {
    /// Creates a new repository instance using the initialized connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Appends `WHERE (a ILIKE $n OR b ILIKE $n ...)` when a keyword is present.
fn push_keyword(builder: &mut QueryBuilder<'_, Postgres>, columns: &[&str], keyword: Option<&str>) {
    let Some(keyword) = keyword else {
        return;
    };
    let pattern = format!("%{keyword}%");

    builder.push(" WHERE (");
    for (i, column) in columns.iter().enumerate() {
        if i > 0 {
            builder.push(" OR ");
        }
        builder.push(*column).push(" ILIKE ").push_bind(pattern.clone());
    }
    builder.push(")");
}

/// Runs the count and the page query of a listing, newest rows first.
async fn fetch_page<T>(
    pool: &PgPool,
    select: &str,
    table: &str,
    keyword_columns: &[&str],
    param: &PageParam,
) -> Result<Paging<T>, RepoError>
where
    T: for<'r> FromRow<'r, PgRow> + Send + Unpin,
{
    let mut count = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM ");
    count.push(table);
    push_keyword(&mut count, keyword_columns, param.keyword());
    let total = count.build_query_scalar::<i64>().fetch_one(pool).await?;

    let mut rows = QueryBuilder::<Postgres>::new(select);
    rows.push(" FROM ").push(table);
    push_keyword(&mut rows, keyword_columns, param.keyword());
    rows.push(" ORDER BY create_time DESC, id DESC LIMIT ")
        .push_bind(param.page_size())
        .push(" OFFSET ")
        .push_bind(param.offset());
    let records = rows.build_query_as::<T>().fetch_all(pool).await?;

    Ok(Paging::new(param, total, records))
}

#[async_trait]
impl PermissionStore for PostgresRepository {
    async fn list_permissions(&self) -> Result<Vec<PermissionRecord>, RepoError> {
        let records = sqlx::query_as::<_, PermissionRecord>(
            r#"
            SELECT id, parent_id, level, sort, name, icon, route_path, component,
                   is_ext, frame, keep_alive, is_show
            FROM sys_permission
            ORDER BY sort ASC, id ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(records)
    }

    async fn list_permission_ids_for_roles(
        &self,
        role_ids: &[i64],
    ) -> Result<HashSet<i64>, RepoError> {
        let ids = sqlx::query_scalar::<_, i64>(
            "SELECT DISTINCT permission_id FROM sys_role_permission WHERE role_id = ANY($1)",
        )
        .bind(role_ids)
        .fetch_all(&self.pool)
        .await?;
        Ok(ids.into_iter().collect())
    }
}

#[async_trait]
impl Repository for PostgresRepository {
    // --- USERS ---

    async fn get_user(&self, id: i64) -> Result<Option<SysUser>, RepoError> {
        let user = sqlx::query_as::<_, SysUser>(
            r#"SELECT id, username, nickname, pwd, email, phone, avatar, dept_id, status,
                      create_time, update_time
               FROM sys_user WHERE id = $1"#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    async fn get_user_by_username(&self, username: &str) -> Result<Option<SysUser>, RepoError> {
        let user = sqlx::query_as::<_, SysUser>(
            r#"SELECT id, username, nickname, pwd, email, phone, avatar, dept_id, status,
                      create_time, update_time
               FROM sys_user WHERE username = $1"#,
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    async fn user_exists(&self, username: &str, email: &str) -> Result<bool, RepoError> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM sys_user WHERE username = $1 OR email = $2)",
        )
        .bind(username)
        .bind(email)
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }

    /// create_user
    ///
    /// Inserts a fully resolved user; defaults and hashing happen before this call.
    async fn create_user(&self, user: NewUser) -> Result<SysUser, RepoError> {
        let created = sqlx::query_as::<_, SysUser>(
            r#"
            INSERT INTO sys_user (username, nickname, pwd, email, phone, avatar, dept_id, status,
                                  create_time, update_time)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, NOW(), NOW())
            RETURNING id, username, nickname, pwd, email, phone, avatar, dept_id, status,
                      create_time, update_time
            "#,
        )
        .bind(user.username)
        .bind(user.nickname)
        .bind(user.pwd)
        .bind(user.email)
        .bind(user.phone)
        .bind(user.avatar)
        .bind(user.dept_id)
        .bind(user.status)
        .fetch_one(&self.pool)
        .await?;
        Ok(created)
    }

    /// update_user
    ///
    /// Uses `COALESCE` so that optional fields are only written when provided.
    async fn update_user(&self, id: i64, req: &UserRequest) -> Result<bool, RepoError> {
        let result = sqlx::query(
            r#"
            UPDATE sys_user
            SET username = $2,
                email = $3,
                nickname = COALESCE($4, nickname),
                phone = COALESCE($5, phone),
                avatar = COALESCE($6, avatar),
                dept_id = COALESCE($7, dept_id),
                status = COALESCE($8, status),
                update_time = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(&req.username)
        .bind(&req.email)
        .bind(req.nickname.as_deref())
        .bind(req.phone.as_deref())
        .bind(req.avatar.as_deref())
        .bind(req.dept_id)
        .bind(req.status)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete_user(&self, id: i64) -> Result<bool, RepoError> {
        let result = sqlx::query("DELETE FROM sys_user WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn page_users(&self, param: &PageParam) -> Result<Paging<SysUserView>, RepoError> {
        fetch_page(
            &self.pool,
            "SELECT id, username, nickname, email, phone, avatar, dept_id, status, create_time",
            "sys_user",
            &["username", "nickname"],
            param,
        )
        .await
    }

    async fn rename_user(
        &self,
        old_username: &str,
        new_username: &str,
        email: &str,
    ) -> Result<bool, RepoError> {
        let result = sqlx::query(
            "UPDATE sys_user SET username = $2, email = $3, update_time = NOW() WHERE username = $1",
        )
        .bind(old_username)
        .bind(new_username)
        .bind(email)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    // --- ROLES & PERMISSIONS ---

    async fn get_user_roles(&self, user_id: i64) -> Result<Vec<RoleInfo>, RepoError> {
        let roles = sqlx::query_as::<_, RoleInfo>(
            r#"
            SELECT r.id, r.name, r.value
            FROM sys_role r
            JOIN sys_user_role ur ON ur.role_id = r.id
            WHERE ur.user_id = $1 AND r.status = $2
            ORDER BY r.id
            "#,
        )
        .bind(user_id)
        .bind(STATUS_ENABLED)
        .fetch_all(&self.pool)
        .await?;
        Ok(roles)
    }

    async fn get_user_role_ids(&self, user_id: i64) -> Result<Vec<i64>, RepoError> {
        let ids = sqlx::query_scalar::<_, i64>(
            "SELECT role_id FROM sys_user_role WHERE user_id = $1 ORDER BY role_id",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(ids)
    }

    /// replace_user_roles
    ///
    /// Delete-then-insert inside one transaction so a reader never observes a
    /// user with half of its links.
    async fn replace_user_roles(&self, user_id: i64, role_ids: &[i64]) -> Result<(), RepoError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM sys_user_role WHERE user_id = $1")
            .bind(user_id)
            .execute(&mut *tx)
            .await?;

        if !role_ids.is_empty() {
            sqlx::query(
                r#"
                INSERT INTO sys_user_role (user_id, role_id)
                SELECT $1, role_id FROM UNNEST($2::BIGINT[]) AS t(role_id)
                ON CONFLICT DO NOTHING
                "#,
            )
            .bind(user_id)
            .bind(role_ids)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    async fn is_role_enabled(&self, role_id: i64) -> Result<bool, RepoError> {
        let enabled = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM sys_role WHERE id = $1 AND status = $2)",
        )
        .bind(role_id)
        .bind(STATUS_ENABLED)
        .fetch_one(&self.pool)
        .await?;
        Ok(enabled)
    }

    async fn permission_codes_for_user(&self, user_id: i64) -> Result<Vec<String>, RepoError> {
        let codes = sqlx::query_scalar::<_, String>(
            r#"
            SELECT DISTINCT p.code
            FROM sys_permission p
            JOIN sys_role_permission rp ON rp.permission_id = p.id
            JOIN sys_user_role ur ON ur.role_id = rp.role_id
            JOIN sys_role r ON r.id = ur.role_id
            WHERE ur.user_id = $1 AND r.status = $2
              AND p.code IS NOT NULL AND p.code <> ''
            ORDER BY p.code
            "#,
        )
        .bind(user_id)
        .bind(STATUS_ENABLED)
        .fetch_all(&self.pool)
        .await?;
        Ok(codes)
    }

    // --- DEPARTMENTS ---

    async fn create_department(&self, req: &DepartmentRequest) -> Result<SysDepartment, RepoError> {
        let dept = sqlx::query_as::<_, SysDepartment>(
            r#"
            INSERT INTO sys_department (parent_id, name, sort, status, remark, create_time, update_time)
            VALUES ($1, $2, $3, COALESCE($4, 1), $5, NOW(), NOW())
            RETURNING id, parent_id, name, sort, status, remark, create_time, update_time
            "#,
        )
        .bind(req.parent_id)
        .bind(&req.name)
        .bind(req.sort)
        .bind(req.status)
        .bind(req.remark.as_deref())
        .fetch_one(&self.pool)
        .await?;
        Ok(dept)
    }

    async fn update_department(
        &self,
        id: i64,
        req: &DepartmentRequest,
    ) -> Result<Option<SysDepartment>, RepoError> {
        let dept = sqlx::query_as::<_, SysDepartment>(
            r#"
            UPDATE sys_department
            SET parent_id = COALESCE($2, parent_id),
                name = $3,
                sort = $4,
                status = COALESCE($5, status),
                remark = COALESCE($6, remark),
                update_time = NOW()
            WHERE id = $1
            RETURNING id, parent_id, name, sort, status, remark, create_time, update_time
            "#,
        )
        .bind(id)
        .bind(req.parent_id)
        .bind(&req.name)
        .bind(req.sort)
        .bind(req.status)
        .bind(req.remark.as_deref())
        .fetch_optional(&self.pool)
        .await?;
        Ok(dept)
    }

    async fn delete_department(&self, id: i64) -> Result<bool, RepoError> {
        let result = sqlx::query("DELETE FROM sys_department WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn get_department(&self, id: i64) -> Result<Option<SysDepartment>, RepoError> {
        let dept = sqlx::query_as::<_, SysDepartment>(
            r#"SELECT id, parent_id, name, sort, status, remark, create_time, update_time
               FROM sys_department WHERE id = $1"#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(dept)
    }

    async fn page_departments(
        &self,
        param: &PageParam,
    ) -> Result<Paging<SysDepartment>, RepoError> {
        fetch_page(
            &self.pool,
            "SELECT id, parent_id, name, sort, status, remark, create_time, update_time",
            "sys_department",
            &["name"],
            param,
        )
        .await
    }

    async fn is_department_enabled(&self, id: i64) -> Result<bool, RepoError> {
        let enabled = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM sys_department WHERE id = $1 AND status = $2)",
        )
        .bind(id)
        .bind(STATUS_ENABLED)
        .fetch_one(&self.pool)
        .await?;
        Ok(enabled)
    }

    async fn list_enabled_departments(&self) -> Result<Vec<SysDepartment>, RepoError> {
        let depts = sqlx::query_as::<_, SysDepartment>(
            r#"SELECT id, parent_id, name, sort, status, remark, create_time, update_time
               FROM sys_department WHERE status = $1 ORDER BY sort ASC, id ASC"#,
        )
        .bind(STATUS_ENABLED)
        .fetch_all(&self.pool)
        .await?;
        Ok(depts)
    }

    // --- NAVIGATION CATEGORIES ---

    async fn create_nav_type(
        &self,
        req: &NavTypeRequest,
        creator: i64,
    ) -> Result<NavType, RepoError> {
        let nav = sqlx::query_as::<_, NavType>(
            r#"
            INSERT INTO nav_type (parent_id, name, sort, description, creator, create_time, update_time)
            VALUES ($1, $2, $3, $4, $5, NOW(), NOW())
            RETURNING id, parent_id, name, sort, description, creator, modifier, create_time, update_time
            "#,
        )
        .bind(req.parent_id)
        .bind(&req.name)
        .bind(req.sort)
        .bind(req.description.as_deref())
        .bind(creator)
        .fetch_one(&self.pool)
        .await?;
        Ok(nav)
    }

    async fn update_nav_type(
        &self,
        id: i64,
        req: &NavTypeRequest,
        modifier: i64,
    ) -> Result<Option<NavType>, RepoError> {
        let nav = sqlx::query_as::<_, NavType>(
            r#"
            UPDATE nav_type
            SET parent_id = COALESCE($2, parent_id),
                name = $3,
                sort = $4,
                description = COALESCE($5, description),
                modifier = $6,
                update_time = NOW()
            WHERE id = $1
            RETURNING id, parent_id, name, sort, description, creator, modifier, create_time, update_time
            "#,
        )
        .bind(id)
        .bind(req.parent_id)
        .bind(&req.name)
        .bind(req.sort)
        .bind(req.description.as_deref())
        .bind(modifier)
        .fetch_optional(&self.pool)
        .await?;
        Ok(nav)
    }

    async fn delete_nav_type(&self, id: i64) -> Result<bool, RepoError> {
        let result = sqlx::query("DELETE FROM nav_type WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn get_nav_type(&self, id: i64) -> Result<Option<NavType>, RepoError> {
        let nav = sqlx::query_as::<_, NavType>(
            r#"SELECT id, parent_id, name, sort, description, creator, modifier, create_time, update_time
               FROM nav_type WHERE id = $1"#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(nav)
    }

    async fn page_nav_types(&self, param: &PageParam) -> Result<Paging<NavType>, RepoError> {
        fetch_page(
            &self.pool,
            "SELECT id, parent_id, name, sort, description, creator, modifier, create_time, update_time",
            "nav_type",
            &["name"],
            param,
        )
        .await
    }

    async fn list_nav_types(&self) -> Result<Vec<NavType>, RepoError> {
        let navs = sqlx::query_as::<_, NavType>(
            r#"SELECT id, parent_id, name, sort, description, creator, modifier, create_time, update_time
               FROM nav_type ORDER BY sort ASC, id ASC"#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(navs)
    }

    // --- AUTH CONTENT ---

    async fn find_auth_content(
        &self,
        project_type: Option<&str>,
        content_type: &str,
        content_name: &str,
    ) -> Result<Vec<AuthContent>, RepoError> {
        let rows = sqlx::query_as::<_, AuthContent>(
            r#"
            SELECT id, project_type, content_type, content_name, content_value
            FROM auth_content
            WHERE project_type IS NOT DISTINCT FROM $1
              AND content_type = $2
              AND content_name = $3
            "#,
        )
        .bind(project_type)
        .bind(content_type)
        .bind(content_name)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn create_auth_content(
        &self,
        content: &NewAuthContent,
    ) -> Result<AuthContent, RepoError> {
        let row = sqlx::query_as::<_, AuthContent>(
            r#"
            INSERT INTO auth_content (project_type, content_type, content_name, content_value,
                                      create_time, update_time)
            VALUES ($1, $2, $3, $4, NOW(), NOW())
            RETURNING id, project_type, content_type, content_name, content_value
            "#,
        )
        .bind(content.project_type.as_deref())
        .bind(&content.content_type)
        .bind(&content.content_name)
        .bind(&content.content_value)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    async fn update_auth_content(
        &self,
        id: i64,
        content: &NewAuthContent,
    ) -> Result<Option<AuthContent>, RepoError> {
        let row = sqlx::query_as::<_, AuthContent>(
            r#"
            UPDATE auth_content
            SET project_type = $2,
                content_type = $3,
                content_name = $4,
                content_value = $5,
                update_time = NOW()
            WHERE id = $1
            RETURNING id, project_type, content_type, content_name, content_value
            "#,
        )
        .bind(id)
        .bind(content.project_type.as_deref())
        .bind(&content.content_type)
        .bind(&content.content_name)
        .bind(&content.content_value)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }
}
