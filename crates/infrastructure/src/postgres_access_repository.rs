use async_trait::async_trait;
use sqlx::{FromRow, PgPool};

use fixhub_application::{
    CreatePermissionInput, CreateRoleInput, MembershipStore, PermissionListQuery, PermissionStore,
    RoleListQuery, RoleStore, UpdatePermissionInput, UpdateRoleInput,
};
use fixhub_core::{AccountId, AppError, AppResult};
use fixhub_domain::{
    CapabilityName, Permission, PermissionId, Role, RoleId, RoleMembership, RoleName,
};

mod memberships;
mod roles;

#[cfg(test)]
mod tests;

/// PostgreSQL-backed access-control store implementing the repository ports.
///
/// Live-name uniqueness is enforced by partial unique indexes over
/// `deleted_at IS NULL` rows, so concurrent writers resolve conflicts in the
/// database rather than in application code.
#[derive(Clone)]
pub struct PostgresAccessRepository {
    pool: PgPool,
}

impl PostgresAccessRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn require_live_role(
        &self,
        executor: impl sqlx::PgExecutor<'_>,
        role_id: RoleId,
    ) -> AppResult<()> {
        let live = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*)
            FROM access_roles
            WHERE id = $1 AND deleted_at IS NULL
            "#,
        )
        .bind(role_id.as_uuid())
        .fetch_one(executor)
        .await
        .map_err(|error| AppError::Internal(format!("failed to resolve role: {error}")))?;

        if live == 0 {
            return Err(AppError::NotFound(format!(
                "role '{role_id}' was not found"
            )));
        }

        Ok(())
    }

    async fn require_live_permission(
        &self,
        executor: impl sqlx::PgExecutor<'_>,
        permission_id: PermissionId,
    ) -> AppResult<()> {
        let live = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*)
            FROM access_permissions
            WHERE id = $1 AND deleted_at IS NULL
            "#,
        )
        .bind(permission_id.as_uuid())
        .fetch_one(executor)
        .await
        .map_err(|error| AppError::Internal(format!("failed to resolve permission: {error}")))?;

        if live == 0 {
            return Err(AppError::NotFound(format!(
                "permission '{permission_id}' was not found"
            )));
        }

        Ok(())
    }
}

#[derive(Debug, FromRow)]
struct PermissionRow {
    id: uuid::Uuid,
    name: String,
    description: Option<String>,
    created_at: chrono::DateTime<chrono::Utc>,
    deleted_at: Option<chrono::DateTime<chrono::Utc>>,
}

#[derive(Debug, FromRow)]
struct RoleRow {
    id: uuid::Uuid,
    name: String,
    description: Option<String>,
    created_at: chrono::DateTime<chrono::Utc>,
    deleted_at: Option<chrono::DateTime<chrono::Utc>>,
}

#[derive(Debug, FromRow)]
struct MembershipRow {
    account_id: uuid::Uuid,
    role_id: uuid::Uuid,
    assigned_at: chrono::DateTime<chrono::Utc>,
}

fn decode_permission(row: PermissionRow) -> AppResult<Permission> {
    let name = CapabilityName::new(row.name.as_str()).map_err(|error| {
        AppError::Internal(format!(
            "invalid stored capability name '{}': {error}",
            row.name
        ))
    })?;

    Ok(Permission::from_parts(
        PermissionId::from_uuid(row.id),
        name,
        row.description,
        row.created_at,
        row.deleted_at,
    ))
}

fn decode_role(row: RoleRow) -> AppResult<Role> {
    let name = RoleName::new(row.name.as_str()).map_err(|error| {
        AppError::Internal(format!("invalid stored role name '{}': {error}", row.name))
    })?;

    Ok(Role::from_parts(
        RoleId::from_uuid(row.id),
        name,
        row.description,
        row.created_at,
        row.deleted_at,
    ))
}

fn map_permission_conflict(error: sqlx::Error, name: &str) -> AppError {
    if let sqlx::Error::Database(database_error) = &error
        && database_error.code().as_deref() == Some("23505")
    {
        return AppError::Conflict(format!("permission '{name}' already exists"));
    }

    AppError::Internal(format!("failed to write permission: {error}"))
}

fn map_role_conflict(error: sqlx::Error, name: &str) -> AppError {
    if let sqlx::Error::Database(database_error) = &error
        && database_error.code().as_deref() == Some("23505")
    {
        return AppError::Conflict(format!("role '{name}' already exists"));
    }

    AppError::Internal(format!("failed to write role: {error}"))
}

fn like_pattern(search: &str) -> String {
    let escaped = search
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");

    format!("%{escaped}%")
}

fn page_bound(value: usize) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

#[async_trait]
impl PermissionStore for PostgresAccessRepository {
    async fn create_permission(&self, input: CreatePermissionInput) -> AppResult<Permission> {
        let permission = Permission::new(input.name, input.description);

        sqlx::query(
            r#"
            INSERT INTO access_permissions (id, name, description, created_at, deleted_at)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(permission.id().as_uuid())
        .bind(permission.name().as_str())
        .bind(permission.description())
        .bind(permission.created_at())
        .bind(permission.deleted_at())
        .execute(&self.pool)
        .await
        .map_err(|error| map_permission_conflict(error, permission.name().as_str()))?;

        Ok(permission)
    }

    async fn update_permission(
        &self,
        permission_id: PermissionId,
        input: UpdatePermissionInput,
    ) -> AppResult<Permission> {
        let row = sqlx::query_as::<_, PermissionRow>(
            r#"
            UPDATE access_permissions
            SET name = $2, description = $3
            WHERE id = $1 AND deleted_at IS NULL
            RETURNING id, name, description, created_at, deleted_at
            "#,
        )
        .bind(permission_id.as_uuid())
        .bind(input.name.as_str())
        .bind(input.description.as_deref())
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| map_permission_conflict(error, input.name.as_str()))?;

        match row {
            Some(row) => decode_permission(row),
            None => Err(AppError::NotFound(format!(
                "permission '{permission_id}' was not found"
            ))),
        }
    }

    async fn find_permission(&self, permission_id: PermissionId) -> AppResult<Permission> {
        let row = sqlx::query_as::<_, PermissionRow>(
            r#"
            SELECT id, name, description, created_at, deleted_at
            FROM access_permissions
            WHERE id = $1 AND deleted_at IS NULL
            "#,
        )
        .bind(permission_id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to load permission: {error}")))?;

        match row {
            Some(row) => decode_permission(row),
            None => Err(AppError::NotFound(format!(
                "permission '{permission_id}' was not found"
            ))),
        }
    }

    async fn find_permission_by_name(
        &self,
        name: &CapabilityName,
    ) -> AppResult<Option<Permission>> {
        let row = sqlx::query_as::<_, PermissionRow>(
            r#"
            SELECT id, name, description, created_at, deleted_at
            FROM access_permissions
            WHERE name = $1 AND deleted_at IS NULL
            "#,
        )
        .bind(name.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to load permission: {error}")))?;

        row.map(decode_permission).transpose()
    }

    async fn list_permissions(&self, query: PermissionListQuery) -> AppResult<Vec<Permission>> {
        let rows = sqlx::query_as::<_, PermissionRow>(
            r#"
            SELECT permissions.id, permissions.name, permissions.description,
                permissions.created_at, permissions.deleted_at
            FROM access_permissions AS permissions
            WHERE ($1 OR permissions.deleted_at IS NULL)
                AND ($2::text IS NULL
                    OR permissions.name ILIKE $2
                    OR permissions.description ILIKE $2)
                AND ($3::uuid IS NULL OR EXISTS (
                    SELECT 1
                    FROM access_role_grants AS grants
                    WHERE grants.permission_id = permissions.id
                        AND grants.role_id = $3
                ))
            ORDER BY permissions.name
            LIMIT $4 OFFSET $5
            "#,
        )
        .bind(query.include_deleted)
        .bind(query.search.as_deref().map(like_pattern))
        .bind(query.granted_to_role.map(|role_id| role_id.as_uuid()))
        .bind(page_bound(query.limit))
        .bind(page_bound(query.offset))
        .fetch_all(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to list permissions: {error}")))?;

        rows.into_iter().map(decode_permission).collect()
    }

    async fn soft_delete_permission(&self, permission_id: PermissionId) -> AppResult<()> {
        let rows_affected = sqlx::query(
            r#"
            UPDATE access_permissions
            SET deleted_at = now()
            WHERE id = $1 AND deleted_at IS NULL
            "#,
        )
        .bind(permission_id.as_uuid())
        .execute(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to delete permission: {error}")))?
        .rows_affected();

        if rows_affected == 0 {
            return Err(AppError::NotFound(format!(
                "permission '{permission_id}' was not found"
            )));
        }

        Ok(())
    }

    async fn restore_permission(&self, permission_id: PermissionId) -> AppResult<Permission> {
        let mut transaction = self
            .pool
            .begin()
            .await
            .map_err(|error| AppError::Internal(format!("failed to begin transaction: {error}")))?;

        let trashed = sqlx::query_as::<_, PermissionRow>(
            r#"
            SELECT id, name, description, created_at, deleted_at
            FROM access_permissions
            WHERE id = $1 AND deleted_at IS NOT NULL
            "#,
        )
        .bind(permission_id.as_uuid())
        .fetch_optional(&mut *transaction)
        .await
        .map_err(|error| AppError::Internal(format!("failed to load permission: {error}")))?
        .ok_or_else(|| {
            AppError::NotFound(format!(
                "soft-deleted permission '{permission_id}' was not found"
            ))
        })?;

        let restored = sqlx::query_as::<_, PermissionRow>(
            r#"
            UPDATE access_permissions
            SET deleted_at = NULL
            WHERE id = $1
            RETURNING id, name, description, created_at, deleted_at
            "#,
        )
        .bind(permission_id.as_uuid())
        .fetch_one(&mut *transaction)
        .await
        .map_err(|error| map_permission_conflict(error, trashed.name.as_str()))?;

        transaction
            .commit()
            .await
            .map_err(|error| AppError::Internal(format!("failed to commit transaction: {error}")))?;

        decode_permission(restored)
    }

    async fn force_delete_permission(&self, permission_id: PermissionId) -> AppResult<Permission> {
        let row = sqlx::query_as::<_, PermissionRow>(
            r#"
            DELETE FROM access_permissions
            WHERE id = $1
            RETURNING id, name, description, created_at, deleted_at
            "#,
        )
        .bind(permission_id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to delete permission: {error}")))?;

        match row {
            Some(row) => decode_permission(row),
            None => Err(AppError::NotFound(format!(
                "permission '{permission_id}' was not found"
            ))),
        }
    }

    async fn list_capability_names(&self) -> AppResult<Vec<CapabilityName>> {
        let names = sqlx::query_scalar::<_, String>(
            r#"
            SELECT name
            FROM access_permissions
            WHERE deleted_at IS NULL
            ORDER BY name
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to list capability names: {error}")))?;

        names
            .into_iter()
            .map(|name| {
                CapabilityName::new(name.as_str()).map_err(|error| {
                    AppError::Internal(format!("invalid stored capability name '{name}': {error}"))
                })
            })
            .collect()
    }
}
