use async_trait::async_trait;

use fixhub_application::AccessDirectory;
use fixhub_core::{AccountId, AppError, AppResult};
use fixhub_domain::{
    CapabilityName, Permission, PermissionId, Role, RoleId, RoleName,
};

use sqlx::{FromRow, PgPool};

/// PostgreSQL-backed read side for authorization checks.
///
/// Query failures surface as `AppError::Unavailable` so the resolver can tell
/// a denied check from one it could not decide.
#[derive(Clone)]
pub struct PostgresAccessDirectory {
    pool: PgPool,
}

impl PostgresAccessDirectory {
    /// Creates a directory with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
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
struct PermissionRow {
    id: uuid::Uuid,
    name: String,
    description: Option<String>,
    created_at: chrono::DateTime<chrono::Utc>,
    deleted_at: Option<chrono::DateTime<chrono::Utc>>,
}

#[async_trait]
impl AccessDirectory for PostgresAccessDirectory {
    async fn find_account_roles(&self, account_id: AccountId) -> AppResult<Vec<Role>> {
        let rows = sqlx::query_as::<_, RoleRow>(
            r#"
            SELECT roles.id, roles.name, roles.description,
                roles.created_at, roles.deleted_at
            FROM access_roles AS roles
            INNER JOIN access_role_memberships AS memberships
                ON memberships.role_id = roles.id
            WHERE memberships.account_id = $1 AND roles.deleted_at IS NULL
            ORDER BY roles.name
            "#,
        )
        .bind(account_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(|error| {
            AppError::Unavailable(format!("failed to load account roles: {error}"))
        })?;

        rows.into_iter()
            .map(|row| {
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
            })
            .collect()
    }

    async fn find_role_permissions(&self, role_id: RoleId) -> AppResult<Vec<Permission>> {
        let rows = sqlx::query_as::<_, PermissionRow>(
            r#"
            SELECT permissions.id, permissions.name, permissions.description,
                permissions.created_at, permissions.deleted_at
            FROM access_permissions AS permissions
            INNER JOIN access_role_grants AS grants
                ON grants.permission_id = permissions.id
            WHERE grants.role_id = $1 AND permissions.deleted_at IS NULL
            ORDER BY permissions.name
            "#,
        )
        .bind(role_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(|error| {
            AppError::Unavailable(format!("failed to load role permissions: {error}"))
        })?;

        rows.into_iter()
            .map(|row| {
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
            })
            .collect()
    }
}
