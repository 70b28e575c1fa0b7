use std::collections::HashSet;

use super::*;

#[async_trait]
impl RoleStore for PostgresAccessRepository {
    async fn create_role(&self, input: CreateRoleInput) -> AppResult<Role> {
        let role = Role::new(input.name, input.description);

        sqlx::query(
            r#"
            INSERT INTO access_roles (id, name, description, created_at, deleted_at)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(role.id().as_uuid())
        .bind(role.name().as_str())
        .bind(role.description())
        .bind(role.created_at())
        .bind(role.deleted_at())
        .execute(&self.pool)
        .await
        .map_err(|error| map_role_conflict(error, role.name().as_str()))?;

        Ok(role)
    }

    async fn update_role(&self, role_id: RoleId, input: UpdateRoleInput) -> AppResult<Role> {
        let row = sqlx::query_as::<_, RoleRow>(
            r#"
            UPDATE access_roles
            SET name = $2, description = $3
            WHERE id = $1 AND deleted_at IS NULL
            RETURNING id, name, description, created_at, deleted_at
            "#,
        )
        .bind(role_id.as_uuid())
        .bind(input.name.as_str())
        .bind(input.description.as_deref())
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| map_role_conflict(error, input.name.as_str()))?;

        match row {
            Some(row) => decode_role(row),
            None => Err(AppError::NotFound(format!(
                "role '{role_id}' was not found"
            ))),
        }
    }

    async fn find_role(&self, role_id: RoleId) -> AppResult<Role> {
        let row = sqlx::query_as::<_, RoleRow>(
            r#"
            SELECT id, name, description, created_at, deleted_at
            FROM access_roles
            WHERE id = $1 AND deleted_at IS NULL
            "#,
        )
        .bind(role_id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to load role: {error}")))?;

        match row {
            Some(row) => decode_role(row),
            None => Err(AppError::NotFound(format!(
                "role '{role_id}' was not found"
            ))),
        }
    }

    async fn find_role_by_name(&self, name: &RoleName) -> AppResult<Option<Role>> {
        let row = sqlx::query_as::<_, RoleRow>(
            r#"
            SELECT id, name, description, created_at, deleted_at
            FROM access_roles
            WHERE name = $1 AND deleted_at IS NULL
            "#,
        )
        .bind(name.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to load role: {error}")))?;

        row.map(decode_role).transpose()
    }

    async fn list_roles(&self, query: RoleListQuery) -> AppResult<Vec<Role>> {
        let rows = sqlx::query_as::<_, RoleRow>(
            r#"
            SELECT roles.id, roles.name, roles.description,
                roles.created_at, roles.deleted_at
            FROM access_roles AS roles
            WHERE ($1 OR roles.deleted_at IS NULL)
                AND ($2::text IS NULL
                    OR roles.name ILIKE $2
                    OR roles.description ILIKE $2)
                AND ($3::uuid IS NULL OR EXISTS (
                    SELECT 1
                    FROM access_role_grants AS grants
                    WHERE grants.role_id = roles.id
                        AND grants.permission_id = $3
                ))
            ORDER BY roles.name
            LIMIT $4 OFFSET $5
            "#,
        )
        .bind(query.include_deleted)
        .bind(query.search.as_deref().map(like_pattern))
        .bind(
            query
                .granting_permission
                .map(|permission_id| permission_id.as_uuid()),
        )
        .bind(page_bound(query.limit))
        .bind(page_bound(query.offset))
        .fetch_all(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to list roles: {error}")))?;

        rows.into_iter().map(decode_role).collect()
    }

    async fn soft_delete_role(&self, role_id: RoleId) -> AppResult<()> {
        let rows_affected = sqlx::query(
            r#"
            UPDATE access_roles
            SET deleted_at = now()
            WHERE id = $1 AND deleted_at IS NULL
            "#,
        )
        .bind(role_id.as_uuid())
        .execute(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to delete role: {error}")))?
        .rows_affected();

        if rows_affected == 0 {
            return Err(AppError::NotFound(format!(
                "role '{role_id}' was not found"
            )));
        }

        Ok(())
    }

    async fn restore_role(&self, role_id: RoleId) -> AppResult<Role> {
        let mut transaction = self
            .pool
            .begin()
            .await
            .map_err(|error| AppError::Internal(format!("failed to begin transaction: {error}")))?;

        let trashed = sqlx::query_as::<_, RoleRow>(
            r#"
            SELECT id, name, description, created_at, deleted_at
            FROM access_roles
            WHERE id = $1 AND deleted_at IS NOT NULL
            "#,
        )
        .bind(role_id.as_uuid())
        .fetch_optional(&mut *transaction)
        .await
        .map_err(|error| AppError::Internal(format!("failed to load role: {error}")))?
        .ok_or_else(|| {
            AppError::NotFound(format!("soft-deleted role '{role_id}' was not found"))
        })?;

        let restored = sqlx::query_as::<_, RoleRow>(
            r#"
            UPDATE access_roles
            SET deleted_at = NULL
            WHERE id = $1
            RETURNING id, name, description, created_at, deleted_at
            "#,
        )
        .bind(role_id.as_uuid())
        .fetch_one(&mut *transaction)
        .await
        .map_err(|error| map_role_conflict(error, trashed.name.as_str()))?;

        transaction
            .commit()
            .await
            .map_err(|error| AppError::Internal(format!("failed to commit transaction: {error}")))?;

        decode_role(restored)
    }

    async fn force_delete_role(&self, role_id: RoleId) -> AppResult<Role> {
        let row = sqlx::query_as::<_, RoleRow>(
            r#"
            DELETE FROM access_roles
            WHERE id = $1
            RETURNING id, name, description, created_at, deleted_at
            "#,
        )
        .bind(role_id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to delete role: {error}")))?;

        match row {
            Some(row) => decode_role(row),
            None => Err(AppError::NotFound(format!(
                "role '{role_id}' was not found"
            ))),
        }
    }

    async fn grant_permission(
        &self,
        role_id: RoleId,
        permission_id: PermissionId,
    ) -> AppResult<()> {
        let mut transaction = self
            .pool
            .begin()
            .await
            .map_err(|error| AppError::Internal(format!("failed to begin transaction: {error}")))?;

        self.require_live_role(&mut *transaction, role_id).await?;
        self.require_live_permission(&mut *transaction, permission_id)
            .await?;

        sqlx::query(
            r#"
            INSERT INTO access_role_grants (role_id, permission_id)
            VALUES ($1, $2)
            ON CONFLICT (role_id, permission_id) DO NOTHING
            "#,
        )
        .bind(role_id.as_uuid())
        .bind(permission_id.as_uuid())
        .execute(&mut *transaction)
        .await
        .map_err(|error| AppError::Internal(format!("failed to persist grant: {error}")))?;

        transaction
            .commit()
            .await
            .map_err(|error| AppError::Internal(format!("failed to commit transaction: {error}")))?;

        Ok(())
    }

    async fn revoke_permission(
        &self,
        role_id: RoleId,
        permission_id: PermissionId,
    ) -> AppResult<()> {
        sqlx::query(
            r#"
            DELETE FROM access_role_grants
            WHERE role_id = $1 AND permission_id = $2
            "#,
        )
        .bind(role_id.as_uuid())
        .bind(permission_id.as_uuid())
        .execute(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to remove grant: {error}")))?;

        Ok(())
    }

    async fn replace_grants(
        &self,
        role_id: RoleId,
        permission_ids: Vec<PermissionId>,
    ) -> AppResult<()> {
        let unique_ids: HashSet<PermissionId> = permission_ids.into_iter().collect();
        let permission_uuids: Vec<uuid::Uuid> = unique_ids
            .iter()
            .map(|permission_id| permission_id.as_uuid())
            .collect();

        let mut transaction = self
            .pool
            .begin()
            .await
            .map_err(|error| AppError::Internal(format!("failed to begin transaction: {error}")))?;

        self.require_live_role(&mut *transaction, role_id).await?;

        let live = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*)
            FROM access_permissions
            WHERE deleted_at IS NULL AND id = ANY($1)
            "#,
        )
        .bind(permission_uuids.as_slice())
        .fetch_one(&mut *transaction)
        .await
        .map_err(|error| AppError::Internal(format!("failed to resolve permissions: {error}")))?;

        if live != page_bound(unique_ids.len()) {
            return Err(AppError::NotFound(
                "one or more permissions were not found".to_owned(),
            ));
        }

        sqlx::query(
            r#"
            DELETE FROM access_role_grants
            WHERE role_id = $1
            "#,
        )
        .bind(role_id.as_uuid())
        .execute(&mut *transaction)
        .await
        .map_err(|error| AppError::Internal(format!("failed to clear grants: {error}")))?;

        for permission_uuid in permission_uuids {
            sqlx::query(
                r#"
                INSERT INTO access_role_grants (role_id, permission_id)
                VALUES ($1, $2)
                "#,
            )
            .bind(role_id.as_uuid())
            .bind(permission_uuid)
            .execute(&mut *transaction)
            .await
            .map_err(|error| AppError::Internal(format!("failed to persist grant: {error}")))?;
        }

        transaction
            .commit()
            .await
            .map_err(|error| AppError::Internal(format!("failed to commit transaction: {error}")))?;

        Ok(())
    }

    async fn list_role_permissions(&self, role_id: RoleId) -> AppResult<Vec<Permission>> {
        self.require_live_role(&self.pool, role_id).await?;

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
        .map_err(|error| AppError::Internal(format!("failed to list role grants: {error}")))?;

        rows.into_iter().map(decode_permission).collect()
    }
}
