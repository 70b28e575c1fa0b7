use super::*;

#[async_trait]
impl MembershipStore for PostgresAccessRepository {
    async fn assign_role(&self, account_id: AccountId, role_id: RoleId) -> AppResult<()> {
        let mut transaction = self
            .pool
            .begin()
            .await
            .map_err(|error| AppError::Internal(format!("failed to begin transaction: {error}")))?;

        self.require_live_role(&mut *transaction, role_id).await?;

        sqlx::query(
            r#"
            INSERT INTO access_role_memberships (account_id, role_id, assigned_at)
            VALUES ($1, $2, now())
            ON CONFLICT (account_id, role_id) DO NOTHING
            "#,
        )
        .bind(account_id.as_uuid())
        .bind(role_id.as_uuid())
        .execute(&mut *transaction)
        .await
        .map_err(|error| AppError::Internal(format!("failed to assign role: {error}")))?;

        transaction
            .commit()
            .await
            .map_err(|error| AppError::Internal(format!("failed to commit transaction: {error}")))?;

        Ok(())
    }

    async fn revoke_role(&self, account_id: AccountId, role_id: RoleId) -> AppResult<()> {
        sqlx::query(
            r#"
            DELETE FROM access_role_memberships
            WHERE account_id = $1 AND role_id = $2
            "#,
        )
        .bind(account_id.as_uuid())
        .bind(role_id.as_uuid())
        .execute(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to remove membership: {error}")))?;

        Ok(())
    }

    async fn list_account_roles(&self, account_id: AccountId) -> AppResult<Vec<Role>> {
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
        .map_err(|error| AppError::Internal(format!("failed to list account roles: {error}")))?;

        rows.into_iter().map(decode_role).collect()
    }

    async fn list_role_members(&self, role_id: RoleId) -> AppResult<Vec<RoleMembership>> {
        let rows = sqlx::query_as::<_, MembershipRow>(
            r#"
            SELECT account_id, role_id, assigned_at
            FROM access_role_memberships
            WHERE role_id = $1
            ORDER BY account_id
            "#,
        )
        .bind(role_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to list role members: {error}")))?;

        Ok(rows
            .into_iter()
            .map(|row| {
                RoleMembership::from_parts(
                    AccountId::from_uuid(row.account_id),
                    RoleId::from_uuid(row.role_id),
                    row.assigned_at,
                )
            })
            .collect())
    }
}
