use fixhub_core::AccountContext;
use fixhub_domain::Permission;
use tracing::info;

use crate::access_ports::{CreatePermissionInput, PermissionListQuery, UpdatePermissionInput};

use super::*;

impl AccessAdminService {
    /// Creates a permission and registers its capability name.
    pub async fn create_permission(
        &self,
        context: &AccountContext,
        input: CreatePermissionInput,
    ) -> AppResult<Permission> {
        self.require_manage_access(context).await?;

        let permission = self.permission_store.create_permission(input).await?;
        self.registry.register(permission.name().clone()).await;

        info!(
            permission_id = %permission.id(),
            name = %permission.name(),
            "created permission"
        );
        Ok(permission)
    }

    /// Renames or re-describes a live permission.
    pub async fn update_permission(
        &self,
        context: &AccountContext,
        permission_id: PermissionId,
        input: UpdatePermissionInput,
    ) -> AppResult<Permission> {
        self.require_manage_access(context).await?;

        let existing = self.permission_store.find_permission(permission_id).await?;
        let renamed = existing.name() != &input.name;

        let permission = self
            .permission_store
            .update_permission(permission_id, input)
            .await?;

        if renamed {
            self.registry.unregister(existing.name()).await;
            self.registry.register(permission.name().clone()).await;
            let affected = self.accounts_granted_permission(permission_id).await?;
            self.invalidate_accounts(affected).await?;
        }

        info!(
            permission_id = %permission.id(),
            name = %permission.name(),
            "updated permission"
        );
        Ok(permission)
    }

    /// Returns one live permission.
    pub async fn find_permission(
        &self,
        context: &AccountContext,
        permission_id: PermissionId,
    ) -> AppResult<Permission> {
        self.require_manage_access(context).await?;
        self.permission_store.find_permission(permission_id).await
    }

    /// Lists permissions for administrative views.
    pub async fn list_permissions(
        &self,
        context: &AccountContext,
        query: PermissionListQuery,
    ) -> AppResult<Vec<Permission>> {
        self.require_manage_access(context).await?;
        self.permission_store.list_permissions(query).await
    }

    /// Soft deletes a permission and retires its capability name.
    pub async fn soft_delete_permission(
        &self,
        context: &AccountContext,
        permission_id: PermissionId,
    ) -> AppResult<()> {
        self.require_manage_access(context).await?;

        let existing = self.permission_store.find_permission(permission_id).await?;
        self.permission_store
            .soft_delete_permission(permission_id)
            .await?;

        self.registry.unregister(existing.name()).await;
        let affected = self.accounts_granted_permission(permission_id).await?;
        self.invalidate_accounts(affected).await?;

        info!(
            permission_id = %permission_id,
            name = %existing.name(),
            "soft deleted permission"
        );
        Ok(())
    }

    /// Restores a soft-deleted permission and re-registers its name.
    pub async fn restore_permission(
        &self,
        context: &AccountContext,
        permission_id: PermissionId,
    ) -> AppResult<Permission> {
        self.require_manage_access(context).await?;

        let permission = self
            .permission_store
            .restore_permission(permission_id)
            .await?;

        self.registry.register(permission.name().clone()).await;
        let affected = self.accounts_granted_permission(permission_id).await?;
        self.invalidate_accounts(affected).await?;

        info!(
            permission_id = %permission.id(),
            name = %permission.name(),
            "restored permission"
        );
        Ok(permission)
    }

    /// Permanently removes a permission and every grant referencing it.
    pub async fn force_delete_permission(
        &self,
        context: &AccountContext,
        permission_id: PermissionId,
    ) -> AppResult<()> {
        self.require_manage_access(context).await?;

        let affected = self.accounts_granted_permission(permission_id).await?;
        let removed = self
            .permission_store
            .force_delete_permission(permission_id)
            .await?;

        if !removed.is_deleted() {
            self.registry.unregister(removed.name()).await;
        }
        self.invalidate_accounts(affected).await?;

        info!(
            permission_id = %permission_id,
            name = %removed.name(),
            "permanently deleted permission"
        );
        Ok(())
    }
}
