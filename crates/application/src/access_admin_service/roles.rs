use fixhub_core::AccountContext;
use fixhub_domain::{Permission, Role};
use tracing::info;

use crate::access_ports::{CreateRoleInput, UpdateRoleInput};

use super::*;

impl AccessAdminService {
    /// Creates a role.
    pub async fn create_role(
        &self,
        context: &AccountContext,
        input: CreateRoleInput,
    ) -> AppResult<Role> {
        self.require_manage_access(context).await?;

        let role = self.role_store.create_role(input).await?;
        info!(role_id = %role.id(), name = %role.name(), "created role");
        Ok(role)
    }

    /// Renames or re-describes a live role.
    ///
    /// Renaming leaves cached decisions alone: the union walk resolves
    /// permissions by role id, so the effective sets are unchanged.
    pub async fn update_role(
        &self,
        context: &AccountContext,
        role_id: RoleId,
        input: UpdateRoleInput,
    ) -> AppResult<Role> {
        self.require_manage_access(context).await?;

        let role = self.role_store.update_role(role_id, input).await?;
        info!(role_id = %role.id(), name = %role.name(), "updated role");
        Ok(role)
    }

    /// Returns one live role.
    pub async fn find_role(&self, context: &AccountContext, role_id: RoleId) -> AppResult<Role> {
        self.require_manage_access(context).await?;
        self.role_store.find_role(role_id).await
    }

    /// Lists roles for administrative views.
    pub async fn list_roles(
        &self,
        context: &AccountContext,
        query: RoleListQuery,
    ) -> AppResult<Vec<Role>> {
        self.require_manage_access(context).await?;
        self.role_store.list_roles(query).await
    }

    /// Soft deletes a role, removing it from authorization consideration.
    pub async fn soft_delete_role(
        &self,
        context: &AccountContext,
        role_id: RoleId,
    ) -> AppResult<()> {
        self.require_manage_access(context).await?;

        self.role_store.soft_delete_role(role_id).await?;
        self.invalidate_role_members(role_id).await?;

        info!(role_id = %role_id, "soft deleted role");
        Ok(())
    }

    /// Restores a soft-deleted role and its influence on checks.
    pub async fn restore_role(
        &self,
        context: &AccountContext,
        role_id: RoleId,
    ) -> AppResult<Role> {
        self.require_manage_access(context).await?;

        let role = self.role_store.restore_role(role_id).await?;
        self.invalidate_role_members(role_id).await?;

        info!(role_id = %role.id(), name = %role.name(), "restored role");
        Ok(role)
    }

    /// Permanently removes a role, its grants and its memberships.
    pub async fn force_delete_role(
        &self,
        context: &AccountContext,
        role_id: RoleId,
    ) -> AppResult<()> {
        self.require_manage_access(context).await?;

        let members = self.membership_store.list_role_members(role_id).await?;
        let removed = self.role_store.force_delete_role(role_id).await?;
        self.invalidate_accounts(members.iter().map(RoleMembership::account_id).collect())
            .await?;

        info!(role_id = %role_id, name = %removed.name(), "permanently deleted role");
        Ok(())
    }

    /// Grants a permission to a role.
    pub async fn grant_permission_to_role(
        &self,
        context: &AccountContext,
        role_id: RoleId,
        permission_id: PermissionId,
    ) -> AppResult<()> {
        self.require_manage_access(context).await?;

        self.role_store.grant_permission(role_id, permission_id).await?;
        self.invalidate_role_members(role_id).await?;

        info!(role_id = %role_id, permission_id = %permission_id, "granted permission to role");
        Ok(())
    }

    /// Revokes a permission from a role.
    pub async fn revoke_permission_from_role(
        &self,
        context: &AccountContext,
        role_id: RoleId,
        permission_id: PermissionId,
    ) -> AppResult<()> {
        self.require_manage_access(context).await?;

        self.role_store.revoke_permission(role_id, permission_id).await?;
        self.invalidate_role_members(role_id).await?;

        info!(role_id = %role_id, permission_id = %permission_id, "revoked permission from role");
        Ok(())
    }

    /// Replaces the full grant set of a role, the shape an edit form submits.
    pub async fn replace_role_grants(
        &self,
        context: &AccountContext,
        role_id: RoleId,
        permission_ids: Vec<PermissionId>,
    ) -> AppResult<()> {
        self.require_manage_access(context).await?;

        let granted = permission_ids.len();
        self.role_store.replace_grants(role_id, permission_ids).await?;
        self.invalidate_role_members(role_id).await?;

        info!(role_id = %role_id, granted, "replaced role grants");
        Ok(())
    }

    /// Lists the live permissions granted to a role.
    pub async fn role_permissions(
        &self,
        context: &AccountContext,
        role_id: RoleId,
    ) -> AppResult<Vec<Permission>> {
        self.require_manage_access(context).await?;
        self.role_store.list_role_permissions(role_id).await
    }
}
